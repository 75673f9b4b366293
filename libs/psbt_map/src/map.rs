//! Key/value maps: a sequence of entries ended by a terminator.
//!
//! ```text
//! <map> := <entry>* 0x00
//! ```
//!
//! The terminator doubles as a key length of 0, which never occurs for a real
//! entry.

use std::io;

use crate::entry::{Entry, Record, read_entry, write_entry};
use crate::error::Result;
use crate::read::SliceRead;

/// The single byte that ends every map.
pub const TERMINATOR: u8 = 0x00;

/// Decodes a map from the start of `buf`.
///
/// Returns the entries in input order and the amount of bytes the map
/// occupied, including its terminator.
///
/// Only an explicit terminator ends a map. Running out of input, including
/// being handed an empty `buf`, is an error and not an empty map. Envelopes
/// that read "maps until the input is exhausted" have to check for remaining
/// input before calling this.
///
/// # Errors
///
/// Returns the first entry error, located at the index of the failing entry.
/// Entries decoded before the failure are discarded.
pub fn decode_map(buf: &[u8]) -> Result<(Vec<Entry<'_>>, usize)> {
    let mut read = SliceRead::new(buf);
    let entries = read_map(&mut read)?;
    Ok((entries, read.consumed()))
}

pub(crate) fn read_map<'a>(read: &mut SliceRead<'a>) -> Result<Vec<Entry<'a>>> {
    // not pre-allocated: the input decides how many entries there are
    let mut entries = Vec::new();
    loop {
        match read_entry(read).map_err(|e| e.at_entry(entries.len()))? {
            Record::Pair(entry) => entries.push(entry),
            Record::Terminator => return Ok(entries),
        }
    }
}

/// Writes all entries followed by the terminator.
///
/// # Errors
///
/// Returns an error if the writer fails.
pub fn write_map<'e, 'b, W, I>(mut writer: W, entries: I) -> io::Result<()>
where
    'b: 'e,
    W: io::Write,
    I: IntoIterator<Item = &'e Entry<'b>>,
{
    for entry in entries {
        write_entry(&mut writer, entry)?;
    }

    writer.write_all(&[TERMINATOR])
}

/// Encodes a map to a [`Vec<u8>`].
///
/// The resulting buffer will have exactly the length required.
///
/// # Errors
///
/// Writing to a [`Vec`] does not fail. The [`Result`] mirrors [`write_map`].
pub fn map_to_vec(entries: &[Entry<'_>]) -> io::Result<Vec<u8>> {
    let len = entries.iter().map(Entry::encoded_len).sum::<usize>() + 1;
    let mut buf = Vec::with_capacity(len);
    write_map(&mut buf, entries)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn terminator_only() {
        let (entries, len) = decode_map(&[TERMINATOR]).expect("empty map is valid");
        assert!(entries.is_empty(), "expected no entries");
        assert_eq!(len, 1, "terminator must be consumed");
    }

    #[test]
    fn empty_input_is_truncated() {
        let err = decode_map(&[]).expect_err("no terminator");
        assert_eq!(err.kind(), ErrorKind::TruncatedVarInt, "expected truncated varint");
        assert_eq!(err.location().entry, Some(0), "expected first entry");
    }

    #[test]
    fn missing_terminator() {
        let err = decode_map(&[0x01, 0x05, 0x01, 0xaa]).expect_err("no terminator");
        assert_eq!(err.kind(), ErrorKind::TruncatedVarInt, "expected truncated varint");
        assert_eq!(err.location().entry, Some(1), "one entry decoded before failure");
    }

    #[test]
    fn round_trip() {
        let big = vec![0x42; 0x1_0000];
        let entries = [
            Entry::new(&[0x00], b"unsigned tx"),
            Entry::new(&[0x01, 0x02, 0x03], &[]),
            Entry::new(&[0xfc, b'x'], &big),
            Entry::new(&[0x01, 0x02, 0x03], b"dupes are kept in order"),
        ];

        let mut buf = map_to_vec(&entries).expect("writing to vec cannot fail");
        let encoded_len = buf.len();
        assert_eq!(buf.last(), Some(&TERMINATOR), "must end with terminator");

        // data after the map must not be touched
        buf.extend_from_slice(&[0x01, 0x02]);

        let (decoded, len) = decode_map(&buf).expect("must decode");
        assert_eq!(decoded, entries, "entries must round trip in order");
        assert_eq!(len, encoded_len, "must consume exactly the map");
    }

    #[test]
    fn consecutive_maps() {
        let mut buf = map_to_vec(&[Entry::new(&[0x00], &[0x01])]).expect("vec");
        buf.extend(map_to_vec(&[]).expect("vec"));
        buf.extend(map_to_vec(&[Entry::new(&[0x02], &[])]).expect("vec"));

        let mut rest = buf.as_slice();
        let mut counts = Vec::new();
        while !rest.is_empty() {
            let (entries, len) = decode_map(rest).expect("must decode");
            counts.push(entries.len());
            rest = &rest[len..];
        }

        assert_eq!(counts, [1, 0, 1], "maps must be contiguous");
    }

    #[test]
    fn bad_entry_location() {
        let buf = [0x01, 0x00, 0x00, 0x01, 0x01, 0x05, 0x00];
        let err = decode_map(&buf).expect_err("second value too long");
        assert_eq!(err.kind(), ErrorKind::TruncatedEntry, "expected truncated entry");
        assert_eq!(err.location().entry, Some(1), "expected second entry");
        assert_eq!(err.location().map, None, "maps on their own have no position");
    }
}
