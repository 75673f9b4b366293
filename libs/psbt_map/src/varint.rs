//! Bitcoin's compact variable-length unsigned integer ("CompactSize").
//!
//! The first byte selects the width:
//!
//! | prefix   | total bytes | payload           |
//! |----------|-------------|-------------------|
//! | `< 0xfd` | 1           | the byte itself   |
//! | `0xfd`   | 3           | little-endian u16 |
//! | `0xfe`   | 5           | little-endian u32 |
//! | `0xff`   | 9           | little-endian u64 |
//!
//! See also: <https://en.bitcoin.it/wiki/Protocol_documentation#Variable_length_integer>

use std::io;

const PREFIX_U16: u8 = 0xfd;
const PREFIX_U32: u8 = 0xfe;
const PREFIX_U64: u8 = 0xff;

/// Decodes a varint from the start of `buf`.
///
/// Returns the value and the amount of bytes it occupied, which is always 1,
/// 3, 5, or 9. If `buf` is too short to hold the encoding its prefix announces
/// (or is empty), returns [`None`].
///
/// Over-long encodings (f.e. `0xfd 0x01 0x00` for 1) are accepted.
pub fn decode(buf: &[u8]) -> Option<(u64, usize)> {
    let (&prefix, rest) = buf.split_first()?;
    match prefix {
        PREFIX_U16 => {
            let bytes = rest.first_chunk::<2>()?;
            Some((u16::from_le_bytes(*bytes).into(), 3))
        },
        PREFIX_U32 => {
            let bytes = rest.first_chunk::<4>()?;
            Some((u32::from_le_bytes(*bytes).into(), 5))
        },
        PREFIX_U64 => {
            let bytes = rest.first_chunk::<8>()?;
            Some((u64::from_le_bytes(*bytes), 9))
        },
        b => Some((b.into(), 1)),
    }
}

/// The amount of bytes [`write`] emits for `value`.
pub const fn encoded_len(value: u64) -> usize {
    match value {
        0..0xfd => 1,
        0xfd..=0xffff => 3,
        0x1_0000..=0xffff_ffff => 5,
        _ => 9,
    }
}

/// Writes `value` using the smallest encoding that can hold it.
///
/// # Errors
///
/// Returns an error if the writer fails.
pub fn write<W: io::Write>(mut writer: W, value: u64) -> io::Result<()> {
    let mut buf = [0u8; 9];
    let len = encoded_len(value);
    match len {
        1 => buf[0] = value.to_le_bytes()[0],
        3 => {
            buf[0] = PREFIX_U16;
            buf[1..3].copy_from_slice(&value.to_le_bytes()[..2]);
        },
        5 => {
            buf[0] = PREFIX_U32;
            buf[1..5].copy_from_slice(&value.to_le_bytes()[..4]);
        },
        _ => {
            buf[0] = PREFIX_U64;
            buf[1..9].copy_from_slice(&value.to_le_bytes());
        },
    }

    writer.write_all(&buf[..len])
}

/// Converts a slice length for use as a length prefix.
const fn len_to_u64(len: usize) -> u64 {
    // usize is at most 64 bits on every supported target
    len as u64
}

/// The encoded size of a length prefix, see [`write_len`].
pub(crate) const fn len_encoded_len(len: usize) -> usize {
    encoded_len(len_to_u64(len))
}

/// Writes a length, as used for length-prefixed byte strings.
pub(crate) fn write_len<W: io::Write>(writer: W, len: usize) -> io::Result<()> {
    write(writer, len_to_u64(len))
}
