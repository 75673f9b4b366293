//! Single length-prefixed key/value records.
//!
//! On the wire, an entry is `varint(len(key)) key varint(len(value)) value`. A
//! key length of 0 is not an entry but the terminator of the surrounding map.

use std::io;

use crate::error::Result;
use crate::read::SliceRead;
use crate::varint;

/// A key/value pair within a map.
///
/// The first key byte is the field type, any further key bytes are
/// type-specific data. A valid entry never has an empty key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Entry<'a> {
    /// The full key, including the field type.
    pub key: &'a [u8],
    /// The value.
    pub value: &'a [u8],
}

impl<'a> Entry<'a> {
    /// Creates a new entry.
    pub const fn new(key: &'a [u8], value: &'a [u8]) -> Self {
        Self { key, value }
    }

    /// The field type, i.e. the first key byte.
    ///
    /// Returns 0 for an empty key, which can only happen with hand-built
    /// entries.
    pub fn key_type(&self) -> u8 {
        self.key.first().copied().unwrap_or_default()
    }

    /// The key with the field type stripped.
    pub fn key_data(&self) -> &'a [u8] {
        self.key.get(1..).unwrap_or_default()
    }

    /// The amount of bytes [`write_entry`] emits for this entry.
    pub fn encoded_len(&self) -> usize {
        len_prefixed_size(self.key) + len_prefixed_size(self.value)
    }
}

fn len_prefixed_size(bytes: &[u8]) -> usize {
    varint::len_encoded_len(bytes.len()) + bytes.len()
}

/// What [`decode_entry`] found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Record<'a> {
    /// A regular key/value pair.
    Pair(Entry<'a>),
    /// The zero-length key that ends a map.
    Terminator,
}

/// Decodes an entry or terminator from the start of `buf`.
///
/// Returns the record and the amount of bytes it occupied.
///
/// # Errors
///
/// Returns [`TruncatedVarInt`] if a length prefix is missing or cut off, which
/// includes an empty `buf`, and [`TruncatedEntry`] if a declared length exceeds
/// the remaining input.
///
/// [`TruncatedVarInt`]: crate::ErrorKind::TruncatedVarInt
/// [`TruncatedEntry`]: crate::ErrorKind::TruncatedEntry
pub fn decode_entry(buf: &[u8]) -> Result<(Record<'_>, usize)> {
    let mut read = SliceRead::new(buf);
    let record = read_entry(&mut read)?;
    Ok((record, read.consumed()))
}

pub(crate) fn read_entry<'a>(read: &mut SliceRead<'a>) -> Result<Record<'a>> {
    let key_len = read.read_varint()?;
    if key_len == 0 {
        return Ok(Record::Terminator);
    }

    let key = read.read_declared(key_len)?;
    let value_len = read.read_varint()?;
    let value = read.read_declared(value_len)?;
    Ok(Record::Pair(Entry { key, value }))
}

/// Writes a single entry.
///
/// # Errors
///
/// Returns an error if the writer fails.
pub fn write_entry<W: io::Write>(mut writer: W, entry: &Entry<'_>) -> io::Result<()> {
    varint::write_len(&mut writer, entry.key.len())?;
    writer.write_all(entry.key)?;
    varint::write_len(&mut writer, entry.value.len())?;
    writer.write_all(entry.value)
}
