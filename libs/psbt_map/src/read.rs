//! Exposes a cursor over the input slice.

use crate::error::{ErrorKind, Result};
use crate::varint;

/// Wraps a slice, tracking how many bytes were consumed.
///
/// Every read either advances by exactly the amount of bytes it returns or
/// fails without advancing.
#[derive(Debug, Clone)]
pub(crate) struct SliceRead<'a> {
    slice: &'a [u8],
    consumed: usize,
}

impl<'a> SliceRead<'a> {
    pub fn new(slice: &'a [u8]) -> Self {
        Self { slice, consumed: 0 }
    }

    /// The amount of bytes read so far.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    pub fn is_empty(&self) -> bool {
        self.slice.is_empty()
    }

    /// Skips up to `len` bytes.
    pub fn advance(&mut self, len: usize) {
        let len = len.min(self.slice.len());
        self.slice = &self.slice[len..];
        self.consumed += len;
    }

    /// Reads a varint.
    pub fn read_varint(&mut self) -> Result<u64> {
        let (value, len) = varint::decode(self.slice).ok_or(ErrorKind::TruncatedVarInt)?;
        self.advance(len);
        Ok(value)
    }

    /// Reads a chunk of bytes whose length was decoded from the input.
    ///
    /// The length is compared as [`u64`] so oversized declarations can neither
    /// wrap nor be truncated on 32-bit targets.
    pub fn read_declared(&mut self, len: u64) -> Result<&'a [u8]> {
        let len = usize::try_from(len)
            .ok()
            .filter(|&len| len <= self.slice.len())
            .ok_or(ErrorKind::TruncatedEntry)?;

        let (out, rem) = self.slice.split_at(len);
        self.slice = rem;
        self.consumed += len;
        Ok(out)
    }

    /// Strips `magic` from the front of the slice.
    pub fn read_magic(&mut self, magic: &[u8]) -> Result<()> {
        if !self.slice.starts_with(magic) {
            return Err(ErrorKind::MalformedMagic.into());
        }

        self.advance(magic.len());
        Ok(())
    }
}
