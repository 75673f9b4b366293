//! Extended key records in the shape of `PSBT_GLOBAL_XPUB`.
//!
//! The key is the field type followed by the raw extended key. The value is the
//! origin's master fingerprint (big-endian) followed by the derivation path,
//! one little-endian `u32` per step.

use std::io;

use crate::entry::Entry;
use crate::error::{ErrorKind, Result};

/// An extended key with its origin.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct ExtendedKey {
    /// The fingerprint of the master key the path starts at.
    pub master_fingerprint: u32,
    /// The derivation path from the master key.
    ///
    /// Steps at or above [`ExtendedKey::HARDENED`] are hardened. They are
    /// stored as-is and never interpreted.
    pub path: Vec<u32>,
    /// The raw extended key bytes, not including the field type.
    pub key: Vec<u8>,
}

impl ExtendedKey {
    /// The first hardened derivation index, 2^31.
    pub const HARDENED: u32 = 0x8000_0000;

    /// Whether a path step denotes hardened derivation.
    pub const fn is_hardened(step: u32) -> bool {
        step >= Self::HARDENED
    }

    /// The length of the value [`Self::write_value`] emits.
    pub fn value_len(&self) -> usize {
        4 + 4 * self.path.len()
    }

    /// Writes the record value: fingerprint and path.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer fails.
    pub fn write_value<W: io::Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_all(&self.master_fingerprint.to_be_bytes())?;
        for step in &self.path {
            writer.write_all(&step.to_le_bytes())?;
        }

        Ok(())
    }

    /// Returns the record value as a new buffer.
    pub fn value_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.value_len());
        // writing to a vec never fails
        _ = self.write_value(&mut buf);
        buf
    }

    /// Returns the record key for a given field type.
    pub fn key_bytes(&self, key_type: u8) -> Vec<u8> {
        let mut buf = Vec::with_capacity(1 + self.key.len());
        buf.push(key_type);
        buf.extend_from_slice(&self.key);
        buf
    }
}

/// Interprets an entry as an extended key record.
///
/// The field type is not checked. It's stripped from the key and the rest of
/// the key is taken as-is.
///
/// # Errors
///
/// Returns [`ErrorKind::InvalidExtendedKeyValue`] if the value is shorter than
/// a fingerprint or isn't made up of whole 4-byte path steps.
pub fn decode_extended_key(entry: &Entry<'_>) -> Result<ExtendedKey> {
    let invalid = || ErrorKind::InvalidExtendedKeyValue {
        len: entry.value.len(),
    };

    let (fingerprint, path) = entry.value.split_first_chunk::<4>().ok_or_else(invalid)?;
    let (steps, rest) = path.as_chunks::<4>();
    if !rest.is_empty() {
        return Err(invalid().into());
    }

    Ok(ExtendedKey {
        master_fingerprint: u32::from_be_bytes(*fingerprint),
        path: steps.iter().map(|s| u32::from_le_bytes(*s)).collect(),
        key: entry.key_data().to_vec(),
    })
}
