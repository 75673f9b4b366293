//! Decoding of serialized descriptors.

use std::str;

use psbt_map::{
    Collector, Entry, Error, ErrorKind, Field, Ignore, MapPos, Result, decode_extended_key,
    decode_map,
};

use crate::{GLOBAL_NAME, GLOBAL_OUTPUT_DESCRIPTOR, KEY_XPUB, MAGIC, OutputDescriptor};

/// Decodes a descriptor from a byte slice with the default [`Decoder`].
///
/// Unknown fields are skipped silently. Use [`Decoder::decode`] to observe
/// them.
///
/// # Errors
///
/// See [`Decoder::decode`].
pub fn from_slice(buf: &[u8]) -> Result<OutputDescriptor> {
    Decoder::new().decode(buf, &mut Ignore)
}

/// How to treat entries in a key record whose field type isn't [`KEY_XPUB`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum UnknownKeyPolicy {
    /// Report the entry to the collector and continue without it.
    #[default]
    Skip,
    /// Fail with [`ErrorKind::UnknownFieldType`].
    Reject,
}

/// Configurable decoder for serialized descriptors.
#[derive(Debug, Default, Clone, Copy)]
#[must_use]
pub struct Decoder {
    unknown_keys: UnknownKeyPolicy,
}

impl Decoder {
    /// Creates a decoder with default settings.
    pub const fn new() -> Self {
        Self {
            unknown_keys: UnknownKeyPolicy::Skip,
        }
    }

    /// Sets how unknown entries in key records are treated.
    pub const fn unknown_keys(mut self, policy: UnknownKeyPolicy) -> Self {
        self.unknown_keys = policy;
        self
    }

    /// Decodes a descriptor from a byte slice.
    ///
    /// Missing name or descriptor fields decode as empty strings. If a global
    /// field is repeated, the last one wins. Unknown global fields are always
    /// reported to `collector` and otherwise ignored; unknown key record fields
    /// are handled per [`UnknownKeyPolicy`].
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::MalformedMagic`] if the input doesn't start with
    /// [`MAGIC`], any map or extended key error located at its map and entry,
    /// [`ErrorKind::InvalidUtf8`] for non-UTF-8 text fields, and
    /// [`ErrorKind::UnknownFieldType`] for unknown key record fields if they
    /// are rejected.
    pub fn decode<'a, C>(&self, buf: &'a [u8], collector: &mut C) -> Result<OutputDescriptor>
    where
        C: Collector<'a> + ?Sized,
    {
        let rest = buf
            .strip_prefix(MAGIC.as_slice())
            .ok_or(ErrorKind::MalformedMagic)?;

        let (global, len) = decode_map(rest).map_err(|e| e.in_map(MapPos::Global))?;
        let mut rest = &rest[len..];

        let mut desc = OutputDescriptor::default();
        for (index, entry) in global.iter().enumerate() {
            match entry.key_type() {
                GLOBAL_NAME => desc.name = decode_text(entry, index)?,
                GLOBAL_OUTPUT_DESCRIPTOR => desc.descriptor = decode_text(entry, index)?,
                _ => collector.collect(MapPos::Global, Field::Unknown(*entry)),
            }
        }

        let mut record = 0usize;
        while !rest.is_empty() {
            let pos = MapPos::Section(record);
            let (entries, len) = decode_map(rest).map_err(|e| e.in_map(pos))?;
            rest = &rest[len..];

            for (index, entry) in entries.iter().enumerate() {
                match entry.key_type() {
                    KEY_XPUB => {
                        let key = decode_extended_key(entry)
                            .map_err(|e| e.at_entry(index).in_map(pos))?;
                        desc.keys.push(key);
                    },
                    key_type => match self.unknown_keys {
                        UnknownKeyPolicy::Skip => collector.collect(pos, Field::Unknown(*entry)),
                        UnknownKeyPolicy::Reject => {
                            let kind = ErrorKind::UnknownFieldType { key_type };
                            return Err(Error::located(kind, pos, index));
                        },
                    },
                }
            }

            record += 1;
        }

        Ok(desc)
    }
}

fn decode_text(entry: &Entry<'_>, index: usize) -> Result<String> {
    str::from_utf8(entry.value)
        .map(str::to_owned)
        .map_err(|_| Error::located(ErrorKind::InvalidUtf8, MapPos::Global, index))
}
