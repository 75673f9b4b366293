//! Error handling types.
//!
//! Every decoder in this crate and in the formats layered on it fails with the
//! same [`Error`] type: an [`ErrorKind`] plus the [`Location`] of the map and
//! entry that failed.

use std::fmt;

/// Result type with [`Error`] as the error variant.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The reason a decode failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The input did not start with the expected magic bytes.
    #[error("invalid magic bytes")]
    MalformedMagic,
    /// A variable-length integer was cut off or missing entirely.
    #[error("variable-length integer is truncated")]
    TruncatedVarInt,
    /// A key or value declared a length longer than the remaining input.
    #[error("declared key or value length exceeds the remaining input")]
    TruncatedEntry,
    /// An extended key value wasn't a fingerprint followed by whole path
    /// elements.
    #[error("extended key value of {len} bytes is not a fingerprint followed by 4-byte path elements")]
    InvalidExtendedKeyValue {
        /// The length of the offending value.
        len: usize,
    },
    /// A field type that the decoder was told to reject.
    #[error("unknown field type {key_type:#04x}")]
    UnknownFieldType {
        /// The discriminant, i.e. the first key byte.
        key_type: u8,
    },
    /// A text field contained invalid UTF-8.
    #[error("invalid utf-8 in text field")]
    InvalidUtf8,
}

/// Identifies a map within an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapPos {
    /// The global map directly after the magic bytes.
    Global,
    /// The n-th map after the global one, counting from 0.
    ///
    /// For PSBTs these are the input and output maps, for serialized
    /// descriptors the key records.
    Section(usize),
}

impl fmt::Display for MapPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str("global map"),
            Self::Section(index) => write!(f, "map #{index}"),
        }
    }
}

/// Where in the input an error happened.
///
/// Either part may be unknown, f.e. a bad magic has neither a map nor an entry.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    /// The map that failed to decode.
    pub map: Option<MapPos>,
    /// The index of the entry within that map.
    pub entry: Option<usize>,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.map, self.entry) {
            (Some(map), Some(entry)) => write!(f, " (in {map}, entry {entry})"),
            (Some(map), None) => write!(f, " (in {map})"),
            (None, Some(entry)) => write!(f, " (at entry {entry})"),
            (None, None) => Ok(()),
        }
    }
}

/// A failure to decode a PSBT, a serialized descriptor, or one of their parts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}{location}")]
pub struct Error {
    kind: ErrorKind,
    location: Location,
}

impl Error {
    /// Creates an error without location information.
    pub const fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            location: Location {
                map: None,
                entry: None,
            },
        }
    }

    /// The reason for the failure.
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Where the failure happened, as far as it is known.
    pub const fn location(&self) -> Location {
        self.location
    }

    /// Attaches the entry index, unless one is already set.
    #[must_use]
    pub fn at_entry(mut self, index: usize) -> Self {
        self.location.entry.get_or_insert(index);
        self
    }

    /// Attaches the map position, unless one is already set.
    #[must_use]
    pub fn in_map(mut self, map: MapPos) -> Self {
        self.location.map.get_or_insert(map);
        self
    }

    /// Shorthand to build an error located at an entry within a map.
    pub fn located(kind: ErrorKind, map: MapPos, entry: usize) -> Self {
        Self::new(kind).at_entry(entry).in_map(map)
    }
}

impl From<ErrorKind> for Error {
    fn from(value: ErrorKind) -> Self {
        Self::new(value)
    }
}
