//! # Serialized output descriptors
//!
//! Binary encoding of an output descriptor together with its name and the
//! origins of its extended keys, as proposed in
//! <https://github.com/BlockchainCommons/Research/issues/135>.
//!
//! The format reuses the PSBT map encoding from [`psbt_map`]:
//!
//! ```text
//! "desc" 0xff
//! <global map>      0x01 => name, 0x00 => descriptor
//! <key map>*        one map per key: 0x00 || extended key => fingerprint || path
//! ```
//!
//! Strings are UTF-8. The descriptor string is stored verbatim and never
//! checked for validity.

use psbt_map::ExtendedKey;

mod de;
mod ser;

pub use de::{Decoder, UnknownKeyPolicy, from_slice};
pub use ser::{to_vec, to_writer};

/// The magic bytes every serialized descriptor starts with.
pub const MAGIC: &[u8; 5] = b"desc\xff";

/// Global field type of the output descriptor string.
pub const GLOBAL_OUTPUT_DESCRIPTOR: u8 = 0x00;
/// Global field type of the descriptor's name.
pub const GLOBAL_NAME: u8 = 0x01;

/// Key record field type of an extended key, encoded like `PSBT_GLOBAL_XPUB`.
pub const KEY_XPUB: u8 = 0x00;

/// An output descriptor with its name and key origins.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct OutputDescriptor {
    /// A user-facing name, f.e. of the wallet.
    pub name: String,
    /// The output descriptor string.
    pub descriptor: String,
    /// The extended keys with their origins, in order.
    pub keys: Vec<ExtendedKey>,
}

#[cfg(test)]
mod tests;
