//! # BIP-174 key/value maps
//!
//! Decoding and encoding of the length-prefixed key/value maps that make up
//! Partially Signed Bitcoin Transactions ([BIP-174]), and a restricted PSBT
//! decoder built on them.
//!
//! The building blocks, leaf first:
//!
//! - [`varint`]: Bitcoin's compact variable-length integers.
//! - [`entry`]: `varint(len(key)) key varint(len(value)) value` records.
//! - [`map`]: entries ended by a single `0x00` byte.
//! - [`xpub`]: values in the shape of `PSBT_GLOBAL_XPUB`, a master fingerprint
//!   followed by a derivation path.
//! - [`psbt`]: the PSBT envelope, magic bytes followed by maps.
//!
//! Nothing here interprets transactions, scripts, or keys, and nothing holds
//! state across calls. Decoders borrow from their input and never read past
//! the lengths it declares.
//!
//! [BIP-174]: <https://github.com/bitcoin/bips/blob/master/bip-0174.mediawiki>

pub mod collect;
pub mod entry;
mod error;
pub mod map;
pub mod psbt;
mod read;
pub mod varint;
pub mod xpub;

pub use collect::{Collector, Field, Ignore};
pub use entry::{Entry, Record, decode_entry, write_entry};
pub use error::{Error, ErrorKind, Location, MapPos, Result};
pub use map::{decode_map, map_to_vec, write_map};
pub use xpub::{ExtendedKey, decode_extended_key};
