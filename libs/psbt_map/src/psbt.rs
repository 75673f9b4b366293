//! Restricted PSBT decoding.
//!
//! This only splits a PSBT into its maps and reports their fields. It does not
//! parse the transaction, nor does it know how many input and output maps the
//! transaction declares: it keeps reading maps until the input runs out.

use crate::collect::{Collector, Field};
use crate::entry::Entry;
use crate::error::{MapPos, Result};
use crate::map::read_map;
use crate::read::SliceRead;
use crate::xpub::{ExtendedKey, decode_extended_key};

/// The magic bytes every PSBT starts with: `psbt` and a `0xff` separator.
pub const MAGIC: &[u8; 5] = b"psbt\xff";

/// Field type of the unsigned transaction within the global map.
pub const PSBT_GLOBAL_UNSIGNED_TX: u8 = 0x00;
/// Field type of an extended public key within the global map.
pub const PSBT_GLOBAL_XPUB: u8 = 0x01;

/// The maps of a PSBT, borrowing from the input.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RawPsbt<'a> {
    /// The global map.
    pub global: Vec<Entry<'a>>,
    /// The input and output maps, in input order.
    pub maps: Vec<Vec<Entry<'a>>>,
}

impl RawPsbt<'_> {
    /// The unsigned transaction, if present.
    ///
    /// If the field is repeated, returns the first one.
    pub fn unsigned_tx(&self) -> Option<&[u8]> {
        self.global
            .iter()
            .find(|e| e.key_type() == PSBT_GLOBAL_UNSIGNED_TX)
            .map(|e| e.value)
    }

    /// Decodes all `PSBT_GLOBAL_XPUB` fields in the global map.
    ///
    /// # Errors
    ///
    /// Returns the first invalid record, located within the global map.
    pub fn global_xpubs(&self) -> Result<Vec<ExtendedKey>> {
        self.global
            .iter()
            .enumerate()
            .filter(|(_, e)| e.key_type() == PSBT_GLOBAL_XPUB)
            .map(|(index, e)| {
                decode_extended_key(e).map_err(|err| err.at_entry(index).in_map(MapPos::Global))
            })
            .collect()
    }
}

/// Decodes a PSBT from a byte slice.
///
/// The global unsigned transaction is reported as [`Field::UnsignedTx`], every
/// other field as [`Field::Unknown`], each with the map it came from. Fields
/// are reported as each map is decoded, so a collector may have seen fields of
/// earlier maps when a later one fails.
///
/// # Errors
///
/// Returns [`MalformedMagic`] if the input doesn't start with [`MAGIC`] and
/// otherwise the first map error, located at its map and entry.
///
/// [`MalformedMagic`]: crate::ErrorKind::MalformedMagic
pub fn decode<'a, C>(buf: &'a [u8], collector: &mut C) -> Result<RawPsbt<'a>>
where
    C: Collector<'a> + ?Sized,
{
    let mut read = SliceRead::new(buf);
    read.read_magic(MAGIC)?;

    let global = read_map(&mut read).map_err(|e| e.in_map(MapPos::Global))?;
    for entry in &global {
        let field = match entry.key_type() {
            PSBT_GLOBAL_UNSIGNED_TX => Field::UnsignedTx(entry.value),
            _ => Field::Unknown(*entry),
        };

        collector.collect(MapPos::Global, field);
    }

    let mut maps = Vec::new();
    while !read.is_empty() {
        let pos = MapPos::Section(maps.len());
        let map = read_map(&mut read).map_err(|e| e.in_map(pos))?;
        for entry in &map {
            collector.collect(pos, Field::Unknown(*entry));
        }

        maps.push(map);
    }

    Ok(RawPsbt { global, maps })
}
