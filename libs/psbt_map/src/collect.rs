//! Receiving fields while an envelope is decoded.
//!
//! Decoders don't print or log anything. Instead, they hand every field they
//! don't consume themselves to a [`Collector`] supplied by the caller, which
//! may log, store, or ignore them.

use crate::entry::Entry;
use crate::error::MapPos;

/// A field reported by a decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field<'a> {
    /// `PSBT_GLOBAL_UNSIGNED_TX`. The serialized transaction, not parsed.
    UnsignedTx(&'a [u8]),
    /// An entry whose field type the decoder doesn't handle.
    Unknown(Entry<'a>),
}

/// Receives fields from a decoder.
///
/// Implemented for closures, [`Vec`] and [`Ignore`].
pub trait Collector<'a> {
    /// Called once per field, in input order.
    fn collect(&mut self, map: MapPos, field: Field<'a>);
}

impl<'a, F> Collector<'a> for F
where
    F: FnMut(MapPos, Field<'a>),
{
    fn collect(&mut self, map: MapPos, field: Field<'a>) {
        self(map, field);
    }
}

impl<'a> Collector<'a> for Vec<(MapPos, Field<'a>)> {
    fn collect(&mut self, map: MapPos, field: Field<'a>) {
        self.push((map, field));
    }
}

/// A [`Collector`] that drops every field.
#[derive(Debug, Default, Clone, Copy)]
pub struct Ignore;

impl<'a> Collector<'a> for Ignore {
    fn collect(&mut self, map: MapPos, field: Field<'a>) {
        _ = (map, field);
    }
}
