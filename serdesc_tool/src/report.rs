use log::Level;
use psbt_map::{Collector, Field, MapPos};

/// Logs every field a decoder reports.
///
/// Unknown fields are logged at a configurable level since they are expected
/// in PSBT input and output maps but unusual in descriptors.
#[derive(Debug)]
pub struct LogCollector {
    unknown_level: Level,
    unknown: usize,
}

impl LogCollector {
    pub fn new(unknown_level: Level) -> Self {
        Self {
            unknown_level,
            unknown: 0,
        }
    }

    /// The number of unknown fields reported so far.
    pub fn unknown(&self) -> usize {
        self.unknown
    }
}

impl<'a> Collector<'a> for LogCollector {
    fn collect(&mut self, map: MapPos, field: Field<'a>) {
        match field {
            Field::UnsignedTx(tx) => {
                log::info!("{map}: unsigned transaction, {} bytes: {}", tx.len(), hex::encode(tx));
            },
            Field::Unknown(entry) => {
                self.unknown += 1;
                log::log!(
                    self.unknown_level,
                    "{map}: field type {:#04x}, key data {:?}, value {:?}",
                    entry.key_type(),
                    hex::encode(entry.key_data()),
                    hex::encode(entry.value),
                );
            },
        }
    }
}
