//! Encoding of serialized descriptors.

use std::io;

use psbt_map::{Entry, write_map};

use crate::{GLOBAL_NAME, GLOBAL_OUTPUT_DESCRIPTOR, KEY_XPUB, MAGIC, OutputDescriptor};

/// Encodes a descriptor to a [`Vec<u8>`].
///
/// The buffer is allocated once, sized from the descriptor's fields.
///
/// # Errors
///
/// Writing to a [`Vec`] does not fail. The [`Result`] mirrors [`to_writer`].
pub fn to_vec(desc: &OutputDescriptor) -> io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(capacity_hint(desc));
    to_writer(&mut buf, desc)?;
    Ok(buf)
}

/// Encodes a descriptor to a [`io::Write`].
///
/// The global map always holds the name first and the descriptor second, even
/// if either is empty. Every key is written as its own single-entry map.
///
/// # Errors
///
/// Returns an error if the writer fails.
pub fn to_writer<W: io::Write>(mut writer: W, desc: &OutputDescriptor) -> io::Result<()> {
    writer.write_all(MAGIC)?;

    let global = [
        Entry::new(&[GLOBAL_NAME], desc.name.as_bytes()),
        Entry::new(&[GLOBAL_OUTPUT_DESCRIPTOR], desc.descriptor.as_bytes()),
    ];
    write_map(&mut writer, &global)?;

    for key in &desc.keys {
        let key_bytes = key.key_bytes(KEY_XPUB);
        let value = key.value_bytes();
        write_map(&mut writer, &[Entry::new(&key_bytes, &value)])?;
    }

    Ok(())
}

fn capacity_hint(desc: &OutputDescriptor) -> usize {
    let global = Entry::new(&[GLOBAL_NAME], desc.name.as_bytes()).encoded_len()
        + Entry::new(&[GLOBAL_OUTPUT_DESCRIPTOR], desc.descriptor.as_bytes()).encoded_len()
        + 1;

    // upper bound per key: two 9-byte length prefixes, the field type, and the terminator
    let keys: usize = desc
        .keys
        .iter()
        .map(|k| 9 + 1 + k.key.len() + 9 + k.value_len() + 1)
        .sum();

    MAGIC.len() + global + keys
}
