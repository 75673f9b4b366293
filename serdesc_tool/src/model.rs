//! Human-editable form of a serialized descriptor.
//!
//! Used as the JSON output of `decode` and the TOML or JSON input of `encode`.
//! Fingerprints are 8 hex digits, paths are written like `m/48'/0'/0'/2'`,
//! and keys are hex strings.

use anyhow::{Context as _, Result, bail, ensure};
use psbt_map::ExtendedKey;
use serde::{Deserialize, Serialize};
use serdesc::OutputDescriptor;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptorDoc {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub descriptor: String,
    #[serde(default)]
    pub keys: Vec<KeyDoc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyDoc {
    pub fingerprint: String,
    #[serde(default = "root_path")]
    pub path: String,
    pub key: String,
}

fn root_path() -> String {
    "m".to_owned()
}

impl From<&OutputDescriptor> for DescriptorDoc {
    fn from(value: &OutputDescriptor) -> Self {
        Self {
            name: value.name.clone(),
            descriptor: value.descriptor.clone(),
            keys: value.keys.iter().map(KeyDoc::from).collect(),
        }
    }
}

impl From<&ExtendedKey> for KeyDoc {
    fn from(value: &ExtendedKey) -> Self {
        Self {
            fingerprint: format!("{:08x}", value.master_fingerprint),
            path: format_path(&value.path),
            key: hex::encode(&value.key),
        }
    }
}

impl TryFrom<DescriptorDoc> for OutputDescriptor {
    type Error = anyhow::Error;

    fn try_from(value: DescriptorDoc) -> Result<Self> {
        let keys = value
            .keys
            .iter()
            .enumerate()
            .map(|(index, key)| {
                ExtendedKey::try_from(key).with_context(|| format!("invalid key #{index}"))
            })
            .collect::<Result<_>>()?;

        Ok(Self {
            name: value.name,
            descriptor: value.descriptor,
            keys,
        })
    }
}

impl TryFrom<&KeyDoc> for ExtendedKey {
    type Error = anyhow::Error;

    fn try_from(value: &KeyDoc) -> Result<Self> {
        Ok(Self {
            master_fingerprint: parse_fingerprint(&value.fingerprint)?,
            path: parse_path(&value.path)?,
            key: hex::decode(&value.key).context("key must be hex")?,
        })
    }
}

/// Parses a master fingerprint written as exactly 8 hex digits.
pub fn parse_fingerprint(text: &str) -> Result<u32> {
    ensure!(
        text.len() == 8 && text.bytes().all(|b| b.is_ascii_hexdigit()),
        "fingerprint must be 8 hex digits, got {text:?}"
    );

    Ok(u32::from_str_radix(text, 16)?)
}

/// Parses a derivation path such as `m/84'/0'/0'`.
///
/// The leading `m` is optional. Hardened steps are marked with `'`, `h` or
/// `H`.
pub fn parse_path(text: &str) -> Result<Vec<u32>> {
    let text = text.trim();
    let rest = match text.strip_prefix('m') {
        Some("") => return Ok(Vec::new()),
        Some(rest) => rest.strip_prefix('/').context("expected `/` after `m`")?,
        None if text.is_empty() => return Ok(Vec::new()),
        None => text,
    };

    rest.split('/').map(parse_step).collect()
}

fn parse_step(step: &str) -> Result<u32> {
    let (index, hardened) = match step.strip_suffix(['\'', 'h', 'H']) {
        Some(index) => (index, true),
        None => (step, false),
    };

    if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        bail!("invalid path step {step:?}");
    }

    let index: u32 = index
        .parse()
        .with_context(|| format!("path step {step:?} out of range"))?;
    ensure!(
        index < ExtendedKey::HARDENED,
        "path step {step:?} out of range"
    );

    Ok(if hardened {
        index | ExtendedKey::HARDENED
    } else {
        index
    })
}

/// Formats a derivation path, marking hardened steps with `'`.
pub fn format_path(path: &[u32]) -> String {
    use std::fmt::Write as _;

    let mut out = String::from("m");
    for &step in path {
        if ExtendedKey::is_hardened(step) {
            _ = write!(out, "/{}'", step & !ExtendedKey::HARDENED);
        } else {
            _ = write!(out, "/{step}");
        }
    }
    out
}
