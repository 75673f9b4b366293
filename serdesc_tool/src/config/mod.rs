use std::path::Path;

use anyhow::Result;
use serde::Deserialize;
use serdesc::UnknownKeyPolicy;

pub mod setup;

/// Prefix of environment variables that override configuration values.
pub const ENV_PREFIX: &str = "SERDESC";

/// Name of the optional configuration file in the working directory.
pub const LOCAL_CONFIG: &str = "serdesc_tool.toml";

#[derive(Debug, Deserialize)]
pub struct ToolConfig {
    #[serde(default)]
    pub decode: DecodeConfig,
    #[serde(default)]
    pub log: log4rs::config::RawConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct DecodeConfig {
    #[serde(default)]
    pub unknown_keys: UnknownKeys,
}

/// Configured handling of unknown key record fields.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownKeys {
    #[default]
    Skip,
    Reject,
}

impl From<UnknownKeys> for UnknownKeyPolicy {
    fn from(value: UnknownKeys) -> Self {
        match value {
            UnknownKeys::Skip => Self::Skip,
            UnknownKeys::Reject => Self::Reject,
        }
    }
}

impl DecodeConfig {
    pub fn decoder(&self) -> serdesc::Decoder {
        serdesc::Decoder::new().unknown_keys(self.unknown_keys.into())
    }
}

/// Loads the layered configuration.
///
/// From lowest to highest precedence: the built-in defaults,
/// [`LOCAL_CONFIG`] if it exists, the `extra` file, and `SERDESC__*`
/// environment variables.
pub fn load(extra: Option<&Path>) -> Result<ToolConfig> {
    use setup::{Builder, Env, File, TomlText};

    let default_config = include_str!("../../assets/default_config.toml");

    let mut builder = Builder::new()
        .add_layer(TomlText::new(default_config))
        .add_layer(File::new(LOCAL_CONFIG).required(false));

    if let Some(extra) = extra {
        builder = builder.add_layer(File::new(extra));
    }

    builder.add_layer(Env::with_prefix(ENV_PREFIX)).build()
}
