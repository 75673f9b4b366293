use std::path::{Path, PathBuf};
use std::{env, fs, io};

use anyhow::{Context as _, Result};
use serde::de::DeserializeOwned;
use smallvec::SmallVec;
use toml::map::Entry;
use toml::{Table, Value};

/// Provides a layered builder for deserializing configuration files.
#[must_use]
pub struct Builder {
    table: Result<Table>,
}

impl Builder {
    /// Creates a new empty builder.
    pub fn new() -> Self {
        Self {
            table: Ok(Table::new()),
        }
    }

    /// Adds a layer of configuration.
    ///
    /// Layers added later take precedence over earlier ones.
    pub fn add_layer<L: Layer>(mut self, source: L) -> Self {
        self.table = self.table.and_then(|mut t| {
            source.extend_table(&mut t)?;
            Ok(t)
        });
        self
    }

    /// Deserializes the configuration from the provided layers.
    pub fn build<T>(self) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.table.and_then(deserialize_table)
    }
}

/// A configuration layer.
pub trait Layer {
    /// Extends a TOML table by this layer.
    fn extend_table(&self, table: &mut Table) -> Result<()>;
}

/// A TOML file configuration layer.
#[must_use]
pub struct File {
    path: PathBuf,
    required: bool,
}

impl File {
    /// Creates a new layer, loading TOML from the file at the given path.
    ///
    /// The file is required by default.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            required: true,
        }
    }

    /// Sets whether the file is required.
    ///
    /// A missing optional file is treated as empty.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

/// A TOML text configuration layer.
#[must_use]
pub struct TomlText<'a> {
    text: &'a str,
}

impl<'a> TomlText<'a> {
    /// Creates a new layer, parsing the text as TOML.
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }
}

/// An environment variable configuration layer.
///
/// Only variables whose name starts with the prefix followed by `__` are
/// loaded, with the prefix removed and the rest lowercased. Nested values are
/// separated by `__` as well, so with the prefix `SERDESC`, the variable
/// `SERDESC__DECODE__UNKNOWN_KEYS` refers to `decode.unknown_keys`.
///
/// All values are treated as strings.
#[must_use]
pub struct Env {
    prefix: String,
}

impl Env {
    /// Creates a new layer for variables with the given prefix.
    pub fn with_prefix(prefix: &str) -> Self {
        let mut prefix = prefix.to_ascii_lowercase();
        prefix.push_str("__");
        Self { prefix }
    }

    fn extend_from<I>(&self, table: &mut Table, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (mut key, value) in vars {
            key.make_ascii_lowercase();
            let Some(key) = key.strip_prefix(&self.prefix) else {
                continue;
            };

            let segments = key.split("__").collect::<SmallVec<[&str; 8]>>();
            if segments.iter().any(|s| s.is_empty()) {
                log::warn!("Ignoring malformed config variable `{}{key}`", self.prefix);
                continue;
            }

            insert_at(table, &segments, Value::String(value));
        }
    }
}

impl Layer for File {
    fn extend_table(&self, table: &mut Table) -> Result<()> {
        let file = match fs::read_to_string(&self.path) {
            Ok(content) => deserialize_str_to_table(&content)
                .with_context(|| format!("failed to load config {:?}", self.path))?,
            Err(why) => {
                if !self.required && why.kind() == io::ErrorKind::NotFound {
                    return Ok(());
                }

                return Err(why).context(format!("cannot read required config {:?}", self.path));
            },
        };

        merge_tables(table, file);
        Ok(())
    }
}

impl Layer for TomlText<'_> {
    fn extend_table(&self, table: &mut Table) -> Result<()> {
        let toml = deserialize_str_to_table(self.text).context("toml str literal invalid")?;
        merge_tables(table, toml);
        Ok(())
    }
}

impl Layer for Env {
    fn extend_table(&self, table: &mut Table) -> Result<()> {
        // names that aren't utf-8 can't match the prefix anyways
        let vars = env::vars_os().filter_map(|(key, value)| {
            let key = key.into_string().ok()?;
            let value = value
                .into_string()
                .unwrap_or_else(|o| o.to_string_lossy().into_owned());
            Some((key, value))
        });

        self.extend_from(table, vars);
        Ok(())
    }
}

fn deserialize_str_to_table(text: &str) -> Result<Table> {
    toml::from_str(text).context("config toml is invalid")
}

fn deserialize_table<T>(table: Table) -> Result<T>
where
    T: DeserializeOwned,
{
    T::deserialize(table).context("cannot deserialize config")
}

fn merge_tables(target: &mut Table, consume: Table) {
    for (key, value) in consume {
        match target.entry(key) {
            Entry::Vacant(entry) => _ = entry.insert(value),
            Entry::Occupied(mut entry) => match (entry.get_mut(), value) {
                (Value::Table(a), Value::Table(b)) => merge_tables(a, b),
                (a, b) => *a = b,
            },
        }
    }
}

fn insert_at(table: &mut Table, path: &[&str], value: Value) {
    let [first, path @ ..] = path else {
        return;
    };

    match table.entry(*first) {
        Entry::Vacant(entry) => _ = entry.insert(nested_value(path, value)),
        Entry::Occupied(mut entry) => match entry.get_mut() {
            Value::Table(table) if !path.is_empty() => insert_at(table, path, value),
            entry => *entry = nested_value(path, value),
        },
    }
}

fn nested_value(path: &[&str], value: Value) -> Value {
    path.iter().rev().fold(value, |inner, &segment| {
        let mut table = Table::new();
        table.insert(segment.to_owned(), inner);
        Value::Table(table)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|&(k, v)| (k.to_owned(), v.to_owned()))
            .collect()
    }

    #[test]
    fn later_layers_win() {
        let table: Table = Builder::new()
            .add_layer(TomlText::new("[decode]\nunknown_keys = \"skip\"\nother = 1"))
            .add_layer(TomlText::new("[decode]\nunknown_keys = \"reject\""))
            .build()
            .expect("valid toml");

        let decode = table["decode"].as_table().expect("decode is a table");
        assert_eq!(decode["unknown_keys"].as_str(), Some("reject"), "later layer must win");
        assert_eq!(decode["other"].as_integer(), Some(1), "tables are merged");
    }

    #[test]
    fn env_prefix_and_nesting() {
        let mut table = Table::new();
        Env::with_prefix("SERDESC").extend_from(
            &mut table,
            vars(&[
                ("SERDESC__DECODE__UNKNOWN_KEYS", "reject"),
                ("SERDESC__LOG__ROOT__LEVEL", "debug"),
                ("PATH", "/usr/bin"),
                ("SERDESCX__DECODE", "nope"),
                ("SERDESC__DECODE____X", "nope"),
            ]),
        );

        let expected: Table = toml::from_str(
            "[decode]\nunknown_keys = \"reject\"\n[log.root]\nlevel = \"debug\"",
        )
        .expect("valid toml");
        assert_eq!(table, expected, "only prefixed variables are loaded");
    }

    #[test]
    fn env_overrides_file_values() {
        let mut table: Table = toml::from_str("[decode]\nunknown_keys = \"skip\"\ncolor = true")
            .expect("valid toml");
        Env::with_prefix("SERDESC")
            .extend_from(&mut table, vars(&[("serdesc__decode__unknown_keys", "reject")]));

        let decode = table["decode"].as_table().expect("decode is a table");
        assert_eq!(decode["unknown_keys"].as_str(), Some("reject"), "env must win");
        assert_eq!(decode["color"].as_bool(), Some(true), "other keys are kept");
    }

    #[test]
    fn missing_optional_file() {
        let table: Table = Builder::new()
            .add_layer(File::new("does/not/exist.toml").required(false))
            .build()
            .expect("optional file may be missing");
        assert!(table.is_empty(), "missing file adds nothing");

        let err = Builder::new()
            .add_layer(File::new("does/not/exist.toml"))
            .build::<Table>()
            .expect_err("required file must exist");
        assert!(err.to_string().contains("cannot read required config"), "{err}");
    }
}
