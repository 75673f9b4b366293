use std::fs;
use std::io::{self, Read as _, Write as _};
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, bail};
use clap::{Parser, Subcommand};
use psbt_map::MapPos;
use serdesc::OutputDescriptor;

mod build;
mod config;
mod model;
mod report;

use build::{GIT_HASH, VERSION};
use config::ToolConfig;
use model::DescriptorDoc;
use report::LogCollector;

/// Inspects, decodes and encodes PSBTs and serialized output descriptors.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// An additional configuration file.
    ///
    /// Takes precedence over `serdesc_tool.toml` in the working directory but
    /// not over `SERDESC__*` environment variables.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Logs the structure of a PSBT or serialized descriptor.
    ///
    /// The format is detected from the magic bytes.
    Inspect {
        /// The input file, or `-` for stdin.
        input: PathBuf,

        /// Read the input as a hex string.
        #[arg(long)]
        hex: bool,
    },

    /// Decodes a serialized descriptor and prints it as JSON.
    Decode {
        /// The input file, or `-` for stdin.
        input: PathBuf,

        /// Read the input as a hex string.
        #[arg(long)]
        hex: bool,

        /// Print the JSON on a single line.
        #[arg(long)]
        compact: bool,
    },

    /// Encodes a descriptor document into a serialized descriptor.
    ///
    /// The document is JSON if the file name ends in `.json` and TOML
    /// otherwise.
    Encode {
        /// The document file, or `-` for TOML on stdin.
        input: PathBuf,

        /// The output file. Defaults to stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Write the output as a hex string.
        #[arg(long)]
        hex: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load(cli.config.as_deref())?;
    init_logging(&config.log)?;

    log::debug!("serdesc_tool v{VERSION} - {GIT_HASH}");

    let res = run(cli.command, &config);
    if let Err(why) = &res {
        log::error!("Exiting due to error: {why:?}");
    }

    log::logger().flush();
    res
}

fn run(command: Command, config: &ToolConfig) -> Result<()> {
    match command {
        Command::Inspect { input, hex } => {
            let data = read_input(&input, hex)?;
            inspect(&data, config)
        },
        Command::Decode {
            input,
            hex,
            compact,
        } => {
            let data = read_input(&input, hex)?;
            let desc = config
                .decode
                .decoder()
                .decode(&data, &mut LogCollector::new(log::Level::Warn))
                .with_context(|| format!("cannot decode descriptor {input:?}"))?;

            let doc = DescriptorDoc::from(&desc);
            let mut stdout = io::stdout().lock();
            if compact {
                serde_json::to_writer(&mut stdout, &doc)?;
            } else {
                serde_json::to_writer_pretty(&mut stdout, &doc)?;
            }

            writeln!(stdout)?;
            Ok(())
        },
        Command::Encode { input, out, hex } => {
            let desc = read_document(&input)?;
            let mut data = serdesc::to_vec(&desc)?;
            if hex {
                data = hex::encode(&data).into_bytes();
                data.push(b'\n');
            }

            match out {
                Some(out) => fs::write(&out, &data)
                    .with_context(|| format!("cannot write output {out:?}"))?,
                None => io::stdout().lock().write_all(&data)?,
            }

            log::info!("Encoded {} key(s) from {input:?}", desc.keys.len());
            Ok(())
        },
    }
}

fn inspect(data: &[u8], config: &ToolConfig) -> Result<()> {
    if data.starts_with(psbt_map::psbt::MAGIC) {
        let mut collector = LogCollector::new(log::Level::Info);
        let psbt = psbt_map::psbt::decode(data, &mut collector).context("cannot decode PSBT")?;

        log::info!(
            "PSBT: {} global field(s), {} further map(s), {} field(s) not interpreted",
            psbt.global.len(),
            psbt.maps.len(),
            collector.unknown(),
        );

        for (index, xpub) in psbt.global_xpubs()?.iter().enumerate() {
            log::info!("{}: xpub #{index} {}", MapPos::Global, key_line(xpub));
        }
    } else if data.starts_with(serdesc::MAGIC) {
        let mut collector = LogCollector::new(log::Level::Warn);
        let desc = config
            .decode
            .decoder()
            .decode(data, &mut collector)
            .context("cannot decode descriptor")?;

        log_descriptor(&desc);
        if collector.unknown() != 0 {
            log::warn!("{} unknown field(s) skipped", collector.unknown());
        }
    } else {
        bail!("input is neither a PSBT nor a serialized descriptor");
    }

    Ok(())
}

fn log_descriptor(desc: &OutputDescriptor) {
    log::info!("Name: {:?}", desc.name);
    log::info!("Descriptor: {}", desc.descriptor);
    for line in key_lines(desc) {
        log::info!("{line}");
    }
}

/// Describes every key of a descriptor.
///
/// Keys are numbered in order, which is also their `@N` index in the
/// descriptor. A key record may hold several keys, so this is not the map.
fn key_lines(desc: &OutputDescriptor) -> Vec<String> {
    desc.keys
        .iter()
        .enumerate()
        .map(|(index, key)| format!("key #{index} {}", key_line(key)))
        .collect()
}

fn key_line(key: &psbt_map::ExtendedKey) -> String {
    let key = model::KeyDoc::from(key);
    format!("[{}/{}] {}", key.fingerprint, key.path, key.key)
}

fn read_input(path: &Path, hex: bool) -> Result<Vec<u8>> {
    let data = if path == Path::new("-") {
        let mut data = Vec::new();
        io::stdin().lock().read_to_end(&mut data)?;
        data
    } else {
        fs::read(path).with_context(|| format!("cannot read input {path:?}"))?
    };

    if hex {
        return decode_hex_input(&data);
    }

    Ok(data)
}

/// Decodes hex text, ignoring surrounding whitespace.
fn decode_hex_input(data: &[u8]) -> Result<Vec<u8>> {
    let text = str::from_utf8(data).context("hex input must be utf-8")?;
    hex::decode(text.trim()).context("input is not valid hex")
}

fn read_document(path: &Path) -> Result<OutputDescriptor> {
    let (text, is_json) = if path == Path::new("-") {
        let mut text = String::new();
        io::stdin().lock().read_to_string(&mut text)?;
        (text, false)
    } else {
        let text = fs::read_to_string(path)
            .with_context(|| format!("cannot read document {path:?}"))?;
        (text, path.extension().is_some_and(|e| e == "json"))
    };

    let doc: DescriptorDoc = if is_json {
        serde_json::from_str(&text).context("invalid JSON document")?
    } else {
        toml::from_str(&text).context("invalid TOML document")?
    };

    OutputDescriptor::try_from(doc)
}

fn init_logging(config: &log4rs::config::RawConfig) -> Result<()> {
    let deserializers = log4rs::config::Deserializers::default();
    let (appenders, errors) = config.appenders_lossy(&deserializers);
    if !errors.is_empty() {
        return Err(errors.into());
    }

    let config = log4rs::Config::builder()
        .appenders(appenders)
        .loggers(config.loggers())
        .build(config.root())?;

    log4rs::init_config(config)?;
    Ok(())
}
