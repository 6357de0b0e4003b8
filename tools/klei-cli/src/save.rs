//! `klei save` - read and write save-game envelopes

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use klei_formats::save::{self as envelope, EnvelopeKind, SaveEnvelope};
use klei_formats::{Deflate, Zlib};
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::output;

/// Arguments for the save command
#[derive(Args)]
pub struct SaveArgs {
    #[command(subcommand)]
    pub command: SaveCommand,
}

#[derive(Subcommand)]
pub enum SaveCommand {
    /// Decode a save file and write its payload to stdout
    Read {
        /// Input save file
        file: PathBuf,

        /// Print only the table text, without the `return ` prefix
        #[arg(long)]
        table: bool,
    },

    /// Wrap a payload read from stdin into a save file
    Write {
        /// Output save file
        file: PathBuf,

        /// Write an encoded (compressed) envelope instead of plaintext
        #[arg(long)]
        compress: bool,

        /// zlib level for --compress, 0-10 (overrides config)
        #[arg(long)]
        level: Option<u8>,
    },
}

/// Execute the save command
pub fn execute(args: SaveArgs, config: &Config) -> Result<()> {
    match args.command {
        SaveCommand::Read { file, table } => {
            let payload = read_payload(&file, &config.save.compressor())?;
            if table {
                let text = envelope::table_source(&payload)
                    .with_context(|| format!("{} does not hold table text", file.display()))?;
                output::write_stdout(text.as_bytes())
            } else {
                output::write_stdout(&payload)
            }
        }
        SaveCommand::Write {
            file,
            compress,
            level,
        } => {
            let mut payload = Vec::new();
            std::io::stdin()
                .read_to_end(&mut payload)
                .context("Failed to read payload from stdin")?;

            let zlib = level.map_or_else(|| config.save.compressor(), Zlib::new);
            let kind = if compress {
                EnvelopeKind::Encoded
            } else {
                EnvelopeKind::Plain
            };
            write_payload(&file, &payload, kind, &zlib)
        }
    }
}

/// Decode the envelope at `path` and return its payload.
pub fn read_payload(path: &Path, compressor: &dyn Deflate) -> Result<Vec<u8>> {
    let data = crate::read_input(path)?;
    let save = SaveEnvelope::decode_with(&data, compressor)
        .with_context(|| format!("Failed to decode save file: {}", path.display()))?;
    tracing::info!(
        "{}: {:?} envelope, {} byte payload",
        path.display(),
        save.kind,
        save.payload.len()
    );
    Ok(save.into_payload())
}

/// Wrap `payload` and write it to `path`.
pub fn write_payload(
    path: &Path,
    payload: &[u8],
    kind: EnvelopeKind,
    compressor: &dyn Deflate,
) -> Result<()> {
    let bytes = envelope::encode_with(payload, kind, compressor);
    std::fs::write(path, &bytes)
        .with_context(|| format!("Failed to write save file: {}", path.display()))?;
    tracing::info!(
        "Wrote {:?} envelope ({} bytes) to {}",
        kind,
        bytes.len(),
        path.display()
    );
    Ok(())
}
