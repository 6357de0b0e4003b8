//! klei - inspector for Klei engine assets and save files
//!
//! # Commands
//!
//! - `klei tex` - print a KTEX header, or export a mip as PNG
//! - `klei build` - dump a BILD atlas as JSON
//! - `klei anim` - dump an ANIM file as JSON
//! - `klei ksh` - dump a KSH shader bundle, or extract its code
//! - `klei save read|write` - unwrap or wrap a save-game envelope
//!
//! # Usage
//!
//! ```bash
//! klei tex wilson.tex --mip 0 --image wilson.png
//! klei anim player_idle.anim --summary
//! klei ksh anim.ksh --unpack --dest shaders/
//! klei save read survival_1 > world.lua
//! klei save write survival_1 --compress < world.lua
//! ```
//!
//! Defaults come from `config.toml` in the platform config directory
//! (see [`config::config_dir`]) or the file given with `--config`.

mod config;
mod dump;
mod ksh;
mod output;
mod save;
mod tex;
mod texels;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// klei - inspector for Klei engine assets and save files
#[derive(Parser)]
#[command(name = "klei")]
#[command(about = "Inspect Klei engine assets and save files")]
#[command(version)]
struct Cli {
    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: config.toml in the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect a KTEX texture
    Tex(tex::TexArgs),

    /// Dump a BILD sprite atlas
    Build(dump::DumpArgs),

    /// Dump an ANIM animation file
    Anim(dump::DumpArgs),

    /// Inspect a KSH shader bundle
    Ksh(ksh::KshArgs),

    /// Read or write a save-game envelope
    Save(save::SaveArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Tex(args) => tex::execute(args, &config),
        Commands::Build(args) => dump::execute_build(args, &config),
        Commands::Anim(args) => dump::execute_anim(args, &config),
        Commands::Ksh(args) => ksh::execute(args, &config),
        Commands::Save(args) => save::execute(args, &config),
    }
}

/// Read a whole input file.
pub(crate) fn read_input(path: &Path) -> Result<Vec<u8>> {
    let data =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    tracing::debug!("Read {} bytes from {}", data.len(), path.display());
    Ok(data)
}
