//! `klei build` and `klei anim` - dump atlas and animation files as JSON

use anyhow::{Context, Result};
use clap::Args;
use klei_formats::{AnimFile, AtlasFile};
use std::path::PathBuf;

use crate::config::Config;
use crate::output;

/// Arguments for the build and anim commands
#[derive(Args)]
pub struct DumpArgs {
    /// Input file
    pub file: PathBuf,

    /// Print one line per clip (anim) or symbol (build) instead of JSON
    #[arg(short, long)]
    pub summary: bool,
}

/// Execute the build command
pub fn execute_build(args: DumpArgs, config: &Config) -> Result<()> {
    let data = crate::read_input(&args.file)?;
    let atlas = AtlasFile::decode(&data)
        .with_context(|| format!("Failed to decode atlas: {}", args.file.display()))?;
    tracing::info!(
        "{}: {} symbols, {} vertices",
        atlas.build_name,
        atlas.symbols.len(),
        atlas.vertices.len()
    );

    if args.summary {
        for line in atlas_summary(&atlas) {
            println!("{line}");
        }
        return Ok(());
    }
    output::print_json(&atlas, config.output.pretty)
}

/// Execute the anim command
pub fn execute_anim(args: DumpArgs, config: &Config) -> Result<()> {
    let data = crate::read_input(&args.file)?;
    let anim = AnimFile::decode(&data)
        .with_context(|| format!("Failed to decode animation: {}", args.file.display()))?;
    tracing::info!("{}: {} animations", args.file.display(), anim.animations.len());

    if args.summary {
        for line in anim_summary(&anim) {
            println!("{line}");
        }
        return Ok(());
    }
    output::print_json(&anim, config.output.pretty)
}

fn atlas_summary(atlas: &AtlasFile<'_>) -> Vec<String> {
    atlas
        .symbols
        .iter()
        .map(|symbol| {
            let name = atlas
                .symbol_name(symbol.hash)
                .map(|s| s.to_string())
                .unwrap_or_else(|| format!("{:#010x}", symbol.hash));
            format!("{name}: {} frames", symbol.frames.len())
        })
        .collect()
}

fn anim_summary(anim: &AnimFile<'_>) -> Vec<String> {
    anim.animations
        .iter()
        .map(|clip| {
            format!(
                "{}: {} frames @ {} fps, facing {}",
                clip.name,
                clip.frames.len(),
                clip.frame_rate,
                clip.facing.describe()
            )
        })
        .collect()
}
