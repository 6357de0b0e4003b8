//! `klei ksh` - inspect shader bundles and extract their code

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use klei_formats::{ShaderBundle, TrailingNull};
use klei_formats::formats::shader::ShaderBlob;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::output;

/// Shader stage selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Stage {
    Vertex,
    Pixel,
}

/// Arguments for the ksh command
#[derive(Args)]
pub struct KshArgs {
    /// Input .ksh file
    pub file: PathBuf,

    /// Write one stage's code to stdout
    #[arg(long, value_enum, conflicts_with = "unpack")]
    pub extract: Option<Stage>,

    /// Write both stages' code to files named after the blobs
    #[arg(long)]
    pub unpack: bool,

    /// Destination directory for --unpack
    #[arg(long, default_value = ".")]
    pub dest: PathBuf,

    /// Replace existing files when unpacking
    #[arg(long)]
    pub overwrite: bool,

    /// Keep a trailing NUL on code buffers
    #[arg(long)]
    pub keep_trailing_null: bool,
}

/// Execute the ksh command
pub fn execute(args: KshArgs, config: &Config) -> Result<()> {
    let mut options = config.shader;
    if args.keep_trailing_null {
        options.trailing_null = TrailingNull::Keep;
    }

    let data = crate::read_input(&args.file)?;
    let bundle = ShaderBundle::decode_with(&data, &options)
        .with_context(|| format!("Failed to decode shader bundle: {}", args.file.display()))?;
    tracing::info!(
        "{}: {} parameters",
        bundle.name,
        bundle.parameters.len()
    );

    if let Some(stage) = args.extract {
        let blob = match stage {
            Stage::Vertex => &bundle.vertex_shader,
            Stage::Pixel => &bundle.pixel_shader,
        };
        return output::write_stdout(blob.code);
    }

    if args.unpack {
        for path in unpack(&bundle, &args.dest, args.overwrite)? {
            println!("{}", path.display());
        }
        return Ok(());
    }

    output::print_json(&bundle, config.output.pretty)
}

/// Write both stages' code into `dest`, one file per blob name.
pub fn unpack(bundle: &ShaderBundle<'_>, dest: &Path, overwrite: bool) -> Result<Vec<PathBuf>> {
    let targets = [
        target_path(&bundle.vertex_shader, dest)?,
        target_path(&bundle.pixel_shader, dest)?,
    ];

    // Check everything before writing anything
    if targets[0] == targets[1] {
        anyhow::bail!("Both shader stages are named {}", targets[0].display());
    }
    if !overwrite {
        for path in &targets {
            if path.exists() {
                anyhow::bail!(
                    "{} already exists (use --overwrite to replace it)",
                    path.display()
                );
            }
        }
    }

    std::fs::create_dir_all(dest)
        .with_context(|| format!("Failed to create directory: {}", dest.display()))?;
    for (blob, path) in [&bundle.vertex_shader, &bundle.pixel_shader]
        .into_iter()
        .zip(&targets)
    {
        std::fs::write(path, blob.code)
            .with_context(|| format!("Failed to write shader: {}", path.display()))?;
        tracing::debug!("Wrote {} bytes to {}", blob.code_len(), path.display());
    }
    Ok(targets.to_vec())
}

/// `dest` joined with the last component of the blob name.
fn target_path(blob: &ShaderBlob<'_>, dest: &Path) -> Result<PathBuf> {
    let name = blob
        .name
        .to_str()
        .with_context(|| format!("Shader name is not UTF-8: {}", blob.name))?;
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    if base.is_empty() || base == "." || base == ".." {
        anyhow::bail!("Shader name {name:?} has no usable file name");
    }
    Ok(dest.join(base))
}
