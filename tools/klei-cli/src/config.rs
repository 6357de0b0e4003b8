//! Configuration management (config.toml)
//!
//! Decode defaults and output preferences, stored as TOML in the
//! platform-specific config directory or passed with `--config`.

use anyhow::{Context, Result};
use klei_formats::{DecodeOptions, SaveOptions, ShaderOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Shader bundle decoding
    #[serde(default)]
    pub shader: ShaderOptions,
    /// Save envelope encoding
    #[serde(default)]
    pub save: SaveOptions,
    /// JSON output
    #[serde(default)]
    pub output: OutputConfig,
}

/// JSON output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Indent JSON output (default: true)
    #[serde(default = "default_true")]
    pub pretty: bool,
}

fn default_true() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: default_true(),
        }
    }
}

impl Config {
    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            shader: self.shader,
            save: self.save,
        }
    }
}

/// Returns the platform-specific configuration directory.
///
/// On Linux: `~/.config/klei-formats`
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.github", "klei-tools", "klei-formats")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Loads the configuration.
///
/// With an explicit path the file must exist. Otherwise `config.toml` is read
/// from [`config_dir`], and a missing file yields defaults. A file that exists
/// but does not parse is always an error.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let (path, explicit) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => match config_dir() {
            Some(dir) => (dir.join("config.toml"), false),
            None => return Ok(Config::default()),
        },
    };

    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && !explicit => {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Config::default());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read config: {}", path.display()));
        }
    };

    let config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.display()))?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(config)
}
