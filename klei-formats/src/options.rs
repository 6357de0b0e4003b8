//! Decode options shared by the grammars and the save codec

use serde::{Deserialize, Serialize};

use crate::formats::shader::ShaderOptions;
use crate::save::SaveOptions;

/// Every knob the decoders and encoders accept.
///
/// Deserializes from a TOML/JSON table with optional `shader` and `save`
/// sections; missing fields fall back to their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DecodeOptions {
    #[serde(default)]
    pub shader: ShaderOptions,
    #[serde(default)]
    pub save: SaveOptions,
}
