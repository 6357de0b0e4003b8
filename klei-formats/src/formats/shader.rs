//! KSH compiled shader bundle
//!
//! # Layout
//! ```text
//! effect_name string
//! parameter_count u32, parameter_count × Parameter {
//!     name string
//!     secondary string
//!     flags u32
//!     values_per_item u32
//!     if flags ∉ [42, 45]:
//!         default_count u32, default_count × f32
//! }
//! vertex shader { name string, code string }
//! pixel shader  { name string, code string }
//! vertex_uniform_count u32, vertex_uniform_count × u32
//! pixel_uniform_count u32,  pixel_uniform_count × u32
//! ```
//! There is no magic; the file starts directly with the effect name.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::reader::{ByteStr, Reader};

/// Parameters whose flags fall in this range carry no default values.
pub const NO_DEFAULTS_FLAGS: RangeInclusive<u32> = 42..=45;

/// How shader code buffers treat a trailing NUL byte.
///
/// Some bundles append one NUL to each code buffer, others never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailingNull {
    /// Drop a single trailing NUL when present.
    #[default]
    Strip,
    /// Take the code buffer verbatim.
    Keep,
}

/// Options for decoding shader bundles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShaderOptions {
    #[serde(default)]
    pub trailing_null: TrailingNull,
}

/// One uniform parameter descriptor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShaderParameter<'a> {
    pub name: ByteStr<'a>,
    pub secondary: ByteStr<'a>,
    pub flags: u32,
    pub values_per_item: u32,
    /// `None` when the flags gate excludes defaults; `Some(vec![])` when the
    /// gate admits them but none are stored.
    pub defaults: Option<Vec<f32>>,
}

impl<'a> ShaderParameter<'a> {
    fn read(reader: &mut Reader<'a>) -> Result<Self> {
        let name = reader.read_string()?;
        let secondary = reader.read_string()?;
        let flags = reader.read_u32()?;
        let values_per_item = reader.read_u32()?;
        let defaults = if has_defaults(flags) {
            Some(reader.read_list(|r| r.read_f32())?)
        } else {
            None
        };
        Ok(Self {
            name,
            secondary,
            flags,
            values_per_item,
            defaults,
        })
    }
}

/// Whether a parameter with these flags stores a default-value array.
pub fn has_defaults(flags: u32) -> bool {
    !NO_DEFAULTS_FLAGS.contains(&flags)
}

/// Vertex or pixel shader source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShaderBlob<'a> {
    pub name: ByteStr<'a>,
    #[serde(skip)]
    pub code: &'a [u8],
    /// Whether a trailing NUL was removed from `code`.
    pub stripped_null: bool,
}

impl<'a> ShaderBlob<'a> {
    fn read(reader: &mut Reader<'a>, options: &ShaderOptions) -> Result<Self> {
        let name = reader.read_string()?;
        let raw = reader.read_string()?.as_bytes();
        let (code, stripped_null) = match (options.trailing_null, raw.split_last()) {
            (TrailingNull::Strip, Some((0, rest))) => (rest, true),
            _ => (raw, false),
        };
        Ok(Self {
            name,
            code,
            stripped_null,
        })
    }

    pub fn code_len(&self) -> usize {
        self.code.len()
    }

    pub fn code_str(&self) -> Option<&'a str> {
        std::str::from_utf8(self.code).ok()
    }
}

/// Uniform slot bindings for both stages.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct UniformProgram {
    pub vertex_uniforms: Vec<u32>,
    pub pixel_uniforms: Vec<u32>,
}

impl UniformProgram {
    fn read(reader: &mut Reader<'_>) -> Result<Self> {
        let vertex_uniforms = reader.read_list(|r| r.read_u32())?;
        let pixel_uniforms = reader.read_list(|r| r.read_u32())?;
        Ok(Self {
            vertex_uniforms,
            pixel_uniforms,
        })
    }
}

/// A decoded KSH file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShaderBundle<'a> {
    pub name: ByteStr<'a>,
    pub parameters: Vec<ShaderParameter<'a>>,
    pub vertex_shader: ShaderBlob<'a>,
    pub pixel_shader: ShaderBlob<'a>,
    pub program: UniformProgram,
}

impl<'a> ShaderBundle<'a> {
    pub fn decode(data: &'a [u8]) -> Result<Self> {
        Self::decode_with(data, &ShaderOptions::default())
    }

    pub fn decode_with(data: &'a [u8], options: &ShaderOptions) -> Result<Self> {
        let mut reader = Reader::new(data);
        let name = reader.read_string()?;
        tracing::debug!(%name, ?options, "decoding KSH");

        let parameters = reader.read_list(ShaderParameter::read)?;
        let vertex_shader = ShaderBlob::read(&mut reader, options)?;
        let pixel_shader = ShaderBlob::read(&mut reader, options)?;
        let program = UniformProgram::read(&mut reader)?;

        tracing::trace!(
            parameters = parameters.len(),
            vertex_code = vertex_shader.code.len(),
            pixel_code = pixel_shader.code.len(),
            "KSH decoded"
        );

        Ok(Self {
            name,
            parameters,
            vertex_shader,
            pixel_shader,
            program,
        })
    }

    pub fn parameter(&self, name: &[u8]) -> Option<&ShaderParameter<'a>> {
        self.parameters.iter().find(|p| p.name.as_bytes() == name)
    }
}
