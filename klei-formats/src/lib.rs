//! Decoders for the binary containers of the Klei 2D engine
//!
//! - [`TextureContainer`]: KTEX textures with a mip chain
//! - [`AtlasFile`]: BILD sprite atlases (symbols, frames, vertices)
//! - [`AnimFile`]: ANIM skeletal animation clips
//! - [`ShaderBundle`]: KSH compiled shader bundles
//! - [`SaveEnvelope`]: the `KLEI     1` save envelope, the only format that
//!   is also written
//!
//! All multi-byte values are little-endian. Decoders take a byte slice and
//! borrow from it; nothing is read from disk here.

mod error;
pub mod formats;
mod options;
pub mod reader;
pub mod save;

pub use error::{FormatError, Result};
pub use formats::{
    AnimFile, Animation, AtlasFile, Facing, FacingMask, RgbaPassthrough, ShaderBundle,
    ShaderOptions, TexelDecoder, TextureContainer, TrailingNull,
};
pub use options::DecodeOptions;
pub use reader::{ByteStr, Reader};
pub use save::{Deflate, EnvelopeKind, SaveEnvelope, SaveOptions, Zlib};
