//! Read-only grammars for the Klei asset containers
//!
//! Each grammar decodes a whole buffer into a record tree that borrows its
//! strings and payloads from the input. Decoding either fully succeeds or
//! fails with the first [`FormatError`](crate::FormatError).

pub mod anim;
pub mod build;
pub mod shader;
mod strings;
pub mod texture;

pub use anim::{AnimFile, Animation, Facing, FacingMask};
pub use build::AtlasFile;
pub use shader::{ShaderBundle, ShaderOptions, TrailingNull};
pub use strings::{HashedString, lookup};
pub use texture::{RgbaPassthrough, TexelDecoder, TextureContainer};
