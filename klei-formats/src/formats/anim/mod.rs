//! ANIM skeletal animation format
//!
//! # Layout
//! ```text
//! magic "ANIM", version u32 (= 4)
//! element_count u32, frame_count u32, event_count u32   (totals)
//! animation_count u32
//! animation_count × Animation {
//!     name string
//!     facing u8
//!     root_symbol u32
//!     frame_rate f32
//!     frame_count u32, frame_count × Frame {
//!         bbox 4 × f32
//!         event_count u32, event_count × u32
//!         element_count u32, element_count × Element {
//!             symbol_hash f32, symbol_frame f32, folder_hash f32
//!             a b c d tx ty z: f32
//!         }
//!     }
//! }
//! string_count u32, string_count × { hash u32, string }
//! ```
//!
//! Element references are ids, but the file stores them as floats.

mod facing;

#[cfg(test)]
mod tests;

pub use facing::{Facing, FacingMask};

use serde::Serialize;

use super::build::BoundingBox;
use super::strings::{HashedString, read_string_table};
use crate::error::Result;
use crate::reader::{ByteStr, Reader};

/// Animation magic
pub const ANIM_MAGIC: &[u8; 4] = b"ANIM";

/// The only animation version understood
pub const ANIM_VERSION: u32 = 4;

/// 2D affine transform with a depth value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transform {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub tx: f32,
    pub ty: f32,
    pub z: f32,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
        z: 0.0,
    };

    fn read(reader: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            a: reader.read_f32()?,
            b: reader.read_f32()?,
            c: reader.read_f32()?,
            d: reader.read_f32()?,
            tx: reader.read_f32()?,
            ty: reader.read_f32()?,
            z: reader.read_f32()?,
        })
    }

    /// Apply to a point, ignoring depth.
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.c * y + self.tx,
            self.b * x + self.d * y + self.ty,
        )
    }
}

/// A placed symbol frame inside an animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Element {
    pub symbol_hash: f32,
    pub symbol_frame: f32,
    pub folder_hash: f32,
    pub transform: Transform,
}

impl Element {
    fn read(reader: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            symbol_hash: reader.read_f32()?,
            symbol_frame: reader.read_f32()?,
            folder_hash: reader.read_f32()?,
            transform: Transform::read(reader)?,
        })
    }
}

/// One timeline frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimFrame {
    pub bbox: BoundingBox,
    pub events: Vec<u32>,
    pub elements: Vec<Element>,
}

impl AnimFrame {
    fn read(reader: &mut Reader<'_>) -> Result<Self> {
        let bbox = BoundingBox::read(reader)?;
        let events = reader.read_list(|r| r.read_u32())?;
        let elements = reader.read_list(Element::read)?;
        Ok(Self {
            bbox,
            events,
            elements,
        })
    }
}

/// A named animation clip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Animation<'a> {
    pub name: ByteStr<'a>,
    pub facing: FacingMask,
    pub root_symbol: u32,
    pub frame_rate: f32,
    pub frames: Vec<AnimFrame>,
}

impl<'a> Animation<'a> {
    fn read(reader: &mut Reader<'a>) -> Result<Self> {
        let name = reader.read_string()?;
        let facing = FacingMask::from_byte(reader.read_u8()?);
        let root_symbol = reader.read_u32()?;
        let frame_rate = reader.read_f32()?;
        let frames = reader.read_list(AnimFrame::read)?;
        tracing::trace!(%name, frames = frames.len(), "animation decoded");
        Ok(Self {
            name,
            facing,
            root_symbol,
            frame_rate,
            frames,
        })
    }

    /// Clip length in seconds, or `None` for a zero frame rate.
    pub fn duration(&self) -> Option<f32> {
        (self.frame_rate > 0.0).then(|| self.frames.len() as f32 / self.frame_rate)
    }
}

/// A decoded ANIM file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimFile<'a> {
    pub version: u32,
    /// Declared totals across every animation.
    pub element_count: u32,
    pub frame_count: u32,
    pub event_count: u32,
    pub animations: Vec<Animation<'a>>,
    pub strings: Vec<HashedString<'a>>,
}

impl<'a> AnimFile<'a> {
    pub fn decode(data: &'a [u8]) -> Result<Self> {
        let mut reader = Reader::new(data);
        reader.expect_magic(ANIM_MAGIC)?;
        let version = reader.expect_version(ANIM_VERSION)?;

        let element_count = reader.read_u32()?;
        let frame_count = reader.read_u32()?;
        let event_count = reader.read_u32()?;
        let animation_count = reader.read_u32()?;
        tracing::debug!(animation_count, frame_count, "decoding ANIM");

        let animations = reader.read_n(animation_count as usize, Animation::read)?;
        let strings = read_string_table(&mut reader)?;

        Ok(Self {
            version,
            element_count,
            frame_count,
            event_count,
            animations,
            strings,
        })
    }

    pub fn animation(&self, name: &[u8]) -> Option<&Animation<'a>> {
        self.animations.iter().find(|a| a.name.as_bytes() == name)
    }

    /// Name registered for a hash in the string table.
    pub fn string_for(&self, hash: u32) -> Option<ByteStr<'a>> {
        super::strings::lookup(&self.strings, hash)
    }
}
