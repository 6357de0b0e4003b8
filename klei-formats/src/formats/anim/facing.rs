//! Facing masks of animation clips

use bitflags::bitflags;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

bitflags! {
    /// Directions an animation clip may be played for.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Facing: u8 {
        const RIGHT = 1 << 0;
        const UP = 1 << 1;
        const LEFT = 1 << 2;
        const DOWN = 1 << 3;
        const UPRIGHT = 1 << 4;
        const UPLEFT = 1 << 5;
        const DOWNRIGHT = 1 << 6;
        const DOWNLEFT = 1 << 7;
    }
}

/// The facing byte of a clip.
///
/// `0xFF` is a sentinel meaning "every direction" and is kept distinct from
/// an explicit set of directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FacingMask {
    All,
    Directions(Facing),
}

impl FacingMask {
    pub const ALL_BYTE: u8 = 0xFF;

    pub fn from_byte(byte: u8) -> Self {
        if byte == Self::ALL_BYTE {
            FacingMask::All
        } else {
            FacingMask::Directions(Facing::from_bits_retain(byte))
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            FacingMask::All => Self::ALL_BYTE,
            FacingMask::Directions(facing) => facing.bits(),
        }
    }

    pub fn is_all(self) -> bool {
        matches!(self, FacingMask::All)
    }

    /// Whether the clip may be played facing `direction`.
    pub fn allows(self, direction: Facing) -> bool {
        match self {
            FacingMask::All => true,
            FacingMask::Directions(facing) => facing.contains(direction),
        }
    }

    /// Names of the individual directions, in bit order. Empty for `All`.
    pub fn direction_names(self) -> Vec<&'static str> {
        match self {
            FacingMask::All => Vec::new(),
            FacingMask::Directions(facing) => facing.iter_names().map(|(name, _)| name).collect(),
        }
    }

    /// Render as `"255 (ALL)"` or `"5 (RIGHT|LEFT)"`.
    pub fn describe(self) -> String {
        let names = match self {
            FacingMask::All => "ALL".to_string(),
            FacingMask::Directions(_) => self.direction_names().join("|"),
        };
        format!("{} ({})", self.bits(), names)
    }
}

impl Serialize for FacingMask {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("FacingMask", 3)?;
        state.serialize_field("bits", &self.bits())?;
        state.serialize_field("all", &self.is_all())?;
        state.serialize_field("directions", &self.direction_names())?;
        state.end()
    }
}
