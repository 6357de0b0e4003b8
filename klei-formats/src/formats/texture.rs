//! KTEX texture container (.tex)
//!
//! # Layout
//! ```text
//! 0x00: magic "KTEX"
//! 0x04: capability word u32, bit-packed:
//!       bits  0..4   platform
//!       bits  4..9   pixel format
//!       bits  9..13  texture type
//!       bits 13..18  mip count
//!       bits 18..20  flags
//!       bits 20..32  unclassified
//! 0x08: mip_count × descriptor { width u16, height u16, pitch u16, size u32 }
//!       mip_count × payload (size bytes each, descriptor order)
//! ```
//!
//! Payload boundaries are only known once every descriptor has been read, so
//! the descriptor table is always consumed in full first.

use serde::Serialize;

use crate::error::{FormatError, Result};
use crate::reader::Reader;

/// Texture magic
pub const KTEX_MAGIC: &[u8; 4] = b"KTEX";

/// Offset of the capability word; enum errors point here.
const CAPABILITY_OFFSET: usize = 4;

/// Raw sub-fields of the capability word, before validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilityWord {
    pub platform: u8,
    pub pixel_format: u8,
    pub texture_type: u8,
    pub mip_count: u8,
    pub flags: u8,
    pub extra: u16,
}

impl CapabilityWord {
    pub fn unpack(word: u32) -> Self {
        Self {
            platform: (word & 0xF) as u8,
            pixel_format: ((word >> 4) & 0x1F) as u8,
            texture_type: ((word >> 9) & 0xF) as u8,
            mip_count: ((word >> 13) & 0x1F) as u8,
            flags: ((word >> 18) & 0x3) as u8,
            extra: ((word >> 20) & 0xFFF) as u16,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Platform {
    Any,
    Ps3,
    Xbox360,
    Pc,
}

impl Platform {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Any),
            10 => Some(Self::Ps3),
            11 => Some(Self::Xbox360),
            12 => Some(Self::Pc),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PixelFormat {
    Dxt1,
    Dxt3,
    Dxt5,
    Rgba,
    Unknown,
}

impl PixelFormat {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Dxt1),
            1 => Some(Self::Dxt3),
            2 => Some(Self::Dxt5),
            4 => Some(Self::Rgba),
            7 => Some(Self::Unknown),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Self::Dxt1 => 0,
            Self::Dxt3 => 1,
            Self::Dxt5 => 2,
            Self::Rgba => 4,
            Self::Unknown => 7,
        }
    }

    /// Whether texels are stored as 4×4 compressed blocks.
    pub fn is_block_compressed(self) -> bool {
        matches!(self, Self::Dxt1 | Self::Dxt3 | Self::Dxt5)
    }

    /// The error a [`TexelDecoder`] returns for a format it cannot expand.
    pub fn unsupported(self) -> FormatError {
        unsupported("pixel format", self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TextureType {
    OneD,
    TwoD,
    ThreeD,
    Cube,
}

impl TextureType {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::OneD),
            2 => Some(Self::TwoD),
            3 => Some(Self::ThreeD),
            4 => Some(Self::Cube),
            _ => None,
        }
    }
}

/// One resolution tier of a texture.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MipLevel<'a> {
    pub width: u16,
    pub height: u16,
    pub pitch: u16,
    pub size: u32,
    #[serde(skip)]
    pub data: &'a [u8],
}

/// A decoded KTEX file. Mip payloads borrow from the source buffer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextureContainer<'a> {
    pub platform: Platform,
    pub pixel_format: PixelFormat,
    pub texture_type: TextureType,
    pub mip_count: u8,
    pub flags: u8,
    pub extra: u16,
    pub mips: Vec<MipLevel<'a>>,
}

impl<'a> TextureContainer<'a> {
    pub fn decode(data: &'a [u8]) -> Result<Self> {
        let mut reader = Reader::new(data);
        reader.expect_magic(KTEX_MAGIC)?;

        let caps = CapabilityWord::unpack(reader.read_u32()?);
        let platform = Platform::from_code(caps.platform)
            .ok_or_else(|| unsupported("platform", caps.platform))?;
        let pixel_format = PixelFormat::from_code(caps.pixel_format)
            .ok_or_else(|| unsupported("pixel format", caps.pixel_format))?;
        let texture_type = TextureType::from_code(caps.texture_type)
            .ok_or_else(|| unsupported("texture type", caps.texture_type))?;

        tracing::debug!(
            ?platform,
            ?pixel_format,
            ?texture_type,
            mips = caps.mip_count,
            "decoding KTEX"
        );

        // Pass 1: every descriptor
        let descriptors = reader.read_n(caps.mip_count as usize, |r| {
            Ok((r.read_u16()?, r.read_u16()?, r.read_u16()?, r.read_u32()?))
        })?;

        // Pass 2: payloads in descriptor order
        let mut mips = Vec::with_capacity(descriptors.len());
        for (width, height, pitch, size) in descriptors {
            let data = reader.read_bytes(size as usize)?;
            mips.push(MipLevel {
                width,
                height,
                pitch,
                size,
                data,
            });
        }

        if !reader.is_at_end() {
            tracing::debug!(trailing = reader.remaining(), "KTEX has trailing bytes");
        }

        Ok(Self {
            platform,
            pixel_format,
            texture_type,
            mip_count: caps.mip_count,
            flags: caps.flags,
            extra: caps.extra,
            mips,
        })
    }

    pub fn mip(&self, index: usize) -> Option<&MipLevel<'a>> {
        self.mips.get(index)
    }

    /// Expand one mip level into RGBA8 pixels.
    pub fn decode_mip(&self, mip: &MipLevel<'_>, decoder: &dyn TexelDecoder) -> Result<Vec<u8>> {
        decoder.decode(
            self.pixel_format,
            mip.width as u32,
            mip.height as u32,
            mip.data,
        )
    }
}

fn unsupported(field: &'static str, code: u8) -> FormatError {
    FormatError::UnsupportedValue {
        field,
        offset: CAPABILITY_OFFSET,
        value: code as u32,
    }
}

/// Expands stored texels into RGBA8 pixels.
///
/// Block-compressed formats need an external decompressor implementing
/// this trait; the crate only ships [`RgbaPassthrough`].
pub trait TexelDecoder {
    fn decode(&self, format: PixelFormat, width: u32, height: u32, data: &[u8])
    -> Result<Vec<u8>>;
}

/// Decoder for textures already stored as RGBA8.
#[derive(Debug, Clone, Copy, Default)]
pub struct RgbaPassthrough;

impl TexelDecoder for RgbaPassthrough {
    fn decode(
        &self,
        format: PixelFormat,
        width: u32,
        height: u32,
        data: &[u8],
    ) -> Result<Vec<u8>> {
        if format != PixelFormat::Rgba {
            return Err(format.unsupported());
        }
        let expected = width as u64 * height as u64 * 4;
        if data.len() as u64 != expected {
            return Err(FormatError::IntegrityMismatch {
                what: "rgba payload size",
                expected,
                actual: data.len() as u64,
            });
        }
        Ok(data.to_vec())
    }
}
