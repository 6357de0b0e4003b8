//! BILD sprite atlas ("build") format
//!
//! # Layout
//! ```text
//! magic "BILD", version u32 (= 6)
//! symbol_count u32, frame_count u32
//! build_name string
//! material_count u32, material_count × string
//! symbol_count × Symbol {
//!     hash u32
//!     frame_count u32, frame_count × FrameRegion {
//!         num u32, duration u32, bbox 4 × f32, alpha_index u32, alpha_count u32
//!     }
//! }
//! vertex_count u32, vertex_count × Vertex { x y z u v w: f32 }
//! string_count u32, string_count × { hash u32, string }
//! ```
//! Strings are a u32 length followed by raw bytes.

use serde::Serialize;

use super::strings::{HashedString, read_string_table};
use crate::error::Result;
use crate::reader::{ByteStr, Reader};

/// Atlas magic
pub const BILD_MAGIC: &[u8; 4] = b"BILD";

/// The only atlas version understood
pub const BILD_VERSION: u32 = 6;

/// Axis-aligned box `(x, y, w, h)`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl BoundingBox {
    pub(crate) fn read(reader: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            x: reader.read_f32()?,
            y: reader.read_f32()?,
            w: reader.read_f32()?,
            h: reader.read_f32()?,
        })
    }
}

/// One rendered frame of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameRegion {
    pub num: u32,
    pub duration: u32,
    pub bbox: BoundingBox,
    /// First vertex of this frame in the vertex pool.
    pub alpha_index: u32,
    /// Number of vertices belonging to this frame.
    pub alpha_count: u32,
}

impl FrameRegion {
    fn read(reader: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            num: reader.read_u32()?,
            duration: reader.read_u32()?,
            bbox: BoundingBox::read(reader)?,
            alpha_index: reader.read_u32()?,
            alpha_count: reader.read_u32()?,
        })
    }
}

/// A named sprite and its frames.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Symbol {
    pub hash: u32,
    pub frames: Vec<FrameRegion>,
}

impl Symbol {
    fn read(reader: &mut Reader<'_>) -> Result<Self> {
        let hash = reader.read_u32()?;
        let frames = reader.read_list(FrameRegion::read)?;
        Ok(Self { hash, frames })
    }
}

/// Mesh vertex: position and texture coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Vertex {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub u: f32,
    pub v: f32,
    pub w: f32,
}

impl Vertex {
    fn read(reader: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            x: reader.read_f32()?,
            y: reader.read_f32()?,
            z: reader.read_f32()?,
            u: reader.read_f32()?,
            v: reader.read_f32()?,
            w: reader.read_f32()?,
        })
    }
}

/// A decoded BILD file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtlasFile<'a> {
    pub version: u32,
    pub symbol_count: u32,
    /// Total frames across all symbols, as declared by the header.
    pub frame_count: u32,
    pub build_name: ByteStr<'a>,
    pub materials: Vec<ByteStr<'a>>,
    pub symbols: Vec<Symbol>,
    pub vertices: Vec<Vertex>,
    pub strings: Vec<HashedString<'a>>,
}

impl<'a> AtlasFile<'a> {
    pub fn decode(data: &'a [u8]) -> Result<Self> {
        let mut reader = Reader::new(data);
        reader.expect_magic(BILD_MAGIC)?;
        let version = reader.expect_version(BILD_VERSION)?;

        let symbol_count = reader.read_u32()?;
        let frame_count = reader.read_u32()?;
        let build_name = reader.read_string()?;
        tracing::debug!(%build_name, symbol_count, frame_count, "decoding BILD");

        let materials = reader.read_list(|r| r.read_string())?;
        let symbols = reader.read_n(symbol_count as usize, Symbol::read)?;
        let vertices = reader.read_list(Vertex::read)?;
        let strings = read_string_table(&mut reader)?;

        tracing::trace!(
            materials = materials.len(),
            vertices = vertices.len(),
            strings = strings.len(),
            end = reader.position(),
            "BILD decoded"
        );

        Ok(Self {
            version,
            symbol_count,
            frame_count,
            build_name,
            materials,
            symbols,
            vertices,
            strings,
        })
    }

    /// Name registered for a symbol hash in the string table.
    pub fn symbol_name(&self, hash: u32) -> Option<ByteStr<'a>> {
        super::strings::lookup(&self.strings, hash)
    }

    /// Vertices covered by a frame's alpha range, if it lies inside the pool.
    pub fn frame_vertices(&self, frame: &FrameRegion) -> Option<&[Vertex]> {
        let start = frame.alpha_index as usize;
        let end = start.checked_add(frame.alpha_count as usize)?;
        self.vertices.get(start..end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormatError;

    struct Bytes(Vec<u8>);

    impl Bytes {
        fn u32(&mut self, v: u32) -> &mut Self {
            self.0.extend_from_slice(&v.to_le_bytes());
            self
        }
        fn f32(&mut self, v: f32) -> &mut Self {
            self.0.extend_from_slice(&v.to_le_bytes());
            self
        }
        fn str(&mut self, s: &str) -> &mut Self {
            self.u32(s.len() as u32);
            self.0.extend_from_slice(s.as_bytes());
            self
        }
    }

    fn sample() -> Vec<u8> {
        let mut b = Bytes(BILD_MAGIC.to_vec());
        b.u32(6).u32(1).u32(2).str("wilson");
        b.u32(1).str("atlas-0.tex");
        // symbol
        b.u32(0xBEEF).u32(2);
        for num in 0..2 {
            b.u32(num).u32(1);
            b.f32(0.0).f32(1.0).f32(32.0).f32(64.0);
            b.u32(num * 6).u32(6);
        }
        // vertices
        b.u32(12);
        for i in 0..12 {
            let i = i as f32;
            b.f32(i).f32(-i).f32(0.0).f32(0.5).f32(0.25).f32(0.0);
        }
        // strings
        b.u32(1).u32(0xBEEF).str("ARM_upper");
        b.0
    }

    #[test]
    fn test_decode_atlas() {
        let data = sample();
        let atlas = AtlasFile::decode(&data).unwrap();

        assert_eq!(atlas.version, 6);
        assert_eq!(atlas.build_name, b"wilson");
        assert_eq!(atlas.materials.len(), 1);
        assert_eq!(atlas.materials[0], b"atlas-0.tex");
        assert_eq!(atlas.symbols.len(), 1);

        let symbol = &atlas.symbols[0];
        assert_eq!(symbol.hash, 0xBEEF);
        assert_eq!(symbol.frames.len(), 2);
        assert_eq!(symbol.frames[1].num, 1);
        assert_eq!(symbol.frames[1].bbox.h, 64.0);
        assert_eq!(symbol.frames[1].alpha_index, 6);

        assert_eq!(atlas.vertices.len(), 12);
        assert_eq!(atlas.vertices[3].y, -3.0);
        assert_eq!(atlas.symbol_name(0xBEEF).unwrap(), b"ARM_upper");

        let verts = atlas.frame_vertices(&symbol.frames[1]).unwrap();
        assert_eq!(verts.len(), 6);
        assert_eq!(verts[0].x, 6.0);
    }

    #[test]
    fn test_frame_vertices_out_of_pool() {
        let data = sample();
        let atlas = AtlasFile::decode(&data).unwrap();
        let mut frame = atlas.symbols[0].frames[0];
        frame.alpha_index = 10;
        assert!(atlas.frame_vertices(&frame).is_none());
    }

    #[test]
    fn test_wrong_magic() {
        let mut data = sample();
        data[..4].copy_from_slice(b"ANIM");
        assert!(matches!(
            AtlasFile::decode(&data),
            Err(FormatError::StructuralMismatch { what: "magic", .. })
        ));
    }

    #[test]
    fn test_wrong_version() {
        let mut data = sample();
        data[4] = 5;
        match AtlasFile::decode(&data) {
            Err(FormatError::StructuralMismatch {
                what: "version",
                offset,
                expected,
                found,
            }) => {
                assert_eq!(offset, 4);
                assert_eq!(expected, "6");
                assert_eq!(found, "5");
            }
            other => panic!("expected version mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_truncated_string_table() {
        let mut data = sample();
        data.truncate(data.len() - 3);
        assert!(matches!(
            AtlasFile::decode(&data),
            Err(FormatError::OutOfRange { .. })
        ));
    }
}
