//! Texel expansion for PNG export, including the DXT block formats

use klei_formats::formats::texture::PixelFormat;
use klei_formats::{FormatError, RgbaPassthrough, TexelDecoder};

/// Expands every KTEX pixel format the export path can meet.
///
/// RGBA is copied through; DXT1/3/5 are decompressed as BC1/2/3 blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockDecoder;

impl BlockDecoder {
    fn block_format(format: PixelFormat) -> Option<texpresso::Format> {
        match format {
            PixelFormat::Dxt1 => Some(texpresso::Format::Bc1),
            PixelFormat::Dxt3 => Some(texpresso::Format::Bc2),
            PixelFormat::Dxt5 => Some(texpresso::Format::Bc3),
            PixelFormat::Rgba | PixelFormat::Unknown => None,
        }
    }
}

impl TexelDecoder for BlockDecoder {
    fn decode(
        &self,
        format: PixelFormat,
        width: u32,
        height: u32,
        data: &[u8],
    ) -> klei_formats::Result<Vec<u8>> {
        if format == PixelFormat::Rgba {
            return RgbaPassthrough.decode(format, width, height, data);
        }
        let Some(block) = Self::block_format(format) else {
            return Err(format.unsupported());
        };

        let (width, height) = (width as usize, height as usize);
        let expected = block.compressed_size(width, height);
        if data.len() < expected {
            return Err(FormatError::IntegrityMismatch {
                what: "block payload size",
                expected: expected as u64,
                actual: data.len() as u64,
            });
        }

        let mut rgba = vec![0u8; width * height * 4];
        block.decompress(&data[..expected], width, height, &mut rgba);
        tracing::trace!(?format, width, height, "expanded block texels");
        Ok(rgba)
    }
}
