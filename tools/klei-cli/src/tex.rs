//! `klei tex` - inspect KTEX textures and export mips as PNG

use anyhow::{Context, Result};
use clap::Args;
use image::RgbaImage;
use klei_formats::{TexelDecoder, TextureContainer};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::output;
use crate::texels::BlockDecoder;

/// Arguments for the tex command
#[derive(Args)]
pub struct TexArgs {
    /// Input .tex file
    pub file: PathBuf,

    /// Mip level to export with --image (default: 0, the largest)
    #[arg(long, requires = "image")]
    pub mip: Option<usize>,

    /// Write the selected mip as a PNG instead of printing the header
    #[arg(long)]
    pub image: Option<PathBuf>,
}

/// Execute the tex command
pub fn execute(args: TexArgs, config: &Config) -> Result<()> {
    let data = crate::read_input(&args.file)?;
    let texture = TextureContainer::decode(&data)
        .with_context(|| format!("Failed to decode texture: {}", args.file.display()))?;
    tracing::info!(
        "{:?} {:?} {:?}, {} mips",
        texture.platform,
        texture.pixel_format,
        texture.texture_type,
        texture.mips.len()
    );

    match &args.image {
        Some(path) => export_mip(&texture, args.mip.unwrap_or(0), &BlockDecoder, path),
        None => output::print_json(&texture, config.output.pretty),
    }
}

/// Decode one mip and write it as a PNG.
///
/// KTEX rows are stored bottom-up, so the image is flipped vertically.
pub fn export_mip(
    texture: &TextureContainer<'_>,
    index: usize,
    decoder: &dyn TexelDecoder,
    path: &Path,
) -> Result<()> {
    let mip = texture.mip(index).with_context(|| {
        format!(
            "Mip {} out of range (texture has {})",
            index,
            texture.mips.len()
        )
    })?;
    let pixels = texture
        .decode_mip(mip, decoder)
        .with_context(|| format!("Failed to expand mip {index}"))?;

    let width = u32::from(mip.width);
    let height = u32::from(mip.height);
    let image = RgbaImage::from_raw(width, height, pixels)
        .with_context(|| format!("Pixel buffer does not fit {width}x{height}"))?;
    let flipped = image::imageops::flip_vertical(&image);

    flipped
        .save(path)
        .with_context(|| format!("Failed to write image: {}", path.display()))?;
    tracing::info!("Wrote mip {} ({}x{}) to {}", index, width, height, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use klei_formats::RgbaPassthrough;

    /// PC / RGBA / 2D, one 1x2 mip: bottom row red, top row blue.
    fn ktex_1x2() -> Vec<u8> {
        let word: u32 = 12 | (4 << 4) | (2 << 9) | (1 << 13);
        let mut out = b"KTEX".to_vec();
        out.extend_from_slice(&word.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&2u16.to_le_bytes());
        out.extend_from_slice(&4u16.to_le_bytes());
        out.extend_from_slice(&8u32.to_le_bytes());
        out.extend_from_slice(&[255, 0, 0, 255, 0, 0, 255, 255]);
        out
    }

    #[test]
    fn test_export_flips_rows() {
        let data = ktex_1x2();
        let texture = TextureContainer::decode(&data).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mip0.png");

        export_mip(&texture, 0, &RgbaPassthrough, &path).unwrap();

        let image = image::open(&path).unwrap().to_rgba8();
        assert_eq!(image.dimensions(), (1, 2));
        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 255, 255]);
        assert_eq!(image.get_pixel(0, 1).0, [255, 0, 0, 255]);
    }

    /// PC / DXT1 / 2D, one 4x4 mip. Stored row 0 is blue, rows 1-3 red.
    fn ktex_dxt1() -> Vec<u8> {
        let word: u32 = 12 | (2 << 9) | (1 << 13);
        let block = [0x00, 0xF8, 0x1F, 0x00, 0x55, 0x00, 0x00, 0x00];
        let mut out = b"KTEX".to_vec();
        out.extend_from_slice(&word.to_le_bytes());
        out.extend_from_slice(&4u16.to_le_bytes());
        out.extend_from_slice(&4u16.to_le_bytes());
        out.extend_from_slice(&8u16.to_le_bytes());
        out.extend_from_slice(&(block.len() as u32).to_le_bytes());
        out.extend_from_slice(&block);
        out
    }

    #[test]
    fn test_export_dxt1() {
        let data = ktex_dxt1();
        let texture = TextureContainer::decode(&data).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dxt1.png");

        export_mip(&texture, 0, &BlockDecoder, &path).unwrap();

        let image = image::open(&path).unwrap().to_rgba8();
        assert_eq!(image.dimensions(), (4, 4));
        // Flipped: the stored first row lands at the bottom
        assert_eq!(image.get_pixel(0, 3).0, [0, 0, 255, 255]);
        assert_eq!(image.get_pixel(3, 0).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_passthrough_cannot_export_dxt1() {
        let data = ktex_dxt1();
        let texture = TextureContainer::decode(&data).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let err = export_mip(&texture, 0, &RgbaPassthrough, &dir.path().join("x.png"))
            .unwrap_err();
        assert!(format!("{err:#}").contains("pixel format"));
    }

    #[test]
    fn test_export_missing_mip() {
        let data = ktex_1x2();
        let texture = TextureContainer::decode(&data).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let err = export_mip(&texture, 3, &RgbaPassthrough, &dir.path().join("x.png"))
            .unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }
}
