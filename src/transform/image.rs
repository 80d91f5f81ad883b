//! Raster and vector image recompression.
//!
//! | Format        | Treatment                                              |
//! |---------------|--------------------------------------------------------|
//! | JPEG          | re-encode at `jpeg_quality`, then `jpeg_min_quality`    |
//! | PNG           | lossless re-encode at `png_level`                       |
//! | SVG           | usvg minification (documents with `<text>` untouched)  |
//! | GIF/WebP/ICO  | copied                                                 |
//!
//! A result is only used when it is smaller than the input.

use std::path::Path;

use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ImageFormat};
use serde::Serialize;

use crate::config::{ImagesConfig, PngLevel};

/// Options that change the recompressed bytes (and therefore the cache key).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageOptions {
    pub jpeg_quality: u8,
    pub jpeg_min_quality: u8,
    pub png_level: PngLevel,
}

impl From<&ImagesConfig> for ImageOptions {
    fn from(config: &ImagesConfig) -> Self {
        Self {
            jpeg_quality: config.jpeg_quality,
            jpeg_min_quality: config.jpeg_min_quality,
            png_level: config.png_level,
        }
    }
}

/// Lowercased extension of `path`.
fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

/// Whether `path` is a format that gets recompressed rather than copied.
pub fn is_recompressible(path: &Path) -> bool {
    matches!(extension(path).as_deref(), Some("jpg" | "jpeg" | "png" | "svg"))
}

/// Recompress `input`, read from `path`.
///
/// Returns `None` when the format is copied as-is or recompression did
/// not make the file smaller.
pub fn recompress(path: &Path, input: &[u8], options: &ImageOptions) -> Result<Option<Vec<u8>>> {
    let output = match extension(path).as_deref() {
        Some("jpg" | "jpeg") => Some(recompress_jpeg(input, options)?),
        Some("png") => Some(recompress_png(input, options.png_level)?),
        Some("svg") => super::svg::minify(input)?,
        _ => None,
    };

    Ok(output.filter(|out| out.len() < input.len()))
}

fn recompress_jpeg(input: &[u8], options: &ImageOptions) -> Result<Vec<u8>> {
    let img = image::load_from_memory_with_format(input, ImageFormat::Jpeg)
        .context("Failed to decode JPEG")?;
    let img = match img {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => img,
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    };

    let best = encode_jpeg(&img, options.jpeg_quality)?;
    if best.len() < input.len() || options.jpeg_min_quality >= options.jpeg_quality {
        return Ok(best);
    }
    encode_jpeg(&img, options.jpeg_min_quality)
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut out, quality);
    img.write_with_encoder(encoder)
        .context("Failed to encode JPEG")?;
    Ok(out)
}

fn recompress_png(input: &[u8], level: PngLevel) -> Result<Vec<u8>> {
    let img = image::load_from_memory_with_format(input, ImageFormat::Png)
        .context("Failed to decode PNG")?;

    let compression = match level {
        PngLevel::Fast => CompressionType::Fast,
        PngLevel::Default => CompressionType::Default,
        PngLevel::Best => CompressionType::Best,
    };

    let mut out = Vec::new();
    let encoder = PngEncoder::new_with_quality(&mut out, compression, FilterType::Adaptive);
    img.write_with_encoder(encoder)
        .context("Failed to encode PNG")?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::io::Cursor;

    fn options() -> ImageOptions {
        ImageOptions::from(&ImagesConfig::default())
    }

    fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        }))
    }

    fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_high_quality_jpeg_shrinks() {
        let img = gradient(128, 128);
        let mut input = Vec::new();
        img.write_with_encoder(JpegEncoder::new_with_quality(&mut input, 100))
            .unwrap();

        let out = recompress(Path::new("a.JPG"), &input, &options()).unwrap().unwrap();
        assert!(out.len() < input.len());
        assert!(image::load_from_memory(&out).is_ok());
    }

    #[test]
    fn test_png_never_grows() {
        let input = encode(&gradient(64, 64), ImageFormat::Png);
        if let Some(out) = recompress(Path::new("a.png"), &input, &options()).unwrap() {
            assert!(out.len() < input.len());
            let decoded = image::load_from_memory(&out).unwrap();
            assert_eq!(decoded.to_rgb8(), gradient(64, 64).to_rgb8());
        }
    }

    #[test]
    fn test_other_formats_copied() {
        assert!(recompress(Path::new("a.gif"), b"GIF89a", &options()).unwrap().is_none());
        assert!(recompress(Path::new("a.webp"), b"RIFF", &options()).unwrap().is_none());
        assert!(recompress(Path::new("noext"), b"data", &options()).unwrap().is_none());
    }

    #[test]
    fn test_is_recompressible() {
        assert!(is_recompressible(Path::new("photo.JPEG")));
        assert!(is_recompressible(Path::new("icon.svg")));
        assert!(!is_recompressible(Path::new("anim.gif")));
    }

    #[test]
    fn test_corrupt_jpeg_is_error() {
        assert!(recompress(Path::new("a.jpg"), b"not a jpeg", &options()).is_err());
    }
}
