//! Favicon generation.
//!
//! From one source image, per enabled platform:
//!
//! ```text
//! favicons    favicon-{16,32,48}x{n}.png, favicon.ico (16/32/48)
//! apple_icon  apple-touch-icon.png (180), apple-touch-icon-{57..180}x{n}.png
//! android     android-chrome-{36..512}x{n}.png, manifest.json
//! (always)    favicons.html with the <link>/<meta> tags
//! ```
//!
//! Apple icons are flattened onto `background`; the others keep alpha.

use std::io::Cursor;

use anyhow::{Context, Result, bail};
use image::codecs::ico::{IcoEncoder, IcoFrame};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ExtendedColorType, ImageFormat, Rgba, RgbaImage};
use serde_json::json;

use crate::config::FaviconsConfig;

const FAVICON_SIZES: [u32; 3] = [16, 32, 48];
const APPLE_SIZES: [u32; 10] = [57, 60, 72, 76, 114, 120, 144, 152, 167, 180];
const APPLE_DEFAULT_SIZE: u32 = 180;
const ANDROID_SIZES: [u32; 9] = [36, 48, 72, 96, 144, 192, 256, 384, 512];

/// A generated file, named relative to the favicons destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icon {
    pub name: String,
    pub contents: Vec<u8>,
}

impl Icon {
    fn new(name: impl Into<String>, contents: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            contents,
        }
    }
}

/// Generate every enabled icon for `source`.
pub fn generate(source: &[u8], config: &FaviconsConfig) -> Result<Vec<Icon>> {
    let img = image::load_from_memory(source).context("Failed to decode favicon source")?;
    let background = parse_hex_color(&config.background)?;
    let icons = &config.icons;
    let prefix = &config.path;

    let mut out = Vec::new();
    let mut tags = Vec::new();

    if icons.favicons {
        let mut frames = Vec::new();
        for size in FAVICON_SIZES {
            let square = fit_square(&img, size, None);
            out.push(Icon::new(format!("favicon-{size}x{size}.png"), encode_png(&square)?));
            tags.push(format!(
                r#"<link rel="icon" type="image/png" sizes="{size}x{size}" href="{prefix}favicon-{size}x{size}.png">"#
            ));
            frames.push(
                IcoFrame::as_png(square.as_raw(), size, size, ExtendedColorType::Rgba8)
                    .context("Failed to build .ico frame")?,
            );
        }
        let mut ico = Vec::new();
        IcoEncoder::new(&mut ico)
            .encode_images(&frames)
            .context("Failed to encode favicon.ico")?;
        out.push(Icon::new("favicon.ico", ico));
        tags.push(format!(r#"<link rel="shortcut icon" href="{prefix}favicon.ico">"#));
    }

    if icons.apple_icon {
        let default = fit_square(&img, APPLE_DEFAULT_SIZE, Some(background));
        out.push(Icon::new("apple-touch-icon.png", encode_png(&default)?));
        for size in APPLE_SIZES {
            let square = fit_square(&img, size, Some(background));
            out.push(Icon::new(
                format!("apple-touch-icon-{size}x{size}.png"),
                encode_png(&square)?,
            ));
            tags.push(format!(
                r#"<link rel="apple-touch-icon" sizes="{size}x{size}" href="{prefix}apple-touch-icon-{size}x{size}.png">"#
            ));
        }
    }

    if icons.android {
        for size in ANDROID_SIZES {
            let square = fit_square(&img, size, None);
            out.push(Icon::new(
                format!("android-chrome-{size}x{size}.png"),
                encode_png(&square)?,
            ));
        }
        out.push(Icon::new("manifest.json", manifest(config)?));
        tags.push(format!(r#"<link rel="manifest" href="{prefix}manifest.json">"#));
    }

    tags.push(format!(r#"<meta name="theme-color" content="{}">"#, config.theme_color));
    let mut html = tags.join("\n");
    html.push('\n');
    out.push(Icon::new("favicons.html", html.into_bytes()));

    Ok(out)
}

/// Web app manifest listing the Android icons.
fn manifest(config: &FaviconsConfig) -> Result<Vec<u8>> {
    let icons: Vec<_> = ANDROID_SIZES
        .iter()
        .map(|size| {
            json!({
                "src": format!("{}android-chrome-{size}x{size}.png", config.path),
                "sizes": format!("{size}x{size}"),
                "type": "image/png",
            })
        })
        .collect();
    let manifest = json!({
        "name": config.app_name,
        "short_name": config.app_name,
        "icons": icons,
        "theme_color": config.theme_color,
        "background_color": config.background,
        "display": "standalone",
    });
    Ok(serde_json::to_vec_pretty(&manifest)?)
}

/// Scale to fit a `size` square, centred, padding with `fill` or transparency.
fn fit_square(img: &DynamicImage, size: u32, fill: Option<Rgba<u8>>) -> RgbaImage {
    let scaled = img.resize(size, size, FilterType::Lanczos3).to_rgba8();
    let mut canvas = RgbaImage::from_pixel(size, size, fill.unwrap_or(Rgba([0, 0, 0, 0])));
    let x = i64::from((size - scaled.width()) / 2);
    let y = i64::from((size - scaled.height()) / 2);
    imageops::overlay(&mut canvas, &scaled, x, y);
    canvas
}

fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)
        .context("Failed to encode PNG")?;
    Ok(out.into_inner())
}

/// Parse `#rgb` or `#rrggbb` into an opaque colour.
pub fn parse_hex_color(value: &str) -> Result<Rgba<u8>> {
    let hex = value.trim().trim_start_matches('#');
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        bail!("invalid colour `{value}`, expected #rgb or #rrggbb");
    }
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => bail!("invalid colour `{value}`, expected #rgb or #rrggbb"),
    };
    let channel = |i: usize| {
        u8::from_str_radix(&expanded[i..i + 2], 16)
            .with_context(|| format!("invalid colour `{value}`"))
    };
    Ok(Rgba([channel(0)?, channel(2)?, channel(4)?, 255]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([200, 30, 30, 255]));
        encode_png(&img).unwrap()
    }

    fn names(icons: &[Icon]) -> Vec<&str> {
        icons.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn test_default_platforms() {
        let icons = generate(&source_png(64, 64), &FaviconsConfig::default()).unwrap();
        let names = names(&icons);
        assert!(names.contains(&"favicon-16x16.png"));
        assert!(names.contains(&"favicon.ico"));
        assert!(names.contains(&"apple-touch-icon.png"));
        assert!(names.contains(&"apple-touch-icon-167x167.png"));
        assert!(names.contains(&"android-chrome-512x512.png"));
        assert!(names.contains(&"manifest.json"));
        assert_eq!(names.last(), Some(&"favicons.html"));
        assert_eq!(icons.len(), 3 + 1 + 1 + 10 + 9 + 1 + 1);
    }

    #[test]
    fn test_sizes_are_exact() {
        let icons = generate(&source_png(300, 120), &FaviconsConfig::default()).unwrap();
        let icon = icons.iter().find(|i| i.name == "android-chrome-192x192.png").unwrap();
        let decoded = image::load_from_memory(&icon.contents).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (192, 192));
        // Letterboxed: corners stay transparent for non-apple icons.
        assert_eq!(decoded.to_rgba8().get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn test_ico_is_decodable() {
        let icons = generate(&source_png(64, 64), &FaviconsConfig::default()).unwrap();
        let ico = icons.iter().find(|i| i.name == "favicon.ico").unwrap();
        assert!(image::load_from_memory_with_format(&ico.contents, ImageFormat::Ico).is_ok());
    }

    #[test]
    fn test_only_enabled_platforms() {
        let mut config = FaviconsConfig::default();
        config.icons.apple_icon = false;
        config.icons.android = false;
        let icons = generate(&source_png(32, 32), &config).unwrap();
        assert!(icons.iter().all(|i| !i.name.starts_with("apple") && !i.name.starts_with("android")));
        let html = String::from_utf8(icons.last().unwrap().contents.clone()).unwrap();
        assert!(html.contains(r#"href="/favicons/favicon.ico""#));
        assert!(!html.contains("manifest"));
    }

    #[test]
    fn test_manifest_contents() {
        let config = FaviconsConfig {
            app_name: "Demo".into(),
            ..FaviconsConfig::default()
        };
        let manifest: serde_json::Value = serde_json::from_slice(&manifest(&config).unwrap()).unwrap();
        assert_eq!(manifest["name"], "Demo");
        assert_eq!(manifest["icons"].as_array().unwrap().len(), ANDROID_SIZES.len());
        assert_eq!(manifest["icons"][0]["src"], "/favicons/android-chrome-36x36.png");
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#fff").unwrap(), Rgba([255, 255, 255, 255]));
        assert_eq!(parse_hex_color("#336699").unwrap(), Rgba([0x33, 0x66, 0x99, 255]));
        assert!(parse_hex_color("white").is_err());
        assert!(parse_hex_color("#ggg").is_err());
    }

    #[test]
    fn test_corrupt_source() {
        assert!(generate(b"nope", &FaviconsConfig::default()).is_err());
    }
}
