//! Slide backgrounds: solid-color gradients and image assets.

use crate::error::{Result, SlidecastError};
use image::imageops::FilterType;
use image::{Rgb, RgbImage};
use std::path::Path;

/// Parse a `#rrggbb` (or `rrggbb`) color.
pub fn parse_hex_color(value: &str) -> Result<Rgb<u8>> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(SlidecastError::Config(format!("invalid color '{}'", value)));
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16)
            .map_err(|e| SlidecastError::Config(format!("invalid color '{}': {}", value, e)))
    };
    Ok(Rgb([channel(0..2)?, channel(2..4)?, channel(4..6)?]))
}

/// Vertical gradient darkening from `base` at the top to 80% of it at the bottom.
pub fn gradient(width: u32, height: u32, base: Rgb<u8>) -> RgbImage {
    RgbImage::from_fn(width, height, |_, y| {
        let factor = 1.0 - (y as f32 / height as f32) * 0.2;
        Rgb(base.0.map(|c| (c as f32 * factor) as u8))
    })
}

/// Load an image asset and resize it to exactly `width` x `height`.
pub fn load_asset(path: &Path, width: u32, height: u32) -> Result<RgbImage> {
    let image = image::open(path)?;
    Ok(image.resize_exact(width, height, FilterType::Triangle).to_rgb8())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#291d38").unwrap(), Rgb([0x29, 0x1d, 0x38]));
        assert_eq!(parse_hex_color("FFFFFF").unwrap(), Rgb([255, 255, 255]));
        assert!(parse_hex_color("#fff").is_err());
        assert!(parse_hex_color("#gggggg").is_err());
    }

    #[test]
    fn test_gradient_darkens_downwards() {
        let image = gradient(4, 100, Rgb([200, 100, 50]));
        assert_eq!(image.dimensions(), (4, 100));
        assert_eq!(*image.get_pixel(0, 0), Rgb([200, 100, 50]));
        let bottom = image.get_pixel(0, 99);
        assert!(bottom.0[0] < 200 && bottom.0[0] >= 160);
    }

    #[test]
    fn test_asset_resized_to_canvas() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bg.png");
        RgbImage::from_pixel(10, 5, Rgb([1, 2, 3])).save(&path).unwrap();

        let loaded = load_asset(&path, 64, 36).unwrap();
        assert_eq!(loaded.dimensions(), (64, 36));
    }

    #[test]
    fn test_missing_asset_is_error() {
        assert!(load_asset(Path::new("/no/such/bg.png"), 10, 10).is_err());
    }
}
