//! Typeface loading, measuring and drawing.

use ab_glyph::{point, Font, FontVec, PxScale, ScaleFont};
use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::{Rgb, RgbImage};
use std::path::Path;
use tracing::{debug, warn};

/// Glyph cell size of the built-in bitmap font.
const BUILTIN_CELL: u32 = 8;

/// A font used to draw slide text.
///
/// `Outline` is a TrueType/OpenType font; `Builtin` is an 8x8 bitmap font
/// scaled to the nearest integer factor.
pub enum Typeface {
    Outline(FontVec),
    Builtin,
}

impl std::fmt::Debug for Typeface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Typeface::Outline(_) => write!(f, "Typeface::Outline"),
            Typeface::Builtin => write!(f, "Typeface::Builtin"),
        }
    }
}

impl Typeface {
    /// Load a font file, falling back to the built-in font on any failure.
    pub fn load(path: &Path) -> Self {
        let data = match std::fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                warn!("Cannot read font {:?} ({}), using built-in font", path, e);
                return Typeface::Builtin;
            }
        };

        match FontVec::try_from_vec(data) {
            Ok(font) => {
                debug!("Loaded font {:?}", path);
                Typeface::Outline(font)
            }
            Err(e) => {
                warn!("Invalid font {:?} ({}), using built-in font", path, e);
                Typeface::Builtin
            }
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, Typeface::Builtin)
    }

    fn builtin_scale(size: f32) -> u32 {
        ((size / BUILTIN_CELL as f32).round() as u32).max(1)
    }

    /// Rendered width of `text` in pixels.
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        match self {
            Typeface::Outline(font) => {
                let scaled = font.as_scaled(PxScale::from(size));
                let mut width = 0.0;
                let mut previous = None;
                for c in text.chars() {
                    let id = scaled.glyph_id(c);
                    if let Some(prev) = previous {
                        width += scaled.kern(prev, id);
                    }
                    width += scaled.h_advance(id);
                    previous = Some(id);
                }
                width
            }
            Typeface::Builtin => {
                (text.chars().count() as u32 * BUILTIN_CELL * Self::builtin_scale(size)) as f32
            }
        }
    }

    /// Draw `text` with its top-left corner at (`x`, `top`).
    pub fn draw(
        &self,
        canvas: &mut RgbImage,
        text: &str,
        x: f32,
        top: f32,
        size: f32,
        color: Rgb<u8>,
    ) {
        match self {
            Typeface::Outline(font) => draw_outline(font, canvas, text, x, top, size, color),
            Typeface::Builtin => draw_builtin(canvas, text, x, top, size, color),
        }
    }
}

fn draw_outline(
    font: &FontVec,
    canvas: &mut RgbImage,
    text: &str,
    x: f32,
    top: f32,
    size: f32,
    color: Rgb<u8>,
) {
    let scale = PxScale::from(size);
    let scaled = font.as_scaled(scale);
    let baseline = top + scaled.ascent();
    let mut caret = x;
    let mut previous = None;

    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(prev) = previous {
            caret += scaled.kern(prev, id);
        }
        let glyph = id.with_scale_and_position(scale, point(caret, baseline));
        caret += scaled.h_advance(id);
        previous = Some(id);

        let Some(outlined) = font.outline_glyph(glyph) else {
            continue;
        };
        let bounds = outlined.px_bounds();
        outlined.draw(|gx, gy, coverage| {
            let px = bounds.min.x as i64 + gx as i64;
            let py = bounds.min.y as i64 + gy as i64;
            blend(canvas, px, py, color, coverage);
        });
    }
}

fn draw_builtin(canvas: &mut RgbImage, text: &str, x: f32, top: f32, size: f32, color: Rgb<u8>) {
    let k = Typeface::builtin_scale(size) as i64;
    let cell = BUILTIN_CELL as i64 * k;
    let x0 = x.round() as i64;
    let y0 = top.round() as i64;

    for (i, c) in text.chars().enumerate() {
        let rows = BASIC_FONTS
            .get(c)
            .or_else(|| LATIN_FONTS.get(c))
            .or_else(|| BASIC_FONTS.get('?'))
            .unwrap_or([0; 8]);
        let cx = x0 + i as i64 * cell;

        for (row, bits) in rows.iter().enumerate() {
            for col in 0..8i64 {
                if bits & (1 << col) == 0 {
                    continue;
                }
                for dy in 0..k {
                    for dx in 0..k {
                        blend(canvas, cx + col * k + dx, y0 + row as i64 * k + dy, color, 1.0);
                    }
                }
            }
        }
    }
}

/// Alpha-blend `color` onto the pixel at (`x`, `y`); out-of-bounds is a no-op.
fn blend(canvas: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>, coverage: f32) {
    if x < 0 || y < 0 || x >= canvas.width() as i64 || y >= canvas.height() as i64 {
        return;
    }
    let alpha = coverage.clamp(0.0, 1.0);
    let pixel = canvas.get_pixel_mut(x as u32, y as u32);
    for (channel, target) in pixel.0.iter_mut().zip(color.0) {
        *channel = (*channel as f32 * (1.0 - alpha) + target as f32 * alpha).round() as u8;
    }
}
