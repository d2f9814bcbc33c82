//! Slide rendering.
//!
//! A slide is a still image showing one narration unit's text over a
//! gradient or an image asset.

mod background;
mod font;
mod layout;

pub use background::{gradient, load_asset, parse_hex_color};
pub use font::Typeface;
pub use layout::{fit_lines, wrap_lines, ELLIPSIS};

use crate::config::{FontSizes, Settings};
use crate::error::{Result, SlidecastError};
use image::{ImageFormat, Rgb, RgbImage};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, instrument, warn};

/// Resolved slide styling.
#[derive(Debug, Clone)]
pub struct SlideStyle {
    pub width: u32,
    pub height: u32,
    pub background: Rgb<u8>,
    pub text: Rgb<u8>,
    pub shadow: Rgb<u8>,
    pub font_sizes: FontSizes,
    pub line_spacing: f32,
    pub margin: f32,
}

impl SlideStyle {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let style = &settings.style;
        if settings.video.width == 0 || settings.video.height == 0 {
            return Err(SlidecastError::Config("video size must be non-zero".into()));
        }
        Ok(Self {
            width: settings.video.width,
            height: settings.video.height,
            background: parse_hex_color(&style.background_color)?,
            text: parse_hex_color(&style.text_color)?,
            shadow: parse_hex_color(&style.shadow_color)?,
            font_sizes: style.font_sizes.clone(),
            line_spacing: style.line_spacing.max(0.5),
            margin: style.margin.clamp(0.0, 0.45),
        })
    }

    /// Usable text width after subtracting both margins.
    pub fn max_text_width(&self) -> f32 {
        let margin = (self.width as f32 * self.margin).floor();
        self.width as f32 - 2.0 * margin
    }
}

/// Renders slide images. Cheap to clone.
#[derive(Debug, Clone)]
pub struct SlideRenderer {
    style: SlideStyle,
    typeface: Arc<Typeface>,
    assets_dir: PathBuf,
}

impl SlideRenderer {
    pub fn new(style: SlideStyle, typeface: Typeface, assets_dir: impl Into<PathBuf>) -> Self {
        Self {
            style,
            typeface: Arc::new(typeface),
            assets_dir: assets_dir.into(),
        }
    }

    /// Build a renderer from settings, loading the configured font.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self::new(
            SlideStyle::from_settings(settings)?,
            Typeface::load(&settings.font_path()),
            settings.assets_dir(),
        ))
    }

    pub fn style(&self) -> &SlideStyle {
        &self.style
    }

    fn background(&self, asset: Option<&str>) -> RgbImage {
        if let Some(name) = asset {
            let path = self.assets_dir.join(name);
            if path.is_file() {
                match load_asset(&path, self.style.width, self.style.height) {
                    Ok(image) => return image,
                    Err(e) => warn!("Cannot load background {:?}: {}", path, e),
                }
            } else {
                warn!("Background asset {:?} not found, using gradient", path);
            }
        }
        gradient(self.style.width, self.style.height, self.style.background)
    }

    /// Lay out and draw `text` onto a canvas.
    pub fn compose(&self, text: &str, level: u8, background: Option<&str>) -> RgbImage {
        let mut canvas = self.background(background);
        let size = self.style.font_sizes.for_level(level) as f32;
        let measure = |s: &str| self.typeface.text_width(s, size);

        let line_height = size * self.style.line_spacing;
        let max_lines = (self.style.height as f32 / line_height).floor() as usize;
        let lines = fit_lines(wrap_lines(text, self.style.max_text_width(), measure), max_lines);

        let block_height = lines.len() as f32 * line_height;
        let mut top = (self.style.height as f32 - block_height) / 2.0;
        let with_shadow = (1..=3).contains(&level);

        for line in &lines {
            let x = (self.style.width as f32 - measure(line)) / 2.0;
            if with_shadow {
                self.typeface
                    .draw(&mut canvas, line, x + 1.0, top + 1.0, size, self.style.shadow);
            }
            self.typeface.draw(&mut canvas, line, x, top, size, self.style.text);
            top += line_height;
        }

        canvas
    }

    /// Render a slide to a PNG file.
    #[instrument(skip(self, text), fields(output = %output.display()))]
    pub fn render(
        &self,
        text: &str,
        level: u8,
        background: Option<&str>,
        output: &Path,
    ) -> Result<()> {
        let canvas = self.compose(text, level, background);
        canvas
            .save_with_format(output, ImageFormat::Png)
            .map_err(|e| {
                error!("Failed to save slide {:?}: {}", output, e);
                SlidecastError::Render(format!("cannot write slide {}: {}", output.display(), e))
            })?;
        debug!("Slide written");
        Ok(())
    }

    /// Render on the blocking thread pool.
    pub async fn render_async(
        &self,
        text: String,
        level: u8,
        background: Option<String>,
        output: PathBuf,
    ) -> Result<()> {
        let renderer = self.clone();
        tokio::task::spawn_blocking(move || {
            renderer.render(&text, level, background.as_deref(), &output)
        })
        .await
        .map_err(|e| SlidecastError::Render(format!("slide task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer(assets: &Path) -> SlideRenderer {
        let mut settings = Settings::default();
        settings.video.width = 320;
        settings.video.height = 180;
        SlideRenderer::new(
            SlideStyle::from_settings(&settings).unwrap(),
            Typeface::Builtin,
            assets,
        )
    }

    #[test]
    fn test_slide_is_canvas_sized() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("slide.png");
        renderer(dir.path())
            .render("Hello slides.", 1, None, &output)
            .unwrap();

        let image = image::open(&output).unwrap();
        assert_eq!((image.width(), image.height()), (320, 180));
    }

    #[test]
    fn test_text_is_drawn() {
        let dir = tempfile::tempdir().unwrap();
        let r = renderer(dir.path());
        let blank = r.compose("", 0, None);
        let drawn = r.compose("Visible", 0, None);
        assert_ne!(blank, drawn);
    }

    #[test]
    fn test_missing_asset_falls_back_to_gradient() {
        let dir = tempfile::tempdir().unwrap();
        let r = renderer(dir.path());
        assert_eq!(r.compose("", 0, Some("missing.png")), r.compose("", 0, None));
    }

    #[test]
    fn test_asset_background_used() {
        let dir = tempfile::tempdir().unwrap();
        RgbImage::from_pixel(16, 9, Rgb([0, 200, 0]))
            .save(dir.path().join("green.png"))
            .unwrap();
        let canvas = renderer(dir.path()).compose("", 0, Some("green.png"));
        assert_eq!(canvas.dimensions(), (320, 180));
        let pixel = canvas.get_pixel(0, 0);
        assert!(pixel.0[1] > 190 && pixel.0[0] < 10, "unexpected pixel {:?}", pixel);
    }

    #[test]
    fn test_overflowing_text_does_not_fail() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("long.png");
        let text = "word ".repeat(500);
        renderer(dir.path()).render(&text, 2, None, &output).unwrap();
        assert!(output.exists());
    }

    #[test]
    fn test_unwritable_output_is_render_error() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("missing").join("slide.png");
        assert!(matches!(
            renderer(dir.path()).render("x", 1, None, &output),
            Err(SlidecastError::Render(_))
        ));
    }

    #[test]
    fn test_invalid_color_is_config_error() {
        let mut settings = Settings::default();
        settings.style.text_color = "white".into();
        assert!(matches!(
            SlideStyle::from_settings(&settings),
            Err(SlidecastError::Config(_))
        ));
    }
}
