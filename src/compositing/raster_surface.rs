//! Software raster backend in pure Rust, with no system graphics stack.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Surface | `image::RgbaImage` |
//! | Draw image | `image::imageops::replace` |
//! | Font loading | `ab_glyph::FontVec` via [`font::resolve_font`](super::font::resolve_font) |
//! | Measure text | `ab_glyph::ScaleFont` advances + kerning |
//! | Stroke / fill | `imageproc::drawing::draw_text_mut` |
//! | Encode | `image::ImageFormat::Png` |
//!
//! Strokes are approximated by stamping the glyph run at every integer offset
//! inside a disk of radius `stroke_width / 2` (at least one pixel), which is
//! what a centered canvas stroke shows outside the glyph edge.

use super::font::{ResolvedFont, resolve_font};
use super::style::{TextAlign, TextStyle};
use super::surface::{DrawingSurface, RenderBackend, RenderError};
use ab_glyph::{Font, GlyphId, PxScale, ScaleFont};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use std::io::Cursor;
use std::path::PathBuf;

/// Backend producing [`RasterSurface`]s.
///
/// The font is resolved lazily, on the first `set_style`, so images without
/// a caption never need one.
#[derive(Debug, Clone, Default)]
pub struct RasterBackend {
    font_path: Option<PathBuf>,
}

impl RasterBackend {
    pub fn new(font_path: Option<PathBuf>) -> Self {
        Self { font_path }
    }
}

impl RenderBackend for RasterBackend {
    type Surface = RasterSurface;

    fn allocate(&self, width: u32, height: u32) -> Result<RasterSurface, RenderError> {
        let bytes = u64::from(width) * u64::from(height) * 4;
        if width == 0 || height == 0 || bytes > isize::MAX as u64 {
            return Err(RenderError::SurfaceAllocation { width, height });
        }
        Ok(RasterSurface {
            canvas: RgbaImage::new(width, height),
            font_path: self.font_path.clone(),
            font: None,
            style: None,
        })
    }
}

/// An RGBA canvas with an optional active text style.
pub struct RasterSurface {
    canvas: RgbaImage,
    font_path: Option<PathBuf>,
    font: Option<ResolvedFont>,
    style: Option<TextStyle>,
}

impl RasterSurface {
    /// Read-only view of the pixels drawn so far.
    pub fn pixels(&self) -> &RgbaImage {
        &self.canvas
    }

    fn active(&self) -> Option<(&ResolvedFont, &TextStyle)> {
        self.font.as_ref().zip(self.style.as_ref())
    }

    /// Top-left corner of a glyph run anchored at (`x`, baseline `y`).
    fn origin(&self, text: &str, x: f32, y: f32) -> Option<(i32, i32)> {
        let (font, style) = self.active()?;
        let ascent = font.font.as_scaled(PxScale::from(style.font_size)).ascent();
        let left = match style.align {
            TextAlign::Left => x,
            TextAlign::Center => x - self.measure_text(text) / 2.0,
        };
        Some((left.round() as i32, (y - ascent).round() as i32))
    }

    /// Draw a glyph run, doubling it one pixel to the right when the face
    /// has no bold weight of its own.
    fn stamp(&mut self, text: &str, left: i32, top: i32, color: Rgba<u8>) {
        let Some(font) = self.font.as_ref() else {
            return;
        };
        let Some(style) = self.style.as_ref() else {
            return;
        };
        let scale = PxScale::from(style.font_size);
        let faux_bold = style.bold && !font.bold;
        draw_text_mut(&mut self.canvas, color, left, top, scale, &font.font, text);
        if faux_bold {
            draw_text_mut(&mut self.canvas, color, left + 1, top, scale, &font.font, text);
        }
    }
}

/// Integer offsets covering a disk of the given radius, origin excluded.
fn stroke_offsets(radius: f32) -> Vec<(i32, i32)> {
    let radius = radius.max(1.0);
    let reach = radius.ceil() as i32;
    let limit = radius * radius;
    let mut offsets = Vec::new();
    for dy in -reach..=reach {
        for dx in -reach..=reach {
            if (dx, dy) != (0, 0) && (dx * dx + dy * dy) as f32 <= limit {
                offsets.push((dx, dy));
            }
        }
    }
    offsets
}

impl DrawingSurface for RasterSurface {
    fn width(&self) -> u32 {
        self.canvas.width()
    }

    fn height(&self) -> u32 {
        self.canvas.height()
    }

    fn draw_image(&mut self, image: &DynamicImage) {
        image::imageops::replace(&mut self.canvas, &image.to_rgba8(), 0, 0);
    }

    fn set_style(&mut self, style: &TextStyle) -> Result<(), RenderError> {
        if self.font.is_none() {
            self.font = Some(resolve_font(self.font_path.as_deref())?);
        }
        self.style = Some(style.clone());
        Ok(())
    }

    fn measure_text(&self, text: &str) -> f32 {
        let Some((font, style)) = self.active() else {
            return 0.0;
        };
        let scaled = font.font.as_scaled(PxScale::from(style.font_size));
        let mut width = 0.0;
        let mut previous: Option<GlyphId> = None;
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

    fn stroke_text(&mut self, text: &str, x: f32, y: f32) {
        let Some((left, top)) = self.origin(text, x, y) else {
            return;
        };
        let Some((color, radius)) = self.style.as_ref().map(|s| (s.stroke, s.stroke_width / 2.0))
        else {
            return;
        };
        for (dx, dy) in stroke_offsets(radius) {
            self.stamp(text, left + dx, top + dy, color);
        }
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32) {
        let Some((left, top)) = self.origin(text, x, y) else {
            return;
        };
        let Some(color) = self.style.as_ref().map(|s| s.fill) else {
            return;
        };
        self.stamp(text, left, top, color);
    }

    fn encode_png(&self) -> Result<Vec<u8>, RenderError> {
        let mut buffer = Cursor::new(Vec::new());
        self.canvas
            .write_to(&mut buffer, ImageFormat::Png)
            .map_err(|e| RenderError::Encode(e.to_string()))?;
        Ok(buffer.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{gradient_image, system_font};

    #[test]
    fn zero_sized_surface_is_rejected() {
        let backend = RasterBackend::default();
        assert!(matches!(
            backend.allocate(0, 0),
            Err(RenderError::SurfaceAllocation { .. })
        ));
        assert!(matches!(
            backend.allocate(10, 0),
            Err(RenderError::SurfaceAllocation { .. })
        ));
    }

    #[test]
    fn surface_has_requested_size() {
        let surface = RasterBackend::default().allocate(320, 240).unwrap();
        assert_eq!(surface.width(), 320);
        assert_eq!(surface.height(), 240);
    }

    #[test]
    fn draw_image_copies_pixels_exactly() {
        let source = gradient_image(64, 48);
        let mut surface = RasterBackend::default().allocate(64, 48).unwrap();
        surface.draw_image(&source);
        assert_eq!(surface.pixels(), &source.to_rgba8());
    }

    #[test]
    fn encoded_png_decodes_to_same_pixels() {
        let source = gradient_image(40, 30);
        let mut surface = RasterBackend::default().allocate(40, 30).unwrap();
        surface.draw_image(&source);
        let png = surface.encode_png().unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.to_rgba8(), source.to_rgba8());
    }

    #[test]
    fn measuring_without_a_style_is_zero() {
        let surface = RasterBackend::default().allocate(10, 10).unwrap();
        assert_eq!(surface.measure_text("ANYTHING"), 0.0);
    }

    #[test]
    fn text_calls_without_a_style_draw_nothing() {
        let mut surface = RasterBackend::default().allocate(50, 50).unwrap();
        surface.fill_text("X", 25.0, 40.0);
        surface.stroke_text("X", 25.0, 40.0);
        assert!(surface.pixels().pixels().all(|p| p.0 == [0, 0, 0, 0]));
    }

    #[test]
    fn stroke_offsets_cover_a_disk() {
        let unit = stroke_offsets(0.5);
        assert_eq!(unit.len(), 4); // clamped to radius 1: the four neighbours
        assert!(unit.contains(&(1, 0)) && unit.contains(&(0, -1)));

        let two = stroke_offsets(2.0);
        assert!(two.contains(&(2, 0)));
        assert!(two.contains(&(1, 1)));
        assert!(!two.contains(&(2, 2)));
        assert!(!two.contains(&(0, 0)));
    }

    #[test]
    fn wider_text_measures_wider() {
        let Some(font_path) = system_font() else {
            eprintln!("no system font found, skipping");
            return;
        };
        let mut surface = RasterBackend::new(Some(font_path)).allocate(400, 200).unwrap();
        surface.set_style(&TextStyle::caption(24.0)).unwrap();
        let short = surface.measure_text("SO");
        let long = surface.measure_text("SO TRUE");
        assert!(short > 0.0);
        assert!(long > short);
        assert_eq!(surface.measure_text("SO TRUE"), long);
    }

    #[test]
    fn fill_then_stroke_puts_white_and_black_pixels_down() {
        let Some(font_path) = system_font() else {
            eprintln!("no system font found, skipping");
            return;
        };
        let grey = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            300,
            120,
            Rgba([128, 128, 128, 255]),
        ));
        let mut surface = RasterBackend::new(Some(font_path)).allocate(300, 120).unwrap();
        surface.draw_image(&grey);
        surface.set_style(&TextStyle::caption(48.0)).unwrap();
        surface.stroke_text("HI", 150.0, 70.0);
        surface.fill_text("HI", 150.0, 70.0);

        let pixels = surface.pixels();
        // Glyph coverage is anti-aliased, so allow a little slack on exact values.
        assert!(pixels.pixels().any(|p| p.0[..3].iter().all(|&c| c >= 250)));
        assert!(pixels.pixels().any(|p| p.0[..3].iter().all(|&c| c <= 5)));
        // Nothing drawn below the baseline area or in the far corners.
        assert_eq!(pixels.get_pixel(0, 119).0, [128, 128, 128, 255]);
        assert_eq!(pixels.get_pixel(299, 0).0, [128, 128, 128, 255]);
    }
}
