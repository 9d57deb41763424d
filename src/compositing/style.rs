//! Style and option types for caption rendering.
//!
//! These structs describe *what* the caption should look like, not *how* it
//! gets rasterized. They are the interface between the
//! [`compositor`](super::compositor) (which decides sizes and positions) and a
//! [`DrawingSurface`](super::surface::DrawingSurface) (which does the pixel
//! work).
//!
//! ## Types
//!
//! - [`TextAlign`]: horizontal anchor for the `x` passed to stroke/fill calls.
//! - [`TextStyle`]: font size, weight, colors and outline width for one render.
//! - [`RenderOptions`]: the user-tunable knobs from the `[render]` config table.

use image::Rgba;

pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Horizontal anchor for text drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    /// `x` is the left edge of the text.
    Left,
    /// `x` is the horizontal center of the text.
    Center,
}

/// Text style applied to a surface before measuring or drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    /// Font size in pixels.
    pub font_size: f32,
    pub bold: bool,
    pub align: TextAlign,
    pub fill: Rgba<u8>,
    pub stroke: Rgba<u8>,
    /// Outline width in pixels, centered on the glyph edge.
    pub stroke_width: f32,
}

impl TextStyle {
    /// Classic meme style: bold, centered, white fill with a black outline
    /// proportional to the font size.
    pub fn caption(font_size: f32) -> Self {
        Self {
            font_size,
            bold: true,
            align: TextAlign::Center,
            fill: WHITE,
            stroke: BLACK,
            stroke_width: super::layout::stroke_width(font_size),
        }
    }
}

/// Rendering options sourced from config.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Baseline of the first caption line, in pixels from the top edge.
    pub start_y: f32,
    /// Upper-case the caption before layout.
    pub uppercase: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            start_y: super::layout::START_Y,
            uppercase: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caption_style_is_white_on_black_outline() {
        let style = TextStyle::caption(48.0);
        assert_eq!(style.fill, WHITE);
        assert_eq!(style.stroke, BLACK);
        assert_eq!(style.align, TextAlign::Center);
        assert!(style.bold);
        assert_eq!(style.stroke_width, 4.0);
    }

    #[test]
    fn default_options_start_at_50_uppercased() {
        let options = RenderOptions::default();
        assert_eq!(options.start_y, 50.0);
        assert!(options.uppercase);
    }
}
