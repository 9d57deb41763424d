//! Caption layout and burn-in.
//!
//! These functions combine the pure [`layout`](super::layout) math with a
//! [`DrawingSurface`]. They decide sizes and positions; the surface does the
//! pixel work.

use super::layout::{TextLayout, font_size, wrap_width, wrap_words};
use super::style::{RenderOptions, TextStyle};
use super::surface::{DrawingSurface, RenderBackend, RenderError};
use image::{DynamicImage, GenericImageView};

/// Result type for compositing operations.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Activate the caption style on `surface` and wrap `caption` to its width.
///
/// Returns `Ok(None)` for a caption with no words; in that case no style is
/// set and no font is needed.
pub fn plan_layout<S: DrawingSurface>(
    surface: &mut S,
    caption: &str,
    options: &RenderOptions,
) -> Result<Option<TextLayout>> {
    let text = if options.uppercase {
        caption.to_uppercase()
    } else {
        caption.to_string()
    };
    if text.trim().is_empty() {
        return Ok(None);
    }

    let width = surface.width();
    let size = font_size(width);
    surface.set_style(&TextStyle::caption(size))?;

    let measurer = &*surface;
    let lines = wrap_words(&text, wrap_width(width), |line| measurer.measure_text(line));
    Ok(Some(TextLayout::new(size, options.start_y, lines)))
}

/// Burn `caption` into a copy of `image` and return it PNG-encoded.
///
/// An empty caption produces the undecorated image. Lines are drawn centered
/// on the image, stroke before fill, so the fill sits on top of the outline.
pub fn compose<B: RenderBackend>(
    backend: &B,
    image: &DynamicImage,
    caption: &str,
    options: &RenderOptions,
) -> Result<Vec<u8>> {
    let (width, height) = image.dimensions();
    let mut surface = backend.allocate(width, height)?;
    surface.draw_image(image);

    if let Some(layout) = plan_layout(&mut surface, caption, options)? {
        let center = width as f32 / 2.0;
        for (y, line) in layout.positioned_lines() {
            surface.stroke_text(line, center, y);
            surface.fill_text(line, center, y);
        }
        if layout.overflows(height) {
            tracing::warn!(
                lines = layout.lines.len(),
                height,
                "caption runs past the bottom edge of the image"
            );
        }
        tracing::debug!(
            lines = layout.lines.len(),
            font_size = layout.font_size,
            "caption composited"
        );
    }

    surface.encode_png()
}
