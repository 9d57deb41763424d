//! Drawing-surface capability and shared error type.
//!
//! The [`DrawingSurface`] trait is the minimal set of canvas operations the
//! compositor needs: draw an image at the origin, set a text style, measure
//! text, stroke/fill text at a position, and encode the result. A
//! [`RenderBackend`] hands out surfaces of a requested size.
//!
//! The production implementation is
//! [`RasterBackend`](super::raster_surface::RasterBackend), software rendering on `image` +
//! `imageproc` + `ab_glyph`. Anything that can do the six
//! operations (a GPU canvas, a headless browser) can stand in.

use super::style::TextStyle;
use image::DynamicImage;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Cannot allocate a {width}x{height} drawing surface")]
    SurfaceAllocation { width: u32, height: u32 },
    #[error("No usable font found (searched: {searched})")]
    FontUnavailable { searched: String },
    #[error("Failed to load font {}: {reason}", path.display())]
    FontLoad { path: PathBuf, reason: String },
    #[error("PNG encode failed: {0}")]
    Encode(String),
}

/// Canvas-like drawing target.
///
/// Text calls interpret `x` according to the active style's
/// [`TextAlign`](super::style::TextAlign) and `y` as the alphabetic baseline.
pub trait DrawingSurface {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Copy `image` onto the surface at (0, 0), unscaled.
    fn draw_image(&mut self, image: &DynamicImage);

    /// Activate a text style. Fails if no font can back it.
    fn set_style(&mut self, style: &TextStyle) -> Result<(), RenderError>;

    /// Advance width of `text` in pixels under the active style.
    fn measure_text(&self, text: &str) -> f32;

    /// Draw the outline of `text`.
    fn stroke_text(&mut self, text: &str, x: f32, y: f32);

    /// Draw the body of `text`.
    fn fill_text(&mut self, text: &str, x: f32, y: f32);

    /// Encode the current pixels as PNG.
    fn encode_png(&self) -> Result<Vec<u8>, RenderError>;
}

/// Factory for drawing surfaces.
pub trait RenderBackend {
    type Surface: DrawingSurface;

    /// Allocate a surface of exactly `width × height`.
    fn allocate(&self, width: u32, height: u32) -> Result<Self::Surface, RenderError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use image::GenericImageView;
    use std::sync::{Arc, Mutex};

    /// Mock backend whose surfaces record every call instead of drawing.
    ///
    /// Text is measured at a fixed `advance` pixels per character. All
    /// surfaces share one operation log so tests can inspect it after the
    /// surface has been consumed.
    pub struct MockBackend {
        pub advance: f32,
        pub fail_style: bool,
        pub operations: Arc<Mutex<Vec<RecordedOp>>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Allocate { width: u32, height: u32 },
        DrawImage { width: u32, height: u32 },
        SetStyle { font_size: f32, stroke_width: f32 },
        Stroke { text: String, x: f32, y: f32 },
        Fill { text: String, x: f32, y: f32 },
        Encode,
    }

    pub struct MockSurface {
        width: u32,
        height: u32,
        advance: f32,
        fail_style: bool,
        operations: Arc<Mutex<Vec<RecordedOp>>>,
    }

    impl MockBackend {
        pub fn new(advance: f32) -> Self {
            Self {
                advance,
                fail_style: false,
                operations: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// A backend whose surfaces have no font to offer.
        pub fn without_font() -> Self {
            Self {
                fail_style: true,
                ..Self::new(10.0)
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        /// Text passed to stroke and fill calls, in call order.
        pub fn drawn_text(&self) -> Vec<RecordedOp> {
            self.get_operations()
                .into_iter()
                .filter(|op| matches!(op, RecordedOp::Stroke { .. } | RecordedOp::Fill { .. }))
                .collect()
        }
    }

    impl RenderBackend for MockBackend {
        type Surface = MockSurface;

        fn allocate(&self, width: u32, height: u32) -> Result<MockSurface, RenderError> {
            if width == 0 || height == 0 {
                return Err(RenderError::SurfaceAllocation { width, height });
            }
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Allocate { width, height });
            Ok(MockSurface {
                width,
                height,
                advance: self.advance,
                fail_style: self.fail_style,
                operations: Arc::clone(&self.operations),
            })
        }
    }

    impl MockSurface {
        fn record(&self, op: RecordedOp) {
            self.operations.lock().unwrap().push(op);
        }
    }

    impl DrawingSurface for MockSurface {
        fn width(&self) -> u32 {
            self.width
        }

        fn height(&self) -> u32 {
            self.height
        }

        fn draw_image(&mut self, image: &DynamicImage) {
            let (width, height) = image.dimensions();
            self.record(RecordedOp::DrawImage { width, height });
        }

        fn set_style(&mut self, style: &TextStyle) -> Result<(), RenderError> {
            if self.fail_style {
                return Err(RenderError::FontUnavailable {
                    searched: "mock".into(),
                });
            }
            self.record(RecordedOp::SetStyle {
                font_size: style.font_size,
                stroke_width: style.stroke_width,
            });
            Ok(())
        }

        fn measure_text(&self, text: &str) -> f32 {
            text.chars().count() as f32 * self.advance
        }

        fn stroke_text(&mut self, text: &str, x: f32, y: f32) {
            self.record(RecordedOp::Stroke {
                text: text.to_string(),
                x,
                y,
            });
        }

        fn fill_text(&mut self, text: &str, x: f32, y: f32) {
            self.record(RecordedOp::Fill {
                text: text.to_string(),
                x,
                y,
            });
        }

        fn encode_png(&self) -> Result<Vec<u8>, RenderError> {
            self.record(RecordedOp::Encode);
            Ok(b"mock-png".to_vec())
        }
    }

    #[test]
    fn mock_rejects_zero_sized_surface() {
        let backend = MockBackend::new(10.0);
        let result = backend.allocate(0, 100);
        assert!(matches!(
            result,
            Err(RenderError::SurfaceAllocation {
                width: 0,
                height: 100
            })
        ));
        assert!(backend.get_operations().is_empty());
    }

    #[test]
    fn mock_measures_fixed_advance() {
        let backend = MockBackend::new(12.0);
        let surface = backend.allocate(100, 100).unwrap();
        assert_eq!(surface.measure_text("ABC"), 36.0);
        assert_eq!(surface.measure_text(""), 0.0);
    }

    #[test]
    fn mock_records_in_call_order() {
        let backend = MockBackend::new(10.0);
        let mut surface = backend.allocate(200, 100).unwrap();
        surface.stroke_text("HI", 100.0, 50.0);
        surface.fill_text("HI", 100.0, 50.0);

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 3);
        assert!(matches!(&ops[1], RecordedOp::Stroke { text, .. } if text == "HI"));
        assert!(matches!(&ops[2], RecordedOp::Fill { text, .. } if text == "HI"));
    }

    #[test]
    fn render_error_messages_name_the_problem() {
        let err = RenderError::SurfaceAllocation {
            width: 0,
            height: 10,
        };
        assert_eq!(err.to_string(), "Cannot allocate a 0x10 drawing surface");
    }
}
