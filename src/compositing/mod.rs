//! Caption compositing with pure-Rust software rendering.
//!
//! | Step | Crate / function |
//! |---|---|
//! | **Font size, wrap width, line pitch** | pure functions in [`layout`] |
//! | **Word wrap** | [`layout::wrap_words`], measuring through the surface |
//! | **Outline + fill** | `imageproc::drawing::draw_text_mut` on an `RgbaImage` |
//! | **Font** | `ab_glyph`, discovered by [`font::resolve_font`] |
//! | **Export** | PNG via the `image` crate |
//!
//! The module is split into:
//! - **Layout**: pure functions for sizes and line breaking (unit testable)
//! - **Style**: data structures describing how text should look
//! - **Surface**: [`DrawingSurface`] / [`RenderBackend`] traits + [`RasterBackend`]
//! - **Compositor**: [`compose`], combining layout with a surface

pub mod compositor;
pub mod font;
pub mod layout;
pub mod raster_surface;
pub mod style;
pub mod surface;

pub use compositor::{compose, plan_layout};
pub use layout::TextLayout;
pub use raster_surface::{RasterBackend, RasterSurface};
pub use style::{RenderOptions, TextAlign, TextStyle};
pub use surface::{DrawingSurface, RenderBackend, RenderError};
