//! Shared test utilities for the memecap test suite.
//!
//! Provides synthetic images, on-disk image fixtures, and system font
//! lookup for tests that need real glyphs.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let path = write_png(tmp.path(), "cat.png", 120, 80);
//!
//! let Some(font) = system_font() else {
//!     return; // no TrueType font on this machine
//! };
//! ```

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::path::{Path, PathBuf};

use crate::compositing::font::{pick_font, system_fonts};

// =========================================================================
// Synthetic images
// =========================================================================

/// Opaque image whose pixels differ in both directions, so copies and
/// offsets are easy to tell apart.
pub fn gradient_image(width: u32, height: u32) -> DynamicImage {
    let canvas = RgbaImage::from_fn(width, height, |x, y| {
        let r = (x * 255 / width.max(1)) as u8;
        let g = (y * 255 / height.max(1)) as u8;
        Rgba([r, g, 128, 255])
    });
    DynamicImage::ImageRgba8(canvas)
}

/// Write a gradient PNG into `dir` and return its path.
pub fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    write_image(dir, name, width, height, ImageFormat::Png)
}

/// Write a gradient image in `format` into `dir` and return its path.
pub fn write_image(
    dir: &Path,
    name: &str,
    width: u32,
    height: u32,
    format: ImageFormat,
) -> PathBuf {
    let path = dir.join(name);
    let image = match format {
        // JPEG has no alpha channel
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(gradient_image(width, height).to_rgb8()),
        _ => gradient_image(width, height),
    };
    image.save_with_format(&path, format).unwrap();
    path
}

// =========================================================================
// Fonts
// =========================================================================

/// First usable system font, or `None` when the machine has none.
///
/// Tests that draw real glyphs return early on `None`.
pub fn system_font() -> Option<PathBuf> {
    pick_font(system_fonts()).map(|(path, _bold)| path)
}
