//! # memecap
//!
//! Caption an image with AI-written meme text and burn the caption into it.
//!
//! # Architecture: Load, Caption, Compose
//!
//! ```text
//! 1. Load      image file   →  LoadedImage     (declared type check + decode)
//! 2. Caption   image bytes  →  caption string  (one Messages API request)
//! 3. Compose   image + text →  PNG bytes       (wrap, stroke, fill, encode)
//! ```
//!
//! A [`session::Session`] holds the current image and caption between
//! steps, so the caption can be re-rolled without reloading and exported as
//! often as wanted.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`source`] | Declared-type validation, decoding, dropped-path parsing |
//! | [`captioning`] | `CaptionProvider` trait and the Anthropic Messages API client |
//! | [`compositing`] | Caption layout math, drawing-surface trait, raster backend |
//! | [`session`] | Current image, caption slot, last-writer-wins request tickets |
//! | [`interactive`] | Line-based command loop over a session |
//! | [`download`] | Non-clobbering PNG export |
//! | [`config`] | `memecap.toml` loading, validation, merging |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Layout Is Pure, Pixels Are Behind a Trait
//!
//! Every size and position is a function of the image width and a text
//! measurer: font size `max(24, width / 20)`, stroke `font_size / 12`, line
//! height `font_size × 1.2`, greedy wrap at 90% of the width. The
//! [`compositing::DrawingSurface`] trait keeps that math testable against a
//! recording mock, with no font files or pixel comparisons involved.
//!
//! ## Pure-Rust Rendering
//!
//! Text is rasterized with `ab_glyph` and `imageproc`, images are decoded and
//! encoded with `image`. There is no system graphics stack to install; the
//! only thing taken from the machine is a TrueType font.
//!
//! ## Failures Become Placeholders
//!
//! A failed caption request never aborts anything. The user sees
//! "Error generating caption. Try again!" and can regenerate. The session
//! keeps a previously good caption when only a regenerate fails.

pub mod captioning;
pub mod compositing;
pub mod config;
pub mod download;
pub mod interactive;
pub mod output;
pub mod session;
pub mod source;

#[cfg(test)]
pub(crate) mod test_helpers;
