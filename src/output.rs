//! CLI output formatting for every command.
//!
//! # Output Format
//!
//! ## Loading and captioning
//!
//! ```text
//! cat.png (640x480, image/png)
//!     Caption: When the build passes on the first try
//! ```
//!
//! A failed request shows the placeholder plus the reason:
//!
//! ```text
//!     Caption: Error generating caption. Try again!
//!     Error: Caption service returned 529: Overloaded (overloaded_error)
//! ```
//!
//! ## Layout
//!
//! ```text
//! Layout for 1000x500
//!     Font size: 50.0px
//!     Stroke width: 4.2px
//!     Line height: 60.0px
//!     001 y=50.0 ONE DOES NOT SIMPLY
//!     002 y=110.0 CAPTION AN IMAGE
//! ```
//!
//! ## Export
//!
//! ```text
//! Saved → ./meme (1).png
//! ```
//!
//! # Architecture
//!
//! Each display has a `format_*` function (returns `Vec<String>`) for
//! testability; [`print_lines`] writes them to stdout. Format functions are
//! pure: no I/O, no side effects.

use crate::compositing::TextLayout;
use crate::session::{CaptionOutcome, CaptionSlot, Session};
use crate::source::LoadedImage;
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Print formatted lines to stdout.
pub fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

// ============================================================================
// Image and caption
// ============================================================================

/// Header line for a loaded image.
pub fn format_loaded(image: &LoadedImage) -> Vec<String> {
    vec![format!(
        "{} ({}x{}, {})",
        image.name,
        image.width(),
        image.height(),
        image.media_type
    )]
}

/// The caption slot as one indented line.
pub fn format_caption(slot: &CaptionSlot) -> Vec<String> {
    let line = match slot.text() {
        Some(text) => format!("{}Caption: {}", indent(1), text),
        None => format!("{}Caption: (none)", indent(1)),
    };
    vec![line]
}

/// What happened to a caption request, plus the resulting caption.
pub fn format_outcome(outcome: &CaptionOutcome, slot: &CaptionSlot) -> Vec<String> {
    match outcome {
        CaptionOutcome::Applied => format_caption(slot),
        CaptionOutcome::Recovered { error } => {
            let mut lines = format_caption(slot);
            lines.push(format!("{}Error: {}", indent(1), error));
            lines
        }
        CaptionOutcome::Preserved { error } => {
            let mut lines = format_caption(slot);
            lines.push(format!(
                "{}Error: {} (kept previous caption)",
                indent(1),
                error
            ));
            lines
        }
        CaptionOutcome::Stale => Vec::new(),
    }
}

/// Current session state for the `show` command.
pub fn format_session(session: &Session) -> Vec<String> {
    match session.image() {
        None => vec!["No image loaded".to_string()],
        Some(image) => {
            let mut lines = format_loaded(image);
            if session.is_in_flight() {
                lines.push(format!("{}Caption: (generating...)", indent(1)));
            } else {
                lines.extend(format_caption(session.caption()));
            }
            lines
        }
    }
}

// ============================================================================
// Layout and export
// ============================================================================

/// Computed layout metrics and positioned lines.
pub fn format_layout(layout: Option<&TextLayout>, width: u32, height: u32) -> Vec<String> {
    let mut lines = vec![format!("Layout for {}x{}", width, height)];
    let Some(layout) = layout else {
        lines.push(format!("{}(empty caption, nothing drawn)", indent(1)));
        return lines;
    };

    lines.push(format!("{}Font size: {:.1}px", indent(1), layout.font_size));
    lines.push(format!(
        "{}Stroke width: {:.1}px",
        indent(1),
        layout.stroke_width
    ));
    lines.push(format!(
        "{}Line height: {:.1}px",
        indent(1),
        layout.line_height
    ));
    for (i, (y, text)) in layout.positioned_lines().enumerate() {
        lines.push(format!(
            "{}{} y={:.1} {}",
            indent(1),
            format_index(i + 1),
            y,
            text
        ));
    }
    if layout.overflows(height) {
        lines.push(format!(
            "{}Overflow: caption runs past the bottom edge",
            indent(1)
        ));
    }
    lines
}

pub fn format_saved(path: &Path) -> Vec<String> {
    vec![format!("Saved → {}", path.display())]
}

// ============================================================================
// Interactive help
// ============================================================================

pub fn format_help() -> Vec<String> {
    [
        "Commands:",
        "    load <path>       load an image and caption it (or just drop a file here)",
        "    regenerate, r     ask for a new caption",
        "    download [dir], d save the captioned image",
        "    show              show the current image and caption",
        "    reset             start over",
        "    help              show this help",
        "    quit, q           exit",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
