//! Pure layout calculations for caption text.
//!
//! Nothing here touches pixels or fonts directly: width measurement is passed
//! in as a closure, so every function is testable with a fixed-advance
//! measurer.

/// Smallest font size ever used, regardless of image width.
pub const MIN_FONT_SIZE: f64 = 24.0;
/// Font size is `image_width / WIDTH_DIVISOR` above the floor.
pub const WIDTH_DIVISOR: f64 = 20.0;
/// Outline width is `font_size / STROKE_DIVISOR`.
pub const STROKE_DIVISOR: f64 = 12.0;
/// Line pitch as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f64 = 1.2;
/// Fraction of the image width a line may occupy before wrapping.
pub const WRAP_RATIO: f64 = 0.9;
/// Default baseline of the first line.
pub const START_Y: f32 = 50.0;

// Ratios are applied in f64 and narrowed once, so round numbers stay round
// (`50 * 1.2` is exactly 60.0, not 60.000004).

/// Font size for an image of the given width.
///
/// ```
/// # use memecap::compositing::layout::font_size;
/// assert_eq!(font_size(400), 24.0); // floor applies
/// assert_eq!(font_size(1000), 50.0);
/// ```
pub fn font_size(image_width: u32) -> f32 {
    (image_width as f64 / WIDTH_DIVISOR).max(MIN_FONT_SIZE) as f32
}

pub fn stroke_width(font_size: f32) -> f32 {
    (font_size as f64 / STROKE_DIVISOR) as f32
}

pub fn line_height(font_size: f32) -> f32 {
    (font_size as f64 * LINE_HEIGHT_FACTOR) as f32
}

/// Maximum measured width of a line before the next word wraps.
pub fn wrap_width(image_width: u32) -> f32 {
    (image_width as f64 * WRAP_RATIO) as f32
}

/// Greedy single-pass word wrap.
///
/// Words are split on whitespace and joined with single spaces. Each word is
/// tentatively appended to the current line; if the measured result is wider
/// than `max_width` the current line is committed and the word starts a new
/// one. A word wider than `max_width` is never broken; it gets its own line
/// and overflows.
///
/// Returns an empty vector when `text` contains no words.
pub fn wrap_words(text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> Vec<String> {
    let mut words = text.split_whitespace();
    let Some(first) = words.next() else {
        return Vec::new();
    };

    let mut lines = Vec::new();
    let mut current = first.to_string();
    for word in words {
        let candidate = format!("{current} {word}");
        if measure(&candidate) > max_width {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }
    lines.push(current);
    lines
}

/// Derived, per-render layout of a caption.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    pub font_size: f32,
    pub stroke_width: f32,
    pub line_height: f32,
    /// Baseline of the first line.
    pub start_y: f32,
    /// Lines in top-down order, exactly as they will be drawn.
    pub lines: Vec<String>,
}

impl TextLayout {
    pub fn new(font_size: f32, start_y: f32, lines: Vec<String>) -> Self {
        Self {
            font_size,
            stroke_width: stroke_width(font_size),
            line_height: line_height(font_size),
            start_y,
            lines,
        }
    }

    /// Baseline `y` of the line at `index`.
    pub fn baseline(&self, index: usize) -> f32 {
        self.start_y + index as f32 * self.line_height
    }

    /// Iterate `(baseline, line)` pairs top-down.
    pub fn positioned_lines(&self) -> impl Iterator<Item = (f32, &str)> {
        self.lines
            .iter()
            .enumerate()
            .map(|(i, line)| (self.baseline(i), line.as_str()))
    }

    /// Whether the last baseline lands below the bottom edge.
    pub fn overflows(&self, image_height: u32) -> bool {
        match self.lines.len() {
            0 => false,
            n => self.baseline(n - 1) > image_height as f32,
        }
    }
}
