//! Media-type labels accepted by the captioning API.
//!
//! The Messages API takes only four image types. Whatever the input file
//! declared is mapped onto that set before the request goes out; anything
//! unrecognised is sent as JPEG and left for the API to sort out.

/// Labels the captioning API accepts for inline images.
pub const ACCEPTED_MEDIA_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Label used for anything outside [`ACCEPTED_MEDIA_TYPES`].
pub const DEFAULT_MEDIA_TYPE: &str = "image/jpeg";

/// Map a declared media type onto one the API accepts.
///
/// ```
/// # use memecap::captioning::normalize_media_type;
/// assert_eq!(normalize_media_type("image/jpg"), "image/jpeg");
/// assert_eq!(normalize_media_type("image/png"), "image/png");
/// assert_eq!(normalize_media_type("image/tiff"), "image/jpeg");
/// ```
pub fn normalize_media_type(label: &str) -> &'static str {
    let label = label.trim().to_ascii_lowercase();
    let label = match label.as_str() {
        "image/jpg" | "image/pjpeg" => "image/jpeg",
        other => other,
    };
    ACCEPTED_MEDIA_TYPES
        .iter()
        .copied()
        .find(|accepted| *accepted == label)
        .unwrap_or(DEFAULT_MEDIA_TYPE)
}
