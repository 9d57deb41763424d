//! Image acquisition: validate, read, and decode a user-supplied file.
//!
//! A file is accepted by its *declared* type, the media type its extension
//! implies, before a single byte is read. Anything not declared as `image/*`
//! is rejected with [`InputError::NotAnImage`] and never reaches the caption
//! provider. The declared label travels with the decoded raster unchanged;
//! normalising it for the API is the provider's job.
//!
//! Terminals paste dropped files in a handful of shapes, so
//! [`parse_dropped_path`] turns quoted paths, `file://` URLs and
//! backslash-escaped spaces back into a plain path.

use image::{DynamicImage, ImageFormat};
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("{} is not an image ({})", path.display(), declared.as_deref().unwrap_or("unknown type"))]
    NotAnImage {
        path: PathBuf,
        declared: Option<String>,
    },
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to decode {label}: {reason}")]
    Decode { label: String, reason: String },
}

/// A decoded image plus the bytes and label it was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    /// Decoded pixels, immutable once loaded.
    pub raster: DynamicImage,
    /// The file as read, sent to the caption provider as-is.
    pub bytes: Vec<u8>,
    /// Declared media type, verbatim.
    pub media_type: String,
    /// Display name (file name for files on disk).
    pub name: String,
}

impl LoadedImage {
    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    pub fn height(&self) -> u32 {
        self.raster.height()
    }
}

/// Media types for common non-image files, so rejections can say what the
/// file was instead of "unknown".
const NON_IMAGE_TYPES: &[(&str, &str)] = &[
    ("txt", "text/plain"),
    ("md", "text/markdown"),
    ("csv", "text/csv"),
    ("html", "text/html"),
    ("htm", "text/html"),
    ("json", "application/json"),
    ("toml", "application/toml"),
    ("pdf", "application/pdf"),
    ("zip", "application/zip"),
    ("mp4", "video/mp4"),
    ("mov", "video/quicktime"),
    ("webm", "video/webm"),
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
];

/// Media type implied by the file extension, if it is a known one.
///
/// ```
/// # use std::path::Path;
/// # use memecap::source::declared_media_type;
/// assert_eq!(declared_media_type(Path::new("cat.JPG")).as_deref(), Some("image/jpeg"));
/// assert_eq!(declared_media_type(Path::new("notes.txt")).as_deref(), Some("text/plain"));
/// assert_eq!(declared_media_type(Path::new("README")), None);
/// ```
pub fn declared_media_type(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    if ext == "svg" {
        return Some("image/svg+xml".to_string());
    }
    if let Some(format) = ImageFormat::from_extension(&ext) {
        return Some(format.to_mime_type().to_string());
    }
    NON_IMAGE_TYPES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| mime.to_string())
}

fn is_image_type(declared: Option<&str>) -> bool {
    declared.is_some_and(|t| t.to_ascii_lowercase().starts_with("image/"))
}

/// Load an image file from disk.
///
/// The declared type is checked first; reading and decoding only happen for
/// files that claim to be images.
pub async fn load(path: &Path) -> Result<LoadedImage, InputError> {
    let declared = declared_media_type(path);
    if !is_image_type(declared.as_deref()) {
        return Err(InputError::NotAnImage {
            path: path.to_path_buf(),
            declared,
        });
    }

    let bytes = tokio::fs::read(path).await.map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let loaded = load_bytes(bytes, declared.as_deref(), &name)?;
    tracing::debug!(
        name = %loaded.name,
        media_type = %loaded.media_type,
        width = loaded.width(),
        height = loaded.height(),
        "image loaded"
    );
    Ok(loaded)
}

/// Decode in-memory bytes that were declared as `declared`.
pub fn load_bytes(
    bytes: Vec<u8>,
    declared: Option<&str>,
    name: &str,
) -> Result<LoadedImage, InputError> {
    let media_type = match declared {
        Some(t) if is_image_type(Some(t)) => t.to_string(),
        _ => {
            return Err(InputError::NotAnImage {
                path: PathBuf::from(name),
                declared: declared.map(String::from),
            });
        }
    };

    let raster = image::load_from_memory(&bytes).map_err(|e| InputError::Decode {
        label: name.to_string(),
        reason: e.to_string(),
    })?;

    Ok(LoadedImage {
        raster,
        bytes,
        media_type,
        name: name.to_string(),
    })
}

/// Turn a pasted or dropped path back into a filesystem path.
///
/// Handles `file://` URLs with percent-escapes, Windows and UNC paths, and
/// shell-quoted or backslash-escaped paths. Anything that does not unescape
/// to a single token is taken literally, minus surrounding quotes.
pub fn parse_dropped_path(raw: &str) -> PathBuf {
    let pasted = raw.trim();
    let unquoted = strip_quotes(pasted);

    if let Ok(url) = Url::parse(unquoted) {
        if url.scheme() == "file" {
            if let Ok(path) = url.to_file_path() {
                return path;
            }
        }
    }

    // POSIX shell rules would eat the backslashes in C:\Users\...
    if looks_like_windows_path(unquoted) {
        return PathBuf::from(unquoted);
    }

    let mut parts = shlex::Shlex::new(pasted);
    match (parts.next(), parts.next()) {
        (Some(single), None) if !parts.had_error => PathBuf::from(single),
        _ => PathBuf::from(unquoted),
    }
}

fn strip_quotes(s: &str) -> &str {
    for quote in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            return &s[1..s.len() - 1];
        }
    }
    s
}

fn looks_like_windows_path(s: &str) -> bool {
    let bytes = s.as_bytes();
    let drive = bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'\\' || bytes[2] == b'/');
    drive || s.starts_with("\\\\")
}
