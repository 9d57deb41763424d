//! Hand exported bytes to the filesystem without clobbering anything.
//!
//! `meme.png` is tried first, then `meme (1).png`, `meme (2).png`, and so
//! on, the way browsers name repeated downloads. Files are opened with
//! `create_new`, so a name that appears between the check and the write is
//! skipped rather than overwritten.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Give up after this many numbered variants.
const MAX_ATTEMPTS: u32 = 10_000;

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("No free file name for {name} in {}", dir.display())]
    Exhausted { dir: PathBuf, name: String },
}

/// `attempt`-th candidate name: 0 is `file_name` itself.
pub fn numbered_name(file_name: &str, attempt: u32) -> String {
    if attempt == 0 {
        return file_name.to_string();
    }
    let path = Path::new(file_name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match path.extension() {
        Some(ext) => format!("{stem} ({attempt}).{}", ext.to_string_lossy()),
        None => format!("{stem} ({attempt})"),
    }
}

/// First candidate path in `dir` that does not exist yet.
pub fn available_path(dir: &Path, file_name: &str) -> Option<PathBuf> {
    (0..MAX_ATTEMPTS)
        .map(|attempt| dir.join(numbered_name(file_name, attempt)))
        .find(|path| !path.exists())
}

/// Write `bytes` to a fresh file in `dir`, creating `dir` if needed.
///
/// Returns the path actually written.
pub fn save(bytes: &[u8], dir: &Path, file_name: &str) -> Result<PathBuf, DownloadError> {
    fs::create_dir_all(dir).map_err(|source| DownloadError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    for attempt in 0..MAX_ATTEMPTS {
        let path = dir.join(numbered_name(file_name, attempt));
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(source) => return Err(DownloadError::Io { path, source }),
        };
        file.write_all(bytes)
            .and_then(|()| file.flush())
            .map_err(|source| DownloadError::Io {
                path: path.clone(),
                source,
            })?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "saved");
        return Ok(path);
    }

    Err(DownloadError::Exhausted {
        dir: dir.to_path_buf(),
        name: file_name.to_string(),
    })
}
