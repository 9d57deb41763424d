//! Font discovery and loading.
//!
//! Meme captions want Impact. It is rarely installed outside Windows and
//! macOS, so resolution walks an ordered preference list and then falls back
//! to any sans face on the system:
//!
//! 1. The `[render] font_path` from config, if set. A configured path that
//!    fails to load is an error, not a silent fallback.
//! 2. The first [`PREFERRED_FACES`] entry found under the system font
//!    directories (bold display faces first, then regular sans faces).
//! 3. Any `*.ttf`/`*.otf`/`*.ttc` whose name contains "sans", bold first.
//! 4. Any font file at all.

use super::surface::RenderError;
use ab_glyph::FontVec;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use walkdir::WalkDir;

/// Preferred font files, matched case-insensitively by file name.
///
/// The flag records whether the face is already bold; non-bold faces get a
/// synthetic emboldening pass when drawn.
pub const PREFERRED_FACES: &[(&str, bool)] = &[
    ("impact.ttf", true),
    ("anton-regular.ttf", true),
    ("bebasneue-regular.ttf", true),
    ("dejavusans-bold.ttf", true),
    ("liberationsans-bold.ttf", true),
    ("arial bold.ttf", true),
    ("arialbd.ttf", true),
    ("freesansbold.ttf", true),
    ("notosans-bold.ttf", true),
    ("dejavusans.ttf", false),
    ("liberationsans-regular.ttf", false),
    ("arial.ttf", false),
    ("freesans.ttf", false),
    ("notosans-regular.ttf", false),
];

const FONT_EXTENSIONS: &[&str] = &["ttf", "otf", "ttc"];

fn font_dirs() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = [
        "/usr/share/fonts",
        "/usr/local/share/fonts",
        "/Library/Fonts",
        "/System/Library/Fonts",
        "C:\\Windows\\Fonts",
    ]
    .iter()
    .map(PathBuf::from)
    .collect();
    if let Some(home) = std::env::var_os("HOME") {
        let home = PathBuf::from(home);
        dirs.push(home.join(".fonts"));
        dirs.push(home.join(".local/share/fonts"));
        dirs.push(home.join("Library/Fonts"));
    }
    dirs
}

fn is_font_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| FONT_EXTENSIONS.iter().any(|f| e.eq_ignore_ascii_case(f)))
}

/// Every font file under the system font directories, sorted for a stable
/// fallback order. Scanned once per process.
static SYSTEM_FONTS: LazyLock<Vec<PathBuf>> = LazyLock::new(|| {
    let mut fonts: Vec<PathBuf> = font_dirs()
        .into_iter()
        .filter(|dir| dir.is_dir())
        .flat_map(|dir| {
            WalkDir::new(dir)
                .follow_links(true)
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file())
                .map(|entry| entry.into_path())
                .filter(|path| is_font_file(path))
                .collect::<Vec<_>>()
        })
        .collect();
    fonts.sort();
    tracing::debug!(count = fonts.len(), "indexed system fonts");
    fonts
});

/// All font files found on this machine.
pub fn system_fonts() -> &'static [PathBuf] {
    &SYSTEM_FONTS
}

fn file_name_lower(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Pick the best candidate from `available`, returning the path and whether
/// the face is bold.
pub fn pick_font(available: &[PathBuf]) -> Option<(PathBuf, bool)> {
    for (name, bold) in PREFERRED_FACES {
        if let Some(path) = available.iter().find(|p| file_name_lower(p) == *name) {
            return Some((path.clone(), *bold));
        }
    }

    let sans: Vec<&PathBuf> = available
        .iter()
        .filter(|p| file_name_lower(p).contains("sans"))
        .collect();
    if let Some(path) = sans.iter().find(|p| file_name_lower(p).contains("bold")) {
        return Some(((*path).clone(), true));
    }
    if let Some(path) = sans.first() {
        return Some(((*path).clone(), false));
    }

    available.first().map(|p| {
        let bold = file_name_lower(p).contains("bold");
        (p.clone(), bold)
    })
}

/// A font ready for rasterization.
pub struct ResolvedFont {
    pub path: PathBuf,
    pub font: FontVec,
    pub bold: bool,
}

impl std::fmt::Debug for ResolvedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedFont")
            .field("path", &self.path)
            .field("bold", &self.bold)
            .finish()
    }
}

/// Read and parse a font file.
pub fn load_font(path: &Path, bold: bool) -> Result<ResolvedFont, RenderError> {
    let bytes = std::fs::read(path).map_err(|e| RenderError::FontLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let font = FontVec::try_from_vec(bytes).map_err(|e| RenderError::FontLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(ResolvedFont {
        path: path.to_path_buf(),
        font,
        bold,
    })
}

/// Resolve the caption font: configured path first, then system discovery.
pub fn resolve_font(configured: Option<&Path>) -> Result<ResolvedFont, RenderError> {
    if let Some(path) = configured {
        // Whatever the user pointed at is used as-is; assume they chose the weight.
        return load_font(path, true);
    }

    let (path, bold) = pick_font(system_fonts()).ok_or_else(|| RenderError::FontUnavailable {
        searched: font_dirs()
            .iter()
            .map(|d| d.display().to_string())
            .collect::<Vec<_>>()
            .join(", "),
    })?;
    tracing::debug!(path = %path.display(), bold, "resolved caption font");
    load_font(&path, bold)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names
            .iter()
            .map(|n| PathBuf::from("/fonts").join(n))
            .collect()
    }

    #[test]
    fn impact_wins_over_everything() {
        let available = paths(&["DejaVuSans-Bold.ttf", "Impact.ttf", "Arial.ttf"]);
        let (path, bold) = pick_font(&available).unwrap();
        assert_eq!(path, PathBuf::from("/fonts/Impact.ttf"));
        assert!(bold);
    }

    #[test]
    fn bold_sans_beats_regular_sans() {
        let available = paths(&["DejaVuSans.ttf", "DejaVuSans-Bold.ttf"]);
        let (path, bold) = pick_font(&available).unwrap();
        assert_eq!(path, PathBuf::from("/fonts/DejaVuSans-Bold.ttf"));
        assert!(bold);
    }

    #[test]
    fn regular_preferred_face_is_marked_not_bold() {
        let available = paths(&["LiberationSans-Regular.ttf", "Comic.ttf"]);
        let (path, bold) = pick_font(&available).unwrap();
        assert_eq!(path, PathBuf::from("/fonts/LiberationSans-Regular.ttf"));
        assert!(!bold);
    }

    #[test]
    fn falls_back_to_any_sans_face() {
        let available = paths(&["Serif.ttf", "UbuntuSans-Medium.ttf", "OpenSans-Bold.ttf"]);
        let (path, bold) = pick_font(&available).unwrap();
        assert_eq!(path, PathBuf::from("/fonts/OpenSans-Bold.ttf"));
        assert!(bold);
    }

    #[test]
    fn falls_back_to_first_font_of_any_kind() {
        let available = paths(&["Garamond.otf", "Zapf.ttf"]);
        let (path, bold) = pick_font(&available).unwrap();
        assert_eq!(path, PathBuf::from("/fonts/Garamond.otf"));
        assert!(!bold);
    }

    #[test]
    fn nothing_available_picks_nothing() {
        assert!(pick_font(&[]).is_none());
    }

    #[test]
    fn only_font_extensions_are_indexed() {
        assert!(is_font_file(Path::new("/a/Impact.TTF")));
        assert!(is_font_file(Path::new("/a/x.otf")));
        assert!(is_font_file(Path::new("/a/x.ttc")));
        assert!(!is_font_file(Path::new("/a/fonts.dir")));
        assert!(!is_font_file(Path::new("/a/README")));
    }

    #[test]
    fn configured_missing_font_is_a_load_error() {
        let result = resolve_font(Some(Path::new("/nonexistent/Impact.ttf")));
        assert!(matches!(result, Err(RenderError::FontLoad { .. })));
    }

    #[test]
    fn configured_non_font_file_is_a_load_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("not-a-font.ttf");
        std::fs::write(&path, b"definitely not sfnt").unwrap();
        let result = resolve_font(Some(&path));
        assert!(matches!(result, Err(RenderError::FontLoad { .. })));
    }
}
