//! Tool configuration module.
//!
//! Handles loading, validating, and merging `memecap.toml`. Stock defaults
//! are overridden by whatever the user file specifies; everything else keeps
//! its default.
//!
//! ## Config File Location
//!
//! `memecap.toml` in the working directory is picked up automatically if it
//! exists. `--config PATH` points somewhere else, and then the file must
//! exist.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [provider]
//! api_url = "https://api.anthropic.com/v1"
//! model = "claude-sonnet-4-20250514"
//! max_tokens = 1000
//! timeout_secs = 60
//! api_key_env = "ANTHROPIC_API_KEY"   # env var holding the key
//!
//! [render]
//! # font_path = "/usr/share/fonts/truetype/msttcorefonts/Impact.ttf"
//! start_y = 50.0                      # baseline of the first caption line
//! uppercase = true
//!
//! [export]
//! file_name = "meme.png"
//! directory = "."
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [render]
//! font_path = "/home/me/fonts/Anton-Regular.ttf"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::compositing::RenderOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "memecap.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `memecap.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Captioning API settings.
    pub provider: ProviderConfig,
    /// Caption rendering settings.
    pub render: RenderConfig,
    /// Where exported memes go.
    pub export: ExportConfig,
}

impl Config {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let provider = &self.provider;
        if provider.api_url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "provider.api_url must not be empty".into(),
            ));
        }
        if provider.model.trim().is_empty() {
            return Err(ConfigError::Validation(
                "provider.model must not be empty".into(),
            ));
        }
        if provider.api_key_env.trim().is_empty() {
            return Err(ConfigError::Validation(
                "provider.api_key_env must not be empty".into(),
            ));
        }
        if provider.max_tokens == 0 {
            return Err(ConfigError::Validation(
                "provider.max_tokens must be greater than 0".into(),
            ));
        }
        if provider.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "provider.timeout_secs must be greater than 0".into(),
            ));
        }
        if !self.render.start_y.is_finite() {
            return Err(ConfigError::Validation(
                "render.start_y must be a finite number".into(),
            ));
        }
        let name = &self.export.file_name;
        if name.contains('/') || name.contains('\\') {
            return Err(ConfigError::Validation(
                "export.file_name must be a bare file name".into(),
            ));
        }
        if !name.to_ascii_lowercase().ends_with(".png") || name.len() <= ".png".len() {
            return Err(ConfigError::Validation(
                "export.file_name must be a .png file name".into(),
            ));
        }
        Ok(())
    }
}

/// Captioning API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    /// Base URL of the Messages API (`/messages` is appended).
    pub api_url: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Whole-request timeout.
    pub timeout_secs: u64,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.anthropic.com/v1".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 1000,
            timeout_secs: 60,
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
        }
    }
}

/// Caption rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Font file to use instead of system discovery.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_path: Option<PathBuf>,
    /// Baseline of the first caption line, in pixels from the top.
    pub start_y: f32,
    /// Upper-case captions before drawing.
    pub uppercase: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        let options = RenderOptions::default();
        Self {
            font_path: None,
            start_y: options.start_y,
            uppercase: options.uppercase,
        }
    }
}

impl RenderConfig {
    pub fn options(&self) -> RenderOptions {
        RenderOptions {
            start_y: self.start_y,
            uppercase: self.uppercase,
        }
    }
}

/// Export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// File name for exported memes. Existing files are never overwritten;
    /// a numbered variant is used instead.
    pub file_name: String,
    /// Directory exported memes are written to.
    pub directory: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: "meme.png".to_string(),
            directory: PathBuf::from("."),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(Config::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<Config, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: Config = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path` if it exists, stock defaults otherwise.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let overlay = load_raw_config(path)?;
    if overlay.is_some() {
        tracing::debug!(path = %path.display(), "loaded config file");
    }
    resolve_config(stock_defaults_value(), overlay)
}

/// Load config from `path`, which must exist.
pub fn load_required_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("config file not found: {}", path.display()),
        )));
    }
    load_config(path)
}

/// Returns a fully-commented stock `memecap.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# memecap configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# memecap reads ./memecap.toml when it exists, or the file given with
# --config. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Captioning API
# ---------------------------------------------------------------------------
[provider]
# Base URL of the Anthropic Messages API. "/messages" is appended.
api_url = "https://api.anthropic.com/v1"

# Model asked for captions. It must accept image input.
model = "claude-sonnet-4-20250514"

# Upper bound on tokens generated per caption.
max_tokens = 1000

# Give up on a caption request after this many seconds.
timeout_secs = 60

# Environment variable holding the API key. The key itself never goes in
# this file.
api_key_env = "ANTHROPIC_API_KEY"

# ---------------------------------------------------------------------------
# Caption rendering
# ---------------------------------------------------------------------------
[render]
# Font used for captions. When unset, memecap looks for Impact and then
# for a bold sans face in the usual system font directories.
# font_path = "/usr/share/fonts/truetype/msttcorefonts/Impact.ttf"

# Baseline of the first caption line, in pixels from the top edge.
start_y = 50.0

# Upper-case captions before drawing them.
uppercase = true

# ---------------------------------------------------------------------------
# Export
# ---------------------------------------------------------------------------
[export]
# Name of the exported PNG. If it exists, "meme (1).png", "meme (2).png", ...
# are tried instead.
file_name = "meme.png"

# Directory exported memes are written to.
directory = "."
"##
}
