//! Caption provider trait, errors, and the placeholder recovery contract.

use async_trait::async_trait;
use thiserror::Error;

/// Instruction sent alongside the image.
pub const CAPTION_PROMPT: &str = "Generate a short, funny meme caption for this image. \
The caption should be witty, relatable, and follow current meme trends. \
Keep it under 100 characters and make it punchy. Return ONLY the caption text, nothing else.";

/// Caption shown when a request fails.
pub const PLACEHOLDER_CAPTION: &str = "Error generating caption. Try again!";

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("API key not set (export {0})")]
    MissingApiKey(String),
    #[error("HTTP client setup failed: {0}")]
    Client(String),
    #[error("Caption request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Caption service returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Malformed caption response: {0}")]
    Malformed(String),
}

/// Anything that can turn image bytes into a caption.
#[async_trait]
pub trait CaptionProvider: Send + Sync {
    /// Ask for a caption. `media_type_hint` is the label the image was
    /// loaded with; implementations normalise it themselves.
    async fn request_caption(
        &self,
        image_bytes: &[u8],
        media_type_hint: &str,
    ) -> Result<String, ProviderError>;
}

/// Resolve a provider result to something displayable.
///
/// Errors are logged and replaced with [`PLACEHOLDER_CAPTION`]; they never
/// propagate past this point.
pub fn caption_or_placeholder(result: Result<String, ProviderError>) -> String {
    match result {
        Ok(caption) => caption,
        Err(e) => {
            tracing::error!(error = %e, "caption request failed");
            PLACEHOLDER_CAPTION.to_string()
        }
    }
}
