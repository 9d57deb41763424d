//! Anthropic Messages API caption provider.
//!
//! One request per caption: a single `user` message carrying the image as an
//! inline base64 part followed by [`CAPTION_PROMPT`]. The caption is the
//! `text` of the first content block in the reply.

use super::media_type::normalize_media_type;
use super::provider::{CAPTION_PROMPT, CaptionProvider, ProviderError};
use crate::config::ProviderConfig;
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<RequestMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestMessage<'a> {
    role: &'static str,
    content: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RequestPart<'a> {
    Image { source: InlineImage<'a> },
    Text { text: &'a str },
}

#[derive(Debug, Serialize)]
struct InlineImage<'a> {
    #[serde(rename = "type")]
    source_type: &'static str,
    media_type: &'a str,
    data: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Option<Vec<ResponseBlock>>,
}

#[derive(Debug, Deserialize)]
struct ResponseBlock {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(rename = "type")]
    error_type: String,
    message: String,
}

/// Caption provider backed by the Anthropic Messages API.
pub struct AnthropicProvider {
    client: Client,
    settings: ProviderConfig,
    api_key: Option<String>,
}

impl AnthropicProvider {
    /// Build a provider with an explicit key. A `None` key is only reported
    /// when a request is attempted.
    pub fn new(settings: ProviderConfig, api_key: Option<String>) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| ProviderError::Client(e.to_string()))?;
        Ok(Self {
            client,
            settings,
            api_key,
        })
    }

    /// Build a provider reading the key from the environment variable named
    /// by `settings.api_key_env`.
    pub fn from_env(settings: ProviderConfig) -> Result<Self, ProviderError> {
        let api_key = std::env::var(&settings.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());
        Self::new(settings, api_key)
    }

    fn endpoint(&self) -> String {
        format!("{}/messages", self.settings.api_url.trim_end_matches('/'))
    }

    fn request_body<'a>(&'a self, image_bytes: &[u8], media_type: &'a str) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.settings.model,
            max_tokens: self.settings.max_tokens,
            messages: vec![RequestMessage {
                role: "user",
                content: vec![
                    RequestPart::Image {
                        source: InlineImage {
                            source_type: "base64",
                            media_type,
                            data: STANDARD.encode(image_bytes),
                        },
                    },
                    RequestPart::Text {
                        text: CAPTION_PROMPT,
                    },
                ],
            }],
        }
    }
}

/// Pull the caption out of a successful Messages API response body.
pub fn parse_caption(body: &str) -> Result<String, ProviderError> {
    let response: MessagesResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::Malformed(format!("invalid JSON: {e}")))?;
    let first = response
        .content
        .ok_or_else(|| ProviderError::Malformed("missing content array".into()))?
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::Malformed("empty content array".into()))?;
    let text = first
        .text
        .ok_or_else(|| ProviderError::Malformed("first content block has no text".into()))?;
    let caption = text.trim();
    if caption.is_empty() {
        return Err(ProviderError::Malformed("caption text is blank".into()));
    }
    Ok(caption.to_string())
}

/// Turn a non-success response into an error, keeping the API's own message
/// when the body has one.
fn parse_error(status: reqwest::StatusCode, body: &str) -> ProviderError {
    let message = match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(parsed) => format!("{} ({})", parsed.error.message, parsed.error.error_type),
        Err(_) if body.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("no response body")
            .to_string(),
        Err(_) => body.trim().to_string(),
    };
    ProviderError::Status {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl CaptionProvider for AnthropicProvider {
    async fn request_caption(
        &self,
        image_bytes: &[u8],
        media_type_hint: &str,
    ) -> Result<String, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::MissingApiKey(self.settings.api_key_env.clone()))?;
        let media_type = normalize_media_type(media_type_hint);
        let body = self.request_body(image_bytes, media_type);

        tracing::debug!(
            model = %self.settings.model,
            media_type,
            bytes = image_bytes.len(),
            "requesting caption"
        );
        let response = self
            .client
            .post(self.endpoint())
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(parse_error(status, &text));
        }
        parse_caption(&text)
    }
}
