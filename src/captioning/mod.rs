//! Caption generation through a multimodal text API.
//!
//! - **Provider**: [`CaptionProvider`] trait, [`ProviderError`], and the
//!   placeholder recovery helper [`caption_or_placeholder`]
//! - **Media types**: [`normalize_media_type`] maps declared labels onto the
//!   four the API accepts
//! - **Anthropic**: [`AnthropicProvider`], the production implementation

pub mod anthropic;
pub mod media_type;
pub mod provider;

pub use anthropic::{AnthropicProvider, parse_caption};
pub use media_type::{ACCEPTED_MEDIA_TYPES, DEFAULT_MEDIA_TYPE, normalize_media_type};
pub use provider::{
    CAPTION_PROMPT, CaptionProvider, PLACEHOLDER_CAPTION, ProviderError, caption_or_placeholder,
};
