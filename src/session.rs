//! Session state: the current image, its caption, and request bookkeeping.
//!
//! A [`Session`] owns everything the tool knows at a given moment. It moves
//! through three observable states:
//!
//! ```text
//! empty ──load──▶ image + caption request ──result──▶ image + caption
//!   ▲                     │  ▲                              │
//!   └───────reset─────────┘  └──────────regenerate──────────┘
//! ```
//!
//! ## Last writer wins
//!
//! Every caption request takes a [`RequestTicket`] stamped with the session
//! generation. Loading, regenerating, and resetting all advance the
//! generation, so a result that arrives for an older ticket is dropped
//! instead of overwriting something newer.
//!
//! ## Failure policy
//!
//! A failed request never surfaces as an error from the session. The first
//! request for an image that fails leaves the placeholder caption in the
//! slot. A failed *regenerate* keeps a caption that was already generated
//! and reports the failure through [`CaptionOutcome::Preserved`].

use crate::captioning::{CaptionProvider, PLACEHOLDER_CAPTION, ProviderError};
use crate::compositing::{RenderBackend, RenderError, RenderOptions, compose};
use crate::download::{self, DownloadError};
use crate::source::{self, InputError, LoadedImage};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No image loaded")]
    NoImage,
    #[error("A caption request is still in flight")]
    RequestInFlight,
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Download(#[from] DownloadError),
}

/// What the caption slot currently holds.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CaptionSlot {
    /// No caption yet (nothing loaded, or a request is pending).
    #[default]
    Empty,
    /// A caption returned by the provider.
    Generated(String),
    /// Requests failed; [`PLACEHOLDER_CAPTION`] is shown.
    Placeholder,
}

impl CaptionSlot {
    /// Text a user would see, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            CaptionSlot::Empty => None,
            CaptionSlot::Generated(caption) => Some(caption),
            CaptionSlot::Placeholder => Some(PLACEHOLDER_CAPTION),
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, CaptionSlot::Generated(_))
    }
}

/// Proof of having started a caption request at a given generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    generation: u64,
}

impl RequestTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// How a caption result was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptionOutcome {
    /// The new caption is now in the slot.
    Applied,
    /// The request failed and the placeholder is shown.
    Recovered { error: String },
    /// The request failed; the previous caption was kept.
    Preserved { error: String },
    /// A newer request or a reset superseded this one; nothing changed.
    Stale,
}

#[derive(Debug, Default)]
pub struct Session {
    image: Option<Arc<LoadedImage>>,
    caption: CaptionSlot,
    generation: u64,
    in_flight: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn image(&self) -> Option<&LoadedImage> {
        self.image.as_deref()
    }

    pub fn caption(&self) -> &CaptionSlot {
        &self.caption
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Load `path`, replace the current image, and request a caption.
    ///
    /// An unreadable or non-image file leaves the session untouched.
    pub async fn load(
        &mut self,
        path: &Path,
        provider: &dyn CaptionProvider,
    ) -> Result<CaptionOutcome, SessionError> {
        let image = source::load(path).await?;
        self.replace_image(image);
        self.regenerate(provider).await
    }

    /// Swap in a new image and clear its caption. Requests issued for the
    /// old image become stale.
    pub fn replace_image(&mut self, image: LoadedImage) {
        self.image = Some(Arc::new(image));
        self.caption = CaptionSlot::Empty;
        self.generation += 1;
        self.in_flight = false;
    }

    /// Request a fresh caption for the current image.
    pub async fn regenerate(
        &mut self,
        provider: &dyn CaptionProvider,
    ) -> Result<CaptionOutcome, SessionError> {
        let image = self.image.clone().ok_or(SessionError::NoImage)?;
        let ticket = self.begin_request();
        let result = provider
            .request_caption(&image.bytes, &image.media_type)
            .await;
        Ok(self.apply_caption(ticket, result))
    }

    /// Start a request: advance the generation and mark it in flight.
    pub fn begin_request(&mut self) -> RequestTicket {
        self.generation += 1;
        self.in_flight = true;
        RequestTicket {
            generation: self.generation,
        }
    }

    /// Commit a request result if `ticket` is still the latest one.
    pub fn apply_caption(
        &mut self,
        ticket: RequestTicket,
        result: Result<String, ProviderError>,
    ) -> CaptionOutcome {
        if ticket.generation != self.generation {
            tracing::debug!(
                ticket = ticket.generation,
                current = self.generation,
                "dropping stale caption result"
            );
            return CaptionOutcome::Stale;
        }
        self.in_flight = false;

        match result {
            Ok(caption) => {
                tracing::debug!(%caption, "caption applied");
                self.caption = CaptionSlot::Generated(caption);
                CaptionOutcome::Applied
            }
            Err(e) => {
                tracing::error!(error = %e, "caption request failed");
                let error = e.to_string();
                if self.caption.is_generated() {
                    CaptionOutcome::Preserved { error }
                } else {
                    self.caption = CaptionSlot::Placeholder;
                    CaptionOutcome::Recovered { error }
                }
            }
        }
    }

    /// Burn the current caption into the current image and return PNG bytes.
    pub fn render<B: RenderBackend>(
        &self,
        backend: &B,
        options: &RenderOptions,
    ) -> Result<Vec<u8>, SessionError> {
        if self.in_flight {
            return Err(SessionError::RequestInFlight);
        }
        let image = self.image.as_ref().ok_or(SessionError::NoImage)?;
        let caption = self.caption.text().unwrap_or_default();
        Ok(compose(backend, &image.raster, caption, options)?)
    }

    /// Render and save into `dir`, never overwriting an existing file.
    pub fn export<B: RenderBackend>(
        &self,
        backend: &B,
        options: &RenderOptions,
        dir: &Path,
        file_name: &str,
    ) -> Result<PathBuf, SessionError> {
        let png = self.render(backend, options)?;
        Ok(download::save(&png, dir, file_name)?)
    }

    /// Forget the image and caption. Any request in flight becomes stale.
    pub fn reset(&mut self) {
        self.image = None;
        self.caption = CaptionSlot::Empty;
        self.generation += 1;
        self.in_flight = false;
    }
}
