//! Flashcard illustrations
//!
//! Images are generated once per term and kept in the media cache. Every
//! attempt first makes sure an API key is selected, asking for one if not.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

use crate::ai::{GenerativeClient, ImageRequest, ServiceError};
use crate::credentials::CredentialProvider;
use crate::storage::{CachedImage, MediaCache};

/// Illustrations are square cards
pub const ILLUSTRATION_ASPECT_RATIO: &str = "1:1";

#[derive(Error, Debug)]
pub enum IllustrationError {
    #[error("No API key selected")]
    CredentialRequired,

    #[error("API key invalid or reset: {0}")]
    CredentialInvalid(String),

    #[error("Image quota exhausted: {0}")]
    QuotaExhausted(String),

    #[error("Image generation failed: {0}")]
    Generation(ServiceError),
}

impl From<ServiceError> for IllustrationError {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::CredentialInvalid(msg) => IllustrationError::CredentialInvalid(msg),
            ServiceError::QuotaExhausted(msg) => IllustrationError::QuotaExhausted(msg),
            other => IllustrationError::Generation(other),
        }
    }
}

pub struct Illustrator {
    client: Arc<dyn GenerativeClient>,
    credentials: Arc<dyn CredentialProvider>,
    media: Arc<MediaCache>,
}

impl Illustrator {
    pub fn new(
        client: Arc<dyn GenerativeClient>,
        credentials: Arc<dyn CredentialProvider>,
        media: Arc<MediaCache>,
    ) -> Self {
        Self {
            client,
            credentials,
            media,
        }
    }

    fn ensure_credential(&self) -> Result<(), IllustrationError> {
        if self.credentials.has_selected() {
            return Ok(());
        }
        match self.credentials.select() {
            Ok(true) => Ok(()),
            Ok(false) => Err(IllustrationError::CredentialRequired),
            Err(e) => {
                log::warn!("API key selection failed: {}", e);
                Err(IllustrationError::CredentialRequired)
            }
        }
    }

    /// Illustration for a term, from the cache or freshly generated.
    /// `hint` (e.g. the English meaning) helps the model pick the right picture.
    pub async fn illustrate(
        &self,
        term: &str,
        hint: Option<&str>,
    ) -> Result<CachedImage, IllustrationError> {
        self.ensure_credential()?;

        match self.media.get_image(term) {
            Ok(Some(image)) => {
                log::debug!("Illustration cache hit for {}", term);
                return Ok(image);
            }
            Ok(None) => {}
            Err(e) => log::warn!("Media cache read failed for {}: {}", term, e),
        }

        let request = ImageRequest {
            prompt: illustration_prompt(term, hint),
            aspect_ratio: ILLUSTRATION_ASPECT_RATIO.to_string(),
        };
        let image = self.client.generate_image(request).await.map_err(|e| {
            log::warn!("Illustration for {} failed: {}", term, e);
            IllustrationError::from(e)
        })?;

        if let Err(e) = STANDARD.decode(image.data_base64.as_bytes()) {
            return Err(IllustrationError::Generation(ServiceError::InvalidResponse(
                format!("image payload is not base64: {}", e),
            )));
        }

        match self.media.put_image(term, &image.mime_type, &image.data_base64) {
            Ok(cached) => Ok(cached),
            Err(e) => {
                log::error!("Failed to cache illustration for {}: {}", term, e);
                Ok(CachedImage {
                    term: term.to_string(),
                    mime_type: image.mime_type,
                    data_base64: image.data_base64,
                    created_at: chrono::Utc::now(),
                })
            }
        }
    }
}

fn illustration_prompt(term: &str, hint: Option<&str>) -> String {
    let subject = match hint {
        Some(hint) if !hint.trim().is_empty() => format!("\"{}\" ({})", term, hint.trim()),
        _ => format!("\"{}\"", term),
    };
    format!(
        "A bright, friendly cartoon illustration for a children's French flashcard showing {}. \
         Simple shapes, soft colours, plain background, no text or letters in the image.",
        subject
    )
}
