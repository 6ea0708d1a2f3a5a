use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::{parse_json_payload, ResponseSchema, ServiceError};

/// A text (optionally structured JSON) generation request
#[derive(Debug, Clone, PartialEq)]
pub struct TextRequest {
    pub prompt: String,
    /// When set, the model is asked for JSON of this shape
    pub schema: Option<ResponseSchema>,
    pub temperature: Option<f32>,
}

impl TextRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            schema: None,
            temperature: None,
        }
    }

    pub fn with_schema(mut self, schema: ResponseSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// An illustration request
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
    pub prompt: String,
    /// e.g. "1:1", "4:3"
    pub aspect_ratio: String,
}

/// A speech synthesis request
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRequest {
    pub text: String,
    pub voice: String,
}

/// Inline image returned by the provider
#[derive(Debug, Clone, PartialEq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data_base64: String,
}

/// Inline audio returned by the provider (PCM16 LE mono)
#[derive(Debug, Clone, PartialEq)]
pub struct InlineAudio {
    pub sample_rate: u32,
    pub pcm: Vec<u8>,
}

/// Outbound model calls
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    /// Generate text. With a schema set, the text is the JSON payload.
    async fn generate_text(&self, request: TextRequest) -> Result<String, ServiceError>;

    async fn generate_image(&self, request: ImageRequest) -> Result<InlineImage, ServiceError>;

    async fn synthesize_speech(&self, request: SpeechRequest) -> Result<InlineAudio, ServiceError>;
}

/// Run a structured request and decode the payload into `T`
pub async fn generate_json<T: DeserializeOwned>(
    client: &dyn GenerativeClient,
    request: TextRequest,
) -> Result<T, ServiceError> {
    let text = client.generate_text(request).await?;
    parse_json_payload(&text)
}
