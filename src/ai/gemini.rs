//! Gemini REST client (`models/{model}:generateContent`)

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{
    GenerativeClient, ImageRequest, InlineAudio, InlineImage, ServiceError, SpeechRequest,
    TextRequest,
};
use crate::config::{AppConfig, ModelConfig};
use crate::credentials::CredentialProvider;

/// Sample rate the speech model answers with when the MIME type omits it
pub const DEFAULT_SPEECH_SAMPLE_RATE: u32 = 24_000;

pub struct GeminiClient {
    client: Client,
    base_url: String,
    models: ModelConfig,
    credentials: Arc<dyn CredentialProvider>,
}

impl GeminiClient {
    pub fn new(
        config: &AppConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, ServiceError> {
        let base_url = config.api_base_url.trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ServiceError::Transport(format!(
                "API base URL must start with http:// or https://: {}",
                base_url
            )));
        }

        // No overall request timeout: image generation can take a while
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url,
            models: config.models.clone(),
            credentials,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    async fn generate_content(
        &self,
        model: &str,
        body: Value,
    ) -> Result<GenerateContentResponse, ServiceError> {
        let api_key = self
            .credentials
            .api_key()
            .ok_or_else(|| ServiceError::CredentialInvalid("no API key selected".to_string()))?;

        log::debug!("generateContent request to model {}", model);
        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let error = ServiceError::from_http(status, &text);
            log::warn!("generateContent failed for model {}: {}", model, error);
            return Err(error);
        }

        let text = response.text().await?;
        let parsed: GenerateContentResponse = serde_json::from_str(&text)?;
        if let Some(reason) = parsed
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_ref())
        {
            return Err(ServiceError::InvalidResponse(format!(
                "prompt blocked: {}",
                reason
            )));
        }
        Ok(parsed)
    }
}

#[async_trait]
impl GenerativeClient for GeminiClient {
    async fn generate_text(&self, request: TextRequest) -> Result<String, ServiceError> {
        let body = text_request_body(&request);
        let response = self.generate_content(&self.models.text, body).await?;
        response
            .first_text()
            .ok_or_else(|| ServiceError::InvalidResponse("response has no text".to_string()))
    }

    async fn generate_image(&self, request: ImageRequest) -> Result<InlineImage, ServiceError> {
        let body = image_request_body(&request);
        let response = self.generate_content(&self.models.image, body).await?;
        let inline = response
            .first_inline_data(|mime| mime.starts_with("image/"))
            .ok_or_else(|| ServiceError::InvalidResponse("response has no image".to_string()))?;

        Ok(InlineImage {
            mime_type: inline.mime_type,
            data_base64: inline.data,
        })
    }

    async fn synthesize_speech(&self, request: SpeechRequest) -> Result<InlineAudio, ServiceError> {
        let body = speech_request_body(&request);
        let response = self.generate_content(&self.models.speech, body).await?;
        let inline = response
            .first_inline_data(|mime| mime.starts_with("audio/"))
            .ok_or_else(|| ServiceError::InvalidResponse("response has no audio".to_string()))?;

        let pcm = STANDARD
            .decode(inline.data.as_bytes())
            .map_err(|e| ServiceError::InvalidResponse(format!("audio is not base64: {}", e)))?;

        Ok(InlineAudio {
            sample_rate: sample_rate_from_mime(&inline.mime_type)
                .unwrap_or(DEFAULT_SPEECH_SAMPLE_RATE),
            pcm,
        })
    }
}

// ===== Request bodies =====

fn user_contents(text: &str) -> Value {
    json!([{ "role": "user", "parts": [{ "text": text }] }])
}

pub(crate) fn text_request_body(request: &TextRequest) -> Value {
    let mut generation_config = serde_json::Map::new();
    if let Some(schema) = &request.schema {
        generation_config.insert("responseMimeType".into(), json!("application/json"));
        generation_config.insert("responseSchema".into(), schema.to_json());
    }
    if let Some(temperature) = request.temperature {
        generation_config.insert("temperature".into(), json!(temperature));
    }

    json!({
        "contents": user_contents(&request.prompt),
        "generationConfig": generation_config,
    })
}

pub(crate) fn image_request_body(request: &ImageRequest) -> Value {
    json!({
        "contents": user_contents(&request.prompt),
        "generationConfig": {
            "responseModalities": ["IMAGE"],
            "imageConfig": { "aspectRatio": request.aspect_ratio },
        },
    })
}

pub(crate) fn speech_request_body(request: &SpeechRequest) -> Value {
    json!({
        "contents": user_contents(&request.text),
        "generationConfig": {
            "responseModalities": ["AUDIO"],
            "speechConfig": {
                "voiceConfig": { "prebuiltVoiceConfig": { "voiceName": request.voice } }
            },
        },
    })
}

/// Extract `rate=NNNN` from an audio MIME type such as
/// `audio/L16;codec=pcm;rate=24000`
pub fn sample_rate_from_mime(mime: &str) -> Option<u32> {
    mime.split(';')
        .filter_map(|part| part.trim().strip_prefix("rate="))
        .find_map(|rate| rate.trim().parse().ok())
}

// ===== Response envelope =====

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Candidate {
    pub content: Option<Content>,
    #[allow(dead_code)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Part {
    pub text: Option<String>,
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PromptFeedback {
    pub block_reason: Option<String>,
}

impl GenerateContentResponse {
    fn parts(&self) -> impl Iterator<Item = &Part> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.iter())
            .into_iter()
            .flatten()
    }

    /// Concatenated text parts of the first candidate
    pub fn first_text(&self) -> Option<String> {
        let text: String = self.parts().filter_map(|p| p.text.as_deref()).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }

    pub fn first_inline_data(&self, accept: impl Fn(&str) -> bool) -> Option<InlineData> {
        self.parts()
            .filter_map(|p| p.inline_data.as_ref())
            .find(|d| accept(&d.mime_type))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::ResponseSchema;

    #[test]
    fn test_text_body_with_schema() {
        let request = TextRequest::new("List animals")
            .with_schema(ResponseSchema::array_of(ResponseSchema::String))
            .with_temperature(0.9);
        let body = text_request_body(&request);

        assert_eq!(body["contents"][0]["parts"][0]["text"], "List animals");
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "ARRAY");
        assert!((body["generationConfig"]["temperature"].as_f64().unwrap() - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_text_body_without_schema_has_no_mime_type() {
        let body = text_request_body(&TextRequest::new("Hello"));
        assert!(body["generationConfig"].get("responseMimeType").is_none());
    }

    #[test]
    fn test_image_and_speech_bodies() {
        let image = image_request_body(&ImageRequest {
            prompt: "a cat".to_string(),
            aspect_ratio: "1:1".to_string(),
        });
        assert_eq!(image["generationConfig"]["responseModalities"][0], "IMAGE");
        assert_eq!(image["generationConfig"]["imageConfig"]["aspectRatio"], "1:1");

        let speech = speech_request_body(&SpeechRequest {
            text: "Bonjour".to_string(),
            voice: "Puck".to_string(),
        });
        assert_eq!(
            speech["generationConfig"]["speechConfig"]["voiceConfig"]["prebuiltVoiceConfig"]["voiceName"],
            "Puck"
        );
    }

    #[test]
    fn test_response_extraction() {
        let raw = r#"{
            "candidates": [{
                "content": {"parts": [
                    {"text": "[1,"},
                    {"text": "2]"},
                    {"inlineData": {"mimeType": "image/png", "data": "aGk="}}
                ]},
                "finishReason": "STOP"
            }]
        }"#;
        let response: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.first_text().as_deref(), Some("[1,2]"));

        let image = response.first_inline_data(|m| m.starts_with("image/")).unwrap();
        assert_eq!(image.data, "aGk=");
        assert!(response.first_inline_data(|m| m.starts_with("audio/")).is_none());
    }

    #[test]
    fn test_empty_response() {
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(response.first_text().is_none());
    }

    #[test]
    fn test_sample_rate_from_mime() {
        assert_eq!(sample_rate_from_mime("audio/L16;codec=pcm;rate=24000"), Some(24_000));
        assert_eq!(sample_rate_from_mime("audio/pcm; rate=16000"), Some(16_000));
        assert_eq!(sample_rate_from_mime("audio/pcm"), None);
    }
}
