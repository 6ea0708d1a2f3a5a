//! Scripted generative client for service tests

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{
    GenerativeClient, ImageRequest, InlineAudio, InlineImage, ServiceError, SpeechRequest,
    TextRequest,
};

#[derive(Default)]
pub(crate) struct ScriptedClient {
    text: Mutex<VecDeque<Result<String, ServiceError>>>,
    images: Mutex<VecDeque<Result<InlineImage, ServiceError>>>,
    speech: Mutex<VecDeque<Result<InlineAudio, ServiceError>>>,
    text_requests: Mutex<Vec<TextRequest>>,
    image_requests: Mutex<Vec<ImageRequest>>,
    speech_requests: Mutex<Vec<SpeechRequest>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_text(&self, response: Result<String, ServiceError>) {
        self.text.lock().unwrap().push_back(response);
    }

    pub fn push_image(&self, response: Result<InlineImage, ServiceError>) {
        self.images.lock().unwrap().push_back(response);
    }

    pub fn push_speech(&self, response: Result<InlineAudio, ServiceError>) {
        self.speech.lock().unwrap().push_back(response);
    }

    pub fn text_requests(&self) -> Vec<TextRequest> {
        self.text_requests.lock().unwrap().clone()
    }

    pub fn text_calls(&self) -> usize {
        self.text_requests.lock().unwrap().len()
    }

    pub fn image_calls(&self) -> usize {
        self.image_requests.lock().unwrap().len()
    }

    pub fn speech_calls(&self) -> usize {
        self.speech_requests.lock().unwrap().len()
    }
}

fn exhausted() -> ServiceError {
    ServiceError::Transport("scripted client has no response left".to_string())
}

#[async_trait]
impl GenerativeClient for ScriptedClient {
    async fn generate_text(&self, request: TextRequest) -> Result<String, ServiceError> {
        self.text_requests.lock().unwrap().push(request);
        self.text.lock().unwrap().pop_front().unwrap_or_else(|| Err(exhausted()))
    }

    async fn generate_image(&self, request: ImageRequest) -> Result<InlineImage, ServiceError> {
        self.image_requests.lock().unwrap().push(request);
        self.images.lock().unwrap().pop_front().unwrap_or_else(|| Err(exhausted()))
    }

    async fn synthesize_speech(&self, request: SpeechRequest) -> Result<InlineAudio, ServiceError> {
        self.speech_requests.lock().unwrap().push(request);
        self.speech.lock().unwrap().pop_front().unwrap_or_else(|| Err(exhausted()))
    }
}
