//! Generative AI service boundary
//!
//! Every outbound model call goes through [`GenerativeClient`]. The Gemini
//! implementation lives in [`gemini`]; tests use the scripted client in
//! `mock`.

mod client;
mod error;
pub mod gemini;
#[cfg(test)]
pub(crate) mod mock;
mod response;
mod schema;

pub use client::{
    generate_json, GenerativeClient, ImageRequest, InlineAudio, InlineImage, SpeechRequest,
    TextRequest,
};
pub use error::{ErrorKind, ServiceError};
pub use gemini::GeminiClient;
pub use response::{parse_json_payload, strip_code_fence};
pub use schema::ResponseSchema;
