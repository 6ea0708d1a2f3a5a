//! Live endpoint messages
//!
//! Outbound messages are built with `serde_json::json!`; inbound frames are
//! decoded into a flat list of [`ServerEvent`]s because one `serverContent`
//! frame can carry audio, transcription and a turn marker at once.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use serde_json::{json, Value};

use super::pcm::LIVE_INPUT_SAMPLE_RATE;
use super::pcm::LIVE_OUTPUT_SAMPLE_RATE;
use crate::ai::gemini::sample_rate_from_mime;

/// What the first `setup` message asks for
#[derive(Debug, Clone, PartialEq)]
pub struct SetupConfig {
    pub model: String,
    pub voice: String,
    pub system_instruction: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    Setup(SetupConfig),
    /// Base64 PCM16 at 16 kHz
    Audio(String),
    /// The microphone stopped
    AudioStreamEnd,
    /// A typed user turn
    Text(String),
}

impl ClientMessage {
    pub fn to_json(&self) -> Value {
        match self {
            ClientMessage::Setup(setup) => {
                let model = if setup.model.starts_with("models/") {
                    setup.model.clone()
                } else {
                    format!("models/{}", setup.model)
                };
                json!({
                    "setup": {
                        "model": model,
                        "generationConfig": {
                            "responseModalities": ["AUDIO"],
                            "speechConfig": {
                                "voiceConfig": {
                                    "prebuiltVoiceConfig": { "voiceName": setup.voice }
                                }
                            }
                        },
                        "systemInstruction": { "parts": [{ "text": setup.system_instruction }] },
                        "inputAudioTranscription": {},
                        "outputAudioTranscription": {}
                    }
                })
            }
            ClientMessage::Audio(data) => json!({
                "realtimeInput": {
                    "audio": {
                        "data": data,
                        "mimeType": format!("audio/pcm;rate={}", LIVE_INPUT_SAMPLE_RATE)
                    }
                }
            }),
            ClientMessage::AudioStreamEnd => json!({ "realtimeInput": { "audioStreamEnd": true } }),
            ClientMessage::Text(text) => json!({
                "clientContent": {
                    "turns": [{ "role": "user", "parts": [{ "text": text }] }],
                    "turnComplete": true
                }
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    SetupComplete,
    /// Reply audio, PCM16 LE mono
    Audio { sample_rate: u32, pcm: Vec<u8> },
    /// Partial transcription of what the learner said
    InputTranscript(String),
    /// Partial transcription of the coach's reply
    OutputTranscript(String),
    TurnComplete,
    /// The learner talked over the coach; queued audio must stop
    Interrupted,
    /// The server will close the connection soon
    GoAway { time_left: Option<String> },
}

// ===== Wire shapes =====

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerMessage {
    setup_complete: Option<Value>,
    server_content: Option<ServerContent>,
    go_away: Option<GoAway>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerContent {
    model_turn: Option<ModelTurn>,
    input_transcription: Option<Transcription>,
    output_transcription: Option<Transcription>,
    #[serde(default)]
    turn_complete: bool,
    #[serde(default)]
    interrupted: bool,
}

#[derive(Debug, Deserialize)]
struct ModelTurn {
    #[serde(default)]
    parts: Vec<TurnPart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TurnPart {
    inline_data: Option<WireInlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireInlineData {
    #[serde(default)]
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct Transcription {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoAway {
    time_left: Option<String>,
}

/// Decode one inbound frame. Unknown message types yield no events.
pub fn parse_server_message(raw: &str) -> Result<Vec<ServerEvent>, serde_json::Error> {
    let message: ServerMessage = serde_json::from_str(raw)?;
    let mut events = Vec::new();

    if message.setup_complete.is_some() {
        events.push(ServerEvent::SetupComplete);
    }

    if let Some(content) = message.server_content {
        if content.interrupted {
            events.push(ServerEvent::Interrupted);
        }
        if let Some(input) = content.input_transcription {
            if !input.text.is_empty() {
                events.push(ServerEvent::InputTranscript(input.text));
            }
        }
        if let Some(turn) = content.model_turn {
            for inline in turn.parts.into_iter().filter_map(|p| p.inline_data) {
                if !inline.mime_type.is_empty() && !inline.mime_type.starts_with("audio/") {
                    continue;
                }
                match STANDARD.decode(inline.data.as_bytes()) {
                    Ok(pcm) => events.push(ServerEvent::Audio {
                        sample_rate: sample_rate_from_mime(&inline.mime_type)
                            .unwrap_or(LIVE_OUTPUT_SAMPLE_RATE),
                        pcm,
                    }),
                    Err(e) => log::warn!("Skipping undecodable audio part: {}", e),
                }
            }
        }
        if let Some(output) = content.output_transcription {
            if !output.text.is_empty() {
                events.push(ServerEvent::OutputTranscript(output.text));
            }
        }
        if content.turn_complete {
            events.push(ServerEvent::TurnComplete);
        }
    }

    if let Some(go_away) = message.go_away {
        events.push(ServerEvent::GoAway {
            time_left: go_away.time_left,
        });
    }

    Ok(events)
}
