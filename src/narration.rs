//! Pronunciation clips
//!
//! Spoken versions of words and example sentences, synthesized with a
//! prebuilt voice and cached as PCM16 in the media cache.

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::ai::{GenerativeClient, ServiceError, SpeechRequest};
use crate::speaking::pcm::decode_pcm16_le;
use crate::storage::{CachedClip, MediaCache};

#[derive(Error, Debug)]
pub enum NarrationError {
    #[error("Speech synthesis failed: {0}")]
    Service(#[from] ServiceError),

    #[error("Nothing to say")]
    EmptyText,

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
}

pub type Result<T> = std::result::Result<T, NarrationError>;

pub struct Narrator {
    client: Arc<dyn GenerativeClient>,
    media: Arc<MediaCache>,
    voice: String,
}

impl Narrator {
    pub fn new(client: Arc<dyn GenerativeClient>, media: Arc<MediaCache>, voice: String) -> Self {
        Self {
            client,
            media,
            voice,
        }
    }

    /// Clip for a word or sentence, synthesized on first request
    pub async fn pronounce(&self, text: &str) -> Result<CachedClip> {
        let text = text.trim();
        if text.is_empty() {
            return Err(NarrationError::EmptyText);
        }

        match self.media.get_clip(text) {
            Ok(Some(clip)) => return Ok(clip),
            Ok(None) => {}
            Err(e) => log::warn!("Media cache read failed for clip {:?}: {}", text, e),
        }

        let audio = self
            .client
            .synthesize_speech(SpeechRequest {
                text: format!("Say slowly and clearly, in French: {}", text),
                voice: self.voice.clone(),
            })
            .await?;

        let clip = CachedClip {
            text: text.to_string(),
            sample_rate: audio.sample_rate,
            samples: decode_pcm16_le(&audio.pcm),
        };
        if clip.samples.is_empty() {
            return Err(ServiceError::InvalidResponse("speech response was empty".to_string()).into());
        }

        if let Err(e) = self.media.put_clip(text, clip.sample_rate, &clip.samples) {
            log::error!("Failed to cache clip {:?}: {}", text, e);
        }
        Ok(clip)
    }
}

/// Write a clip as a mono 16-bit WAV file
pub fn write_wav(clip: &CachedClip, path: &Path) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: clip.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for sample in &clip.samples {
        writer.write_sample(*sample)?;
    }
    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::mock::ScriptedClient;
    use crate::ai::InlineAudio;
    use tempfile::TempDir;

    fn create_test_narrator() -> (Narrator, Arc<ScriptedClient>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let media = Arc::new(MediaCache::new(temp_dir.path().to_path_buf()));
        let client = Arc::new(ScriptedClient::new());
        let narrator = Narrator::new(client.clone(), media, "Puck".to_string());
        (narrator, client, temp_dir)
    }

    fn audio(samples: &[i16]) -> InlineAudio {
        InlineAudio {
            sample_rate: 24_000,
            pcm: samples.iter().flat_map(|s| s.to_le_bytes()).collect(),
        }
    }

    #[tokio::test]
    async fn test_pronounce_caches_clip() {
        let (narrator, client, _temp) = create_test_narrator();
        client.push_speech(Ok(audio(&[0, 1000, -1000])));

        let first = narrator.pronounce("Bonjour").await.unwrap();
        let second = narrator.pronounce("  bonjour ").await.unwrap();

        assert_eq!(client.speech_calls(), 1);
        assert_eq!(first.samples, vec![0, 1000, -1000]);
        assert_eq!(second.samples, first.samples);
        assert_eq!(second.sample_rate, 24_000);
    }

    #[tokio::test]
    async fn test_empty_text_rejected() {
        let (narrator, client, _temp) = create_test_narrator();
        assert!(matches!(narrator.pronounce("   ").await, Err(NarrationError::EmptyText)));
        assert_eq!(client.speech_calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_audio_is_error() {
        let (narrator, client, _temp) = create_test_narrator();
        client.push_speech(Ok(audio(&[])));
        assert!(matches!(
            narrator.pronounce("merci").await,
            Err(NarrationError::Service(ServiceError::InvalidResponse(_)))
        ));
    }

    #[test]
    fn test_write_wav() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bonjour.wav");
        let clip = CachedClip {
            text: "bonjour".to_string(),
            sample_rate: 24_000,
            samples: vec![0, 500, -500, 0],
        };
        write_wav(&clip, &path).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().sample_rate, 24_000);
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, clip.samples);
    }
}
