//! Text-to-speech synthesis via the OpenAI audio API.

use super::store::AudioStore;
use crate::error::{Result, ResymeError};
use crate::openai::create_client;
use async_openai::types::{CreateSpeechRequestArgs, SpeechModel, Voice};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Speech rendering for a produced summary.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Convert text to an audio file, returning the relative URL of the result.
    async fn synthesize(&self, text: &str) -> Result<String>;
}

/// OpenAI TTS-backed synthesizer writing into the audio arena.
pub struct OpenAiSpeech {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: SpeechModel,
    voice: Voice,
    store: Arc<AudioStore>,
}

impl OpenAiSpeech {
    pub fn new(model: &str, voice: &str, store: Arc<AudioStore>) -> Self {
        Self {
            client: create_client(),
            model: parse_model(model),
            voice: parse_voice(voice),
            store,
        }
    }

    /// The arena this synthesizer writes into.
    pub fn store(&self) -> Arc<AudioStore> {
        self.store.clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiSpeech {
    async fn synthesize(&self, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Err(ResymeError::Synthesis(
                "cannot synthesize empty text".to_string(),
            ));
        }

        let key = self.store.reserve();
        let path = self.store.path_for(&key)?;

        let request = CreateSpeechRequestArgs::default()
            .model(self.model.clone())
            .voice(self.voice.clone())
            .input(text)
            .build()
            .map_err(|e| ResymeError::Synthesis(e.to_string()))?;

        match self.client.audio().speech(request).await {
            Ok(response) => {
                tokio::fs::write(&path, &response.bytes).await?;
                self.store.mark_ready(&key);
                debug!(
                    "Synthesized {} bytes of audio to {}",
                    response.bytes.len(),
                    path.display()
                );
                Ok(format!("/audio/{}", key))
            }
            Err(e) => {
                self.store.mark_failed(&key, &e.to_string());
                Err(ResymeError::Synthesis(e.to_string()))
            }
        }
    }
}

fn parse_model(model: &str) -> SpeechModel {
    match model {
        "tts-1" => SpeechModel::Tts1,
        "tts-1-hd" => SpeechModel::Tts1Hd,
        other => SpeechModel::Other(other.to_string()),
    }
}

fn parse_voice(voice: &str) -> Voice {
    match voice.to_lowercase().as_str() {
        "alloy" => Voice::Alloy,
        "echo" => Voice::Echo,
        "fable" => Voice::Fable,
        "onyx" => Voice::Onyx,
        "nova" => Voice::Nova,
        "shimmer" => Voice::Shimmer,
        other => {
            warn!("Unknown TTS voice '{}', using alloy", other);
            Voice::Alloy
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_voice_known_and_unknown() {
        assert!(matches!(parse_voice("nova"), Voice::Nova));
        assert!(matches!(parse_voice("Echo"), Voice::Echo));
        assert!(matches!(parse_voice("robotic"), Voice::Alloy));
    }

    #[test]
    fn test_parse_model() {
        assert!(matches!(parse_model("tts-1"), SpeechModel::Tts1));
        assert!(matches!(parse_model("tts-1-hd"), SpeechModel::Tts1Hd));
        assert!(matches!(parse_model("custom"), SpeechModel::Other(_)));
    }

    #[tokio::test]
    async fn test_synthesize_rejects_empty_input() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(AudioStore::new(dir.path()).unwrap());
        let speech = OpenAiSpeech::new("tts-1", "alloy", store);

        let result = speech.synthesize("   ").await;
        assert!(matches!(result, Err(ResymeError::Synthesis(_))));
    }
}
