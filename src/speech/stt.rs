//! Speech-to-text via OpenAI Whisper.

use crate::error::{Result, ResymeError};
use crate::openai::create_client;
use async_openai::types::{AudioInput, CreateTranscriptionRequestArgs};
use async_trait::async_trait;
use tracing::debug;

/// Recognition of user-uploaded speech audio.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Convert uploaded audio bytes to text.
    async fn recognize(&self, filename: &str, audio: Vec<u8>) -> Result<String>;
}

/// Whisper-backed speech recognizer.
pub struct WhisperRecognizer {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
}

impl WhisperRecognizer {
    pub fn new(model: &str) -> Self {
        Self {
            client: create_client(),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl SpeechRecognizer for WhisperRecognizer {
    async fn recognize(&self, filename: &str, audio: Vec<u8>) -> Result<String> {
        if audio.is_empty() {
            return Err(ResymeError::Recognition("empty audio upload".to_string()));
        }

        debug!("Recognizing {} bytes of uploaded audio", audio.len());

        let request = CreateTranscriptionRequestArgs::default()
            .file(AudioInput::from_vec_u8(filename.to_string(), audio))
            .model(&self.model)
            .build()
            .map_err(|e| ResymeError::Recognition(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .audio()
            .transcribe(request)
            .await
            .map_err(|e| ResymeError::OpenAI(format!("Whisper API error: {}", e)))?;

        Ok(response.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recognize_rejects_empty_upload() {
        let recognizer = WhisperRecognizer::new("whisper-1");
        let result = recognizer.recognize("speech.wav", Vec::new()).await;
        assert!(matches!(result, Err(ResymeError::Recognition(_))));
    }
}
