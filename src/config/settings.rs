//! Configuration settings for Resyme.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub search: SearchSettings,
    pub transcript: TranscriptSettings,
    pub agent: AgentSettings,
    pub summarizer: SummarizerSettings,
    pub speech: SpeechSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.resyme".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Video search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// SerpApi endpoint for YouTube search.
    pub endpoint: String,
    /// SerpApi key; falls back to the SERPAPI_API_KEY environment variable.
    pub api_key: Option<String>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://serpapi.com/search.json".to_string(),
            api_key: None,
        }
    }
}

impl SearchSettings {
    /// Resolve the search API key from settings or the environment.
    pub fn resolve_api_key(&self) -> crate::error::Result<String> {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.is_empty()) {
            return Ok(key.clone());
        }
        match std::env::var("SERPAPI_API_KEY") {
            Ok(key) if !key.is_empty() => Ok(key),
            _ => Err(crate::error::ResymeError::Config(
                "SERPAPI_API_KEY not set. Set it with: export SERPAPI_API_KEY='...'".to_string(),
            )),
        }
    }
}

/// Transcript retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptSettings {
    /// Preferred caption languages, in priority order.
    pub languages: Vec<String>,
    /// Maximum transcript characters fed into the conversation.
    pub max_chars: usize,
}

impl Default for TranscriptSettings {
    fn default() -> Self {
        Self {
            languages: vec!["en".to_string()],
            max_chars: 6000,
        }
    }
}

/// Decision-making model settings for the agent loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Chat model driving the tool-calling loop.
    pub model: String,
    /// OpenAI-compatible API base override (e.g. a Groq endpoint).
    pub api_base: Option<String>,
    /// Maximum round-trips to the model per request.
    pub max_attempts: u32,
    /// Completion size cap per round-trip.
    pub max_tokens: u32,
    /// Ceiling for any single capability call, in seconds.
    pub tool_timeout_seconds: u64,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            api_base: None,
            max_attempts: 3,
            max_tokens: 1024,
            tool_timeout_seconds: 60,
        }
    }
}

/// Summarization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerSettings {
    /// Model used for summary generation.
    pub model: String,
    /// OpenAI-compatible API base override.
    pub api_base: Option<String>,
    /// Target language for the summary.
    pub language: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Completion size cap.
    pub max_tokens: u32,
    /// Maximum input characters passed to the model.
    pub max_input_chars: usize,
}

impl Default for SummarizerSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            api_base: None,
            language: "en".to_string(),
            temperature: 0.7,
            max_tokens: 1024,
            max_input_chars: 10000,
        }
    }
}

/// Speech synthesis and recognition settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechSettings {
    /// Text-to-speech model.
    pub tts_model: String,
    /// Text-to-speech voice.
    pub voice: String,
    /// Speech-to-text model.
    pub stt_model: String,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            tts_model: "tts-1".to_string(),
            voice: "alloy".to_string(),
            stt_model: "whisper-1".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::ResymeError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("resyme")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Directory where generated audio artifacts are written.
    pub fn audio_dir(&self) -> PathBuf {
        self.data_dir().join("audio")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_roundtrip_toml() {
        let settings = Settings::default();
        let toml_str = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.agent.max_attempts, 3);
        assert_eq!(parsed.transcript.languages, vec!["en".to_string()]);
    }

    #[test]
    fn test_audio_dir_under_data_dir() {
        let settings = Settings::default();
        assert!(settings.audio_dir().starts_with(settings.data_dir()));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: Settings = toml::from_str("[agent]\nmax_attempts = 5\n").unwrap();
        assert_eq!(parsed.agent.max_attempts, 5);
        assert_eq!(parsed.agent.model, "gpt-4o-mini");
        assert_eq!(parsed.speech.voice, "alloy");
    }
}
