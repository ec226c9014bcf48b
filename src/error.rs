//! Error types for Resyme.

use std::time::Duration;
use thiserror::Error;

/// Library-level error type for Resyme operations.
#[derive(Error, Debug)]
pub enum ResymeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Video search failed: {0}")]
    Search(String),

    #[error("No video found for query: {0}")]
    NoResults(String),

    #[error("Transcript unavailable: {0}")]
    Transcript(String),

    #[error("Summarization failed: {0}")]
    Summarize(String),

    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),

    #[error("Speech recognition failed: {0}")]
    Recognition(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Rate limited by model provider")]
    RateLimited { retry_after: Option<Duration> },

    #[error("Operation timed out: {0}")]
    Timeout(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Resyme operations.
pub type Result<T> = std::result::Result<T, ResymeError>;
