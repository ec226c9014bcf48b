//! Configuration module for Resyme.
//!
//! Handles loading and managing application settings.

mod settings;

pub use settings::{
    AgentSettings, GeneralSettings, SearchSettings, Settings, SpeechSettings, SummarizerSettings,
    TranscriptSettings,
};
