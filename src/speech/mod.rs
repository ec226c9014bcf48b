//! Speech synthesis and recognition collaborators.

mod store;
mod stt;
mod tts;

pub use store::{AudioStatus, AudioStore};
pub use stt::{SpeechRecognizer, WhisperRecognizer};
pub use tts::{OpenAiSpeech, SpeechSynthesizer};
