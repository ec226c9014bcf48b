//! Resyme - Autonomous YouTube Video Summarizer
//!
//! Summarize YouTube videos without watching them. The name comes from the
//! Norwegian word "resymé" (summary).
//!
//! # Overview
//!
//! Given a free-text query, Resyme:
//! - Finds the best-matching YouTube video
//! - Fetches its caption transcript
//! - Produces a summary with sentiment and key themes
//! - Optionally renders the summary as speech audio
//!
//! The interesting part is the agent core: an autonomous tool-calling loop
//! that decides which capability to invoke next, folds results back into the
//! conversation, and always terminates within a bounded number of attempts.
//!
//! # Architecture
//!
//! - `config` - Configuration management
//! - `agent` - The orchestration loop, capability menu, and result accumulator
//! - `search` - YouTube video search client
//! - `transcript` - Caption retrieval
//! - `summarizer` - LLM summarization with sentiment and themes
//! - `speech` - Text-to-speech, speech-to-text, and the audio artifact store
//! - `retry` - Shared backoff policy
//! - `cli` - Command-line interface and HTTP server
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use resyme::agent::Agent;
//! use resyme::config::Settings;
//! use resyme::speech::AudioStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let store = Arc::new(AudioStore::new(&settings.audio_dir())?);
//!     let agent = Agent::from_settings(&settings, store)?;
//!
//!     let result = agent.run("the history of the transistor", false).await;
//!     println!("{}", result.summary);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod openai;
pub mod retry;
pub mod search;
pub mod speech;
pub mod summarizer;
pub mod transcript;

pub use error::{Result, ResymeError};
