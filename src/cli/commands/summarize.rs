//! Summarize command implementation.

use crate::agent::Agent;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::speech::AudioStore;
use anyhow::Result;
use std::sync::Arc;

/// Run the summarize command.
pub async fn run_summarize(query: &str, tts: bool, json: bool, settings: Settings) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Summarize, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'resyme doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let store = Arc::new(AudioStore::new(&settings.audio_dir())?);
    let agent = Agent::from_settings(&settings, store.clone())?;

    let spinner = Output::spinner("Summarizing...");
    let result = agent.run(query, tts).await;
    spinner.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if let Some(error) = &result.error {
        Output::error(error);
        anyhow::bail!("summarization failed: {}", error);
    }

    Output::header(&result.title);
    if let Some(channel) = &result.channel {
        Output::kv("Channel", channel);
    }
    Output::kv("Link", &result.link);
    Output::kv("Sentiment", &result.sentiment);
    if !result.key_themes.is_empty() {
        Output::kv("Themes", &result.key_themes.join(", "));
    }
    println!("\n{}\n", result.summary);

    if let Some(audio) = &result.audio {
        let path = store.dir().join(audio.trim_start_matches("/audio/"));
        Output::success(&format!("Audio saved to {}", path.display()));
    }

    Ok(())
}
