//! YouTube caption retrieval.

use crate::error::{Result, ResymeError};
use async_trait::async_trait;
use regex::Regex;
use tracing::debug;
use yt_transcript_rs::api::YouTubeTranscriptApi;

/// Retrieved caption text with its detected language.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptText {
    pub text: String,
    pub language: String,
}

/// Caption retrieval for a located video.
#[async_trait]
pub trait TranscriptFetcher: Send + Sync {
    /// Fetch the concatenated caption text for a video.
    ///
    /// Fails when captions are disabled or unavailable; the caller treats
    /// every failure as a signal to fall back to title-only summarization.
    async fn fetch(&self, video_id: &str) -> Result<TranscriptText>;
}

/// Fetcher backed by YouTube's caption tracks.
pub struct CaptionsFetcher {
    languages: Vec<String>,
}

impl CaptionsFetcher {
    pub fn new(languages: &[String]) -> Self {
        Self {
            languages: languages.to_vec(),
        }
    }
}

#[async_trait]
impl TranscriptFetcher for CaptionsFetcher {
    async fn fetch(&self, video_id: &str) -> Result<TranscriptText> {
        debug!("Fetching transcript for video ID: {}", video_id);

        let api = YouTubeTranscriptApi::new(None, None, None)
            .map_err(|e| ResymeError::Transcript(format!("caption client init failed: {}", e)))?;

        let languages: Vec<&str> = self.languages.iter().map(|s| s.as_str()).collect();

        let fetched = api
            .fetch_transcript(video_id, &languages, false)
            .await
            .map_err(|e| ResymeError::Transcript(e.to_string()))?;

        Ok(TranscriptText {
            text: fetched.text(),
            language: fetched.language_code.clone(),
        })
    }
}

/// Extract a YouTube video ID from a URL or bare ID.
pub fn extract_video_id(input: &str) -> Option<String> {
    // Matches various YouTube URL formats and bare video IDs
    let video_id_regex = Regex::new(
        r"(?x)
        (?:
            # Full YouTube URLs
            (?:https?://)?
            (?:www\.)?
            (?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/v/)
            ([a-zA-Z0-9_-]{11})
        )
        |
        # Bare video ID (11 characters)
        ^([a-zA-Z0-9_-]{11})$
    ",
    )
    .expect("Invalid regex");

    let caps = video_id_regex.captures(input.trim())?;

    // Try group 1 (URL format) then group 2 (bare ID)
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().to_string())
}

/// Canonical watch URL for a video ID.
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_video_id() {
        // Test various URL formats
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://youtube.com/embed/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );

        // Test invalid inputs
        assert_eq!(extract_video_id("not-a-video-id"), None);
        assert_eq!(extract_video_id(""), None);
    }

    #[test]
    fn test_watch_url() {
        assert_eq!(
            watch_url("dQw4w9WgXcQ"),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }
}
