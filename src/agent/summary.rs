//! The structured result built up across the orchestration loop.

use crate::summarizer::themes;
use serde::{Deserialize, Serialize};

/// Result accumulator for one summarization request.
///
/// Always returned with either a non-empty `summary` or a populated `error`;
/// never half-populated without one of the two.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoSummary {
    pub title: String,
    pub channel: Option<String>,
    pub link: String,
    pub summary: String,
    pub sentiment: String,
    pub key_themes: Vec<String>,
    pub audio: Option<String>,
    pub error: Option<String>,
}

impl Default for VideoSummary {
    fn default() -> Self {
        Self {
            title: "N/A".to_string(),
            channel: None,
            link: String::new(),
            summary: String::new(),
            sentiment: "N/A".to_string(),
            key_themes: Vec::new(),
            audio: None,
            error: None,
        }
    }
}

/// Partial terminal result parsed from the model's final reply.
///
/// The reply must be a bare JSON object with the accumulator's field names;
/// anything else is rejected and fed back as a correction.
#[derive(Debug, Default, Deserialize)]
pub struct SummaryPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub sentiment: Option<String>,
    #[serde(default, deserialize_with = "themes::deserialize_opt")]
    pub key_themes: Option<Vec<String>>,
    #[serde(default)]
    pub audio: Option<String>,
}

impl VideoSummary {
    /// Merge non-empty fields from a terminal patch.
    pub fn merge_patch(&mut self, patch: SummaryPatch) {
        if let Some(title) = patch.title.filter(|t| !t.is_empty()) {
            self.title = title;
        }
        if patch.channel.is_some() {
            self.channel = patch.channel;
        }
        if let Some(link) = patch.link.filter(|l| !l.is_empty()) {
            self.link = link;
        }
        if let Some(summary) = patch.summary.filter(|s| !s.is_empty()) {
            self.summary = summary;
        }
        if let Some(sentiment) = patch.sentiment.filter(|s| !s.is_empty()) {
            self.sentiment = sentiment;
        }
        if let Some(key_themes) = patch.key_themes {
            self.key_themes = key_themes;
        }
        if patch.audio.is_some() {
            self.audio = patch.audio;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_patch_skips_empty_fields() {
        let mut summary = VideoSummary {
            title: "Existing".to_string(),
            ..Default::default()
        };

        let patch: SummaryPatch =
            serde_json::from_str(r#"{"title": "", "summary": "text", "sentiment": "Positive"}"#)
                .unwrap();
        summary.merge_patch(patch);

        assert_eq!(summary.title, "Existing");
        assert_eq!(summary.summary, "text");
        assert_eq!(summary.sentiment, "Positive");
    }

    #[test]
    fn test_patch_accepts_comma_separated_themes() {
        let patch: SummaryPatch =
            serde_json::from_str(r#"{"key_themes": "Growth, Love"}"#).unwrap();
        assert_eq!(
            patch.key_themes,
            Some(vec!["Growth".to_string(), "Love".to_string()])
        );
    }

    #[test]
    fn test_patch_accepts_null_themes() {
        let patch: SummaryPatch = serde_json::from_str(r#"{"key_themes": null}"#).unwrap();
        assert!(patch.key_themes.is_none());
    }
}
