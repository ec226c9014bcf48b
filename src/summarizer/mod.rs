//! LLM summarization with sentiment and key themes.

use crate::config::SummarizerSettings;
use crate::error::{Result, ResymeError};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs, ResponseFormat,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Upper bound on the number of key themes surfaced to the caller.
pub const MAX_THEMES: usize = 5;

const SYSTEM_PROMPT: &str = "You are a video content analyst. Reply with a single JSON object \
containing 'summary' (a detailed summary, 600-700 words), 'sentiment' (Positive, Negative, or \
Neutral), and 'key_themes' (an array of 3-5 one-word or one-phrase themes). No surrounding prose.";

/// Structured summarization output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummaryOutput {
    pub summary: String,
    #[serde(default = "default_sentiment")]
    pub sentiment: String,
    #[serde(default, deserialize_with = "themes::deserialize")]
    pub key_themes: Vec<String>,
}

fn default_sentiment() -> String {
    "N/A".to_string()
}

impl SummaryOutput {
    /// Placeholder produced when generation fails; keeps the loop moving.
    pub fn placeholder() -> Self {
        Self {
            summary: "Summary unavailable due to a processing error.".to_string(),
            sentiment: "N/A".to_string(),
            key_themes: Vec::new(),
        }
    }
}

/// Summary generation from transcript text or a bare title.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize transcript text, or the title alone when `text` is empty.
    ///
    /// Degrades to a placeholder on generation failure instead of erroring:
    /// at this point in the flow a stubbed summary beats no result at all.
    async fn summarize(&self, text: &str, title: &str) -> SummaryOutput;
}

/// Chat-model summarizer requesting a structured JSON response.
pub struct LlmSummarizer {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    language: String,
    temperature: f32,
    max_tokens: u32,
    max_input_chars: usize,
}

impl LlmSummarizer {
    pub fn from_settings(settings: &SummarizerSettings) -> Self {
        let client = match settings.api_base.as_deref() {
            Some(base) => crate::openai::create_client_with(
                Some(base),
                std::time::Duration::from_secs(120),
            ),
            None => create_client(),
        };

        Self {
            client,
            model: settings.model.clone(),
            language: settings.language.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            max_input_chars: settings.max_input_chars,
        }
    }

    fn user_prompt(&self, text: &str, title: &str) -> String {
        let text = truncate_chars(text, self.max_input_chars);

        if text.trim().is_empty() || text.trim() == title {
            format!(
                "There is no transcript available for this video. Based on the title '{}', \
                 produce the summary, sentiment and key themes in {}.",
                title, self.language
            )
        } else {
            format!(
                "Analyze this transcript of the video titled '{}' and produce the summary, \
                 sentiment and key themes in {}.\n\nTranscript: {}",
                title, self.language, text
            )
        }
    }

    async fn generate(&self, text: &str, title: &str) -> Result<SummaryOutput> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_PROMPT)
                .build()
                .map_err(|e| ResymeError::Summarize(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(self.user_prompt(text, title))
                .build()
                .map_err(|e| ResymeError::Summarize(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .max_completion_tokens(self.max_tokens)
            .response_format(ResponseFormat::JsonObject)
            .build()
            .map_err(|e| ResymeError::Summarize(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| ResymeError::OpenAI(format!("Summary generation failed: {}", e)))?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .ok_or_else(|| ResymeError::Summarize("Empty response from model".to_string()))?;

        parse_output(content)
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    async fn summarize(&self, text: &str, title: &str) -> SummaryOutput {
        match self.generate(text, title).await {
            Ok(output) => {
                debug!("Generated summary with {} themes", output.key_themes.len());
                output
            }
            Err(e) => {
                warn!("Summarization degraded to placeholder: {}", e);
                SummaryOutput::placeholder()
            }
        }
    }
}

/// Parse a model reply into a structured summary.
pub fn parse_output(content: &str) -> Result<SummaryOutput> {
    let mut output: SummaryOutput = serde_json::from_str(content.trim())
        .map_err(|e| ResymeError::Summarize(format!("Malformed summary output: {}", e)))?;

    if output.summary.is_empty() {
        return Err(ResymeError::Summarize(
            "Summary output carried no summary text".to_string(),
        ));
    }

    output.key_themes.truncate(MAX_THEMES);
    Ok(output)
}

/// Truncate to a character budget without splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect()
    }
}

/// Deserialize key themes from either a JSON array or a comma-separated string.
pub mod themes {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Themes {
        List(Vec<String>),
        Joined(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let themes = match Themes::deserialize(deserializer)? {
            Themes::List(items) => items,
            Themes::Joined(joined) => joined
                .split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        };
        Ok(themes)
    }

    pub fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Wrapper(#[serde(deserialize_with = "deserialize")] Vec<String>);

        let opt = Option::<Wrapper>::deserialize(deserializer)?;
        Ok(opt.map(|w| w.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_output_with_theme_array() {
        let output = parse_output(
            r#"{"summary": "A film about growth.", "sentiment": "Positive", "key_themes": ["Growth", "Confidence", "Love"]}"#,
        )
        .unwrap();

        assert_eq!(output.summary, "A film about growth.");
        assert_eq!(output.sentiment, "Positive");
        assert_eq!(output.key_themes, vec!["Growth", "Confidence", "Love"]);
    }

    #[test]
    fn test_parse_output_with_comma_separated_themes() {
        let output = parse_output(
            r#"{"summary": "A film about growth.", "sentiment": "Neutral", "key_themes": "Growth, Confidence, Love"}"#,
        )
        .unwrap();

        assert_eq!(output.key_themes, vec!["Growth", "Confidence", "Love"]);
    }

    #[test]
    fn test_parse_output_caps_themes() {
        let output = parse_output(
            r#"{"summary": "s", "sentiment": "Neutral", "key_themes": "a, b, c, d, e, f, g"}"#,
        )
        .unwrap();

        assert_eq!(output.key_themes.len(), MAX_THEMES);
    }

    #[test]
    fn test_parse_output_rejects_prose() {
        assert!(parse_output("Here is your summary: ...").is_err());
    }

    #[test]
    fn test_parse_output_rejects_empty_summary() {
        assert!(parse_output(r#"{"summary": "", "sentiment": "Neutral"}"#).is_err());
    }

    #[test]
    fn test_parse_output_defaults_missing_fields() {
        let output = parse_output(r#"{"summary": "s"}"#).unwrap();
        assert_eq!(output.sentiment, "N/A");
        assert!(output.key_themes.is_empty());
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 3), "hel");
        // Multi-byte code points survive truncation
        assert_eq!(truncate_chars("héllo", 2), "hé");
    }
}
