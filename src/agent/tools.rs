//! Capability menu and argument validation for the summarizer agent.
//!
//! The dispatch table in three parts: `tool_definitions` declares the schema
//! the model sees, `parse_tool_call` validates arguments into a typed
//! `ToolCall`, and `ToolContext` carries the collaborators the runner invokes.

use crate::error::{Result, ResymeError};
use crate::search::VideoSearch;
use crate::speech::SpeechSynthesizer;
use crate::summarizer::Summarizer;
use crate::transcript::TranscriptFetcher;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Capabilities the decision-making model may invoke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum ToolCall {
    /// Locate a YouTube video by free-text query.
    SearchVideo { query: String },

    /// Fetch captions for a located video.
    GetTranscript { video_id: String },

    /// Produce summary, sentiment and key themes from text (or a bare title).
    Summarize {
        text: String,
        #[serde(default)]
        title: Option<String>,
    },

    /// Render text as speech audio.
    SynthesizeSpeech { text: String },

    /// Declared for the menu; handled by the upload endpoint, not the loop.
    TranscribeSpeech,
}

/// Collaborators available to the dispatch table.
pub struct ToolContext {
    pub search: Arc<dyn VideoSearch>,
    pub transcripts: Arc<dyn TranscriptFetcher>,
    pub summarizer: Arc<dyn Summarizer>,
    pub speech: Arc<dyn SpeechSynthesizer>,
}

impl ToolContext {
    pub fn new(
        search: Arc<dyn VideoSearch>,
        transcripts: Arc<dyn TranscriptFetcher>,
        summarizer: Arc<dyn Summarizer>,
        speech: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        Self {
            search,
            transcripts,
            summarizer,
            speech,
        }
    }
}

/// Get the capability definitions offered to the decision-making model.
pub fn tool_definitions() -> Vec<async_openai::types::ChatCompletionTool> {
    use async_openai::types::{ChatCompletionTool, ChatCompletionToolType, FunctionObject};

    vec![
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: "search_video".to_string(),
                description: Some(
                    "Search YouTube videos by title or description and return the best match."
                        .to_string(),
                ),
                parameters: Some(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "Search query or video title"
                        }
                    },
                    "required": ["query"]
                })),
                strict: None,
            },
        },
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: "get_transcript".to_string(),
                description: Some(
                    "Extract the caption transcript of a YouTube video.".to_string(),
                ),
                parameters: Some(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "video_id": {
                            "type": "string",
                            "description": "YouTube video ID"
                        }
                    },
                    "required": ["video_id"]
                })),
                strict: None,
            },
        },
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: "summarize".to_string(),
                description: Some(
                    "Generate a summary, sentiment and key themes from transcript text, \
                    or from the video title alone when no transcript exists."
                        .to_string(),
                ),
                parameters: Some(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "text": {
                            "type": "string",
                            "description": "Transcript text, or the bare title as fallback"
                        },
                        "title": {
                            "type": "string",
                            "description": "Video title for context"
                        }
                    },
                    "required": ["text"]
                })),
                strict: None,
            },
        },
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: "synthesize_speech".to_string(),
                description: Some("Convert summary text to speech audio.".to_string()),
                parameters: Some(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "text": {
                            "type": "string",
                            "description": "Text to convert"
                        }
                    },
                    "required": ["text"]
                })),
                strict: None,
            },
        },
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: "transcribe_speech".to_string(),
                description: Some(
                    "Convert user-uploaded speech audio to text. Handled by the service's \
                    upload endpoint; requires no action here."
                        .to_string(),
                ),
                parameters: Some(serde_json::json!({
                    "type": "object",
                    "properties": {}
                })),
                strict: None,
            },
        },
    ]
}

/// Parse and validate a capability invocation from the model.
pub fn parse_tool_call(name: &str, arguments: &str) -> Result<ToolCall> {
    let arguments = if arguments.trim().is_empty() {
        "{}"
    } else {
        arguments
    };

    let args: serde_json::Value = serde_json::from_str(arguments)
        .map_err(|e| ResymeError::Agent(format!("Invalid tool arguments: {}", e)))?;

    match name {
        "search_video" => {
            let query = args["query"]
                .as_str()
                .ok_or_else(|| ResymeError::Agent("Missing 'query' argument".to_string()))?
                .to_string();
            Ok(ToolCall::SearchVideo { query })
        }
        "get_transcript" => {
            let video_id = args["video_id"]
                .as_str()
                .ok_or_else(|| ResymeError::Agent("Missing 'video_id' argument".to_string()))?
                .to_string();
            Ok(ToolCall::GetTranscript { video_id })
        }
        "summarize" => {
            let text = args["text"]
                .as_str()
                .ok_or_else(|| ResymeError::Agent("Missing 'text' argument".to_string()))?
                .to_string();
            let title = args["title"].as_str().map(|s| s.to_string());
            Ok(ToolCall::Summarize { text, title })
        }
        "synthesize_speech" => {
            let text = args["text"]
                .as_str()
                .ok_or_else(|| ResymeError::Agent("Missing 'text' argument".to_string()))?
                .to_string();
            Ok(ToolCall::SynthesizeSpeech { text })
        }
        "transcribe_speech" => Ok(ToolCall::TranscribeSpeech),
        _ => Err(ResymeError::Agent(format!("Unknown tool: {}", name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_video() {
        let tool = parse_tool_call("search_video", r#"{"query": "rust tutorial"}"#).unwrap();
        match tool {
            ToolCall::SearchVideo { query } => assert_eq!(query, "rust tutorial"),
            _ => panic!("Expected SearchVideo tool"),
        }
    }

    #[test]
    fn test_parse_get_transcript() {
        let tool = parse_tool_call("get_transcript", r#"{"video_id": "dQw4w9WgXcQ"}"#).unwrap();
        match tool {
            ToolCall::GetTranscript { video_id } => assert_eq!(video_id, "dQw4w9WgXcQ"),
            _ => panic!("Expected GetTranscript tool"),
        }
    }

    #[test]
    fn test_parse_summarize_with_optional_title() {
        let tool =
            parse_tool_call("summarize", r#"{"text": "transcript", "title": "A Video"}"#).unwrap();
        match tool {
            ToolCall::Summarize { text, title } => {
                assert_eq!(text, "transcript");
                assert_eq!(title.as_deref(), Some("A Video"));
            }
            _ => panic!("Expected Summarize tool"),
        }

        let tool = parse_tool_call("summarize", r#"{"text": "transcript"}"#).unwrap();
        assert!(matches!(tool, ToolCall::Summarize { title: None, .. }));
    }

    #[test]
    fn test_parse_transcribe_speech_accepts_empty_args() {
        assert_eq!(
            parse_tool_call("transcribe_speech", "").unwrap(),
            ToolCall::TranscribeSpeech
        );
        assert_eq!(
            parse_tool_call("transcribe_speech", "{}").unwrap(),
            ToolCall::TranscribeSpeech
        );
    }

    #[test]
    fn test_parse_rejects_missing_argument() {
        assert!(parse_tool_call("search_video", "{}").is_err());
        assert!(parse_tool_call("synthesize_speech", r#"{"text": 42}"#).is_err());
    }

    #[test]
    fn test_parse_rejects_unknown_tool() {
        assert!(parse_tool_call("delete_video", "{}").is_err());
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        assert!(parse_tool_call("search_video", "not json").is_err());
    }

    #[test]
    fn test_menu_lists_all_capabilities() {
        let names: Vec<String> = tool_definitions()
            .into_iter()
            .map(|t| t.function.name)
            .collect();
        assert_eq!(
            names,
            vec![
                "search_video",
                "get_transcript",
                "summarize",
                "synthesize_speech",
                "transcribe_speech"
            ]
        );
    }
}
