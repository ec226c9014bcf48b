//! Chat backend abstraction over the decision-making model.
//!
//! The loop talks to this trait, never to an SDK, so tests can script the
//! model's behavior turn by turn.

use super::conversation::{Conversation, Role};
use crate::error::{Result, ResymeError};
use crate::openai::create_client_with;
use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionTool, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use regex::Regex;
use std::time::Duration;

/// A capability invocation requested by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

/// One completed model round-trip.
#[derive(Debug, Clone, Default)]
pub struct ChatOutcome {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolInvocation>,
}

/// One round-trip to the decision-making model.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(
        &self,
        conversation: &Conversation,
        tools: Vec<ChatCompletionTool>,
    ) -> Result<ChatOutcome>;
}

/// Production backend over an OpenAI-compatible chat completions API.
pub struct OpenAiBackend {
    client: async_openai::Client<OpenAIConfig>,
    model: String,
    max_tokens: u32,
}

impl OpenAiBackend {
    pub fn new(model: &str, api_base: Option<&str>, max_tokens: u32) -> Self {
        Self {
            client: create_client_with(api_base, Duration::from_secs(120)),
            model: model.to_string(),
            max_tokens,
        }
    }
}

fn to_request_messages(conversation: &Conversation) -> Result<Vec<ChatCompletionRequestMessage>> {
    conversation
        .turns()
        .iter()
        .map(|turn| {
            let message: ChatCompletionRequestMessage = match turn.role {
                Role::System => ChatCompletionRequestSystemMessageArgs::default()
                    .content(turn.content.clone())
                    .build()
                    .map_err(|e| ResymeError::Agent(e.to_string()))?
                    .into(),
                Role::User => ChatCompletionRequestUserMessageArgs::default()
                    .content(turn.content.clone())
                    .build()
                    .map_err(|e| ResymeError::Agent(e.to_string()))?
                    .into(),
                Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                    .content(turn.content.clone())
                    .build()
                    .map_err(|e| ResymeError::Agent(e.to_string()))?
                    .into(),
            };
            Ok(message)
        })
        .collect()
}

#[async_trait]
impl ChatBackend for OpenAiBackend {
    async fn complete(
        &self,
        conversation: &Conversation,
        tools: Vec<ChatCompletionTool>,
    ) -> Result<ChatOutcome> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(to_request_messages(conversation)?)
            .tools(tools)
            .max_completion_tokens(self.max_tokens)
            .build()
            .map_err(|e| ResymeError::Agent(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(classify_error)?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ResymeError::Agent("No response from model".to_string()))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| ToolInvocation {
                id: call.id,
                name: call.function.name,
                arguments: call.function.arguments,
            })
            .collect();

        Ok(ChatOutcome {
            content: choice.message.content,
            tool_calls,
        })
    }
}

/// Map API errors, detecting rate limiting and its suggested wait.
fn classify_error(err: OpenAIError) -> ResymeError {
    match err {
        OpenAIError::ApiError(api) => {
            let is_rate_limit = api
                .r#type
                .as_deref()
                .is_some_and(|t| t.contains("rate_limit"))
                || api.message.to_lowercase().contains("rate limit");

            if is_rate_limit {
                ResymeError::RateLimited {
                    retry_after: parse_retry_after(&api.message),
                }
            } else {
                ResymeError::OpenAI(api.message)
            }
        }
        other => ResymeError::OpenAI(other.to_string()),
    }
}

/// Parse a suggested wait out of a rate-limit message ("try again in 7.66s").
fn parse_retry_after(message: &str) -> Option<Duration> {
    let re = Regex::new(r"(?i)try again in\s*([0-9]+(?:\.[0-9]+)?)\s*(ms|s|m)\b").ok()?;
    let caps = re.captures(message)?;
    let value: f64 = caps[1].parse().ok()?;

    let millis = match caps[2].to_ascii_lowercase().as_str() {
        "ms" => value,
        "s" => value * 1000.0,
        "m" => value * 60_000.0,
        _ => return None,
    };

    Some(Duration::from_millis(millis as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_retry_after_seconds() {
        assert_eq!(
            parse_retry_after("Rate limit reached. Please try again in 7.66s."),
            Some(Duration::from_millis(7660))
        );
    }

    #[test]
    fn test_parse_retry_after_millis_and_minutes() {
        assert_eq!(
            parse_retry_after("try again in 250ms"),
            Some(Duration::from_millis(250))
        );
        assert_eq!(
            parse_retry_after("Try again in 2m"),
            Some(Duration::from_secs(120))
        );
    }

    #[test]
    fn test_parse_retry_after_absent() {
        assert_eq!(parse_retry_after("Rate limit reached."), None);
    }

    #[test]
    fn test_to_request_messages_maps_roles() {
        let mut conversation = Conversation::new();
        conversation.push_system("sys");
        conversation.push_user("usr");
        conversation.push_assistant("asst");

        let messages = to_request_messages(&conversation).unwrap();
        assert_eq!(messages.len(), 3);
    }
}
