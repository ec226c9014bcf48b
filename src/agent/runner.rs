//! The autonomous orchestration loop.
//!
//! Owns one request's conversation and result accumulator, asks the
//! decision-making model for the next action each iteration, dispatches
//! capability calls in the order they were emitted, and terminates within a
//! bounded number of attempts. Failures never escape this boundary: they land
//! in the accumulator's `error` field.

use super::backend::{ChatBackend, ChatOutcome, OpenAiBackend, ToolInvocation};
use super::conversation::Conversation;
use super::summary::{SummaryPatch, VideoSummary};
use super::tools::{parse_tool_call, tool_definitions, ToolCall, ToolContext};
use crate::config::Settings;
use crate::error::ResymeError;
use crate::retry::{Backoff, DEFAULT_RATE_LIMIT_WAIT};
use crate::search::SerpApiSearch;
use crate::speech::{AudioStore, OpenAiSpeech};
use crate::summarizer::{LlmSummarizer, SummaryOutput};
use crate::transcript::{extract_video_id, CaptionsFetcher};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const SYSTEM_PROMPT: &str = "You are an autonomous YouTube video summarizer. Use the provided \
tools to search for a video, extract its transcript, and generate a summary with sentiment and \
key themes. If the transcript is unavailable, generate the summary from the video title alone. \
Convert the summary to audio only when the user asks for it. When you are done, reply with a \
bare JSON object containing 'title', 'channel', 'link', 'summary', 'sentiment', 'key_themes' \
and 'audio' - no surrounding prose. Never ask for manual input; proceed with the data you have.";

/// Transport retries per attempt before the attempt is charged.
const MAX_TRANSPORT_RETRIES: u32 = 3;

/// Control flow signal from handling one model turn.
enum Flow {
    Continue,
    Done,
}

/// Agent driving the summarization loop.
pub struct Agent {
    backend: Arc<dyn ChatBackend>,
    tools: ToolContext,
    max_attempts: u32,
    transcript_budget: usize,
    tool_timeout: Duration,
    backoff: Backoff,
}

impl Agent {
    /// Create a new agent with the given backend and collaborators.
    pub fn new(backend: Arc<dyn ChatBackend>, tools: ToolContext) -> Self {
        Self {
            backend,
            tools,
            max_attempts: 3,
            transcript_budget: 6000,
            tool_timeout: Duration::from_secs(60),
            backoff: Backoff::default(),
        }
    }

    /// Build an agent wired to the production collaborators.
    pub fn from_settings(settings: &Settings, store: Arc<AudioStore>) -> crate::Result<Self> {
        let api_key = settings.search.resolve_api_key()?;

        let tools = ToolContext::new(
            Arc::new(SerpApiSearch::new(&settings.search.endpoint, &api_key)?),
            Arc::new(CaptionsFetcher::new(&settings.transcript.languages)),
            Arc::new(LlmSummarizer::from_settings(&settings.summarizer)),
            Arc::new(OpenAiSpeech::new(
                &settings.speech.tts_model,
                &settings.speech.voice,
                store,
            )),
        );

        let backend = Arc::new(OpenAiBackend::new(
            &settings.agent.model,
            settings.agent.api_base.as_deref(),
            settings.agent.max_tokens,
        ));

        Ok(Self::new(backend, tools)
            .with_max_attempts(settings.agent.max_attempts)
            .with_transcript_budget(settings.transcript.max_chars)
            .with_tool_timeout(Duration::from_secs(settings.agent.tool_timeout_seconds)))
    }

    /// Set the attempt ceiling (at least 1).
    pub fn with_max_attempts(mut self, max: u32) -> Self {
        self.max_attempts = max.max(1);
        self
    }

    /// Set the transcript character budget fed into the conversation.
    pub fn with_transcript_budget(mut self, chars: usize) -> Self {
        self.transcript_budget = chars;
        self
    }

    /// Set the ceiling for any single capability call.
    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = timeout;
        self
    }

    /// Set the backoff policy for transient model errors.
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Summarize the video best matching `query`.
    ///
    /// Never fails past this boundary: the returned accumulator carries
    /// either a non-empty summary or a populated `error`.
    pub async fn run(&self, query: &str, wants_audio: bool) -> VideoSummary {
        let mut conversation = Conversation::new();
        conversation.push_system(SYSTEM_PROMPT);
        conversation.push_user(format!(
            "Summarize the YouTube video titled '{}'.{}",
            query,
            if wants_audio {
                " Convert the summary to audio."
            } else {
                ""
            }
        ));

        let mut result = VideoSummary::default();
        let mut attempts = 0;

        while attempts < self.max_attempts {
            attempts += 1;
            debug!("Orchestration attempt {}/{}", attempts, self.max_attempts);

            let outcome = match self.complete_with_retry(&conversation, attempts).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    if attempts >= self.max_attempts {
                        result.error =
                            Some(format!("Failed after {} attempts: {}", self.max_attempts, e));
                        return result;
                    }
                    conversation.push_assistant(format!("API error: {}. Retrying.", e));
                    continue;
                }
            };

            if outcome.tool_calls.is_empty() {
                match self.drain_final_content(&outcome, &mut conversation, &mut result) {
                    Flow::Done => return result,
                    Flow::Continue => continue,
                }
            }

            match self
                .dispatch_all(&outcome.tool_calls, wants_audio, &mut conversation, &mut result)
                .await
            {
                Flow::Done => return result,
                Flow::Continue => {}
            }
        }

        if result.summary.is_empty() && result.error.is_none() {
            result.error = Some(format!(
                "Failed to produce a summary after {} attempts.",
                self.max_attempts
            ));
        }
        result
    }

    /// One model round-trip with bounded transport retries.
    ///
    /// Rate-limit waits honor the provider's suggested duration; other
    /// transport errors back off exponentially on the attempt index.
    async fn complete_with_retry(
        &self,
        conversation: &Conversation,
        attempt: u32,
    ) -> crate::Result<ChatOutcome> {
        let mut last_err = None;

        for retry in 0..MAX_TRANSPORT_RETRIES {
            let err = match self.backend.complete(conversation, tool_definitions()).await {
                Ok(outcome) => return Ok(outcome),
                Err(err) => err,
            };

            if retry + 1 < MAX_TRANSPORT_RETRIES {
                let wait = match &err {
                    ResymeError::RateLimited { retry_after } => {
                        retry_after.unwrap_or(DEFAULT_RATE_LIMIT_WAIT)
                    }
                    _ => self.backoff.delay(attempt.saturating_sub(1) + retry),
                };
                warn!("Model call failed ({}); waiting {:?} before retrying", err, wait);
                tokio::time::sleep(wait).await;
            }

            last_err = Some(err);
        }

        Err(last_err.unwrap_or_else(|| ResymeError::Agent("model call failed".to_string())))
    }

    /// Handle a model reply with no tool calls: either a terminal JSON result
    /// or a malformed reply fed back as a correction.
    fn drain_final_content(
        &self,
        outcome: &ChatOutcome,
        conversation: &mut Conversation,
        result: &mut VideoSummary,
    ) -> Flow {
        let Some(content) = outcome.content.as_deref().filter(|c| !c.trim().is_empty()) else {
            conversation.push_assistant("No tool call or content received.");
            return Flow::Continue;
        };

        match serde_json::from_str::<SummaryPatch>(content) {
            Ok(patch) => {
                result.merge_patch(patch);
                if !result.summary.is_empty() {
                    info!("Terminal result received from model");
                    return Flow::Done;
                }
                conversation.push_user(
                    "The final JSON did not contain a summary. Continue using the tools to produce one.",
                );
                Flow::Continue
            }
            Err(e) => {
                debug!("Unparseable terminal content: {}", e);
                conversation.push_assistant(format!("Error parsing response: {}", content));
                conversation.push_user(
                    "The previous reply was not a bare JSON object. Reply again with only the JSON result.",
                );
                Flow::Continue
            }
        }
    }

    /// Dispatch tool invocations strictly in the order the model emitted them.
    ///
    /// Accumulator writes apply immediately per invocation, so a later call in
    /// the same turn observes earlier ones' effects.
    async fn dispatch_all(
        &self,
        invocations: &[ToolInvocation],
        wants_audio: bool,
        conversation: &mut Conversation,
        result: &mut VideoSummary,
    ) -> Flow {
        for invocation in invocations {
            info!("Dispatching tool: {}", invocation.name);

            let call = match parse_tool_call(&invocation.name, &invocation.arguments) {
                Ok(call) => call,
                Err(e) => {
                    // Schema violation: fold back as a correction so the model
                    // can fix itself on the next attempt.
                    conversation.push_assistant(format!(
                        "Tool call '{}' rejected: {}",
                        invocation.name, e
                    ));
                    continue;
                }
            };

            match self.dispatch(call, wants_audio, conversation, result).await {
                Flow::Done => return Flow::Done,
                Flow::Continue => {}
            }
        }
        Flow::Continue
    }

    async fn dispatch(
        &self,
        call: ToolCall,
        wants_audio: bool,
        conversation: &mut Conversation,
        result: &mut VideoSummary,
    ) -> Flow {
        match call {
            ToolCall::SearchVideo { query } => self.run_search(&query, conversation, result).await,
            ToolCall::GetTranscript { video_id } => {
                self.run_transcript(&video_id, conversation, result).await
            }
            ToolCall::Summarize { text, title } => {
                self.run_summarize(&text, title.as_deref(), wants_audio, result)
                    .await
            }
            ToolCall::SynthesizeSpeech { text } => self.run_synthesis(&text, result).await,
            ToolCall::TranscribeSpeech => {
                conversation.push_assistant(
                    "Speech transcription is handled by the upload endpoint; no action taken.",
                );
                Flow::Continue
            }
        }
    }

    async fn run_search(
        &self,
        query: &str,
        conversation: &mut Conversation,
        result: &mut VideoSummary,
    ) -> Flow {
        let hit = match self.bounded(self.tools.search.search(query)).await {
            Ok(hit) => hit,
            Err(e) => {
                // A failed search cannot be recovered by other tools.
                result.error = Some(e.to_string());
                return Flow::Done;
            }
        };

        result.title = hit.title.clone();
        result.channel = hit.channel.clone();
        result.link = hit.link.clone();

        conversation.push_assistant(format!(
            "Found video: {}",
            serde_json::json!({
                "title": hit.title,
                "channel": hit.channel,
                "link": hit.link,
            })
        ));

        match extract_video_id(&hit.link) {
            Some(video_id) => {
                conversation.push_user(format!("Extract the transcript for video ID: {}", video_id));
            }
            None => {
                conversation.push_user(format!(
                    "No video ID could be extracted from '{}'. Generate a summary using only the title: '{}'",
                    hit.link, result.title
                ));
            }
        }
        Flow::Continue
    }

    async fn run_transcript(
        &self,
        video_id: &str,
        conversation: &mut Conversation,
        result: &mut VideoSummary,
    ) -> Flow {
        match self.bounded(self.tools.transcripts.fetch(video_id)).await {
            Ok(transcript) => {
                let excerpt =
                    crate::summarizer::truncate_chars(&transcript.text, self.transcript_budget);
                conversation
                    .push_assistant(format!("Transcript ({}): {}", transcript.language, excerpt));
                conversation.push_user(format!(
                    "Generate the summary, sentiment and key themes from this transcript for the video titled '{}'.",
                    result.title
                ));
            }
            Err(e) => {
                debug!("Transcript fetch failed: {}", e);
                conversation.push_assistant(format!("Transcript unavailable: {}", e));
                conversation.push_user(format!(
                    "The transcript is unavailable. Generate a summary using only the title: '{}'",
                    result.title
                ));
            }
        }
        Flow::Continue
    }

    async fn run_summarize(
        &self,
        text: &str,
        title: Option<&str>,
        wants_audio: bool,
        result: &mut VideoSummary,
    ) -> Flow {
        let title = title
            .filter(|t| !t.is_empty())
            .unwrap_or(result.title.as_str());

        let output = match tokio::time::timeout(
            self.tool_timeout,
            self.tools.summarizer.summarize(text, title),
        )
        .await
        {
            Ok(output) => output,
            Err(_) => {
                warn!("Summarization timed out after {:?}", self.tool_timeout);
                SummaryOutput::placeholder()
            }
        };

        result.summary = output.summary;
        result.sentiment = output.sentiment;
        result.key_themes = output.key_themes;

        if wants_audio && !result.summary.is_empty() {
            match self.bounded(self.tools.speech.synthesize(&result.summary)).await {
                Ok(audio) => result.audio = Some(audio),
                Err(e) => {
                    // Audio failure never blocks the summary.
                    warn!("Speech synthesis failed: {}", e);
                    result.audio = None;
                }
            }
        }

        if result.summary.is_empty() {
            Flow::Continue
        } else {
            Flow::Done
        }
    }

    async fn run_synthesis(&self, text: &str, result: &mut VideoSummary) -> Flow {
        match self.bounded(self.tools.speech.synthesize(text)).await {
            Ok(audio) => result.audio = Some(audio),
            Err(e) => {
                warn!("Speech synthesis failed: {}", e);
                result.audio = None;
            }
        }

        if result.summary.is_empty() {
            Flow::Continue
        } else {
            Flow::Done
        }
    }

    /// Bound a capability call so a hung dependency cannot hang the loop.
    async fn bounded<T>(
        &self,
        fut: impl Future<Output = crate::Result<T>>,
    ) -> crate::Result<T> {
        match tokio::time::timeout(self.tool_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(ResymeError::Timeout(format!(
                "capability call exceeded {:?}",
                self.tool_timeout
            ))),
        }
    }
}
