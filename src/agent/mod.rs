//! Agent core: the autonomous tool-orchestration loop.
//!
//! Drives a bounded multi-turn conversation with a decision-making model that
//! chooses among a fixed menu of capabilities (video search, transcript
//! fetch, summarization, speech synthesis), folds each result back into the
//! conversation, and terminates with a fully populated result.

mod backend;
mod conversation;
mod runner;
mod summary;
mod tools;

pub use backend::{ChatBackend, ChatOutcome, OpenAiBackend, ToolInvocation};
pub use conversation::{Conversation, Role, Turn};
pub use runner::Agent;
pub use summary::{SummaryPatch, VideoSummary};
pub use tools::{parse_tool_call, tool_definitions, ToolCall, ToolContext};
