//! Common imports for typical transcript usage.
//!
//! Re-exports the types most callers need to drive a session and render its
//! snapshots.
pub use crate::{
    AbortHandle, AgentError, AgentRequest, AgentRuntime, AggregatorConfig, ChatSession,
    ContentBlock, MediaClassifier, MediaKind, Role, RunOptions, RunStream, RuntimeId,
    SessionConfig, StepEvent, StepKind, StepStream, StreamAggregator, TranscriptError,
    TranscriptSnapshot, Turn,
};
