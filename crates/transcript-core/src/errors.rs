use crate::model::RuntimeId;

/// Errors reported by an agent runtime at the boundary, before they are
/// recorded in the transcript.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgentError {
    /// The runtime (model, tool layer) reported a failure.
    #[error("agent error ({runtime}): {message}")]
    Runtime { runtime: RuntimeId, message: String },
    /// Transport or I/O between this process and the runtime failed.
    #[error("transport error ({runtime}): {message}")]
    Transport { runtime: RuntimeId, message: String },
}

impl AgentError {
    /// Creates a runtime-level error.
    pub fn runtime(runtime: impl Into<RuntimeId>, message: impl Into<String>) -> Self {
        Self::Runtime {
            runtime: runtime.into(),
            message: message.into(),
        }
    }

    /// Creates a transport-level error.
    pub fn transport(runtime: impl Into<RuntimeId>, message: impl Into<String>) -> Self {
        Self::Transport {
            runtime: runtime.into(),
            message: message.into(),
        }
    }

    /// Returns the runtime associated with this error.
    pub fn runtime_id(&self) -> &RuntimeId {
        match self {
            Self::Runtime { runtime, .. } | Self::Transport { runtime, .. } => runtime,
        }
    }

    /// Returns the human-readable message for this error.
    pub fn message(&self) -> &str {
        match self {
            Self::Runtime { message, .. } | Self::Transport { message, .. } => message,
        }
    }
}

/// Top-level error type for the transcript API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TranscriptError {
    /// Caller broke the aggregator state machine (ingest with no open turn).
    #[error("protocol error: {0}")]
    Protocol(String),
    /// Invalid caller input.
    #[error("validation error: {0}")]
    Validation(String),
    /// Invalid configuration.
    #[error("config error: {0}")]
    Config(String),
    /// Agent runtime failure surfaced outside the transcript.
    #[error(transparent)]
    Agent(AgentError),
}

impl TranscriptError {
    pub(crate) fn protocol_msg(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }
}

impl From<AgentError> for TranscriptError {
    fn from(value: AgentError) -> Self {
        TranscriptError::Agent(value)
    }
}
