use crate::media::MediaClassifier;

/// Discriminant of a [`StepEvent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StepKind {
    Thought,
    ToolCall,
    ToolResult,
    FinalAnswer,
    Error,
}

impl StepKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Thought => "thought",
            Self::ToolCall => "tool_call",
            Self::ToolResult => "tool_result",
            Self::FinalAnswer => "final_answer",
            Self::Error => "error",
        }
    }

    /// True for kinds that close the assistant turn.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::FinalAnswer | Self::Error)
    }
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of progress reported by an agent execution.
///
/// JSON form: `{"kind":"final_answer","text":"done","media_refs":["/tmp/a.png"]}`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepEvent {
    /// Agent is reasoning; `text` is a short status line.
    Thought {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
    /// Agent invoked a capability; `text` summarizes which one.
    ToolCall {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
    /// Capability returned; each entry is a path, URL or error string.
    ToolResult {
        #[serde(default)]
        media_refs: Vec<String>,
    },
    /// Terminal success.
    FinalAnswer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
        #[serde(default)]
        media_refs: Vec<String>,
    },
    /// Terminal failure reported by the agent.
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
}

impl StepEvent {
    pub fn thought(text: impl Into<String>) -> Self {
        Self::Thought {
            text: Some(text.into()),
        }
    }

    pub fn tool_call(text: impl Into<String>) -> Self {
        Self::ToolCall {
            text: Some(text.into()),
        }
    }

    pub fn tool_result<I, S>(media_refs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::ToolResult {
            media_refs: media_refs.into_iter().map(Into::into).collect(),
        }
    }

    pub fn final_answer<I, S>(text: impl Into<String>, media_refs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::FinalAnswer {
            text: Some(text.into()),
            media_refs: media_refs.into_iter().map(Into::into).collect(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::Error {
            text: Some(text.into()),
        }
    }

    /// Builds a `ToolResult` from free-form tool output such as
    /// `"Generated 2 image(s): /tmp/a.png, /tmp/b.png"`.
    pub fn tool_result_from_observation(observation: &str, classifier: &MediaClassifier) -> Self {
        Self::ToolResult {
            media_refs: classifier.extract_refs(observation),
        }
    }

    pub fn kind(&self) -> StepKind {
        match self {
            Self::Thought { .. } => StepKind::Thought,
            Self::ToolCall { .. } => StepKind::ToolCall,
            Self::ToolResult { .. } => StepKind::ToolResult,
            Self::FinalAnswer { .. } => StepKind::FinalAnswer,
            Self::Error { .. } => StepKind::Error,
        }
    }

    /// Attachment references carried by the event (empty for text-only kinds).
    pub fn media_refs(&self) -> &[String] {
        match self {
            Self::ToolResult { media_refs } | Self::FinalAnswer { media_refs, .. } => {
                media_refs.as_slice()
            }
            _ => &[],
        }
    }
}
