/// Participant that produced a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person typing into the chat.
    User,
    /// The agent answering the request.
    Assistant,
}

impl Role {
    /// Returns the lowercase wire name (`user` / `assistant`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single typed unit of a turn's content.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text.
    Text { value: String },
    /// Image attachment (filesystem path or URL).
    ImageRef { path_or_url: String },
    /// Video attachment (filesystem path or URL).
    VideoRef { path_or_url: String },
    /// User-facing error line. Never rendered as media.
    ErrorNote { message: String },
}

impl ContentBlock {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text {
            value: value.into(),
        }
    }

    pub fn image(path_or_url: impl Into<String>) -> Self {
        Self::ImageRef {
            path_or_url: path_or_url.into(),
        }
    }

    pub fn video(path_or_url: impl Into<String>) -> Self {
        Self::VideoRef {
            path_or_url: path_or_url.into(),
        }
    }

    pub fn error_note(message: impl Into<String>) -> Self {
        Self::ErrorNote {
            message: message.into(),
        }
    }

    /// True for `ImageRef` and `VideoRef`.
    pub fn is_media(&self) -> bool {
        matches!(self, Self::ImageRef { .. } | Self::VideoRef { .. })
    }
}

/// One participant's contribution to the transcript.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Turn {
    pub role: Role,
    /// Blocks in the order they were produced.
    pub content: Vec<ContentBlock>,
}

impl Turn {
    /// Creates a user turn holding a single text block.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::text(text)],
        }
    }

    /// Creates an assistant turn with no content yet.
    pub fn assistant() -> Self {
        Self {
            role: Role::Assistant,
            content: Vec::new(),
        }
    }

    /// Concatenates all text blocks, separated by newlines. Media and error
    /// notes are ignored.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for block in &self.content {
            if let ContentBlock::Text { value } = block {
                if !out.is_empty() {
                    out.push('\n');
                }
                out.push_str(value);
            }
        }
        out
    }

    /// Returns the media blocks in order.
    pub fn media(&self) -> Vec<&ContentBlock> {
        self.content.iter().filter(|b| b.is_media()).collect()
    }
}

/// Immutable copy of the transcript at one instant.
///
/// Snapshots are plain values; later aggregator mutations never show up in a
/// snapshot that was already handed out.
#[derive(Clone, Debug, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct TranscriptSnapshot {
    /// All turns in order.
    pub turns: Vec<Turn>,
    /// Index of the assistant turn still receiving updates, if any.
    pub open_turn: Option<usize>,
    /// Incremented on every transcript mutation.
    pub revision: u64,
}

impl TranscriptSnapshot {
    /// Returns the most recent turn.
    pub fn last_turn(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// True while an assistant turn is open.
    pub fn is_open(&self) -> bool {
        self.open_turn.is_some()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
