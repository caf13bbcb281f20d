use crate::errors::TranscriptError;
use crate::media::{MediaClassifier, MediaKind};

/// Comma-separated error marker prefixes.
pub const ENV_ERROR_MARKERS: &str = "TRANSCRIPT_ERROR_MARKERS";
/// Placeholder text for `Thought` events without text.
pub const ENV_THINKING_TEXT: &str = "TRANSCRIPT_THINKING_TEXT";
/// Comma-separated extensions classified as video.
pub const ENV_VIDEO_EXTENSIONS: &str = "TRANSCRIPT_VIDEO_EXTENSIONS";

/// Configuration for a [`StreamAggregator`](crate::StreamAggregator).
///
/// Holds only presentation concerns. API keys and model ids belong to the
/// tool layer and never pass through here.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Placeholder shown for a `Thought` event that carries no text.
    pub thinking_text: String,
    /// Summary used for a `ToolCall` event that carries no text.
    pub tool_call_fallback: String,
    /// Note used for an `Error` event that carries no text.
    pub error_fallback: String,
    /// Attachment classification rules.
    pub classifier: MediaClassifier,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            thinking_text: "Thinking…".to_string(),
            tool_call_fallback: "Calling a tool…".to_string(),
            error_fallback: "Error: the agent failed without details".to_string(),
            classifier: MediaClassifier::default(),
        }
    }
}

impl AggregatorConfig {
    /// Builds a config from defaults plus `TRANSCRIPT_*` environment overrides.
    pub fn from_env() -> Result<Self, TranscriptError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, TranscriptError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(raw) = lookup(ENV_ERROR_MARKERS) {
            let markers = split_list(&raw);
            if markers.is_empty() {
                return Err(TranscriptError::Config(format!(
                    "{ENV_ERROR_MARKERS} must list at least one marker"
                )));
            }
            config.classifier = config.classifier.error_markers(markers);
        }
        if let Some(raw) = lookup(ENV_THINKING_TEXT) {
            if raw.trim().is_empty() {
                return Err(TranscriptError::Config(format!(
                    "{ENV_THINKING_TEXT} must not be empty"
                )));
            }
            config.thinking_text = raw.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_VIDEO_EXTENSIONS) {
            let extensions = split_list(&raw);
            if extensions.is_empty() {
                return Err(TranscriptError::Config(format!(
                    "{ENV_VIDEO_EXTENSIONS} must list at least one extension"
                )));
            }
            config.classifier.video_extensions.clear();
            for ext in extensions {
                config.classifier = config.classifier.map_extension(&ext, MediaKind::Video);
            }
        }
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a JSON config document. Missing fields keep defaults.
    pub fn from_json(raw: &str) -> Result<Self, TranscriptError> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|e| TranscriptError::Config(format!("invalid config JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), TranscriptError> {
        if self.thinking_text.trim().is_empty() {
            return Err(TranscriptError::Config(
                "thinking_text must not be empty".into(),
            ));
        }
        self.classifier.validate()
    }

    /// Overrides the placeholder text for bare `Thought` events.
    pub fn thinking_text(mut self, text: impl Into<String>) -> Self {
        self.thinking_text = text.into();
        self
    }

    /// Overrides the error marker prefixes.
    pub fn error_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.classifier = self.classifier.error_markers(markers);
        self
    }

    /// Replaces the attachment classifier.
    pub fn classifier(mut self, classifier: MediaClassifier) -> Self {
        self.classifier = classifier;
        self
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}
