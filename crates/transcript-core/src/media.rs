use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::content::ContentBlock;
use crate::errors::TranscriptError;

const DEFAULT_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif", "bmp"];
const DEFAULT_VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "webm", "mkv", "m4v"];

// Absolute paths and http(s) URLs that start a token.
static CANDIDATE_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:^|[\s,;:='"(\[])((?:https?://|/[^/\s])[^\s,;'"<>()\[\]{}]*)"#)
        .expect("media reference pattern is valid")
});

/// Kind of media an attachment reference points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Image,
    Video,
}

/// Turns raw attachment references into content blocks.
///
/// References starting with an error marker become [`ContentBlock::ErrorNote`]
/// regardless of extension. Everything else is classified by file extension;
/// unknown or missing extensions fall back to `fallback`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MediaClassifier {
    /// Prefixes that mark a reference as user-facing error text.
    pub error_markers: Vec<String>,
    pub image_extensions: BTreeSet<String>,
    pub video_extensions: BTreeSet<String>,
    /// Kind used when the extension is not recognized.
    pub fallback: MediaKind,
}

impl Default for MediaClassifier {
    fn default() -> Self {
        Self {
            error_markers: vec!["Error".to_string()],
            image_extensions: DEFAULT_IMAGE_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            video_extensions: DEFAULT_VIDEO_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            fallback: MediaKind::Image,
        }
    }
}

impl MediaClassifier {
    /// Replaces the error marker prefixes.
    pub fn error_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.error_markers = markers.into_iter().map(Into::into).collect();
        self
    }

    /// Maps an extension (case-insensitive, without the dot) to a media kind.
    pub fn map_extension(mut self, extension: &str, kind: MediaKind) -> Self {
        let ext = normalize_extension(extension);
        self.image_extensions.remove(&ext);
        self.video_extensions.remove(&ext);
        match kind {
            MediaKind::Image => self.image_extensions.insert(ext),
            MediaKind::Video => self.video_extensions.insert(ext),
        };
        self
    }

    /// Sets the kind used for unrecognized extensions.
    pub fn fallback(mut self, kind: MediaKind) -> Self {
        self.fallback = kind;
        self
    }

    /// Checks that the classifier can make decisions at all.
    pub fn validate(&self) -> Result<(), TranscriptError> {
        if self.error_markers.iter().all(|m| m.trim().is_empty()) {
            return Err(TranscriptError::Config(
                "at least one non-empty error marker is required".into(),
            ));
        }
        if let Some(ext) = self
            .image_extensions
            .iter()
            .chain(&self.video_extensions)
            .find(|ext| ext.trim().is_empty())
        {
            return Err(TranscriptError::Config(format!(
                "invalid media extension {ext:?}"
            )));
        }
        if let Some(ext) = self.image_extensions.intersection(&self.video_extensions).next() {
            return Err(TranscriptError::Config(format!(
                "extension {ext:?} is mapped to both image and video"
            )));
        }
        Ok(())
    }

    /// True when the reference starts with one of the error markers.
    pub fn is_error(&self, reference: &str) -> bool {
        let reference = reference.trim_start();
        self.error_markers
            .iter()
            .filter(|m| !m.is_empty())
            .any(|m| reference.starts_with(m.as_str()))
    }

    /// Returns the recognized kind for a reference's extension, if any.
    pub fn known_kind(&self, reference: &str) -> Option<MediaKind> {
        let ext = extension_of(reference)?;
        if self.video_extensions.contains(&ext) {
            Some(MediaKind::Video)
        } else if self.image_extensions.contains(&ext) {
            Some(MediaKind::Image)
        } else {
            None
        }
    }

    pub fn kind_of(&self, reference: &str) -> MediaKind {
        self.known_kind(reference).unwrap_or(self.fallback)
    }

    /// Classifies a single attachment reference.
    ///
    /// Returns `None` for empty (or whitespace-only) references. Surrounding
    /// whitespace is ignored for classification; the block keeps `reference`
    /// exactly as given.
    pub fn classify(&self, reference: &str) -> Option<ContentBlock> {
        let trimmed = reference.trim();
        if trimmed.is_empty() {
            return None;
        }
        if self.is_error(trimmed) {
            return Some(ContentBlock::error_note(reference));
        }
        Some(match self.kind_of(trimmed) {
            MediaKind::Image => ContentBlock::image(reference),
            MediaKind::Video => ContentBlock::video(reference),
        })
    }

    /// Pulls media references out of free-form tool output.
    ///
    /// Output that starts with an error marker is returned whole so it surfaces
    /// as an error note. Otherwise every absolute path or http(s) URL with a
    /// recognized media extension is returned in order of appearance.
    pub fn extract_refs(&self, observation: &str) -> Vec<String> {
        let observation = observation.trim();
        if observation.is_empty() {
            return Vec::new();
        }
        if self.is_error(observation) {
            return vec![observation.to_string()];
        }
        CANDIDATE_REF
            .captures_iter(observation)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().trim_end_matches(['.', '!']))
            .filter(|candidate| self.known_kind(candidate).is_some())
            .map(ToOwned::to_owned)
            .collect()
    }
}

/// Returns the MIME type for a reference with a well-known extension.
pub fn mime_type(reference: &str) -> Option<&'static str> {
    let mime = match extension_of(reference)?.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        _ => return None,
    };
    Some(mime)
}

fn normalize_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_ascii_lowercase()
}

fn extension_of(reference: &str) -> Option<String> {
    let path = reference
        .split(['?', '#'])
        .next()
        .unwrap_or(reference)
        .trim_end_matches('/');
    let file_name = path.rsplit('/').next().unwrap_or(path);
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
