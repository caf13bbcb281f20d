use tracing::{debug, warn};

use crate::config::AggregatorConfig;
use crate::content::{ContentBlock, TranscriptSnapshot, Turn};
use crate::errors::TranscriptError;
use crate::stream::StepEvent;

/// Turns a live sequence of [`StepEvent`]s into transcript snapshots.
///
/// One instance owns one conversation. Every operation completes synchronously
/// and returns a value copy of the transcript, so callers can hand snapshots
/// to a renderer while the aggregator keeps mutating.
///
/// ```
/// use transcript_core::{ContentBlock, StepEvent, StreamAggregator};
///
/// let mut agg = StreamAggregator::default();
/// agg.start_run("Generate a cat").unwrap();
/// agg.ingest(StepEvent::tool_call("fal_image_generation")).unwrap();
/// let snap = agg
///     .ingest(StepEvent::final_answer("Done", ["/tmp/cat.png"]))
///     .unwrap();
/// assert!(!snap.is_open());
/// assert_eq!(snap.turns[1].content[2], ContentBlock::image("/tmp/cat.png"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StreamAggregator {
    config: AggregatorConfig,
    turns: Vec<Turn>,
    open_turn: Option<usize>,
    // Index of the trailing Thought placeholder inside the open turn.
    placeholder: Option<usize>,
    revision: u64,
}

impl StreamAggregator {
    pub fn new(config: AggregatorConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// True while an assistant turn is receiving events.
    pub fn is_open(&self) -> bool {
        self.open_turn.is_some()
    }

    /// Appends the user's request and opens an empty assistant turn.
    ///
    /// A turn left open by a previous run is closed as-is first.
    pub fn start_run(&mut self, user_input: &str) -> Result<TranscriptSnapshot, TranscriptError> {
        if user_input.trim().is_empty() {
            return Err(TranscriptError::Validation(
                "user input must not be empty".into(),
            ));
        }
        if let Some(idx) = self.open_turn {
            warn!(
                turn = idx,
                blocks = self.turns[idx].content.len(),
                "starting a new run while the previous assistant turn is open; closing it"
            );
            self.close();
        }

        self.turns.push(Turn::user(user_input));
        self.turns.push(Turn::assistant());
        self.open_turn = Some(self.turns.len() - 1);
        self.placeholder = None;
        self.revision += 1;
        debug!(turns = self.turns.len(), revision = self.revision, "run started");
        Ok(self.snapshot())
    }

    /// Applies one step event to the open assistant turn.
    ///
    /// Fails with [`TranscriptError::Protocol`] when no turn is open, either
    /// because `start_run` was never called or because the last run already
    /// received its `FinalAnswer`/`Error`.
    pub fn ingest(&mut self, event: StepEvent) -> Result<TranscriptSnapshot, TranscriptError> {
        let Some(idx) = self.open_turn else {
            let reason = if self.turns.is_empty() {
                "ingest before start_run"
            } else {
                "ingest after the assistant turn was closed"
            };
            return Err(TranscriptError::protocol_msg(format!(
                "{reason} (event kind: {})",
                event.kind()
            )));
        };

        let kind = event.kind();
        match event {
            StepEvent::Thought { text } => {
                let status = non_empty(text).unwrap_or_else(|| self.config.thinking_text.clone());
                self.set_placeholder(idx, status);
            }
            StepEvent::ToolCall { text } => {
                let summary =
                    non_empty(text).unwrap_or_else(|| self.config.tool_call_fallback.clone());
                self.push(idx, ContentBlock::text(summary));
            }
            StepEvent::ToolResult { media_refs } => {
                self.push_media(idx, &media_refs);
            }
            StepEvent::FinalAnswer { text, media_refs } => {
                if let Some(text) = non_empty(text) {
                    self.push(idx, ContentBlock::text(text));
                }
                self.push_media(idx, &media_refs);
                self.close();
            }
            StepEvent::Error { text } => {
                let message = non_empty(text).unwrap_or_else(|| self.config.error_fallback.clone());
                self.push(idx, ContentBlock::error_note(message));
                self.close();
            }
        }

        self.revision += 1;
        debug!(
            kind = %kind,
            blocks = self.turns[idx].content.len(),
            open = self.is_open(),
            revision = self.revision,
            "step event ingested"
        );
        Ok(self.snapshot())
    }

    /// Returns a copy of the current transcript without changing it.
    pub fn snapshot(&self) -> TranscriptSnapshot {
        TranscriptSnapshot {
            turns: self.turns.clone(),
            open_turn: self.open_turn,
            revision: self.revision,
        }
    }

    fn set_placeholder(&mut self, idx: usize, status: String) {
        let content = &mut self.turns[idx].content;
        match self.placeholder {
            Some(pos) if pos + 1 == content.len() => {
                content[pos] = ContentBlock::text(status);
            }
            _ => {
                content.push(ContentBlock::text(status));
                self.placeholder = Some(content.len() - 1);
            }
        }
    }

    fn push(&mut self, idx: usize, block: ContentBlock) {
        self.turns[idx].content.push(block);
        // Anything appended after a placeholder settles it as ordinary text.
        self.placeholder = None;
    }

    fn push_media(&mut self, idx: usize, media_refs: &[String]) {
        for reference in media_refs {
            match self.config.classifier.classify(reference) {
                Some(block) => self.push(idx, block),
                None => debug!("dropping empty attachment reference"),
            }
        }
    }

    fn close(&mut self) {
        self.open_turn = None;
        self.placeholder = None;
    }
}

fn non_empty(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Role;

    fn started() -> StreamAggregator {
        let mut agg = StreamAggregator::default();
        agg.start_run("Generate 2 images of a sunset").expect("start");
        agg
    }

    fn assistant_blocks(snapshot: &TranscriptSnapshot) -> &[ContentBlock] {
        &snapshot.last_turn().expect("assistant turn").content
    }

    #[test]
    fn start_run_appends_user_and_open_assistant_turn() {
        let mut agg = StreamAggregator::default();
        let snap = agg.start_run("hello").expect("start");
        assert_eq!(snap.turns, vec![Turn::user("hello"), Turn::assistant()]);
        assert_eq!(snap.open_turn, Some(1));
        assert_eq!(snap.revision, 1);
    }

    #[test]
    fn start_run_rejects_blank_input() {
        let mut agg = StreamAggregator::default();
        assert!(matches!(
            agg.start_run("  \n"),
            Err(TranscriptError::Validation(_))
        ));
        assert!(agg.snapshot().is_empty());
    }

    #[test]
    fn ingest_before_start_run_is_protocol_error() {
        let mut agg = StreamAggregator::default();
        let err = agg.ingest(StepEvent::thought("x")).expect_err("no open turn");
        assert!(matches!(err, TranscriptError::Protocol(msg) if msg.contains("before start_run")));
    }

    #[test]
    fn end_to_end_sunset_scenario() {
        let mut agg = StreamAggregator::default();
        agg.start_run("Generate 2 images of a sunset").expect("start");
        agg.ingest(StepEvent::thought("Analyzing request...")).expect("thought");
        agg.ingest(StepEvent::tool_call("fal_image_generation")).expect("call");
        let snap = agg
            .ingest(StepEvent::final_answer(
                "Here are your images!",
                ["/tmp/a.png", "/tmp/b.png"],
            ))
            .expect("final");

        assert_eq!(snap.turns.len(), 2);
        assert_eq!(snap.turns[0], Turn::user("Generate 2 images of a sunset"));
        assert_eq!(snap.turns[1].role, Role::Assistant);
        assert_eq!(
            snap.turns[1].content,
            vec![
                ContentBlock::text("Analyzing request..."),
                ContentBlock::text("fal_image_generation"),
                ContentBlock::text("Here are your images!"),
                ContentBlock::image("/tmp/a.png"),
                ContentBlock::image("/tmp/b.png"),
            ]
        );
        assert!(!snap.is_open());
    }

    #[test]
    fn consecutive_thoughts_collapse_into_one_placeholder() {
        let mut agg = started();
        agg.ingest(StepEvent::thought("first")).expect("thought");
        let snap = agg.ingest(StepEvent::thought("second")).expect("thought");
        assert_eq!(assistant_blocks(&snap), [ContentBlock::text("second")]);
    }

    #[test]
    fn bare_thought_uses_configured_placeholder() {
        let mut agg = StreamAggregator::new(AggregatorConfig::default().thinking_text("Working"));
        agg.start_run("go").expect("start");
        let snap = agg.ingest(StepEvent::Thought { text: None }).expect("thought");
        assert_eq!(assistant_blocks(&snap), [ContentBlock::text("Working")]);
    }

    #[test]
    fn thought_after_other_blocks_starts_a_new_placeholder() {
        let mut agg = started();
        agg.ingest(StepEvent::thought("planning")).expect("thought");
        agg.ingest(StepEvent::tool_call("fal_image_generation")).expect("call");
        agg.ingest(StepEvent::thought("checking result")).expect("thought");
        let snap = agg.ingest(StepEvent::thought("almost done")).expect("thought");
        assert_eq!(
            assistant_blocks(&snap),
            [
                ContentBlock::text("planning"),
                ContentBlock::text("fal_image_generation"),
                ContentBlock::text("almost done"),
            ]
        );
    }

    #[test]
    fn blocks_follow_event_order() {
        let mut agg = started();
        agg.ingest(StepEvent::tool_call("fal_video_generation")).expect("call");
        agg.ingest(StepEvent::tool_result(["https://x/clip.mp4"])).expect("result");
        agg.ingest(StepEvent::tool_call("fal_image_edit")).expect("call");
        agg.ingest(StepEvent::tool_result(["/tmp/edit.png"])).expect("result");
        let snap = agg.ingest(StepEvent::final_answer("ok", Vec::<String>::new())).expect("final");
        assert_eq!(
            assistant_blocks(&snap),
            [
                ContentBlock::text("fal_video_generation"),
                ContentBlock::video("https://x/clip.mp4"),
                ContentBlock::text("fal_image_edit"),
                ContentBlock::image("/tmp/edit.png"),
                ContentBlock::text("ok"),
            ]
        );
    }

    #[test]
    fn error_refs_become_error_notes_not_media() {
        let mut agg = started();
        let snap = agg
            .ingest(StepEvent::tool_result(["Error: rate limit exceeded"]))
            .expect("result");
        assert_eq!(
            assistant_blocks(&snap),
            [ContentBlock::error_note("Error: rate limit exceeded")]
        );
        assert!(snap.last_turn().expect("turn").media().is_empty());
        assert!(snap.is_open());

        for reference in ["Error: out.png", "Error: clip.mp4", "Error generating video"] {
            let snap = agg.ingest(StepEvent::tool_result([reference])).expect("result");
            let last = assistant_blocks(&snap).last().expect("block");
            assert_eq!(last, &ContentBlock::error_note(reference));
        }
    }

    #[test]
    fn empty_refs_are_dropped_silently() {
        let mut agg = started();
        let snap = agg
            .ingest(StepEvent::tool_result(["", "/tmp/a.png", "  "]))
            .expect("result");
        assert_eq!(assistant_blocks(&snap), [ContentBlock::image("/tmp/a.png")]);
    }

    #[test]
    fn final_answer_filters_error_refs_and_skips_blank_text() {
        let mut agg = started();
        let snap = agg
            .ingest(StepEvent::FinalAnswer {
                text: Some("   ".into()),
                media_refs: vec!["Error: nsfw filtered".into(), "/tmp/ok.webp".into()],
            })
            .expect("final");
        assert_eq!(
            assistant_blocks(&snap),
            [
                ContentBlock::error_note("Error: nsfw filtered"),
                ContentBlock::image("/tmp/ok.webp"),
            ]
        );
    }

    #[test]
    fn empty_final_answer_closes_with_zero_blocks() {
        let mut agg = started();
        let snap = agg
            .ingest(StepEvent::FinalAnswer {
                text: None,
                media_refs: Vec::new(),
            })
            .expect("final");
        assert!(assistant_blocks(&snap).is_empty());
        assert!(!snap.is_open());
    }

    #[test]
    fn terminal_events_close_the_turn() {
        for terminal in [
            StepEvent::final_answer("done", Vec::<String>::new()),
            StepEvent::error("model crashed"),
        ] {
            let mut agg = started();
            agg.ingest(terminal).expect("terminal");
            let err = agg
                .ingest(StepEvent::thought("late"))
                .expect_err("closed turn");
            assert!(matches!(err, TranscriptError::Protocol(msg) if msg.contains("closed")));

            let snap = agg.start_run("next request").expect("restart");
            assert_eq!(snap.turns.len(), 4);
            assert!(agg.ingest(StepEvent::thought("ok again")).is_ok());
        }
    }

    #[test]
    fn error_event_appends_note() {
        let mut agg = started();
        agg.ingest(StepEvent::thought("trying")).expect("thought");
        let snap = agg.ingest(StepEvent::Error { text: None }).expect("error");
        assert_eq!(
            assistant_blocks(&snap),
            [
                ContentBlock::text("trying"),
                ContentBlock::error_note(AggregatorConfig::default().error_fallback),
            ]
        );
    }

    #[test]
    fn snapshots_are_isolated_from_later_mutation() {
        let mut agg = started();
        let before = agg.ingest(StepEvent::thought("first")).expect("thought");
        let frozen = before.clone();
        agg.ingest(StepEvent::thought("second")).expect("thought");
        agg.ingest(StepEvent::final_answer("done", ["/tmp/a.png"])).expect("final");
        agg.start_run("another").expect("start");
        assert_eq!(before, frozen);
        assert_eq!(assistant_blocks(&before), [ContentBlock::text("first")]);
        assert!(agg.snapshot().revision > before.revision);
    }

    #[test]
    fn snapshot_has_no_side_effects() {
        let agg = started();
        assert_eq!(agg.snapshot(), agg.snapshot());
    }

    #[test]
    fn start_run_closes_abandoned_turn() {
        let mut agg = started();
        agg.ingest(StepEvent::tool_call("fal_image_generation")).expect("call");
        let snap = agg.start_run("never mind, do a video").expect("restart");
        assert_eq!(snap.turns.len(), 4);
        assert_eq!(snap.open_turn, Some(3));
        assert_eq!(
            snap.turns[1].content,
            vec![ContentBlock::text("fal_image_generation")]
        );
    }
}
