use std::collections::VecDeque;
use std::time::Duration;

use futures::StreamExt as _;
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::aggregator::StreamAggregator;
use crate::content::TranscriptSnapshot;
use crate::runtime::StepStream;
use crate::stream::StepEvent;

pub(crate) const CANCELLED_NOTE: &str = "Error: run cancelled";
pub(crate) const TIMED_OUT_NOTE: &str = "Error: agent step timed out";
pub(crate) const ENDED_EARLY_NOTE: &str = "Error: agent stream ended without a final answer";

/// Handle used to request cancellation of a running stream.
#[derive(Clone)]
pub struct AbortHandle {
    tx: watch::Sender<bool>,
}

impl AbortHandle {
    /// Requests cancellation.
    ///
    /// Takes effect between step events: the open turn is closed with a
    /// "run cancelled" error note.
    pub fn abort(&self) {
        let _ = self.tx.send(true);
    }
}

/// Streaming handle returned by `ChatSession::send`.
///
/// Yields the snapshot taken when the run started, then one snapshot per
/// ingested step event, then `None` once the assistant turn is closed.
pub struct RunStream<'a> {
    aggregator: &'a mut StreamAggregator,
    events: Option<StepStream>,
    pending: VecDeque<TranscriptSnapshot>,
    run_id: uuid::Uuid,
    session_id: uuid::Uuid,
    step_timeout: Option<Duration>,
    abort_handle: AbortHandle,
    abort_rx: watch::Receiver<bool>,
    seq: u64,
}

enum Step {
    Event(StepEvent),
    Failed(crate::errors::AgentError),
    Ended,
    TimedOut,
    Aborted,
}

impl<'a> RunStream<'a> {
    pub(crate) fn new(
        aggregator: &'a mut StreamAggregator,
        events: Option<StepStream>,
        pending: Vec<TranscriptSnapshot>,
        run_id: uuid::Uuid,
        session_id: uuid::Uuid,
        step_timeout: Option<Duration>,
    ) -> Self {
        let (tx, abort_rx) = watch::channel(false);
        Self {
            aggregator,
            events,
            pending: pending.into(),
            run_id,
            session_id,
            step_timeout,
            abort_handle: AbortHandle { tx },
            abort_rx,
            seq: 0,
        }
    }

    /// Returns the run id for this stream.
    pub fn run_id(&self) -> uuid::Uuid {
        self.run_id
    }

    /// Returns the session id that owns this run.
    pub fn session_id(&self) -> uuid::Uuid {
        self.session_id
    }

    /// Returns a handle that can cancel the run.
    pub fn abort_handle(&self) -> AbortHandle {
        self.abort_handle.clone()
    }

    /// Waits for the next transcript snapshot.
    pub async fn next_snapshot(&mut self) -> Option<TranscriptSnapshot> {
        if let Some(snapshot) = self.pending.pop_front() {
            return Some(snapshot);
        }
        if !self.aggregator.is_open() {
            self.events = None;
            return None;
        }

        let step = match self.events.as_mut() {
            Some(events) => {
                let abort_rx = &mut self.abort_rx;
                let timeout = self.step_timeout;
                tokio::select! {
                    biased;
                    () = wait_for_abort(abort_rx) => Step::Aborted,
                    step = next_step(events, timeout) => step,
                }
            }
            None => Step::Ended,
        };

        let event = match step {
            Step::Event(event) => event,
            Step::Failed(err) => {
                debug!(run_id = %self.run_id, error = %err, "agent reported a failure");
                StepEvent::error(err.to_string())
            }
            Step::Ended => StepEvent::error(ENDED_EARLY_NOTE),
            Step::TimedOut => StepEvent::error(TIMED_OUT_NOTE),
            Step::Aborted => StepEvent::error(CANCELLED_NOTE),
        };
        let kind = event.kind();
        debug!(run_id = %self.run_id, seq = self.seq, kind = %kind, "agent step");
        self.seq = self.seq.saturating_add(1);

        match self.aggregator.ingest(event) {
            Ok(snapshot) => {
                if kind.is_terminal() {
                    self.events = None;
                    info!(run_id = %self.run_id, steps = self.seq, last = %kind, "run finished");
                }
                Some(snapshot)
            }
            Err(err) => {
                error!(run_id = %self.run_id, error = %err, "aggregator rejected step");
                self.events = None;
                None
            }
        }
    }

    /// Drains the stream (if needed) and returns the final transcript.
    ///
    /// Safe to call after consuming snapshots manually with `next_snapshot()`.
    pub async fn finish(mut self) -> TranscriptSnapshot {
        let mut last = None;
        while let Some(snapshot) = self.next_snapshot().await {
            last = Some(snapshot);
        }
        last.unwrap_or_else(|| self.aggregator.snapshot())
    }
}

async fn wait_for_abort(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            // Sender gone: nobody can abort any more.
            std::future::pending::<()>().await;
        }
    }
}

async fn next_step(events: &mut StepStream, timeout: Option<Duration>) -> Step {
    let next = match timeout {
        Some(limit) => match tokio::time::timeout(limit, events.next()).await {
            Ok(next) => next,
            Err(_) => return Step::TimedOut,
        },
        None => events.next().await,
    };
    match next {
        Some(Ok(event)) => Step::Event(event),
        Some(Err(err)) => Step::Failed(err),
        None => Step::Ended,
    }
}
