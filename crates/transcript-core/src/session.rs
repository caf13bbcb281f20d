use std::sync::Arc;

use tracing::{info, warn};

use crate::aggregator::StreamAggregator;
use crate::content::TranscriptSnapshot;
use crate::context::conversation_context;
use crate::errors::TranscriptError;
use crate::model::{RunOptions, RuntimeId};
use crate::run::RunStream;
use crate::runtime::{AgentRequest, AgentRuntime};
use crate::stream::StepEvent;

/// Configuration used to create a `ChatSession`.
#[derive(Clone, Debug, Default)]
pub struct SessionConfig {
    /// Human-readable session name (used in logs).
    pub name: String,
    /// Options applied to every run in the session.
    pub run_options: RunOptions,
}

impl SessionConfig {
    /// Creates a named session config.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            run_options: RunOptions::default(),
        }
    }

    pub fn run_options(mut self, options: RunOptions) -> Self {
        self.run_options = options;
        self
    }
}

/// One chat conversation driven by an agent runtime.
///
/// The session owns its aggregator, so the transcript accumulates across
/// runs. Sessions share nothing with each other; run two conversations by
/// creating two sessions.
pub struct ChatSession {
    runtime: Arc<dyn AgentRuntime>,
    aggregator: StreamAggregator,
    session_id: uuid::Uuid,
    config: SessionConfig,
}

impl ChatSession {
    pub fn new(
        runtime: Arc<dyn AgentRuntime>,
        aggregator: StreamAggregator,
        config: SessionConfig,
    ) -> Self {
        Self {
            runtime,
            aggregator,
            session_id: uuid::Uuid::new_v4(),
            config,
        }
    }

    pub fn session_id(&self) -> uuid::Uuid {
        self.session_id
    }

    pub fn runtime_id(&self) -> RuntimeId {
        self.runtime.id()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current transcript, e.g. for a client that reconnects mid-run.
    pub fn snapshot(&self) -> TranscriptSnapshot {
        self.aggregator.snapshot()
    }

    /// Starts a run for `prompt` and returns the stream of transcript snapshots.
    ///
    /// Blank prompts are rejected before anything is recorded. If the runtime
    /// fails to start, the failure is recorded as an error note and the
    /// returned stream yields the already-closed transcript.
    pub async fn send(&mut self, prompt: &str) -> Result<RunStream<'_>, TranscriptError> {
        let context = conversation_context(&self.aggregator.snapshot(), prompt);
        let started = self.aggregator.start_run(prompt)?;

        let request = AgentRequest {
            run_id: uuid::Uuid::new_v4(),
            session_id: self.session_id,
            prompt: prompt.to_string(),
            context,
            options: self.config.run_options.clone(),
        };
        let run_id = request.run_id;
        let runtime_id = self.runtime.id();
        info!(
            session = %self.config.name,
            session_id = %self.session_id,
            run_id = %run_id,
            runtime = %runtime_id,
            "run started"
        );

        let mut pending = vec![started];
        let events = match self.runtime.start(request).await {
            Ok(events) => Some(events),
            Err(err) => {
                warn!(run_id = %run_id, runtime = %runtime_id, error = %err, "agent runtime failed to start");
                pending.push(self.aggregator.ingest(StepEvent::error(err.to_string()))?);
                None
            }
        };

        Ok(RunStream::new(
            &mut self.aggregator,
            events,
            pending,
            run_id,
            self.session_id,
            self.config.run_options.step_timeout,
        ))
    }
}
