use std::pin::Pin;

use futures::Stream;

use crate::errors::AgentError;
use crate::model::{RunOptions, RuntimeId};
use crate::stream::StepEvent;

/// Stream of step events produced by one agent run.
pub type StepStream = Pin<Box<dyn Stream<Item = Result<StepEvent, AgentError>> + Send>>;

/// Request handed to an agent runtime for one run.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentRequest {
    pub run_id: uuid::Uuid,
    pub session_id: uuid::Uuid,
    /// The request exactly as the user typed it.
    pub prompt: String,
    /// Prompt text including earlier conversation, see
    /// [`conversation_context`](crate::context::conversation_context).
    pub context: String,
    pub options: RunOptions,
}

/// Contract implemented by anything that can execute an agent run.
///
/// Tool selection, model calls and completion detection all live behind this
/// trait; callers only see the resulting step events.
#[async_trait::async_trait]
pub trait AgentRuntime: Send + Sync {
    /// Stable runtime identifier.
    fn id(&self) -> RuntimeId;

    /// Starts a run and returns its step events.
    async fn start(&self, req: AgentRequest) -> Result<StepStream, AgentError>;
}

/// Runtime that replays a fixed list of step events for every run.
#[derive(Clone, Debug)]
pub struct ScriptedRuntime {
    id: RuntimeId,
    script: Vec<Result<StepEvent, AgentError>>,
}

impl ScriptedRuntime {
    pub fn new(id: impl Into<RuntimeId>, events: Vec<StepEvent>) -> Self {
        Self {
            id: id.into(),
            script: events.into_iter().map(Ok).collect(),
        }
    }

    /// Builds a script that may include runtime failures mid-stream.
    pub fn with_results(
        id: impl Into<RuntimeId>,
        script: Vec<Result<StepEvent, AgentError>>,
    ) -> Self {
        Self {
            id: id.into(),
            script,
        }
    }

    pub fn len(&self) -> usize {
        self.script.len()
    }

    pub fn is_empty(&self) -> bool {
        self.script.is_empty()
    }
}

#[async_trait::async_trait]
impl AgentRuntime for ScriptedRuntime {
    fn id(&self) -> RuntimeId {
        self.id.clone()
    }

    async fn start(&self, _req: AgentRequest) -> Result<StepStream, AgentError> {
        Ok(Box::pin(futures::stream::iter(self.script.clone())))
    }
}

#[cfg(test)]
mod tests {
    use futures::StreamExt as _;

    use super::*;

    fn request() -> AgentRequest {
        AgentRequest {
            run_id: uuid::Uuid::new_v4(),
            session_id: uuid::Uuid::new_v4(),
            prompt: "hi".into(),
            context: "\nCurrent request: hi".into(),
            options: RunOptions::default(),
        }
    }

    #[tokio::test]
    async fn scripted_runtime_replays_events_for_every_run() {
        let runtime = ScriptedRuntime::with_results(
            "scripted",
            vec![
                Ok(StepEvent::thought("t")),
                Err(AgentError::runtime("scripted", "boom")),
            ],
        );
        assert_eq!(runtime.id(), RuntimeId::new("scripted"));
        assert_eq!(runtime.len(), 2);

        for _ in 0..2 {
            let items: Vec<_> = runtime.start(request()).await.expect("start").collect().await;
            assert_eq!(
                items,
                vec![
                    Ok(StepEvent::thought("t")),
                    Err(AgentError::runtime("scripted", "boom")),
                ]
            );
        }
    }
}
