//! Streaming transcript aggregation for agent-driven chat.
//!
//! An agent runtime reports its progress as [`StepEvent`]s (thoughts, tool
//! calls, tool results, a final answer or an error). [`StreamAggregator`]
//! folds them into an ordered list of [`Turn`]s and hands out a value
//! [`TranscriptSnapshot`] after every step, ready for a chat widget to
//! re-render.
//!
//! # Driving a session
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use transcript_core::prelude::*;
//! use transcript_core::render::to_chat_messages;
//! use transcript_core::runtime::ScriptedRuntime;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), TranscriptError> {
//! let runtime = ScriptedRuntime::new(
//!     "demo",
//!     vec![
//!         StepEvent::thought("Analyzing request..."),
//!         StepEvent::tool_call("fal_image_generation"),
//!         StepEvent::final_answer("Here are your images!", ["/tmp/a.png"]),
//!     ],
//! );
//! let mut session = ChatSession::new(
//!     Arc::new(runtime),
//!     StreamAggregator::new(AggregatorConfig::from_env()?),
//!     SessionConfig::named("demo"),
//! );
//!
//! let mut run = session.send("Generate an image of a sunset").await?;
//! while let Some(snapshot) = run.next_snapshot().await {
//!     println!("{}", to_chat_messages(&snapshot));
//! }
//! # Ok(())
//! # }
//! ```

/// The step-event to transcript state machine.
pub mod aggregator;
/// Aggregator configuration (defaults, env overrides, JSON).
pub mod config;
/// Transcript data model: turns, content blocks, snapshots.
pub mod content;
/// Prompt context built from earlier turns.
pub mod context;
/// Public error types.
pub mod errors;
/// Attachment classification and extraction from tool output.
pub mod media;
/// Runtime identifiers and run options.
pub mod model;
/// Tracing subscriber setup.
pub mod observability;
/// Common imports for typical usage.
pub mod prelude;
/// Chat-widget message rendering.
pub mod render;
/// Snapshot stream and cancellation handle for one run.
pub mod run;
/// Agent runtime contract and the scripted runtime.
pub mod runtime;
/// Chat session driving an agent runtime.
pub mod session;
/// Step events reported by an agent runtime.
pub mod stream;

pub use aggregator::StreamAggregator;
pub use config::AggregatorConfig;
pub use content::{ContentBlock, Role, TranscriptSnapshot, Turn};
pub use errors::{AgentError, TranscriptError};
pub use media::{MediaClassifier, MediaKind};
pub use model::{RunOptions, RuntimeId};
pub use run::{AbortHandle, RunStream};
pub use runtime::{AgentRequest, AgentRuntime, StepStream};
pub use session::{ChatSession, SessionConfig};
pub use stream::{StepEvent, StepKind};
