//! Replays a scripted agent run through a chat session and prints every
//! transcript snapshot as chat-widget messages JSON.

mod script;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use transcript_core::observability::init_observability;
use transcript_core::render::to_chat_messages;
use transcript_core::runtime::ScriptedRuntime;
use transcript_core::{AggregatorConfig, ChatSession, RunOptions, SessionConfig, StreamAggregator};

#[derive(Debug, Parser)]
#[command(name = "transcript-replay", version, about)]
struct Cli {
    /// Request text shown as the user turn.
    prompt: String,
    /// JSONL file with one step event per line (defaults to the sunset demo).
    #[arg(long)]
    script: Option<PathBuf>,
    /// JSON aggregator config; `TRANSCRIPT_*` env overrides apply otherwise.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print only the final snapshot.
    #[arg(long)]
    final_only: bool,
    /// Close the run with an error note if a step takes longer than this.
    #[arg(long, value_name = "SECONDS")]
    step_timeout: Option<u64>,
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<AggregatorConfig> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            Ok(AggregatorConfig::from_json(&raw)?)
        }
        None => Ok(AggregatorConfig::from_env()?),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_observability();
    let cli = Cli::parse();

    let config = load_config(cli.config.as_ref())?;
    let events = match &cli.script {
        Some(path) => script::load_script(path)?,
        None => script::demo_script(),
    };
    tracing::info!(events = events.len(), "replaying script");

    let mut options = RunOptions::default();
    if let Some(secs) = cli.step_timeout {
        options = options.step_timeout(std::time::Duration::from_secs(secs));
    }
    let mut session = ChatSession::new(
        Arc::new(ScriptedRuntime::new("scripted", events)),
        StreamAggregator::new(config),
        SessionConfig::named("replay").run_options(options),
    );

    let mut run = session.send(&cli.prompt).await?;
    if cli.final_only {
        let last = run.finish().await;
        println!("{}", to_chat_messages(&last));
    } else {
        while let Some(snapshot) = run.next_snapshot().await {
            println!("{}", to_chat_messages(&snapshot));
        }
    }
    Ok(())
}
