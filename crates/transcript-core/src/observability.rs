use std::path::PathBuf;

use once_cell::sync::OnceCell;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

static INIT: OnceCell<()> = OnceCell::new();

const DEFAULT_LOG_FILE: &str = "transcript.logs.jsonl";

/// Logging settings resolved from the environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogSettings {
    pub enabled: bool,
    /// `EnvFilter` directive, e.g. `info` or `transcript_core=debug`.
    pub filter: String,
    /// JSONL output file; console output when `None`.
    pub json_path: Option<PathBuf>,
}

impl LogSettings {
    /// Reads:
    /// - `TRANSCRIPT_OBSERVABILITY_ENABLED` / `TRANSCRIPT_OBSERVABILITY`: on/off flag (default on).
    /// - `TRANSCRIPT_LOG_LEVEL`, then `RUST_LOG`: filter directive (default `info`).
    /// - `TRANSCRIPT_JSON_LOG_PATH`: write JSONL to this file instead of stderr.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let enabled = ["TRANSCRIPT_OBSERVABILITY_ENABLED", "TRANSCRIPT_OBSERVABILITY"]
            .into_iter()
            .find_map(|key| lookup(key))
            .map(|raw| parse_bool_env(&raw).unwrap_or(true))
            .unwrap_or(true);
        let filter = ["TRANSCRIPT_LOG_LEVEL", "RUST_LOG"]
            .into_iter()
            .filter_map(|key| lookup(key))
            .map(|raw| raw.trim().to_string())
            .find(|raw| !raw.is_empty() && tracing_subscriber::EnvFilter::try_new(raw).is_ok())
            .unwrap_or_else(|| "info".to_string());
        let json_path = lookup("TRANSCRIPT_JSON_LOG_PATH")
            .filter(|raw| !raw.trim().is_empty())
            .map(PathBuf::from);
        Self {
            enabled,
            filter,
            json_path,
        }
    }
}

fn parse_bool_env(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "enabled" => Some(true),
        "0" | "false" | "no" | "off" | "disabled" => Some(false),
        _ => None,
    }
}

/// Installs the global tracing subscriber once per process using
/// [`LogSettings::from_env`]. Later calls are no-ops.
///
/// Console output goes to stderr so stdout stays free for transcript output.
pub fn init_observability() {
    INIT.get_or_init(|| install(LogSettings::from_env()));
}

fn install(settings: LogSettings) {
    if !settings.enabled {
        return;
    }
    let env_filter = tracing_subscriber::EnvFilter::try_new(&settings.filter)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match settings.json_path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                let _ = std::fs::create_dir_all(parent);
            }
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or(DEFAULT_LOG_FILE)
                .to_string();
            let json_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_target(false)
                .with_writer(tracing_appender::rolling::never(dir, file_name));
            let _ = tracing_subscriber::registry()
                .with(env_filter)
                .with(json_layer)
                .try_init();
        }
        None => {
            let console_layer = tracing_subscriber::fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr);
            let _ = tracing_subscriber::registry()
                .with(env_filter)
                .with(console_layer)
                .try_init();
        }
    }
}
