use std::fmt;
use std::time::Duration;

/// Name of the agent runtime that produced a run, e.g. `smolagent`.
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct RuntimeId(String);

impl RuntimeId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuntimeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RuntimeId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Generic run behavior options.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RunOptions {
    /// Longest wait for the next agent step before the run is closed with an
    /// error note. `None` waits indefinitely.
    pub step_timeout: Option<Duration>,
    /// Upper bound on steps the runtime may take, passed through untouched.
    pub max_steps: Option<u32>,
}

impl RunOptions {
    pub fn step_timeout(mut self, timeout: Duration) -> Self {
        self.step_timeout = Some(timeout);
        self
    }

    pub fn max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = Some(max_steps);
        self
    }
}
