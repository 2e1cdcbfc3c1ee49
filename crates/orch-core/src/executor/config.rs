use std::time::Duration;

use orch_translate::TranslatorConfig;
use serde::{Deserialize, Serialize};

/// Where container output collected after completion goes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LogOutput {
    /// Process stdout / stderr.
    #[default]
    Inherit,
    /// One `tracing` event per line.
    Tracing,
    /// Drained and dropped.
    Discard,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExecutorConfig {
    /// Upper bound for the awaiting phase; `None` waits indefinitely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_timeout_ms: Option<u64>,
    pub log_output: LogOutput,
    pub translator: TranslatorConfig,
}

impl ExecutorConfig {
    pub fn wait_timeout(&self) -> Option<Duration> {
        self.wait_timeout_ms.map(Duration::from_millis)
    }

    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    pub fn with_log_output(mut self, output: LogOutput) -> Self {
        self.log_output = output;
        self
    }
}
