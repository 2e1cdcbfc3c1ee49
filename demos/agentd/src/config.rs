use std::path::Path;

use anyhow::Context;
use orch_core::ExecutorConfig;
use orch_exec::{DockerCliConfig, EngineConfig};
use orch_notify::NotifierConfig;
use orch_observe::LoggerConfig;
use serde::{Deserialize, Serialize};

/// Which [`orch_core::RuntimeClient`] runs the containers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuntimeKind {
    /// Shell out to the `docker` binary.
    #[default]
    DockerCli,
    /// Talk to the daemon's Engine API directly.
    Engine,
}

/// Everything the agent needs, read from one JSON file. Missing sections fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentConfig {
    pub logger: LoggerConfig,
    pub executor: ExecutorConfig,
    pub notifier: NotifierConfig,
    pub runtime: RuntimeKind,
    pub docker: DockerCliConfig,
    pub engine: EngineConfig,
    /// Image references allowed to run (see `orch_core::Whitelist`).
    pub whitelist: Vec<String>,
    /// Dump Prometheus text exposition to the log after the run.
    pub print_metrics: bool,
}

impl AgentConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read agent config {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parse agent config {}", path.display()))
    }
}
