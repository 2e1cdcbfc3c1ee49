//! One-shot agent: runs a single service request through the container executor.
//!
//! ```text
//! agentd <agent-config.json> <request.json>
//! ```
//!
//! Ctrl+C while the container runs aborts the execution (status `Aborted`).

mod config;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, bail};
use orch_core::{CancellationToken, ContainerExecutor, RuntimeClient, Whitelist};
use orch_exec::{DockerCli, DockerEngine};
use orch_model::ServiceExecutionInfo;
use orch_notify::HttpNotifier;
use orch_observe::logger_init;
use orch_prometheus::PrometheusMetrics;
use tracing::{info, warn};

use crate::config::{AgentConfig, RuntimeKind};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = std::env::args_os().skip(1).map(PathBuf::from);
    let (Some(config_path), Some(request_path)) = (args.next(), args.next()) else {
        bail!("usage: agentd <agent-config.json> <request.json>");
    };

    // 1) Config + logger
    let cfg = AgentConfig::load(&config_path)?;
    logger_init(&cfg.logger)?;
    info!(config = %config_path.display(), "logger initialized");

    let raw = std::fs::read_to_string(&request_path)
        .with_context(|| format!("read request {}", request_path.display()))?;
    let request: ServiceExecutionInfo = serde_json::from_str(&raw)
        .with_context(|| format!("parse request {}", request_path.display()))?;

    // 2) Collaborators
    if cfg.whitelist.is_empty() {
        warn!("whitelist is empty; every request will be refused");
    }
    let verifier = Arc::new(Whitelist::new(cfg.whitelist.iter().cloned()));
    let runtime: Arc<dyn RuntimeClient> = match cfg.runtime {
        RuntimeKind::DockerCli => Arc::new(DockerCli::new(cfg.docker.clone())),
        RuntimeKind::Engine => Arc::new(
            DockerEngine::connect(cfg.engine.clone()).context("connect to the docker engine")?,
        ),
    };
    info!(runtime = runtime.name(), "runtime selected");
    let notifier = Arc::new(HttpNotifier::new(cfg.notifier.clone())?);
    let metrics = Arc::new(PrometheusMetrics::new()?);

    let executor = ContainerExecutor::new(verifier, runtime, notifier)
        .with_config(cfg.executor.clone())
        .with_metrics(metrics.clone());
    info!("executor ready");

    // 3) Run, aborting on Ctrl+C
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received; aborting execution");
            on_signal.cancel();
        }
    });

    let result = executor.execute_with_cancel(&request, cancel).await;

    if cfg.print_metrics {
        match metrics.encode() {
            Ok(text) => info!("metrics:\n{text}"),
            Err(e) => warn!(error = %e, "metrics encoding failed"),
        }
    }

    result.with_context(|| format!("service {} ({})", request.service_id, request.service_name))?;
    info!("done");
    Ok(())
}
