use std::io::Cursor;

use async_trait::async_trait;
use orch_core::{LogStream, RuntimeClient, RuntimeError, StreamKind, logs::encode_frame};
use orch_model::{ConfigBundle, ContainerHandle, WaitCondition};
use tracing::{debug, info};

use crate::{CliError, DockerCliConfig, create_args, util};

/// Runtime client that shells out to the `docker` CLI.
#[derive(Debug, Clone, Default)]
pub struct DockerCli {
    cfg: DockerCliConfig,
}

impl DockerCli {
    pub fn new(cfg: DockerCliConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &DockerCliConfig {
        &self.cfg
    }
}

fn runtime_error(e: CliError, wrap: fn(String) -> RuntimeError) -> RuntimeError {
    if e.is_not_found() {
        RuntimeError::NotFound(e.to_string())
    } else {
        wrap(e.to_string())
    }
}

fn require(handle: &ContainerHandle) -> Result<String, RuntimeError> {
    if handle.is_empty() {
        return Err(RuntimeError::NotFound("empty container handle".into()));
    }
    Ok(handle.as_str().to_string())
}

#[async_trait]
impl RuntimeClient for DockerCli {
    fn name(&self) -> &'static str {
        "docker-cli"
    }

    async fn pull_image(&self, reference: &str) -> Result<(), RuntimeError> {
        util::run(&self.cfg, "pull", &["--quiet".into(), reference.to_string()])
            .await
            .map_err(|e| runtime_error(e, RuntimeError::Pull))?;
        info!(target: "orch.exec.docker", image = reference, "image pulled");
        Ok(())
    }

    async fn create_container(
        &self,
        bundle: &ConfigBundle,
    ) -> Result<ContainerHandle, RuntimeError> {
        let args = create_args(bundle);
        debug!(target: "orch.exec.docker", ?args, "create");

        let output = util::run(&self.cfg, "create", &args)
            .await
            .map_err(|e| runtime_error(e, RuntimeError::Create))?;

        match util::last_line(&output) {
            Some(id) if !id.contains(char::is_whitespace) => Ok(ContainerHandle::new(id)),
            other => Err(runtime_error(
                CliError::UnexpectedOutput {
                    subcommand: "create",
                    output: other.unwrap_or_default(),
                },
                RuntimeError::Create,
            )),
        }
    }

    async fn start_container(&self, handle: &ContainerHandle) -> Result<(), RuntimeError> {
        let id = require(handle)?;
        util::run(&self.cfg, "start", &[id])
            .await
            .map_err(|e| runtime_error(e, RuntimeError::Start))?;
        Ok(())
    }

    async fn wait_container(
        &self,
        handle: &ContainerHandle,
        condition: WaitCondition,
    ) -> Result<i64, RuntimeError> {
        let id = require(handle)?;
        if condition != WaitCondition::NotRunning {
            // `docker wait` has no condition flag; it always waits for the container to stop.
            debug!(
                target: "orch.exec.docker",
                condition = condition.as_str(),
                "wait condition not supported by the cli; waiting for not-running"
            );
        }

        let output = util::run(&self.cfg, "wait", &[id])
            .await
            .map_err(|e| runtime_error(e, RuntimeError::Wait))?;

        let line = util::last_line(&output).unwrap_or_default();
        line.parse::<i64>().map_err(|_| {
            runtime_error(
                CliError::UnexpectedOutput {
                    subcommand: "wait",
                    output: line,
                },
                RuntimeError::Wait,
            )
        })
    }

    async fn fetch_logs(&self, handle: &ContainerHandle) -> Result<LogStream, RuntimeError> {
        let id = require(handle)?;
        let output = util::run(&self.cfg, "logs", &[id])
            .await
            .map_err(|e| runtime_error(e, RuntimeError::Logs))?;

        // The cli already split the streams; interleaving between them is not preserved.
        let mut framed = Vec::with_capacity(output.stdout.len() + output.stderr.len() + 16);
        if !output.stdout.is_empty() {
            encode_frame(StreamKind::Stdout, &output.stdout, &mut framed);
        }
        if !output.stderr.is_empty() {
            encode_frame(StreamKind::Stderr, &output.stderr, &mut framed);
        }
        Ok(Box::new(Cursor::new(framed)))
    }

    async fn remove_container(&self, handle: &ContainerHandle) -> Result<(), RuntimeError> {
        let id = require(handle)?;
        util::run(&self.cfg, "rm", &["--force".into(), id])
            .await
            .map_err(|e| runtime_error(e, RuntimeError::Remove))?;
        debug!(target: "orch.exec.docker", container = handle.short(), "container removed");
        Ok(())
    }
}
