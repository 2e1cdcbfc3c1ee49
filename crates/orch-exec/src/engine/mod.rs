//! Engine API backed [`RuntimeClient`] over the docker socket.
//!
//! Unlike the CLI client this one honours every [`WaitCondition`] and keeps the daemon's log
//! framing, so stdout and stderr stay interleaved in the order the container wrote them.

mod body;
pub use body::create_body;

mod config;
pub use config::EngineConfig;

use std::io::Cursor;

use async_trait::async_trait;
use bollard::{
    API_DEFAULT_VERSION, Docker,
    container::{
        Config, CreateContainerOptions, LogOutput, LogsOptions, RemoveContainerOptions,
        StartContainerOptions, WaitContainerOptions,
    },
    errors::Error as EngineError,
    image::CreateImageOptions,
};
use futures::StreamExt;
use orch_core::{LogStream, RuntimeClient, RuntimeError, StreamKind, logs::encode_frame};
use orch_model::{ConfigBundle, ContainerHandle, WaitCondition};
use tracing::{debug, info, warn};

/// Runtime client speaking the Engine API through `bollard`.
#[derive(Debug, Clone)]
pub struct DockerEngine {
    docker: Docker,
    cfg: EngineConfig,
}

impl DockerEngine {
    /// Build a client for `cfg.host`, or the local defaults (`DOCKER_HOST`, then the standard
    /// socket). No request is made until the first call.
    pub fn connect(cfg: EngineConfig) -> Result<Self, EngineError> {
        let docker = match cfg.host.as_deref() {
            None => Docker::connect_with_local_defaults()?,
            #[cfg(unix)]
            Some(host) if host.starts_with("unix://") => {
                Docker::connect_with_unix(host, cfg.timeout_secs, API_DEFAULT_VERSION)?
            }
            Some(host) => Docker::connect_with_http(host, cfg.timeout_secs, API_DEFAULT_VERSION)?,
        };
        Ok(Self { docker, cfg })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }
}

fn runtime_error(e: EngineError, wrap: fn(String) -> RuntimeError) -> RuntimeError {
    match e {
        EngineError::DockerResponseServerError {
            status_code: 404,
            message,
        } => RuntimeError::NotFound(message),
        other => wrap(other.to_string()),
    }
}

/// Append one daemon log chunk to `out` as a multiplexed frame. Stdin echoes are dropped.
fn frame_chunk(chunk: LogOutput, out: &mut Vec<u8>) {
    match chunk {
        LogOutput::StdOut { message } | LogOutput::Console { message } => {
            encode_frame(StreamKind::Stdout, &message, out)
        }
        LogOutput::StdErr { message } => encode_frame(StreamKind::Stderr, &message, out),
        LogOutput::StdIn { .. } => {}
    }
}

fn require(handle: &ContainerHandle) -> Result<&str, RuntimeError> {
    if handle.is_empty() {
        return Err(RuntimeError::NotFound("empty container handle".into()));
    }
    Ok(handle.as_str())
}

#[async_trait]
impl RuntimeClient for DockerEngine {
    fn name(&self) -> &'static str {
        "docker-engine"
    }

    async fn pull_image(&self, reference: &str) -> Result<(), RuntimeError> {
        let options = CreateImageOptions {
            from_image: reference.to_string(),
            ..Default::default()
        };
        let mut progress = std::pin::pin!(self.docker.create_image(Some(options), None, None));
        while let Some(step) = progress.next().await {
            step.map_err(|e| runtime_error(e, RuntimeError::Pull))?;
        }
        info!(target: "orch.exec.engine", image = reference, "image pulled");
        Ok(())
    }

    async fn create_container(
        &self,
        bundle: &ConfigBundle,
    ) -> Result<ContainerHandle, RuntimeError> {
        let body = create_body(bundle);
        debug!(target: "orch.exec.engine", %body, "create");

        let config: Config<String> = serde_json::from_value(body)
            .map_err(|e| RuntimeError::Create(format!("create body: {e}")))?;
        let options = bundle
            .container
            .name
            .clone()
            .map(|name| CreateContainerOptions {
                name,
                ..Default::default()
            });

        let created = self
            .docker
            .create_container(options, config)
            .await
            .map_err(|e| runtime_error(e, RuntimeError::Create))?;
        for warning in &created.warnings {
            warn!(target: "orch.exec.engine", container = %created.id, %warning, "create warning");
        }
        Ok(ContainerHandle::new(created.id))
    }

    async fn start_container(&self, handle: &ContainerHandle) -> Result<(), RuntimeError> {
        let id = require(handle)?;
        self.docker
            .start_container(id, None::<StartContainerOptions<String>>)
            .await
            .map_err(|e| runtime_error(e, RuntimeError::Start))
    }

    async fn wait_container(
        &self,
        handle: &ContainerHandle,
        condition: WaitCondition,
    ) -> Result<i64, RuntimeError> {
        let id = require(handle)?;
        let options = WaitContainerOptions {
            condition: condition.as_str(),
        };
        let mut responses = std::pin::pin!(self.docker.wait_container(id, Some(options)));

        match responses.next().await {
            Some(Ok(response)) => Ok(response.status_code),
            // The client reports a non-zero exit as an error; it is still an exit code.
            Some(Err(EngineError::DockerContainerWaitError { code, .. })) => Ok(code),
            Some(Err(e)) => Err(runtime_error(e, RuntimeError::Wait)),
            None => Err(RuntimeError::Wait("wait stream ended without a status".into())),
        }
    }

    async fn fetch_logs(&self, handle: &ContainerHandle) -> Result<LogStream, RuntimeError> {
        let id = require(handle)?;
        let options = LogsOptions::<String> {
            stdout: true,
            stderr: true,
            ..Default::default()
        };

        let mut framed = Vec::new();
        let mut chunks = std::pin::pin!(self.docker.logs(id, Some(options)));
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk.map_err(|e| runtime_error(e, RuntimeError::Logs))?;
            frame_chunk(chunk, &mut framed);
        }
        Ok(Box::new(Cursor::new(framed)))
    }

    async fn remove_container(&self, handle: &ContainerHandle) -> Result<(), RuntimeError> {
        let id = require(handle)?;
        let options = RemoveContainerOptions {
            force: true,
            ..Default::default()
        };
        self.docker
            .remove_container(id, Some(options))
            .await
            .map_err(|e| runtime_error(e, RuntimeError::Remove))?;
        debug!(target: "orch.exec.engine", container = handle.short(), "container removed");
        Ok(())
    }
}
