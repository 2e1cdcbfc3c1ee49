use thiserror::Error;

/// Errors returned to the caller of
/// [`ContainerExecutor::execute`](crate::ContainerExecutor::execute).
///
/// Only the verify gate and the start phase abort an execution; every other failure is logged and
/// absorbed.
#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    NotWhitelisted(#[from] VerifyError),
    #[error("start container failed: {0}")]
    StartFailed(#[source] RuntimeError),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerifyError {
    #[error("image {0:?} is not in the whitelist")]
    NotWhitelisted(String),
    #[error("verifier unavailable: {0}")]
    Unavailable(String),
}

/// Failure reported by a [`RuntimeClient`](crate::RuntimeClient) primitive.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("image pull failed: {0}")]
    Pull(String),
    #[error("container create failed: {0}")]
    Create(String),
    #[error("container start failed: {0}")]
    Start(String),
    #[error("container wait failed: {0}")]
    Wait(String),
    #[error("container logs failed: {0}")]
    Logs(String),
    #[error("container remove failed: {0}")]
    Remove(String),
    #[error("no such container: {0}")]
    NotFound(String),
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for RuntimeError {
    fn from(e: std::io::Error) -> Self {
        RuntimeError::Io(e.to_string())
    }
}

/// Errors while demultiplexing a container log stream.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("log stream truncated: {0}")]
    Truncated(&'static str),
    #[error("unknown stream id {0} in log frame")]
    UnknownStream(u8),
    #[error("runtime reported: {0}")]
    SystemError(String),
}
