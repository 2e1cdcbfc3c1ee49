use async_trait::async_trait;
use orch_model::{ConfigBundle, ContainerHandle, WaitCondition};
use tokio::io::AsyncRead;

use crate::error::RuntimeError;

/// Combined stdout/stderr of a container in the multiplexed frame format (see [`crate::logs`]).
pub type LogStream = Box<dyn AsyncRead + Send + Unpin>;

/// Container lifecycle primitives of one runtime.
///
/// Implementations are shared by every in-flight execution and must be safe for concurrent use.
#[async_trait]
pub trait RuntimeClient: Send + Sync + 'static {
    /// Runtime name for logs.
    fn name(&self) -> &'static str {
        "runtime"
    }

    async fn pull_image(&self, reference: &str) -> Result<(), RuntimeError>;

    async fn create_container(&self, bundle: &ConfigBundle)
    -> Result<ContainerHandle, RuntimeError>;

    async fn start_container(&self, handle: &ContainerHandle) -> Result<(), RuntimeError>;

    /// Resolves once the container reaches `condition`, yielding its exit status code.
    ///
    /// The future may be dropped before it resolves (timeout or cancellation); implementations must
    /// not leak work when that happens.
    async fn wait_container(
        &self,
        handle: &ContainerHandle,
        condition: WaitCondition,
    ) -> Result<i64, RuntimeError>;

    async fn fetch_logs(&self, handle: &ContainerHandle) -> Result<LogStream, RuntimeError>;

    /// Remove the container, stopping it first if it is still running.
    async fn remove_container(&self, handle: &ContainerHandle) -> Result<(), RuntimeError>;
}
