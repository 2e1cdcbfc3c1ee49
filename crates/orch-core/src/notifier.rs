use async_trait::async_trait;
use orch_model::{ExecutionStatus, ServiceId};

/// Delivers the final status of an execution to the caller's endpoint.
///
/// Fire-and-forget from the executor's side: delivery failures stay inside the implementation.
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    async fn notify(&self, target_url: &str, service_id: ServiceId, status: ExecutionStatus);
}
