use async_trait::async_trait;
use orch_core::Notifier;
use orch_model::{ExecutionStatus, ServiceId};
use tracing::{debug, warn};

use crate::{NotifierConfig, NotifyError, StatusReport};

/// Posts a [`StatusReport`] as JSON to the request's notification url.
///
/// As a [`Notifier`] it never fails: delivery errors are logged and dropped.
/// Use [`send`](Self::send) to observe them.
#[derive(Debug, Clone)]
pub struct HttpNotifier {
    client: reqwest::Client,
    cfg: NotifierConfig,
}

impl HttpNotifier {
    pub fn new(cfg: NotifierConfig) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(cfg.timeout())
            .user_agent(cfg.user_agent.clone())
            .build()?;
        Ok(Self { client, cfg })
    }

    pub fn config(&self) -> &NotifierConfig {
        &self.cfg
    }

    pub async fn send(&self, target_url: &str, report: &StatusReport) -> Result<(), NotifyError> {
        if target_url.trim().is_empty() {
            return Err(NotifyError::EmptyUrl);
        }

        let response = self.client.post(target_url).json(report).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn notify(&self, target_url: &str, service_id: ServiceId, status: ExecutionStatus) {
        let report = StatusReport::new(service_id, status);
        match self.send(target_url, &report).await {
            Ok(()) => debug!(
                target: "orch.notify",
                url = target_url,
                %service_id,
                %status,
                "status delivered"
            ),
            Err(e) => warn!(
                target: "orch.notify",
                url = target_url,
                %service_id,
                %status,
                error = %e,
                "status delivery failed"
            ),
        }
    }
}
