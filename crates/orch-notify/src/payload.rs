use orch_model::{ExecutionStatus, ServiceId};
use serde::{Deserialize, Serialize};

/// JSON body posted to the notification endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    #[serde(rename = "ServiceID")]
    pub service_id: ServiceId,
    #[serde(rename = "Status")]
    pub status: ExecutionStatus,
}

impl StatusReport {
    pub fn new(service_id: ServiceId, status: ExecutionStatus) -> Self {
        Self { service_id, status }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_shape() {
        let report = StatusReport::new(ServiceId(42), ExecutionStatus::Finished);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json, serde_json::json!({"ServiceID": 42, "Status": "Finished"}));

        let back: StatusReport =
            serde_json::from_str(r#"{"ServiceID":7,"Status":"Aborted"}"#).unwrap();
        assert_eq!(back, StatusReport::new(ServiceId(7), ExecutionStatus::Aborted));
    }
}
