use serde::{Deserialize, Serialize};

use crate::ServiceId;

/// Request to run one service inside a container.
///
/// `parameters` is the raw invocation as received from the caller. Its layout is load-bearing:
/// - a leading command prefix (e.g. `docker run`),
/// - run flags (`-e FOO=bar`, `-p 80:80`, ...),
/// - the image reference as the **last** element.
///
/// The controller never mutates a request; it only borrows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceExecutionInfo {
    /// Correlation key passed to the notifier.
    pub service_id: ServiceId,
    /// Human-readable label, used for logging only.
    pub service_name: String,
    /// Invocation parameters; the last element is the image reference.
    #[serde(default)]
    pub parameters: Vec<String>,
    /// Endpoint that receives the execution status callback.
    pub notification_target_url: String,
}

impl ServiceExecutionInfo {
    pub fn new<N, U, I, S>(
        service_id: impl Into<ServiceId>,
        service_name: N,
        parameters: I,
        url: U,
    ) -> Self
    where
        N: Into<String>,
        U: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            service_id: service_id.into(),
            service_name: service_name.into(),
            parameters: parameters.into_iter().map(Into::into).collect(),
            notification_target_url: url.into(),
        }
    }

    /// Image reference to launch: the last parameter.
    pub fn image_reference(&self) -> Option<&str> {
        self.parameters.last().map(String::as_str)
    }

    /// Everything before the image reference (prefix and flags), in order.
    pub fn leading_parameters(&self) -> &[String] {
        match self.parameters.split_last() {
            Some((_, rest)) => rest,
            None => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(params: &[&str]) -> ServiceExecutionInfo {
        ServiceExecutionInfo::new(7u64, "demo", params.iter().copied(), "http://127.0.0.1:56001")
    }

    #[test]
    fn image_is_last_parameter() {
        let req = request(&["run", "--image-like", "other:tag", "myimage:latest"]);
        assert_eq!(req.image_reference(), Some("myimage:latest"));
        assert_eq!(req.leading_parameters().len(), 3);
    }

    #[test]
    fn empty_parameters_have_no_image() {
        let req = request(&[]);
        assert_eq!(req.image_reference(), None);
        assert!(req.leading_parameters().is_empty());
    }

    #[test]
    fn serde_uses_camel_case() {
        let req = request(&["run", "alpine"]);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["serviceId"], 7);
        assert_eq!(json["serviceName"], "demo");
        assert_eq!(json["notificationTargetUrl"], "http://127.0.0.1:56001");

        let back: ServiceExecutionInfo = serde_json::from_value(json).unwrap();
        assert_eq!(back, req);
    }
}
