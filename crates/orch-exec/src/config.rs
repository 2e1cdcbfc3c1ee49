use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DockerCliConfig {
    /// Program to run; looked up in `PATH` unless absolute.
    pub binary: String,
    /// Daemon socket passed as `--host` (e.g. `unix:///run/user/1000/docker.sock`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

impl Default for DockerCliConfig {
    fn default() -> Self {
        Self {
            binary: "docker".into(),
            host: None,
        }
    }
}
