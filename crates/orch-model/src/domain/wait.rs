use serde::{Deserialize, Serialize};

/// State a container must reach before a wait resolves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WaitCondition {
    /// Any state other than running (covers containers that already exited).
    #[default]
    NotRunning,
    /// The next exit after the wait was registered.
    NextExit,
    /// Container has been removed.
    Removed,
}

impl WaitCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            WaitCondition::NotRunning => "not-running",
            WaitCondition::NextExit => "next-exit",
            WaitCondition::Removed => "removed",
        }
    }
}
