use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Outcome reported to the notifier once an execution has passed the start phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ExecutionStatus {
    /// Container exited with status code 0.
    Finished,
    /// Non-zero exit, wait error or wait timeout.
    Failed,
    /// Execution was cancelled while awaiting completion.
    Aborted,
}

impl ExecutionStatus {
    /// Wire representation sent to notification endpoints.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStatus::Finished => "Finished",
            ExecutionStatus::Failed => "Failed",
            ExecutionStatus::Aborted => "Aborted",
        }
    }

    /// Map a container exit code.
    pub fn from_exit_code(code: i64) -> Self {
        if code == 0 {
            ExecutionStatus::Finished
        } else {
            ExecutionStatus::Failed
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionStatus::Finished)
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Finished" => Ok(ExecutionStatus::Finished),
            "Failed" => Ok(ExecutionStatus::Failed),
            "Aborted" => Ok(ExecutionStatus::Aborted),
            other => Err(ModelError::UnknownStatus(other.to_string())),
        }
    }
}
