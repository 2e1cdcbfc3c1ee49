use std::{fmt, time::Duration};

use orch_model::ExecutionStatus;

use crate::error::RuntimeError;

/// Lifecycle phases of one execution, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Verifying,
    Pulling,
    Translating,
    Creating,
    Starting,
    Awaiting,
    Collecting,
    Notifying,
    Reclaiming,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Verifying => "verifying",
            Phase::Pulling => "pulling",
            Phase::Translating => "translating",
            Phase::Creating => "creating",
            Phase::Starting => "starting",
            Phase::Awaiting => "awaiting",
            Phase::Collecting => "collecting",
            Phase::Notifying => "notifying",
            Phase::Reclaiming => "reclaiming",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the awaiting phase ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    Exited(i64),
    Error(RuntimeError),
    TimedOut(Duration),
    Cancelled,
}

impl WaitOutcome {
    pub fn status(&self) -> ExecutionStatus {
        match self {
            WaitOutcome::Exited(code) => ExecutionStatus::from_exit_code(*code),
            WaitOutcome::Error(_) | WaitOutcome::TimedOut(_) => ExecutionStatus::Failed,
            WaitOutcome::Cancelled => ExecutionStatus::Aborted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_to_status() {
        assert_eq!(WaitOutcome::Exited(0).status(), ExecutionStatus::Finished);
        assert_eq!(WaitOutcome::Exited(2).status(), ExecutionStatus::Failed);
        assert_eq!(
            WaitOutcome::Error(RuntimeError::Wait("gone".into())).status(),
            ExecutionStatus::Failed
        );
        assert_eq!(
            WaitOutcome::TimedOut(Duration::from_secs(1)).status(),
            ExecutionStatus::Failed
        );
        assert_eq!(WaitOutcome::Cancelled.status(), ExecutionStatus::Aborted);
    }
}
