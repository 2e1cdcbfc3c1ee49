//! Metrics hooks for executions.
//!
//! The executor reports through [`MetricsBackend`]; the default [`NoopMetrics`] discards
//! everything.
//! A Prometheus implementation lives in `orch-prometheus`.

use std::time::Duration;

use orch_model::ExecutionStatus;

use crate::Phase;

pub trait MetricsBackend: Send + Sync + 'static {
    /// Request refused by the verify gate.
    fn record_rejected(&self);

    /// A recoverable or fatal failure in `phase`.
    fn record_phase_failure(&self, phase: Phase);

    /// Execution passed the start phase and reached a final status.
    fn record_execution(&self, status: ExecutionStatus, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl MetricsBackend for NoopMetrics {
    #[inline]
    fn record_rejected(&self) {}
    #[inline]
    fn record_phase_failure(&self, _phase: Phase) {}
    #[inline]
    fn record_execution(&self, _status: ExecutionStatus, _duration: Duration) {}
}
