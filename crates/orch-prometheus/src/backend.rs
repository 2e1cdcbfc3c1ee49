use std::time::Duration;

use orch_core::{MetricsBackend, Phase};
use orch_model::ExecutionStatus;
use prometheus::{
    HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
    proto::MetricFamily,
};

const DURATION_BUCKETS: &[f64] = &[
    0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0, 900.0, 3600.0,
];

/// Cheap to clone; clones share the same collectors.
#[derive(Clone)]
pub struct PrometheusMetrics {
    registry: Registry,
    executions: IntCounterVec,
    rejected: IntCounter,
    phase_failures: IntCounterVec,
    duration: HistogramVec,
}

impl PrometheusMetrics {
    /// Collectors registered in a fresh private registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::with_registry(Registry::new())
    }

    /// Collectors registered in `registry`, e.g. one shared with other subsystems.
    pub fn with_registry(registry: Registry) -> Result<Self, prometheus::Error> {
        let executions = IntCounterVec::new(
            Opts::new("orch_executions_total", "Executions that reached a final status"),
            &["status"],
        )?;
        let rejected =
            IntCounter::new("orch_rejected_total", "Requests refused by the image verifier")?;
        let phase_failures = IntCounterVec::new(
            Opts::new("orch_phase_failures_total", "Failures per execution phase"),
            &["phase"],
        )?;
        let duration = HistogramVec::new(
            HistogramOpts::new(
                "orch_execution_duration_seconds",
                "Wall time from request to final status",
            )
            .buckets(DURATION_BUCKETS.to_vec()),
            &["status"],
        )?;

        registry.register(Box::new(executions.clone()))?;
        registry.register(Box::new(rejected.clone()))?;
        registry.register(Box::new(phase_failures.clone()))?;
        registry.register(Box::new(duration.clone()))?;

        Ok(Self {
            registry,
            executions,
            rejected,
            phase_failures,
            duration,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Text exposition format, ready to serve on `/metrics`.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        TextEncoder::new().encode_to_string(&self.gather())
    }
}

impl MetricsBackend for PrometheusMetrics {
    fn record_rejected(&self) {
        self.rejected.inc();
    }

    fn record_phase_failure(&self, phase: Phase) {
        self.phase_failures.with_label_values(&[phase.as_str()]).inc();
    }

    fn record_execution(&self, status: ExecutionStatus, duration: Duration) {
        self.executions.with_label_values(&[status.as_str()]).inc();
        self.duration
            .with_label_values(&[status.as_str()])
            .observe(duration.as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_by_label() {
        let m = PrometheusMetrics::new().unwrap();

        m.record_execution(ExecutionStatus::Finished, Duration::from_secs(2));
        m.record_execution(ExecutionStatus::Finished, Duration::from_millis(300));
        m.record_execution(ExecutionStatus::Aborted, Duration::from_secs(40));
        m.record_phase_failure(Phase::Pulling);
        m.record_phase_failure(Phase::Pulling);
        m.record_rejected();

        assert_eq!(m.executions.with_label_values(&["Finished"]).get(), 2);
        assert_eq!(m.executions.with_label_values(&["Aborted"]).get(), 1);
        assert_eq!(m.phase_failures.with_label_values(&["pulling"]).get(), 2);
        assert_eq!(m.rejected.get(), 1);
        assert_eq!(m.duration.with_label_values(&["Finished"]).get_sample_count(), 2);
    }

    #[test]
    fn encodes_text_exposition() {
        let m = PrometheusMetrics::new().unwrap();
        m.record_execution(ExecutionStatus::Failed, Duration::from_secs(1));

        let text = m.encode().unwrap();
        assert!(text.contains(r#"orch_executions_total{status="Failed"} 1"#));
        assert!(text.contains("orch_execution_duration_seconds_bucket"));
    }

    #[test]
    fn shared_registry_rejects_duplicates() {
        let registry = Registry::new();
        let _first = PrometheusMetrics::with_registry(registry.clone()).unwrap();
        assert!(PrometheusMetrics::with_registry(registry).is_err());
    }
}
