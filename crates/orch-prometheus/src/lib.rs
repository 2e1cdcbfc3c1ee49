//! Prometheus metrics backend for the container executor.
//!
//! [`PrometheusMetrics`] implements [`orch_core::MetricsBackend`]; hand it to
//! [`ContainerExecutor::with_metrics`](orch_core::ContainerExecutor::with_metrics).
//!
//! ## Metrics
//! - `orch_executions_total{status}` - Counter
//! - `orch_rejected_total` - Counter
//! - `orch_phase_failures_total{phase}` - Counter
//! - `orch_execution_duration_seconds{status}` - Histogram
//!
//! Serving `/metrics` is left to the embedding application: call [`PrometheusMetrics::encode`] or
//! [`PrometheusMetrics::gather`] from its HTTP stack.

mod backend;
pub use backend::PrometheusMetrics;

pub use prometheus::{Encoder, Registry, TextEncoder};
