//! Container service-execution controller.
//!
//! [`ContainerExecutor`] drives one request through verify → pull → translate/create → start →
//! await → collect → notify → reclaim.
//! The runtime, the image gate and the status callback are injected as trait objects
//! ([`RuntimeClient`], [`Verifier`], [`Notifier`]), so one executor can serve many concurrent
//! requests and tests can run isolated instances.

pub mod error;
pub use error::{ExecuteError, LogError, RuntimeError, VerifyError};

pub mod executor;
pub use executor::{ContainerExecutor, ExecutorConfig, LogOutput, Phase, WaitOutcome};

pub mod logs;
pub use logs::{DemuxStats, StreamKind, TracingLines, demux};

pub mod metrics;
pub use metrics::{MetricsBackend, NoopMetrics};

mod notifier;
pub use notifier::Notifier;

mod runtime;
pub use runtime::{LogStream, RuntimeClient};

pub mod verifier;
pub use verifier::{Verifier, Whitelist};

pub use tokio_util::sync::CancellationToken;
