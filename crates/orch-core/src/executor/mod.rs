mod config;
pub use config::{ExecutorConfig, LogOutput};

mod phase;
pub use phase::{Phase, WaitOutcome};

use std::{sync::Arc, time::Instant};

use orch_model::{ContainerHandle, ServiceExecutionInfo, WaitCondition};
use orch_translate::Translator;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    error::{ExecuteError, LogError},
    logs::{DemuxStats, StreamKind, TracingLines, demux},
    metrics::{MetricsBackend, NoopMetrics},
    notifier::Notifier,
    runtime::{LogStream, RuntimeClient},
    verifier::Verifier,
};

/// Runs service requests in containers.
///
/// Cheap to clone; clones share the injected collaborators.
#[derive(Clone)]
pub struct ContainerExecutor {
    verifier: Arc<dyn Verifier>,
    runtime: Arc<dyn RuntimeClient>,
    notifier: Arc<dyn Notifier>,
    metrics: Arc<dyn MetricsBackend>,
    translator: Translator,
    cfg: ExecutorConfig,
}

impl ContainerExecutor {
    pub fn new(
        verifier: Arc<dyn Verifier>,
        runtime: Arc<dyn RuntimeClient>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            verifier,
            runtime,
            notifier,
            metrics: Arc::new(NoopMetrics),
            translator: Translator::default(),
            cfg: ExecutorConfig::default(),
        }
    }

    pub fn with_config(mut self, cfg: ExecutorConfig) -> Self {
        self.translator = Translator::new(cfg.translator.clone());
        self.cfg = cfg;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsBackend>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.cfg
    }

    /// Run `info` to completion.
    ///
    /// Errors are returned only up to and including the start phase.
    /// Every later failure is logged and reflected in the notified status.
    pub async fn execute(&self, info: &ServiceExecutionInfo) -> Result<(), ExecuteError> {
        self.execute_with_cancel(info, CancellationToken::new()).await
    }

    /// Like [`execute`](Self::execute); cancelling `cancel` while the container runs ends the wait
    /// with [`Aborted`](orch_model::ExecutionStatus::Aborted).
    #[instrument(
        level = "info",
        skip(self, info, cancel),
        fields(
            service_id = %info.service_id,
            service = %info.service_name,
            exec_id = %uuid::Uuid::new_v4(),
        )
    )]
    pub async fn execute_with_cancel(
        &self,
        info: &ServiceExecutionInfo,
        cancel: CancellationToken,
    ) -> Result<(), ExecuteError> {
        let started = Instant::now();
        info!(
            runtime = self.runtime.name(),
            params = ?info.parameters,
            len = info.parameters.len(),
            "execute"
        );

        let image = info
            .image_reference()
            .ok_or_else(|| ExecuteError::InvalidRequest("parameter list is empty".into()))?;

        if let Err(e) = self.verifier.is_whitelisted(image).await {
            warn!(phase = %Phase::Verifying, image, error = %e, "image refused");
            self.metrics.record_rejected();
            return Err(e.into());
        }

        if let Err(e) = self.runtime.pull_image(image).await {
            warn!(phase = %Phase::Pulling, image, error = %e, "pull failed; continuing");
            self.metrics.record_phase_failure(Phase::Pulling);
        }

        let translation = self
            .translator
            .translate_parts(info.leading_parameters(), image);
        if !translation.is_complete() {
            self.metrics.record_phase_failure(Phase::Translating);
        }
        let bundle = translation.into_bundle();

        let handle = match self.runtime.create_container(&bundle).await {
            Ok(handle) => {
                info!(container = handle.short(), "create container");
                handle
            }
            Err(e) => {
                // Start still runs against the zero handle and reports the failure there.
                warn!(phase = %Phase::Creating, error = %e, "create failed; continuing");
                self.metrics.record_phase_failure(Phase::Creating);
                ContainerHandle::default()
            }
        };

        if let Err(e) = self.runtime.start_container(&handle).await {
            error!(
                phase = %Phase::Starting,
                container = handle.short(),
                error = %e,
                "start failed"
            );
            self.metrics.record_phase_failure(Phase::Starting);
            return Err(ExecuteError::StartFailed(e));
        }

        let outcome = self.await_completion(&handle, &cancel).await;
        let status = outcome.status();

        self.collect_logs(&handle).await;

        self.notifier
            .notify(&info.notification_target_url, info.service_id, status)
            .await;
        debug!(
            phase = %Phase::Notifying,
            url = %info.notification_target_url,
            %status,
            "notification sent"
        );

        if let Err(e) = self.runtime.remove_container(&handle).await {
            warn!(
                phase = %Phase::Reclaiming,
                container = handle.short(),
                error = %e,
                "remove failed"
            );
            self.metrics.record_phase_failure(Phase::Reclaiming);
        }

        let elapsed = started.elapsed();
        self.metrics.record_execution(status, elapsed);
        let elapsed_ms = elapsed.as_millis() as u64;
        if status.is_success() {
            info!(%status, elapsed_ms, "execution done");
        } else {
            warn!(%status, elapsed_ms, "execution done");
        }
        Ok(())
    }

    async fn await_completion(
        &self,
        handle: &ContainerHandle,
        cancel: &CancellationToken,
    ) -> WaitOutcome {
        let limit = self.cfg.wait_timeout();
        let deadline = async {
            match limit {
                Some(d) => tokio::time::sleep(d).await,
                None => std::future::pending::<()>().await,
            }
        };

        let outcome = tokio::select! {
            res = self.runtime.wait_container(handle, WaitCondition::NotRunning) => match res {
                Ok(code) => WaitOutcome::Exited(code),
                Err(e) => WaitOutcome::Error(e),
            },
            _ = deadline => WaitOutcome::TimedOut(limit.unwrap_or_default()),
            _ = cancel.cancelled() => WaitOutcome::Cancelled,
        };

        match &outcome {
            WaitOutcome::Exited(code) => {
                info!(container = handle.short(), code, "container execution status")
            }
            WaitOutcome::Error(e) => {
                warn!(
                    phase = %Phase::Awaiting,
                    container = handle.short(),
                    error = %e,
                    "wait failed"
                );
                self.metrics.record_phase_failure(Phase::Awaiting);
            }
            WaitOutcome::TimedOut(d) => {
                warn!(
                    phase = %Phase::Awaiting,
                    container = handle.short(),
                    timeout_ms = d.as_millis() as u64,
                    "wait timed out"
                );
                self.metrics.record_phase_failure(Phase::Awaiting);
            }
            WaitOutcome::Cancelled => {
                info!(container = handle.short(), "execution cancelled")
            }
        }
        outcome
    }

    async fn collect_logs(&self, handle: &ContainerHandle) {
        let mut stream = match self.runtime.fetch_logs(handle).await {
            Ok(stream) => stream,
            Err(e) => {
                warn!(
                    phase = %Phase::Collecting,
                    container = handle.short(),
                    error = %e,
                    "log fetch failed"
                );
                self.metrics.record_phase_failure(Phase::Collecting);
                return;
            }
        };

        match self.drain(&mut stream).await {
            Ok(stats) => debug!(
                container = handle.short(),
                frames = stats.frames,
                stdout_bytes = stats.stdout_bytes,
                stderr_bytes = stats.stderr_bytes,
                "logs collected"
            ),
            Err(e) => {
                warn!(
                    phase = %Phase::Collecting,
                    container = handle.short(),
                    error = %e,
                    "log stream error"
                );
                self.metrics.record_phase_failure(Phase::Collecting);
            }
        }
    }

    async fn drain(&self, stream: &mut LogStream) -> Result<DemuxStats, LogError> {
        match self.cfg.log_output {
            LogOutput::Inherit => {
                demux(stream, &mut tokio::io::stdout(), &mut tokio::io::stderr()).await
            }
            LogOutput::Tracing => {
                let mut out = TracingLines::new(StreamKind::Stdout);
                let mut err = TracingLines::new(StreamKind::Stderr);
                demux(stream, &mut out, &mut err).await
            }
            LogOutput::Discard => {
                demux(stream, &mut tokio::io::sink(), &mut tokio::io::sink()).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io::Cursor,
        sync::{
            Arc, Mutex,
            atomic::{AtomicU64, Ordering},
        },
        time::Duration,
    };

    use async_trait::async_trait;
    use orch_model::{
        ConfigBundle, ContainerHandle, ExecutionStatus, ServiceExecutionInfo, ServiceId,
        WaitCondition,
    };

    use super::*;
    use crate::{
        error::{RuntimeError, VerifyError},
        logs::encode_frame,
        verifier::Whitelist,
    };

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Pull(String),
        Create(ConfigBundle),
        Start(ContainerHandle),
        Wait(ContainerHandle),
        Logs(ContainerHandle),
        Remove(ContainerHandle),
    }

    #[derive(Debug, Clone, Copy)]
    enum WaitMode {
        Exit(i64),
        Error,
        Never,
    }

    struct FakeRuntime {
        calls: Mutex<Vec<Call>>,
        next_id: AtomicU64,
        wait: WaitMode,
        logs: Vec<u8>,
        fail_pull: bool,
        fail_create: bool,
        fail_start: bool,
        fail_logs: bool,
        fail_remove: bool,
    }

    impl FakeRuntime {
        fn exiting(code: i64) -> Self {
            let mut logs = Vec::new();
            encode_frame(StreamKind::Stdout, b"booting\n", &mut logs);
            encode_frame(StreamKind::Stderr, b"warming up\n", &mut logs);
            Self {
                calls: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
                wait: WaitMode::Exit(code),
                logs,
                fail_pull: false,
                fail_create: false,
                fail_start: false,
                fail_logs: false,
                fail_remove: false,
            }
        }

        fn waiting(mode: WaitMode) -> Self {
            Self {
                wait: mode,
                ..Self::exiting(0)
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }

        fn removed(&self) -> Vec<ContainerHandle> {
            self.calls()
                .into_iter()
                .filter_map(|c| match c {
                    Call::Remove(h) => Some(h),
                    _ => None,
                })
                .collect()
        }

        fn created(&self) -> Vec<ConfigBundle> {
            self.calls()
                .into_iter()
                .filter_map(|c| match c {
                    Call::Create(b) => Some(b),
                    _ => None,
                })
                .collect()
        }
    }

    #[async_trait]
    impl RuntimeClient for FakeRuntime {
        fn name(&self) -> &'static str {
            "fake"
        }

        async fn pull_image(&self, reference: &str) -> Result<(), RuntimeError> {
            self.record(Call::Pull(reference.to_string()));
            if self.fail_pull {
                return Err(RuntimeError::Pull("registry unreachable".into()));
            }
            Ok(())
        }

        async fn create_container(
            &self,
            bundle: &ConfigBundle,
        ) -> Result<ContainerHandle, RuntimeError> {
            self.record(Call::Create(bundle.clone()));
            if self.fail_create {
                return Err(RuntimeError::Create("conflict".into()));
            }
            let n = self.next_id.fetch_add(1, Ordering::SeqCst);
            Ok(ContainerHandle::new(format!("{n:016x}{n:016x}")))
        }

        async fn start_container(&self, handle: &ContainerHandle) -> Result<(), RuntimeError> {
            self.record(Call::Start(handle.clone()));
            if handle.is_empty() {
                return Err(RuntimeError::NotFound(String::new()));
            }
            if self.fail_start {
                return Err(RuntimeError::Start("oci runtime error".into()));
            }
            Ok(())
        }

        async fn wait_container(
            &self,
            handle: &ContainerHandle,
            condition: WaitCondition,
        ) -> Result<i64, RuntimeError> {
            assert_eq!(condition, WaitCondition::NotRunning);
            self.record(Call::Wait(handle.clone()));
            match self.wait {
                WaitMode::Exit(code) => Ok(code),
                WaitMode::Error => Err(RuntimeError::Wait("daemon went away".into())),
                WaitMode::Never => std::future::pending().await,
            }
        }

        async fn fetch_logs(&self, handle: &ContainerHandle) -> Result<LogStream, RuntimeError> {
            self.record(Call::Logs(handle.clone()));
            if self.fail_logs {
                return Err(RuntimeError::Logs("log driver none".into()));
            }
            Ok(Box::new(Cursor::new(self.logs.clone())))
        }

        async fn remove_container(&self, handle: &ContainerHandle) -> Result<(), RuntimeError> {
            self.record(Call::Remove(handle.clone()));
            if self.fail_remove {
                return Err(RuntimeError::Remove("device busy".into()));
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<(String, ServiceId, ExecutionStatus)>>,
    }

    impl RecordingNotifier {
        fn sent(&self) -> Vec<(String, ServiceId, ExecutionStatus)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, target_url: &str, service_id: ServiceId, status: ExecutionStatus) {
            self.sent
                .lock()
                .unwrap()
                .push((target_url.to_string(), service_id, status));
        }
    }

    struct UnavailableVerifier;

    #[async_trait]
    impl Verifier for UnavailableVerifier {
        async fn is_whitelisted(&self, _image: &str) -> Result<(), VerifyError> {
            Err(VerifyError::Unavailable("policy store offline".into()))
        }
    }

    #[derive(Default)]
    struct RecordingMetrics {
        rejected: AtomicU64,
        failures: Mutex<Vec<Phase>>,
        executions: Mutex<Vec<ExecutionStatus>>,
    }

    impl MetricsBackend for RecordingMetrics {
        fn record_rejected(&self) {
            self.rejected.fetch_add(1, Ordering::SeqCst);
        }

        fn record_phase_failure(&self, phase: Phase) {
            self.failures.lock().unwrap().push(phase);
        }

        fn record_execution(&self, status: ExecutionStatus, _duration: Duration) {
            self.executions.lock().unwrap().push(status);
        }
    }

    const URL: &str = "http://controller.local/status";

    fn request(id: u64, params: &[&str]) -> ServiceExecutionInfo {
        ServiceExecutionInfo::new(id, format!("svc-{id}"), params.iter().copied(), URL)
    }

    struct Harness {
        exec: ContainerExecutor,
        runtime: Arc<FakeRuntime>,
        notifier: Arc<RecordingNotifier>,
        metrics: Arc<RecordingMetrics>,
    }

    fn harness(runtime: FakeRuntime) -> Harness {
        harness_with(runtime, ExecutorConfig::default().with_log_output(LogOutput::Discard))
    }

    fn harness_with(runtime: FakeRuntime, cfg: ExecutorConfig) -> Harness {
        let runtime = Arc::new(runtime);
        let notifier = Arc::new(RecordingNotifier::default());
        let metrics = Arc::new(RecordingMetrics::default());
        let verifier = Arc::new(Whitelist::new(["myimage", "alpine:3.19"]));

        let exec = ContainerExecutor::new(verifier, runtime.clone(), notifier.clone())
            .with_config(cfg)
            .with_metrics(metrics.clone());

        Harness {
            exec,
            runtime,
            notifier,
            metrics,
        }
    }

    #[tokio::test]
    async fn successful_execution_runs_every_phase_in_order() {
        let h = harness(FakeRuntime::exiting(0));
        let info = request(7, &["run", "-e", "FOO=bar", "myimage:latest"]);

        h.exec.execute(&info).await.unwrap();

        let calls = h.runtime.calls();
        assert_eq!(calls.len(), 6);
        assert_eq!(calls[0], Call::Pull("myimage:latest".into()));

        let Call::Create(bundle) = &calls[1] else {
            panic!("expected create, got {:?}", calls[1]);
        };
        assert_eq!(bundle.container.image, "myimage:latest");
        assert_eq!(bundle.container.env.get("FOO"), Some("bar"));

        let handle = ContainerHandle::new(format!("{:016x}{:016x}", 1, 1));
        assert_eq!(
            &calls[2..],
            &[
                Call::Start(handle.clone()),
                Call::Wait(handle.clone()),
                Call::Logs(handle.clone()),
                Call::Remove(handle),
            ]
        );

        assert_eq!(
            h.notifier.sent(),
            vec![(URL.to_string(), ServiceId(7), ExecutionStatus::Finished)]
        );
        assert_eq!(*h.metrics.executions.lock().unwrap(), vec![ExecutionStatus::Finished]);
        assert!(h.metrics.failures.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejected_image_touches_nothing() {
        let h = harness(FakeRuntime::exiting(0));
        let info = request(1, &["run", "evil:latest"]);

        let err = h.exec.execute(&info).await.unwrap_err();

        assert!(matches!(
            err,
            ExecuteError::NotWhitelisted(VerifyError::NotWhitelisted(ref image))
                if image == "evil:latest"
        ));
        assert!(h.runtime.calls().is_empty());
        assert!(h.notifier.sent().is_empty());
        assert_eq!(h.metrics.rejected.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unavailable_verifier_is_a_refusal() {
        let runtime = Arc::new(FakeRuntime::exiting(0));
        let notifier = Arc::new(RecordingNotifier::default());
        let exec = ContainerExecutor::new(
            Arc::new(UnavailableVerifier),
            runtime.clone(),
            notifier.clone(),
        );

        let err = exec.execute(&request(1, &["alpine:3.19"])).await.unwrap_err();

        assert!(matches!(err, ExecuteError::NotWhitelisted(VerifyError::Unavailable(_))));
        assert!(runtime.calls().is_empty());
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn empty_parameters_are_an_invalid_request() {
        let h = harness(FakeRuntime::exiting(0));
        let info = ServiceExecutionInfo::new(3u64, "empty", Vec::<String>::new(), URL);

        let err = h.exec.execute(&info).await.unwrap_err();

        assert!(matches!(err, ExecuteError::InvalidRequest(_)));
        assert!(h.runtime.calls().is_empty());
        assert!(h.notifier.sent().is_empty());
        assert_eq!(h.metrics.rejected.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn non_zero_exit_is_reported_as_failed() {
        let h = harness(FakeRuntime::exiting(1));
        let info = request(2, &["docker", "run", "--rm", "alpine:3.19"]);

        h.exec.execute(&info).await.unwrap();

        assert_eq!(
            h.notifier.sent(),
            vec![(URL.to_string(), ServiceId(2), ExecutionStatus::Failed)]
        );
        assert_eq!(h.runtime.removed().len(), 1);
    }

    #[tokio::test]
    async fn pull_failure_is_recoverable() {
        let h = harness(FakeRuntime {
            fail_pull: true,
            ..FakeRuntime::exiting(0)
        });

        h.exec.execute(&request(4, &["run", "myimage:1"])).await.unwrap();

        assert_eq!(h.runtime.created().len(), 1);
        assert_eq!(h.notifier.sent()[0].2, ExecutionStatus::Finished);
        assert_eq!(*h.metrics.failures.lock().unwrap(), vec![Phase::Pulling]);
    }

    #[tokio::test]
    async fn create_failure_starts_the_empty_handle() {
        let h = harness(FakeRuntime {
            fail_create: true,
            ..FakeRuntime::exiting(0)
        });

        let err = h.exec.execute(&request(5, &["run", "myimage:1"])).await.unwrap_err();

        assert!(matches!(err, ExecuteError::StartFailed(RuntimeError::NotFound(_))));
        assert_eq!(h.runtime.calls().last(), Some(&Call::Start(ContainerHandle::default())));
        assert!(h.notifier.sent().is_empty());
        assert!(h.runtime.removed().is_empty());
        assert_eq!(
            *h.metrics.failures.lock().unwrap(),
            vec![Phase::Creating, Phase::Starting]
        );
    }

    // Current behaviour: the container that failed to start is neither reported nor reclaimed.
    #[tokio::test]
    async fn start_failure_skips_notify_and_remove() {
        let h = harness(FakeRuntime {
            fail_start: true,
            ..FakeRuntime::exiting(0)
        });

        let err = h.exec.execute(&request(6, &["run", "myimage:1"])).await.unwrap_err();

        assert!(matches!(err, ExecuteError::StartFailed(RuntimeError::Start(_))));
        assert!(h.notifier.sent().is_empty());
        assert!(h.runtime.removed().is_empty());
        assert!(h.metrics.executions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn wait_error_is_reported_as_failed() {
        let h = harness(FakeRuntime::waiting(WaitMode::Error));

        h.exec.execute(&request(8, &["run", "myimage:1"])).await.unwrap();

        assert_eq!(h.notifier.sent()[0].2, ExecutionStatus::Failed);
        assert_eq!(h.runtime.removed().len(), 1);
        assert_eq!(*h.metrics.failures.lock().unwrap(), vec![Phase::Awaiting]);
    }

    #[tokio::test(start_paused = true)]
    async fn wait_timeout_is_reported_as_failed() {
        let h = harness_with(
            FakeRuntime::waiting(WaitMode::Never),
            ExecutorConfig::default()
                .with_wait_timeout(Duration::from_secs(30))
                .with_log_output(LogOutput::Discard),
        );

        h.exec.execute(&request(9, &["run", "myimage:1"])).await.unwrap();

        assert_eq!(
            h.notifier.sent(),
            vec![(URL.to_string(), ServiceId(9), ExecutionStatus::Failed)]
        );
        assert_eq!(h.runtime.removed().len(), 1);
        assert!(h.runtime.calls().iter().any(|c| matches!(c, Call::Logs(_))));
    }

    #[tokio::test]
    async fn cancellation_is_reported_as_aborted() {
        let h = harness(FakeRuntime::waiting(WaitMode::Never));
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        h.exec
            .execute_with_cancel(&request(10, &["run", "myimage:1"]), cancel)
            .await
            .unwrap();

        assert_eq!(
            h.notifier.sent(),
            vec![(URL.to_string(), ServiceId(10), ExecutionStatus::Aborted)]
        );
        assert_eq!(h.runtime.removed().len(), 1);
        assert!(h.metrics.failures.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn log_fetch_failure_still_notifies() {
        let h = harness(FakeRuntime {
            fail_logs: true,
            ..FakeRuntime::exiting(0)
        });

        h.exec.execute(&request(11, &["run", "myimage:1"])).await.unwrap();

        assert_eq!(h.notifier.sent()[0].2, ExecutionStatus::Finished);
        assert_eq!(h.runtime.removed().len(), 1);
        assert_eq!(*h.metrics.failures.lock().unwrap(), vec![Phase::Collecting]);
    }

    #[tokio::test]
    async fn corrupt_log_stream_still_notifies() {
        let mut logs = Vec::new();
        encode_frame(StreamKind::Stdout, b"ok\n", &mut logs);
        encode_frame(StreamKind::System, b"log driver failed", &mut logs);
        let h = harness(FakeRuntime {
            logs,
            ..FakeRuntime::exiting(0)
        });

        h.exec.execute(&request(12, &["run", "myimage:1"])).await.unwrap();

        assert_eq!(h.notifier.sent().len(), 1);
        assert_eq!(*h.metrics.failures.lock().unwrap(), vec![Phase::Collecting]);
    }

    #[tokio::test]
    async fn remove_failure_does_not_fail_the_execution() {
        let h = harness(FakeRuntime {
            fail_remove: true,
            ..FakeRuntime::exiting(0)
        });

        let res = h.exec.execute(&request(13, &["run", "myimage:1"])).await;

        assert!(res.is_ok());
        assert_eq!(h.notifier.sent().len(), 1);
        assert_eq!(*h.metrics.failures.lock().unwrap(), vec![Phase::Reclaiming]);
    }

    #[tokio::test]
    async fn image_is_the_last_parameter() {
        let h = harness(FakeRuntime::exiting(0));

        h.exec
            .execute(&request(14, &["run", "--name", "alpine:3.19", "-e", "X=1", "myimage:2"]))
            .await
            .unwrap();

        assert_eq!(h.runtime.calls()[0], Call::Pull("myimage:2".into()));
        let created = h.runtime.created();
        assert_eq!(created[0].container.image, "myimage:2");
        assert_eq!(created[0].container.name.as_deref(), Some("alpine:3.19"));
    }

    #[tokio::test]
    async fn bad_flags_on_one_axis_keep_the_others() {
        let h = harness(FakeRuntime::exiting(0));

        h.exec
            .execute(&request(
                15,
                &["run", "-e", "FOO=bar", "-p", "8080:80", "--ip", "nope", "myimage:1"],
            ))
            .await
            .unwrap();

        let bundle = &h.runtime.created()[0];
        assert_eq!(bundle.container.env.get("FOO"), Some("bar"));
        assert_eq!(bundle.host.port_bindings.len(), 1);
        assert!(bundle.network.is_empty());
        assert_eq!(h.notifier.sent()[0].2, ExecutionStatus::Finished);
        assert_eq!(*h.metrics.failures.lock().unwrap(), vec![Phase::Translating]);
    }

    #[tokio::test]
    async fn tracing_log_output_drains_the_stream() {
        let h = harness_with(
            FakeRuntime::exiting(0),
            ExecutorConfig::default().with_log_output(LogOutput::Tracing),
        );
        assert_eq!(h.exec.config().log_output, LogOutput::Tracing);

        h.exec.execute(&request(16, &["run", "myimage:1"])).await.unwrap();

        assert_eq!(h.notifier.sent().len(), 1);
        assert!(h.metrics.failures.lock().unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_executions_are_independent() {
        let h = harness(FakeRuntime::exiting(0));

        let mut tasks = Vec::new();
        for id in 100..116u64 {
            let exec = h.exec.clone();
            tasks.push(tokio::spawn(async move {
                let info = request(id, &["run", "-e", &format!("ID={id}"), "myimage:latest"]);
                exec.execute(&info).await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let mut ids: Vec<u64> = h.notifier.sent().iter().map(|(_, id, _)| id.get()).collect();
        ids.sort_unstable();
        assert_eq!(ids, (100..116).collect::<Vec<_>>());

        let mut removed = h.runtime.removed();
        removed.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        removed.dedup();
        assert_eq!(removed.len(), 16);
        assert_eq!(h.metrics.executions.lock().unwrap().len(), 16);
    }
}
