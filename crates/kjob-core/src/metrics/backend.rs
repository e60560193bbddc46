use std::sync::Arc;

/// How a run ended, for metrics classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    /// Job reported a succeeded pod.
    Success,
    /// Job reported a failed pod.
    Failed,
    /// Run context was cancelled or its deadline elapsed.
    Timeout,
    /// The run aborted on an API or log error before an outcome was known.
    Error,
}

impl JobOutcome {
    /// Return label value for metrics.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            JobOutcome::Success => "success",
            JobOutcome::Failed => "failed",
            JobOutcome::Timeout => "timeout",
            JobOutcome::Error => "error",
        }
    }
}

/// Backend metrics collection interface.
pub trait MetricsBackend: Send + Sync + 'static {
    /// Record a job accepted by the cluster.
    fn record_job_started(&self);
    /// Record the end of a run with its outcome and wall-clock duration.
    ///
    /// Called once per run, after cleanup.
    fn record_job_completed(&self, outcome: JobOutcome, duration_ms: u64);
    /// Record a best-effort failure that did not fail the run.
    ///
    /// `error_kind` is a bounded label such as `"delete_failed"` or `"stream_close_failed"`.
    fn record_cleanup_error(&self, error_kind: &str);
}

/// Shared handle to metrics backend.
pub type MetricsHandle = Arc<dyn MetricsBackend>;
