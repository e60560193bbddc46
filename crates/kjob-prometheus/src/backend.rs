use std::sync::Arc;

use prometheus::{
    Counter, CounterVec, Encoder, Histogram, HistogramOpts, Opts, Registry, TextEncoder,
    proto::MetricFamily,
};

use kjob_core::{JobOutcome, MetricsBackend};

const NAMESPACE: &str = "kjob";

/// Prometheus metrics backend.
///
/// ## Label cardinality
/// - `outcome`: "success", "failed", "timeout", "error"
/// - `error_kind`: "delete_failed", "stream_close_failed", "capture_failed"
#[derive(Clone)]
pub struct PrometheusMetrics {
    jobs_started: Counter,
    jobs_completed: CounterVec,
    job_duration: Histogram,
    cleanup_errors: CounterVec,
    registry: Arc<Registry>,
}

impl PrometheusMetrics {
    /// Create the metrics and register them in `registry`.
    pub fn new_with_registry(registry: Arc<Registry>) -> Result<Self, prometheus::Error> {
        let jobs_started = Counter::with_opts(
            Opts::new("jobs_started_total", "Jobs accepted by the cluster").namespace(NAMESPACE),
        )?;
        registry.register(Box::new(jobs_started.clone()))?;

        let jobs_completed = CounterVec::new(
            Opts::new("jobs_completed_total", "Finished runs by outcome").namespace(NAMESPACE),
            &["outcome"],
        )?;
        registry.register(Box::new(jobs_completed.clone()))?;

        let job_duration = Histogram::with_opts(
            HistogramOpts::new(
                "job_duration_seconds",
                "Wall-clock duration of a run, submission to cleanup",
            )
            .namespace(NAMESPACE)
            .buckets(vec![1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0, 1800.0, 3600.0]),
        )?;
        registry.register(Box::new(job_duration.clone()))?;

        let cleanup_errors = CounterVec::new(
            Opts::new(
                "cleanup_errors_total",
                "Best-effort failures that did not fail the run",
            )
            .namespace(NAMESPACE),
            &["error_kind"],
        )?;
        registry.register(Box::new(cleanup_errors.clone()))?;

        Ok(Self {
            jobs_started,
            jobs_completed,
            job_duration,
            cleanup_errors,
            registry,
        })
    }

    /// Create the metrics in a fresh registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::new_with_registry(Arc::new(Registry::new()))
    }

    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Render every registered metric in the text exposition format.
    pub fn encode_text(&self) -> Result<String, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}

impl MetricsBackend for PrometheusMetrics {
    fn record_job_started(&self) {
        self.jobs_started.inc();
    }

    fn record_job_completed(&self, outcome: JobOutcome, duration_ms: u64) {
        self.jobs_completed
            .with_label_values(&[outcome.as_label()])
            .inc();
        self.job_duration.observe(duration_ms as f64 / 1000.0);
    }

    fn record_cleanup_error(&self, error_kind: &str) {
        self.cleanup_errors.with_label_values(&[error_kind]).inc();
    }
}
