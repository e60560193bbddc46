use crate::metrics::backend::{JobOutcome, MetricsBackend};

/// Metrics backend that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMetrics;

impl MetricsBackend for NoOpMetrics {
    #[inline(always)]
    fn record_job_started(&self) {}

    #[inline(always)]
    fn record_job_completed(&self, _: JobOutcome, _: u64) {}

    #[inline(always)]
    fn record_cleanup_error(&self, _: &str) {}
}
