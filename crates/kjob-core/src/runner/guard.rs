use std::{sync::Arc, time::Duration};

use tracing::{debug, trace};

use crate::{
    cluster::{ClusterClient, DeletePropagation, JobHandle},
    diagnostic::{Diagnostic, SinkHandle},
    metrics::MetricsHandle,
};

/// Owns the created job until it has been deleted.
///
/// [`CleanupGuard::release`] deletes it on the normal path. If the guard is dropped while still
/// armed (the run future was dropped mid-flight), deletion is spawned on the current runtime.
pub(crate) struct CleanupGuard {
    client: Arc<dyn ClusterClient>,
    sink: SinkHandle,
    metrics: MetricsHandle,
    timeout: Duration,
    job: JobHandle,
    armed: bool,
}

impl CleanupGuard {
    pub(crate) fn new(
        client: Arc<dyn ClusterClient>,
        sink: SinkHandle,
        metrics: MetricsHandle,
        timeout: Duration,
        job: JobHandle,
    ) -> Self {
        Self {
            client,
            sink,
            metrics,
            timeout,
            job,
            armed: true,
        }
    }

    /// Delete the job now. Failures are reported, never returned.
    ///
    /// The guard stays armed until the request finished, so dropping this future mid-request
    /// still schedules a deletion.
    pub(crate) async fn release(mut self) {
        delete_job(
            self.client.clone(),
            self.sink.clone(),
            self.metrics.clone(),
            self.timeout,
            self.job.clone(),
        )
        .await;
        self.armed = false;
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.armed = false;

        let client = self.client.clone();
        let sink = self.sink.clone();
        let metrics = self.metrics.clone();
        let job = self.job.clone();
        let timeout = self.timeout;

        match tokio::runtime::Handle::try_current() {
            Ok(rt) => {
                debug!(job = %job, "run dropped before cleanup; deleting job in background");
                rt.spawn(delete_job(client, sink, metrics, timeout, job));
            }
            Err(_) => {
                metrics.record_cleanup_error("delete_failed");
                sink.report(Diagnostic::DeleteFailed {
                    job: job.name,
                    namespace: job.namespace,
                    reason: "no async runtime available to run cleanup".into(),
                });
            }
        }
    }
}

async fn delete_job(
    client: Arc<dyn ClusterClient>,
    sink: SinkHandle,
    metrics: MetricsHandle,
    timeout: Duration,
    job: JobHandle,
) {
    trace!(job = %job, "deleting job with foreground propagation");

    let reason = match tokio::time::timeout(
        timeout,
        client.delete_job(&job, DeletePropagation::Foreground),
    )
    .await
    {
        Ok(Ok(())) => {
            debug!(job = %job, "job deleted");
            return;
        }
        Ok(Err(e)) => e.to_string(),
        Err(_) => format!("delete did not complete within {timeout:?}"),
    };

    metrics.record_cleanup_error("delete_failed");
    sink.report(Diagnostic::DeleteFailed {
        job: job.name,
        namespace: job.namespace,
        reason,
    });
}
