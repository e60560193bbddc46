//! One-shot job runner.
//!
//! [`JobRunner::run`] drives a job through its whole life:
//! 1. submit the job;
//! 2. poll its status at a fixed interval until it succeeded, failed, or the [`RunContext`] is done;
//! 3. resolve the job's pod through the selector and snapshot its container states;
//! 4. read the logs of every container declared in the pod spec;
//! 5. delete the job (foreground propagation) on every path once it was created.
mod error;
pub use error::{JobError, JobOutput, RunError};

mod guard;
mod select;

#[cfg(test)]
mod fake;

use std::{sync::Arc, time::Instant};

use kjob_model::JobSpec;
use tracing::{debug, info, instrument, trace};

use crate::{
    cluster::{ClusterClient, ContainerLogs, ContainerStates, JobHandle, JobStatus, PodInfo, TerminalState},
    config::RunnerConfig,
    context::RunContext,
    diagnostic::{Diagnostic, SinkHandle, tracing_sink},
    error::CoreError,
    metrics::{JobOutcome, MetricsHandle, noop_metrics},
};
use guard::CleanupGuard;
use select::select_pod;

/// Run `job` with default configuration, a tracing diagnostic sink and no metrics.
pub async fn run_job(
    ctx: &RunContext,
    client: Arc<dyn ClusterClient>,
    job: &JobSpec,
) -> Result<JobOutput, RunError> {
    JobRunner::new(client).run(ctx, job).await
}

/// Runs one-shot jobs against a [`ClusterClient`].
///
/// A runner is cheap to share: every call to [`JobRunner::run`] is independent and sequential.
pub struct JobRunner {
    client: Arc<dyn ClusterClient>,
    config: RunnerConfig,
    sink: SinkHandle,
    metrics: MetricsHandle,
}

/// Logs and states gathered so far.
#[derive(Default)]
struct Collected {
    logs: Option<ContainerLogs>,
    states: Option<ContainerStates>,
}

impl JobRunner {
    /// Create a runner with default configuration.
    pub fn new(client: Arc<dyn ClusterClient>) -> Self {
        Self {
            client,
            config: RunnerConfig::default(),
            sink: tracing_sink(),
            metrics: noop_metrics(),
        }
    }

    /// Replace the configuration after validating it.
    pub fn with_config(mut self, config: RunnerConfig) -> Result<Self, CoreError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Replace the sink receiving non-fatal diagnostics.
    pub fn with_sink(mut self, sink: SinkHandle) -> Self {
        self.sink = sink;
        self
    }

    /// Replace the metrics backend.
    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Submit `job`, wait for it to finish, capture its pod's logs and states, and delete it.
    ///
    /// On error the returned [`RunError`] carries whatever was collected before the failure.
    /// The job is deleted before this returns whenever it was created.
    #[instrument(level = "debug", skip_all, fields(job = %job.name, namespace = %job.namespace))]
    pub async fn run(&self, ctx: &RunContext, job: &JobSpec) -> Result<JobOutput, RunError> {
        let started = Instant::now();
        let result = self.run_inner(ctx, job).await;

        let outcome = match &result {
            Ok(_) => JobOutcome::Success,
            Err(e) => e.error.outcome(),
        };
        self.metrics
            .record_job_completed(outcome, started.elapsed().as_millis() as u64);
        result
    }

    async fn run_inner(&self, ctx: &RunContext, job: &JobSpec) -> Result<JobOutput, RunError> {
        job.validate().map_err(JobError::from)?;

        if ctx.is_done() {
            debug!("context already done; job not submitted");
            return Err(JobError::Timeout.into());
        }

        let handle = self
            .client
            .create_job(job)
            .await
            .map_err(JobError::Create)?;
        info!(job = %handle, "job created");
        self.metrics.record_job_started();

        let guard = CleanupGuard::new(
            self.client.clone(),
            self.sink.clone(),
            self.metrics.clone(),
            self.config.delete_timeout(),
            handle.clone(),
        );
        let result = self.observe(ctx, &handle).await;
        guard.release().await;
        result
    }

    /// Phases 2-4: everything between creation and cleanup.
    async fn observe(&self, ctx: &RunContext, handle: &JobHandle) -> Result<JobOutput, RunError> {
        let (terminal, status) = self.wait_terminal(ctx, handle).await?;
        info!(job = %handle, state = %terminal, "job reached terminal state");

        let collected = match terminal {
            TerminalState::TimedOut => self.collect_after_timeout(ctx, handle).await,
            _ => self.collect(ctx, handle).await?,
        };

        match terminal {
            TerminalState::Succeeded => Ok(JobOutput {
                logs: collected.logs.unwrap_or_default(),
                states: collected.states.unwrap_or_default(),
            }),
            TerminalState::Failed => Err(RunError {
                error: JobError::JobFailed {
                    failed: status.failed,
                },
                logs: collected.logs,
                states: collected.states,
            }),
            TerminalState::TimedOut => Err(RunError {
                error: JobError::Timeout,
                logs: collected.logs,
                states: collected.states,
            }),
        }
    }

    /// Poll the job status until it is terminal or the context is done.
    async fn wait_terminal(
        &self,
        ctx: &RunContext,
        handle: &JobHandle,
    ) -> Result<(TerminalState, JobStatus), JobError> {
        let interval = self.config.poll_interval();
        loop {
            let status = tokio::select! {
                biased;
                _ = ctx.done() => return Ok((TerminalState::TimedOut, JobStatus::default())),
                res = self.client.job_status(handle) => res.map_err(JobError::StatusFetch)?,
            };
            trace!(
                job = %handle,
                active = status.active,
                succeeded = status.succeeded,
                failed = status.failed,
                "job status polled",
            );

            if let Some(terminal) = status.terminal() {
                return Ok((terminal, status));
            }

            tokio::select! {
                biased;
                _ = ctx.done() => return Ok((TerminalState::TimedOut, status)),
                _ = tokio::time::sleep(interval) => {}
            }
        }
    }

    /// Resolve the pod and capture logs for a job that reached a reported terminal state.
    ///
    /// Cancellation while capturing turns the run into a timeout that keeps the partial results.
    async fn collect(&self, ctx: &RunContext, handle: &JobHandle) -> Result<Collected, RunError> {
        let mut partial = Collected::default();
        let res = tokio::select! {
            biased;
            _ = ctx.done() => Err(JobError::Timeout),
            res = self.capture(handle, &mut partial) => res,
        };

        match res {
            Ok(()) => Ok(partial),
            Err(error) => {
                let logs = match error {
                    JobError::LogStream { .. } | JobError::LogRead { .. } => None,
                    _ => partial.logs,
                };
                Err(RunError {
                    error,
                    logs,
                    states: partial.states,
                })
            }
        }
    }

    /// Best-effort capture for a run whose deadline elapsed, bounded by one poll interval.
    ///
    /// An explicitly cancelled run skips capture altogether.
    async fn collect_after_timeout(&self, ctx: &RunContext, handle: &JobHandle) -> Collected {
        let mut partial = Collected::default();
        let cancel = ctx.cancel_token();
        if cancel.is_cancelled() {
            debug!(job = %handle, "run cancelled; skipping log capture");
            return partial;
        }

        let limit = self.config.poll_interval();
        let capture = tokio::time::timeout(limit, self.capture(handle, &mut partial));
        let reason = tokio::select! {
            biased;
            _ = cancel.cancelled() => Some("run cancelled during capture".to_string()),
            res = capture => match res {
                Ok(Ok(())) => None,
                Ok(Err(e)) => Some(e.to_string()),
                Err(_) => Some(format!("capture did not complete within {limit:?}")),
            },
        };
        if let Some(reason) = reason {
            self.metrics.record_cleanup_error("capture_failed");
            self.sink.report(Diagnostic::CaptureFailed {
                job: handle.name.clone(),
                reason,
            });
        }
        partial
    }

    /// Phases 3-4, filling `partial` as results become available.
    async fn capture(&self, handle: &JobHandle, partial: &mut Collected) -> Result<(), JobError> {
        let pod = self.resolve_pod(handle).await?;
        debug!(job = %handle, pod = %pod.name, containers = pod.containers.len(), "pod resolved");

        partial.states = Some(pod.statuses.clone());
        partial.logs = Some(ContainerLogs::new());

        for container in &pod.containers {
            let output = self.read_container_log(&pod, container).await?;
            trace!(pod = %pod.name, container = %container, bytes = output.len(), "container log captured");
            if let Some(logs) = partial.logs.as_mut() {
                logs.insert(container.clone(), output);
            }
        }
        Ok(())
    }

    async fn resolve_pod(&self, handle: &JobHandle) -> Result<PodInfo, JobError> {
        let pods = self
            .client
            .list_pods(&handle.namespace, &handle.selector)
            .await
            .map_err(JobError::PodList)?;

        let Some((pod, count)) = select_pod(pods, self.config.pod_selection) else {
            return Err(JobError::PodNotFound {
                selector: handle.selector.to_selector(),
            });
        };
        if count > 1 {
            self.sink.report(Diagnostic::AmbiguousPods {
                job: handle.name.clone(),
                count,
                selected: pod.name.clone(),
            });
        }
        Ok(pod)
    }

    /// Open, drain and close one container's log stream.
    async fn read_container_log(&self, pod: &PodInfo, container: &str) -> Result<Vec<u8>, JobError> {
        let mut stream = self
            .client
            .open_log_stream(&pod.namespace, &pod.name, container)
            .await
            .map_err(|source| JobError::LogStream {
                container: container.to_string(),
                source,
            })?;

        let mut output = Vec::new();
        let read = stream.read_to_end(&mut output).await;

        if let Err(e) = stream.close().await {
            self.metrics.record_cleanup_error("stream_close_failed");
            self.sink.report(Diagnostic::StreamCloseFailed {
                pod: pod.name.clone(),
                container: container.to_string(),
                reason: e.to_string(),
            });
        }

        read.map_err(|source| JobError::LogRead {
            container: container.to_string(),
            source,
        })?;
        Ok(output)
    }
}
