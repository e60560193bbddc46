use std::{borrow::Cow, error::Error as StdError, fmt};

use kjob_model::ModelError;
use thiserror::Error;

use crate::{
    cluster::{ClusterError, ContainerLogs, ContainerStates},
    metrics::JobOutcome,
};

/// Why a run did not succeed.
///
/// Every remote failure carries the phase it happened in.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("rejected job spec: {0}")]
    InvalidSpec(#[from] ModelError),

    #[error("failed to create job: {0}")]
    Create(#[source] ClusterError),

    #[error("failed getting job: {0}")]
    StatusFetch(#[source] ClusterError),

    #[error("timeout waiting for the job to finish")]
    Timeout,

    #[error("job failed ({failed} failed pod(s))")]
    JobFailed { failed: u32 },

    #[error("failed to list pods for job: {0}")]
    PodList(#[source] ClusterError),

    #[error("pod for job not found (selector: {selector})")]
    PodNotFound { selector: String },

    #[error("failed to get pod log stream for container {container}: {source}")]
    LogStream {
        container: String,
        #[source]
        source: ClusterError,
    },

    #[error("failed to read pod logs for container {container}: {source}")]
    LogRead {
        container: String,
        #[source]
        source: ClusterError,
    },
}

impl JobError {
    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            JobError::InvalidSpec(_) => "invalid_spec",
            JobError::Create(_) => "create",
            JobError::StatusFetch(_) => "status_fetch",
            JobError::Timeout => "timeout",
            JobError::JobFailed { .. } => "job_failed",
            JobError::PodList(_) => "pod_list",
            JobError::PodNotFound { .. } => "pod_not_found",
            JobError::LogStream { .. } => "log_stream",
            JobError::LogRead { .. } => "log_read",
        }
    }

    /// Metrics outcome for a run that ended with this error.
    pub fn outcome(&self) -> JobOutcome {
        match self {
            JobError::Timeout => JobOutcome::Timeout,
            JobError::JobFailed { .. } => JobOutcome::Failed,
            _ => JobOutcome::Error,
        }
    }
}

/// Results of a successful run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobOutput {
    /// Raw log bytes of every container declared in the pod spec.
    pub logs: ContainerLogs,
    /// Container states snapshotted when the pod was resolved.
    pub states: ContainerStates,
}

impl JobOutput {
    /// Log of one container, decoded lossily as UTF-8.
    pub fn log_text(&self, container: &str) -> Option<Cow<'_, str>> {
        self.logs.get(container).map(|b| String::from_utf8_lossy(b))
    }
}

/// Failed run: the error plus whatever was collected before it.
#[derive(Debug)]
pub struct RunError {
    pub error: JobError,
    /// `None` when log capture never completed.
    pub logs: Option<ContainerLogs>,
    /// `None` when no pod was resolved.
    pub states: Option<ContainerStates>,
}

impl RunError {
    /// Error without partial results.
    pub fn bare(error: JobError) -> Self {
        Self {
            error,
            logs: None,
            states: None,
        }
    }

    pub fn kind(&self) -> &'static str {
        self.error.kind()
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.error, JobError::Timeout)
    }
}

impl From<JobError> for RunError {
    fn from(error: JobError) -> Self {
        Self::bare(error)
    }
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl StdError for RunError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.error.source()
    }
}
