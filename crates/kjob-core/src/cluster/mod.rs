//! Cluster capability consumed by the runner.
//!
//! The transport is opaque: adapters (see the `kjob-kube` crate) implement [`ClusterClient`]
//! and translate their own errors into [`ClusterError`]. The runner issues one request at a time.
mod error;
pub use error::ClusterError;

mod types;
pub use types::{
    ContainerLogs, ContainerState, ContainerStates, DeletePropagation, JobHandle, JobStatus,
    PodInfo, TerminalState,
};

use async_trait::async_trait;
use kjob_model::{JobSpec, Labels};

/// Operations the runner needs from the cluster API.
///
/// Implementations must be safe to share between concurrent runs; the runner itself holds no locks.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Submit the job object described by `spec` in `spec.namespace`.
    async fn create_job(&self, spec: &JobSpec) -> Result<JobHandle, ClusterError>;

    /// Fetch the job's current status counters.
    async fn job_status(&self, job: &JobHandle) -> Result<JobStatus, ClusterError>;

    /// Delete the job object.
    ///
    /// Deleting a job that no longer exists should succeed.
    async fn delete_job(
        &self,
        job: &JobHandle,
        propagation: DeletePropagation,
    ) -> Result<(), ClusterError>;

    /// List pods in `namespace` whose labels match `selector`.
    async fn list_pods(
        &self,
        namespace: &str,
        selector: &Labels,
    ) -> Result<Vec<PodInfo>, ClusterError>;

    /// Open the (non-following) log stream of one container.
    async fn open_log_stream(
        &self,
        namespace: &str,
        pod: &str,
        container: &str,
    ) -> Result<Box<dyn LogStream>, ClusterError>;
}

/// Readable log stream of a single container.
///
/// Callers read the stream to completion and then close it. Closing is best-effort.
#[async_trait]
pub trait LogStream: Send {
    /// Read everything until end of stream, appending to `buf`. Returns the number of bytes read.
    async fn read_to_end(&mut self, buf: &mut Vec<u8>) -> Result<usize, ClusterError>;

    /// Release the underlying connection.
    async fn close(self: Box<Self>) -> Result<(), ClusterError>;
}
