//! Core of kjob: run a one-shot job in a cluster and collect its results.
//!
//! The cluster is reached through the [`ClusterClient`] trait; see the `kjob-kube` crate for the
//! Kubernetes implementation.
pub mod cluster;
pub mod config;
pub mod context;
pub mod diagnostic;
pub mod error;
pub mod metrics;
pub mod runner;

pub use cluster::{
    ClusterClient, ClusterError, ContainerLogs, ContainerState, ContainerStates,
    DeletePropagation, JobHandle, JobStatus, LogStream, PodInfo, TerminalState,
};
pub use config::{PodSelection, RunnerConfig};
pub use context::RunContext;
pub use diagnostic::{Diagnostic, DiagnosticSink, MemorySink, SinkHandle, TracingSink};
pub use error::CoreError;
pub use metrics::{JobOutcome, MetricsBackend, MetricsHandle, NoOpMetrics, noop_metrics};
pub use runner::{JobError, JobOutput, JobRunner, RunError, run_job};
