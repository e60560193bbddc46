//! Kubernetes implementation of [`kjob_core::ClusterClient`].
//!
//! Jobs are submitted as `batch/v1 Job` objects built by [`build_job`]; pods are read through the
//! core `v1` API.
mod error;
pub use error::KubeError;

mod build;
pub use build::build_job;

mod convert;
pub use convert::{container_state, job_status, pod_info};

mod stream;

mod client;
pub use client::KubeClusterClient;
