//! Prometheus backend for kjob run metrics.
//!
//! [`PrometheusMetrics`] implements [`kjob_core::MetricsBackend`]; inject it with
//! [`kjob_core::JobRunner::with_metrics`].
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use kjob_core::{JobOutcome, MetricsBackend};
//! use kjob_prometheus::PrometheusMetrics;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let metrics = PrometheusMetrics::new()?;
//! let handle: kjob_core::MetricsHandle = Arc::new(metrics.clone());
//!
//! handle.record_job_started();
//! handle.record_job_completed(JobOutcome::Success, 1_250);
//!
//! let text = metrics.encode_text()?;
//! assert!(text.contains("kjob_jobs_completed_total{outcome=\"success\"} 1"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Metrics
//! - `kjob_jobs_started_total` - Counter
//! - `kjob_jobs_completed_total{outcome}` - Counter
//! - `kjob_job_duration_seconds` - Histogram
//! - `kjob_cleanup_errors_total{error_kind}` - Counter
//!
//! No HTTP endpoint is provided; a one-shot process writes [`PrometheusMetrics::encode_text`]
//! wherever its scraper or textfile collector expects it.
mod backend;
pub use backend::PrometheusMetrics;

pub use prometheus::{Encoder, Registry, TextEncoder};
