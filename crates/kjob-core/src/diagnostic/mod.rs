//! Operator-facing sink for failures that do not fail a run.
//!
//! The runner never writes to a global logger for these: it reports a [`Diagnostic`] to the
//! injected [`DiagnosticSink`]. [`TracingSink`] forwards to `tracing`; [`MemorySink`] keeps them.
use std::{
    fmt,
    sync::{Arc, Mutex},
};

use tracing::warn;

/// Non-fatal event observed during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Cleanup could not delete the job.
    DeleteFailed {
        job: String,
        namespace: String,
        reason: String,
    },
    /// A container log stream could not be closed.
    StreamCloseFailed {
        pod: String,
        container: String,
        reason: String,
    },
    /// Pod lookup or log capture failed after the run had already timed out.
    CaptureFailed { job: String, reason: String },
    /// The selector matched more than one pod.
    AmbiguousPods {
        job: String,
        count: usize,
        selected: String,
    },
}

impl Diagnostic {
    /// Bounded label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Diagnostic::DeleteFailed { .. } => "delete_failed",
            Diagnostic::StreamCloseFailed { .. } => "stream_close_failed",
            Diagnostic::CaptureFailed { .. } => "capture_failed",
            Diagnostic::AmbiguousPods { .. } => "ambiguous_pods",
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::DeleteFailed {
                job,
                namespace,
                reason,
            } => write!(f, "failed to delete job {namespace}/{job}: {reason}"),
            Diagnostic::StreamCloseFailed {
                pod,
                container,
                reason,
            } => write!(
                f,
                "failed to close pod log stream ({pod}/{container}): {reason}"
            ),
            Diagnostic::CaptureFailed { job, reason } => {
                write!(f, "failed to capture results of timed-out job {job}: {reason}")
            }
            Diagnostic::AmbiguousPods {
                job,
                count,
                selected,
            } => write!(
                f,
                "selector of job {job} matched {count} pods; using {selected}"
            ),
        }
    }
}

/// Receiver of [`Diagnostic`]s.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Sink forwarding every diagnostic as a `tracing` warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        warn!(kind = diagnostic.kind(), "{diagnostic}");
    }
}

/// Sink that keeps every diagnostic in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<Diagnostic>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the diagnostics reported so far.
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for MemorySink {
    fn report(&self, diagnostic: Diagnostic) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.push(diagnostic);
        }
    }
}

/// Shared handle to a diagnostic sink.
pub type SinkHandle = Arc<dyn DiagnosticSink>;

/// Create the default (tracing) sink handle.
#[inline]
pub fn tracing_sink() -> SinkHandle {
    Arc::new(TracingSink)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_keeps_order() {
        let sink = MemorySink::new();
        assert!(sink.is_empty());

        sink.report(Diagnostic::CaptureFailed {
            job: "a".into(),
            reason: "x".into(),
        });
        sink.report(Diagnostic::DeleteFailed {
            job: "a".into(),
            namespace: "ns".into(),
            reason: "forbidden".into(),
        });

        let entries = sink.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].kind(), "delete_failed");
    }

    #[test]
    fn clones_share_entries() {
        let sink = MemorySink::new();
        let handle: SinkHandle = Arc::new(sink.clone());

        handle.report(Diagnostic::AmbiguousPods {
            job: "j".into(),
            count: 2,
            selected: "p-1".into(),
        });
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn display_carries_context() {
        let d = Diagnostic::DeleteFailed {
            job: "migrate".into(),
            namespace: "tools".into(),
            reason: "forbidden".into(),
        };
        assert_eq!(d.to_string(), "failed to delete job tools/migrate: forbidden");

        let d = Diagnostic::StreamCloseFailed {
            pod: "migrate-abc".into(),
            container: "worker".into(),
            reason: "reset".into(),
        };
        assert!(d.to_string().starts_with("failed to close pod log stream"));
    }

    #[test]
    fn tracing_sink_does_not_panic_without_subscriber() {
        TracingSink.report(Diagnostic::CaptureFailed {
            job: "j".into(),
            reason: "r".into(),
        });
    }
}
