use std::{collections::BTreeMap, fmt};

use kjob_model::Labels;
use time::OffsetDateTime;

/// Captured log output, keyed by container name.
pub type ContainerLogs = BTreeMap<String, Vec<u8>>;

/// Last observed container states, keyed by container name.
pub type ContainerStates = BTreeMap<String, ContainerState>;

/// Identity of a job accepted by the cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    /// Name assigned by the cluster (differs from the spec name when it was generated).
    pub name: String,
    pub namespace: String,
    /// Selector that finds the job's pods.
    pub selector: Labels,
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Pod counters reported on the job status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobStatus {
    pub active: u32,
    pub succeeded: u32,
    pub failed: u32,
}

impl JobStatus {
    /// Terminal state implied by the counters, if any.
    ///
    /// A failed pod wins over a succeeded one.
    pub fn terminal(&self) -> Option<TerminalState> {
        if self.failed > 0 {
            Some(TerminalState::Failed)
        } else if self.succeeded > 0 {
            Some(TerminalState::Succeeded)
        } else {
            None
        }
    }
}

/// State from which a run will not transition further.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalState {
    Succeeded,
    Failed,
    /// Imposed by the caller's context rather than reported by the cluster.
    TimedOut,
}

impl TerminalState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminalState::Succeeded => "succeeded",
            TerminalState::Failed => "failed",
            TerminalState::TimedOut => "timed-out",
        }
    }
}

impl fmt::Display for TerminalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deletion propagation policy for dependents of a deleted job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePropagation {
    /// Dependents are removed before the job itself disappears.
    Foreground,
    Background,
    Orphan,
}

/// Pod as seen by the runner.
#[derive(Debug, Clone, PartialEq)]
pub struct PodInfo {
    pub name: String,
    pub namespace: String,
    pub created_at: Option<OffsetDateTime>,
    /// Containers declared in the pod spec, in declaration order.
    ///
    /// May include containers that never started and therefore have no status.
    pub containers: Vec<String>,
    /// Container states from the pod status.
    pub statuses: ContainerStates,
}

/// Lifecycle state of one container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerState {
    Waiting {
        reason: Option<String>,
        message: Option<String>,
    },
    Running {
        started_at: Option<OffsetDateTime>,
    },
    Terminated {
        exit_code: i32,
        signal: Option<i32>,
        reason: Option<String>,
        message: Option<String>,
        started_at: Option<OffsetDateTime>,
        finished_at: Option<OffsetDateTime>,
    },
    /// The status carried no state.
    Unknown,
}

impl ContainerState {
    /// Terminated state with only an exit code set.
    pub fn terminated(exit_code: i32) -> Self {
        ContainerState::Terminated {
            exit_code,
            signal: None,
            reason: None,
            message: None,
            started_at: None,
            finished_at: None,
        }
    }

    /// Exit code, if the container terminated.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ContainerState::Terminated { exit_code, .. } => Some(*exit_code),
            _ => None,
        }
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self, ContainerState::Terminated { .. })
    }
}

impl fmt::Display for ContainerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerState::Waiting { reason, .. } => match reason {
                Some(reason) => write!(f, "waiting ({reason})"),
                None => f.write_str("waiting"),
            },
            ContainerState::Running { .. } => f.write_str("running"),
            ContainerState::Terminated {
                exit_code, reason, ..
            } => match reason {
                Some(reason) => write!(f, "terminated ({reason}, exit code {exit_code})"),
                None => write!(f, "terminated (exit code {exit_code})"),
            },
            ContainerState::Unknown => f.write_str("unknown"),
        }
    }
}
