use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// How the runner picks one pod when the selector matches several.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PodSelection {
    /// Earliest creation timestamp, ties broken by name. Pods without a timestamp sort last.
    #[default]
    EarliestCreated,
    /// First pod in the order returned by the API.
    FirstListed,
}

impl FromStr for PodSelection {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "earliest-created" => Ok(Self::EarliestCreated),
            "first-listed" => Ok(Self::FirstListed),
            _ => Err(CoreError::InvalidConfig(format!(
                "unknown pod selection: {s} (expected: earliest-created|first-listed)"
            ))),
        }
    }
}

impl fmt::Display for PodSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PodSelection::EarliestCreated => "earliest-created",
            PodSelection::FirstListed => "first-listed",
        })
    }
}

/// Runner configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RunnerConfig {
    /// Fixed delay between job status polls. Also bounds pod lookup and log capture once the
    /// deadline has passed.
    pub poll_interval_ms: u64,
    /// Bound on the cleanup delete request.
    pub delete_timeout_ms: u64,
    /// Tie-break when the selector matches several pods.
    pub pod_selection: PodSelection,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1_000,
            delete_timeout_ms: 30_000,
            pod_selection: PodSelection::default(),
        }
    }
}

impl RunnerConfig {
    /// Reject zero intervals and timeouts.
    pub fn validate(&self) -> Result<(), CoreError> {
        let checks = [
            ("pollIntervalMs", self.poll_interval_ms),
            ("deleteTimeoutMs", self.delete_timeout_ms),
        ];
        for (field, value) in checks {
            if value == 0 {
                return Err(CoreError::InvalidConfig(format!(
                    "{field} cannot be zero"
                )));
            }
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn delete_timeout(&self) -> Duration {
        Duration::from_millis(self.delete_timeout_ms)
    }
}
