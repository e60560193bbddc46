use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[cfg(feature = "schema")]
use schemars::JsonSchema;

use crate::{ContainerSpec, DEFAULT_NAMESPACE, Labels, ModelError, ModelResult, TimeoutMs};

/// Longest name the API server accepts for a job (DNS-1123 label).
const MAX_NAME_LEN: usize = 63;

/// Room left for the random suffix the API server appends to a `generateName` prefix.
const GENERATE_NAME_SUFFIX_LEN: usize = 5;

/// Declarative description of a one-shot job.
///
/// `JobSpec` describes *what* runs (containers) and *where* (namespace), plus the selector
/// used to find the pod the job creates. It is immutable input: the runner never mutates it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct JobSpec {
    /// Job name, or the name prefix when `generate_name` is set.
    pub name: String,
    /// Let the API server append a random suffix to `name`.
    ///
    /// Recommended when the same job file is run repeatedly: names stay unique across runs.
    #[serde(default)]
    pub generate_name: bool,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Labels stamped on the pod template and used to locate the job's pod.
    ///
    /// Must select only the pod of this run; overlapping selectors between concurrent runs are not coordinated.
    pub selector: Labels,
    /// Extra labels for the job object itself.
    #[serde(default, skip_serializing_if = "Labels::is_empty")]
    pub labels: Labels,
    pub containers: Vec<ContainerSpec>,
    /// Cluster-side limit on the job's active time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_deadline_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account: Option<String>,
    /// Caller-side deadline for the whole run, in milliseconds.
    ///
    /// Not sent to the cluster; consumers turn it into a run deadline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<TimeoutMs>,
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

impl JobSpec {
    /// Create a spec with a fixed name in the given namespace and no containers.
    ///
    /// ```rust
    /// use kjob_model::{ContainerSpec, JobSpec};
    ///
    /// let spec = JobSpec::new("db-migrate", "tools")
    ///     .with_selector("kjob.run", "db-migrate-1")
    ///     .with_container(
    ///         ContainerSpec::new("worker", "alpine:3.20").with_command(["sh", "-c", "echo done"]),
    ///     );
    /// assert!(spec.validate().is_ok());
    /// ```
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            generate_name: false,
            namespace: namespace.into(),
            selector: Labels::new(),
            labels: Labels::new(),
            containers: Vec::new(),
            active_deadline_secs: None,
            service_account: None,
            timeout_ms: None,
        }
    }

    /// Parse a JSON job file and validate it.
    pub fn from_json(raw: &str) -> ModelResult<Self> {
        let spec: JobSpec = serde_json::from_str(raw)?;
        spec.validate()?;
        Ok(spec)
    }

    pub fn with_selector(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.selector.insert(key, value);
        self
    }

    pub fn with_container(mut self, container: ContainerSpec) -> Self {
        self.containers.push(container);
        self
    }

    pub fn with_generated_name(mut self) -> Self {
        self.generate_name = true;
        self
    }

    /// Names of the declared containers, in declaration order.
    pub fn container_names(&self) -> impl Iterator<Item = &str> {
        self.containers.iter().map(|c| c.name.as_str())
    }

    /// Validate the spec before submission.
    ///
    /// Rules:
    /// - `name` is a lowercase DNS-1123 label (shorter when used as a `generateName` prefix);
    /// - `namespace` is not empty;
    /// - `selector` is not empty;
    /// - at least one container, names unique, images present;
    /// - `active_deadline_secs` and `timeout_ms`, when set, are positive.
    pub fn validate(&self) -> ModelResult<()> {
        validate_name(&self.name, self.generate_name)?;

        if self.namespace.trim().is_empty() {
            return Err(ModelError::Invalid("namespace is empty".into()));
        }
        if self.selector.is_empty() {
            return Err(ModelError::Invalid(
                "selector is empty; the job's pod could not be located".into(),
            ));
        }
        if self.containers.is_empty() {
            return Err(ModelError::Invalid("job declares no containers".into()));
        }

        let mut seen = BTreeSet::new();
        for container in &self.containers {
            container.validate()?;
            if !seen.insert(container.name.as_str()) {
                return Err(ModelError::Invalid(format!(
                    "duplicate container name '{}'",
                    container.name
                )));
            }
        }

        if self.active_deadline_secs == Some(0) {
            return Err(ModelError::Invalid(
                "activeDeadlineSecs cannot be zero".into(),
            ));
        }
        if self.timeout_ms == Some(0) {
            return Err(ModelError::Invalid("timeoutMs cannot be zero".into()));
        }
        Ok(())
    }
}

fn validate_name(name: &str, prefix: bool) -> ModelResult<()> {
    let max = if prefix {
        MAX_NAME_LEN - GENERATE_NAME_SUFFIX_LEN
    } else {
        MAX_NAME_LEN
    };
    if name.is_empty() {
        return Err(ModelError::Invalid("job name is empty".into()));
    }
    if name.len() > max {
        return Err(ModelError::Invalid(format!(
            "job name '{name}' is longer than {max} characters"
        )));
    }
    let valid_chars = name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    // A generateName prefix may end with '-'; the random suffix follows it.
    let bad_edge = name.starts_with('-') || (!prefix && name.ends_with('-'));
    if !valid_chars || bad_edge {
        return Err(ModelError::Invalid(format!(
            "job name '{name}' must consist of lowercase alphanumerics and '-'"
        )));
    }
    Ok(())
}
