//! Well-known keys and defaults shared by the model and the cluster adapters.

/// Namespace used when a job file does not name one.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Label key stamped on every job object created by kjob.
///
/// Lets operators find jobs that leaked past cleanup (`kubectl get jobs -l app.kubernetes.io/managed-by=kjob`).
pub const LABEL_MANAGED_BY: &str = "app.kubernetes.io/managed-by";

/// Value stored under [`LABEL_MANAGED_BY`].
pub const MANAGED_BY_VALUE: &str = "kjob";
