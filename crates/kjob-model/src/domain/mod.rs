mod var;
pub use var::EnvVar;

mod env;
pub use env::Env;

mod labels;
pub use labels::Labels;

mod constants;
pub use constants::{DEFAULT_NAMESPACE, LABEL_MANAGED_BY, MANAGED_BY_VALUE};

/// Timeout value in milliseconds.
///
/// Used by job files to carry the caller's run deadline.
pub type TimeoutMs = u64;
