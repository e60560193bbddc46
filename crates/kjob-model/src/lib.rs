mod domain;
pub use domain::{DEFAULT_NAMESPACE, LABEL_MANAGED_BY, MANAGED_BY_VALUE};
pub use domain::{Env, EnvVar, Labels, TimeoutMs};

mod error;
pub use error::{ModelError, ModelResult};

mod spec;
pub use spec::{ContainerSpec, JobSpec};
