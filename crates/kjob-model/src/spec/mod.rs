mod container;
pub use container::ContainerSpec;

mod job;
pub use job::JobSpec;
