pub mod driver;
pub mod job;
pub mod workload;

pub use driver::Sim;
pub use job::{Job, JobInstance};
pub use workload::{BernoulliSpec, Workload, WorkloadError, bernoulli};
