pub mod mlfq;
pub mod params;

pub use mlfq::{Disposition, aging_target, demotion_level, disposition};
pub use params::{DEFAULT_QUANTUM1, DEFAULT_QUANTUM2, SchedParams};
