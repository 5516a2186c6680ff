//! Tick-by-tick model of a five-level multilevel feedback queue.
//!
//! [`core::MlfqCore`] owns the process table and the five ready queues and
//! advances simulated time one tick per call. Each tick admits arrivals into
//! Q1, ages processes waiting in Q3-Q5, runs the head of the highest
//! non-empty queue for one unit, and then terminates or demotes it.
//! [`Sim`] wraps the engine with a workload and per-job statistics.

pub mod core;
pub mod scheduler;
pub mod sim;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use crate::core::{MlfqCore, SchedError, SchedEvent, Snapshot};
pub use crate::scheduler::SchedParams;
pub use crate::sim::{Job, Sim, Workload};
