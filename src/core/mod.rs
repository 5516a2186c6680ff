pub mod driver;
pub mod error;
pub mod event;
pub mod observer;
pub mod snapshot;
pub mod state;

pub use driver::MlfqCore;
pub use error::SchedError;
pub use event::SchedEvent;
pub use snapshot::{AgingView, ExecutingView, ProcessView, QueueView, Snapshot, Status};
pub use state::{
    Level, NUM_LEVELS, Priority, Process, ProcessId, ProcessState, QueueSet, SchedCtx, TaskId,
    Ticks,
};
