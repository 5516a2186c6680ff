use super::state::{ProcessId, Ticks};

/// Validation failures raised by the engine's entry points.
///
/// Stepping the engine never fails; every variant here is produced
/// synchronously by the call that violated a precondition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchedError {
    #[error("process {0} is already registered")]
    DuplicateProcess(ProcessId),

    #[error("priority must be 1, 2 or 3 (got {0})")]
    InvalidPriority(u8),

    #[error("process {0} must require at least one unit of CPU time")]
    ZeroCpuTime(ProcessId),

    #[error("quantum {which} must be positive")]
    ZeroQuantum { which: u8 },

    #[error("scheduler parameters are frozen once tick 0 has run (now = {now})")]
    ConfigFrozen { now: Ticks },

    #[error("process {id} arrives at tick {arrival}, but the engine is already at tick {now}")]
    ArrivalInPast {
        id: ProcessId,
        arrival: Ticks,
        now: Ticks,
    },

    #[error("no process registered with id {0}")]
    UnknownProcess(ProcessId),
}
