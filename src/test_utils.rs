//! Helpers shared by unit, integration and property tests.

use crate::core::{Level, MlfqCore, ProcessId, Status, TaskId, Ticks};
use crate::scheduler::SchedParams;

/// Engine with the given quanta.
pub fn engine(quantum1: Ticks, quantum2: Ticks) -> MlfqCore {
    MlfqCore::new(SchedParams::new(quantum1, quantum2).expect("test quanta must be positive"))
}

/// Register a process, panicking on validation failure.
pub fn add(core: &mut MlfqCore, id: &str, arrival: Ticks, cpu_time: Ticks, priority: u8) -> TaskId {
    core.register_process(id, arrival, cpu_time, priority)
        .expect("test process must be valid")
}

pub fn status(core: &MlfqCore, id: &str) -> Status {
    core.snapshot()
        .status_of(&ProcessId::from(id))
        .expect("unknown test process")
}

pub fn level_of(core: &MlfqCore, id: &str) -> Option<Level> {
    match status(core, id) {
        Status::Queued(level) => Some(level),
        _ => None,
    }
}

pub fn remaining(core: &MlfqCore, id: &str) -> Ticks {
    core.process(&ProcessId::from(id))
        .expect("unknown test process")
        .remaining_cpu_time
}

pub fn waited(core: &MlfqCore, id: &str) -> Ticks {
    core.process(&ProcessId::from(id))
        .expect("unknown test process")
        .ticks_since_last_execution
}

/// Ids queued at `level`, head first.
pub fn queue_ids(core: &MlfqCore, level: Level) -> Vec<String> {
    core.snapshot()
        .queue(level)
        .iter()
        .map(|id| id.0.clone())
        .collect()
}

/// Total units executed so far across all processes.
pub fn work_done(core: &MlfqCore) -> Ticks {
    core.ctx
        .processes
        .iter()
        .map(|p| p.total_cpu_time - p.remaining_cpu_time)
        .sum()
}
