//! Transition rules of the five-level feedback queue.
//!
//! Levels 1 and 2 are round robin with a quantum each; a process that uses
//! up its quantum drops a level. Leaving level 2, a process lands in the
//! queue picked by its priority class (P1 -> Q3, P2 -> Q4, P3 -> Q5).
//! Levels 3-5 never rotate on quantum; only aging moves processes there.

use super::params::SchedParams;
use crate::core::{Level, Priority, Process, Ticks};

/// What happens to the process that just ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Terminate,
    Demote(Level),
    Stay,
}

/// Destination when a process exhausts queue 2's quantum.
pub fn demotion_level(priority: Priority) -> Level {
    match priority {
        Priority::P1 => Level::Q3,
        Priority::P2 => Level::Q4,
        Priority::P3 => Level::Q5,
    }
}

pub fn disposition(process: &Process, level: Level, params: &SchedParams) -> Disposition {
    if process.remaining_cpu_time == 0 {
        return Disposition::Terminate;
    }

    match level {
        Level::Q1 if process.ticks_in_current_queue >= params.quantum1() => {
            Disposition::Demote(Level::Q2)
        }
        Level::Q2 if process.ticks_in_current_queue >= params.quantum2() => {
            Disposition::Demote(demotion_level(process.priority))
        }
        _ => Disposition::Stay,
    }
}

/// Level a waiting process should age into, given how long it has gone
/// without running. Q3 is the ceiling.
pub fn aging_target(level: Level, waited: Ticks, params: &SchedParams) -> Option<Level> {
    if waited < params.aging_threshold() {
        return None;
    }
    match level {
        Level::Q4 | Level::Q5 => level.above(),
        _ => None,
    }
}
