use serde::Serialize;

use crate::core::{Level, TaskId, Ticks};

/// Emitted by [`MlfqCore::step`](super::MlfqCore::step), in the order the
/// tick phases run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SchedEvent {
    Admitted {
        task: TaskId,
    },
    Aged {
        task: TaskId,
        from: Level,
        to: Level,
    },
    Executed {
        task: TaskId,
        level: Level,
        remaining: Ticks,
    },
    // Quantum exhausted at Q1 or Q2
    Demoted {
        task: TaskId,
        from: Level,
        to: Level,
    },
    Terminated {
        task: TaskId,
    },
    // Nothing queued this tick
    Idle,
}
