//! Read-only view of engine state for reporters.

use serde::Serialize;
use std::fmt;

use super::state::{Level, ProcessId, ProcessState, SchedCtx, Ticks};
use crate::scheduler::SchedParams;

/// Read-only view of the engine after the most recent tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// Ticks simulated so far; the next tick to run.
    pub now: Ticks,
    pub quantum1: Ticks,
    pub quantum2: Ticks,
    pub aging_threshold: Ticks,
    pub queues: Vec<QueueView>,
    /// Completion order.
    pub terminated: Vec<ProcessId>,
    pub executing: Option<ExecutingView>,
    /// Sorted by id.
    pub processes: Vec<ProcessView>,
}

/// One ready queue, head first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueView {
    pub level: Level,
    pub processes: Vec<ProcessId>,
}

/// The process that ran during the most recent tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutingView {
    pub id: ProcessId,
    pub level: Level,
    pub remaining: Ticks,
}

/// Per-process row of a [`Snapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessView {
    pub id: ProcessId,
    pub status: Status,
    pub remaining_cpu_time: Ticks,
    /// Present only at levels 3-5.
    pub aging: Option<AgingView>,
}

/// Where a process currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Status {
    NotArrived { arrival: Ticks },
    Queued(Level),
    Terminated,
}

/// Waiting time of a process in queues 3-5 against the aging threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgingView {
    pub waited: Ticks,
    pub threshold: Ticks,
}

impl Snapshot {
    pub(crate) fn capture(ctx: &SchedCtx, params: &SchedParams) -> Self {
        let id_of = |task| ctx.process(task).id.clone();

        let queues = Level::ALL
            .into_iter()
            .map(|level| QueueView {
                level,
                processes: ctx.queues.iter(level).map(id_of).collect(),
            })
            .collect();

        let executing = ctx.last_run.map(|(task, level)| ExecutingView {
            id: id_of(task),
            level,
            remaining: ctx.process(task).remaining_cpu_time,
        });

        let mut processes: Vec<ProcessView> = ctx
            .processes
            .iter()
            .map(|p| {
                let status = match p.state {
                    ProcessState::NotArrived => Status::NotArrived {
                        arrival: p.arrival_time,
                    },
                    ProcessState::Queued(level) => Status::Queued(level),
                    ProcessState::Terminated => Status::Terminated,
                };
                let aging = p.is_eligible_for_aging().then(|| AgingView {
                    waited: p.ticks_since_last_execution,
                    threshold: params.aging_threshold(),
                });
                ProcessView {
                    id: p.id.clone(),
                    status,
                    remaining_cpu_time: p.remaining_cpu_time,
                    aging,
                }
            })
            .collect();
        processes.sort_by(|a, b| a.id.cmp(&b.id));

        Self {
            now: ctx.now,
            quantum1: params.quantum1(),
            quantum2: params.quantum2(),
            aging_threshold: params.aging_threshold(),
            queues,
            terminated: ctx.terminated.iter().map(|&t| id_of(t)).collect(),
            executing,
            processes,
        }
    }

    pub fn queue(&self, level: Level) -> &[ProcessId] {
        &self.queues[level.number() as usize - 1].processes
    }

    pub fn status_of(&self, id: &ProcessId) -> Option<Status> {
        self.processes
            .iter()
            .find(|p| &p.id == id)
            .map(|p| p.status)
    }
}

fn id_list(ids: &[ProcessId]) -> String {
    let joined = ids.iter().map(ToString::to_string).collect::<Vec<_>>();
    format!("[{}]", joined.join(", "))
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.now.checked_sub(1) {
            Some(tick) => writeln!(f, "Time {tick}:")?,
            None => writeln!(f, "Not started:")?,
        }

        for queue in &self.queues {
            let label = match queue.level {
                Level::Q1 => format!("Q={}", self.quantum1),
                Level::Q2 => format!("Q={}", self.quantum2),
                Level::Q3 => "P1".to_owned(),
                Level::Q4 => "P2".to_owned(),
                Level::Q5 => "P3".to_owned(),
            };
            writeln!(
                f,
                "Queue {} ({label}): {}",
                queue.level.number(),
                id_list(&queue.processes)
            )?;
        }
        writeln!(f, "Terminated: {}", id_list(&self.terminated))?;
        writeln!(f)?;

        match &self.executing {
            Some(exec) => writeln!(
                f,
                "Executing: {} in {} (Remaining: {})",
                exec.id, exec.level, exec.remaining
            )?,
            None => writeln!(f, "No process executing")?,
        }

        writeln!(f)?;
        writeln!(f, "Process States:")?;
        for p in &self.processes {
            let mut parts = Vec::with_capacity(3);
            match p.status {
                Status::NotArrived { arrival } => parts.push(format!("Arrives at {arrival}")),
                Status::Queued(level) => parts.push(level.to_string()),
                Status::Terminated => parts.push("Terminated".to_owned()),
            }
            if let Some(aging) = p.aging {
                parts.push(format!("Aging: {}/{}", aging.waited, aging.threshold));
            }
            parts.push(format!("{} units left", p.remaining_cpu_time));
            writeln!(f, "{}: {}", p.id, parts.join(", "))?;
        }
        Ok(())
    }
}
