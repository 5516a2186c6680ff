use super::state::{Level, ProcessState, SchedCtx};
use crate::scheduler::SchedParams;

/// Post-tick consistency checks over the process table and queues.
#[derive(Debug, Default)]
pub struct Observer {
    step: u64,
}

impl Observer {
    pub fn new() -> Self {
        Self { step: 0 }
    }

    pub fn steps(&self) -> u64 {
        self.step
    }

    pub fn reset(&mut self) {
        self.step = 0;
    }

    pub fn observe(&mut self, ctx: &SchedCtx, params: &SchedParams) {
        self.step += 1;
        if !cfg!(debug_assertions) {
            return;
        }

        for (task, process) in ctx.processes.iter().enumerate() {
            let occurrences: usize = Level::ALL
                .into_iter()
                .map(|level| ctx.queues.iter(level).filter(|&t| t == task).count())
                .sum();
            let id = &process.id;

            match process.state {
                ProcessState::NotArrived => {
                    debug_assert_eq!(occurrences, 0, "Unarrived process {id} is enqueued");
                    debug_assert!(
                        process.is_waiting_to_arrive(ctx.now),
                        "Process {id} arrived at {} but was never admitted",
                        process.arrival_time
                    );
                }
                ProcessState::Queued(level) => {
                    debug_assert_eq!(
                        occurrences, 1,
                        "Process {id} must sit in exactly one queue slot"
                    );
                    debug_assert!(
                        ctx.queues.contains(level, task),
                        "Process {id} tagged {level} but not found there"
                    );
                    debug_assert!(
                        process.remaining_cpu_time > 0,
                        "Queued process {id} has no CPU time left"
                    );
                    match level {
                        Level::Q1 => debug_assert!(
                            process.ticks_in_current_queue < params.quantum1(),
                            "Process {id} overran quantum 1"
                        ),
                        Level::Q2 => debug_assert!(
                            process.ticks_in_current_queue < params.quantum2(),
                            "Process {id} overran quantum 2"
                        ),
                        _ => {}
                    }
                }
                ProcessState::Terminated => {
                    debug_assert_eq!(occurrences, 0, "Terminated process {id} still enqueued");
                    debug_assert_eq!(process.remaining_cpu_time, 0);
                    debug_assert!(
                        ctx.terminated.contains(&task),
                        "Terminated process {id} missing from completion list"
                    );
                }
            }

            debug_assert!(
                process.remaining_cpu_time <= process.total_cpu_time,
                "Process {id} gained CPU time"
            );
        }

        debug_assert_eq!(
            ctx.terminated.len(),
            ctx.processes.iter().filter(|p| p.is_terminated()).count(),
            "Completion list out of sync with process states"
        );
    }
}
