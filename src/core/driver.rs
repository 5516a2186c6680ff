use tracing::{debug, info, trace};

use super::{
    error::SchedError,
    event::SchedEvent,
    observer::Observer,
    snapshot::Snapshot,
    state::{Level, Priority, Process, ProcessId, ProcessState, SchedCtx, TaskId, Ticks},
};
use crate::scheduler::{Disposition, SchedParams, aging_target, disposition};

/// The tick engine. Each [`MlfqCore::step`] runs one tick over the
/// process table and queues.
pub struct MlfqCore {
    pub ctx: SchedCtx,
    params: SchedParams,
    observer: Observer,
}

impl Default for MlfqCore {
    fn default() -> Self {
        Self::new(SchedParams::default())
    }
}

impl MlfqCore {
    pub fn new(params: SchedParams) -> Self {
        Self {
            ctx: SchedCtx::new(),
            params,
            observer: Observer::new(),
        }
    }

    pub fn register_process(
        &mut self,
        id: impl Into<ProcessId>,
        arrival_time: Ticks,
        cpu_time: Ticks,
        priority: u8,
    ) -> Result<TaskId, SchedError> {
        let id = id.into();
        let priority = Priority::try_from(priority)?;
        if cpu_time == 0 {
            return Err(SchedError::ZeroCpuTime(id));
        }
        // A tick that has already run can't admit anyone, and replay would
        // disagree with the stepped state.
        if arrival_time < self.ctx.now {
            return Err(SchedError::ArrivalInPast {
                id,
                arrival: arrival_time,
                now: self.ctx.now,
            });
        }

        let task = self
            .ctx
            .create_process(id, arrival_time, cpu_time, priority)?;
        info!(
            process = %self.ctx.process(task).id,
            arrival_time,
            cpu_time,
            priority = priority as u8,
            "registered process"
        );
        Ok(task)
    }

    pub fn configure(&mut self, quantum1: Ticks, quantum2: Ticks) -> Result<(), SchedError> {
        if self.ctx.now > 0 {
            return Err(SchedError::ConfigFrozen { now: self.ctx.now });
        }
        self.params = SchedParams::new(quantum1, quantum2)?;
        info!(
            quantum1,
            quantum2,
            aging_threshold = self.params.aging_threshold(),
            "configured scheduler"
        );
        Ok(())
    }

    pub fn params(&self) -> SchedParams {
        self.params
    }

    /// Run tick `now` and return the new tick number.
    pub fn advance(&mut self) -> Ticks {
        self.step();
        self.ctx.now
    }

    /// Run tick `now`, returning what happened in phase order.
    pub fn step(&mut self) -> Vec<SchedEvent> {
        let tick = self.ctx.now;
        let mut events = Vec::new();

        self.admit_arrivals(&mut events);
        self.age_waiting(&mut events);

        match self.ctx.queues.first_ready() {
            Some((level, task)) => {
                self.execute(task, level, &mut events);
                self.dispose(task, level, &mut events);
                self.ctx.last_run = Some((task, level));
            }
            None => {
                trace!(tick, "idle");
                self.ctx.last_run = None;
                events.push(SchedEvent::Idle);
            }
        }

        self.ctx.advance_time(1);
        self.observer.observe(&self.ctx, &self.params);
        events
    }

    /// Step until `now == target`. No-op if already there or beyond.
    pub fn advance_to(&mut self, target: Ticks) -> Ticks {
        while self.ctx.now < target {
            self.advance();
        }
        self.ctx.now
    }

    /// Jump to `target`, replaying from tick 0 when it lies in the past.
    pub fn seek(&mut self, target: Ticks) -> Ticks {
        if target < self.ctx.now {
            self.rewind();
        }
        self.advance_to(target)
    }

    /// Forget all run-state; registrations and quanta survive.
    pub fn rewind(&mut self) {
        debug!(from = self.ctx.now, "rewinding to tick 0");
        self.ctx.restart();
        self.observer.reset();
    }

    /// Forget processes and run-state. Quanta survive.
    pub fn reset(&mut self) {
        info!(
            processes = self.ctx.processes.len(),
            now = self.ctx.now,
            "reset"
        );
        self.ctx.clear();
        self.observer.reset();
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.ctx, &self.params)
    }

    pub fn now(&self) -> Ticks {
        self.ctx.now
    }

    pub fn process(&self, id: &ProcessId) -> Result<&Process, SchedError> {
        self.ctx
            .lookup(id)
            .map(|task| self.ctx.process(task))
            .ok_or_else(|| SchedError::UnknownProcess(id.clone()))
    }

    pub fn all_terminated(&self) -> bool {
        self.ctx.processes.iter().all(Process::is_terminated)
    }

    /// Nothing queued and nothing still to arrive.
    pub fn is_idle(&self) -> bool {
        let now = self.ctx.now;
        self.ctx.queues.is_empty()
            && !self
                .ctx
                .processes
                .iter()
                .any(|p| p.is_waiting_to_arrive(now))
    }

    pub fn observer(&self) -> &Observer {
        &self.observer
    }

    fn admit_arrivals(&mut self, events: &mut Vec<SchedEvent>) {
        let now = self.ctx.now;
        let arriving: Vec<TaskId> = self
            .ctx
            .processes
            .iter()
            .enumerate()
            .filter(|(_, p)| p.arrival_time == now && p.state == ProcessState::NotArrived)
            .map(|(task, _)| task)
            .collect();

        for task in arriving {
            self.ctx.admit(task);
            debug!(tick = now, process = %self.ctx.process(task).id, "admitted to Q1");
            events.push(SchedEvent::Admitted { task });
        }
    }

    // Every waiting process in Q3-Q5 gets older by one tick; Q4/Q5 processes
    // that hit the threshold move up one level. Levels are swept top-down so
    // a process moved this tick isn't counted twice.
    fn age_waiting(&mut self, events: &mut Vec<SchedEvent>) {
        for level in [Level::Q3, Level::Q4, Level::Q5] {
            let waiting: Vec<TaskId> = self.ctx.queues.iter(level).collect();

            for task in waiting {
                let process = self.ctx.process_mut(task);
                process.ticks_since_last_execution += 1;
                let waited = process.ticks_since_last_execution;

                if let Some(to) = aging_target(level, waited, &self.params) {
                    self.ctx.move_anywhere(task, to);
                    self.ctx.process_mut(task).ticks_since_last_execution = 0;
                    debug!(
                        tick = self.ctx.now,
                        process = %self.ctx.process(task).id,
                        %level,
                        %to,
                        waited,
                        "aged"
                    );
                    events.push(SchedEvent::Aged {
                        task,
                        from: level,
                        to,
                    });
                }
            }
        }
    }

    fn execute(&mut self, task: TaskId, level: Level, events: &mut Vec<SchedEvent>) {
        let now = self.ctx.now;
        let process = self.ctx.process_mut(task);
        debug_assert!(
            process.remaining_cpu_time > 0,
            "Selected process {} has no CPU time left",
            process.id
        );

        process.remaining_cpu_time -= 1;
        process.ticks_in_current_queue += 1;
        process.last_executed_tick = Some(now);
        process.ticks_since_last_execution = 0;

        trace!(tick = now, process = %process.id, %level, remaining = process.remaining_cpu_time, "executed");
        events.push(SchedEvent::Executed {
            task,
            level,
            remaining: process.remaining_cpu_time,
        });
    }

    fn dispose(&mut self, task: TaskId, level: Level, events: &mut Vec<SchedEvent>) {
        let next = disposition(self.ctx.process(task), level, &self.params);
        match next {
            Disposition::Terminate => {
                self.ctx.mark_terminated(task);
                debug!(tick = self.ctx.now, process = %self.ctx.process(task).id, "terminated");
                events.push(SchedEvent::Terminated { task });
            }
            Disposition::Demote(to) => {
                let moved = self.ctx.move_head(level, to);
                debug_assert_eq!(moved, task, "Executed process must be at its queue head");
                debug!(
                    tick = self.ctx.now,
                    process = %self.ctx.process(task).id,
                    from = %level,
                    %to,
                    "quantum exhausted"
                );
                events.push(SchedEvent::Demoted {
                    task,
                    from: level,
                    to,
                });
            }
            // Head-of-line: it runs again next tick unless something
            // higher-priority shows up.
            Disposition::Stay => {}
        }
    }
}
