use super::{
    job::{Job, JobInstance},
    workload::{Workload, WorkloadError},
};
use crate::{
    core::{MlfqCore, SchedError, SchedEvent, Snapshot, TaskId, Ticks},
    scheduler::SchedParams,
};

/// Drives an [`MlfqCore`] over a workload and keeps per-job stats.
pub struct Sim {
    core: MlfqCore,
    // Indexed by TaskId; jobs are registered in order
    jobs: Vec<JobInstance>,
}

impl Sim {
    pub fn new(jobs: Vec<Job>, params: SchedParams) -> Result<Self, SchedError> {
        let mut sim = Self {
            core: MlfqCore::new(params),
            jobs: Vec::with_capacity(jobs.len()),
        };
        for job in jobs {
            sim.add_job(job)?;
        }
        Ok(sim)
    }

    /// Fails with [`WorkloadError::Invalid`] when a process is rejected.
    pub fn from_workload(workload: Workload) -> Result<Self, WorkloadError> {
        Ok(Self::new(workload.processes, workload.scheduler)?)
    }

    /// Register one more job with the engine.
    pub fn add_job(&mut self, job: Job) -> Result<TaskId, SchedError> {
        let task = self.core.register_process(
            job.id.clone(),
            job.arrival,
            job.cpu_time,
            job.priority,
        )?;
        debug_assert_eq!(task, self.jobs.len(), "TaskId must match job index");
        self.jobs.push(JobInstance::new(job));
        Ok(task)
    }

    pub fn step(&mut self) -> Vec<SchedEvent> {
        let tick = self.core.now();
        let events = self.core.step();

        for event in &events {
            match *event {
                SchedEvent::Executed { task, .. } => {
                    if let Some(job) = self.jobs.get_mut(task) {
                        job.first_run.get_or_insert(tick);
                    }
                }
                SchedEvent::Terminated { task } => {
                    if let Some(job) = self.jobs.get_mut(task) {
                        job.completion_time = Some(tick);
                    }
                }
                _ => {}
            }
        }

        events
    }

    /// Step until `now == target`, rewinding first if `target` is behind.
    /// Stats are rebuilt by the replay.
    pub fn seek(&mut self, target: Ticks) -> Ticks {
        if target < self.core.now() {
            self.rewind();
        }
        while self.core.now() < target {
            self.step();
        }
        self.core.now()
    }

    /// Back to tick 0 with the same jobs and no stats.
    pub fn rewind(&mut self) {
        self.core.rewind();
        self.jobs.iter_mut().for_each(JobInstance::clear);
    }

    /// Step until every job has terminated.
    pub fn run_to_completion(&mut self) -> Ticks {
        while !self.all_jobs_completed() {
            self.step();
        }
        self.core.now()
    }

    pub fn all_jobs_completed(&self) -> bool {
        self.jobs.iter().all(|job| job.completion_time.is_some())
    }

    pub fn now(&self) -> Ticks {
        self.core.now()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.core.snapshot()
    }

    pub fn core(&self) -> &MlfqCore {
        &self.core
    }

    pub fn jobs(&self) -> &[JobInstance] {
        &self.jobs
    }

    pub fn jobs_map<T>(&self, f: impl Fn(&JobInstance) -> T) -> impl Iterator<Item = T> {
        self.jobs.iter().map(f)
    }
}
