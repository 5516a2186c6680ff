use serde::{Deserialize, Serialize};

use crate::core::{ProcessId, Ticks};

/// A process definition as supplied by a workload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: ProcessId,
    pub arrival: Ticks,
    pub cpu_time: Ticks,
    pub priority: u8,
}

/// A [`Job`] plus the statistics gathered while it runs.
#[derive(Debug, Clone)]
pub struct JobInstance {
    pub job: Job,
    pub first_run: Option<Ticks>,
    // Tick during which the last unit of work ran
    pub completion_time: Option<Ticks>,
}

impl JobInstance {
    pub fn new(job: Job) -> Self {
        Self {
            job,
            first_run: None,
            completion_time: None,
        }
    }

    pub fn clear(&mut self) {
        self.first_run = None;
        self.completion_time = None;
    }

    /// Ticks from arrival until first scheduled.
    pub fn response_time(&self) -> Option<Ticks> {
        self.first_run.map(|t| t - self.job.arrival)
    }

    /// Ticks from arrival until completion, counting the final tick.
    pub fn turnaround_time(&self) -> Option<Ticks> {
        self.completion_time.map(|t| t + 1 - self.job.arrival)
    }
}
