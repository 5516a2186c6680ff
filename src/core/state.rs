use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::{collections::VecDeque, fmt};

use super::error::SchedError;

// Index into the process table
pub type TaskId = usize;
pub type Ticks = u64;

pub const NUM_LEVELS: usize = 5;

/// Caller-supplied process identity. Opaque apart from ordering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessId(pub String);

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProcessId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ProcessId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Priority class. Only consulted when a process leaves queue 2; lower
/// numbers land in higher-priority queues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Priority {
    P1 = 1,
    P2 = 2,
    P3 = 3,
}

impl TryFrom<u8> for Priority {
    type Error = SchedError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::P1),
            2 => Ok(Self::P2),
            3 => Ok(Self::P3),
            other => Err(SchedError::InvalidPriority(other)),
        }
    }
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> Self {
        priority as u8
    }
}

/// Queue levels, highest scheduling priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Level {
    Q1 = 1,
    Q2 = 2,
    Q3 = 3,
    Q4 = 4,
    Q5 = 5,
}

impl Level {
    pub const ALL: [Level; NUM_LEVELS] = [Level::Q1, Level::Q2, Level::Q3, Level::Q4, Level::Q5];

    pub fn number(self) -> u8 {
        self as u8
    }

    fn index(self) -> usize {
        self as usize - 1
    }

    /// The next level up (toward Q1), if any.
    pub fn above(self) -> Option<Level> {
        match self {
            Level::Q1 => None,
            Level::Q2 => Some(Level::Q1),
            Level::Q3 => Some(Level::Q2),
            Level::Q4 => Some(Level::Q3),
            Level::Q5 => Some(Level::Q4),
        }
    }

    /// Levels 3-5 accumulate waiting time.
    pub fn is_aging_eligible(self) -> bool {
        matches!(self, Level::Q3 | Level::Q4 | Level::Q5)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.number())
    }
}

/// Lifecycle tag. A queued process records the level it sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProcessState {
    NotArrived,
    Queued(Level),
    Terminated,
}

/// A registered process and its run-state.
#[derive(Debug, Clone)]
pub struct Process {
    pub id: ProcessId,
    pub arrival_time: Ticks,
    pub total_cpu_time: Ticks,
    pub priority: Priority,

    pub state: ProcessState,
    pub remaining_cpu_time: Ticks,
    pub ticks_in_current_queue: Ticks,
    pub ticks_since_last_execution: Ticks,
    pub last_executed_tick: Option<Ticks>,
}

impl Process {
    fn new(id: ProcessId, arrival_time: Ticks, total_cpu_time: Ticks, priority: Priority) -> Self {
        Self {
            id,
            arrival_time,
            total_cpu_time,
            priority,
            state: ProcessState::NotArrived,
            remaining_cpu_time: total_cpu_time,
            ticks_in_current_queue: 0,
            ticks_since_last_execution: 0,
            last_executed_tick: None,
        }
    }

    // Back to the freshly registered state; identity is untouched.
    fn restart(&mut self) {
        self.state = ProcessState::NotArrived;
        self.remaining_cpu_time = self.total_cpu_time;
        self.ticks_in_current_queue = 0;
        self.ticks_since_last_execution = 0;
        self.last_executed_tick = None;
    }

    pub fn level(&self) -> Option<Level> {
        match self.state {
            ProcessState::Queued(level) => Some(level),
            _ => None,
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.state == ProcessState::Terminated
    }

    pub fn is_waiting_to_arrive(&self, now: Ticks) -> bool {
        self.state == ProcessState::NotArrived && self.arrival_time >= now
    }

    pub fn is_eligible_for_aging(&self) -> bool {
        self.level().is_some_and(Level::is_aging_eligible)
    }
}

/// The five ready queues. Entries are indices into the process table.
#[derive(Debug, Default, Clone)]
pub struct QueueSet {
    queues: [VecDeque<TaskId>; NUM_LEVELS],
}

impl QueueSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, level: Level, task: TaskId) {
        self.queues[level.index()].push_back(task);
    }

    pub fn peek_head(&self, level: Level) -> Option<TaskId> {
        self.queues[level.index()].front().copied()
    }

    pub fn pop_head(&mut self, level: Level) -> Option<TaskId> {
        self.queues[level.index()].pop_front()
    }

    /// Extract `task` from whichever queue holds it.
    pub fn remove_anywhere(&mut self, task: TaskId) -> Option<Level> {
        for level in Level::ALL {
            let queue = &mut self.queues[level.index()];
            if let Some(pos) = queue.iter().position(|&t| t == task) {
                queue.remove(pos);
                return Some(level);
            }
        }
        None
    }

    pub fn contains(&self, level: Level, task: TaskId) -> bool {
        self.queues[level.index()].contains(&task)
    }

    pub fn iter(&self, level: Level) -> impl Iterator<Item = TaskId> + '_ {
        self.queues[level.index()].iter().copied()
    }

    /// Head of the highest-priority non-empty queue.
    pub fn first_ready(&self) -> Option<(Level, TaskId)> {
        Level::ALL
            .into_iter()
            .find_map(|level| self.peek_head(level).map(|task| (level, task)))
    }

    pub fn is_empty(&self) -> bool {
        self.queues.iter().all(VecDeque::is_empty)
    }

    pub fn clear(&mut self) {
        self.queues.iter_mut().for_each(VecDeque::clear);
    }
}

/// Everything the engine mutates while stepping.
#[derive(Debug, Default)]
pub struct SchedCtx {
    pub now: Ticks,
    pub processes: Vec<Process>,
    pub queues: QueueSet,
    // Completion order
    pub terminated: Vec<TaskId>,
    // Process that ran during the most recent tick, and the level it ran at
    pub last_run: Option<(TaskId, Level)>,

    index: FxHashMap<ProcessId, TaskId>,
}

impl SchedCtx {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_process(
        &mut self,
        id: ProcessId,
        arrival_time: Ticks,
        total_cpu_time: Ticks,
        priority: Priority,
    ) -> Result<TaskId, SchedError> {
        if self.index.contains_key(&id) {
            return Err(SchedError::DuplicateProcess(id));
        }

        let task = self.processes.len();
        self.index.insert(id.clone(), task);
        self.processes
            .push(Process::new(id, arrival_time, total_cpu_time, priority));
        Ok(task)
    }

    pub fn lookup(&self, id: &ProcessId) -> Option<TaskId> {
        self.index.get(id).copied()
    }

    pub fn process(&self, task: TaskId) -> &Process {
        &self.processes[task]
    }

    pub fn process_mut(&mut self, task: TaskId) -> &mut Process {
        &mut self.processes[task]
    }

    pub fn advance_time(&mut self, delta: Ticks) {
        self.now = self.now.saturating_add(delta);
    }

    /// Put a newly arrived process at the tail of queue 1.
    pub fn admit(&mut self, task: TaskId) {
        let process = self.process_mut(task);
        debug_assert_eq!(
            process.state,
            ProcessState::NotArrived,
            "Process {} admitted twice",
            process.id
        );
        process.state = ProcessState::Queued(Level::Q1);
        process.ticks_in_current_queue = 0;
        process.ticks_since_last_execution = 0;
        self.queues.enqueue(Level::Q1, task);
    }

    /// Move the head of `from` to the tail of `to`.
    pub fn move_head(&mut self, from: Level, to: Level) -> TaskId {
        let task = self
            .queues
            .pop_head(from)
            .expect("move_head on an empty queue");
        self.relocate(task, to);
        task
    }

    /// Move `task` from wherever it sits to the tail of `to`.
    pub fn move_anywhere(&mut self, task: TaskId, to: Level) {
        let removed = self.queues.remove_anywhere(task);
        debug_assert!(removed.is_some(), "Process {task} missing from queues");
        self.relocate(task, to);
    }

    fn relocate(&mut self, task: TaskId, to: Level) {
        let process = self.process_mut(task);
        process.state = ProcessState::Queued(to);
        process.ticks_in_current_queue = 0;
        self.queues.enqueue(to, task);
    }

    pub fn mark_terminated(&mut self, task: TaskId) {
        let level = self
            .process(task)
            .level()
            .expect("Only queued processes can terminate");
        let head = self.queues.pop_head(level);
        debug_assert_eq!(head, Some(task), "Terminating process must be at its queue head");

        let process = self.process_mut(task);
        debug_assert_eq!(process.remaining_cpu_time, 0);
        process.state = ProcessState::Terminated;
        self.terminated.push(task);
    }

    /// Drop run-state but keep registrations.
    pub fn restart(&mut self) {
        self.now = 0;
        self.queues.clear();
        self.terminated.clear();
        self.last_run = None;
        self.processes.iter_mut().for_each(Process::restart);
    }

    /// Drop everything, registrations included.
    pub fn clear(&mut self) {
        self.restart();
        self.processes.clear();
        self.index.clear();
    }
}
