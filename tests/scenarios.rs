//! End-to-end scheduling scenarios driven through the public engine API.

use mlfq_model::core::{Level, Status};
use mlfq_model::test_utils::*;

// ===========================================================================
// Single long process walks Q1 -> Q2 and finishes before Q3
// ===========================================================================

#[test]
fn single_process_demotes_then_terminates_in_q2() {
    let mut core = engine(4, 8);
    add(&mut core, "A", 0, 10, 1);

    // Ticks 0-2: still inside quantum 1.
    core.advance_to(3);
    assert_eq!(level_of(&core, "A"), Some(Level::Q1));
    assert_eq!(remaining(&core, "A"), 7);

    // Tick 3 exhausts quantum 1.
    core.advance();
    assert_eq!(level_of(&core, "A"), Some(Level::Q2));
    assert_eq!(remaining(&core, "A"), 6);

    core.advance_to(9);
    assert_eq!(level_of(&core, "A"), Some(Level::Q2));
    assert_eq!(remaining(&core, "A"), 1);

    // Tick 9 uses the last unit.
    core.advance();
    assert_eq!(status(&core, "A"), Status::Terminated);
    assert_eq!(remaining(&core, "A"), 0);
    let snapshot = core.snapshot();
    assert_eq!(snapshot.terminated, vec!["A".into()]);
    assert!(Level::ALL.into_iter().all(|l| snapshot.queue(l).is_empty()));
    assert_eq!(
        core.process(&"A".into()).unwrap().last_executed_tick,
        Some(9)
    );
}

// ===========================================================================
// Two equal processes run back to back, registration order first
// ===========================================================================

#[test]
fn head_of_queue_runs_until_done() {
    let mut core = engine(4, 8);
    add(&mut core, "A", 0, 2, 1);
    add(&mut core, "B", 0, 2, 1);

    core.advance();
    assert_eq!(queue_ids(&core, Level::Q1), vec!["A", "B"]);
    assert_eq!(remaining(&core, "B"), 2);

    core.advance();
    assert_eq!(status(&core, "A"), Status::Terminated);
    assert_eq!(queue_ids(&core, Level::Q1), vec!["B"]);

    core.advance();
    let exec = core.snapshot().executing.unwrap();
    assert_eq!(exec.id, "B".into());
    assert_eq!(exec.level, Level::Q1);
    assert_eq!(exec.remaining, 1);

    core.advance();
    assert_eq!(status(&core, "B"), Status::Terminated);
    assert_eq!(core.snapshot().terminated, vec!["A".into(), "B".into()]);
    assert!(core.all_terminated());
}

// ===========================================================================
// Starvation: Q3 is kept busy, so a Q5 process only moves by aging
// ===========================================================================
//
// quantum1 = 2, quantum2 = 3, threshold = 5.
// H (P1, 100 units) settles at the head of Q3 after tick 6 and runs from
// tick 10 onward. L (P3) reaches Q5 after its last run at tick 9.

fn starvation_engine() -> mlfq_model::MlfqCore {
    let mut core = engine(2, 3);
    add(&mut core, "H", 0, 100, 1);
    add(&mut core, "L", 0, 10, 3);
    core
}

#[test]
fn starved_process_ages_exactly_at_threshold() {
    let mut core = starvation_engine();

    core.advance_to(10);
    assert_eq!(level_of(&core, "H"), Some(Level::Q3));
    assert_eq!(level_of(&core, "L"), Some(Level::Q5));
    assert_eq!(remaining(&core, "L"), 5);
    assert_eq!(waited(&core, "L"), 0);

    // Ticks 10-13: waiting, not yet promoted.
    for expected in 1..=4 {
        core.advance();
        assert_eq!(level_of(&core, "L"), Some(Level::Q5));
        assert_eq!(waited(&core, "L"), expected);
    }

    // Tick 14: fifth tick without running.
    core.advance();
    assert_eq!(level_of(&core, "L"), Some(Level::Q4));
    assert_eq!(waited(&core, "L"), 0);
    assert_eq!(remaining(&core, "L"), 5);

    core.advance_to(19);
    assert_eq!(level_of(&core, "L"), Some(Level::Q4));

    // Tick 19: one more level, then Q3 is the ceiling.
    core.advance();
    assert_eq!(level_of(&core, "L"), Some(Level::Q3));
    assert_eq!(queue_ids(&core, Level::Q3), vec!["H", "L"]);

    core.advance_to(60);
    assert_eq!(level_of(&core, "L"), Some(Level::Q3));
    assert_eq!(waited(&core, "L"), 40);
    assert_eq!(remaining(&core, "L"), 5);
}

#[test]
fn starved_process_runs_once_q3_head_finishes() {
    let mut core = starvation_engine();

    // H has 95 units left after tick 9 and holds Q3 for ticks 10-104.
    core.advance_to(105);
    assert_eq!(status(&core, "H"), Status::Terminated);
    assert_eq!(remaining(&core, "L"), 5);

    core.advance_to(110);
    assert_eq!(status(&core, "L"), Status::Terminated);
    assert!(core.is_idle());
}

#[test]
fn snapshot_reports_aging_for_low_levels() {
    let mut core = starvation_engine();
    core.advance_to(12);

    let snapshot = core.snapshot();
    let l = snapshot.processes.iter().find(|p| p.id == "L".into()).unwrap();
    let aging = l.aging.unwrap();
    assert_eq!((aging.waited, aging.threshold), (2, 5));

    let mut fresh = engine(2, 3);
    add(&mut fresh, "X", 0, 5, 1);
    fresh.advance();
    let x = fresh.snapshot().processes[0].clone();
    assert_eq!(x.status, Status::Queued(Level::Q1));
    assert!(x.aging.is_none());
}

// ===========================================================================
// Arrivals
// ===========================================================================

#[test]
fn late_arrival_preempts_lower_levels() {
    let mut core = engine(1, 1);
    add(&mut core, "A", 0, 10, 3);
    add(&mut core, "B", 3, 1, 1);

    core.advance_to(3);
    assert_eq!(level_of(&core, "A"), Some(Level::Q5));
    assert_eq!(
        status(&core, "B"),
        Status::NotArrived { arrival: 3 }
    );

    // B is admitted to Q1 at tick 3 and runs ahead of A.
    core.advance();
    assert_eq!(status(&core, "B"), Status::Terminated);
    assert_eq!(remaining(&core, "A"), 7);
    assert_eq!(core.snapshot().executing.unwrap().id, "B".into());
}

#[test]
fn idle_gap_before_first_arrival() {
    let mut core = engine(4, 8);
    add(&mut core, "A", 5, 1, 2);

    core.advance_to(5);
    assert!(core.snapshot().executing.is_none());
    assert!(!core.is_idle());
    assert_eq!(remaining(&core, "A"), 1);

    core.advance();
    assert_eq!(status(&core, "A"), Status::Terminated);
    assert!(core.is_idle());
}

// ===========================================================================
// Replay
// ===========================================================================

#[test]
fn rewind_and_replay_matches_stepping() {
    let mut stepped = starvation_engine();
    add(&mut stepped, "M", 7, 4, 2);
    let mut snapshots = Vec::new();
    for _ in 0..30 {
        stepped.advance();
        snapshots.push(stepped.snapshot());
    }

    for (i, expected) in snapshots.iter().enumerate().rev() {
        stepped.seek(i as u64 + 1);
        assert_eq!(&stepped.snapshot(), expected, "diverged at tick {i}");
    }
}

#[test]
fn reset_then_reregister_reproduces_run() {
    let mut core = engine(3, 4);
    add(&mut core, "A", 0, 9, 2);
    add(&mut core, "B", 2, 6, 3);
    core.advance_to(20);
    let first = core.snapshot();

    core.reset();
    assert_eq!(core.params().quantum1(), 3);
    add(&mut core, "A", 0, 9, 2);
    add(&mut core, "B", 2, 6, 3);
    core.advance_to(20);
    assert_eq!(core.snapshot(), first);
}

// ===========================================================================
// Report rendering
// ===========================================================================

#[test]
fn text_report_lists_queues_and_states() {
    let mut core = engine(4, 8);
    add(&mut core, "A", 0, 3, 1);
    add(&mut core, "B", 4, 2, 2);
    core.advance();

    let text = core.snapshot().to_string();
    let expected = "\
Time 0:
Queue 1 (Q=4): [A]
Queue 2 (Q=8): []
Queue 3 (P1): []
Queue 4 (P2): []
Queue 5 (P3): []
Terminated: []

Executing: A in Q1 (Remaining: 2)

Process States:
A: Q1, 2 units left
B: Arrives at 4, 2 units left
";
    assert_eq!(text, expected);
}
