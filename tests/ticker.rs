//! The tick task driving the clock, under paused tokio time

mod common;

use std::{sync::Arc, time::Duration};

use common::{harness, Harness, T0};
use pomodoro_daemon::{
    services::MemoryStore,
    state::{Cue, PhaseState, SettingsUpdate},
    tasks::phase_ticker_task,
};

fn spawn_ticker(total_repetitions: i64) -> Harness {
    let h = harness(Arc::new(MemoryStore::new()), T0);
    h.state
        .update_settings(&SettingsUpdate {
            work_duration_seconds: Some(30),
            short_break_duration_seconds: Some(5),
            long_break_duration_seconds: Some(15),
            total_repetitions: Some(total_repetitions),
        })
        .unwrap();
    tokio::spawn(phase_ticker_task(Arc::clone(&h.state), Duration::from_millis(500)));
    h
}

/// Advance the wall clock one second at a time, letting the ticker poll
async fn run_for(h: &Harness, seconds: i64) {
    for _ in 0..seconds {
        h.time.advance_secs(1);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_ticker_drives_a_full_cycle() {
    let h = spawn_ticker(2);
    h.state.start().unwrap();

    run_for(&h, 30).await;
    let status = h.state.status().unwrap();
    assert_eq!(status.frame.phase, PhaseState::ShortBreak);
    assert_eq!(status.frame.remaining_seconds, 5);
    assert_eq!(h.cue.played(), vec![Cue::BreakEnded]);

    run_for(&h, 5).await;
    let status = h.state.status().unwrap();
    assert_eq!(status.frame.phase, PhaseState::Work);
    assert_eq!(status.repetition_index, 1);
    assert_eq!(h.cue.played(), vec![Cue::BreakEnded, Cue::WorkEnded]);

    run_for(&h, 30).await;
    let status = h.state.status().unwrap();
    assert_eq!(status.frame.phase, PhaseState::Finished);
    assert_eq!(status.frame.remaining_seconds, 0);
    assert!(!status.running);

    // no auto-restart after the cycle completes
    run_for(&h, 60).await;
    assert_eq!(h.state.status().unwrap().frame.phase, PhaseState::Finished);
    assert_eq!(h.cue.played().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_paused_clock_is_not_polled() {
    let h = spawn_ticker(4);
    h.state.start().unwrap();
    run_for(&h, 10).await;
    h.state.pause().unwrap();

    h.time.advance_secs(1_000);
    tokio::time::sleep(Duration::from_secs(5)).await;

    let status = h.state.status().unwrap();
    assert_eq!(status.frame.phase, PhaseState::Work);
    assert_eq!(status.frame.remaining_seconds, 20);
    assert!(h.cue.played().is_empty());

    h.state.start().unwrap();
    run_for(&h, 20).await;
    assert_eq!(h.state.status().unwrap().frame.phase, PhaseState::ShortBreak);
    assert_eq!(h.cue.played(), vec![Cue::BreakEnded]);
}

#[tokio::test(start_paused = true)]
async fn test_host_sleep_is_caught_up_without_cues() {
    let h = spawn_ticker(4);
    h.state.start().unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;

    h.time.advance_secs(95);
    tokio::time::sleep(Duration::from_secs(1)).await;

    let status = h.state.status().unwrap();
    assert_eq!(status.frame.phase, PhaseState::Work);
    assert_eq!(status.repetition_index, 2);
    assert!(h.cue.played().is_empty());

    run_for(&h, 5).await;
    assert_eq!(h.state.status().unwrap().frame.phase, PhaseState::ShortBreak);
    assert_eq!(h.cue.played(), vec![Cue::BreakEnded]);
}

#[tokio::test(start_paused = true)]
async fn test_stop_cancels_polling() {
    let h = spawn_ticker(4);
    h.state.start().unwrap();
    run_for(&h, 3).await;
    h.state.stop().unwrap();

    run_for(&h, 60).await;
    let status = h.state.status().unwrap();
    assert_eq!(status.frame.phase, PhaseState::Idle);
    assert_eq!(status.frame.remaining_seconds, 30);
    assert!(h.cue.played().is_empty());
}
