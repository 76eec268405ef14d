//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::{
    sync::{
        atomic::{AtomicI64, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use pomodoro_daemon::{
    services::{CueSink, DisplaySink, StateStore},
    state::{AppState, Cue, DisplayFrame, Services, TimeSource},
};

pub const T0: i64 = 1_700_000_000_000;

/// Wall clock moved by hand
#[derive(Debug)]
pub struct ManualTime(AtomicI64);

impl ManualTime {
    pub fn new(start: i64) -> Arc<Self> {
        Arc::new(Self(AtomicI64::new(start)))
    }

    pub fn advance_secs(&self, seconds: i64) {
        self.0.fetch_add(seconds * 1000, Ordering::SeqCst);
    }

    pub fn set(&self, millis: i64) {
        self.0.store(millis, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTime {
    fn now_millis(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Default)]
pub struct RecordingCue {
    pub played: Mutex<Vec<Cue>>,
    pub silenced: Mutex<usize>,
}

impl RecordingCue {
    pub fn played(&self) -> Vec<Cue> {
        self.played.lock().unwrap().clone()
    }
}

impl CueSink for RecordingCue {
    fn play(&self, cue: Cue) {
        self.played.lock().unwrap().push(cue);
    }

    fn silence(&self) {
        *self.silenced.lock().unwrap() += 1;
    }
}

#[derive(Debug, Default)]
pub struct RecordingDisplay {
    pub frames: Mutex<Vec<DisplayFrame>>,
}

impl RecordingDisplay {
    pub fn frames(&self) -> Vec<DisplayFrame> {
        self.frames.lock().unwrap().clone()
    }
}

impl DisplaySink for RecordingDisplay {
    fn render(&self, frame: &DisplayFrame) {
        self.frames.lock().unwrap().push(frame.clone());
    }
}

pub struct Harness {
    pub state: Arc<AppState>,
    pub time: Arc<ManualTime>,
    pub cue: Arc<RecordingCue>,
    pub display: Arc<RecordingDisplay>,
}

/// App state over the given store with manual time starting at `start`
pub fn harness(store: Arc<dyn StateStore>, start: i64) -> Harness {
    let time = ManualTime::new(start);
    let cue = Arc::new(RecordingCue::default());
    let display = Arc::new(RecordingDisplay::default());

    let state = Arc::new(AppState::new(
        20554,
        "127.0.0.1".to_string(),
        Duration::from_secs(5),
        Services {
            store,
            display: display.clone(),
            cue: cue.clone(),
            time: time.clone(),
        },
    ));

    Harness {
        state,
        time,
        cue,
        display,
    }
}
