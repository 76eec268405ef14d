//! Read-only views of the clock handed to the display and to API clients

use serde::Serialize;

use super::{Cue, PhaseClock, PhaseState, Theme};
use crate::utils::format::{clock_face, rgba};

/// Repetition ordinal shown during work, e.g. 2 of 4
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RepetitionOrdinal {
    pub ordinal: u32,
    pub total: u32,
}

/// What the display sink renders on every tick and transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayFrame {
    pub phase: PhaseState,
    pub phase_label: String,
    pub remaining_seconds: u64,
    /// Remaining time as `MM:SS`
    pub clock_face: String,
    pub repetition: Option<RepetitionOrdinal>,
}

impl DisplayFrame {
    pub fn from_clock(clock: &PhaseClock, now_millis: i64) -> Self {
        let phase = clock.phase();
        let total = clock.settings().total_repetitions();
        let remaining_seconds = clock.remaining_at(now_millis);

        Self {
            phase,
            phase_label: phase.label(clock.repetition_index(), total),
            remaining_seconds,
            clock_face: clock_face(remaining_seconds),
            repetition: (phase == PhaseState::Work).then(|| RepetitionOrdinal {
                ordinal: clock.repetition_index() + 1,
                total,
            }),
        }
    }
}

/// Full timer status returned by the API
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusView {
    #[serde(flatten)]
    pub frame: DisplayFrame,
    pub running: bool,
    pub repetition_index: u32,
    pub total_repetitions: u32,
    pub period_end_epoch_millis: Option<i64>,
    /// Card colour while a phase-change cue is active
    pub accent: Option<String>,
}

impl StatusView {
    pub fn new(clock: &PhaseClock, accent: Option<Cue>, theme: &Theme, now_millis: i64) -> Self {
        Self {
            frame: DisplayFrame::from_clock(clock, now_millis),
            running: clock.is_running(),
            repetition_index: clock.repetition_index(),
            total_repetitions: clock.settings().total_repetitions(),
            period_end_epoch_millis: clock.period_end(),
            accent: accent.and_then(|cue| rgba(cue.accent_hex(), theme.card_opacity)),
        }
    }
}
