//! Phases of the work/break cycle and the cues emitted between them

use serde::{Deserialize, Serialize};

/// One of the five discrete modes of the cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PhaseState {
    #[default]
    Idle,
    Work,
    ShortBreak,
    LongBreak,
    Finished,
}

impl PhaseState {
    /// Work or either break, i.e. a phase with a timed period
    pub fn is_active(self) -> bool {
        matches!(self, Self::Work | Self::ShortBreak | Self::LongBreak)
    }

    pub fn is_break(self) -> bool {
        matches!(self, Self::ShortBreak | Self::LongBreak)
    }

    /// Human readable label, with the repetition ordinal during work
    pub fn label(self, repetition_index: u32, total_repetitions: u32) -> String {
        match self {
            Self::Idle => "Waiting".to_string(),
            Self::Work => format!("Work ({}/{})", repetition_index + 1, total_repetitions),
            Self::ShortBreak => "Short break".to_string(),
            Self::LongBreak => "Long break".to_string(),
            Self::Finished => "Completed".to_string(),
        }
    }
}

impl std::fmt::Display for PhaseState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Work => write!(f, "work"),
            Self::ShortBreak => write!(f, "short_break"),
            Self::LongBreak => write!(f, "long_break"),
            Self::Finished => write!(f, "finished"),
        }
    }
}

/// Audio/colour cue played when a period expires into the next one.
///
/// Each cue is keyed by the phase being entered: `WorkEnded` sounds when
/// a break hands over to work, `BreakEnded` when work hands over to a break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Cue {
    /// Entering a work period
    WorkEnded,
    /// Entering a short or long break
    BreakEnded,
}

impl Cue {
    /// Accent colour shown on the timer card while the cue is active
    pub fn accent_hex(self) -> &'static str {
        match self {
            Self::BreakEnded => "#8be28b",
            Self::WorkEnded => "#f28c8c",
        }
    }
}

/// A single expiry-driven phase change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: PhaseState,
    pub to: PhaseState,
    pub repetition_index: u32,
    pub cue: Option<Cue>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(PhaseState::Idle.label(0, 4), "Waiting");
        assert_eq!(PhaseState::Work.label(0, 4), "Work (1/4)");
        assert_eq!(PhaseState::Work.label(3, 4), "Work (4/4)");
        assert_eq!(PhaseState::LongBreak.label(4, 8), "Long break");
        assert_eq!(PhaseState::Finished.label(4, 4), "Completed");
    }

    #[test]
    fn test_serialized_names() {
        let json = serde_json::to_string(&PhaseState::ShortBreak).unwrap();
        assert_eq!(json, "\"shortBreak\"");
        let phase: PhaseState = serde_json::from_str("\"longBreak\"").unwrap();
        assert_eq!(phase, PhaseState::LongBreak);
    }

    #[test]
    fn test_break_accent_is_green() {
        assert_eq!(Cue::BreakEnded.accent_hex(), "#8be28b");
        assert_eq!(Cue::WorkEnded.accent_hex(), "#f28c8c");
    }

    #[test]
    fn test_active_phases() {
        assert!(!PhaseState::Idle.is_active());
        assert!(PhaseState::Work.is_active());
        assert!(PhaseState::ShortBreak.is_break());
        assert!(!PhaseState::Finished.is_active());
    }
}
