//! Persistable timer state and the on-disk blob that carries it

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{PhaseState, Settings, Theme};
use super::settings::{
    DEFAULT_CARD_OPACITY, DEFAULT_LONG_BREAK_SECONDS, DEFAULT_SHORT_BREAK_SECONDS,
    DEFAULT_TOTAL_REPETITIONS, DEFAULT_WORK_SECONDS,
};

/// Complete state of the phase clock at an instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub phase: PhaseState,
    pub remaining_seconds: u64,
    pub running: bool,
    pub repetition_index: u32,
    /// Set only while running; absent means `remaining_seconds` is authoritative
    pub period_end_epoch_millis: Option<i64>,
}

impl TimerSnapshot {
    /// Fresh idle state for the given settings
    pub fn idle(settings: &Settings) -> Self {
        Self {
            phase: PhaseState::Idle,
            remaining_seconds: settings.work_duration_seconds(),
            running: false,
            repetition_index: 0,
            period_end_epoch_millis: None,
        }
    }
}

/// The single blob stored in the persistence slot.
///
/// Fields missing from an older blob fall back to their defaults one by one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedState {
    pub phase: PhaseState,
    pub remaining_seconds: u64,
    pub running: bool,
    pub repetition_index: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_end_epoch_millis: Option<i64>,
    pub work_duration_seconds: i64,
    pub short_break_duration_seconds: i64,
    pub long_break_duration_seconds: i64,
    pub total_repetitions: i64,
    pub card_opacity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
}

impl PersistedState {
    pub fn new(snapshot: &TimerSnapshot, settings: &Settings, theme: &Theme) -> Self {
        Self {
            phase: snapshot.phase,
            remaining_seconds: snapshot.remaining_seconds,
            running: snapshot.running,
            repetition_index: snapshot.repetition_index,
            period_end_epoch_millis: snapshot.period_end_epoch_millis,
            work_duration_seconds: settings.work_duration_seconds() as i64,
            short_break_duration_seconds: settings.short_break_duration_seconds() as i64,
            long_break_duration_seconds: settings.long_break_duration_seconds() as i64,
            total_repetitions: i64::from(settings.total_repetitions()),
            card_opacity: theme.card_opacity,
            background_image: theme.background_image.clone(),
        }
    }

    /// Validated settings, or the defaults when the stored values are unusable
    pub fn settings(&self) -> Settings {
        Settings::new(
            self.work_duration_seconds,
            self.short_break_duration_seconds,
            self.long_break_duration_seconds,
            self.total_repetitions,
        )
        .unwrap_or_else(|e| {
            warn!("Discarding stored durations ({}), using defaults", e);
            Settings::default()
        })
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            phase: self.phase,
            remaining_seconds: self.remaining_seconds,
            running: self.running,
            repetition_index: self.repetition_index,
            period_end_epoch_millis: self.period_end_epoch_millis,
        }
    }

    pub fn theme(&self) -> Theme {
        Theme {
            card_opacity: self.card_opacity,
            background_image: self
                .background_image
                .clone()
                .filter(|image| !image.trim().is_empty()),
        }
        .sanitized()
    }
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            phase: PhaseState::Idle,
            remaining_seconds: DEFAULT_WORK_SECONDS,
            running: false,
            repetition_index: 0,
            period_end_epoch_millis: None,
            work_duration_seconds: DEFAULT_WORK_SECONDS as i64,
            short_break_duration_seconds: DEFAULT_SHORT_BREAK_SECONDS as i64,
            long_break_duration_seconds: DEFAULT_LONG_BREAK_SECONDS as i64,
            total_repetitions: i64::from(DEFAULT_TOTAL_REPETITIONS),
            card_opacity: DEFAULT_CARD_OPACITY,
            background_image: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_default_individually() {
        let blob = r#"{"phase":"shortBreak","remainingSeconds":42,"workDurationSeconds":600}"#;
        let state: PersistedState = serde_json::from_str(blob).unwrap();

        assert_eq!(state.phase, PhaseState::ShortBreak);
        assert_eq!(state.remaining_seconds, 42);
        assert!(!state.running);
        assert_eq!(state.period_end_epoch_millis, None);
        assert_eq!(state.settings().work_duration_seconds(), 600);
        assert_eq!(state.settings().short_break_duration_seconds(), DEFAULT_SHORT_BREAK_SECONDS);
        assert_eq!(state.theme(), Theme::default());
    }

    #[test]
    fn test_blob_field_names() {
        let settings = Settings::default();
        let snapshot = TimerSnapshot {
            phase: PhaseState::Work,
            remaining_seconds: 900,
            running: true,
            repetition_index: 2,
            period_end_epoch_millis: Some(1_700_000_900_000),
        };
        let value = serde_json::to_value(PersistedState::new(&snapshot, &settings, &Theme::default())).unwrap();

        assert_eq!(value["phase"], "work");
        assert_eq!(value["remainingSeconds"], 900);
        assert_eq!(value["repetitionIndex"], 2);
        assert_eq!(value["periodEndEpochMillis"], 1_700_000_900_000_i64);
        assert_eq!(value["totalRepetitions"], 4);
        assert!(value.get("backgroundImage").is_none());
    }

    #[test]
    fn test_invalid_stored_durations_fall_back() {
        let state = PersistedState {
            work_duration_seconds: 0,
            ..Default::default()
        };
        assert_eq!(state.settings(), Settings::default());
    }
}
