//! User-editable durations and visual theme

use serde::{Deserialize, Serialize};

use crate::error::{PomodoroError, Result};

pub const DEFAULT_WORK_SECONDS: u64 = 25 * 60;
pub const DEFAULT_SHORT_BREAK_SECONDS: u64 = 5 * 60;
pub const DEFAULT_LONG_BREAK_SECONDS: u64 = 20 * 60;
pub const DEFAULT_TOTAL_REPETITIONS: u32 = 4;
pub const DEFAULT_CARD_OPACITY: f64 = 0.6;

/// Period durations and cycle length.
///
/// Only constructible through validation, so every value held by the
/// clock is positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    work_duration_seconds: u64,
    short_break_duration_seconds: u64,
    long_break_duration_seconds: u64,
    total_repetitions: u32,
}

impl Settings {
    /// Validate raw values, rejecting anything non-positive
    pub fn new(work: i64, short_break: i64, long_break: i64, total_repetitions: i64) -> Result<Self> {
        Ok(Self {
            work_duration_seconds: positive("workDurationSeconds", work)?,
            short_break_duration_seconds: positive("shortBreakDurationSeconds", short_break)?,
            long_break_duration_seconds: positive("longBreakDurationSeconds", long_break)?,
            total_repetitions: u32::try_from(positive("totalRepetitions", total_repetitions)?)
                .map_err(|_| PomodoroError::invalid("totalRepetitions is too large"))?,
        })
    }

    pub fn work_duration_seconds(&self) -> u64 {
        self.work_duration_seconds
    }

    pub fn short_break_duration_seconds(&self) -> u64 {
        self.short_break_duration_seconds
    }

    pub fn long_break_duration_seconds(&self) -> u64 {
        self.long_break_duration_seconds
    }

    pub fn total_repetitions(&self) -> u32 {
        self.total_repetitions
    }

    /// Apply a partial edit, validating the merged result as a whole
    pub fn apply(&self, update: &SettingsUpdate) -> Result<Self> {
        Self::new(
            update.work_duration_seconds.unwrap_or(self.work_duration_seconds as i64),
            update
                .short_break_duration_seconds
                .unwrap_or(self.short_break_duration_seconds as i64),
            update
                .long_break_duration_seconds
                .unwrap_or(self.long_break_duration_seconds as i64),
            update.total_repetitions.unwrap_or(i64::from(self.total_repetitions)),
        )
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            work_duration_seconds: DEFAULT_WORK_SECONDS,
            short_break_duration_seconds: DEFAULT_SHORT_BREAK_SECONDS,
            long_break_duration_seconds: DEFAULT_LONG_BREAK_SECONDS,
            total_repetitions: DEFAULT_TOTAL_REPETITIONS,
        }
    }
}

fn positive(field: &str, value: i64) -> Result<u64> {
    if value <= 0 {
        return Err(PomodoroError::invalid(format!(
            "{} must be a positive integer, got {}",
            field, value
        )));
    }
    Ok(value as u64)
}

/// Partial settings edit as received from a client
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub work_duration_seconds: Option<i64>,
    pub short_break_duration_seconds: Option<i64>,
    pub long_break_duration_seconds: Option<i64>,
    pub total_repetitions: Option<i64>,
}

/// Persisted look of the timer card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub card_opacity: f64,
    pub background_image: Option<String>,
}

impl Theme {
    /// Apply a partial edit; an empty background string clears the image
    pub fn apply(&self, update: &ThemeUpdate) -> Result<Self> {
        let card_opacity = update.card_opacity.unwrap_or(self.card_opacity);
        if !(0.0..=1.0).contains(&card_opacity) {
            return Err(PomodoroError::invalid(format!(
                "cardOpacity must be between 0 and 1, got {}",
                card_opacity
            )));
        }

        let background_image = match &update.background_image {
            Some(image) if image.trim().is_empty() => None,
            Some(image) => Some(image.clone()),
            None => self.background_image.clone(),
        };

        Ok(Self {
            card_opacity,
            background_image,
        })
    }

    /// Opacity as restored from storage, reset when out of range
    pub fn sanitized(self) -> Self {
        if (0.0..=1.0).contains(&self.card_opacity) {
            self
        } else {
            Self {
                card_opacity: DEFAULT_CARD_OPACITY,
                ..self
            }
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            card_opacity: DEFAULT_CARD_OPACITY,
            background_image: None,
        }
    }
}

/// Partial theme edit as received from a client
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeUpdate {
    pub card_opacity: Option<f64>,
    pub background_image: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_positive_values() {
        assert!(Settings::new(0, 300, 1200, 4).is_err());
        assert!(Settings::new(1500, -1, 1200, 4).is_err());
        assert!(Settings::new(1500, 300, 1200, 0).is_err());
        assert!(Settings::new(1500, 300, 1200, 4).is_ok());
    }

    #[test]
    fn test_partial_update_keeps_other_fields() {
        let settings = Settings::default();
        let updated = settings
            .apply(&SettingsUpdate {
                short_break_duration_seconds: Some(120),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(updated.short_break_duration_seconds(), 120);
        assert_eq!(updated.work_duration_seconds(), DEFAULT_WORK_SECONDS);
        assert_eq!(updated.total_repetitions(), DEFAULT_TOTAL_REPETITIONS);
    }

    #[test]
    fn test_rejected_update_reports_field() {
        let err = Settings::default()
            .apply(&SettingsUpdate {
                total_repetitions: Some(0),
                ..Default::default()
            })
            .unwrap_err();

        assert!(matches!(err, PomodoroError::InvalidConfiguration(_)));
        assert!(err.to_string().contains("totalRepetitions"));
    }

    #[test]
    fn test_theme_update() {
        let theme = Theme::default()
            .apply(&ThemeUpdate {
                card_opacity: Some(0.3),
                background_image: Some("/home/me/forest.jpg".to_string()),
            })
            .unwrap();
        assert_eq!(theme.card_opacity, 0.3);
        assert_eq!(theme.background_image.as_deref(), Some("/home/me/forest.jpg"));

        let cleared = theme
            .apply(&ThemeUpdate {
                background_image: Some(String::new()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(cleared.background_image, None);
        assert_eq!(cleared.card_opacity, 0.3);

        assert!(Theme::default()
            .apply(&ThemeUpdate {
                card_opacity: Some(1.5),
                ..Default::default()
            })
            .is_err());
    }
}
