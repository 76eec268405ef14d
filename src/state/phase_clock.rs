//! The authoritative work/break state machine

use tracing::{debug, warn};

use super::time_source::{period_end, remaining_seconds, seconds_to_millis};
use super::{Cue, PhaseState, Settings, TimerSnapshot, Transition};
use crate::error::{PomodoroError, Result};

/// A long break follows every this many completed work periods
pub const LONG_BREAK_EVERY: u32 = 4;

/// Result of a single poll of a running clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The poll belongs to a cancelled schedule, or the clock is not running
    Stale,
    /// Remaining time was refreshed, the period is still in progress
    Ticked,
    /// The period expired and exactly one transition was applied
    Expired(Transition),
}

/// Result of fast-forwarding a running clock
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatchUp {
    /// Number of expiries applied
    pub skipped: u32,
    /// The last expiry applied
    pub last: Option<Transition>,
}

/// Phase, remaining time and repetition counter of one session.
///
/// While running, the absolute period end is authoritative and
/// `remaining_seconds` is only a cache refreshed by polls; while paused
/// or idle, `remaining_seconds` is authoritative and there is no end.
#[derive(Debug, Clone)]
pub struct PhaseClock {
    settings: Settings,
    phase: PhaseState,
    remaining_seconds: u64,
    running: bool,
    repetition_index: u32,
    period_end: Option<i64>,
    /// Bumped whenever the run schedule changes, invalidating late polls
    generation: u64,
}

impl PhaseClock {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            phase: PhaseState::Idle,
            remaining_seconds: settings.work_duration_seconds(),
            running: false,
            repetition_index: 0,
            period_end: None,
            generation: 0,
        }
    }

    /// Rebuild a clock from a persisted snapshot, fast-forwarding through any
    /// periods that expired while nothing was observing it.
    ///
    /// Returns the clock and the number of expiries that were skipped.
    pub fn restore(snapshot: &TimerSnapshot, settings: Settings, now_millis: i64) -> (Self, u32) {
        let mut clock = Self::new(settings);
        let total = settings.total_repetitions();

        match snapshot.phase {
            PhaseState::Idle => {}
            PhaseState::Finished => {
                clock.phase = PhaseState::Finished;
                clock.remaining_seconds = 0;
                clock.repetition_index = snapshot.repetition_index.min(total);
            }
            phase if snapshot.repetition_index >= total => {
                warn!(
                    "Restored {} at repetition {} of {}, treating cycle as finished",
                    phase, snapshot.repetition_index, total
                );
                clock.phase = PhaseState::Finished;
                clock.remaining_seconds = 0;
                clock.repetition_index = total;
            }
            phase => {
                clock.phase = phase;
                clock.repetition_index = snapshot.repetition_index;
                clock.remaining_seconds = snapshot.remaining_seconds;

                match (snapshot.running, snapshot.period_end_epoch_millis) {
                    (true, Some(end)) => {
                        clock.running = true;
                        clock.period_end = Some(end);
                        clock.generation = 1;
                        let skipped = clock.catch_up(now_millis).skipped;
                        return (clock, skipped);
                    }
                    (true, None) => {
                        warn!("Restored a running {} period without an end timestamp, pausing it", phase);
                    }
                    _ => {}
                }
            }
        }

        (clock, 0)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn phase(&self) -> PhaseState {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn repetition_index(&self) -> u32 {
        self.repetition_index
    }

    pub fn period_end(&self) -> Option<i64> {
        self.period_end
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Remaining whole seconds as of `now_millis`, without mutating the clock
    pub fn remaining_at(&self, now_millis: i64) -> u64 {
        match (self.running, self.period_end) {
            (true, Some(end)) => remaining_seconds(end, now_millis),
            _ => self.remaining_seconds,
        }
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            phase: self.phase,
            remaining_seconds: self.remaining_seconds,
            running: self.running,
            repetition_index: self.repetition_index,
            period_end_epoch_millis: self.period_end,
        }
    }

    /// Start a new cycle from idle/finished, or resume a paused period.
    ///
    /// Returns false when the clock was already running.
    pub fn start(&mut self, now_millis: i64) -> bool {
        if self.running {
            return false;
        }

        if matches!(self.phase, PhaseState::Idle | PhaseState::Finished) {
            self.phase = PhaseState::Work;
            self.repetition_index = 0;
            self.remaining_seconds = self.settings.work_duration_seconds();
        }

        self.running = true;
        self.period_end = Some(period_end(now_millis, self.remaining_seconds));
        self.generation += 1;
        true
    }

    /// Freeze the current period. Returns false when it was not running.
    pub fn pause(&mut self, now_millis: i64) -> bool {
        if !self.running {
            return false;
        }

        if let Some(end) = self.period_end {
            self.remaining_seconds = remaining_seconds(end, now_millis);
        }
        self.running = false;
        self.period_end = None;
        self.generation += 1;
        true
    }

    /// Return to idle. Returns false when already idle.
    pub fn stop(&mut self) -> bool {
        let changed = self.phase != PhaseState::Idle || self.running;

        self.phase = PhaseState::Idle;
        self.repetition_index = 0;
        self.remaining_seconds = self.settings.work_duration_seconds();
        self.running = false;
        self.period_end = None;
        self.generation += 1;
        changed
    }

    /// Replace the durations. The active period keeps its remaining time;
    /// only later periods use the new values.
    pub fn update_settings(&mut self, settings: Settings) -> Result<()> {
        if self.phase.is_active() && settings.total_repetitions() <= self.repetition_index {
            return Err(PomodoroError::invalid(format!(
                "totalRepetitions {} does not exceed the {} repetitions already completed",
                settings.total_repetitions(),
                self.repetition_index
            )));
        }

        self.settings = settings;
        match self.phase {
            PhaseState::Idle => self.remaining_seconds = settings.work_duration_seconds(),
            PhaseState::Finished => {
                self.repetition_index = self.repetition_index.min(settings.total_repetitions())
            }
            _ => {}
        }
        Ok(())
    }

    /// Refresh remaining time from the wall clock and apply at most one
    /// expiry. Polls carrying an outdated generation are ignored.
    pub fn poll(&mut self, generation: u64, now_millis: i64) -> PollOutcome {
        if generation != self.generation || !self.running {
            return PollOutcome::Stale;
        }
        let Some(end) = self.period_end else {
            return PollOutcome::Stale;
        };

        self.remaining_seconds = remaining_seconds(end, now_millis);
        if self.remaining_seconds > 0 {
            return PollOutcome::Ticked;
        }

        match self.advance() {
            Some(transition) => {
                if self.running {
                    self.period_end = Some(period_end(now_millis, self.remaining_seconds));
                }
                PollOutcome::Expired(transition)
            }
            None => PollOutcome::Stale,
        }
    }

    /// Walk through every period that fully elapsed before `now_millis`,
    /// carrying the overrun into the next one. Cues of skipped periods are
    /// dropped; only the resulting state matters.
    pub fn catch_up(&mut self, now_millis: i64) -> CatchUp {
        let mut outcome = CatchUp::default();
        let (true, Some(end)) = (self.running, self.period_end) else {
            return outcome;
        };

        if now_millis < end {
            self.remaining_seconds = remaining_seconds(end, now_millis);
            return outcome;
        }

        let mut overrun = now_millis.saturating_sub(end);
        while let Some(transition) = self.advance() {
            outcome.skipped = outcome.skipped.saturating_add(1);
            outcome.last = Some(transition);
            debug!("Catch-up skipped {} -> {}", transition.from, transition.to);

            if !self.running {
                break;
            }

            let (left, blocks) = self.skip_blocks(overrun);
            if blocks > 0 {
                overrun = left;
                let periods = u32::try_from(blocks.saturating_mul(2 * u64::from(LONG_BREAK_EVERY)))
                    .unwrap_or(u32::MAX);
                outcome.skipped = outcome.skipped.saturating_add(periods);
                outcome.last = Some(Transition {
                    from: PhaseState::LongBreak,
                    to: PhaseState::Work,
                    repetition_index: self.repetition_index,
                    cue: Some(Cue::WorkEnded),
                });
            }

            let duration = seconds_to_millis(self.remaining_seconds);
            if overrun < duration {
                let end = now_millis.saturating_add(duration - overrun);
                self.period_end = Some(end);
                self.remaining_seconds = remaining_seconds(end, now_millis);
                break;
            }
            overrun -= duration;
        }
        outcome
    }

    /// Jump over whole work/break blocks from the start of a work period
    /// that opens a block, keeping at least one work period before the
    /// cycle completes. Returns the overrun left and the blocks skipped.
    fn skip_blocks(&mut self, overrun: i64) -> (i64, u64) {
        let total = self.settings.total_repetitions();
        if self.phase != PhaseState::Work
            || self.repetition_index % LONG_BREAK_EVERY != 0
            || self.repetition_index >= total
        {
            return (overrun, 0);
        }

        let every = i64::from(LONG_BREAK_EVERY);
        let block = seconds_to_millis(self.settings.work_duration_seconds())
            .saturating_mul(every)
            .saturating_add(
                seconds_to_millis(self.settings.short_break_duration_seconds())
                    .saturating_mul(every - 1),
            )
            .saturating_add(seconds_to_millis(self.settings.long_break_duration_seconds()));
        if block <= 0 {
            return (overrun, 0);
        }

        let room = i64::from((total - 1 - self.repetition_index) / LONG_BREAK_EVERY);
        let blocks = (overrun / block).min(room);
        if blocks <= 0 {
            return (overrun, 0);
        }

        // blocks <= room, so the new index stays below the total
        self.repetition_index += LONG_BREAK_EVERY * blocks as u32;
        self.remaining_seconds = self.settings.work_duration_seconds();
        (overrun - blocks * block, blocks as u64)
    }

    /// Apply the expiry transition of the current phase
    fn advance(&mut self) -> Option<Transition> {
        let from = self.phase;
        let cue = match self.phase {
            PhaseState::Work => {
                self.repetition_index += 1;

                // completion takes precedence over break selection
                if self.repetition_index >= self.settings.total_repetitions() {
                    self.finish();
                    return Some(Transition {
                        from,
                        to: PhaseState::Finished,
                        repetition_index: self.repetition_index,
                        cue: None,
                    });
                }

                if self.repetition_index % LONG_BREAK_EVERY == 0 {
                    self.phase = PhaseState::LongBreak;
                    self.remaining_seconds = self.settings.long_break_duration_seconds();
                } else {
                    self.phase = PhaseState::ShortBreak;
                    self.remaining_seconds = self.settings.short_break_duration_seconds();
                }
                Cue::BreakEnded
            }
            PhaseState::ShortBreak | PhaseState::LongBreak => {
                self.phase = PhaseState::Work;
                self.remaining_seconds = self.settings.work_duration_seconds();
                Cue::WorkEnded
            }
            PhaseState::Idle | PhaseState::Finished => return None,
        };

        Some(Transition {
            from,
            to: self.phase,
            repetition_index: self.repetition_index,
            cue: Some(cue),
        })
    }

    fn finish(&mut self) {
        self.phase = PhaseState::Finished;
        self.remaining_seconds = 0;
        self.running = false;
        self.period_end = None;
        self.generation += 1;
    }
}
