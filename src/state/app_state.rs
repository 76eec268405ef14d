//! Main application state: owns the phase clock and notifies collaborators

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::{
    Cue, DisplayFrame, PersistedState, PhaseClock, PhaseState, PollOutcome, Settings,
    SettingsUpdate, StatusView, Theme, ThemeUpdate, TimeSource,
};
use crate::{
    error::{PomodoroError, Result},
    services::{load_or_default, CueSink, DisplaySink, StateStore},
};

/// The run schedule the tick task follows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub generation: u64,
    pub running: bool,
}

impl Schedule {
    fn of(clock: &PhaseClock) -> Self {
        Self {
            generation: clock.generation(),
            running: clock.is_running(),
        }
    }
}

/// The collaborators an [`AppState`] is wired to
#[derive(Clone)]
pub struct Services {
    pub store: Arc<dyn StateStore>,
    pub display: Arc<dyn DisplaySink>,
    pub cue: Arc<dyn CueSink>,
    pub time: Arc<dyn TimeSource>,
}

#[derive(Debug)]
struct Session {
    clock: PhaseClock,
    theme: Theme,
    /// Cue whose accent colour is showing, until silenced
    accent: Option<Cue>,
    last_poll_at: Option<i64>,
}

/// Main application state shared by the API handlers and the tick task
pub struct AppState {
    session: Mutex<Session>,
    services: Services,
    /// Poll gaps longer than this are treated as a host suspension
    resume_gap_millis: i64,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
    /// Channel the tick task watches for schedule changes
    schedule_tx: watch::Sender<Schedule>,
    /// Keep the receiver alive to prevent channel closure
    _schedule_rx: watch::Receiver<Schedule>,
}

impl AppState {
    /// Create the state from whatever the store holds, catching up on any
    /// periods that elapsed while the daemon was not running
    pub fn new(port: u16, host: String, resume_gap: Duration, services: Services) -> Self {
        let persisted = load_or_default(services.store.as_ref());
        let now = services.time.now_millis();

        let (clock, skipped) = PhaseClock::restore(&persisted.snapshot(), persisted.settings(), now);
        if skipped > 0 {
            info!(
                "Skipped {} expired periods while stopped, resuming in {} ({}s left)",
                skipped,
                clock.phase(),
                clock.remaining_at(now)
            );
        } else {
            info!("Restored {} with {}s left", clock.phase(), clock.remaining_at(now));
        }

        let session = Session {
            clock,
            theme: persisted.theme(),
            accent: None,
            last_poll_at: None,
        };
        let (schedule_tx, schedule_rx) = watch::channel(Schedule::of(&session.clock));

        let state = Self {
            session: Mutex::new(session),
            services,
            resume_gap_millis: i64::try_from(resume_gap.as_millis()).unwrap_or(i64::MAX),
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
            schedule_tx,
            _schedule_rx: schedule_rx,
        };

        // only the final restored state is presented, without cues
        if let Ok(session) = state.lock_session() {
            state.persist(&session);
            state.render(&session, now);
        }
        state
    }

    /// Start a cycle or resume a paused period
    pub fn start(&self) -> Result<StatusView> {
        self.command("start", |session, now| session.clock.start(now))
    }

    /// Pause the running period
    pub fn pause(&self) -> Result<StatusView> {
        self.command("pause", |session, now| session.clock.pause(now))
    }

    /// Abandon the cycle and return to idle
    pub fn stop(&self) -> Result<StatusView> {
        self.command("stop", |session, _| {
            session.accent = None;
            session.clock.stop()
        })
    }

    /// Silence the phase-change cue without touching the clock
    pub fn stop_cue(&self) -> Result<StatusView> {
        self.services.cue.silence();
        let mut session = self.lock_session()?;
        session.accent = None;
        self.record_action("stop-cue");
        Ok(self.view(&session, self.services.time.now_millis()))
    }

    /// Apply a partial settings edit; rejected edits leave settings untouched
    pub fn update_settings(&self, update: &SettingsUpdate) -> Result<Settings> {
        let mut session = self.lock_session()?;
        let settings = session.clock.settings().apply(update)?;
        session.clock.update_settings(settings)?;

        info!(
            "Settings updated: work={}s short={}s long={}s repetitions={}",
            settings.work_duration_seconds(),
            settings.short_break_duration_seconds(),
            settings.long_break_duration_seconds(),
            settings.total_repetitions()
        );
        self.persist(&session);
        self.render(&session, self.services.time.now_millis());
        self.record_action("settings");
        Ok(settings)
    }

    /// Apply a partial theme edit
    pub fn update_theme(&self, update: &ThemeUpdate) -> Result<Theme> {
        let mut session = self.lock_session()?;
        session.theme = session.theme.apply(update)?;

        info!("Theme updated: opacity={}", session.theme.card_opacity);
        self.persist(&session);
        self.record_action("theme");
        Ok(session.theme.clone())
    }

    /// Remove the background image
    pub fn clear_background(&self) -> Result<Theme> {
        self.update_theme(&ThemeUpdate {
            background_image: Some(String::new()),
            ..Default::default()
        })
    }

    /// One poll of the tick task belonging to `generation`
    pub fn poll(&self, generation: u64) -> Result<()> {
        let mut session = self.lock_session()?;
        let now = self.services.time.now_millis();

        if session.clock.generation() != generation || !session.clock.is_running() {
            debug!("Ignoring stale poll for generation {}", generation);
            return Ok(());
        }

        let gap = session.last_poll_at.map_or(0, |last| now - last);
        session.last_poll_at = Some(now);

        if gap > self.resume_gap_millis {
            self.resume_after_gap(&mut session, generation, gap, now);
            return Ok(());
        }

        match session.clock.poll(generation, now) {
            PollOutcome::Stale => {}
            PollOutcome::Ticked => self.render(&session, now),
            PollOutcome::Expired(transition) => {
                info!(
                    "Period expired: {} -> {} (repetition {}/{})",
                    transition.from,
                    transition.to,
                    transition.repetition_index,
                    session.clock.settings().total_repetitions()
                );
                if let Some(cue) = transition.cue {
                    session.accent = Some(cue);
                    self.services.cue.play(cue);
                }
                if transition.to == PhaseState::Finished {
                    info!("Cycle complete, waiting for an explicit start");
                }

                if session.clock.generation() != generation {
                    self.reschedule(&session.clock);
                }
                self.persist(&session);
                self.render(&session, now);
            }
        }
        Ok(())
    }

    /// Current timer status
    pub fn status(&self) -> Result<StatusView> {
        let session = self.lock_session()?;
        Ok(self.view(&session, self.services.time.now_millis()))
    }

    pub fn settings(&self) -> Result<Settings> {
        Ok(*self.lock_session()?.clock.settings())
    }

    pub fn theme(&self) -> Result<Theme> {
        Ok(self.lock_session()?.theme.clone())
    }

    /// Write the current state to the store, e.g. on shutdown
    pub fn persist_now(&self) -> Result<()> {
        let session = self.lock_session()?;
        self.persist(&session);
        Ok(())
    }

    /// Subscribe to run schedule changes
    pub fn subscribe_schedule(&self) -> watch::Receiver<Schedule> {
        self.schedule_tx.subscribe()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    /// Run a user command against the clock; `apply` reports whether
    /// anything changed
    fn command<F>(&self, action: &str, apply: F) -> Result<StatusView>
    where
        F: FnOnce(&mut Session, i64) -> bool,
    {
        let mut session = self.lock_session()?;
        let now = self.services.time.now_millis();

        if apply(&mut session, now) {
            info!(
                "{}: {} with {}s left",
                action,
                session.clock.phase(),
                session.clock.remaining_at(now)
            );
            session.last_poll_at = Some(now);
            // cancel the current schedule before anything else observes the change
            self.reschedule(&session.clock);
            self.persist(&session);
            self.render(&session, now);
        } else {
            debug!("{} ignored, clock unchanged", action);
        }

        self.record_action(action);
        Ok(self.view(&session, now))
    }

    /// The host slept through one or more expiries: fast-forward to the
    /// current period. A single missed expiry still gets its cue; several
    /// are skipped silently.
    fn resume_after_gap(&self, session: &mut Session, generation: u64, gap: i64, now: i64) {
        let outcome = session.clock.catch_up(now);
        info!(
            "Resumed after a {}s gap, skipped {} expired periods",
            gap / 1000,
            outcome.skipped
        );

        if outcome.skipped > 0 {
            session.accent = None;
            if outcome.skipped == 1 {
                if let Some(cue) = outcome.last.and_then(|transition| transition.cue) {
                    session.accent = Some(cue);
                    self.services.cue.play(cue);
                }
            }
            if session.clock.generation() != generation {
                self.reschedule(&session.clock);
            }
            self.persist(session);
        }
        self.render(session, now);
    }

    fn reschedule(&self, clock: &PhaseClock) {
        if let Err(e) = self.schedule_tx.send(Schedule::of(clock)) {
            warn!("Failed to send schedule update: {}", e);
        }
    }

    /// Write failures only cost durability, so they are logged and dropped
    fn persist(&self, session: &Session) {
        let state = PersistedState::new(
            &session.clock.snapshot(),
            session.clock.settings(),
            &session.theme,
        );
        if let Err(e) = self.services.store.save(&state) {
            warn!("{}, continuing with in-memory state", e);
        }
    }

    fn render(&self, session: &Session, now: i64) {
        self.services
            .display
            .render(&DisplayFrame::from_clock(&session.clock, now));
    }

    fn view(&self, session: &Session, now: i64) -> StatusView {
        StatusView::new(&session.clock, session.accent, &session.theme, now)
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    fn lock_session(&self) -> Result<MutexGuard<'_, Session>> {
        self.session
            .lock()
            .map_err(|e| PomodoroError::StateLock(format!("session state: {}", e)))
    }
}
