//! State management module
//!
//! The phase clock and everything it is made of: phases, settings, the
//! persisted snapshot and the wall-clock arithmetic. `AppState` owns one
//! clock per process and connects it to the outside world.

pub mod app_state;
pub mod phase;
pub mod phase_clock;
pub mod settings;
pub mod snapshot;
pub mod status;
pub mod time_source;

// Re-export main types
pub use app_state::{AppState, Schedule, Services};
pub use phase::{Cue, PhaseState, Transition};
pub use phase_clock::{CatchUp, PhaseClock, PollOutcome};
pub use settings::{Settings, SettingsUpdate, Theme, ThemeUpdate};
pub use snapshot::{PersistedState, TimerSnapshot};
pub use status::{DisplayFrame, RepetitionOrdinal, StatusView};
pub use time_source::{SystemTimeSource, TimeSource};
