//! External collaborators of the timer
//!
//! The display sink, the audio cue sink and the persistence store. The phase
//! clock never talks to any of them directly; `AppState` notifies them.

pub mod audio_cue;
pub mod display;
pub mod store;

// Re-export main types
pub use audio_cue::{CommandCueSink, CueSink, LogCueSink};
pub use display::{DisplaySink, TracingDisplay};
pub use store::{load_or_default, FileStore, MemoryStore, StateStore, STATE_KEY};
