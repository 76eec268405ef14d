//! Pomodoro daemon - a persistent work/break interval timer served over HTTP
//!
//! The library holds the phase state machine, the wall-clock arithmetic
//! that keeps it honest across pauses and host suspensions, and the
//! persistence that lets it resume exactly where it left off.

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use error::PomodoroError;
pub use state::AppState;
pub use utils::signals::shutdown_signal;
