//! Background tasks module
//!
//! This module contains background tasks that run alongside the HTTP server.

pub mod phase_ticker;

// Re-export main functions
pub use phase_ticker::phase_ticker_task;
