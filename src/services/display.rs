//! Display sink: where rendered frames go

use tracing::debug;

use crate::state::DisplayFrame;

/// Receives a frame on every tick and every transition.
///
/// Called while the session lock is held, so implementations must not block.
pub trait DisplaySink: Send + Sync {
    fn render(&self, frame: &DisplayFrame);
}

/// Writes frames to the log at debug level
#[derive(Debug, Default)]
pub struct TracingDisplay;

impl DisplaySink for TracingDisplay {
    fn render(&self, frame: &DisplayFrame) {
        debug!("{} {}", frame.phase_label, frame.clock_face);
    }
}
