//! Audio cue sinks played on phase changes

use std::{
    path::PathBuf,
    process::Stdio,
    sync::Mutex,
};
use tokio::{
    process::{Child, Command},
    runtime::Handle,
};
use tracing::{debug, info, warn};

use crate::state::Cue;

/// Plays the cue for a phase change; must be interruptible
pub trait CueSink: Send + Sync {
    fn play(&self, cue: Cue);

    /// Silence whatever is playing, leaving the clock untouched
    fn silence(&self);
}

/// Only logs cues, for hosts without a sound player
#[derive(Debug, Default)]
pub struct LogCueSink;

impl CueSink for LogCueSink {
    fn play(&self, cue: Cue) {
        info!("Cue: {:?}", cue);
    }

    fn silence(&self) {
        debug!("Cue silenced");
    }
}

/// Plays sound files through an external player command
#[derive(Debug)]
pub struct CommandCueSink {
    player: String,
    work_cue_sound: PathBuf,
    break_cue_sound: PathBuf,
    playing: Mutex<Option<Child>>,
}

impl CommandCueSink {
    pub fn new(player: String, work_cue_sound: PathBuf, break_cue_sound: PathBuf) -> Self {
        Self {
            player,
            work_cue_sound,
            break_cue_sound,
            playing: Mutex::new(None),
        }
    }

    fn sound_for(&self, cue: Cue) -> &PathBuf {
        match cue {
            Cue::WorkEnded => &self.work_cue_sound,
            Cue::BreakEnded => &self.break_cue_sound,
        }
    }

    /// Whether a cue is still sounding. A player that already exited is
    /// reaped and no longer counts.
    pub fn is_playing(&self) -> bool {
        match self.playing.lock() {
            Ok(mut playing) => {
                Self::reap_finished(&mut playing);
                playing.is_some()
            }
            Err(e) => {
                warn!("Failed to lock cue player: {}", e);
                false
            }
        }
    }

    fn reap_finished(playing: &mut Option<Child>) {
        let Some(child) = playing.as_mut() else {
            return;
        };
        match child.try_wait() {
            Ok(Some(status)) => {
                debug!("Cue player exited with {}", status);
                *playing = None;
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Failed to poll cue player: {}", e);
                *playing = None;
            }
        }
    }

    fn kill_current(playing: &mut Option<Child>) {
        if let Some(mut child) = playing.take() {
            // fails harmlessly when the sound already finished
            if let Err(e) = child.start_kill() {
                debug!("Cue player already exited: {}", e);
            }
        }
    }
}

impl CueSink for CommandCueSink {
    fn play(&self, cue: Cue) {
        if Handle::try_current().is_err() {
            warn!("No async runtime available, skipping cue {:?}", cue);
            return;
        }

        let mut playing = match self.playing.lock() {
            Ok(playing) => playing,
            Err(e) => {
                warn!("Failed to lock cue player: {}", e);
                return;
            }
        };
        Self::reap_finished(&mut playing);
        Self::kill_current(&mut playing);

        let sound = self.sound_for(cue);
        debug!("Playing {:?} with {} {}", cue, self.player, sound.display());

        match Command::new(&self.player)
            .arg(sound)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => *playing = Some(child),
            Err(e) => warn!("Failed to start cue player {}: {}", self.player, e),
        }
    }

    fn silence(&self) {
        match self.playing.lock() {
            Ok(mut playing) => Self::kill_current(&mut playing),
            Err(e) => warn!("Failed to lock cue player: {}", e),
        }
    }
}
