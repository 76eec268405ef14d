//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};

use clap::Parser;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "pomodoro-daemon")]
#[command(about = "A persistent Pomodoro work/break timer served over HTTP")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Directory holding the persisted timer state
    #[arg(long)]
    pub state_dir: Option<PathBuf>,

    /// Keep state in memory only
    #[arg(long, conflicts_with = "state_dir")]
    pub ephemeral: bool,

    /// Poll interval of the running clock in milliseconds
    #[arg(long, default_value = "500", value_parser = clap::value_parser!(u64).range(100..=1000))]
    pub tick_ms: u64,

    /// Poll gap in seconds after which the host is assumed to have slept
    #[arg(long, default_value = "5")]
    pub resume_gap_secs: u64,

    /// Command used to play cue sounds, e.g. paplay
    #[arg(long)]
    pub cue_player: Option<String>,

    /// Sound played when a break hands over to work
    #[arg(long, default_value = "sounds/work_cue.mp3")]
    pub work_cue_sound: PathBuf,

    /// Sound played when work hands over to a break
    #[arg(long, default_value = "sounds/break_cue.mp3")]
    pub break_cue_sound: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// State directory, defaulting to the platform's local data directory
    pub fn state_dir(&self) -> PathBuf {
        self.state_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .map(|dir| dir.join("pomodoro"))
                .unwrap_or_else(|| PathBuf::from("."))
        })
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn resume_gap(&self) -> Duration {
        Duration::from_secs(self.resume_gap_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["pomodoro-daemon"]).unwrap();
        assert_eq!(config.address(), "127.0.0.1:20554");
        assert_eq!(config.tick(), Duration::from_millis(500));
        assert_eq!(config.resume_gap(), Duration::from_secs(5));
        assert_eq!(config.log_level(), "info");
        assert!(config.cue_player.is_none());
    }

    #[test]
    fn test_tick_range_is_enforced() {
        assert!(Config::try_parse_from(["pomodoro-daemon", "--tick-ms", "50"]).is_err());
        assert!(Config::try_parse_from(["pomodoro-daemon", "--tick-ms", "1000"]).is_ok());
    }

    #[test]
    fn test_explicit_state_dir() {
        let config =
            Config::try_parse_from(["pomodoro-daemon", "--state-dir", "/tmp/pomo", "-v"]).unwrap();
        assert_eq!(config.state_dir(), PathBuf::from("/tmp/pomo"));
        assert_eq!(config.log_level(), "debug");
        assert!(Config::try_parse_from(["pomodoro-daemon", "--state-dir", "/tmp", "--ephemeral"]).is_err());
    }
}
