use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::level::Level;

pub const DEFAULT_SERVER: &str = "http://127.0.0.1:5000";
pub const DEFAULT_LOG_FILE: &str = "./log-dashboard.log";

/// Terminal dashboard for a log-monitoring server.
#[derive(Parser, Debug, Clone)]
#[command(name = "log-dashboard", version, about)]
pub struct Config {
    /// Base URL of the log-monitoring server
    #[arg(long, env = "LOG_DASHBOARD_SERVER", default_value = DEFAULT_SERVER)]
    pub server: String,

    /// Initial severity filter for the log table (INFO, WARNING, ERROR, DEBUG)
    #[arg(long)]
    pub level: Option<Level>,

    /// Upload this log file right after start
    #[arg(long, value_name = "PATH")]
    pub upload: Option<PathBuf>,

    /// Re-run the full refresh every N seconds
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_interval: Option<u64>,

    /// Where diagnostic logs are written (the terminal belongs to the UI)
    #[arg(long, env = "LOG_DASHBOARD_LOG_FILE", default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// Redraw tick in milliseconds
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u64).range(10..))]
    pub tick_ms: u64,
}

impl Config {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn poll(&self) -> Option<Duration> {
        self.poll_interval.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["log-dashboard"]).unwrap();
        assert_eq!(config.level, None);
        assert_eq!(config.tick(), Duration::from_millis(100));
        assert_eq!(config.poll(), None);
    }

    #[test]
    fn parses_level_and_poll() {
        let config = Config::try_parse_from([
            "log-dashboard",
            "--server",
            "http://logs.internal:8080",
            "--level",
            "error",
            "--poll-interval",
            "30",
        ])
        .unwrap();
        assert_eq!(config.server, "http://logs.internal:8080");
        assert_eq!(config.level, Some(Level::Error));
        assert_eq!(config.poll(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn rejects_unknown_level() {
        assert!(Config::try_parse_from(["log-dashboard", "--level", "TRACE"]).is_err());
    }

    #[test]
    fn rejects_zero_poll_interval() {
        assert!(Config::try_parse_from(["log-dashboard", "--poll-interval", "0"]).is_err());
    }
}
