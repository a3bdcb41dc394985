use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Default)]
pub struct Config {
    /// How often the scheduler task runs a pass. Defaults to once a day.
    pub poll_interval: Duration,
    pub db_url: String,
    pub db_path: String,
    pub logs_path: PathBuf,
    /// Run a single pass, print the summary JSON to stdout, and exit.
    /// This is the shape an external cron trigger invokes.
    pub run_once: bool,
}

impl Config {
    pub fn new() -> Self {
        Self {
            poll_interval: std::env::var("POLL_INTERVAL")
                .unwrap_or("86400".to_string())
                .parse::<u32>()
                .map_or(Duration::new(86400, 0), |v| Duration::new(v.into(), 0)),
            db_url: std::env::var("DB_URL").unwrap_or("sqlite://data.db".to_string()),
            db_path: std::env::var("DB_PATH").unwrap_or("data.db".to_string()),
            logs_path: std::env::var("LOGS_PATH").unwrap_or("logs".to_string()).into(),
            run_once: std::env::var("RUN_ONCE")
                .is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true")),
        }
    }
}
