//! Environment-based configuration.

use std::time::Duration;

use anyhow::{Context, Result};

use crate::service_day;

pub const DEFAULT_SERVICE_DAY_START: &str = "04:30:00";

#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the GTFS-RT feed to poll.
    pub feed_url: String,
    /// URL of the message-bus HTTP produce endpoint.
    pub publish_url: String,
    pub redis_url: String,
    pub poll_interval: Duration,
    /// Service-day boundary in seconds past midnight.
    pub service_day_start: u32,
    /// Optional CSV path for resolution-failure records.
    pub failure_log: Option<String>,
}

impl Config {
    /// Reads configuration from the environment (after `dotenvy` has loaded
    /// any `.env` file). `FEED_URL` and `PUBLISH_URL` are required; the rest
    /// have defaults.
    pub fn from_env() -> Result<Self> {
        let feed_url = std::env::var("FEED_URL").context("FEED_URL must be set")?;
        let publish_url = std::env::var("PUBLISH_URL").context("PUBLISH_URL must be set")?;
        let redis_url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1/".to_string());

        let poll_interval = std::env::var("POLL_INTERVAL_SECS")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .map(Duration::from_secs)
            .context("POLL_INTERVAL_SECS must be an integer number of seconds")?;

        let service_day_start = std::env::var("SERVICE_DAY_START")
            .unwrap_or_else(|_| DEFAULT_SERVICE_DAY_START.to_string());
        let service_day_start = service_day::parse_time(&service_day_start)
            .context("SERVICE_DAY_START must be HH:MM:SS")?;

        let failure_log = std::env::var("FAILURE_LOG").ok();

        Ok(Self {
            feed_url,
            publish_url,
            redis_url,
            poll_interval,
            service_day_start,
            failure_log,
        })
    }
}
