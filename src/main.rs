//! CLI entry point for the trip cancellation source.
//!
//! Bridges a GTFS-RT feed onto the internal message bus: `run` polls the
//! configured feed on a fixed interval and publishes resolved cancellations;
//! `inspect` decodes a single snapshot and prints the cancellations it would
//! act on, without touching the cache or the bus.

use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use trip_cancellation_source::cache::{RedisTripCache, format_jore_key};
use trip_cancellation_source::config::{Config, DEFAULT_SERVICE_DAY_START};
use trip_cancellation_source::fetch::{BasicClient, HttpFeedSource, fetch_bytes};
use trip_cancellation_source::gtfs_rt::trip_descriptor::ScheduleRelationship;
use trip_cancellation_source::output::append_failures;
use trip_cancellation_source::parser::{extract_trip_updates, parse_feed};
use trip_cancellation_source::poller::Poller;
use trip_cancellation_source::publish::HttpPublisher;
use trip_cancellation_source::service_day;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Parser)]
#[command(name = "trip_cancellation_source")]
#[command(about = "Publishes trip cancellations from a GTFS-RT feed onto the message bus", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the configured feed on a fixed interval and publish cancellations
    Run,
    /// Decode a feed snapshot and print its cancellations without publishing
    Inspect {
        /// Path to file or URL to fetch
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// Service-day boundary as HH:MM:SS
        #[arg(long, default_value = DEFAULT_SERVICE_DAY_START)]
        service_day_start: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/trip_cancellation_source.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("trip_cancellation_source.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => run().await,
        Commands::Inspect {
            source,
            service_day_start,
        } => inspect(&source, &service_day_start).await,
    }
}

/// Wires the poller to its live collaborators and loops until a publish
/// failure shuts the process down.
async fn run() -> Result<()> {
    let config = Config::from_env()?;

    let cache = RedisTripCache::connect(&config.redis_url).await?;
    let source = HttpFeedSource::new(
        BasicClient::with_timeout(HTTP_TIMEOUT)?,
        config.feed_url.clone(),
    );
    let publisher = HttpPublisher::new(
        BasicClient::with_timeout(HTTP_TIMEOUT)?,
        config.publish_url.clone(),
    );
    let poller = Poller::new(source, cache, publisher, config.service_day_start);

    info!(
        feed_url = %config.feed_url,
        interval_secs = config.poll_interval.as_secs(),
        "Starting poll loop"
    );

    loop {
        match poller.poll().await {
            Ok(report) => {
                info!(
                    entities = report.entities,
                    trip_updates = report.trip_updates,
                    published = report.published,
                    skipped = report.skipped,
                    failed = report.failures.len(),
                    "Poll cycle complete"
                );
                if let Some(path) = &config.failure_log {
                    if let Err(e) = append_failures(path, &report.failures) {
                        error!(path = %path, error = %e, "Could not append failure records");
                    }
                }
            }
            Err(e) => {
                error!(error = %e, "Publish failed, shutting down");
                return Err(e);
            }
        }

        tokio::time::sleep(config.poll_interval).await;
    }
}

#[derive(Serialize)]
struct InspectRow {
    route_id: String,
    direction_id: u32,
    start_date: String,
    start_time: String,
    cache_key: String,
}

/// One-shot decode of a snapshot from a file path or URL.
async fn inspect(source: &str, service_day_start: &str) -> Result<()> {
    let boundary = service_day::parse_time(service_day_start)?;
    let bytes = load_bytes(source).await?;
    let feed = parse_feed(&bytes)?;

    let timestamp = feed.header.timestamp();
    let as_of = chrono::DateTime::from_timestamp(timestamp as i64, 0)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| timestamp.to_string());
    let updates = extract_trip_updates(&feed);
    info!(
        entities = feed.entity.len(),
        trip_updates = updates.len(),
        as_of = %as_of,
        "Feed snapshot decoded"
    );

    let mut rows = Vec::new();
    for update in updates {
        let trip = &update.trip;
        let canceled = trip.schedule_relationship.is_some()
            && trip.schedule_relationship() == ScheduleRelationship::Canceled;
        if !canceled {
            continue;
        }

        let jore_direction = trip.direction_id() + 1;
        let start_time = match service_day::to_service_day_time(boundary, trip.start_time()) {
            Ok(time) => time,
            Err(e) => {
                warn!(
                    route_id = trip.route_id(),
                    start_time = trip.start_time(),
                    error = %e,
                    "Skipping cancelled trip with unusable start time"
                );
                continue;
            }
        };

        rows.push(InspectRow {
            route_id: trip.route_id().to_string(),
            direction_id: jore_direction,
            start_date: trip.start_date().to_string(),
            start_time: start_time.clone(),
            cache_key: format_jore_key(trip.route_id(), jore_direction, trip.start_date(), &start_time),
        });
    }

    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

/// Loads feed data from a local file path or fetches it over HTTP.
async fn load_bytes(source: &str) -> Result<Vec<u8>> {
    let bytes = if source.starts_with("http") {
        let client = BasicClient::with_timeout(HTTP_TIMEOUT)?;
        fetch_bytes(&client, source).await?
    } else {
        std::fs::read(source)?
    };
    Ok(bytes)
}
