//! Resolution-failure audit log.
//!
//! Cancelled trips that could not be resolved to an internal trip id are
//! appended as CSV rows, one file across restarts, headers written once.

use anyhow::Result;
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::OpenOptions;
use std::path::Path;
use tracing::debug;

use crate::extractor::ResolutionFailure;

/// One audit row: the failure context plus the wall-clock time it was seen.
#[derive(Debug, Serialize)]
pub struct FailureRecord {
    pub timestamp: DateTime<Utc>,
    pub route_id: String,
    pub direction_id: u32,
    pub start_date: String,
    pub start_time: String,
    pub cache_key: Option<String>,
    pub reason: String,
}

impl FailureRecord {
    fn new(failure: &ResolutionFailure) -> Self {
        Self {
            timestamp: Utc::now(),
            route_id: failure.route_id.clone(),
            direction_id: failure.direction_id,
            start_date: failure.start_date.clone(),
            start_time: failure.start_time.clone(),
            cache_key: failure.cache_key.clone(),
            reason: failure.reason.clone(),
        }
    }
}

/// Appends one row per failure to the CSV file at `path`.
///
/// Creates the file with headers if it does not already exist.
pub fn append_failures(path: &str, failures: &[ResolutionFailure]) -> Result<()> {
    if failures.is_empty() {
        return Ok(());
    }

    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, count = failures.len(), "Appending failure records");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    for failure in failures {
        writer.serialize(FailureRecord::new(failure))?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn failure() -> ResolutionFailure {
        ResolutionFailure {
            route_id: "4562".to_string(),
            direction_id: 2,
            start_date: "20181031".to_string(),
            start_time: "11:12:00".to_string(),
            cache_key: Some("jore:4562-2-20181031-11:12:00".to_string()),
            reason: "no matching trip id in cache".to_string(),
        }
    }

    #[test]
    fn test_append_failures_creates_file() {
        let path = temp_path("trip_cancellation_source_test_create.csv");
        let _ = fs::remove_file(&path); // clean up any prior run

        append_failures(&path, &[failure()]).unwrap();

        assert!(Path::new(&path).exists());
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("jore:4562-2-20181031-11:12:00"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_append_failures_writes_header_once() {
        let path = temp_path("trip_cancellation_source_test_header.csv");
        let _ = fs::remove_file(&path);

        append_failures(&path, &[failure()]).unwrap();
        append_failures(&path, &[failure()]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let header_count = content.lines().filter(|l| l.contains("timestamp")).count();
        assert_eq!(header_count, 1);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_append_failures_empty_slice_writes_nothing() {
        let path = temp_path("trip_cancellation_source_test_empty.csv");
        let _ = fs::remove_file(&path);

        append_failures(&path, &[]).unwrap();

        assert!(!Path::new(&path).exists());
    }
}
