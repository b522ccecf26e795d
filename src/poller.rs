//! Poll cycle orchestration.
//!
//! One [`Poller::poll`] call handles one feed snapshot: fetch, decode,
//! extract trip updates, resolve each against the cache, and publish every
//! resolved cancellation in feed order. Trip updates are handled
//! sequentially so a failing publish is attributable to one cycle and one
//! trip.
//!
//! Error classification follows the outbound channel's importance: fetch and
//! decode failures cost one cycle and are swallowed here; a publish failure
//! is returned to the caller, which is expected to shut the process down.

use anyhow::{Context, Result};
use prost::Message;
use tracing::{error, info};

use crate::cache::TripCache;
use crate::extractor::{Resolution, ResolutionFailure, resolve_cancellation};
use crate::fetch::FeedSource;
use crate::parser::{extract_trip_updates, parse_feed};
use crate::publish::{OutboundEvent, Publisher, SCHEMA_TRIP_CANCELLATION};

/// Aggregated outcomes of one poll cycle.
#[derive(Debug, Default)]
pub struct CycleReport {
    pub entities: usize,
    pub trip_updates: usize,
    pub published: usize,
    pub skipped: usize,
    pub failures: Vec<ResolutionFailure>,
}

/// Ties the pipeline together over injected collaborators.
pub struct Poller<S, C, P> {
    source: S,
    cache: C,
    publisher: P,
    service_day_start: u32,
}

impl<S: FeedSource, C: TripCache, P: Publisher> Poller<S, C, P> {
    pub fn new(source: S, cache: C, publisher: P, service_day_start: u32) -> Self {
        Self {
            source,
            cache,
            publisher,
            service_day_start,
        }
    }

    /// Runs one poll cycle.
    ///
    /// # Errors
    ///
    /// Returns an error only when publishing fails; every other failure is
    /// logged and reflected in the returned [`CycleReport`].
    pub async fn poll(&self) -> Result<CycleReport> {
        let mut report = CycleReport::default();

        let bytes = match self.source.fetch().await {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(error = %e, "Feed fetch failed, no events this cycle");
                return Ok(report);
            }
        };

        let feed = match parse_feed(&bytes) {
            Ok(feed) => feed,
            Err(e) => {
                error!(error = %e, "Feed payload did not decode, no events this cycle");
                return Ok(report);
            }
        };

        // The header timestamp is the only as-of time the feed carries; it is
        // applied to every event from this snapshot.
        let timestamp = feed.header.timestamp();
        let updates = extract_trip_updates(&feed);
        report.entities = feed.entity.len();
        report.trip_updates = updates.len();
        info!(
            entities = report.entities,
            trip_updates = report.trip_updates,
            timestamp,
            "Read feed snapshot"
        );

        for update in updates {
            match resolve_cancellation(&self.cache, self.service_day_start, update).await {
                Resolution::Resolved(resolved) => {
                    let event = OutboundEvent {
                        key: resolved.trip_id.clone(),
                        event_time: timestamp,
                        payload: resolved.cancellation.encode_to_vec(),
                        schema: SCHEMA_TRIP_CANCELLATION,
                    };
                    self.publisher.publish(&event).await.with_context(|| {
                        format!("publishing cancellation for trip {}", resolved.trip_id)
                    })?;
                    info!(
                        trip_id = %resolved.trip_id,
                        route_id = %resolved.cancellation.route_id,
                        direction_id = resolved.cancellation.direction_id,
                        start_date = %resolved.cancellation.start_date,
                        start_time = %resolved.cancellation.start_time,
                        "Produced a cancellation"
                    );
                    report.published += 1;
                }
                Resolution::Skipped => report.skipped += 1,
                Resolution::Failed(failure) => report.failures.push(failure),
            }
        }

        Ok(report)
    }
}
