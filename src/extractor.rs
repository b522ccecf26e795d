//! Cancellation extraction.
//!
//! Turns one trip update into at most one outbound payload: keep only trips
//! explicitly marked CANCELED, translate the GTFS direction to Jore,
//! normalize the start time onto its service day, look the trip up in the
//! cache, and build the `TripCancellation` payload on a hit.
//!
//! Nothing here aborts a batch. Every path folds into a [`Resolution`]; a
//! trip that cannot be resolved becomes [`Resolution::Failed`] and the next
//! trip update proceeds.

use serde::Serialize;
use tracing::{error, warn};

use crate::cache::{TripCache, format_jore_key};
use crate::gtfs_rt::TripUpdate;
use crate::gtfs_rt::trip_descriptor::ScheduleRelationship;
use crate::internal_messages::TripCancellation;
use crate::internal_messages::trip_cancellation::Status;
use crate::service_day;

/// Outcome of resolving a single trip update.
#[derive(Debug)]
pub enum Resolution {
    /// Explicitly cancelled and found in the cache; ready to publish.
    Resolved(ResolvedCancellation),
    /// Not a cancellation. No output, not an error.
    Skipped,
    /// Cancelled, but no internal trip id could be resolved.
    Failed(ResolutionFailure),
}

/// A cancellation with its internal trip id, ready for the bus.
#[derive(Debug)]
pub struct ResolvedCancellation {
    pub trip_id: String,
    pub cancellation: TripCancellation,
}

/// Context of a failed resolution, kept for the audit log.
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionFailure {
    pub route_id: String,
    /// Jore direction, 1 or 2.
    pub direction_id: u32,
    pub start_date: String,
    /// Start time as it appeared in the feed.
    pub start_time: String,
    /// The cache key that was looked up, when one could be built.
    pub cache_key: Option<String>,
    pub reason: String,
}

/// Resolves one trip update against the lookup cache.
///
/// `service_day_start` is the configured service-day boundary in seconds.
/// Cache lookup errors are contained here and reported as
/// [`Resolution::Failed`]; they never propagate to the caller.
pub async fn resolve_cancellation<C: TripCache>(
    cache: &C,
    service_day_start: u32,
    update: &TripUpdate,
) -> Resolution {
    let trip = &update.trip;

    // Only trips explicitly flagged CANCELED produce output.
    let canceled = trip.schedule_relationship.is_some()
        && trip.schedule_relationship() == ScheduleRelationship::Canceled;
    if !canceled {
        return Resolution::Skipped;
    }

    // GTFS-RT numbers directions 0 and 1; the cache keys use Jore 1 and 2.
    let jore_direction = trip.direction_id() + 1;

    let failure = |cache_key: Option<String>, reason: String| {
        Resolution::Failed(ResolutionFailure {
            route_id: trip.route_id().to_string(),
            direction_id: jore_direction,
            start_date: trip.start_date().to_string(),
            start_time: trip.start_time().to_string(),
            cache_key,
            reason,
        })
    };

    let start_time = match service_day::to_service_day_time(service_day_start, trip.start_time()) {
        Ok(time) => time,
        Err(e) => {
            warn!(
                route_id = trip.route_id(),
                start_time = trip.start_time(),
                error = %e,
                "Cancelled trip has an unusable start time"
            );
            return failure(None, e.to_string());
        }
    };

    let key = format_jore_key(
        trip.route_id(),
        jore_direction,
        trip.start_date(),
        &start_time,
    );

    match cache.get(&key).await {
        Ok(Some(trip_id)) => {
            let cancellation = build_cancellation(
                &trip_id,
                trip.route_id(),
                jore_direction,
                trip.start_date(),
                &start_time,
            );
            Resolution::Resolved(ResolvedCancellation {
                trip_id,
                cancellation,
            })
        }
        Ok(None) => {
            error!(
                cache_key = %key,
                "Could not find an internal trip id for cancelled trip"
            );
            failure(Some(key), "no matching trip id in cache".to_string())
        }
        Err(e) => {
            error!(cache_key = %key, error = %e, "Cache lookup failed for cancelled trip");
            failure(Some(key), e.to_string())
        }
    }
}

/// Builds the outbound payload for one resolved cancellation.
pub fn build_cancellation(
    trip_id: &str,
    route_id: &str,
    jore_direction: u32,
    start_date: &str,
    start_time: &str,
) -> TripCancellation {
    TripCancellation {
        schema_version: 1,
        trip_id: Some(trip_id.to_string()),
        route_id: route_id.to_string(),
        direction_id: jore_direction as i32,
        start_date: start_date.to_string(),
        start_time: start_time.to_string(),
        status: Status::Canceled as i32,
        title: None,
        description: None,
    }
}
