//! Trip lookup cache.
//!
//! Cancelled trips arrive identified by their public schedule coordinates
//! (route, direction, date, start time); downstream consumers want the
//! internal trip id. The cache maps the former to the latter under keys in
//! Jore format, written by the schedule importer.
//!
//! [`TripCache`] is the async trait for the lookup; [`RedisTripCache`]
//! implements it against Redis.

mod redis;

pub use self::redis::RedisTripCache;

use anyhow::Result;

/// Resolves a Jore-format cache key into an internal trip id.
#[async_trait::async_trait]
pub trait TripCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
}

/// Builds the cache key for one trip instance.
///
/// The format must byte-for-byte match what the cache producer writes:
/// `jore:{route}-{direction}-{date}-{time}` with a Jore direction (1 or 2)
/// and a service-day-normalized start time. Inputs are concatenated verbatim;
/// validating them is the caller's job.
pub fn format_jore_key(
    route_id: &str,
    jore_direction: u32,
    start_date: &str,
    start_time: &str,
) -> String {
    format!("jore:{route_id}-{jore_direction}-{start_date}-{start_time}")
}
