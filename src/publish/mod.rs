//! Outbound message-bus seam.
//!
//! One resolved cancellation becomes one [`OutboundEvent`]: the serialized
//! payload, a routing key equal to the internal trip id, the event time
//! taken from the feed snapshot header, and the schema identifier consumers
//! use to pick a deserializer. [`Publisher`] is the trait the orchestrator
//! publishes through; [`HttpPublisher`] implements it against the bus's
//! HTTP produce gateway.

mod http;

pub use self::http::HttpPublisher;

use anyhow::Result;

/// Message property carrying the resolved internal trip id.
pub const PROP_TRIP_ID: &str = "trip-id";
/// Message property carrying the payload schema identifier.
pub const PROP_SCHEMA: &str = "protobuf-schema";
/// Schema identifier of a serialized `TripCancellation`.
pub const SCHEMA_TRIP_CANCELLATION: &str = "trip-cancellation";

/// One message ready for the bus.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundEvent {
    /// Routing key: the resolved internal trip id.
    pub key: String,
    /// Event time in seconds since epoch, from the feed snapshot header.
    pub event_time: u64,
    /// Serialized payload.
    pub payload: Vec<u8>,
    /// Schema identifier of the payload.
    pub schema: &'static str,
}

/// Publishes events to the message bus, at-least-once.
///
/// A returned error means the outbound channel itself is broken; callers
/// must not swallow it.
#[async_trait::async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, event: &OutboundEvent) -> Result<()>;
}
