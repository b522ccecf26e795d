//! Protobuf decoding of GTFS Realtime feed snapshots.

use anyhow::Result;
use prost::Message;

use crate::gtfs_rt::{FeedMessage, TripUpdate};

/// Decodes a protobuf-encoded GTFS-RT [`FeedMessage`] from raw bytes.
///
/// An empty buffer is a valid encoding and decodes to a snapshot with zero
/// entities.
///
/// # Errors
///
/// Returns an error if the bytes are not valid protobuf for a `FeedMessage`.
pub fn parse_feed(bytes: &[u8]) -> Result<FeedMessage> {
    Ok(FeedMessage::decode(bytes)?)
}

/// Returns the trip updates carried by `feed`, preserving feed order.
/// Entities with other payloads (vehicle positions, alerts) are skipped.
pub fn extract_trip_updates(feed: &FeedMessage) -> Vec<&TripUpdate> {
    feed.entity
        .iter()
        .filter_map(|entity| entity.trip_update.as_ref())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gtfs_rt::{FeedEntity, FeedHeader, TripDescriptor, VehiclePosition};

    fn header() -> FeedHeader {
        FeedHeader {
            gtfs_realtime_version: "2.0".to_string(),
            incrementality: None,
            timestamp: Some(1234567890),
            feed_version: None,
        }
    }

    fn trip_update_entity(id: &str, trip_id: &str) -> FeedEntity {
        FeedEntity {
            id: id.to_string(),
            trip_update: Some(TripUpdate {
                trip: TripDescriptor {
                    trip_id: Some(trip_id.to_string()),
                    ..Default::default()
                },
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_empty_bytes_is_empty_snapshot() {
        // An empty byte array decodes to a FeedMessage with default values.
        let feed = parse_feed(&[]).unwrap();
        assert_eq!(feed.header.gtfs_realtime_version, "");
        assert!(feed.entity.is_empty());
    }

    #[test]
    fn test_parse_invalid_bytes() {
        let invalid_bytes = vec![0xFF, 0xFE, 0x00, 0x01];
        assert!(parse_feed(&invalid_bytes).is_err());
    }

    #[test]
    fn test_parse_round_trip() {
        let feed = FeedMessage {
            header: header(),
            entity: vec![trip_update_entity("1", "trip-a")],
        };

        let parsed = parse_feed(&feed.encode_to_vec()).unwrap();
        assert_eq!(parsed.header.gtfs_realtime_version, "2.0");
        assert_eq!(parsed.header.timestamp, Some(1234567890));
        assert_eq!(parsed.entity.len(), 1);
    }

    #[test]
    fn test_extract_trip_updates_empty_feed() {
        let feed = FeedMessage {
            header: header(),
            entity: vec![],
        };
        assert!(extract_trip_updates(&feed).is_empty());
    }

    #[test]
    fn test_extract_trip_updates_filters_and_keeps_order() {
        let feed = FeedMessage {
            header: header(),
            entity: vec![
                trip_update_entity("1", "trip-a"),
                FeedEntity {
                    id: "2".to_string(),
                    vehicle: Some(VehiclePosition::default()),
                    ..Default::default()
                },
                trip_update_entity("3", "trip-b"),
            ],
        };

        let updates = extract_trip_updates(&feed);
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].trip.trip_id(), "trip-a");
        assert_eq!(updates[1].trip.trip_id(), "trip-b");
    }
}
