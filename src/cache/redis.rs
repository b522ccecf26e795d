use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;

use super::TripCache;

/// [`TripCache`] backed by Redis.
///
/// Holds one multiplexed connection for the lifetime of the process; the
/// poller is a single sequential caller, so no pooling is needed.
pub struct RedisTripCache {
    conn: MultiplexedConnection,
}

impl RedisTripCache {
    /// Connects to the Redis instance at `url` (e.g. `redis://127.0.0.1/`).
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)
            .with_context(|| format!("invalid redis url {url:?}"))?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .with_context(|| format!("connecting to redis at {url:?}"))?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl TripCache for RedisTripCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn
            .get(key)
            .await
            .with_context(|| format!("redis GET {key}"))?;
        Ok(value)
    }
}
