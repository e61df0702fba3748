//! Redis-backed hold store.
//!
//! Holds are JSON values under `hold:{event_id}:{ticket_type}:{hold_id}`
//! keys, written with a server-side TTL (`SET ... EX`). Expiry is entirely
//! Redis's job: no reaper runs anywhere, and a key that vanishes between a
//! scan and a read is treated as expired, not as an error.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::warn;
use turnstile_core::store::{hold_id_pattern, hold_key, ticket_type_pattern};
use turnstile_core::{EventId, Hold, HoldId, HoldStore, StoreError, TicketTypeName};

/// Hold store backed by a Redis instance.
///
/// Connections are multiplexed and fetched per operation, so the store is
/// cheap to clone into handler state.
#[derive(Clone)]
pub struct RedisHoldStore {
    client: redis::Client,
}

impl RedisHoldStore {
    /// Create a store for the given Redis URL.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the URL cannot be parsed.
    /// Connection failures surface on first use, not here.
    pub fn new(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)
            .map_err(|e| StoreError::Unavailable(format!("invalid redis url: {e}")))?;
        Ok(Self { client })
    }

    async fn connection(&self) -> Result<MultiplexedConnection, StoreError> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| StoreError::Unavailable(format!("redis connection error: {e}")))
    }

    async fn keys_matching(
        conn: &mut MultiplexedConnection,
        pattern: &str,
    ) -> Result<Vec<String>, StoreError> {
        let mut keys = Vec::new();
        let mut iter: redis::AsyncIter<'_, String> = conn
            .scan_match(pattern)
            .await
            .map_err(|e| StoreError::Unavailable(format!("redis SCAN error: {e}")))?;
        while let Some(key) = iter.next_item().await {
            keys.push(key);
        }
        Ok(keys)
    }

    fn decode(key: &str, json: &str) -> Result<Hold, StoreError> {
        serde_json::from_str(json).map_err(|e| {
            StoreError::Inconsistent(format!("undecodable hold record at {key}: {e}"))
        })
    }
}

#[async_trait]
impl HoldStore for RedisHoldStore {
    async fn put(&self, hold: &Hold, ttl_seconds: u64) -> Result<(), StoreError> {
        let key = hold_key(hold.event_id, &hold.ticket_type, hold.id);
        let json = serde_json::to_string(hold)
            .map_err(|e| StoreError::Inconsistent(format!("unencodable hold record: {e}")))?;

        let mut conn = self.connection().await?;
        let _: () = conn
            .set_ex(&key, json, ttl_seconds)
            .await
            .map_err(|e| StoreError::Unavailable(format!("redis SET error: {e}")))?;
        Ok(())
    }

    async fn holds_for(
        &self,
        event_id: EventId,
        ticket_type: &TicketTypeName,
    ) -> Result<Vec<Hold>, StoreError> {
        let mut conn = self.connection().await?;
        let keys =
            Self::keys_matching(&mut conn, &ticket_type_pattern(event_id, ticket_type)).await?;

        let mut holds = Vec::with_capacity(keys.len());
        for key in keys {
            // A key can expire between the scan and this read.
            let value: Option<String> = conn
                .get(&key)
                .await
                .map_err(|e| StoreError::Unavailable(format!("redis GET error: {e}")))?;
            if let Some(json) = value {
                holds.push(Self::decode(&key, &json)?);
            }
        }
        Ok(holds)
    }

    async fn find(&self, hold_id: HoldId) -> Result<Option<(Hold, u64)>, StoreError> {
        let mut conn = self.connection().await?;
        let keys = Self::keys_matching(&mut conn, &hold_id_pattern(hold_id)).await?;
        let Some(key) = keys.into_iter().next() else {
            return Ok(None);
        };

        let value: Option<String> = conn
            .get(&key)
            .await
            .map_err(|e| StoreError::Unavailable(format!("redis GET error: {e}")))?;
        let Some(json) = value else {
            return Ok(None);
        };

        // Holds are always written with a TTL: -2 means the key lapsed under
        // us, and a key with no expiry (-1) is not a live hold.
        let ttl: i64 = conn
            .ttl(&key)
            .await
            .map_err(|e| StoreError::Unavailable(format!("redis TTL error: {e}")))?;
        if ttl <= 0 {
            if ttl == -1 {
                warn!(key, "hold key without expiry; treating as gone");
            }
            return Ok(None);
        }

        Ok(Some((
            Self::decode(&key, &json)?,
            u64::try_from(ttl).unwrap_or(0),
        )))
    }

    async fn remove(&self, hold: &Hold) -> Result<bool, StoreError> {
        let key = hold_key(hold.event_id, &hold.ticket_type, hold.id);
        let mut conn = self.connection().await?;
        let removed: i64 = conn
            .del(&key)
            .await
            .map_err(|e| StoreError::Unavailable(format!("redis DEL error: {e}")))?;
        Ok(removed > 0)
    }
}
