//! Postgres-backed inventory record store.
//!
//! One row per `(event_id, name)` ticket type carrying the `capacity` and
//! `committed` counters. The only mutation the engine performs here is a
//! single-statement atomic increment of `committed`; capacity and row
//! lifecycle belong to the event catalog.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;
use turnstile_core::{EventId, InventoryStore, StoreError, TicketType, TicketTypeName};

/// Inventory record store backed by a Postgres connection pool.
#[derive(Clone)]
pub struct PostgresInventoryStore {
    pool: PgPool,
}

impl PostgresInventoryStore {
    /// Connect a new pool to `url`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the database cannot be
    /// reached.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(|e| StoreError::Unavailable(format!("postgres connection error: {e}")))?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Access the underlying connection pool.
    ///
    /// Useful for health checks or manual queries.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the `ticket_types` table when it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the statement fails.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(include_str!("../migrations/0001_ticket_types.sql"))
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(format!("migration failed: {e}")))?;
        info!("ticket_types schema ready");
        Ok(())
    }
}

#[async_trait]
impl InventoryStore for PostgresInventoryStore {
    async fn ticket_type(
        &self,
        event_id: EventId,
        name: &TicketTypeName,
    ) -> Result<Option<TicketType>, StoreError> {
        let row: Option<(i64, i64)> = sqlx::query_as(
            "SELECT capacity, committed FROM ticket_types WHERE event_id = $1 AND name = $2",
        )
        .bind(event_id.as_uuid())
        .bind(name.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Unavailable(format!("ticket type lookup failed: {e}")))?;

        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)] // counters fit u32
        Ok(row.map(|(capacity, committed)| TicketType {
            name: name.clone(),
            capacity: capacity as u32,
            committed: committed as u32,
        }))
    }

    async fn add_committed(
        &self,
        event_id: EventId,
        name: &TicketTypeName,
        quantity: u32,
    ) -> Result<(), StoreError> {
        // A single increment statement: concurrent commits on the same row
        // serialize inside Postgres and never lose an update.
        let result = sqlx::query(
            "UPDATE ticket_types SET committed = committed + $3 WHERE event_id = $1 AND name = $2",
        )
        .bind(event_id.as_uuid())
        .bind(name.as_str())
        .bind(i64::from(quantity))
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Unavailable(format!("committed increment failed: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Inconsistent(format!(
                "ticket type {name} for event {event_id} has no inventory row"
            )));
        }
        Ok(())
    }

    async fn put_ticket_type(
        &self,
        event_id: EventId,
        ticket_type: &TicketType,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO ticket_types (event_id, name, capacity, committed)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (event_id, name)
             DO UPDATE SET capacity = EXCLUDED.capacity, committed = EXCLUDED.committed",
        )
        .bind(event_id.as_uuid())
        .bind(ticket_type.name.as_str())
        .bind(i64::from(ticket_type.capacity))
        .bind(i64::from(ticket_type.committed))
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Unavailable(format!("ticket type upsert failed: {e}")))?;
        Ok(())
    }
}
