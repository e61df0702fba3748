//! Store seams for the two external collaborators.
//!
//! The engine owns no durable state of its own: holds live in a TTL-capable
//! key/value store, committed counters in the inventory record store. Both
//! are reached through object-safe async traits so the production adapters
//! and the test mocks share one contract.

use crate::error::StoreError;
use crate::types::{EventId, Hold, HoldId, TicketType, TicketTypeName};
use async_trait::async_trait;

/// Prefix shared by every hold key.
pub const HOLD_KEY_PREFIX: &str = "hold";

/// Storage key for one hold: `hold:{event_id}:{ticket_type}:{hold_id}`.
///
/// The layout serves two scans: every hold of a ticket type shares the
/// [`ticket_type_pattern`] prefix, and a hold can be located by id alone by
/// matching the key suffix ([`hold_id_pattern`]).
#[must_use]
pub fn hold_key(event_id: EventId, ticket_type: &TicketTypeName, hold_id: HoldId) -> String {
    format!("{HOLD_KEY_PREFIX}:{event_id}:{ticket_type}:{hold_id}")
}

/// Match pattern for every hold of one ticket type.
#[must_use]
pub fn ticket_type_pattern(event_id: EventId, ticket_type: &TicketTypeName) -> String {
    format!("{HOLD_KEY_PREFIX}:{event_id}:{ticket_type}:*")
}

/// Match pattern locating a hold by id alone.
#[must_use]
pub fn hold_id_pattern(hold_id: HoldId) -> String {
    format!("{HOLD_KEY_PREFIX}:*:*:{hold_id}")
}

/// Ephemeral hold records with store-enforced expiry.
///
/// Implementations must expire records themselves once the TTL lapses; the
/// engine never runs a sweep. A missing record is the expiry signal, so
/// every read treats not-found as a valid terminal state, never an error.
#[async_trait]
pub trait HoldStore: Send + Sync {
    /// Write a hold that the store must drop after `ttl_seconds`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the store cannot be reached.
    async fn put(&self, hold: &Hold, ttl_seconds: u64) -> Result<(), StoreError>;

    /// Every live hold for one ticket type.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the store cannot be reached.
    async fn holds_for(
        &self,
        event_id: EventId,
        ticket_type: &TicketTypeName,
    ) -> Result<Vec<Hold>, StoreError>;

    /// Locate a live hold by id alone, with its remaining TTL in seconds.
    ///
    /// Callers only know the hold id, while the natural key embeds event and
    /// ticket type, so this is a scan across ticket types.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the store cannot be reached.
    async fn find(&self, hold_id: HoldId) -> Result<Option<(Hold, u64)>, StoreError>;

    /// Delete a hold record. `false` when it was already gone.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the store cannot be reached.
    async fn remove(&self, hold: &Hold) -> Result<bool, StoreError>;
}

/// Durable per-ticket-type counters, owned by the event catalog.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Look up a ticket type's capacity and committed counters.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the store cannot be reached.
    async fn ticket_type(
        &self,
        event_id: EventId,
        name: &TicketTypeName,
    ) -> Result<Option<TicketType>, StoreError>;

    /// Atomically add `quantity` to the committed counter.
    ///
    /// Must be a single increment operation, never read-modify-write:
    /// concurrent commits on the same ticket type may not lose updates.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the store cannot be reached,
    /// or [`StoreError::Inconsistent`] when the ticket type row is missing.
    async fn add_committed(
        &self,
        event_id: EventId,
        name: &TicketTypeName,
        quantity: u32,
    ) -> Result<(), StoreError>;

    /// Create or replace a ticket type record.
    ///
    /// Ticket types are created with their event by the catalog collaborator;
    /// this exists for provisioning code and tests.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the store cannot be reached.
    async fn put_ticket_type(
        &self,
        event_id: EventId,
        ticket_type: &TicketType,
    ) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn hold_key_embeds_all_three_parts() {
        let event_id = EventId::from_uuid(Uuid::nil());
        let hold_id = HoldId::from_uuid(Uuid::max());
        let key = hold_key(event_id, &TicketTypeName::new("VIP"), hold_id);
        assert_eq!(key, format!("hold:{event_id}:VIP:{hold_id}"));
    }

    #[test]
    fn patterns_match_the_key_layout() {
        let event_id = EventId::new();
        let hold_id = HoldId::new();
        let ticket_type = TicketTypeName::new("General");
        assert_eq!(
            ticket_type_pattern(event_id, &ticket_type),
            format!("hold:{event_id}:General:*")
        );
        assert_eq!(hold_id_pattern(hold_id), format!("hold:*:*:{hold_id}"));
    }
}
