//! Error taxonomy for the reservation engine.
//!
//! `reserve`, `cancel`, and TTL reads return their errors straight to the
//! caller for user-facing handling. `commit` failures are the dangerous
//! class: a payment may have succeeded for inventory the engine can no
//! longer grant, so the manager also emits an error-level audit log before
//! propagating them.

use crate::types::{EventId, HoldId, TicketTypeName};
use thiserror::Error;

/// Failures surfaced by the backing stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// The store answered with state the engine cannot interpret.
    #[error("store state inconsistent: {0}")]
    Inconsistent(String),
}

/// Failures surfaced by reservation operations.
#[derive(Debug, Error)]
pub enum ReservationError {
    /// A hold must claim at least one ticket.
    #[error("quantity must be greater than zero")]
    ZeroQuantity,

    /// The request exceeds the per-hold quantity policy.
    #[error("cannot hold more than {limit} tickets at once (requested {requested})")]
    QuantityAboveLimit {
        /// Quantity the caller asked for
        requested: u32,
        /// Policy ceiling
        limit: u32,
    },

    /// The event has no ticket type with this name.
    #[error("ticket type {name} not found for event {event_id}")]
    TicketTypeNotFound {
        /// Event that was queried
        event_id: EventId,
        /// Name that did not resolve
        name: TicketTypeName,
    },

    /// Virtual availability cannot cover the requested quantity.
    #[error(
        "ticket type {name} for event {event_id} is out of stock \
         (requested {requested}, available {available})"
    )]
    OutOfStock {
        /// Event that was queried
        event_id: EventId,
        /// Ticket type that ran out
        name: TicketTypeName,
        /// Quantity the caller asked for
        requested: u32,
        /// Virtual availability at check time
        available: u32,
    },

    /// The hold is gone: expired, committed, cancelled, or never created.
    /// The engine does not distinguish these cases; all mean the caller no
    /// longer holds inventory.
    #[error("hold {0} not found")]
    HoldNotFound(HoldId),

    /// A backing store failed. Both `reserve` and `commit` fail closed on
    /// this rather than skipping their store operation.
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_stock_names_the_shortfall() {
        let err = ReservationError::OutOfStock {
            event_id: EventId::default(),
            name: TicketTypeName::new("VIP"),
            requested: 4,
            available: 1,
        };
        let message = err.to_string();
        assert!(message.contains("out of stock"));
        assert!(message.contains("requested 4"));
        assert!(message.contains("available 1"));
    }

    #[test]
    fn store_errors_pass_through_transparently() {
        let err = ReservationError::from(StoreError::Unavailable("redis down".to_string()));
        assert_eq!(err.to_string(), "store unavailable: redis down");
    }

    #[test]
    fn hold_not_found_carries_the_id() {
        let hold_id = HoldId::new();
        let err = ReservationError::HoldNotFound(hold_id);
        assert_eq!(err.to_string(), format!("hold {hold_id} not found"));
    }
}
