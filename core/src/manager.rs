//! The reservation manager: holds, commits, and virtual availability.
//!
//! Every operation is safe to run concurrently across many processes with no
//! in-process shared state; the only coordination points are the two stores.
//!
//! `reserve` is deliberately optimistic. Availability is checked against a
//! point-in-time view and the hold is written without a lock, so two
//! concurrent callers can both pass the check and jointly oversubscribe the
//! *hold layer*. The window is kept to one read and one write, and it
//! corrects itself: excess holds lapse by TTL, and `commit` — the only
//! operation that durably consumes capacity — performs its increment as a
//! single atomic statement in the inventory store. Do not "fix" this with a
//! lock; the optimistic behavior is the contract.

use crate::clock::Clock;
use crate::error::ReservationError;
use crate::store::{HoldStore, InventoryStore};
use crate::types::{EventId, Hold, HoldId, OwnerId, TicketType, TicketTypeName};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Policy knobs for hold creation.
#[derive(Clone, Copy, Debug)]
pub struct HoldPolicy {
    /// TTL granted when the caller does not ask for one
    pub default_ttl_secs: u64,
    /// Upper bound on any granted TTL
    pub max_ttl_secs: u64,
    /// Upper bound on tickets per hold
    pub max_quantity: u32,
}

impl Default for HoldPolicy {
    fn default() -> Self {
        Self {
            default_ttl_secs: 900,
            max_ttl_secs: 3600,
            max_quantity: 10,
        }
    }
}

impl HoldPolicy {
    /// TTL actually granted for a request: the default when unspecified,
    /// otherwise clamped into `1..=max_ttl_secs`.
    #[must_use]
    pub fn granted_ttl(&self, requested: Option<u64>) -> u64 {
        let max_ttl = self.max_ttl_secs.max(1);
        requested.unwrap_or(self.default_ttl_secs).clamp(1, max_ttl)
    }
}

/// Parameters for [`ReservationManager::reserve`].
#[derive(Clone, Debug)]
pub struct ReserveRequest {
    /// Event to hold tickets for
    pub event_id: EventId,
    /// Ticket type within the event
    pub ticket_type: TicketTypeName,
    /// Units to claim; must be greater than zero
    pub quantity: u32,
    /// Identity the hold belongs to (idempotent-reuse key)
    pub owner: OwnerId,
    /// Requested TTL; `None` takes the policy default
    pub ttl_seconds: Option<u64>,
}

/// Outcome of a successful [`ReservationManager::reserve`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HoldReceipt {
    /// The granted (or re-used) hold
    pub hold_id: HoldId,
    /// TTL actually granted, in seconds
    pub ttl_seconds: u64,
    /// When the hold store will drop the record
    pub expires_at: DateTime<Utc>,
}

/// Outcome of a successful [`ReservationManager::commit`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommittedHold {
    /// Hold that was consumed
    pub hold_id: HoldId,
    /// Event the inventory belongs to
    pub event_id: EventId,
    /// Ticket type that was decremented
    pub ticket_type: TicketTypeName,
    /// Units durably committed
    pub quantity: u32,
}

/// Point-in-time availability view for one ticket type.
///
/// `available` is an estimate, not a promise: it can be stale by the time
/// the caller acts on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TicketTypeAvailability {
    /// Total sellable units
    pub capacity: u32,
    /// Units permanently sold
    pub committed: u32,
    /// Units claimed by currently-live holds
    pub held: u32,
    /// `capacity - committed - held`, floored at zero
    pub available: u32,
}

/// `capacity - committed - live held quantity`, floored at zero.
///
/// Signed arithmetic: concurrent optimistic holds can oversubscribe the hold
/// layer, so the naive subtraction may go negative.
#[must_use]
pub fn virtual_availability(ticket_type: &TicketType, held: u64) -> u64 {
    let free = i64::from(ticket_type.capacity)
        - i64::from(ticket_type.committed)
        - i64::try_from(held).unwrap_or(i64::MAX);
    u64::try_from(free).unwrap_or(0)
}

/// Creates, deduplicates, queries, cancels, and commits holds.
pub struct ReservationManager {
    holds: Arc<dyn HoldStore>,
    inventory: Arc<dyn InventoryStore>,
    clock: Arc<dyn Clock>,
    policy: HoldPolicy,
}

impl ReservationManager {
    /// Create a manager over the two store seams.
    #[must_use]
    pub fn new(
        holds: Arc<dyn HoldStore>,
        inventory: Arc<dyn InventoryStore>,
        clock: Arc<dyn Clock>,
        policy: HoldPolicy,
    ) -> Self {
        Self {
            holds,
            inventory,
            clock,
            policy,
        }
    }

    /// Place a TTL-bounded hold on `quantity` units of a ticket type.
    ///
    /// A live hold by the same owner on the same ticket type is returned
    /// as-is instead of creating a competitor, which makes the operation
    /// safe to retry and double-click proof. Otherwise the request is
    /// checked against virtual availability and, if it fits, written with
    /// the granted TTL. Nothing durable is touched; holds are purely
    /// provisional.
    ///
    /// # Errors
    ///
    /// - [`ReservationError::ZeroQuantity`] / [`ReservationError::QuantityAboveLimit`]
    ///   on invalid quantities
    /// - [`ReservationError::TicketTypeNotFound`] when the target does not exist
    /// - [`ReservationError::OutOfStock`] when virtual availability is short;
    ///   no hold is written
    /// - [`ReservationError::Store`] when either store is unreachable
    pub async fn reserve(&self, request: ReserveRequest) -> Result<HoldReceipt, ReservationError> {
        if request.quantity == 0 {
            return Err(ReservationError::ZeroQuantity);
        }
        if request.quantity > self.policy.max_quantity {
            return Err(ReservationError::QuantityAboveLimit {
                requested: request.quantity,
                limit: self.policy.max_quantity,
            });
        }

        let ticket_type = self
            .lookup_ticket_type(request.event_id, &request.ticket_type)
            .await?;

        let now = self.clock.now();
        let holds = self
            .holds
            .holds_for(request.event_id, &request.ticket_type)
            .await?;
        let live: Vec<&Hold> = holds.iter().filter(|hold| hold.is_live(now)).collect();

        // Double-submit safety: a live hold by the same owner is the answer,
        // not a competitor.
        if let Some(existing) = live.iter().find(|hold| hold.owner == request.owner) {
            debug!(
                hold_id = %existing.id,
                owner = %existing.owner,
                "re-using live hold for owner"
            );
            return Ok(HoldReceipt {
                hold_id: existing.id,
                ttl_seconds: existing.remaining_ttl(now),
                expires_at: existing.expires_at,
            });
        }

        let held: u64 = live.iter().map(|hold| u64::from(hold.quantity)).sum();
        let available = virtual_availability(&ticket_type, held);
        if u64::from(request.quantity) > available {
            return Err(ReservationError::OutOfStock {
                event_id: request.event_id,
                name: request.ticket_type,
                requested: request.quantity,
                available: u32::try_from(available).unwrap_or(u32::MAX),
            });
        }

        let ttl_seconds = self.policy.granted_ttl(request.ttl_seconds);
        let hold = Hold {
            id: HoldId::new(),
            event_id: request.event_id,
            ticket_type: request.ticket_type,
            quantity: request.quantity,
            owner: request.owner,
            created_at: now,
            expires_at: now + Duration::seconds(i64::try_from(ttl_seconds).unwrap_or(i64::MAX)),
        };
        self.holds.put(&hold, ttl_seconds).await?;

        info!(
            hold_id = %hold.id,
            event_id = %hold.event_id,
            ticket_type = %hold.ticket_type,
            quantity = hold.quantity,
            ttl_seconds,
            "hold created"
        );
        Ok(HoldReceipt {
            hold_id: hold.id,
            ttl_seconds,
            expires_at: hold.expires_at,
        })
    }

    /// Whole seconds of life left on a hold; `0` when the hold is gone.
    ///
    /// Expired, committed, cancelled, and never-created are indistinguishable
    /// here: all mean "you no longer hold this inventory". Reading the TTL
    /// does not extend it.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError::Store`] when the hold store is
    /// unreachable; absence of the hold is never an error.
    pub async fn remaining_ttl(&self, hold_id: HoldId) -> Result<u64, ReservationError> {
        Ok(self
            .holds
            .find(hold_id)
            .await?
            .map_or(0, |(_, ttl_seconds)| ttl_seconds))
    }

    /// Best-effort release of a hold ahead of its TTL.
    ///
    /// Returns `false` (not an error) when the hold has already expired or
    /// been committed; cancellation is advisory cleanup, not a state
    /// transition callers can rely on.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError::Store`] when the hold store is
    /// unreachable.
    pub async fn cancel(&self, hold_id: HoldId) -> Result<bool, ReservationError> {
        let Some((hold, _)) = self.holds.find(hold_id).await? else {
            return Ok(false);
        };
        let removed = self.holds.remove(&hold).await?;
        if removed {
            info!(hold_id = %hold_id, "hold cancelled");
        }
        Ok(removed)
    }

    /// Convert a hold into a durable stock decrement.
    ///
    /// The committed counter is incremented first, atomically; the hold
    /// record is deleted afterwards so a replayed commit finds nothing and
    /// fails [`ReservationError::HoldNotFound`] instead of double-crediting.
    /// The increment is not re-checked against capacity: a committed hold
    /// only ever fit inside virtual availability at grant time.
    ///
    /// # Errors
    ///
    /// - [`ReservationError::HoldNotFound`] when the hold is gone; callers
    ///   must treat this as "cannot fulfill", never as success
    /// - [`ReservationError::Store`] when the inventory store is unreachable;
    ///   the hold is left intact
    pub async fn commit(&self, hold_id: HoldId) -> Result<CommittedHold, ReservationError> {
        let Some((hold, _)) = self.holds.find(hold_id).await? else {
            error!(
                hold_id = %hold_id,
                "commit failed: hold missing; payment may be unfulfillable and needs reconciliation"
            );
            return Err(ReservationError::HoldNotFound(hold_id));
        };

        self.inventory
            .add_committed(hold.event_id, &hold.ticket_type, hold.quantity)
            .await?;

        // The increment above is durable either way; a record that cannot be
        // deleted now lapses by TTL on its own.
        if let Err(err) = self.holds.remove(&hold).await {
            error!(
                hold_id = %hold.id,
                event_id = %hold.event_id,
                ticket_type = %hold.ticket_type,
                error = %err,
                "hold delete failed after committed increment; needs reconciliation"
            );
        }

        info!(
            hold_id = %hold.id,
            event_id = %hold.event_id,
            ticket_type = %hold.ticket_type,
            quantity = hold.quantity,
            "hold committed"
        );
        Ok(CommittedHold {
            hold_id: hold.id,
            event_id: hold.event_id,
            ticket_type: hold.ticket_type,
            quantity: hold.quantity,
        })
    }

    /// Point-in-time availability view for one ticket type.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError::TicketTypeNotFound`] when the target does
    /// not exist, or [`ReservationError::Store`] when either store is
    /// unreachable.
    pub async fn availability(
        &self,
        event_id: EventId,
        ticket_type: &TicketTypeName,
    ) -> Result<TicketTypeAvailability, ReservationError> {
        let record = self.lookup_ticket_type(event_id, ticket_type).await?;
        let now = self.clock.now();
        let held: u64 = self
            .holds
            .holds_for(event_id, ticket_type)
            .await?
            .iter()
            .filter(|hold| hold.is_live(now))
            .map(|hold| u64::from(hold.quantity))
            .sum();
        let available = virtual_availability(&record, held);
        Ok(TicketTypeAvailability {
            capacity: record.capacity,
            committed: record.committed,
            held: u32::try_from(held).unwrap_or(u32::MAX),
            available: u32::try_from(available).unwrap_or(u32::MAX),
        })
    }

    async fn lookup_ticket_type(
        &self,
        event_id: EventId,
        name: &TicketTypeName,
    ) -> Result<TicketType, ReservationError> {
        self.inventory
            .ticket_type(event_id, name)
            .await?
            .ok_or_else(|| ReservationError::TicketTypeNotFound {
                event_id,
                name: name.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ticket_type(capacity: u32, committed: u32) -> TicketType {
        TicketType {
            name: TicketTypeName::new("General"),
            capacity,
            committed,
        }
    }

    #[test]
    fn availability_subtracts_committed_and_held() {
        assert_eq!(virtual_availability(&ticket_type(100, 30), 20), 50);
        assert_eq!(virtual_availability(&ticket_type(10, 0), 0), 10);
    }

    #[test]
    fn availability_floors_at_zero_when_oversubscribed() {
        // Two optimistic holds can jointly exceed capacity at the hold layer.
        assert_eq!(virtual_availability(&ticket_type(10, 0), 14), 0);
        assert_eq!(virtual_availability(&ticket_type(10, 10), 3), 0);
    }

    #[test]
    fn granted_ttl_defaults_and_clamps() {
        let policy = HoldPolicy::default();
        assert_eq!(policy.granted_ttl(None), 900);
        assert_eq!(policy.granted_ttl(Some(60)), 60);
        assert_eq!(policy.granted_ttl(Some(0)), 1);
        assert_eq!(policy.granted_ttl(Some(86_400)), 3600);
    }

    proptest! {
        #[test]
        fn availability_never_exceeds_capacity(
            capacity in 0u32..1_000_000,
            committed in 0u32..1_000_000,
            held in 0u64..10_000_000,
        ) {
            let available = virtual_availability(&ticket_type(capacity, committed), held);
            prop_assert!(available <= u64::from(capacity));
        }

        #[test]
        fn availability_is_exact_when_not_oversubscribed(
            capacity in 0u32..1_000_000,
            committed in 0u32..1_000_000,
            held in 0u64..10_000_000,
        ) {
            let total_claimed = u64::from(committed) + held;
            prop_assume!(total_claimed <= u64::from(capacity));
            let available = virtual_availability(&ticket_type(capacity, committed), held);
            prop_assert_eq!(available, u64::from(capacity) - total_claimed);
        }
    }
}
