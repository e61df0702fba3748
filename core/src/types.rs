//! Domain types for the reservation engine.
//!
//! Identifiers are uuid newtypes; ticket-type names and owner identities stay
//! opaque strings. The two records that matter are [`TicketType`] (durable
//! counters, owned by the event catalog) and [`Hold`] (ephemeral, TTL-bounded
//! claim).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for an event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(Uuid);

impl EventId {
    /// Creates a new random `EventId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an `EventId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a hold
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HoldId(Uuid);

impl HoldId {
    /// Creates a new random `HoldId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `HoldId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for HoldId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HoldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Name of a ticket type within an event (e.g. "VIP", "General")
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketTypeName(String);

impl TicketTypeName {
    /// Create a ticket type name
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The name as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TicketTypeName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl From<&str> for TicketTypeName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl fmt::Display for TicketTypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity a hold was created for.
///
/// Used only for idempotent-reuse matching on `reserve`; access control is
/// the auth collaborator's concern, not the engine's.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerId(String);

impl OwnerId {
    /// Create an owner identity
    #[must_use]
    pub fn new(owner: impl Into<String>) -> Self {
        Self(owner.into())
    }

    /// The identity as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for OwnerId {
    fn from(owner: String) -> Self {
        Self(owner)
    }
}

impl From<&str> for OwnerId {
    fn from(owner: &str) -> Self {
        Self(owner.to_string())
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Records
// ============================================================================

/// A sellable ticket category within an event.
///
/// Invariant: `committed <= capacity` once all in-flight holds have settled.
/// `committed` only ever grows, and only through the commit path; holds are
/// tracked separately and never touch this record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketType {
    /// Name of the ticket type, unique within its event
    pub name: TicketTypeName,
    /// Total sellable units
    pub capacity: u32,
    /// Units permanently sold
    pub committed: u32,
}

impl TicketType {
    /// Create a ticket type with nothing committed yet
    #[must_use]
    pub fn new(name: impl Into<TicketTypeName>, capacity: u32) -> Self {
        Self {
            name: name.into(),
            capacity,
            committed: 0,
        }
    }

    /// Capacity not yet permanently sold. Live holds are not subtracted here.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.capacity.saturating_sub(self.committed)
    }
}

/// A provisional, time-limited claim on `quantity` units of a ticket type.
///
/// Lifetime is governed entirely by the hold store's TTL: a hold is destroyed
/// by exactly one of commit, cancel, or passive store expiry. There is no
/// explicit "expired" transition anywhere; absence of the record is the
/// signal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hold {
    /// Opaque, globally unique hold identifier
    pub id: HoldId,
    /// Event the hold belongs to
    pub event_id: EventId,
    /// Ticket type being held
    pub ticket_type: TicketTypeName,
    /// Units claimed; always greater than zero
    pub quantity: u32,
    /// Identity the hold was created for
    pub owner: OwnerId,
    /// When the hold was created
    pub created_at: DateTime<Utc>,
    /// When the store will drop the record
    pub expires_at: DateTime<Utc>,
}

impl Hold {
    /// Whether the hold is still alive at `now`.
    #[must_use]
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }

    /// Whole seconds of life left at `now`; zero once expired.
    #[must_use]
    pub fn remaining_ttl(&self, now: DateTime<Utc>) -> u64 {
        u64::try_from((self.expires_at - now).num_seconds()).unwrap_or(0)
    }
}
