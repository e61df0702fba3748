//! # Turnstile Core
//!
//! Domain model and reservation logic for the Turnstile ticket inventory
//! reservation engine: short-lived, TTL-bounded holds on a finite ticket-type
//! inventory, converted into a permanent stock decrement only on confirmed
//! payment.
//!
//! ## Core Concepts
//!
//! - **Hold**: a provisional, time-limited claim on `quantity` units of a
//!   ticket type. Purely ephemeral; it never touches the durable counters.
//! - **Commit**: the durable conversion of a hold into consumed inventory,
//!   performed as a single atomic increment of the `committed` counter.
//! - **Virtual availability**: `capacity - committed - live holds`, a
//!   point-in-time estimate recomputed on every hold attempt. It is not a
//!   lock, and concurrent callers can transiently oversubscribe the hold
//!   layer; commit is the only operation that durably consumes capacity.
//! - **Passive expiry**: hold lifetime is enforced by the hold store's own
//!   per-key TTL. Nothing here sweeps; a missing record *is* the expiry
//!   signal.
//!
//! ## Architecture
//!
//! The engine is stateless: every operation coordinates exclusively through
//! two external stores reached via the [`store::HoldStore`] and
//! [`store::InventoryStore`] seams. Production adapters live in the
//! `turnstile-redis` and `turnstile-postgres` crates; in-memory mocks in
//! `turnstile-testing`.

pub mod clock;
pub mod error;
pub mod manager;
pub mod store;
pub mod types;

pub use clock::{Clock, SystemClock};
pub use error::{ReservationError, StoreError};
pub use manager::{
    CommittedHold, HoldPolicy, HoldReceipt, ReservationManager, ReserveRequest,
    TicketTypeAvailability,
};
pub use store::{HoldStore, InventoryStore};
pub use types::{EventId, Hold, HoldId, OwnerId, TicketType, TicketTypeName};
