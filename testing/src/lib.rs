//! # Turnstile Testing
//!
//! Testing utilities for the Turnstile reservation engine.
//!
//! This crate provides:
//! - In-memory implementations of both store seams
//! - A manually-advanced clock, so TTL expiry is exercised without waiting
//!   on wall-clock time
//! - Failure injection for the fail-closed paths
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use turnstile_core::{HoldPolicy, ReservationManager};
//! use turnstile_testing::{test_clock, InMemoryHoldStore, InMemoryInventoryStore};
//!
//! #[tokio::test]
//! async fn test_hold_flow() {
//!     let clock = test_clock();
//!     let holds = InMemoryHoldStore::new(Arc::new(clock.clone()));
//!     let inventory = InMemoryInventoryStore::new();
//!
//!     let manager = ReservationManager::new(
//!         Arc::new(holds),
//!         Arc::new(inventory),
//!         Arc::new(clock.clone()),
//!         HoldPolicy::default(),
//!     );
//!
//!     // reserve, advance the clock, observe expiry...
//! }
//! ```

pub mod mocks;

pub use mocks::{test_clock, InMemoryHoldStore, InMemoryInventoryStore, ManualClock};
