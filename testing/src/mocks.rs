//! Mock implementations of the store and clock seams.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use turnstile_core::{
    Clock, EventId, Hold, HoldId, HoldStore, InventoryStore, StoreError, TicketType,
    TicketTypeName,
};

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clock that only moves when told to.
///
/// Starts at a fixed instant and advances by explicit calls, making TTL
/// expiry deterministic in tests. Clones share the same instant.
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    /// Create a clock pinned to `start`.
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Move the clock forward by whole seconds.
    pub fn advance_secs(&self, secs: i64) {
        let mut now = lock_unpoisoned(&self.now);
        *now = *now + Duration::seconds(secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *lock_unpoisoned(&self.now)
    }
}

/// Create a manual clock pinned to 2025-01-01 00:00:00 UTC.
///
/// # Panics
///
/// This function will panic if the hardcoded timestamp fails to parse,
/// which should never happen in practice.
#[must_use]
#[allow(clippy::expect_used)]
pub fn test_clock() -> ManualClock {
    ManualClock::new(
        DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
            .expect("hardcoded timestamp should always parse")
            .with_timezone(&Utc),
    )
}

/// Hold store backed by a `HashMap`, with clock-driven lazy expiry.
///
/// Records whose deadline has passed are dropped on the next operation,
/// imitating a TTL-capable store's passive expiration: no sweep task, and a
/// missing record is the only expiry signal.
#[derive(Clone)]
pub struct InMemoryHoldStore {
    clock: Arc<dyn Clock>,
    records: Arc<Mutex<HashMap<HoldId, (Hold, DateTime<Utc>)>>>,
    unavailable: Arc<Mutex<bool>>,
}

impl InMemoryHoldStore {
    /// Create an empty store driven by `clock`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            records: Arc::new(Mutex::new(HashMap::new())),
            unavailable: Arc::new(Mutex::new(false)),
        }
    }

    /// Make every subsequent operation fail with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        *lock_unpoisoned(&self.unavailable) = unavailable;
    }

    /// Number of live records, for assertions.
    #[must_use]
    pub fn live_count(&self) -> usize {
        let now = self.clock.now();
        lock_unpoisoned(&self.records)
            .values()
            .filter(|(_, deadline)| *deadline > now)
            .count()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if *lock_unpoisoned(&self.unavailable) {
            return Err(StoreError::Unavailable(
                "in-memory hold store marked unavailable".to_string(),
            ));
        }
        Ok(())
    }

    fn expire_lapsed(records: &mut HashMap<HoldId, (Hold, DateTime<Utc>)>, now: DateTime<Utc>) {
        records.retain(|_, (_, deadline)| *deadline > now);
    }
}

#[async_trait]
impl HoldStore for InMemoryHoldStore {
    async fn put(&self, hold: &Hold, ttl_seconds: u64) -> Result<(), StoreError> {
        self.check_available()?;
        let now = self.clock.now();
        let deadline = now + Duration::seconds(i64::try_from(ttl_seconds).unwrap_or(i64::MAX));
        let mut records = lock_unpoisoned(&self.records);
        Self::expire_lapsed(&mut records, now);
        records.insert(hold.id, (hold.clone(), deadline));
        Ok(())
    }

    async fn holds_for(
        &self,
        event_id: EventId,
        ticket_type: &TicketTypeName,
    ) -> Result<Vec<Hold>, StoreError> {
        self.check_available()?;
        let now = self.clock.now();
        let mut records = lock_unpoisoned(&self.records);
        Self::expire_lapsed(&mut records, now);
        Ok(records
            .values()
            .filter(|(hold, _)| hold.event_id == event_id && &hold.ticket_type == ticket_type)
            .map(|(hold, _)| hold.clone())
            .collect())
    }

    async fn find(&self, hold_id: HoldId) -> Result<Option<(Hold, u64)>, StoreError> {
        self.check_available()?;
        let now = self.clock.now();
        let mut records = lock_unpoisoned(&self.records);
        Self::expire_lapsed(&mut records, now);
        Ok(records.get(&hold_id).map(|(hold, deadline)| {
            let ttl = u64::try_from((*deadline - now).num_seconds()).unwrap_or(0);
            (hold.clone(), ttl)
        }))
    }

    async fn remove(&self, hold: &Hold) -> Result<bool, StoreError> {
        self.check_available()?;
        let now = self.clock.now();
        let mut records = lock_unpoisoned(&self.records);
        Self::expire_lapsed(&mut records, now);
        Ok(records.remove(&hold.id).is_some())
    }
}

/// Inventory record store backed by a `HashMap`.
///
/// The committed increment happens under one lock acquisition, mirroring the
/// single-statement atomicity the Postgres adapter provides.
#[derive(Clone, Default)]
pub struct InMemoryInventoryStore {
    records: Arc<Mutex<HashMap<(EventId, TicketTypeName), TicketType>>>,
    unavailable: Arc<Mutex<bool>>,
}

impl InMemoryInventoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        *lock_unpoisoned(&self.unavailable) = unavailable;
    }

    /// Seed a ticket type without going through the async trait.
    pub fn insert_ticket_type(&self, event_id: EventId, ticket_type: TicketType) {
        lock_unpoisoned(&self.records)
            .insert((event_id, ticket_type.name.clone()), ticket_type);
    }

    /// Current committed counter, for assertions.
    #[must_use]
    pub fn committed(&self, event_id: EventId, name: &TicketTypeName) -> Option<u32> {
        lock_unpoisoned(&self.records)
            .get(&(event_id, name.clone()))
            .map(|ticket_type| ticket_type.committed)
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if *lock_unpoisoned(&self.unavailable) {
            return Err(StoreError::Unavailable(
                "in-memory inventory store marked unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl InventoryStore for InMemoryInventoryStore {
    async fn ticket_type(
        &self,
        event_id: EventId,
        name: &TicketTypeName,
    ) -> Result<Option<TicketType>, StoreError> {
        self.check_available()?;
        Ok(lock_unpoisoned(&self.records)
            .get(&(event_id, name.clone()))
            .cloned())
    }

    async fn add_committed(
        &self,
        event_id: EventId,
        name: &TicketTypeName,
        quantity: u32,
    ) -> Result<(), StoreError> {
        self.check_available()?;
        let mut records = lock_unpoisoned(&self.records);
        let Some(ticket_type) = records.get_mut(&(event_id, name.clone())) else {
            return Err(StoreError::Inconsistent(format!(
                "ticket type {name} for event {event_id} has no inventory record"
            )));
        };
        ticket_type.committed = ticket_type.committed.saturating_add(quantity);
        Ok(())
    }

    async fn put_ticket_type(
        &self,
        event_id: EventId,
        ticket_type: &TicketType,
    ) -> Result<(), StoreError> {
        self.check_available()?;
        lock_unpoisoned(&self.records)
            .insert((event_id, ticket_type.name.clone()), ticket_type.clone());
        Ok(())
    }
}
