//! Ticket type availability query endpoint.
//!
//! Read-only view of `capacity - committed - live holds`. The number is a
//! point-in-time estimate: it can be stale by the time the client acts on it,
//! and only a successful hold actually claims anything.

use crate::error::AppError;
use crate::server::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use turnstile_core::{EventId, TicketTypeName};
use uuid::Uuid;

/// Availability view for a single ticket type.
#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    /// Event ID
    pub event_id: Uuid,
    /// Ticket type name
    pub ticket_type: String,
    /// Total sellable units
    pub capacity: u32,
    /// Units permanently sold
    pub committed: u32,
    /// Units claimed by currently-live holds
    pub held: u32,
    /// `capacity - committed - held`, floored at zero
    pub available: u32,
}

/// Get point-in-time availability for one ticket type.
///
/// # Example
///
/// ```bash
/// curl http://localhost:8080/api/events/550e8400-e29b-41d4-a716-446655440000/ticket-types/VIP/availability
/// ```
///
/// Response:
/// ```json
/// {
///   "event_id": "550e8400-e29b-41d4-a716-446655440000",
///   "ticket_type": "VIP",
///   "capacity": 100,
///   "committed": 40,
///   "held": 10,
///   "available": 50
/// }
/// ```
pub async fn get_ticket_type_availability(
    Path((event_id, name)): Path<(Uuid, String)>,
    State(state): State<AppState>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let ticket_type = TicketTypeName::new(name);
    let view = state
        .manager
        .availability(EventId::from_uuid(event_id), &ticket_type)
        .await?;

    Ok(Json(AvailabilityResponse {
        event_id,
        ticket_type: ticket_type.to_string(),
        capacity: view.capacity,
        committed: view.committed,
        held: view.held,
        available: view.available,
    }))
}
