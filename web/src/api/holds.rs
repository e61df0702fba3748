//! Hold lifecycle endpoints.
//!
//! - `POST /api/holds` - place a TTL-bounded hold on a ticket type
//! - `GET /api/holds/:id/ttl` - remaining lifetime (0 once gone)
//! - `DELETE /api/holds/:id` - best-effort early release
//! - `POST /api/holds/:id/commit` - payment-confirmed durable decrement
//!
//! The commit route is for the payment collaborator, not the browser: a
//! `HOLD_NOT_FOUND` response there means the sale cannot be fulfilled and
//! must be refunded or escalated, never marked fulfilled.

use crate::error::AppError;
use crate::server::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use turnstile_core::{EventId, HoldId, OwnerId, ReserveRequest, TicketTypeName};
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to place a hold.
#[derive(Debug, Deserialize)]
pub struct CreateHoldRequest {
    /// Event to hold tickets for
    pub event_id: Uuid,
    /// Ticket type name within the event (e.g. "VIP", "General")
    pub ticket_type: String,
    /// Number of tickets to hold
    pub quantity: u32,
    /// Identity the hold belongs to; used for idempotent re-use, not access
    /// control
    pub owner_id: String,
    /// Requested TTL in seconds; omitted takes the server default
    pub ttl_seconds: Option<u64>,
}

/// Response after placing (or re-using) a hold.
#[derive(Debug, Serialize)]
pub struct CreateHoldResponse {
    /// Granted hold ID
    pub hold_id: Uuid,
    /// TTL actually granted, in seconds
    pub ttl_seconds: u64,
    /// When the hold lapses
    pub expires_at: DateTime<Utc>,
}

/// Remaining-TTL response. Zero means the hold is gone.
#[derive(Debug, Serialize)]
pub struct HoldTtlResponse {
    /// Whole seconds of life left
    pub ttl_seconds: u64,
}

/// Response after cancelling a hold.
#[derive(Debug, Serialize)]
pub struct CancelHoldResponse {
    /// Always `true`; a missing hold is reported as 404 instead
    pub success: bool,
}

/// Response after committing a hold.
#[derive(Debug, Serialize)]
pub struct CommitHoldResponse {
    /// Always `true`; failures are reported as errors
    pub committed: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// Place a TTL-bounded hold on a ticket type.
///
/// Safe to retry: a live hold by the same `owner_id` on the same ticket type
/// is returned again instead of creating a competitor. Nothing durable is
/// consumed until the payment collaborator commits the hold.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/api/holds \
///   -H "Content-Type: application/json" \
///   -d '{
///     "event_id": "550e8400-e29b-41d4-a716-446655440000",
///     "ticket_type": "VIP",
///     "quantity": 2,
///     "owner_id": "customer-42",
///     "ttl_seconds": 900
///   }'
/// ```
///
/// Response (201):
/// ```json
/// {
///   "hold_id": "660e8400-e29b-41d4-a716-446655440001",
///   "ttl_seconds": 900,
///   "expires_at": "2025-06-01T12:15:00Z"
/// }
/// ```
pub async fn create_hold(
    State(state): State<AppState>,
    Json(request): Json<CreateHoldRequest>,
) -> Result<(StatusCode, Json<CreateHoldResponse>), AppError> {
    let receipt = state
        .manager
        .reserve(ReserveRequest {
            event_id: EventId::from_uuid(request.event_id),
            ticket_type: TicketTypeName::new(request.ticket_type),
            quantity: request.quantity,
            owner: OwnerId::new(request.owner_id),
            ttl_seconds: request.ttl_seconds,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateHoldResponse {
            hold_id: *receipt.hold_id.as_uuid(),
            ttl_seconds: receipt.ttl_seconds,
            expires_at: receipt.expires_at,
        }),
    ))
}

/// Remaining lifetime of a hold in whole seconds.
///
/// Returns `{"ttl_seconds": 0}` with 200 when the hold is gone - expired,
/// committed, cancelled, and never-existed all look the same to the caller.
pub async fn get_hold_ttl(
    Path(hold_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<HoldTtlResponse>, AppError> {
    let ttl_seconds = state
        .manager
        .remaining_ttl(HoldId::from_uuid(hold_id))
        .await?;
    Ok(Json(HoldTtlResponse { ttl_seconds }))
}

/// Release a hold ahead of its TTL.
///
/// 404 when the hold was already gone; clients treat that as non-fatal
/// cleanup, not a failed state transition.
pub async fn cancel_hold(
    Path(hold_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<CancelHoldResponse>, AppError> {
    let removed = state.manager.cancel(HoldId::from_uuid(hold_id)).await?;
    if removed {
        Ok(Json(CancelHoldResponse { success: true }))
    } else {
        Err(AppError::not_found("Hold", hold_id))
    }
}

/// Convert a hold into a durable stock decrement.
///
/// Called by the payment collaborator on confirmed payment. A
/// `HOLD_NOT_FOUND` conflict here means the payment cannot be fulfilled
/// from inventory; the caller must refund or escalate.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/api/holds/660e8400-e29b-41d4-a716-446655440001/commit
/// ```
///
/// Response (200):
/// ```json
/// { "committed": true }
/// ```
pub async fn commit_hold(
    Path(hold_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<CommitHoldResponse>, AppError> {
    state.manager.commit(HoldId::from_uuid(hold_id)).await?;
    Ok(Json(CommitHoldResponse { committed: true }))
}
