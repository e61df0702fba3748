//! Router configuration.
//!
//! Builds the complete axum router for the checkout orchestrator.

use super::health::{health_check, readiness_check};
use super::state::AppState;
use crate::api::{availability, holds};
use axum::{
    routing::{delete, get, post},
    Router,
};

/// Build the complete axum router.
///
/// Configures all routes:
/// - Health probes
/// - Hold lifecycle endpoints (reserve, ttl, cancel, commit)
/// - Availability queries
///
/// # Arguments
///
/// - `state`: Application state to share with handlers
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Hold lifecycle
        .route("/holds", post(holds::create_hold))
        .route("/holds/:id/ttl", get(holds::get_hold_ttl))
        .route("/holds/:id", delete(holds::cancel_hold))
        // Called by the payment collaborator, not the browser
        .route("/holds/:id/commit", post(holds::commit_hold))
        // Availability queries
        .route(
            "/events/:id/ticket-types/:name/availability",
            get(availability::get_ticket_type_availability),
        );

    Router::new()
        // Health checks (no state required)
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        // API routes under /api prefix
        .nest("/api", api_routes)
        .with_state(state)
}
