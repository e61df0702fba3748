//! Application state for the HTTP server.

use std::sync::Arc;
use turnstile_core::ReservationManager;

/// State shared across all HTTP handlers.
///
/// Cloned (cheaply via Arc) for each request. The engine is stateless by
/// design: the manager holds no mutable state of its own, only handles to
/// the two external stores.
#[derive(Clone)]
pub struct AppState {
    /// The reservation manager every handler delegates to
    pub manager: Arc<ReservationManager>,
}

impl AppState {
    /// Create application state around a manager.
    #[must_use]
    pub fn new(manager: Arc<ReservationManager>) -> Self {
        Self { manager }
    }
}
