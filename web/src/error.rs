//! Error type bridging domain failures to HTTP responses.
//!
//! Implements axum's `IntoResponse` so handlers can use `?` on
//! [`ReservationError`] and get the status/code mapping of the external
//! contract for free.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;
use turnstile_core::ReservationError;

/// Application error type for web handlers.
///
/// # Examples
///
/// ```ignore
/// async fn handler(state: AppState) -> Result<Json<Data>, AppError> {
///     let receipt = state.manager.reserve(request).await?; // domain mapping via From
///     Ok(Json(receipt))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: String,
    /// Internal error (for logging, not exposed to client)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: String) -> Self {
        Self {
            status,
            message,
            code,
            source: None,
        }
    }

    /// Attach a source error for logging.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            message.into(),
            "BAD_REQUEST".to_string(),
        )
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(resource: impl fmt::Display, id: impl fmt::Display) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            format!("{resource} with id {id} not found"),
            "NOT_FOUND".to_string(),
        )
    }

    /// Create a 503 Service Unavailable error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            message.into(),
            "SERVICE_UNAVAILABLE".to_string(),
        )
    }

    /// The HTTP status this error renders as.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// The machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Domain failure → transport code mapping of the external contract.
impl From<ReservationError> for AppError {
    fn from(err: ReservationError) -> Self {
        match err {
            ReservationError::ZeroQuantity | ReservationError::QuantityAboveLimit { .. } => {
                Self::bad_request(err.to_string())
            }
            ReservationError::TicketTypeNotFound { .. } => Self::new(
                StatusCode::NOT_FOUND,
                err.to_string(),
                "NOT_FOUND".to_string(),
            ),
            ReservationError::OutOfStock { .. } => Self::new(
                StatusCode::CONFLICT,
                err.to_string(),
                "OUT_OF_STOCK".to_string(),
            ),
            ReservationError::HoldNotFound(_) => Self::new(
                StatusCode::CONFLICT,
                err.to_string(),
                "HOLD_NOT_FOUND".to_string(),
            ),
            ReservationError::Store(store_err) => {
                Self::unavailable("backing store unavailable").with_source(store_err.into())
            }
        }
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Error code (for client error handling).
    code: String,
    /// Human-readable error message.
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            if let Some(source) = &self.source {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    error = %source,
                    "Server error"
                );
            } else {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    "Server error"
                );
            }
        }

        let body = ErrorResponse {
            code: self.code,
            message: self.message,
        };

        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use turnstile_core::{EventId, HoldId, StoreError, TicketTypeName};

    #[test]
    fn test_error_display() {
        let err = AppError::bad_request("Invalid input");
        assert_eq!(err.to_string(), "[BAD_REQUEST] Invalid input");
    }

    #[test]
    fn out_of_stock_maps_to_conflict() {
        let err = AppError::from(ReservationError::OutOfStock {
            event_id: EventId::new(),
            name: TicketTypeName::new("VIP"),
            requested: 2,
            available: 0,
        });
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.code(), "OUT_OF_STOCK");
    }

    #[test]
    fn missing_hold_maps_to_conflict_with_its_own_code() {
        let err = AppError::from(ReservationError::HoldNotFound(HoldId::new()));
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.code(), "HOLD_NOT_FOUND");
    }

    #[test]
    fn store_outage_maps_to_service_unavailable() {
        let err = AppError::from(ReservationError::Store(StoreError::Unavailable(
            "redis down".to_string(),
        )));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.code(), "SERVICE_UNAVAILABLE");
        // The backend detail stays out of the client-facing message.
        assert!(!err.to_string().contains("redis"));
    }

    #[test]
    fn zero_quantity_maps_to_bad_request() {
        let err = AppError::from(ReservationError::ZeroQuantity);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
