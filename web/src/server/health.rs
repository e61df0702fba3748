//! Health check endpoints.
//!
//! Used by load balancers and monitoring systems to verify service health.

use axum::http::StatusCode;

/// Simple health check endpoint (liveness).
///
/// Returns 200 OK to indicate the process is running. Does NOT check
/// dependencies.
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

/// Readiness check endpoint.
///
/// The stores are reached lazily per request, so readiness here means the
/// router is serving; a store outage surfaces as 503 on the operations
/// themselves.
#[allow(clippy::unused_async)]
pub async fn readiness_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check() {
        let (status, body) = health_check().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }
}
