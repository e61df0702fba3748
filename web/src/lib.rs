//! # Turnstile Web
//!
//! The checkout orchestrator: a thin axum facade over the reservation
//! manager. Handlers validate requests and translate domain failures into
//! transport error codes; every business rule lives in `turnstile-core`.
//!
//! # Endpoints
//!
//! ```text
//! POST   /api/holds                                      place a hold
//! GET    /api/holds/:id/ttl                              remaining lifetime
//! DELETE /api/holds/:id                                  early release
//! POST   /api/holds/:id/commit                           payment-confirmed commit
//! GET    /api/events/:id/ticket-types/:name/availability point-in-time view
//! GET    /health, /ready                                 probes
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod error;
pub mod server;

pub use config::Config;
pub use error::AppError;
pub use server::{build_router, AppState};
