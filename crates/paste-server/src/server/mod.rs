//! Axum HTTP(S) server, routing, and middleware.
//!
//! # Responsibilities
//! - Define the Axum router with all routes and shared middleware.
//! - Inject shared application state (`AppState`) into handlers.
//! - Serve over plain TCP, or over TLS when a certificate is configured.

pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;
pub mod tls;
