//! Axum router construction.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use common::protocol::PASTES_PATH;
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};

use super::{handlers, middleware, state::AppState};

/// Build the application [`Router`] with all routes and middleware attached.
pub fn build(state: AppState) -> Router {
    let body_limit = middleware::body_limit(state.limits.max_envelope_len);

    Router::new()
        .route(PASTES_PATH, post(handlers::create_paste))
        .route(&format!("{PASTES_PATH}/:id"), get(handlers::get_paste))
        .route("/health", get(handlers::health))
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(middleware::REQUEST_TIMEOUT))
        .layer(CompressionLayer::new())
        .with_state(state)
}
