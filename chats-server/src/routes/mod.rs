//! Axum router construction.
//!
//! [`build`] assembles the complete application router, including:
//! - Per-request trace-ID middleware
//! - Liveness routes (`/`, `/health`)
//! - Chat record routes under `/chats`
//! - A static-asset fallback for every path no route claims

mod chats;
mod health;

use axum::{middleware, Router};
use std::sync::Arc;
use tower_http::services::ServeDir;

use crate::middleware::trace;
use crate::state::AppState;

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let assets = ServeDir::new(&state.config.static_dir);

    Router::new()
        .merge(health::router())
        .merge(chats::router())
        .fallback_service(assets)
        .layer(middleware::from_fn(trace::trace_middleware))
        .with_state(state)
}
