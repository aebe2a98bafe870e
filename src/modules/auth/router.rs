use axum::Router;
use axum::routing::{get, post};

use super::controller;
use crate::state::AppState;

/// Routes that must work without an authenticated context.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(controller::login))
        .route("/api/auth/csrf-token", get(controller::csrf_token))
}

/// Routes behind the full pipeline.
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/logout", post(controller::logout))
        .route("/api/auth/me", get(controller::me))
        .route("/api/auth/context", get(controller::context))
}
