use axum::Router;
use axum::routing::get;

use super::controller;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/audit-logs", get(controller::list))
}
