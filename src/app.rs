use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/today", get(handlers::get_today))
        .route("/api/week", get(handlers::get_week))
        .route("/api/intake", post(handlers::intake))
        .route("/api/quick-add/:index", post(handlers::quick_add))
        .route("/api/goal", post(handlers::set_goal))
        .route("/api/reset", post(handlers::reset))
        .route("/api/day/skip", post(handlers::skip_day))
        .with_state(state)
}
