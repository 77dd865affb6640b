use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/today", get(handlers::get_today))
        .route("/api/water", post(handlers::add_water))
        .route("/api/clear", post(handlers::clear_intake))
        .route("/api/goal", post(handlers::set_goal))
        .route("/api/increment", post(handlers::set_increment))
        .route("/api/intake/:date", get(handlers::get_intake))
        .route("/api/calendar", get(handlers::get_calendar))
        .route("/api/changes", get(handlers::get_changes))
        .route("/api/debug/fake-day", post(handlers::debug_fake_day))
        .route("/api/debug/clear-history", post(handlers::debug_clear_history))
        .with_state(state)
}
