use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Service version plus the bot's delivery counters.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let store = state.store.lock().await;
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": env!("CARGO_PKG_NAME"),
        "sent": store.sent.len(),
        "subscribers": store.users.active_count(),
        "fresh": store.fresh.vacancies().len(),
    }))
}
