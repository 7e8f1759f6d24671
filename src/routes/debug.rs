use crate::AppState;
use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

/// GET /debug/health - Check if services are working
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let mut status = json!({
        "status": "ok",
        "checks": {}
    });

    let cache = state.trip_generator.cache();
    status["checks"]["cache_backend"] = json!(cache.backend_name());

    if cache.health_check().await {
        status["checks"]["cache"] = json!("ok");
    } else {
        // Trips are still generated without a cache
        status["checks"]["cache"] = json!({"error": "unreachable"});
        status["status"] = json!("degraded");
    }

    match serde_json::to_value(cache.get_stats().await) {
        Ok(stats) => status["checks"]["cache_stats"] = stats,
        Err(e) => status["checks"]["cache_stats"] = json!({"error": e.to_string()}),
    }

    status["checks"]["weather"] = json!(if state.weather_client.is_some() {
        "configured"
    } else {
        "disabled"
    });

    Json(status)
}
