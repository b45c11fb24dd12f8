use axum::Json;
use serde_json::{json, Value};

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "recipe-api"
    }))
}

/// GET /
/// Lists the endpoints this service answers.
pub async fn index_handler() -> Json<Value> {
    Json(json!({
        "service": "recipe-api",
        "endpoints": {
            "GET /health": "Service status",
            "POST /generate-recipe": "Recommend an enriched recipe for {\"preference\": \"...\"}"
        }
    }))
}
