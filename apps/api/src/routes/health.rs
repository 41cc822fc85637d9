use axum::Json;
use serde_json::{json, Value};

/// GET /health
/// Returns a simple status object with service version and server time.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "hibi-api",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
