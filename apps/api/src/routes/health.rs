use axum::Json;
use serde_json::{json, Value};

pub const LIVENESS_MESSAGE: &str = "ATS Analyzer Backend Working";

/// GET /
/// Plain-text liveness message.
pub async fn root_handler() -> &'static str {
    LIVENESS_MESSAGE
}

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": env!("CARGO_PKG_NAME")
    }))
}
