use axum::Json;
use serde_json::{json, Value};

pub async fn root() -> &'static str {
    "Hello world!"
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "alive" }))
}
