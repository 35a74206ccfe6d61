//! Response envelope shared by every workflow router.
//!
//! Successes carry `{"status": "success", ...}`; failures carry `"fail"` for
//! client errors and `"error"` for server errors, plus a readable message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Map, Value};

pub fn success(status: StatusCode, data: Value) -> Response {
    (status, Json(json!({ "status": "success", "data": data }))).into_response()
}

pub fn success_with(status: StatusCode, data: Value, extra: Map<String, Value>) -> Response {
    let mut body = Map::new();
    body.insert("status".to_string(), Value::from("success"));
    body.extend(extra);
    body.insert("data".to_string(), data);
    (status, Json(Value::Object(body))).into_response()
}

pub fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    let label = if status.is_server_error() {
        "error"
    } else {
        "fail"
    };
    let payload = json!({
        "status": label,
        "message": message.into(),
    });
    (status, Json(payload)).into_response()
}
