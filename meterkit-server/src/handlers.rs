use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use meterkit_observability::MetricsFacade;
use meterkit_observability::exposition::MetricJson;
use rand::Rng;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::error;

/// Text exposition of every registered metric.
pub async fn metrics_text(State(facade): State<Arc<MetricsFacade>>) -> Response {
    match facade.gather_text() {
        Ok(body) => ([(header::CONTENT_TYPE, facade.content_type())], body).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// The same metric set as a JSON array of families.
pub async fn metrics_json(State(facade): State<Arc<MetricsFacade>>) -> Json<Vec<MetricJson>> {
    Json(facade.gather_json())
}

/// Demo route: bumps `hello_counter`, touches an unregistered metric and
/// sets `hello_gauge` to a roll in 1..=100.
pub async fn hello(State(facade): State<Arc<MetricsFacade>>) -> Json<Value> {
    facade.update_metric("hello_counter", 1.0);
    // not registered on purpose, produces a warning
    facade.update_metric("fake_metric", 1.0);
    let roll: u32 = rand::thread_rng().gen_range(1..=100);
    facade.update_metric("hello_gauge", f64::from(roll));
    Json(json!({ "message": "hello world" }))
}
