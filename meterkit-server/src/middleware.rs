use axum::{extract::Request, middleware::Next, response::Response};
use tracing::info;

/// Emit `[<method>] <path>` for every inbound request, then call through.
pub async fn log_request(request: Request, next: Next) -> Response {
    info!("[{}] {}", request.method(), request.uri());
    next.run(request).await
}
