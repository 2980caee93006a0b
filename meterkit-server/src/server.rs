use crate::handlers;
use crate::middleware::log_request;
use crate::routes::{self, RouteTable};
use axum::Router;
use meterkit_observability::{FacadeError, MetricsFacade};
use std::sync::Arc;

pub type FacadeState = Arc<MetricsFacade>;

/// `/metrics` and `/jsonmetrics`.
pub fn metrics_routes() -> RouteTable<FacadeState> {
    RouteTable::new()
        .get("/metrics", handlers::metrics_text)
        .get("/jsonmetrics", handlers::metrics_json)
}

/// `/hello` demo route.
pub fn demo_routes() -> RouteTable<FacadeState> {
    RouteTable::new().get("/hello", handlers::hello)
}

/// Metrics used by [`demo_routes`].
pub fn register_demo_metrics(facade: &MetricsFacade) -> Result<(), FacadeError> {
    facade.register_counter("hello_counter", "/hello example counter metric")?;
    facade.register_gauge("hello_gauge", "/hello example gauge metric")?;
    Ok(())
}

/// Combine the façade routes with the host's, install request logging on
/// all of them and log the resulting route table.
pub fn build_app(facade: FacadeState, host: RouteTable<FacadeState>) -> Router {
    let (router, entries) = metrics_routes().merge(host).into_parts();
    routes::log_routes(&entries);
    router
        .layer(axum::middleware::from_fn(log_request))
        .with_state(facade)
}

/// Resolves on Ctrl-C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
