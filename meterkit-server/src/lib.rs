pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;

pub use routes::{RouteEntry, RouteTable};
pub use server::{build_app, demo_routes, metrics_routes, register_demo_metrics};
