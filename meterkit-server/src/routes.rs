use axum::Router;
use axum::handler::Handler;
use axum::routing::{self, MethodRouter};
use http::Method;
use std::fmt;
use tracing::debug;

/// One registered route: the methods it answers and its full path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub methods: Vec<Method>,
    pub path: String,
}

impl fmt::Display for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let methods: Vec<String> = self
            .methods
            .iter()
            .map(|m| m.as_str().to_ascii_lowercase())
            .collect();
        write!(f, "{} -> {}", methods.join(","), self.path)
    }
}

/// An axum router that remembers what was added to it.
///
/// axum does not expose its route table, so every route goes through this
/// builder and is recorded alongside.
pub struct RouteTable<S = ()> {
    router: Router<S>,
    entries: Vec<RouteEntry>,
}

impl<S> RouteTable<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self { router: Router::new(), entries: Vec::new() }
    }

    pub fn get<H, T>(self, path: &str, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.route(path, &[Method::GET], routing::get(handler))
    }

    pub fn post<H, T>(self, path: &str, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.route(path, &[Method::POST], routing::post(handler))
    }

    /// Add a route whose method set the caller declares.
    pub fn route(mut self, path: &str, methods: &[Method], method_router: MethodRouter<S>) -> Self {
        self.router = self.router.route(path, method_router);
        self.entries.push(RouteEntry { methods: methods.to_vec(), path: path.to_string() });
        self
    }

    /// Mount `other` under `prefix`; its entries are recorded with the prefix.
    pub fn nest(mut self, prefix: &str, other: RouteTable<S>) -> Self {
        self.router = self.router.nest(prefix, other.router);
        let base = prefix.trim_end_matches('/');
        self.entries.extend(other.entries.into_iter().map(|e| RouteEntry {
            methods: e.methods,
            path: format!("{base}{}", e.path),
        }));
        self
    }

    pub fn merge(mut self, other: RouteTable<S>) -> Self {
        self.router = self.router.merge(other.router);
        self.entries.extend(other.entries);
        self
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn into_parts(self) -> (Router<S>, Vec<RouteEntry>) {
        (self.router, self.entries)
    }
}

impl<S> Default for RouteTable<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// One debug line per route.
pub fn log_routes(entries: &[RouteEntry]) {
    debug!("added new routes");
    for entry in entries {
        debug!("{entry}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn ok() -> &'static str {
        "ok"
    }

    #[test]
    fn records_routes_in_insertion_order() {
        let table: RouteTable = RouteTable::new().get("/a", ok).post("/b", ok);
        let paths: Vec<&str> = table.entries().iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["/a", "/b"]);
        assert_eq!(table.entries()[1].methods, vec![Method::POST]);
    }

    #[test]
    fn nested_routes_carry_the_mount_prefix() {
        let api: RouteTable = RouteTable::new().get("/users", ok);
        let table = RouteTable::new().get("/", ok).nest("/api", api);
        assert_eq!(table.entries()[1].path, "/api/users");
    }

    #[test]
    fn merge_keeps_both_tables() {
        let left: RouteTable = RouteTable::new().get("/l", ok);
        let right: RouteTable = RouteTable::new().get("/r", ok);
        assert_eq!(left.merge(right).entries().len(), 2);
    }

    #[test]
    fn explicit_method_sets_are_recorded() {
        let table: RouteTable = RouteTable::new().route(
            "/item",
            &[Method::GET, Method::PUT],
            routing::get(ok).put(ok),
        );
        assert_eq!(table.entries()[0].to_string(), "get,put -> /item");
    }

    #[test]
    fn display_matches_log_format() {
        let entry = RouteEntry { methods: vec![Method::GET], path: "/metrics".into() };
        assert_eq!(entry.to_string(), "get -> /metrics");
    }
}
