//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Collect routes from the route table, handler providers and manual registration
//! - Rewrite `:param` / `*rest` paths to axum syntax under the root path
//! - Run global middleware, route middleware and handler as one chain
//! - Wire up middleware layers (tracing, timeout, request ID)
//! - Serve until the shutdown signal fires

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    http::{Method, Request},
    middleware,
    response::Response,
    routing::{MethodFilter, MethodRouter},
    Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{services::ServeDir, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::handler::context::{handler, Context, Handler, RouteConfig};
use crate::handler::pool::HandlerPool;
use crate::http::context::HttpContext;
use crate::http::request::request_id_middleware;
use crate::observability::metrics;
use crate::routing::table::RouteTable;

/// Routes registered under a shared prefix and middleware.
pub struct RouteGroup {
    prefix: String,
    middleware: Vec<Handler>,
    routes: Vec<RouteConfig>,
}

impl RouteGroup {
    pub fn add(
        &mut self,
        method: &str,
        path: &str,
        handler: Handler,
        middleware: Vec<Handler>,
    ) -> &mut Self {
        let mut route = RouteConfig::new(method, join_paths(&self.prefix, path), handler);
        route.middleware = self.middleware.iter().cloned().chain(middleware).collect();
        self.routes.push(route);
        self
    }
}

/// HTTP transport for a bound route table.
pub struct HttpServer {
    config: ServerConfig,
    middleware: Vec<Handler>,
    routes: Vec<RouteConfig>,
    root_routes: Vec<RouteConfig>,
    static_dirs: Vec<(String, PathBuf)>,
}

impl HttpServer {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            middleware: Vec::new(),
            routes: Vec::new(),
            root_routes: Vec::new(),
            static_dirs: Vec::new(),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Middleware run before every route's own chain, in registration order.
    pub fn use_middleware(&mut self, middleware: Handler) -> &mut Self {
        self.middleware.push(middleware);
        self
    }

    pub fn add(
        &mut self,
        method: &str,
        path: &str,
        handler: Handler,
        middleware: Vec<Handler>,
    ) -> &mut Self {
        let mut route = RouteConfig::new(method, path, handler);
        route.middleware = middleware;
        self.routes.push(route);
        self
    }

    pub fn group<F>(&mut self, prefix: &str, middleware: Vec<Handler>, register: F) -> &mut Self
    where
        F: FnOnce(&mut RouteGroup),
    {
        let mut group = RouteGroup {
            prefix: prefix.to_string(),
            middleware,
            routes: Vec::new(),
        };
        register(&mut group);
        self.routes.extend(group.routes);
        self
    }

    pub fn routes(&mut self, routes: Vec<RouteConfig>) -> &mut Self {
        self.routes.extend(routes);
        self
    }

    /// Register every bound route of `table`, in table order.
    pub fn mount(&mut self, table: &RouteTable) -> &mut Self {
        self.routes(table.route_configs())
    }

    /// Register the explicit routes handler instances provide.
    pub fn mount_providers(&mut self, pool: &HandlerPool) -> &mut Self {
        self.routes(pool.provided_routes())
    }

    pub fn static_dir(&mut self, prefix: &str, root: impl Into<PathBuf>) -> &mut Self {
        self.static_dirs.push((prefix.to_string(), root.into()));
        self
    }

    /// `/ping`, `/liveness` and `/readiness`, outside the root path.
    pub fn health_check(&mut self) -> &mut Self {
        let endpoints = [
            ("/ping", "message", "pong"),
            ("/liveness", "status", "alive"),
            ("/readiness", "status", "ready"),
        ];
        for (path, key, value) in endpoints {
            self.root_routes.push(RouteConfig::new(
                "GET",
                path,
                handler(move |ctx| {
                    ctx.json(200, json!({ key: value }));
                    Ok(())
                }),
            ));
        }
        self
    }

    /// Routes registered so far, health checks included.
    pub fn route_count(&self) -> usize {
        self.routes.len() + self.root_routes.len()
    }

    /// Build the axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn into_router(self) -> Router {
        let global = self.middleware;
        let body_limit = self.config.body_limit_bytes;
        let prefixed = self
            .routes
            .into_iter()
            .map(|route| {
                let path = join_paths(&self.config.root_path, &route.path);
                (path, route)
            });
        let unprefixed = self.root_routes.into_iter().map(|route| (route.path.clone(), route));

        let mut seen = HashSet::new();
        let mut shapes: HashMap<String, String> = HashMap::new();
        let mut method_routers: BTreeMap<String, MethodRouter> = BTreeMap::new();

        for (path, route) in prefixed.chain(unprefixed) {
            let Some((method, filter)) = method_filter(&route.method) else {
                tracing::warn!(method = %route.method, path = %path, "Skipping route with unsupported method");
                continue;
            };
            let axum_path = to_axum_path(&path);
            if let Some(reason) = invalid_path_reason(&axum_path) {
                tracing::warn!(method = %method, path = %path, reason = %reason, "Skipping route with unsupported path");
                continue;
            }
            let shape = path_shape(&axum_path);
            if let Some(existing) = shapes.get(&shape).filter(|existing| **existing != axum_path) {
                tracing::warn!(
                    method = %method,
                    path = %path,
                    conflicts_with = %existing,
                    "Skipping route whose parameters conflict with an earlier route"
                );
                continue;
            }
            if !seen.insert((method.clone(), axum_path.clone())) {
                tracing::warn!(method = %method, path = %path, "Skipping duplicate route; first registration wins");
                continue;
            }
            shapes.entry(shape).or_insert_with(|| axum_path.clone());

            let chain: Arc<[Handler]> = global
                .iter()
                .cloned()
                .chain(route.middleware)
                .chain(std::iter::once(route.handler))
                .collect();
            let endpoint = move |request: Request<Body>| {
                let chain = Arc::clone(&chain);
                async move { dispatch(chain, request, body_limit).await }
            };

            tracing::debug!(method = %method, path = %axum_path, "Route registered");
            let router = method_routers
                .remove(&axum_path)
                .unwrap_or_else(MethodRouter::new);
            method_routers.insert(axum_path, router.on(filter, endpoint));
        }

        let mut router = Router::new();
        for (path, method_router) in method_routers {
            router = router.route(&path, method_router);
        }
        for (prefix, root) in self.static_dirs {
            let prefix = prefix.trim_matches('/');
            router = if prefix.is_empty() {
                router.fallback_service(ServeDir::new(root))
            } else {
                router.nest_service(&ensure_leading_slash(prefix), ServeDir::new(root))
            };
        }

        router
            .layer(TimeoutLayer::new(Duration::from_secs(self.config.request_timeout_secs)))
            .layer(middleware::from_fn(request_id_middleware))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            mode = %self.config.mode,
            root_path = %self.config.root_path,
            routes = self.route_count(),
            "HTTP server starting"
        );

        let app = self.into_router();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Run one handler chain against a request.
async fn dispatch(chain: Arc<[Handler]>, request: Request<Body>, body_limit: usize) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();

    let mut ctx = match HttpContext::from_request(request, body_limit).await {
        Ok(ctx) => ctx,
        Err(response) => {
            metrics::record_request(&method, response.status().as_u16(), start);
            return response;
        }
    };

    for step in chain.iter() {
        if let Err(e) = step(&mut ctx as &mut dyn Context) {
            tracing::warn!(method = %method, path = %ctx.path(), error = %e, "Handler chain failed");
            ctx.fail(&e);
            break;
        }
        if ctx.is_aborted() {
            break;
        }
    }

    let response = ctx.into_response();
    metrics::record_request(&method, response.status().as_u16(), start);
    response
}

fn method_filter(verb: &str) -> Option<(Method, MethodFilter)> {
    let method = Method::from_bytes(verb.to_ascii_uppercase().as_bytes()).ok()?;
    let filter = MethodFilter::try_from(method.clone()).ok()?;
    Some((method, filter))
}

/// Join a prefix and a route path into one absolute path.
fn join_paths(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    match (prefix.is_empty(), path.is_empty()) {
        (true, true) => "/".to_string(),
        (true, false) => format!("/{}", path),
        (false, true) => ensure_leading_slash(prefix),
        (false, false) => format!("{}/{}", ensure_leading_slash(prefix), path),
    }
}

fn ensure_leading_slash(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

/// Rewrite `/users/:id/*rest` into `/users/{id}/{*rest}`.
fn to_axum_path(path: &str) -> String {
    let segments: Vec<String> = path
        .split('/')
        .map(|segment| {
            if let Some(name) = segment.strip_prefix(':') {
                format!("{{{}}}", name)
            } else if segment == "*" {
                "{*wildcard}".to_string()
            } else if let Some(name) = segment.strip_prefix('*') {
                format!("{{*{}}}", name)
            } else {
                segment.to_string()
            }
        })
        .collect();
    segments.join("/")
}

/// Why axum would refuse `path` (already in axum syntax), if it would.
fn invalid_path_reason(path: &str) -> Option<String> {
    if !path.starts_with('/') {
        return Some("path must start with '/'".to_string());
    }

    let segments: Vec<&str> = path.split('/').skip(1).collect();
    let last = segments.len().saturating_sub(1);
    let mut names = HashSet::new();

    for (index, segment) in segments.iter().enumerate() {
        if !segment.contains(['{', '}']) {
            continue;
        }
        let Some(inner) = segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) else {
            return Some(format!("segment `{}` is not a whole parameter", segment));
        };
        let (name, catch_all) = match inner.strip_prefix('*') {
            Some(name) => (name, true),
            None => (inner, false),
        };
        if name.is_empty() || name.contains(['{', '}', '*']) {
            return Some(format!("invalid parameter `{}`", segment));
        }
        if catch_all && index != last {
            return Some(format!("catch-all `{}` must be the last segment", segment));
        }
        if !names.insert(name) {
            return Some(format!("parameter `{}` appears twice", name));
        }
    }
    None
}

/// `path` with parameter names erased; equal shapes match the same requests.
fn path_shape(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if segment.starts_with("{*") {
                "{*}"
            } else if segment.starts_with('{') {
                "{}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    fn server() -> HttpServer {
        HttpServer::new(ServerConfig::default())
    }

    async fn send(router: Router, method: &str, uri: &str) -> Response {
        router
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_path_rewriting() {
        assert_eq!(to_axum_path("/users/:id"), "/users/{id}");
        assert_eq!(to_axum_path("/files/*rest"), "/files/{*rest}");
        assert_eq!(to_axum_path("/files/*"), "/files/{*wildcard}");
        assert_eq!(to_axum_path("/say-hi"), "/say-hi");
    }

    #[test]
    fn test_join_paths() {
        assert_eq!(join_paths("", "/ping"), "/ping");
        assert_eq!(join_paths("/api/v1/", "/ping"), "/api/v1/ping");
        assert_eq!(join_paths("api", "ping"), "/api/ping");
        assert_eq!(join_paths("/api", "/"), "/api");
        assert_eq!(join_paths("", ""), "/");
    }

    #[tokio::test]
    async fn test_routes_live_under_root_path_and_health_at_root() {
        let mut config = ServerConfig::default();
        config.root_path = "/api".into();
        let mut server = HttpServer::new(config);
        server.health_check().add(
            "GET",
            "/users/:id",
            handler(|ctx| {
                let id = ctx.param("id").unwrap_or_default().to_string();
                ctx.json(200, json!({ "id": id }));
                Ok(())
            }),
            Vec::new(),
        );
        let router = server.into_router();

        let response = send(router.clone(), "GET", "/api/users/42").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(body_json(response).await["id"], "42");

        let response = send(router.clone(), "GET", "/ping").await;
        assert_eq!(body_json(response).await["message"], "pong");

        let response = send(router, "GET", "/users/42").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_abort_stops_chain() {
        let mut server = server();
        server
            .use_middleware(handler(|ctx| {
                if ctx.header("authorization").is_none() {
                    ctx.abort_with_status_json(401, json!({ "error": "unauthorized" }));
                }
                Ok(())
            }))
            .add(
                "GET",
                "/secret",
                handler(|ctx| {
                    ctx.string(200, "secret".into());
                    Ok(())
                }),
                Vec::new(),
            );

        let response = send(server.into_router(), "GET", "/secret").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_handler_error_becomes_json_error() {
        let mut server = server();
        server.group("/v1", Vec::new(), |group| {
            group
                .add(
                    "POST",
                    "/conflict",
                    handler(|_ctx| Err(crate::handler::context::HandlerError::status(409, "taken"))),
                    Vec::new(),
                )
                .add(
                    "GET",
                    "/boom",
                    handler(|_ctx| Err(crate::handler::context::HandlerError::other(std::io::Error::other("disk")))),
                    Vec::new(),
                );
        });
        let router = server.into_router();

        let response = send(router.clone(), "POST", "/v1/conflict").await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(response).await["error"], "taken");

        let response = send(router, "GET", "/v1/boom").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_duplicate_route_keeps_first_and_methods_share_path() {
        let reply = |text: &'static str| {
            handler(move |ctx| {
                ctx.string(200, text.into());
                Ok(())
            })
        };
        let mut server = server();
        server
            .add("GET", "/item", reply("first"), Vec::new())
            .add("GET", "/item", reply("second"), Vec::new())
            .add("DELETE", "/item", reply("deleted"), Vec::new())
            .add("BREW", "/item", reply("coffee"), Vec::new());
        let router = server.into_router();

        let response = send(router.clone(), "GET", "/item").await;
        let bytes = axum::body::to_bytes(response.into_body(), 64).await.unwrap();
        assert_eq!(&bytes[..], b"first");

        let response = send(router, "DELETE", "/item").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_static_dir_serves_files_under_prefix() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("hello.txt"), "hello from disk").unwrap();

        let mut server = server();
        server.health_check().static_dir("assets/", dir.path());
        let router = server.into_router();

        let response = send(router.clone(), "GET", "/assets/hello.txt").await;
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), 64).await.unwrap();
        assert_eq!(&bytes[..], b"hello from disk");

        let response = send(router.clone(), "GET", "/assets/missing.txt").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = send(router, "GET", "/ping").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_invalid_path_reason() {
        assert_eq!(invalid_path_reason("/users/{id}"), None);
        assert_eq!(invalid_path_reason("/files/{*rest}"), None);
        assert!(invalid_path_reason("/files/{*rest}/tail").is_some());
        assert!(invalid_path_reason("/a/{b").is_some());
        assert!(invalid_path_reason("/a/{}").is_some());
        assert!(invalid_path_reason("/a/{id}/{id}").is_some());
        assert_eq!(path_shape("/users/{id}/files/{*rest}"), "/users/{}/files/{*}");
    }

    #[tokio::test]
    async fn test_mount_skips_unroutable_paths() {
        use crate::handler::instance::HandlerObject;
        use crate::routing::resolver::Resolver;
        use crate::scanner::Scanner;

        let source = r#"
impl FileApi {
    /// @route GET /files/*rest/tail
    fn tail(&self, ctx: &mut dyn Context) {}

    /// @route GET /a/{b
    fn unclosed(&self, ctx: &mut dyn Context) {}

    /// @route GET /users/:id
    fn get_user(&self, ctx: &mut dyn Context) {}

    /// @route DELETE /users/:name
    fn delete_user(&self, ctx: &mut dyn Context) {}

    /// @route GET /health
    fn health(&self, ctx: &mut dyn Context) {}
}
"#;
        let mut pool = HandlerPool::new();
        pool.register(
            HandlerObject::builder("FileApi")
                .handler("tail", |ctx| ctx.string(200, "tail".into()))
                .handler("unclosed", |ctx| ctx.string(200, "unclosed".into()))
                .handler("get_user", |ctx| ctx.string(200, "user".into()))
                .handler("delete_user", |ctx| ctx.string(200, "deleted".into()))
                .handler("health", |ctx| ctx.string(200, "ok".into()))
                .build(),
        );
        let report = Scanner::new().scan_source(std::path::Path::new("file_api.rs"), source);
        let table = Resolver::new().resolve(&report.intents, &pool);
        assert_eq!(table.len(), 5);

        let mut server = server();
        server.mount(&table);
        let router = server.into_router();

        let response = send(router.clone(), "GET", "/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        let response = send(router.clone(), "GET", "/users/7").await;
        assert_eq!(response.status(), StatusCode::OK);
        let response = send(router.clone(), "DELETE", "/users/7").await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let response = send(router, "GET", "/files/a/tail").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
