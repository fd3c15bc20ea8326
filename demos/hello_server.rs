//! Serve the annotated handlers in `demos/api/`.
//!
//! ```text
//! cargo run --example hello_server
//! curl localhost:8080/say-hi
//! curl localhost:8080/users/7
//! curl -X POST localhost:8080/echo -d '{"message":"hello"}'
//! ```
//!
//! `SERVER_HOST`, `SERVER_PORT` and `SERVER_ROOT_PATH` override the defaults.

#[path = "api/my_api.rs"]
mod my_api;

use std::path::Path;
use std::sync::Arc;

use route_binder::config::load_from_env;
use route_binder::handler::handler;
use route_binder::lifecycle::{bind_listener, enforce_policy, spawn_signal_handler};
use route_binder::observability::logging::init_logging;
use route_binder::observability::metrics::init_metrics;
use route_binder::{HandlerObject, HttpServer, RouteBinder, RouteConfig, Shutdown};
use serde_json::json;

use my_api::MyApiHandler;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_from_env()?;
    init_logging(&config.observability);

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let api = Arc::new(MyApiHandler::new("hi there"));
    let handlers = HandlerObject::for_type::<MyApiHandler>()
        .bind("say_hi", &api, MyApiHandler::say_hi)
        .bind_fallible("get_user", &api, MyApiHandler::get_user)
        .bind_fallible("echo", &api, MyApiHandler::echo)
        .route(RouteConfig::new(
            "GET",
            "/version",
            handler(|ctx| {
                ctx.json(200, json!({ "version": env!("CARGO_PKG_VERSION") }));
                Ok(())
            }),
        ))
        .build();

    let mut binder = RouteBinder::from_config(&config);
    binder.register(handlers);

    let sources = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/api");
    let table = binder.bind(&[sources]);
    enforce_policy(&table, &config.resolver.fail_on)?;

    let mut server = HttpServer::new(config.server.clone());
    server
        .use_middleware(handler(|ctx| {
            tracing::info!(method = %ctx.method(), path = %ctx.path(), "Request");
            Ok(())
        }))
        .health_check()
        .mount(&table)
        .mount_providers(binder.pool());

    let listener = bind_listener(&config.server).await?;
    let shutdown = Shutdown::new();
    spawn_signal_handler(shutdown.clone());

    server.run(listener, shutdown.subscribe()).await?;
    Ok(())
}
