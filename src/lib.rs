//! Annotation-driven route binding.
//!
//! Scans source files for `/// @route VERB PATH` markers on functions,
//! resolves each marker against a pool of registered handler instances and
//! produces an immutable route table plus diagnostics. The table can be
//! served by the bundled axum adapter or by any other transport.

// Binding core
pub mod diagnostics;
pub mod handler;
pub mod routing;
pub mod scanner;

// Transport
pub mod http;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use config::schema::BinderConfig;
pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink};
pub use handler::{Context, ContextExt, Handler, HandlerError, HandlerInstance, HandlerObject, HandlerPool, RouteConfig};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{BoundRoute, RouteBinder, RouteIntent, RouteTable};
pub use scanner::{ScanReport, Scanner};
