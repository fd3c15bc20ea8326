//! HTTP transport adapter for a bound route table.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum router, trace / timeout layers)
//!     → request.rs (add or propagate request ID)
//!     → context.rs (path params, query, headers, buffered body)
//!     → global middleware → route middleware → bound handler
//!     → context.rs (collected response → axum Response)
//!     → Send to client
//! ```
//!
//! # Design Decisions
//! - Handlers are synchronous; the body is buffered before the chain runs
//! - A chain stops at the first step that aborts or fails
//! - Duplicate method + path: first registration wins

pub mod context;
pub mod request;
pub mod server;

pub use context::HttpContext;
pub use request::{request_id, request_id_middleware, X_REQUEST_ID};
pub use server::{HttpServer, RouteGroup};
