//! Route binding subsystem.
//!
//! # Data Flow
//! ```text
//! Binding pass (once, at startup):
//!     scanner → RouteIntent[] (discovery order)
//!     → resolver.rs (look up member by name, first instance wins)
//!     → member contract check
//!     → table.rs (BoundRoute[] + Diagnostic[])
//!     → handed to a transport adapter, read-only from then on
//!
//! Per intent:
//!     Discovered → Resolving → Bound | Rejected
//! ```
//!
//! # Design Decisions
//! - Table built once at startup, immutable at runtime
//! - Deterministic: same sources and pool always give the same table
//! - First match wins (ordered by registration)
//! - Permissive: the largest valid table, failures as diagnostics

pub mod binder;
pub mod intent;
pub mod resolver;
pub mod table;

pub use binder::RouteBinder;
pub use intent::{RouteIntent, SourceLocation};
pub use resolver::Resolver;
pub use table::{BoundRoute, RouteTable};
