//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Binding facade and transport adapter produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stderr)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - The scanner and resolver never log; they return diagnostics
//! - Structured logging (JSON) for machine parsing
//! - Request ID flows through every dispatched request

pub mod logging;
pub mod metrics;
