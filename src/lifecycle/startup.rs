//! Startup orchestration.
//!
//! # Responsibilities
//! - Decide whether a route table is acceptable for serving
//! - Bind the server listener
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Only diagnostic kinds listed in `resolver.fail_on` abort startup
//! - Listener binds last (traffic only when ready)

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{ConfigError, ServerConfig};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::routing::table::RouteTable;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("route binding rejected: {0}")]
    Binding(Diagnostic),

    #[error("failed to bind {addr}: {source}")]
    Listen {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

/// Fail on the first diagnostic whose kind is in `fail_on`.
pub fn enforce_policy(table: &RouteTable, fail_on: &[DiagnosticKind]) -> Result<(), StartupError> {
    match table.first_of(fail_on) {
        Some(diagnostic) => Err(StartupError::Binding(diagnostic.clone())),
        None => Ok(()),
    }
}

pub async fn bind_listener(config: &ServerConfig) -> Result<TcpListener, StartupError> {
    let addr = config.addr();
    TcpListener::bind(&addr)
        .await
        .map_err(|source| StartupError::Listen { addr, source })
}
