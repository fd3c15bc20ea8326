//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::diagnostics::DiagnosticKind;
use crate::scanner::marker::DEFAULT_TAG;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct BinderConfig {
    /// HTTP server settings for the transport adapter.
    pub server: ServerConfig,

    /// Annotation scanning settings.
    pub scanner: ScannerConfig,

    /// Route resolution settings.
    pub resolver: ResolverConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,

    pub port: u16,

    /// Run mode: "debug", "release" or "test".
    pub mode: String,

    /// Prefix for every mounted route (e.g., "/api/v1"). Empty for none.
    pub root_path: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Maximum buffered request body in bytes.
    pub body_limit_bytes: usize,
}

impl ServerConfig {
    /// `host:port` to bind.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8080,
            mode: "debug".to_string(),
            root_path: String::new(),
            request_timeout_secs: 30,
            body_limit_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Scanner configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ScannerConfig {
    /// Directories holding annotated sources, scanned in order.
    pub directories: Vec<String>,

    /// Descend into subdirectories.
    pub recursive: bool,

    /// Marker tag opening a route line.
    pub tag: String,

    /// Source file extension to scan.
    pub extension: String,

    /// Scan directories in parallel on the blocking pool.
    pub concurrent: bool,

    /// Upper bound for a concurrent scan, in seconds.
    pub timeout_secs: u64,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            directories: Vec::new(),
            recursive: false,
            tag: DEFAULT_TAG.to_string(),
            extension: "rs".to_string(),
            concurrent: false,
            timeout_secs: 30,
        }
    }
}

/// Resolver configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
#[serde(default)]
pub struct ResolverConfig {
    /// Report names exposed by more than one handler instance.
    pub strict: bool,

    /// Diagnostic kinds that make startup fail.
    pub fail_on: Vec<DiagnosticKind>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BinderConfig::default();
        assert_eq!(config.server.addr(), "localhost:8080");
        assert_eq!(config.scanner.tag, "@route");
        assert!(!config.scanner.recursive);
        assert!(!config.resolver.strict);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: BinderConfig = toml::from_str(
            r#"
            [server]
            port = 8081
            root_path = "/api/v1"

            [scanner]
            directories = ["src/api"]

            [resolver]
            fail_on = ["HandlerNotFound", "ContractMismatch"]
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8081);
        assert_eq!(config.server.host, "localhost");
        assert_eq!(config.scanner.directories, vec!["src/api"]);
        assert_eq!(config.scanner.extension, "rs");
        assert_eq!(
            config.resolver.fail_on,
            vec![DiagnosticKind::HandlerNotFound, DiagnosticKind::ContractMismatch]
        );
    }
}
