//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize, apply SERVER_* env overrides)
//!     → validation.rs (semantic checks)
//!     → BinderConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; the route table is never rebuilt
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_from_env, ConfigError};
pub use schema::BinderConfig;
pub use schema::ObservabilityConfig;
pub use schema::ResolverConfig;
pub use schema::ScannerConfig;
pub use schema::ServerConfig;
pub use validation::ValidationError;
