//! Request/response capability shared by the binding core and transports.
//!
//! # Design Decisions
//! - `Context` is object safe; handlers take `&mut dyn Context`
//! - Generic helpers (JSON binding, typed lookups) live on `ContextExt`
//! - The binding core never inspects a context, it only passes one through

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Request access and response writing for a single request.
pub trait Context: Send {
    /// HTTP method of the request.
    fn method(&self) -> &str;

    /// Request path, without query string.
    fn path(&self) -> &str;

    /// Path parameter captured by the transport's route pattern.
    fn param(&self, name: &str) -> Option<&str>;

    /// Query string parameter.
    fn query(&self, name: &str) -> Option<&str>;

    /// Request header (case-insensitive name).
    fn header(&self, name: &str) -> Option<&str>;

    /// Raw request body.
    fn body(&self) -> &[u8];

    /// Write a JSON response.
    fn json(&mut self, status: u16, body: Value);

    /// Write a plain-text response.
    fn string(&mut self, status: u16, body: String);

    /// Set the response status without touching the body.
    fn status(&mut self, status: u16);

    fn set_header(&mut self, key: &str, value: &str);

    /// Stop the middleware/handler chain after the current step.
    fn abort(&mut self);

    fn is_aborted(&self) -> bool;

    fn abort_with_status_json(&mut self, status: u16, body: Value) {
        self.json(status, body);
        self.abort();
    }

    /// Store a request-scoped value for later chain steps.
    fn set(&mut self, key: &str, value: Value);

    fn get(&self, key: &str) -> Option<&Value>;
}

/// Typed helpers over any [`Context`].
pub trait ContextExt {
    /// Deserialize the JSON request body.
    fn bind<T: DeserializeOwned>(&self) -> Result<T, HandlerError>;

    fn get_string(&self, key: &str) -> Option<String>;

    fn get_int(&self, key: &str) -> Option<i64>;
}

impl<C: Context + ?Sized> ContextExt for C {
    fn bind<T: DeserializeOwned>(&self) -> Result<T, HandlerError> {
        Ok(serde_json::from_slice(self.body())?)
    }

    fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).and_then(|v| v.as_str()).map(str::to_owned)
    }

    fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }
}

/// Error returned by a handler at request time.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The request body could not be decoded.
    #[error("invalid request body: {0}")]
    Bind(#[from] serde_json::Error),

    /// A failure the handler wants answered with a specific status.
    #[error("{status}: {message}")]
    Status { status: u16, message: String },

    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl HandlerError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        HandlerError::Status {
            status,
            message: message.into(),
        }
    }

    pub fn other<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        HandlerError::Other(err.into())
    }

    /// Text for an error response body; `Status` drops its code prefix.
    pub fn message(&self) -> String {
        match self {
            HandlerError::Status { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Status code a transport should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            HandlerError::Bind(_) => 400,
            HandlerError::Status { status, .. } => *status,
            HandlerError::Other(_) => 500,
        }
    }
}

/// Uniform callable every route, middleware and bound member is turned into.
pub type Handler = Arc<dyn Fn(&mut dyn Context) -> Result<(), HandlerError> + Send + Sync>;

/// Wrap a closure as a [`Handler`].
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(&mut dyn Context) -> Result<(), HandlerError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Route record consumed by transport adapters.
#[derive(Clone)]
pub struct RouteConfig {
    pub method: String,
    pub path: String,
    pub handler: Handler,
    pub middleware: Vec<Handler>,
}

impl RouteConfig {
    pub fn new(method: impl Into<String>, path: impl Into<String>, handler: Handler) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            handler,
            middleware: Vec::new(),
        }
    }

    pub fn with_middleware(mut self, middleware: Handler) -> Self {
        self.middleware.push(middleware);
        self
    }
}

impl fmt::Debug for RouteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteConfig")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("middleware", &self.middleware.len())
            .finish()
    }
}
