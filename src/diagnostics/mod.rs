//! Diagnostics subsystem.
//!
//! # Data Flow
//! ```text
//! scanner (ScanFailure, ParseFailure, MalformedAnnotation)
//!     → collected into ScanReport
//! resolver (HandlerNotFound, ContractMismatch, AmbiguousHandler)
//!     → collected into RouteTable
//! bound handler at request time (HandlerRuntimeError)
//!     → sink.rs (caller-supplied DiagnosticSink)
//! ```
//!
//! # Design Decisions
//! - Diagnostics are values, never printed by the binding core
//! - No diagnostic aborts a binding pass; callers decide what is fatal
//! - Every diagnostic carries enough context to locate the source of the failure

pub mod sink;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::routing::intent::{RouteIntent, SourceLocation};

pub use sink::{CollectingSink, DiagnosticSink, TracingSink};

/// Failure taxonomy for scanning, resolution and invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// A directory (or an entry below it) could not be listed or read.
    ScanFailure,
    /// A source file is not valid Rust.
    ParseFailure,
    /// A marker line does not have the expected field count.
    MalformedAnnotation,
    /// No registered instance exposes the declared member.
    HandlerNotFound,
    /// The member exists but cannot be called as `fn(&mut dyn Context)`.
    ContractMismatch,
    /// More than one instance exposes the declared member (strict mode).
    AmbiguousHandler,
    /// A bound handler returned an error at request time.
    HandlerRuntimeError,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::ScanFailure => "ScanFailure",
            DiagnosticKind::ParseFailure => "ParseFailure",
            DiagnosticKind::MalformedAnnotation => "MalformedAnnotation",
            DiagnosticKind::HandlerNotFound => "HandlerNotFound",
            DiagnosticKind::ContractMismatch => "ContractMismatch",
            DiagnosticKind::AmbiguousHandler => "AmbiguousHandler",
            DiagnosticKind::HandlerRuntimeError => "HandlerRuntimeError",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured, non-fatal record of a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,

    /// The route intent involved, when the failure concerns one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<RouteIntent>,

    /// Type name of the handler instance involved, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handler_type: Option<String>,

    /// Where in the scanned sources the failure was found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,

    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            intent: None,
            handler_type: None,
            location: None,
            message: message.into(),
        }
    }

    /// Attach a route intent. Its location becomes the diagnostic location.
    pub fn with_intent(mut self, intent: &RouteIntent) -> Self {
        self.location = Some(intent.location.clone());
        self.intent = Some(intent.clone());
        self
    }

    pub fn with_handler_type(mut self, handler_type: impl Into<String>) -> Self {
        self.handler_type = Some(handler_type.into());
        self
    }

    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn is(&self, kind: DiagnosticKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.kind)?;
        if let Some(location) = &self.location {
            write!(f, " {}", location)?;
        }
        if let Some(intent) = &self.intent {
            write!(f, " {} {} ({})", intent.verb, intent.path, intent.declared_name)?;
        }
        if let Some(handler_type) = &self.handler_type {
            write!(f, " in {}", handler_type)?;
        }
        write!(f, ": {}", self.message)
    }
}
