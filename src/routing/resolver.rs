//! Route resolution: route intents against the handler pool.
//!
//! # Responsibilities
//! - Find the member each intent names, first instance wins
//! - Check the member's calling contract before wrapping it
//! - Record a diagnostic for every intent that cannot be bound
//!
//! # Design Decisions
//! - Single-threaded: resolution order defines diagnostic order
//! - Registration order is significant; later instances never win
//! - Nothing is logged here; diagnostics are returned in the table
//! - Bound handlers report request-time errors to the configured sink

use std::sync::Arc;

use crate::config::ResolverConfig;
use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink, TracingSink};
use crate::handler::context::{handler, Handler};
use crate::handler::instance::HandlerInstance;
use crate::handler::pool::HandlerPool;
use crate::routing::intent::RouteIntent;
use crate::routing::table::{BoundRoute, RouteTable};

/// Binds route intents to members of registered handler instances.
#[derive(Clone)]
pub struct Resolver {
    strict: bool,
    sink: Arc<dyn DiagnosticSink>,
}

impl Default for Resolver {
    fn default() -> Self {
        Self {
            strict: false,
            sink: Arc::new(TracingSink),
        }
    }
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ResolverConfig) -> Self {
        Self::default().strict(config.strict)
    }

    /// Also report names exposed by more than one instance.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Where bound handlers report errors returned at request time.
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Resolve every intent, in order, into a route table.
    pub fn resolve(&self, intents: &[RouteIntent], pool: &HandlerPool) -> RouteTable {
        let mut routes = Vec::new();
        let mut diagnostics = Vec::new();

        for intent in intents {
            if let Some(route) = self.resolve_one(intent, pool, &mut diagnostics) {
                routes.push(route);
            }
        }

        RouteTable::new(routes, diagnostics)
    }

    fn resolve_one(
        &self,
        intent: &RouteIntent,
        pool: &HandlerPool,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<BoundRoute> {
        let mut candidates = pool
            .all()
            .iter()
            .filter_map(|instance| instance.member(&intent.declared_name).map(|m| (instance, m)));

        let Some((instance, member)) = candidates.next() else {
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticKind::HandlerNotFound,
                    format!(
                        "handler method {} not found for path {} in any of {} registered handler(s)",
                        intent.declared_name,
                        intent.path,
                        pool.len()
                    ),
                )
                .with_intent(intent),
            );
            return None;
        };

        if self.strict {
            let others: Vec<&str> = candidates.map(|(other, _)| other.type_name()).collect();
            if !others.is_empty() {
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticKind::AmbiguousHandler,
                        format!(
                            "method {} is exposed by {} and also by {}; the first registered wins",
                            intent.declared_name,
                            instance.type_name(),
                            others.join(", ")
                        ),
                    )
                    .with_intent(intent)
                    .with_handler_type(instance.type_name()),
                );
            }
        }

        match member.to_handler() {
            Ok(resolved) => Some(BoundRoute::new(
                intent.clone(),
                instance.type_name().to_string(),
                self.reporting(intent, instance.as_ref(), resolved),
            )),
            Err(violations) => {
                let reasons: Vec<String> = violations.iter().map(|v| v.to_string()).collect();
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticKind::ContractMismatch,
                        format!(
                            "method {} in {} must be fn(&mut dyn Context) with no return or Result<(), HandlerError>, declared as {}: {}",
                            member.name(),
                            instance.type_name(),
                            member.signature(),
                            reasons.join("; ")
                        ),
                    )
                    .with_intent(intent)
                    .with_handler_type(instance.type_name()),
                );
                None
            }
        }
    }

    /// Wrap a resolved member so request-time errors reach the sink.
    fn reporting(&self, intent: &RouteIntent, instance: &dyn HandlerInstance, resolved: Handler) -> Handler {
        let sink = Arc::clone(&self.sink);
        let intent = intent.clone();
        let handler_type = instance.type_name().to_string();

        handler(move |ctx| {
            let result = resolved(ctx);
            if let Err(e) = &result {
                sink.report(
                    Diagnostic::new(
                        DiagnosticKind::HandlerRuntimeError,
                        format!("handler {} returned error: {}", intent.declared_name, e),
                    )
                    .with_intent(&intent)
                    .with_handler_type(handler_type.clone()),
                );
            }
            result
        })
    }
}
