//! The route table handed to transport adapters.
//!
//! # Design Decisions
//! - Immutable once returned by the resolver (safe for unsynchronized reads)
//! - Bound routes keep resolution order; diagnostics keep discovery order
//! - Every bound route came from exactly one intent and one validated member

use std::fmt;

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::handler::context::{Context, Handler, HandlerError, RouteConfig};
use crate::routing::intent::RouteIntent;

/// A route intent paired with a validated, invocable member.
#[derive(Clone)]
pub struct BoundRoute {
    intent: RouteIntent,
    handler_type: String,
    handler: Handler,
    middleware: Vec<Handler>,
}

impl BoundRoute {
    pub(crate) fn new(intent: RouteIntent, handler_type: String, handler: Handler) -> Self {
        Self {
            intent,
            handler_type,
            handler,
            middleware: Vec::new(),
        }
    }

    pub fn verb(&self) -> &str {
        &self.intent.verb
    }

    pub fn path(&self) -> &str {
        &self.intent.path
    }

    pub fn declared_name(&self) -> &str {
        &self.intent.declared_name
    }

    pub fn intent(&self) -> &RouteIntent {
        &self.intent
    }

    /// Type name of the instance the member was resolved on.
    pub fn handler_type(&self) -> &str {
        &self.handler_type
    }

    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    pub fn middleware(&self) -> &[Handler] {
        &self.middleware
    }

    /// Call the resolved member. Errors are also reported to the sink the
    /// table was built with.
    pub fn invoke(&self, ctx: &mut dyn Context) -> Result<(), HandlerError> {
        (self.handler)(ctx)
    }

    pub fn to_route_config(&self) -> RouteConfig {
        RouteConfig {
            method: self.intent.verb.clone(),
            path: self.intent.path.clone(),
            handler: self.handler.clone(),
            middleware: self.middleware.clone(),
        }
    }
}

impl fmt::Debug for BoundRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundRoute")
            .field("verb", &self.intent.verb)
            .field("path", &self.intent.path)
            .field("declared_name", &self.intent.declared_name)
            .field("handler_type", &self.handler_type)
            .finish()
    }
}

/// Bound routes plus every diagnostic of the pass that built them.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<BoundRoute>,
    diagnostics: Vec<Diagnostic>,
}

impl RouteTable {
    pub(crate) fn new(routes: Vec<BoundRoute>, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            routes,
            diagnostics,
        }
    }

    /// Put earlier-phase diagnostics (scanning) ahead of resolution ones.
    pub(crate) fn prepend_diagnostics(&mut self, mut earlier: Vec<Diagnostic>) {
        earlier.append(&mut self.diagnostics);
        self.diagnostics = earlier;
    }

    pub fn routes(&self) -> &[BoundRoute] {
        &self.routes
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// No diagnostics were produced.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoundRoute> {
        self.routes.iter()
    }

    pub fn diagnostics_of(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.kind == kind)
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.diagnostics_of(kind).count()
    }

    /// First diagnostic whose kind is in `kinds`, for startup policies.
    pub fn first_of(&self, kinds: &[DiagnosticKind]) -> Option<&Diagnostic> {
        self.diagnostics.iter().find(|d| kinds.contains(&d.kind))
    }

    /// Look up a bound route by verb and path.
    pub fn find(&self, verb: &str, path: &str) -> Option<&BoundRoute> {
        self.routes.iter().find(|r| r.verb() == verb && r.path() == path)
    }

    /// Route records for a transport adapter, in table order.
    pub fn route_configs(&self) -> Vec<RouteConfig> {
        self.routes.iter().map(BoundRoute::to_route_config).collect()
    }
}

impl<'a> IntoIterator for &'a RouteTable {
    type Item = &'a BoundRoute;
    type IntoIter = std::slice::Iter<'a, BoundRoute>;

    fn into_iter(self) -> Self::IntoIter {
        self.routes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::context::handler;
    use crate::routing::intent::SourceLocation;

    fn route(verb: &str, path: &str) -> BoundRoute {
        BoundRoute::new(
            RouteIntent {
                declared_name: "h".into(),
                verb: verb.into(),
                path: path.into(),
                location: SourceLocation::new("api.rs", 1),
            },
            "Api".into(),
            handler(|_ctx| Ok(())),
        )
    }

    #[test]
    fn test_lookup_and_route_configs() {
        let table = RouteTable::new(vec![route("GET", "/a"), route("POST", "/a")], Vec::new());

        assert_eq!(table.len(), 2);
        assert!(table.is_clean());
        assert_eq!(table.find("POST", "/a").map(|r| r.verb()), Some("POST"));
        assert!(table.find("DELETE", "/a").is_none());

        let configs = table.route_configs();
        assert_eq!(configs[0].method, "GET");
        assert_eq!(configs[1].method, "POST");
    }

    #[test]
    fn test_diagnostic_queries_and_prepend() {
        let mut table = RouteTable::new(
            Vec::new(),
            vec![Diagnostic::new(DiagnosticKind::HandlerNotFound, "late")],
        );
        table.prepend_diagnostics(vec![Diagnostic::new(DiagnosticKind::ScanFailure, "early")]);

        let messages: Vec<_> = table.diagnostics().iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["early", "late"]);
        assert_eq!(table.count(DiagnosticKind::HandlerNotFound), 1);
        assert_eq!(
            table
                .first_of(&[DiagnosticKind::ContractMismatch, DiagnosticKind::HandlerNotFound])
                .map(|d| d.message.as_str()),
            Some("late")
        );
        assert!(table.first_of(&[DiagnosticKind::ParseFailure]).is_none());
    }
}
