//! Diagnostic sinks.
//!
//! Bound handlers report request-time failures to a sink supplied by the
//! caller when the route table is built.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::diagnostics::{Diagnostic, DiagnosticKind};

/// Receiver for diagnostics produced after the binding pass.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

impl<F> DiagnosticSink for F
where
    F: Fn(Diagnostic) + Send + Sync,
{
    fn report(&self, diagnostic: Diagnostic) {
        self(diagnostic)
    }
}

/// Logs every diagnostic as a structured `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        let (verb, path, declared_name) = diagnostic
            .intent
            .as_ref()
            .map(|i| (i.verb.as_str(), i.path.as_str(), i.declared_name.as_str()))
            .unwrap_or(("", "", ""));
        let location = diagnostic
            .location
            .as_ref()
            .map(|l| l.to_string())
            .unwrap_or_default();
        let handler_type = diagnostic.handler_type.as_deref().unwrap_or("");

        match diagnostic.kind {
            DiagnosticKind::HandlerRuntimeError => tracing::error!(
                kind = %diagnostic.kind,
                verb,
                path,
                handler = declared_name,
                handler_type,
                "{}",
                diagnostic.message
            ),
            _ => tracing::warn!(
                kind = %diagnostic.kind,
                verb,
                path,
                handler = declared_name,
                handler_type,
                location = %location,
                "{}",
                diagnostic.message
            ),
        }
    }
}

/// Keeps every diagnostic in memory, in report order.
#[derive(Debug, Default)]
pub struct CollectingSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Poison is ignored: a push never leaves the list half-written.
    fn lock(&self) -> MutexGuard<'_, Vec<Diagnostic>> {
        self.diagnostics.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: Diagnostic) {
        self.lock().push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_collecting_sink_keeps_order() {
        let sink = CollectingSink::new();
        sink.report(Diagnostic::new(DiagnosticKind::HandlerRuntimeError, "first"));
        sink.report(Diagnostic::new(DiagnosticKind::HandlerRuntimeError, "second"));

        let messages: Vec<_> = sink.diagnostics().into_iter().map(|d| d.message).collect();
        assert_eq!(messages, vec!["first", "second"]);
    }

    #[test]
    fn test_collecting_sink_survives_poisoned_lock() {
        let sink = Arc::new(CollectingSink::new());
        sink.report(Diagnostic::new(DiagnosticKind::ScanFailure, "before"));

        let poisoner = Arc::clone(&sink);
        let result = std::thread::spawn(move || {
            let _guard = poisoner.diagnostics.lock().unwrap();
            panic!("reporter crashed while holding the lock");
        })
        .join();
        assert!(result.is_err());
        assert!(sink.diagnostics.is_poisoned());

        sink.report(Diagnostic::new(DiagnosticKind::ScanFailure, "after"));
        let messages: Vec<_> = sink.diagnostics().into_iter().map(|d| d.message).collect();
        assert_eq!(messages, vec!["before", "after"]);
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn test_closure_sink() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let sink = move |_: Diagnostic| {
            c.fetch_add(1, Ordering::SeqCst);
        };
        sink.report(Diagnostic::new(DiagnosticKind::ScanFailure, "x"));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
