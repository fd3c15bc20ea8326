//! One-shot binding pass: scan, then resolve.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::config::BinderConfig;
use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::handler::instance::HandlerInstance;
use crate::handler::pool::HandlerPool;
use crate::observability::metrics;
use crate::routing::resolver::Resolver;
use crate::routing::table::RouteTable;
use crate::scanner::{ScanReport, Scanner};

const DEFAULT_SCAN_TIMEOUT: Duration = Duration::from_secs(30);

/// Owns the handler pool and runs the binding pass at startup.
#[derive(Clone)]
pub struct RouteBinder {
    pool: HandlerPool,
    scanner: Scanner,
    resolver: Resolver,
    directories: Vec<PathBuf>,
    concurrent: bool,
    scan_timeout: Duration,
}

impl Default for RouteBinder {
    fn default() -> Self {
        Self {
            pool: HandlerPool::new(),
            scanner: Scanner::new(),
            resolver: Resolver::new(),
            directories: Vec::new(),
            concurrent: false,
            scan_timeout: DEFAULT_SCAN_TIMEOUT,
        }
    }
}

impl RouteBinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &BinderConfig) -> Self {
        Self {
            pool: HandlerPool::new(),
            scanner: Scanner::from_config(&config.scanner),
            resolver: Resolver::from_config(&config.resolver),
            directories: config.scanner.directories.iter().map(PathBuf::from).collect(),
            concurrent: config.scanner.concurrent,
            scan_timeout: Duration::from_secs(config.scanner.timeout_secs),
        }
    }

    pub fn with_scanner(mut self, scanner: Scanner) -> Self {
        self.scanner = scanner;
        self
    }

    pub fn with_resolver(mut self, resolver: Resolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Sink for errors bound handlers return at request time.
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.resolver = self.resolver.with_sink(sink);
        self
    }

    /// Append handler instances. Registration order decides ties.
    pub fn set_handlers<I>(&mut self, handlers: I) -> &mut Self
    where
        I: IntoIterator<Item = Arc<dyn HandlerInstance>>,
    {
        self.pool.extend(handlers);
        self
    }

    pub fn register<H>(&mut self, handler: H) -> &mut Self
    where
        H: HandlerInstance + 'static,
    {
        self.pool.register(handler);
        self
    }

    pub fn pool(&self) -> &HandlerPool {
        &self.pool
    }

    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }

    /// Scan `dirs` and resolve the result against the pool.
    pub fn bind<P: AsRef<Path>>(&self, dirs: &[P]) -> RouteTable {
        self.warn_if_empty();
        let report = self.scanner.scan(dirs);
        self.finish(report)
    }

    /// Like [`bind`](Self::bind), scanning directories in parallel.
    pub async fn bind_concurrent(&self, dirs: Vec<PathBuf>, timeout: Duration) -> RouteTable {
        self.warn_if_empty();
        let report = self.scanner.scan_concurrent(dirs, timeout).await;
        self.finish(report)
    }

    /// Bind the configured directories the configured way.
    pub async fn bind_configured(&self) -> RouteTable {
        if self.concurrent {
            self.bind_concurrent(self.directories.clone(), self.scan_timeout)
                .await
        } else {
            self.bind(&self.directories)
        }
    }

    fn warn_if_empty(&self) {
        if self.pool.is_empty() {
            tracing::warn!("no registered handlers found; did you forget set_handlers()?");
        }
    }

    fn finish(&self, report: ScanReport) -> RouteTable {
        let ScanReport {
            intents,
            diagnostics,
        } = report;

        let mut table = self.resolver.resolve(&intents, &self.pool);
        table.prepend_diagnostics(diagnostics);

        for diagnostic in table.diagnostics() {
            TracingSink.report(diagnostic.clone());
        }
        for route in table.routes() {
            tracing::debug!(
                verb = %route.verb(),
                path = %route.path(),
                handler = %route.declared_name(),
                handler_type = %route.handler_type(),
                "Route bound"
            );
        }
        tracing::info!(
            intents = intents.len(),
            routes = table.len(),
            diagnostics = table.diagnostics().len(),
            "Route table built"
        );
        metrics::record_binding(&table);

        table
    }
}
