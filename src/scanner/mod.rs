//! Annotation scanning subsystem.
//!
//! # Data Flow
//! ```text
//! scan directories (in order)
//!     → walker.rs (list *.rs files, sorted by name)
//!     → parser.rs (syn syntax tree → documented declarations)
//!     → marker.rs (doc line → Route | Malformed)
//!     → ScanReport { intents, diagnostics }
//! ```
//!
//! # Design Decisions
//! - Pure function of the directory contents at call time (restartable)
//! - A bad directory, file or marker never aborts the scan of the rest
//! - An unparsable file contributes no intents at all
//! - Concurrent scans are reassembled in directory order before returning

pub mod marker;
pub mod parser;
pub mod walker;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

use crate::config::ScannerConfig;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::routing::intent::{RouteIntent, SourceLocation};
use self::marker::{parse_marker, Marker, DEFAULT_TAG};
use self::walker::{list_source_files, scan_failure};

/// Intents and diagnostics produced by a scan, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub intents: Vec<RouteIntent>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ScanReport {
    /// Append another report after this one.
    pub fn merge(&mut self, other: ScanReport) {
        self.intents.extend(other.intents);
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Extracts route intents from documented declarations.
#[derive(Debug, Clone)]
pub struct Scanner {
    tag: String,
    recursive: bool,
    extension: String,
}

impl Default for Scanner {
    fn default() -> Self {
        Self {
            tag: DEFAULT_TAG.to_string(),
            recursive: false,
            extension: "rs".to_string(),
        }
    }
}

impl Scanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ScannerConfig) -> Self {
        Self {
            tag: config.tag.clone(),
            recursive: config.recursive,
            extension: config.extension.clone(),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Scan every directory in order.
    pub fn scan<P: AsRef<Path>>(&self, dirs: &[P]) -> ScanReport {
        let mut report = ScanReport::default();
        for dir in dirs {
            report.merge(self.scan_dir(dir.as_ref()));
        }
        report
    }

    /// Scan the source files of one directory.
    pub fn scan_dir(&self, dir: &Path) -> ScanReport {
        let (files, diagnostics) = list_source_files(dir, self.recursive, &self.extension);
        let mut report = ScanReport {
            intents: Vec::new(),
            diagnostics,
        };
        for file in files {
            report.merge(self.scan_file(&file));
        }
        report
    }

    pub fn scan_file(&self, file: &Path) -> ScanReport {
        match fs::read_to_string(file) {
            Ok(source) => self.scan_source(file, &source),
            Err(e) => ScanReport {
                intents: Vec::new(),
                diagnostics: vec![scan_failure(file, format!("failed to read {}: {}", file.display(), e))],
            },
        }
    }

    /// Scan already-loaded source text attributed to `file`.
    pub fn scan_source(&self, file: &Path, source: &str) -> ScanReport {
        let mut report = ScanReport::default();

        let declarations = match parser::parse_declarations(source) {
            Ok(declarations) => declarations,
            Err(e) => {
                let line = e.span().start().line;
                report.diagnostics.push(
                    Diagnostic::new(
                        DiagnosticKind::ParseFailure,
                        format!("failed to parse file: {}", e),
                    )
                    .with_location(SourceLocation::new(file, line)),
                );
                return report;
            }
        };

        for declaration in declarations {
            for doc in &declaration.docs {
                let location = SourceLocation::new(file, doc.line);
                match parse_marker(&self.tag, &doc.text) {
                    None => {}
                    Some(Marker::Route { verb, path }) => report.intents.push(RouteIntent {
                        declared_name: declaration.name.clone(),
                        verb,
                        path,
                        location,
                    }),
                    Some(Marker::Malformed { raw }) => {
                        let found = source_line(source, doc.line)
                            .filter(|text| text.contains(raw.as_str()))
                            .unwrap_or(raw.as_str());
                        report.diagnostics.push(
                            Diagnostic::new(
                                DiagnosticKind::MalformedAnnotation,
                                format!(
                                    "invalid {} comment format on `{}`: expected `{} {} <VERB> <PATH>`, found `{}`",
                                    self.tag,
                                    declaration.name,
                                    marker::COMMENT_LEADER,
                                    self.tag,
                                    found
                                ),
                            )
                            .with_location(location),
                        );
                    }
                }
            }
        }

        report
    }

    /// Scan directories on the blocking pool, one task per directory.
    ///
    /// Results are reassembled in directory order. Directories still running
    /// when `timeout` expires are reported as `ScanFailure`.
    pub async fn scan_concurrent(&self, dirs: Vec<PathBuf>, timeout: Duration) -> ScanReport {
        let scanner = self.clone();
        scan_dirs_blocking(dirs, timeout, move |dir| scanner.scan_dir(dir)).await
    }
}

/// Run `scan_dir` for each directory on the blocking pool under one deadline.
async fn scan_dirs_blocking<F>(dirs: Vec<PathBuf>, timeout: Duration, scan_dir: F) -> ScanReport
where
    F: Fn(&Path) -> ScanReport + Clone + Send + 'static,
{
    let deadline = tokio::time::Instant::now() + timeout;

    let tasks: Vec<_> = dirs
        .into_iter()
        .map(|dir| {
            let scan_dir = scan_dir.clone();
            let task_dir = dir.clone();
            let handle = tokio::task::spawn_blocking(move || scan_dir(&task_dir));
            (dir, handle)
        })
        .collect();

    let mut report = ScanReport::default();
    for (dir, handle) in tasks {
        match tokio::time::timeout_at(deadline, handle).await {
            Ok(Ok(dir_report)) => report.merge(dir_report),
            Ok(Err(e)) => report
                .diagnostics
                .push(scan_failure(&dir, format!("scan task for {} failed: {}", dir.display(), e))),
            Err(_) => report.diagnostics.push(scan_failure(
                &dir,
                format!("scan of {} timed out after {:?}", dir.display(), timeout),
            )),
        }
    }
    report
}

/// Trimmed text of the 1-based `line` of `source`.
fn source_line(source: &str, line: usize) -> Option<&str> {
    line.checked_sub(1)
        .and_then(|index| source.lines().nth(index))
        .map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;

    const API_SOURCE: &str = r#"
pub struct MyApiHandler;

impl MyApiHandler {
    /// SayHi API
    /// @route GET /say-hi
    #[allow(non_snake_case)]
    pub fn SayHi(&self) {}

    /// Print555 API
    /// @route GET /print/555
    pub fn print_555(&self) {}

    /// @route GET
    pub fn broken(&self) {}

    pub fn say_hello(&self) {}
}
"#;

    #[test]
    fn test_scan_source_emits_intents_in_declaration_order() {
        let report = Scanner::new().scan_source(Path::new("api.rs"), API_SOURCE);

        assert_eq!(report.intents.len(), 2);
        assert_eq!(report.intents[0].declared_name, "SayHi");
        assert_eq!(report.intents[0].verb, "GET");
        assert_eq!(report.intents[0].path, "/say-hi");
        assert_eq!(report.intents[0].location, SourceLocation::new("api.rs", 6));
        assert_eq!(report.intents[1].declared_name, "print_555");
        assert_eq!(report.intents[1].path, "/print/555");
    }

    #[test]
    fn test_malformed_marker_is_reported_and_skipped() {
        let report = Scanner::new().scan_source(Path::new("api.rs"), API_SOURCE);

        assert_eq!(report.diagnostics.len(), 1);
        let diag = &report.diagnostics[0];
        assert_eq!(diag.kind, DiagnosticKind::MalformedAnnotation);
        assert!(diag.message.contains("/// @route GET"));
        assert!(diag.message.contains("broken"));
        assert!(report.intents.iter().all(|i| i.declared_name != "broken"));
    }

    #[test]
    fn test_malformed_marker_quotes_source_as_written() {
        let source = r#"
/**
 * @route GET
 */
fn block() {}

#[doc = "@route POST"]
fn attribute() {}
"#;
        let report = Scanner::new().scan_source(Path::new("api.rs"), source);

        let messages: Vec<_> = report.diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains("found `* @route GET`"), "{}", messages[0]);
        assert!(messages[1].contains(r#"found `#[doc = "@route POST"]`"#), "{}", messages[1]);
    }

    #[tokio::test]
    async fn test_slow_directory_times_out_as_scan_failure() {
        let dirs = vec![PathBuf::from("fast"), PathBuf::from("slow")];
        let report = scan_dirs_blocking(dirs, Duration::from_millis(50), |dir| {
            if dir == Path::new("slow") {
                std::thread::sleep(Duration::from_millis(500));
            }
            Scanner::new().scan_source(&dir.join("api.rs"), "/// @route GET /ok\nfn ok() {}\n")
        })
        .await;

        assert_eq!(report.intents.len(), 1);
        assert_eq!(report.intents[0].location.file, PathBuf::from("fast/api.rs"));
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].kind, DiagnosticKind::ScanFailure);
        assert!(report.diagnostics[0].message.contains("slow"));
        assert!(report.diagnostics[0].message.contains("timed out"));
    }

    #[test]
    fn test_parse_failure_drops_whole_file() {
        let source = "/// @route GET /ok\nfn ok() {}\nfn broken( {";
        let report = Scanner::new().scan_source(Path::new("broken.rs"), source);

        assert!(report.intents.is_empty());
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].kind, DiagnosticKind::ParseFailure);
        assert_eq!(
            report.diagnostics[0].location.as_ref().map(|l| l.file.clone()),
            Some(PathBuf::from("broken.rs"))
        );
    }

    #[test]
    fn test_custom_tag() {
        let source = "/// @Api GET /say-hi\nfn say_hi() {}\n/// @route GET /ignored\nfn other() {}\n";
        let report = Scanner::new().with_tag("@Api").scan_source(Path::new("api.rs"), source);
        assert_eq!(report.intents.len(), 1);
        assert_eq!(report.intents[0].declared_name, "say_hi");
    }

    #[test]
    fn test_multiple_markers_on_one_declaration() {
        let source = "/// @route GET /users\n/// @route HEAD /users\nfn users() {}\n";
        let report = Scanner::new().scan_source(Path::new("api.rs"), source);
        let verbs: Vec<_> = report.intents.iter().map(|i| i.verb.as_str()).collect();
        assert_eq!(verbs, vec!["GET", "HEAD"]);
    }
}
