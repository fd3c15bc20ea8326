//! Source file discovery under a scan directory.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::routing::intent::SourceLocation;

/// Source files under `dir` with the given extension, sorted by file name.
///
/// Listing failures come back as `ScanFailure` diagnostics next to whatever
/// could still be listed.
pub fn list_source_files(dir: &Path, recursive: bool, extension: &str) -> (Vec<PathBuf>, Vec<Diagnostic>) {
    let mut files = Vec::new();
    let mut diagnostics = Vec::new();

    if let Err(e) = fs::read_dir(dir) {
        diagnostics.push(scan_failure(dir, format!("failed to scan folder {}: {}", dir.display(), e)));
        return (files, diagnostics);
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(true)
        .sort_by_file_name();

    for entry in walker {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_file() && has_extension(entry.path(), extension) {
                    files.push(entry.into_path());
                }
            }
            Err(e) => {
                let path = e.path().unwrap_or(dir).to_path_buf();
                diagnostics.push(scan_failure(&path, format!("failed to list {}: {}", path.display(), e)));
            }
        }
    }

    (files, diagnostics)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(extension)
}

pub(crate) fn scan_failure(path: &Path, message: String) -> Diagnostic {
    Diagnostic::new(DiagnosticKind::ScanFailure, message).with_location(SourceLocation::path(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_recursive_listing_is_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.rs"), "").unwrap();
        fs::write(dir.path().join("a.rs"), "").unwrap();
        fs::write(dir.path().join("notes.md"), "").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("c.rs"), "").unwrap();

        let (files, diagnostics) = list_source_files(dir.path(), false, "rs");
        let names: Vec<_> = files
            .iter()
            .map(|f| f.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.rs", "b.rs"]);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_recursive_listing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.rs"), "").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("c.rs"), "").unwrap();

        let (files, _) = list_source_files(dir.path(), true, "rs");
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_missing_directory_is_a_scan_failure() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");

        let (files, diagnostics) = list_source_files(&missing, false, "rs");
        assert!(files.is_empty());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::ScanFailure);
        assert!(diagnostics[0].message.contains("missing"));
    }
}
