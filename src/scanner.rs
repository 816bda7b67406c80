// SPDX-License-Identifier: PMPL-1.0-or-later
//! File and directory scanning for the live-scan consumer.
//!
//! Walks directory trees, picks up HTML documents and evaluates each one
//! with the engine. Results come back in path order.

use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::error::Result;
use crate::report::Report;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

/// File extensions to scan
pub const SCANNABLE_EXTENSIONS: &[&str] = &["html", "htm"];

/// Directories to skip
const SKIP_DIRS: &[&str] = &[
    "node_modules", ".git", "target", "dist", "build",
    "_build", "vendor", ".next", ".nuxt", "coverage",
];

/// Report for one scanned file
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(flatten)]
    pub report: Report,
}

/// Evaluate markup held in memory
pub fn scan_markup(engine: &Engine, markup: &str, config: &EngineConfig) -> Result<Report> {
    engine.scan(markup, config)
}

/// Evaluate a single file
pub fn scan_file(engine: &Engine, path: &Path, config: &EngineConfig) -> Result<Report> {
    let content = std::fs::read_to_string(path)?;
    engine.scan(&content, config)
}

/// Whether a path has a scannable extension
pub fn is_scannable(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SCANNABLE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Scan every HTML document under a directory
pub fn scan_directory(engine: &Engine, dir: &Path, config: &EngineConfig) -> Result<Vec<FileReport>> {
    config.validate(engine.registry())?;
    let mut reports = Vec::new();

    info!("Scanning directory: {}", dir.display());

    for entry in WalkDir::new(dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            // Skip hidden and excluded directories
            let name = e.file_name().to_str().unwrap_or("");
            if e.file_type().is_dir() && e.depth() > 0 {
                return !SKIP_DIRS.contains(&name) && !name.starts_with('.');
            }
            true
        })
    {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };

        if !entry.file_type().is_file() || !is_scannable(entry.path()) {
            continue;
        }

        let path = entry.path();
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                info!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };

        let report = engine.scan(&content, config)?;
        reports.push(FileReport {
            path: path.to_path_buf(),
            report,
        });
    }

    let issues: usize = reports.iter().map(|r| r.report.len()).sum();
    info!("Scanned {} files, found {} issues", reports.len(), issues);

    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_scan_nonexistent_dir() {
        let result = scan_directory(&Engine::new(), Path::new("/nonexistent/path"), &EngineConfig::default());
        // walkdir reports the missing root as an entry error, which is skipped
        assert!(result.map(|r| r.is_empty()).unwrap_or(false));
    }

    #[test]
    fn test_scan_directory_filters_and_orders() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.html"), "<img src=\"x.jpg\">").unwrap();
        std::fs::write(dir.path().join("a.htm"), "<p>fine</p>").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "<img src=\"x.jpg\">").unwrap();
        std::fs::create_dir(dir.path().join("node_modules")).unwrap();
        std::fs::write(dir.path().join("node_modules").join("c.html"), "<img>").unwrap();

        let reports = scan_directory(&Engine::new(), dir.path(), &EngineConfig::default()).unwrap();
        let names: Vec<String> = reports
            .iter()
            .map(|r| r.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.htm", "b.html"]);
        assert!(reports[0].report.is_empty());
        assert!(reports[1].report.rule_ids().contains("missing-alt-text"));
    }

    #[test]
    fn test_scan_file_missing_is_error() {
        assert!(scan_file(&Engine::new(), Path::new("/nonexistent/file.html"), &EngineConfig::default()).is_err());
    }
}
