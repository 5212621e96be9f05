//! File collection: one deterministic walk producing the snapshot.
//!
//! The walk is pre-order with per-directory lexicographic entry ordering, so
//! repeated runs over an unchanged tree visit files in the same order and a
//! truncated run keeps the same files every time. Ignored directories are
//! pruned outright: nothing beneath them is read or visible to file-level
//! rules.

pub mod project;

pub use project::{detect_project, project_ignore_patterns, GitInfo, ProjectInfo, ProjectKind};

use crate::error::Error;
use crate::ignore::PatternSet;
use crate::utils::{filesize, is_text_content, normalize_path};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::ops::ControlFlow;
use std::path::Path;
use walkdir::WalkDir;

/// Ordered (by path) set of collected files plus the truncation flag.
#[derive(Debug, Default)]
pub struct Snapshot {
    /// Normalized relative path -> file content. BTreeMap keeps the set in
    /// lexicographic path order for rendering and hashing.
    pub files: BTreeMap<String, String>,
    /// True when collection stopped at the configured file ceiling.
    pub truncated: bool,
}

/// Walks a tree once, applying ignore patterns, size/extension limits and
/// the text-content heuristic. Built per invocation and read-only.
pub struct Collector {
    patterns: PatternSet,
    max_bytes: u64,
    max_files: usize,
    excluded_extensions: BTreeSet<String>,
}

impl Collector {
    /// `max_files == 0` means no ceiling. Extensions are compared lowercase
    /// with their leading dot (".exe").
    pub fn new(
        patterns: PatternSet,
        max_bytes: u64,
        max_files: usize,
        excluded_extensions: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            patterns,
            max_bytes,
            max_files,
            excluded_extensions: excluded_extensions
                .into_iter()
                .map(|e| e.to_lowercase())
                .collect(),
        }
    }

    /// Collect every eligible file under `root`, stopping once the file
    /// ceiling is reached. Only an unreadable root is fatal; individual
    /// files that vanish or fail to read mid-walk are skipped.
    pub fn collect(&self, root: &Path) -> Result<Snapshot, Error> {
        let mut snapshot = Snapshot::default();
        let max_files = self.max_files;
        self.visit_eligible(root, |rel_path, content| {
            snapshot.files.insert(rel_path, content);
            if max_files > 0 && snapshot.files.len() >= max_files {
                snapshot.truncated = true;
                return ControlFlow::Break(());
            }
            ControlFlow::Continue(())
        })?;
        Ok(snapshot)
    }

    /// Drive `visit` over every eligible file in deterministic walk order.
    /// The callback returns an explicit continue/stop signal; stopping is
    /// not an error. Shared by [`Collector::collect`] and the staleness
    /// check so both agree on what "eligible" means.
    pub fn visit_eligible<F>(&self, root: &Path, mut visit: F) -> Result<(), Error>
    where
        F: FnMut(String, String) -> ControlFlow<()>,
    {
        // Only the root itself must be listable.
        fs::read_dir(root).map_err(|source| Error::RootAccess {
            path: root.to_path_buf(),
            source,
        })?;

        let mut walker = WalkDir::new(root).sort_by_file_name().into_iter();
        while let Some(entry) = walker.next() {
            let entry = match entry {
                Ok(entry) => entry,
                // Unreadable subtree mid-walk: skip, keep walking.
                Err(err) => {
                    tracing::debug!("skipping unreadable entry: {err}");
                    continue;
                }
            };

            if entry.depth() == 0 {
                continue;
            }

            let rel_path = match entry.path().strip_prefix(root) {
                Ok(rel) => normalize_path(&rel.to_string_lossy()),
                Err(_) => continue,
            };

            if entry.file_type().is_dir() {
                if self.patterns.should_ignore(&rel_path) {
                    walker.skip_current_dir();
                }
                continue;
            }
            if !entry.file_type().is_file() {
                continue;
            }

            if self.patterns.should_ignore(&rel_path) {
                continue;
            }

            let size = match entry.metadata() {
                Ok(meta) => meta.len(),
                Err(_) => continue,
            };
            if size > self.max_bytes {
                tracing::debug!(
                    "skipping {rel_path}: {} exceeds the {} limit",
                    filesize::format(size),
                    filesize::format(self.max_bytes)
                );
                continue;
            }

            if self.has_excluded_extension(&rel_path) {
                continue;
            }

            // Unreadable file: skip, not fatal.
            let bytes = match fs::read(entry.path()) {
                Ok(bytes) => bytes,
                Err(err) => {
                    tracing::debug!("skipping {rel_path}: {err}");
                    continue;
                }
            };
            if !is_text_content(&bytes) {
                continue;
            }
            let content = match String::from_utf8(bytes) {
                Ok(content) => content,
                Err(_) => continue,
            };

            if visit(rel_path, content).is_break() {
                break;
            }
        }

        Ok(())
    }

    fn has_excluded_extension(&self, rel_path: &str) -> bool {
        match Path::new(rel_path).extension().and_then(|e| e.to_str()) {
            Some(ext) => {
                let ext = format!(".{}", ext.to_lowercase());
                self.excluded_extensions.contains(&ext)
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn collector(patterns: &[&str], max_bytes: u64, max_files: usize) -> Collector {
        let mut set = PatternSet::new();
        set.add_patterns(patterns.iter().copied());
        Collector::new(set, max_bytes, max_files, Vec::new())
    }

    #[test]
    fn test_collects_relative_normalized_paths() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("src")).unwrap();
        fs::write(tmp.path().join("src/main.rs"), "fn main() {}").unwrap();
        fs::write(tmp.path().join("README.md"), "# readme").unwrap();

        let snapshot = collector(&[], 1 << 20, 0).collect(tmp.path()).unwrap();
        let paths: Vec<&str> = snapshot.files.keys().map(String::as_str).collect();
        assert_eq!(paths, ["README.md", "src/main.rs"]);
        assert!(!snapshot.truncated);
        assert_eq!(snapshot.files["src/main.rs"], "fn main() {}");
    }

    #[test]
    fn test_pruned_directory_is_invisible() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("vendor/pkg")).unwrap();
        fs::write(tmp.path().join("vendor/pkg/file.go"), "package pkg").unwrap();
        fs::write(tmp.path().join("main.go"), "package main").unwrap();

        let snapshot = collector(&["vendor/"], 1 << 20, 0).collect(tmp.path()).unwrap();
        assert_eq!(snapshot.files.len(), 1);
        assert!(snapshot.files.contains_key("main.go"));
    }

    #[test]
    fn test_negation_rescue_inside_ignored_name() {
        // File-level rescue works when the directory itself is not pruned.
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("logs")).unwrap();
        fs::write(tmp.path().join("logs/app.log"), "log").unwrap();
        fs::write(tmp.path().join("logs/keep.txt"), "keep").unwrap();

        let snapshot =
            collector(&["logs/app.log"], 1 << 20, 0).collect(tmp.path()).unwrap();
        assert!(!snapshot.files.contains_key("logs/app.log"));
        assert!(snapshot.files.contains_key("logs/keep.txt"));
    }

    #[test]
    fn test_size_limit_skips_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("big.txt"), "x".repeat(4096)).unwrap();
        fs::write(tmp.path().join("small.txt"), "ok").unwrap();

        let snapshot = collector(&[], 1024, 0).collect(tmp.path()).unwrap();
        assert_eq!(snapshot.files.len(), 1);
        assert!(snapshot.files.contains_key("small.txt"));
    }

    #[test]
    fn test_excluded_extension_skipped_case_insensitively() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("logo.PNG"), "not really an image").unwrap();
        fs::write(tmp.path().join("main.rs"), "fn main() {}").unwrap();

        let collector =
            Collector::new(PatternSet::new(), 1 << 20, 0, vec![".png".to_string()]);
        let snapshot = collector.collect(tmp.path()).unwrap();
        assert_eq!(snapshot.files.len(), 1);
        assert!(snapshot.files.contains_key("main.rs"));
    }

    #[test]
    fn test_binary_content_excluded_regardless_of_extension() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("data.txt"), b"text\x00binary").unwrap();
        fs::write(tmp.path().join("fine.txt"), "text").unwrap();

        let snapshot = collector(&[], 1 << 20, 0).collect(tmp.path()).unwrap();
        assert_eq!(snapshot.files.len(), 1);
        assert!(snapshot.files.contains_key("fine.txt"));
    }

    #[test]
    fn test_truncation_is_deterministic() {
        let tmp = TempDir::new().unwrap();
        for name in ["a.txt", "b.txt", "c.txt", "d.txt", "e.txt"] {
            fs::write(tmp.path().join(name), name).unwrap();
        }

        let first = collector(&[], 1 << 20, 2).collect(tmp.path()).unwrap();
        assert!(first.truncated);
        assert_eq!(first.files.len(), 2);
        let first_paths: Vec<String> = first.files.keys().cloned().collect();
        assert_eq!(first_paths, ["a.txt", "b.txt"]);

        for _ in 0..3 {
            let again = collector(&[], 1 << 20, 2).collect(tmp.path()).unwrap();
            let again_paths: Vec<String> = again.files.keys().cloned().collect();
            assert_eq!(again_paths, first_paths);
        }
    }

    #[test]
    fn test_no_ceiling_when_zero() {
        let tmp = TempDir::new().unwrap();
        for i in 0..5 {
            fs::write(tmp.path().join(format!("f{i}.txt")), "x").unwrap();
        }
        let snapshot = collector(&[], 1 << 20, 0).collect(tmp.path()).unwrap();
        assert_eq!(snapshot.files.len(), 5);
        assert!(!snapshot.truncated);
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope");
        let err = collector(&[], 1 << 20, 0).collect(&missing).unwrap_err();
        assert!(matches!(err, Error::RootAccess { .. }));
    }

    #[test]
    fn test_visitor_stop_is_not_an_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), "a").unwrap();
        fs::write(tmp.path().join("b.txt"), "b").unwrap();

        let mut seen = Vec::new();
        collector(&[], 1 << 20, 0)
            .visit_eligible(tmp.path(), |rel, _| {
                seen.push(rel);
                ControlFlow::Break(())
            })
            .unwrap();
        assert_eq!(seen, ["a.txt"]);
    }
}
