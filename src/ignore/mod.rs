//! Ordered, negatable ignore patterns with gitignore-style semantics.
//!
//! A [`PatternSet`] holds rules in insertion order and answers whether a
//! relative path is ignored. Evaluation never stops at the first match:
//! every rule is consulted in order and the last matching rule wins, with
//! negated rules (`!pattern`) flipping the running verdict back to
//! "not ignored". This is what lets `["build/", "!build/keep.txt"]` rescue
//! a single file out of an otherwise ignored directory.
//!
//! `**` is handled as a prefix/suffix test around the first occurrence, not
//! as full recursive segment globbing. Configs written for the original tool
//! rely on that approximation, so it is kept deliberately.

use crate::error::Error;
use crate::utils::normalize_path;
use globset::{GlobBuilder, GlobMatcher};
use std::fs;
use std::path::Path;

/// One pattern line. Negation (`!`) and the directory-only trailing slash
/// are derived at insertion; the stored pattern has the `!` stripped.
#[derive(Debug)]
struct IgnoreRule {
    pattern: String,
    negated: bool,
    dir_only: bool,
    /// Compiled single-segment glob for the slash-containing and basename
    /// forms. `None` when the pattern uses `**`, is directory-only, or has
    /// glob syntax that does not compile (such a rule may simply never
    /// match via the glob path).
    glob: Option<GlobMatcher>,
}

impl IgnoreRule {
    fn new(pattern: String, negated: bool) -> Self {
        let dir_only = pattern.ends_with('/');
        let glob = if pattern.contains("**") || dir_only {
            None
        } else {
            GlobBuilder::new(&pattern)
                .literal_separator(true)
                .build()
                .ok()
                .map(|g| g.compile_matcher())
        };
        Self { pattern, negated, dir_only, glob }
    }

    /// Structural match against a normalized relative path, checked in a
    /// fixed priority: `**` prefix/suffix, directory-only, full path with
    /// prefix fallback, then per-segment basename matching.
    fn matches(&self, path: &str) -> bool {
        if let Some((prefix, suffix)) = self.pattern.split_once("**") {
            let prefix = prefix.trim_end_matches('/');
            let suffix = suffix.trim_start_matches('/');
            return (prefix.is_empty() || path.starts_with(prefix))
                && (suffix.is_empty() || path.ends_with(suffix));
        }

        if self.dir_only {
            let stripped = self.pattern.trim_end_matches('/');
            return path == stripped || path.starts_with(&format!("{stripped}/"));
        }

        if self.pattern.contains('/') {
            if let Some(glob) = &self.glob {
                if glob.is_match(path) {
                    return true;
                }
            }
            return path.starts_with(&self.pattern);
        }

        match &self.glob {
            Some(glob) => path.split('/').any(|segment| glob.is_match(segment)),
            None => false,
        }
    }
}

/// Ordered rule set. Built once per invocation from config defaults, CLI
/// extras, a loaded ignore file, and project-type defaults (in that order),
/// then read-only.
#[derive(Debug, Default)]
pub struct PatternSet {
    rules: Vec<IgnoreRule>,
}

impl PatternSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one pattern. Blank lines and `#` comments are dropped,
    /// separators are normalized, and malformed glob syntax is accepted
    /// without error (it may simply never match).
    pub fn add_pattern(&mut self, pattern: &str) {
        let trimmed = pattern.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return;
        }
        let normalized = normalize_path(trimmed);
        let (text, negated) = match normalized.strip_prefix('!') {
            Some(rest) => (rest, true),
            None => (normalized.as_str(), false),
        };
        if text.is_empty() {
            return;
        }
        self.rules.push(IgnoreRule::new(text.to_string(), negated));
    }

    pub fn add_patterns<I, S>(&mut self, patterns: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pattern in patterns {
            self.add_pattern(pattern.as_ref());
        }
    }

    /// Load a line-oriented ignore file (e.g. `.gitignore`). A missing file
    /// is treated as empty; any other I/O failure propagates.
    pub fn load_ignore_file(&mut self, path: &Path) -> Result<(), Error> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(err.into()),
        };
        for line in content.lines() {
            self.add_pattern(line);
        }
        Ok(())
    }

    /// Evaluate `path` against every rule in insertion order and return the
    /// verdict of the last matching rule. Callers must not assume
    /// first-match-wins: a late `!pattern` can rescue a path an earlier
    /// broad rule ignored.
    pub fn should_ignore(&self, path: &str) -> bool {
        let path = normalize_path(path);
        let mut ignored = false;
        for rule in &self.rules {
            if rule.matches(&path) {
                ignored = !rule.negated;
            }
        }
        ignored
    }

    /// Number of rules currently held.
    pub fn len(&self) -> usize {
        self.rules.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn set(patterns: &[&str]) -> PatternSet {
        let mut ps = PatternSet::new();
        ps.add_patterns(patterns.iter().copied());
        ps
    }

    #[test]
    fn test_negation_rescues_later_rule() {
        let ps = set(&["build/", "!build/keep.txt"]);
        assert!(!ps.should_ignore("build/keep.txt"));
        assert!(ps.should_ignore("build/x.o"));
    }

    #[test]
    fn test_last_match_wins_not_first() {
        // A later broad rule re-ignores what an earlier negation rescued.
        let ps = set(&["*.log", "!important.log", "logs/"]);
        assert!(ps.should_ignore("debug.log"));
        assert!(!ps.should_ignore("important.log"));
        assert!(ps.should_ignore("logs/important.log"));
    }

    #[test]
    fn test_directory_rule_covers_subtree() {
        let ps = set(&["vendor/"]);
        assert!(ps.should_ignore("vendor"));
        assert!(ps.should_ignore("vendor/pkg/file.go"));
        assert!(!ps.should_ignore("vendored/file.go"));
    }

    #[test]
    fn test_basename_glob_matches_any_segment() {
        let ps = set(&["*.pyc"]);
        assert!(ps.should_ignore("mod.pyc"));
        assert!(ps.should_ignore("src/deep/mod.pyc"));
        assert!(!ps.should_ignore("mod.py"));
    }

    #[test]
    fn test_plain_name_matches_segment() {
        let ps = set(&["node_modules"]);
        assert!(ps.should_ignore("node_modules"));
        assert!(ps.should_ignore("web/node_modules/react/index.js"));
        assert!(!ps.should_ignore("node_modules_backup/x.js"));
    }

    #[test]
    fn test_double_star_is_prefix_suffix_test() {
        let ps = set(&["src/**/test.rs"]);
        assert!(ps.should_ignore("src/a/b/test.rs"));
        assert!(ps.should_ignore("src/test.rs"));
        assert!(!ps.should_ignore("lib/a/test.rs"));

        let trailing = set(&["build/**"]);
        assert!(trailing.should_ignore("build/any/depth/file"));
        assert!(!trailing.should_ignore("src/build.rs"));
    }

    #[test]
    fn test_slash_pattern_glob_then_prefix_fallback() {
        let ps = set(&["docs/*.md"]);
        assert!(ps.should_ignore("docs/readme.md"));
        // `*` does not cross a separator, but the prefix fallback does not
        // apply here ("docs/a/b.md" does not start with "docs/*.md").
        assert!(!ps.should_ignore("docs/a/b.md"));

        let prefix = set(&[".idea/vcs.xml"]);
        assert!(prefix.should_ignore(".idea/vcs.xml"));
        assert!(prefix.should_ignore(".idea/vcs.xml.bak"));
    }

    #[test]
    fn test_comments_and_blanks_dropped() {
        let ps = set(&["", "   ", "# comment", "*.tmp"]);
        assert_eq!(ps.len(), 1);
        assert!(ps.should_ignore("a.tmp"));
    }

    #[test]
    fn test_malformed_glob_accepted_without_match() {
        let ps = set(&["[unclosed"]);
        assert!(!ps.should_ignore("anything"));
        // Order and later rules still work around it.
        let ps = set(&["[unclosed", "*.log"]);
        assert!(ps.should_ignore("x.log"));
    }

    #[test]
    fn test_backslash_patterns_normalized() {
        let ps = set(&["build\\out\\"]);
        assert!(ps.should_ignore("build/out/artifact.bin"));
    }

    #[test]
    fn test_load_ignore_file_missing_is_empty() {
        let tmp = TempDir::new().unwrap();
        let mut ps = PatternSet::new();
        ps.load_ignore_file(&tmp.path().join(".gitignore")).unwrap();
        assert_eq!(ps.len(), 0);
    }

    #[test]
    fn test_load_ignore_file_lines() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".gitignore");
        fs::write(&path, "# build output\ntarget/\n\n*.swp\n").unwrap();

        let mut ps = PatternSet::new();
        ps.load_ignore_file(&path).unwrap();
        assert_eq!(ps.len(), 2);
        assert!(ps.should_ignore("target/debug/bin"));
        assert!(ps.should_ignore(".file.swp"));
    }
}
