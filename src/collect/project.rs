//! Project detection: type from marker files, VCS state via libgit2.

use std::path::Path;

/// Detected project type, keyed off well-known manifest files at the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectKind {
    Nodejs,
    Go,
    Python,
    Php,
    Rust,
    Unknown,
}

impl ProjectKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectKind::Nodejs => "nodejs",
            ProjectKind::Go => "go",
            ProjectKind::Python => "python",
            ProjectKind::Php => "php",
            ProjectKind::Rust => "rust",
            ProjectKind::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone)]
pub struct GitInfo {
    pub branch: String,
    pub dirty: bool,
}

#[derive(Debug, Clone)]
pub struct ProjectInfo {
    pub kind: ProjectKind,
    pub git: Option<GitInfo>,
}

/// Detect the project type and, best-effort, its git state. Any git failure
/// degrades to `git: None`; detection never aborts the pipeline.
pub fn detect_project(root: &Path) -> ProjectInfo {
    let kind = if root.join("package.json").exists() {
        ProjectKind::Nodejs
    } else if root.join("go.mod").exists() {
        ProjectKind::Go
    } else if root.join("requirements.txt").exists() {
        ProjectKind::Python
    } else if root.join("composer.json").exists() {
        ProjectKind::Php
    } else if root.join("Cargo.toml").exists() {
        ProjectKind::Rust
    } else {
        ProjectKind::Unknown
    };

    ProjectInfo { kind, git: git_info(root) }
}

fn git_info(root: &Path) -> Option<GitInfo> {
    // Open, not discover: a parent repository's state is not this
    // project's state.
    let repo = git2::Repository::open(root).ok()?;
    let branch = repo
        .head()
        .ok()
        .and_then(|head| head.shorthand().map(|s| s.to_string()))
        .unwrap_or_else(|| "HEAD".to_string());

    let mut status_opts = git2::StatusOptions::new();
    status_opts.include_untracked(true).include_ignored(false);
    let dirty = repo
        .statuses(Some(&mut status_opts))
        .map(|statuses| !statuses.is_empty())
        .unwrap_or(false);

    Some(GitInfo { branch, dirty })
}

/// Extra ignore patterns implied by the detected project layout, appended
/// after any loaded ignore file.
pub fn project_ignore_patterns(root: &Path) -> Vec<String> {
    let mut patterns: Vec<&str> = Vec::new();

    if root.join("package.json").exists() {
        patterns.extend(["node_modules/", "dist/", "build/", "coverage/", ".next/", ".nuxt/"]);
    }
    if root.join("go.mod").exists() {
        patterns.extend(["vendor/", "bin/", "dist/"]);
    }
    if root.join("requirements.txt").exists() || root.join("setup.py").exists() {
        patterns.extend([
            "venv/",
            "env/",
            "__pycache__/",
            "*.pyc",
            "*.pyo",
            "*.pyd",
            ".Python",
            "build/",
            "dist/",
            "*.egg-info/",
        ]);
    }
    if root.join("pom.xml").exists() {
        patterns.extend(["target/", "*.class", "*.jar"]);
    }
    if root.join("Cargo.toml").exists() {
        patterns.extend(["target/"]);
    }

    patterns.into_iter().map(|s| s.to_string()).collect()
}
