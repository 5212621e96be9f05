//! Artifact rendering: manifest block, project info, structure, contents.

use crate::collect::ProjectInfo;
use crate::manifest::Manifest;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::Path;

/// Structure and content are independent toggles; mutual exclusion of the
/// `--structure-only` / `--content-only` flags happens at the CLI before
/// this is ever built.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub include_structure: bool,
    pub include_content: bool,
}

/// Render the full artifact. The manifest block always comes first; it is
/// the part a later run parses back for the staleness check.
pub fn render(
    project: &ProjectInfo,
    files: &BTreeMap<String, String>,
    manifest: &Manifest,
    options: RenderOptions,
) -> String {
    let mut out = String::new();

    out.push_str(&manifest.to_block());
    out.push_str("\n\n");

    out.push_str("# Project Information\n\n");
    let _ = writeln!(out, "Type: {}", project.kind.as_str());
    if let Some(git) = &project.git {
        let _ = writeln!(out, "Git Branch: {}", git.branch);
        let _ = writeln!(out, "Git Status: {}", if git.dirty { "dirty" } else { "clean" });
    }
    out.push('\n');

    if options.include_structure {
        out.push_str("# File Structure\n\n```\n");
        for path in files.keys() {
            out.push_str(path);
            out.push('\n');
        }
        out.push_str("```\n\n");
    }

    if options.include_content {
        out.push_str("# File Contents\n\n");
        for (path, content) in files {
            let _ = write!(
                out,
                "## {path}\n\n```{}\n{content}\n```\n\n",
                language_tag(path)
            );
        }
    }

    out
}

/// Fence language tag derived from the extension; empty when there is none.
fn language_tag(path: &str) -> &str {
    Path::new(path).extension().and_then(|e| e.to_str()).unwrap_or("")
}
