//! Context command: the collect -> hash -> render pipeline.

use anyhow::{Context as _, Result};
use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};

use crate::collect::{detect_project, project_ignore_patterns, Collector};
use crate::config::{self, OutputFormat};
use crate::error::Error;
use crate::ignore::PatternSet;
use crate::manifest::Manifest;
use crate::render::{render, RenderOptions};

/// Default artifact basenames, always added to the ignore set so a previous
/// run's output is never collected into the next one.
const DEFAULT_ARTIFACT_NAMES: [&str; 2] = ["context.md", "context.txt"];

#[derive(Args)]
pub struct ContextArgs {
    /// Project directory to snapshot (defaults to the current directory)
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Output file (default is <PATH>/context.md or context.txt)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Only include file structure
    #[arg(short = 's', long)]
    pub structure_only: bool,

    /// Only include file contents
    #[arg(short = 'c', long)]
    pub content_only: bool,

    /// Output format (md or txt)
    #[arg(short, long, value_enum, env = "MKCONTEXT_FORMAT")]
    pub format: Option<OutputFormat>,

    /// Maximum number of files to include (0 = use config value)
    #[arg(long, value_name = "N")]
    pub max_files: Option<usize>,

    /// Additional patterns to ignore (repeatable)
    #[arg(long = "ignore", value_name = "PATTERN")]
    pub ignore: Vec<String>,

    /// Regenerate even when the existing context is up to date
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: ContextArgs) -> Result<()> {
    if args.structure_only && args.content_only {
        return Err(Error::Config(
            "cannot use both --structure-only and --content-only".to_string(),
        )
        .into());
    }

    let mut config = config::load_merged()?;
    if let Some(format) = args.format {
        config.context.output_format = format;
    }
    if args.structure_only {
        config.context.include_file_content = false;
    }
    if args.content_only {
        config.context.include_file_structure = false;
    }
    if let Some(max_files) = args.max_files {
        if max_files > 0 {
            config.context.max_files_to_include = max_files;
        }
    }

    let root = args.path.clone().unwrap_or_else(|| PathBuf::from("."));
    let max_bytes = config.max_file_bytes()?;

    // Insertion order is precedence order: config defaults, CLI extras,
    // artifact names, the project's .gitignore, then project-type defaults.
    let mut patterns = PatternSet::new();
    patterns.add_patterns(&config.context.ignore_patterns);
    patterns.add_patterns(&args.ignore);
    match &args.output {
        Some(path) => {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                patterns.add_pattern(name);
            }
        }
        None => patterns.add_patterns(DEFAULT_ARTIFACT_NAMES),
    }
    patterns.load_ignore_file(&root.join(".gitignore"))?;
    patterns.add_patterns(project_ignore_patterns(&root));
    tracing::debug!("pattern set holds {} rules", patterns.len());

    let collector = Collector::new(
        patterns,
        max_bytes,
        config.context.max_files_to_include,
        config.context.exclude_extensions.clone(),
    );

    if !args.force {
        if let Some((path, content, manifest)) =
            find_existing_artifact(&root, args.output.as_deref())
        {
            // A staleness read failure means some tracked file is in flux;
            // fall through and regenerate rather than abort.
            match manifest.is_stale(&root, &collector) {
                Ok(false) => {
                    println!("No changes detected in source files. Using existing context.");
                    println!("{content}");
                    return Ok(());
                }
                Ok(true) => {
                    tracing::debug!("existing context at {} is stale", path.display())
                }
                Err(err) => {
                    tracing::warn!("staleness check failed, regenerating: {err}")
                }
            }
        }
    }

    let project = detect_project(&root);
    let snapshot = collector.collect(&root)?;
    if snapshot.truncated {
        eprintln!(
            "Warning: Only including first {} files due to limit",
            config.context.max_files_to_include
        );
    }

    let manifest = Manifest::build(&snapshot.files);
    let artifact = render(
        &project,
        &snapshot.files,
        &manifest,
        RenderOptions {
            include_structure: config.context.include_file_structure,
            include_content: config.context.include_file_content,
        },
    );

    let output_file = args.output.clone().unwrap_or_else(|| {
        root.join(format!("context.{}", config.context.output_format.extension()))
    });
    if let Some(parent) = output_file.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create output directory {}", parent.display())
            })?;
        }
    }
    fs::write(&output_file, &artifact)
        .with_context(|| format!("failed to write {}", output_file.display()))?;
    println!("Context generated and saved to {}", output_file.display());

    Ok(())
}

/// Look for a previously rendered artifact whose manifest block parses.
/// A malformed block is logged and treated as "no prior manifest".
fn find_existing_artifact(
    root: &Path,
    output: Option<&Path>,
) -> Option<(PathBuf, String, Manifest)> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Some(path) = output {
        candidates.push(path.to_path_buf());
    }
    candidates.extend(DEFAULT_ARTIFACT_NAMES.iter().map(|name| root.join(name)));

    for candidate in candidates {
        let Ok(content) = fs::read_to_string(&candidate) else {
            continue;
        };
        match Manifest::parse_from_artifact(&content) {
            Ok(manifest) => return Some((candidate, content, manifest)),
            Err(err) => {
                tracing::debug!("ignoring artifact {}: {err}", candidate.display());
            }
        }
    }
    None
}
