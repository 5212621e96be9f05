//! Configuration model and merging.
//!
//! Settings resolve in precedence order: CLI flags > local `.mkcontext.yaml`
//! > global `~/.config/mkcontext/config.yaml` > built-in defaults. The local
//! file is a partial overlay ([`PartialConfig`]) merged field-by-field by an
//! explicit, enumerated merge function.

pub mod loader;
pub mod merge;

pub use loader::{global_config_path, load_global, load_local, load_merged, LOCAL_CONFIG_FILE};
pub use merge::{diff, merge_partial, PartialConfig, PartialContextConfig};

use crate::error::Error;
use crate::utils::filesize;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Artifact flavor. Only the default output extension differs; the rendered
/// body is identical for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum OutputFormat {
    #[serde(rename = "md")]
    #[value(name = "md")]
    Markdown,
    #[serde(rename = "txt")]
    #[value(name = "txt")]
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Text => "txt",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContextConfig {
    pub output_format: OutputFormat,
    pub ignore_patterns: Vec<String>,
    pub max_file_size: String,
    pub include_file_structure: bool,
    pub include_file_content: bool,
    pub exclude_extensions: Vec<String>,
    pub max_files_to_include: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Markdown,
            ignore_patterns: default_ignore_patterns(),
            max_file_size: "1MB".to_string(),
            include_file_structure: true,
            include_file_content: true,
            exclude_extensions: default_exclude_extensions(),
            max_files_to_include: 100,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub context: ContextConfig,
}

impl Config {
    /// Check invariants that would otherwise surface mid-pipeline. Runs
    /// before any filesystem work.
    pub fn validate(&self) -> Result<(), Error> {
        filesize::parse(&self.context.max_file_size)
            .map_err(|_| Error::Config(format!(
                "invalid max_file_size: {:?}",
                self.context.max_file_size
            )))?;
        Ok(())
    }

    /// The configured size ceiling in bytes. `validate` has already proven
    /// the string parses, but the error is still propagated rather than
    /// unwrapped.
    pub fn max_file_bytes(&self) -> Result<u64, Error> {
        filesize::parse(&self.context.max_file_size)
    }
}

fn default_ignore_patterns() -> Vec<String> {
    [
        ".git/",
        "node_modules/",
        "vendor/",
        ".idea/",
        "*.pyc",
        "*.pyo",
        "*.so",
        "*.dylib",
        "*.dll",
        "*.class",
        ".DS_Store",
        "Thumbs.db",
        "*.swp",
        "*.swo",
        "*~",
        ".env",
        "*.log",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_exclude_extensions() -> Vec<String> {
    [
        ".exe", ".bin", ".o", ".a", ".lib", ".so", ".dylib", ".dll", ".zip", ".tar", ".gz",
        ".7z", ".rar", ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".ico", ".mp3", ".mp4", ".avi",
        ".mov", ".pdf", ".doc", ".docx", ".xls", ".xlsx",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = Config::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.context.output_format, OutputFormat::Markdown);
        assert_eq!(cfg.context.max_files_to_include, 100);
        assert_eq!(cfg.max_file_bytes().unwrap(), 1024 * 1024);
    }

    #[test]
    fn test_validate_rejects_bad_size() {
        let mut cfg = Config::default();
        cfg.context.max_file_size = "lots".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_output_format_serde_names() {
        let yaml = "context:\n  output_format: txt\n";
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.context.output_format, OutputFormat::Text);
        assert_eq!(cfg.context.output_format.extension(), "txt");
    }
}
