//! Explicit config overlay and diffing.
//!
//! The local project file deserializes into [`PartialConfig`], where every
//! field is optional. [`merge_partial`] enumerates the overridable fields
//! one by one; there is no runtime introspection, so adding a field means
//! adding a line here and the compiler points at forgotten ones via
//! destructuring.

use super::{Config, OutputFormat};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialConfig {
    pub context: PartialContextConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PartialContextConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_format: Option<OutputFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_patterns: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_file_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_file_structure: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_file_content: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_extensions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_files_to_include: Option<usize>,
}

/// Overlay every set field of `partial` onto `config`.
pub fn merge_partial(config: &mut Config, partial: &PartialConfig) {
    // Destructure so a new overlay field cannot be silently forgotten.
    let PartialContextConfig {
        output_format,
        ignore_patterns,
        max_file_size,
        include_file_structure,
        include_file_content,
        exclude_extensions,
        max_files_to_include,
    } = &partial.context;

    let ctx = &mut config.context;
    if let Some(v) = output_format {
        ctx.output_format = *v;
    }
    if let Some(v) = ignore_patterns {
        ctx.ignore_patterns = v.clone();
    }
    if let Some(v) = max_file_size {
        ctx.max_file_size = v.clone();
    }
    if let Some(v) = include_file_structure {
        ctx.include_file_structure = *v;
    }
    if let Some(v) = include_file_content {
        ctx.include_file_content = *v;
    }
    if let Some(v) = exclude_extensions {
        ctx.exclude_extensions = v.clone();
    }
    if let Some(v) = max_files_to_include {
        ctx.max_files_to_include = *v;
    }
}

/// Render the settings the local overlay changes relative to the global
/// config, `field: old -> new` per line. Empty string when nothing differs.
pub fn diff(global: &Config, local: &PartialConfig) -> String {
    let mut out = String::new();
    let g = &global.context;
    let l = &local.context;

    if let Some(v) = l.output_format {
        if v != g.output_format {
            let _ = writeln!(
                out,
                "  output_format: {} -> {}",
                g.output_format.extension(),
                v.extension()
            );
        }
    }
    if let Some(v) = &l.max_file_size {
        if *v != g.max_file_size {
            let _ = writeln!(out, "  max_file_size: {} -> {}", g.max_file_size, v);
        }
    }
    if let Some(v) = l.max_files_to_include {
        if v != g.max_files_to_include {
            let _ = writeln!(
                out,
                "  max_files_to_include: {} -> {}",
                g.max_files_to_include, v
            );
        }
    }
    if let Some(v) = l.include_file_structure {
        if v != g.include_file_structure {
            let _ = writeln!(
                out,
                "  include_file_structure: {} -> {}",
                g.include_file_structure, v
            );
        }
    }
    if let Some(v) = l.include_file_content {
        if v != g.include_file_content {
            let _ = writeln!(
                out,
                "  include_file_content: {} -> {}",
                g.include_file_content, v
            );
        }
    }
    if let Some(patterns) = &l.ignore_patterns {
        if !patterns.is_empty() {
            let _ = writeln!(out, "  ignore_patterns: (replaced) [");
            for p in patterns {
                let _ = writeln!(out, "    {p}");
            }
            let _ = writeln!(out, "  ]");
        }
    }
    if let Some(exts) = &l.exclude_extensions {
        if !exts.is_empty() {
            let _ = writeln!(out, "  exclude_extensions: (replaced) [");
            for e in exts {
                let _ = writeln!(out, "    {e}");
            }
            let _ = writeln!(out, "  ]");
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_overrides_only_set_fields() {
        let mut config = Config::default();
        let partial: PartialConfig = serde_yaml::from_str(
            "context:\n  max_files_to_include: 7\n  output_format: txt\n",
        )
        .unwrap();

        merge_partial(&mut config, &partial);
        assert_eq!(config.context.max_files_to_include, 7);
        assert_eq!(config.context.output_format, OutputFormat::Text);
        // Untouched fields keep their defaults.
        assert_eq!(config.context.max_file_size, "1MB");
        assert!(config.context.include_file_content);
    }

    #[test]
    fn test_merge_replaces_pattern_list() {
        let mut config = Config::default();
        let partial: PartialConfig =
            serde_yaml::from_str("context:\n  ignore_patterns: ['*.tmp']\n").unwrap();
        merge_partial(&mut config, &partial);
        assert_eq!(config.context.ignore_patterns, vec!["*.tmp".to_string()]);
    }

    #[test]
    fn test_diff_lists_changes() {
        let global = Config::default();
        let local: PartialConfig = serde_yaml::from_str(
            "context:\n  output_format: txt\n  max_files_to_include: 5\n",
        )
        .unwrap();

        let d = diff(&global, &local);
        assert!(d.contains("output_format: md -> txt"));
        assert!(d.contains("max_files_to_include: 100 -> 5"));
    }

    #[test]
    fn test_diff_empty_when_no_overrides() {
        let global = Config::default();
        assert!(diff(&global, &PartialConfig::default()).is_empty());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let parsed: Result<PartialConfig, _> =
            serde_yaml::from_str("context:\n  max_filez: 3\n");
        assert!(parsed.is_err());
    }
}
