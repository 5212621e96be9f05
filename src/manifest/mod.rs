//! Checksum manifest: per-file and aggregate hashes embedded in the
//! artifact, parsed back later to decide whether regeneration is needed.
//!
//! The aggregate hash covers `"<path>:<content>\n"` for every file in
//! lexicographic path order, so it pins both the exact file set and its
//! contents: an add, remove, rename, or single-byte edit all change it.

use crate::collect::Collector;
use crate::error::Error;
use crate::utils::sha256_hex;
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::ops::ControlFlow;
use std::path::Path;

/// Opening marker of the manifest block inside a rendered artifact.
pub const MANIFEST_MARKER: &str = "<!-- MKCONTEXT";
/// Closing marker of the manifest block.
pub const MANIFEST_END_MARKER: &str = "MKCONTEXT -->";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub generated_by: String,
    pub generated_at: DateTime<Utc>,
    pub version: String,
    /// Aggregate hash over the whole collected set.
    pub checksum_source: String,
    /// Path -> content hash. Key set must equal the snapshot's path set.
    pub file_checksums: BTreeMap<String, String>,
}

impl Manifest {
    /// Build a manifest for a collected file set. Per-file hashing is
    /// parallelized; the aggregate is computed sequentially in path order,
    /// so the result is independent of discovery or scheduling order.
    pub fn build(files: &BTreeMap<String, String>) -> Self {
        let file_checksums: BTreeMap<String, String> = files
            .par_iter()
            .map(|(path, content)| (path.clone(), sha256_hex(content.as_bytes())))
            .collect();

        let mut hasher = Sha256::new();
        for (path, content) in files {
            hasher.update(path.as_bytes());
            hasher.update(b":");
            hasher.update(content.as_bytes());
            hasher.update(b"\n");
        }

        Self {
            generated_by: "mkcontext".to_string(),
            generated_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            checksum_source: format!("{:x}", hasher.finalize()),
            file_checksums,
        }
    }

    /// Decide whether the tree under `root` has drifted from this manifest.
    ///
    /// Tracked files are re-read and re-hashed (missing => stale, other
    /// read errors propagate, mismatch => stale). If none drifted, the tree
    /// is walked with the collector's eligibility rules and the first
    /// eligible file the manifest does not know makes it stale; that walk
    /// stops on the first hit. Read-only: never writes state.
    pub fn is_stale(&self, root: &Path, collector: &Collector) -> Result<bool, Error> {
        for (path, stored) in &self.file_checksums {
            let content = match fs::read(root.join(path)) {
                Ok(content) => content,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(true),
                Err(err) => return Err(err.into()),
            };
            if sha256_hex(&content) != *stored {
                return Ok(true);
            }
        }

        let mut added = false;
        collector.visit_eligible(root, |rel_path, _| {
            if self.file_checksums.contains_key(&rel_path) {
                ControlFlow::Continue(())
            } else {
                added = true;
                ControlFlow::Break(())
            }
        })?;
        Ok(added)
    }

    /// Serialize the marker-delimited block the renderer puts at the top of
    /// every artifact.
    pub fn to_block(&self) -> String {
        // Manifest serialization cannot fail: all fields are plain maps and
        // strings. Guard anyway rather than panic.
        let json = serde_json::to_string_pretty(self)
            .unwrap_or_else(|_| "{}".to_string());
        format!("{MANIFEST_MARKER}\n{json}\n{MANIFEST_END_MARKER}")
    }

    /// Parse the manifest block back out of a previously rendered artifact.
    /// Missing markers or malformed JSON are a [`Error::ManifestParse`];
    /// callers treat that as "no prior manifest".
    pub fn parse_from_artifact(content: &str) -> Result<Self, Error> {
        let start = content
            .find(MANIFEST_MARKER)
            .ok_or_else(|| Error::ManifestParse("start marker not found".to_string()))?;
        let end = content
            .find(MANIFEST_END_MARKER)
            .ok_or_else(|| Error::ManifestParse("end marker not found".to_string()))?;
        if end < start {
            return Err(Error::ManifestParse("markers out of order".to_string()));
        }

        let json = content[start + MANIFEST_MARKER.len()..end].trim();
        serde_json::from_str(json).map_err(|err| Error::ManifestParse(err.to_string()))
    }
}
