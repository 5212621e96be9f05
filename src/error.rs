//! Error taxonomy for the snapshot pipeline.
//!
//! Fatal conditions (bad configuration, unreadable root) surface as typed
//! variants and abort the run; per-file read failures and malformed prior
//! manifests are handled locally by the modules that encounter them and
//! never appear here.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration value (unparsable size string, bad format,
    /// conflicting flags). Raised before any filesystem work.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The collection root itself cannot be opened or listed.
    #[error("cannot access root directory {}", path.display())]
    RootAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A previously rendered artifact carries a manifest block that cannot
    /// be parsed back. Callers treat this as "no prior manifest".
    #[error("malformed manifest block: {0}")]
    ManifestParse(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
