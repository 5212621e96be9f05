//! Path normalization

/// Collapse the host separator convention to forward slashes so relative
/// paths compare and hash identically on every platform.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}
