//! Human-readable file size strings ("1MB", "500KB", "2.5GB").

use crate::error::Error;
use once_cell::sync::Lazy;
use regex::Regex;

static SIZE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]*\.?[0-9]+)\s*(B|KB|MB|GB)$").unwrap());

/// Parse a size string into bytes. Case-insensitive, fractional values
/// allowed ("1.5MB"). An unparsable string is a configuration error.
pub fn parse(size: &str) -> Result<u64, Error> {
    let normalized = size.trim().to_uppercase();
    if normalized.is_empty() {
        return Err(Error::Config("empty size string".to_string()));
    }

    let caps = SIZE_RE
        .captures(&normalized)
        .ok_or_else(|| Error::Config(format!("invalid size string {size:?}")))?;

    let numeral: f64 = caps[1]
        .parse()
        .map_err(|_| Error::Config(format!("invalid size number in {size:?}")))?;

    let multiplier: u64 = match &caps[2] {
        "KB" => 1024,
        "MB" => 1024 * 1024,
        "GB" => 1024 * 1024 * 1024,
        _ => 1,
    };

    Ok((numeral * multiplier as f64) as u64)
}

/// Format a byte count for messages ("512 B", "1.5 MB").
pub fn format(bytes: u64) -> String {
    const UNIT: u64 = 1024;
    if bytes < UNIT {
        return format!("{bytes} B");
    }
    let mut div = UNIT;
    let mut exp = 0;
    let mut n = bytes / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }
    let suffix = ['K', 'M', 'G', 'T', 'P', 'E'][exp];
    format!("{:.1} {}B", bytes as f64 / div as f64, suffix)
}
