//! Shared helpers: size strings, path normalization, text detection, hashing.

pub mod filesize;
pub mod hashing;
pub mod paths;
pub mod text;

pub use hashing::sha256_hex;
pub use paths::normalize_path;
pub use text::is_text_content;
