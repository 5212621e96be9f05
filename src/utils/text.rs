//! Text/binary content heuristic

/// Decide whether raw file content is text we can embed in the artifact.
///
/// A NUL byte anywhere marks the content binary, and anything that is not
/// valid UTF-8 is treated the same way. Empty files count as text.
pub fn is_text_content(content: &[u8]) -> bool {
    if content.is_empty() {
        return true;
    }
    if content.contains(&0) {
        return false;
    }
    std::str::from_utf8(content).is_ok()
}
