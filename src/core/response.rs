//! # Response Limits
//!
//! Discord size limits for outgoing replies.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Button label truncation, embed helpers removed
//! - 1.0.0: Line-aware message chunking

/// Discord message content limit
pub const MESSAGE_LIMIT: usize = 2000;
/// Discord button label limit (characters)
pub const BUTTON_LABEL_LIMIT: usize = 80;

/// Split text into pieces of at most `max_size` bytes.
///
/// Prefers newline boundaries; a single line longer than the limit is cut
/// on character boundaries.
pub fn chunk_text(text: &str, max_size: usize) -> Vec<String> {
    if text.len() <= max_size {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        // +1 for the newline we put back
        if current.len() + line.len() + 1 > max_size {
            if !current.is_empty() {
                chunks.push(current.trim_end().to_string());
                current.clear();
            }
            if line.len() + 1 > max_size {
                chunks.extend(split_line(line, max_size));
                continue;
            }
        }
        current.push_str(line);
        current.push('\n');
    }
    if !current.trim_end().is_empty() {
        chunks.push(current.trim_end().to_string());
    }
    chunks
}

fn split_line(line: &str, max_size: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    for ch in line.chars() {
        if current.len() + ch.len_utf8() > max_size && !current.is_empty() {
            pieces.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Chunk text for message content (2000 byte limit)
pub fn chunk_for_message(text: &str) -> Vec<String> {
    chunk_text(text, MESSAGE_LIMIT)
}

/// Shorten a button label to the platform limit, ending in "..." when cut
pub fn truncate_label(label: &str) -> String {
    if label.chars().count() <= BUTTON_LABEL_LIMIT {
        return label.to_string();
    }
    let head: String = label.chars().take(BUTTON_LABEL_LIMIT - 3).collect();
    format!("{head}...")
}
