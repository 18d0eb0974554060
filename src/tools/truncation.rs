//! Head-tail truncation for tool output fed back to the model.
//!
//! Large file reads and directory searches would otherwise blow the model's
//! context window. The first 60% and last 40% of the byte budget are kept,
//! with a marker in between that records the original size.

/// Outcome of [`smart_truncate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Truncated {
    pub content: String,
    pub original_size: usize,
    pub truncated_size: usize,
}

impl Truncated {
    pub fn was_truncated(&self) -> bool {
        self.original_size != self.truncated_size
    }
}

fn build_marker(original_size: usize, truncated_size: usize) -> String {
    format!(
        "\n...[truncated: {} bytes -> {} bytes]\n",
        original_size, truncated_size
    )
}

/// Keep at most `max_size` bytes of `content`, never splitting a UTF-8 character.
pub fn smart_truncate(content: &str, max_size: usize) -> Truncated {
    let original_size = content.len();
    if original_size <= max_size {
        return Truncated {
            content: content.to_string(),
            original_size,
            truncated_size: original_size,
        };
    }

    // Digit counts of the final marker can only shrink relative to this estimate.
    let marker_len = build_marker(original_size, max_size).len();
    if max_size <= marker_len {
        let marker = build_marker(original_size, max_size);
        let content = safe_prefix(&marker, max_size).to_string();
        let truncated_size = content.len();
        return Truncated {
            content,
            original_size,
            truncated_size,
        };
    }

    let budget = max_size - marker_len;
    let head_budget = budget * 6 / 10;
    let tail_budget = budget - head_budget;

    let head = safe_prefix(content, head_budget);
    let tail = safe_suffix(content, tail_budget);
    let marker = build_marker(original_size, head.len() + marker_len + tail.len());

    let content = format!("{}{}{}", head, marker, tail);
    let truncated_size = content.len();
    Truncated {
        content,
        original_size,
        truncated_size,
    }
}

fn safe_prefix(s: &str, max_bytes: usize) -> &str {
    if max_bytes >= s.len() {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

fn safe_suffix(s: &str, max_bytes: usize) -> &str {
    if max_bytes >= s.len() {
        return s;
    }
    let mut start = s.len() - max_bytes;
    while start < s.len() && !s.is_char_boundary(start) {
        start += 1;
    }
    &s[start..]
}
