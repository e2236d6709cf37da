//! Logging helpers that keep item descriptions on a single line.
//! Display names come from the remote host and may carry control characters.

use crate::item::Item;

/// Single-line rendering of a host-supplied name, cut off after 120 characters.
pub fn escape_log(s: &str) -> String {
    const MAX_PREVIEW: usize = 120;
    let mut out = String::with_capacity(s.len().min(MAX_PREVIEW) + 8);
    for (count, ch) in s.chars().enumerate() {
        if count >= MAX_PREVIEW {
            out.push('…');
            break;
        }
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                use std::fmt::Write;
                let _ = write!(&mut out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

/// `empty` or `name#id x count (meta)` for log lines.
pub fn describe_item(item: Option<&Item>) -> String {
    match item {
        None => "empty".to_string(),
        Some(item) if item.metadata == 0 => {
            format!("{}#{} x{}", escape_log(&item.name), item.id, item.count)
        }
        Some(item) => format!(
            "{}#{} x{} (meta {})",
            escape_log(&item.name),
            item.id,
            item.count,
            item.metadata
        ),
    }
}
