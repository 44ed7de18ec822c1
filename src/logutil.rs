//! Logging and display helpers for player-provided strings.
//! Custom item names are free text typed by players, so they are escaped
//! before reaching a log line.

/// Escape a string for single-line logging:
/// - `\n` => `\\n`
/// - `\r` => `\\r`
/// - `\t` => `\\t`
/// - backslash => `\\\\`
/// - Minecraft `§` formatting codes are kept verbatim
///
/// Names longer than `MAX_PREVIEW` characters are cut with an ellipsis.
pub fn escape_log(s: &str) -> String {
    const MAX_PREVIEW: usize = 64; // anvil names are capped well below this
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

/// Short label for an item type: the part after the namespace.
/// `minecraft:spider_eye` => `spider_eye`; un-namespaced ids pass through.
pub fn item_label(type_id: &str) -> &str {
    match type_id.split_once(':') {
        Some((_, name)) if !name.is_empty() => name,
        _ => type_id,
    }
}
