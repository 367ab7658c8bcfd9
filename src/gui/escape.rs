//! Escaping file paths for the core's command-line parser.
//!
//! Dropped files are opened with an `:edit`-style command on the core side,
//! so characters that command parser treats specially must be backslash
//! escaped first.

use std::path::Path;

/// Characters with a special meaning in an editor command argument.
const COMMAND_SPECIAL_CHARS: &[char] = &[
    ' ', '\t', '\n', // Word separators
    '*', '?', '[', '{', '`', '$', // Wildcards and expansion
    '\\', // Escape
    '%', '#', // Current/alternate file
    '\'', '"', '|', '!', '<', // Quotes, command separator, bang, special keys
];

/// Escape one path.
///
/// A leading `+` or `>` and a path that is exactly `-` are also escaped so
/// they are not read as command modifiers.
pub fn escape_path(path: &Path) -> String {
    let text = path.to_string_lossy();
    if text == "-" {
        return "\\-".to_string();
    }

    let mut result = String::with_capacity(text.len() * 2);
    if text.starts_with('+') || text.starts_with('>') {
        result.push('\\');
    }
    for c in text.chars() {
        if COMMAND_SPECIAL_CHARS.contains(&c) {
            result.push('\\');
        }
        result.push(c);
    }
    result
}

/// Escape every path, preserving order.
pub fn escape_paths<P: AsRef<Path>>(paths: &[P]) -> Vec<String> {
    paths.iter().map(|p| escape_path(p.as_ref())).collect()
}
