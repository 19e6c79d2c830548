//! Text helpers for conformance files
//!
//! Everything here is a pure function over a single line or a whole
//! buffer. None of these helpers fail: odd input yields an empty or
//! unchanged result.

use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

/// Prefix shared by every directive label
pub const DIRECTIVE_SENTINEL: &str = "#.";

fn whitespace_run() -> &'static Regex {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern is valid"))
}

/// Split a document into lines on `\n` or `\r\n`.
///
/// A trailing terminator produces a trailing empty line, and an empty
/// document is a single empty line.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

/// Drop everything from the first `marker` on and trim the rest.
///
/// A line that starts with `marker` is a comment in its entirety.
pub fn strip_comment<'a>(line: &'a str, marker: &str) -> &'a str {
    if marker.is_empty() {
        return line.trim();
    }
    if line.starts_with(marker) {
        return "";
    }
    match line.find(marker) {
        Some(idx) => line[..idx].trim(),
        None => line.trim(),
    }
}

/// Collapse each run of whitespace (tabs included) into a single space.
/// Leading and trailing whitespace is collapsed, not removed.
pub fn normalize_whitespace(line: &str) -> Cow<'_, str> {
    whitespace_run().replace_all(line, " ")
}

/// True if the first character is unchanged by upper-casing it.
pub fn starts_with_uppercase(text: &str) -> bool {
    match text.chars().next() {
        Some(first) => first.to_uppercase().eq(std::iter::once(first)),
        None => false,
    }
}

/// True if the first character is unchanged by lower-casing it.
pub fn starts_with_lowercase(text: &str) -> bool {
    match text.chars().next() {
        Some(first) => first.to_lowercase().eq(std::iter::once(first)),
        None => false,
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '.' || c == '_'
}

/// Word under the cursor at char `index`.
///
/// Words are runs of alphanumerics, `.` and `_`. A `#` directly in front
/// of a `.` belongs to the word, so directive labels like `#.REGISTER`
/// come back whole.
pub fn extract_word_at(line: &str, index: usize) -> &str {
    word_at(line, index).map(|(_, word)| word).unwrap_or("")
}

/// Like [`extract_word_at`], also returning the word's byte offset in `line`.
pub fn word_at(line: &str, index: usize) -> Option<(usize, &str)> {
    let chars: Vec<(usize, char)> = line.char_indices().collect();
    if index >= chars.len() {
        return None;
    }

    let mut start = index;
    let mut end = index;

    match chars[index].1 {
        '#' => match chars.get(index + 1) {
            Some((_, '.')) => end = index + 1,
            _ => return None,
        },
        c if !is_word_char(c) => return None,
        _ => {}
    }

    while start > 0 && is_word_char(chars[start - 1].1) {
        start -= 1;
    }
    if start > 0 && chars[start - 1].1 == '#' && chars[start].1 == '.' {
        start -= 1;
    }
    while end + 1 < chars.len() && is_word_char(chars[end + 1].1) {
        end += 1;
    }

    let byte_start = chars[start].0;
    let byte_end = chars[end].0 + chars[end].1.len_utf8();
    Some((byte_start, &line[byte_start..byte_end]))
}

/// Length of `text` in UTF-16 code units, the LSP column unit.
pub fn utf16_len(text: &str) -> u32 {
    text.encode_utf16().count() as u32
}

/// Convert a UTF-16 column on `line` into a char index.
///
/// Columns past the end map to the char count of the line.
pub fn utf16_to_char_index(line: &str, column: u32) -> usize {
    let mut units = 0u32;
    for (idx, c) in line.chars().enumerate() {
        if units >= column {
            return idx;
        }
        units += c.len_utf16() as u32;
    }
    line.chars().count()
}
