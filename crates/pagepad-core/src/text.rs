//! Char-offset helpers for single lines.
//!
//! Columns throughout the crate are char offsets, not byte offsets. These
//! helpers translate and clamp so that a column past the end of a line never
//! panics.

/// Returns the length of `line` in chars.
pub fn char_len(line: &str) -> usize {
    line.chars().count()
}

/// Returns the byte offset of char column `col`, clamped to the line length.
pub fn byte_offset(line: &str, col: usize) -> usize {
    line.char_indices()
        .nth(col)
        .map(|(idx, _)| idx)
        .unwrap_or(line.len())
}

/// Splits `line` at char column `col` (clamped).
pub fn split_at_col(line: &str, col: usize) -> (&str, &str) {
    line.split_at(byte_offset(line, col))
}

/// Returns the chars in `[from, to)`, both clamped to the line.
pub fn slice_cols(line: &str, from: usize, to: usize) -> &str {
    let start = byte_offset(line, from);
    let end = byte_offset(line, to).max(start);
    &line[start..end]
}

/// Counts the leading `' '` characters of `line`.
pub fn leading_spaces(line: &str) -> usize {
    line.chars().take_while(|c| *c == ' ').count()
}
