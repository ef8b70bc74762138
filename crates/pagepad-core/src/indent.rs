//! Indentation width detection.
//!
//! The editing model indents with spaces only, so detection only reports a
//! width; tab-indented files fall back to the default.

/// Width used when nothing better can be detected.
pub const DEFAULT_INDENTATION: usize = 4;

/// Number of lines sampled from the top of the text.
const SAMPLE_LINES: usize = 100;

/// Detects the indentation width of `text`.
///
/// Builds a histogram of indent deltas between consecutive non-blank lines
/// and picks the most frequent standard width (2, 4 or 8).
pub fn detect_indent_width(text: &str) -> usize {
    let mut deltas = [0usize; 9];
    let mut tab_lines = 0usize;
    let mut space_lines = 0usize;
    let mut prev: Option<usize> = None;

    for line in text.lines().take(SAMPLE_LINES) {
        if line.trim().is_empty() {
            continue;
        }
        if line.starts_with('\t') {
            tab_lines += 1;
            prev = None;
            continue;
        }
        let spaces = crate::text::leading_spaces(line);
        if spaces > 0 {
            space_lines += 1;
        }
        if let Some(prev) = prev {
            let delta = prev.abs_diff(spaces);
            if delta > 0 && delta < deltas.len() {
                deltas[delta] += 1;
            }
        }
        prev = Some(spaces);
    }

    if space_lines == 0 || tab_lines > space_lines {
        return DEFAULT_INDENTATION;
    }
    [2usize, 4, 8]
        .into_iter()
        .filter(|&w| deltas[w] > 0)
        .max_by_key(|&w| deltas[w])
        .unwrap_or(DEFAULT_INDENTATION)
}
