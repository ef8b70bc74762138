//! Text mutations driven by the current caret.
//!
//! Every operation here leaves the caret as a plain cursor (except
//! indent/unindent, which keep a selection selected) and scrolls the
//! viewport when the cursor lands outside it. In paged mode the document
//! refuses writes, so each operation logs a warning and leaves both document
//! and caret untouched.

use std::borrow::Cow;

use crate::document::Document;
use crate::position::Position;
use crate::selection::{Caret, Selection};
use crate::text::{char_len, leading_spaces, slice_cols, split_at_col};
use crate::viewport::Viewport;

/// A line split at a position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinePartition {
    /// Absolute document line.
    pub index: usize,
    /// Chars before the position.
    pub left: String,
    /// Chars from the position on.
    pub right: String,
    /// Chars after the position, i.e. `right` without its first char.
    pub right_exclusive: String,
}

fn refuse_read_only(doc: &Document, op: &str) -> bool {
    if doc.is_editable() {
        return false;
    }
    tracing::warn!("{op} ignored: document is paged and read-only");
    true
}

impl Selection {
    /// Splits the line under `pos` into the parts around it.
    pub fn partition_line(doc: &Document, pos: Position) -> LinePartition {
        let line = doc.line(pos.row).unwrap_or_default();
        let (left, right) = split_at_col(&line, pos.col);
        LinePartition {
            index: pos.row,
            left: left.to_string(),
            right: right.to_string(),
            right_exclusive: slice_cols(&line, pos.col + 1, usize::MAX).to_string(),
        }
    }

    /// Types `text` at the cursor, replacing the selection if there is one.
    ///
    /// Text containing line breaks goes through [`Selection::insert_lines`].
    pub fn insert(&mut self, doc: &mut Document, view: &mut Viewport, text: &str) {
        if text.contains('\n') {
            let lines: Vec<String> = text.split('\n').map(str::to_owned).collect();
            return self.insert_lines(doc, view, &lines);
        }
        if refuse_read_only(doc, "insert") {
            return;
        }
        let typed = char_len(text);
        match self.caret {
            Caret::Selection { .. } => {
                let [first, second] = self.ordered();
                let start = Self::partition_line(doc, first);
                let end = Self::partition_line(doc, second);
                let merged = format!("{}{text}{}", start.left, end.right_exclusive);
                doc.splice(first.row, second.row - first.row + 1, vec![merged]);
                let col = char_len(&start.left) + typed;
                self.set_cursor(Position::new(first.row, col));
                self.max_col = col;
                view.scroll_to(doc, first.row);
            }
            Caret::Cursor(pos) => {
                let part = Self::partition_line(doc, pos);
                let col = char_len(&part.left) + typed;
                if doc.set_line(part.index, format!("{}{text}{}", part.left, part.right)) {
                    self.set_cursor(Position::new(pos.row, col));
                    self.max_col = col;
                }
            }
        }
    }

    /// Pastes several lines at once, replacing the selection if there is one.
    ///
    /// The first line joins the text before the caret, the last joins the
    /// text after it. The cursor ends after the last pasted line, scrolling
    /// the viewport if that line is below it.
    pub fn insert_lines(&mut self, doc: &mut Document, view: &mut Viewport, lines: &[String]) {
        let (first_line, last_line) = match lines {
            [] => return,
            [single] => return self.insert(doc, view, single),
            [first_line, .., last_line] => (first_line, last_line),
        };
        if refuse_read_only(doc, "insert_lines") {
            return;
        }
        let [first, second] = self.ordered();
        let start = Self::partition_line(doc, first);
        let end = Self::partition_line(doc, second);
        let trailing = if self.is_selection() {
            end.right_exclusive
        } else {
            end.right
        };

        let mut replacement = Vec::with_capacity(lines.len());
        replacement.push(format!("{}{first_line}", start.left));
        replacement.extend(lines[1..lines.len() - 1].iter().cloned());
        replacement.push(format!("{last_line}{trailing}"));
        doc.splice(first.row, second.row - first.row + 1, replacement);

        let row = first.row + lines.len() - 1;
        let col = char_len(last_line);
        self.set_cursor(Position::new(row, col));
        self.max_col = col;
        view.scroll_to(doc, row);
    }

    /// Backspace: removes the selection, the char before the cursor, or the
    /// line break before the cursor's line.
    pub fn delete(&mut self, doc: &mut Document, view: &mut Viewport) {
        if self.is_selection() {
            return self.insert(doc, view, "");
        }
        if refuse_read_only(doc, "delete") {
            return;
        }
        let pos = self.head();
        let part = Self::partition_line(doc, pos);
        let left_len = char_len(&part.left);

        let target = if left_len > 0 {
            let mut left = part.left;
            left.pop();
            doc.set_line(pos.row, left + &part.right);
            Position::new(pos.row, left_len - 1)
        } else if pos.row > 0 {
            let prev = pos.row - 1;
            let joined = doc.line(prev).unwrap_or_default().into_owned();
            let join = char_len(&joined);
            doc.set_line(prev, joined + &part.right);
            doc.remove_line(pos.row);
            Position::new(prev, join)
        } else {
            return;
        };
        self.set_cursor(target);
        self.max_col = target.col;
        view.scroll_to(doc, target.row);
    }

    /// Enter: splits the line at the cursor, replacing the selection first.
    pub fn new_line(&mut self, doc: &mut Document, view: &mut Viewport) {
        if refuse_read_only(doc, "new_line") {
            return;
        }
        if self.is_selection() {
            self.insert(doc, view, "");
        }
        let pos = self.head();
        let part = Self::partition_line(doc, pos);
        doc.splice(pos.row, 1, vec![part.left, part.right]);
        self.set_cursor(Position::new(pos.row + 1, 0));
        self.max_col = 0;
        view.scroll_to(doc, pos.row + 1);
    }

    /// Prefixes every selected line with `width` spaces. Needs a selection.
    pub fn indent(&mut self, doc: &mut Document, width: usize) {
        let Caret::Selection { .. } = self.caret else {
            return;
        };
        if refuse_read_only(doc, "indent") {
            return;
        }
        let [first, second] = self.ordered();
        let pad = " ".repeat(width);
        for row in first.row..=second.row {
            if let Some(line) = doc.line(row).map(Cow::into_owned) {
                doc.set_line(row, format!("{pad}{line}"));
            }
        }
        if let Caret::Selection { tail, head } = &mut self.caret {
            tail.col += width;
            head.col += width;
        }
    }

    /// Removes indentation from every line the caret touches.
    ///
    /// Lines strictly between the edges lose up to `width` leading spaces.
    /// An edge line loses only the spaces bracketing its edge column, up to
    /// `width`, and never more than its leading spaces.
    pub fn unindent(&mut self, doc: &mut Document, width: usize) {
        if refuse_read_only(doc, "unindent") {
            return;
        }
        let [mut first, mut second] = self.ordered();
        let forward = self.is_forward_selection();

        for row in first.row..=second.row {
            let Some(line) = doc.line(row).map(Cow::into_owned) else {
                continue;
            };
            let removed = if row == first.row {
                let (removed, col) = unindent_edge(&line, first.col, width);
                if first.row == second.row {
                    second.col = second.col.saturating_sub(removed).max(col);
                }
                first.col = col;
                removed
            } else if row == second.row {
                let (removed, col) = unindent_edge(&line, second.col, width);
                second.col = col;
                removed
            } else {
                width.min(leading_spaces(&line))
            };
            if removed > 0 {
                doc.set_line(row, slice_cols(&line, removed, usize::MAX).to_string());
            }
        }

        self.caret = match self.caret {
            Caret::Cursor(_) => Caret::Cursor(first),
            Caret::Selection { .. } if forward => Caret::Selection {
                tail: first,
                head: second,
            },
            Caret::Selection { .. } => Caret::Selection {
                tail: second,
                head: first,
            },
        };
    }
}

/// Spaces to strip from an edge line whose edge sits at `col`, and the
/// column the edge moves to.
///
/// Counts the leading spaces left of `col` plus the space run starting at
/// `col`. The edge moves back by whatever part of the removal exceeds the
/// run starting at `col`.
fn unindent_edge(line: &str, col: usize, width: usize) -> (usize, usize) {
    let chars: Vec<char> = line.chars().collect();
    let col = col.min(chars.len());
    let left = chars[..col].iter().take_while(|c| **c == ' ').count();
    let from = chars[col..].iter().take_while(|c| **c == ' ').count();
    let removed = width.min(left + from).min(leading_spaces(line));
    let moved = removed.saturating_sub(from);
    (removed, col - moved.min(col))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(text: &str, size: usize) -> (Document, Viewport, Selection) {
        (
            Document::from(text),
            Viewport::new(size).unwrap(),
            Selection::new(),
        )
    }

    fn lines(doc: &Document) -> Vec<String> {
        doc.lines().unwrap().to_vec()
    }

    #[test]
    fn test_partition_line() {
        let doc = Document::from("Hello");
        let part = Selection::partition_line(&doc, Position::new(0, 2));
        assert_eq!(part.index, 0);
        assert_eq!(part.left, "He");
        assert_eq!(part.right, "llo");
        assert_eq!(part.right_exclusive, "lo");
    }

    #[test]
    fn test_insert_at_cursor() {
        let (mut doc, mut view, mut sel) = setup("Hllo", 5);
        sel.move_col(&doc, &mut view, 1);
        sel.insert(&mut doc, &mut view, "e");
        assert_eq!(lines(&doc), vec!["Hello"]);
        assert_eq!(sel.head(), Position::new(0, 2));
        assert_eq!(sel.max_col(), 2);
    }

    #[test]
    fn test_backspace() {
        let (mut doc, mut view, mut sel) = setup("Hello", 5);
        sel.move_cursor_end_of_line(&doc);
        sel.delete(&mut doc, &mut view);
        assert_eq!(lines(&doc), vec!["Hell"]);
        assert_eq!(sel.caret(), Caret::Cursor(Position::new(0, 4)));
    }

    #[test]
    fn test_backspace_at_document_start_is_noop() {
        let (mut doc, mut view, mut sel) = setup("Hello", 5);
        sel.delete(&mut doc, &mut view);
        assert_eq!(lines(&doc), vec!["Hello"]);
        assert_eq!(sel.head(), Position::new(0, 0));
    }

    #[test]
    fn test_enter_then_backspace_restores() {
        let (mut doc, mut view, mut sel) = setup("Hello", 5);
        sel.move_cursor_end_of_line(&doc);
        sel.new_line(&mut doc, &mut view);
        assert_eq!(lines(&doc), vec!["Hello", ""]);
        assert_eq!(sel.head(), Position::new(1, 0));
        sel.delete(&mut doc, &mut view);
        assert_eq!(lines(&doc), vec!["Hello"]);
        assert_eq!(sel.head(), Position::new(0, 5));
    }

    #[test]
    fn test_enter_splits_line() {
        let (mut doc, mut view, mut sel) = setup("HelloWorld", 5);
        sel.move_col(&doc, &mut view, 5);
        sel.new_line(&mut doc, &mut view);
        assert_eq!(lines(&doc), vec!["Hello", "World"]);
    }

    #[test]
    fn test_insert_then_delete_restores() {
        let (mut doc, mut view, mut sel) = setup("ab", 5);
        sel.move_col(&doc, &mut view, 1);
        sel.insert(&mut doc, &mut view, "xyz");
        assert_eq!(lines(&doc), vec!["axyzb"]);
        for _ in 0..3 {
            sel.delete(&mut doc, &mut view);
        }
        assert_eq!(lines(&doc), vec!["ab"]);
        assert_eq!(sel.head(), Position::new(0, 1));
    }

    #[test]
    fn test_insert_with_line_break_splits_lines() {
        let (mut doc, mut view, mut sel) = setup("ab", 5);
        sel.move_col(&doc, &mut view, 1);
        sel.insert(&mut doc, &mut view, "x\ny");
        assert_eq!(lines(&doc), vec!["ax", "yb"]);
        assert_eq!(sel.caret(), Caret::Cursor(Position::new(1, 1)));
    }

    #[test]
    fn test_type_over_selection() {
        let (mut doc, mut view, mut sel) = setup("Hello World", 5);
        sel.make_selection();
        sel.move_col(&doc, &mut view, 5);
        assert_eq!(sel.selected_lines(&doc).unwrap(), vec!["Hello "]);
        sel.insert(&mut doc, &mut view, "X");
        assert_eq!(lines(&doc), vec!["XWorld"]);
        assert_eq!(sel.caret(), Caret::Cursor(Position::new(0, 1)));
    }

    #[test]
    fn test_delete_multi_line_selection() {
        let (mut doc, mut view, mut sel) = setup("abc\ndef\nghi", 5);
        sel.move_col(&doc, &mut view, 1);
        sel.make_selection();
        sel.move_row(&doc, &mut view, 2);
        sel.delete(&mut doc, &mut view);
        assert_eq!(lines(&doc), vec!["ai"]);
        assert_eq!(sel.caret(), Caret::Cursor(Position::new(0, 1)));
    }

    #[test]
    fn test_delete_at_viewport_top_scrolls() {
        let (mut doc, mut view, mut sel) = setup("one\ntwo\nthree", 2);
        view.scroll(&doc, 1);
        sel.set_cursor(Position::new(1, 0));
        sel.delete(&mut doc, &mut view);
        assert_eq!(lines(&doc), vec!["onetwo", "three"]);
        assert_eq!(view.start(), 0);
        assert_eq!(sel.head(), Position::new(0, 3));
    }

    #[test]
    fn test_new_line_at_bottom_scrolls() {
        let (mut doc, mut view, mut sel) = setup("a\nb", 2);
        sel.move_row(&doc, &mut view, 1);
        sel.move_cursor_end_of_line(&doc);
        sel.new_line(&mut doc, &mut view);
        assert_eq!(lines(&doc), vec!["a", "b", ""]);
        assert_eq!(view.start(), 1);
        assert_eq!(sel.head(), Position::new(2, 0));
        assert_eq!(view.row_of(2), Some(1));
    }

    #[test]
    fn test_insert_lines_at_cursor() {
        let (mut doc, mut view, mut sel) = setup("startend\nnext", 5);
        sel.move_col(&doc, &mut view, 5);
        let pasted = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        sel.insert_lines(&mut doc, &mut view, &pasted);
        assert_eq!(lines(&doc), vec!["startA", "B", "Cend", "next"]);
        assert_eq!(sel.head(), Position::new(2, 1));
    }

    #[test]
    fn test_insert_lines_over_selection() {
        let (mut doc, mut view, mut sel) = setup("abc\ndef\nghi", 5);
        sel.move_col(&doc, &mut view, 1);
        sel.make_selection();
        sel.move_row(&doc, &mut view, 1);
        let pasted = vec!["1".to_string(), "2".to_string()];
        sel.insert_lines(&mut doc, &mut view, &pasted);
        assert_eq!(lines(&doc), vec!["a1", "2f", "ghi"]);
        assert_eq!(sel.caret(), Caret::Cursor(Position::new(1, 1)));
    }

    #[test]
    fn test_insert_lines_scrolls_past_bottom() {
        let (mut doc, mut view, mut sel) = setup("x", 2);
        let pasted: Vec<String> = (0..4).map(|i| i.to_string()).collect();
        sel.insert_lines(&mut doc, &mut view, &pasted);
        assert_eq!(doc.line_count(), 4);
        assert_eq!(view.start(), 2);
        assert_eq!(sel.head(), Position::new(3, 1));
        assert_eq!(doc.line(3).as_deref(), Some("3x"));
    }

    #[test]
    fn test_indent_requires_selection() {
        let (mut doc, _, mut sel) = setup("a", 5);
        sel.indent(&mut doc, 4);
        assert_eq!(lines(&doc), vec!["a"]);
    }

    #[test]
    fn test_indent_and_unindent_selection() {
        let (mut doc, mut view, mut sel) = setup("one\ntwo\nthree", 5);
        sel.make_selection();
        sel.move_row(&doc, &mut view, 2);
        sel.move_col(&doc, &mut view, 1);
        sel.indent(&mut doc, 4);
        assert_eq!(lines(&doc), vec!["    one", "    two", "    three"]);
        assert_eq!(sel.tail(), Position::new(0, 4));
        assert_eq!(sel.head(), Position::new(2, 5));

        sel.unindent(&mut doc, 4);
        assert_eq!(lines(&doc), vec!["one", "two", "three"]);
        assert_eq!(sel.tail(), Position::new(0, 0));
        assert_eq!(sel.head(), Position::new(2, 1));
    }

    #[test]
    fn test_unindent_cursor_clamps_to_leading_spaces() {
        let (mut doc, mut view, mut sel) = setup("  ab", 5);
        sel.move_col(&doc, &mut view, 3);
        sel.unindent(&mut doc, 4);
        assert_eq!(lines(&doc), vec!["ab"]);
        assert_eq!(sel.caret(), Caret::Cursor(Position::new(0, 1)));
    }

    #[test]
    fn test_unindent_single_row_selection() {
        let (mut doc, mut view, mut sel) = setup("    abc", 5);
        sel.move_col(&doc, &mut view, 3);
        sel.make_selection();
        sel.move_col(&doc, &mut view, 2);
        sel.unindent(&mut doc, 2);
        assert_eq!(lines(&doc), vec!["  abc"]);
        assert_eq!(sel.tail(), Position::new(0, 2));
        assert_eq!(sel.head(), Position::new(0, 3));
    }

    #[test]
    fn test_unindent_edge_counts_spaces_around_column() {
        assert_eq!(unindent_edge("    x", 1, 4), (4, 0));
        assert_eq!(unindent_edge("    x", 3, 2), (2, 2));
        assert_eq!(unindent_edge("  x  y", 4, 4), (2, 3));
        assert_eq!(unindent_edge("x   ", 2, 4), (0, 2));
    }

    #[test]
    fn test_unindent_without_leading_spaces_is_noop() {
        let (mut doc, mut view, mut sel) = setup("a  b", 5);
        sel.move_col(&doc, &mut view, 2);
        sel.unindent(&mut doc, 4);
        assert_eq!(lines(&doc), vec!["a  b"]);
        assert_eq!(sel.head(), Position::new(0, 2));
    }

    #[test]
    fn test_unindent_middle_line_uses_real_leading_spaces() {
        let (mut doc, mut view, mut sel) = setup("    a\n  b\n    c", 5);
        sel.make_selection();
        sel.move_row(&doc, &mut view, 2);
        sel.unindent(&mut doc, 4);
        assert_eq!(lines(&doc), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_paged_mutations_are_ignored() {
        let (mut doc, mut view, mut sel) = setup("abc\ndef", 1);
        doc.activate_chunk_mode(4).await.unwrap();
        view.lines(&doc);
        doc.wait_for_window().await;

        sel.move_col(&doc, &mut view, 1);
        sel.insert(&mut doc, &mut view, "X");
        sel.delete(&mut doc, &mut view);
        sel.new_line(&mut doc, &mut view);
        assert_eq!(sel.head(), Position::new(0, 1));
        assert_eq!(doc.line(0).as_deref(), Some("abc"));
        assert_eq!(doc.line_count(), 2);
    }
}
