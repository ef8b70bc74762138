/// Cursor and selection state machine.
///
/// Edges are document positions. The head always stays inside the viewport:
/// movement that runs off the top or bottom of the visible window scrolls the
/// viewport instead of leaving it. The tail is the anchor and stays on its
/// document line wherever the window goes.
use crate::document::Document;
use crate::position::Position;
use crate::text::{char_len, slice_cols};
use crate::viewport::Viewport;
use crate::word::{next_word_boundary, prev_word_boundary};

/// Either a plain cursor or a selection with two inclusive edges.
///
/// `tail` is the anchor, `head` is the edge that moves. Both edges include
/// the char they point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caret {
    Cursor(Position),
    Selection { tail: Position, head: Position },
}

impl Default for Caret {
    fn default() -> Self {
        Self::Cursor(Position::default())
    }
}

/// The caret plus the sticky column used for vertical movement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub(crate) caret: Caret,
    /// Column the user last chose horizontally; vertical moves try to return
    /// to it.
    pub(crate) max_col: usize,
}

impl Selection {
    /// A cursor at (0, 0).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn caret(&self) -> Caret {
        self.caret
    }

    pub fn max_col(&self) -> usize {
        self.max_col
    }

    /// The moving edge. For a cursor this is the cursor itself.
    pub fn head(&self) -> Position {
        match self.caret {
            Caret::Cursor(pos) => pos,
            Caret::Selection { head, .. } => head,
        }
    }

    /// The anchored edge. For a cursor this is the cursor itself.
    pub fn tail(&self) -> Position {
        match self.caret {
            Caret::Cursor(pos) => pos,
            Caret::Selection { tail, .. } => tail,
        }
    }

    pub(crate) fn head_mut(&mut self) -> &mut Position {
        match &mut self.caret {
            Caret::Cursor(pos) => pos,
            Caret::Selection { head, .. } => head,
        }
    }

    pub fn is_selection(&self) -> bool {
        matches!(self.caret, Caret::Selection { .. })
    }

    /// True iff the tail comes strictly before the head.
    pub fn is_forward_selection(&self) -> bool {
        self.tail() < self.head()
    }

    /// `[tail, head]` if forward, `[head, tail]` otherwise.
    pub fn ordered(&self) -> [Position; 2] {
        let (tail, head) = (self.tail(), self.head());
        if tail < head {
            [tail, head]
        } else {
            [head, tail]
        }
    }

    /// Collapses a selection onto its head.
    pub fn make_cursor(&mut self) {
        self.caret = Caret::Cursor(self.head());
    }

    /// Starts a selection anchored at the current cursor.
    pub fn make_selection(&mut self) {
        let tail = self.tail();
        self.caret = Caret::Selection { tail, head: tail };
    }

    /// Replaces the caret with a plain cursor at `pos`.
    pub fn set_cursor(&mut self, pos: Position) {
        self.caret = Caret::Cursor(pos);
    }

    /// Moves the head to `(row, col)` and makes that column sticky.
    fn place_head(&mut self, row: usize, col: usize) {
        *self.head_mut() = Position::new(row, col);
        self.max_col = col;
    }

    /// Column to land on after a vertical move onto a line of length `len`.
    fn vertical_col(&self, len: usize, reference: usize) -> usize {
        if len >= reference {
            self.max_col.min(len)
        } else {
            reference.min(len)
        }
    }

    /// Pulls the head back into the viewport after the window moved without
    /// it. The anchor of a selection stays where it is.
    pub fn clamp_to_viewport(&mut self, doc: &Document, view: &Viewport) {
        let head = self.head();
        let row = head.row.clamp(view.start(), view.end(doc));
        if row == head.row {
            return;
        }
        let col = doc.line_len(row).map_or(0, |len| head.col.min(len));
        tracing::debug!("Head {head} left the viewport; moved to ({row}, {col})");
        *self.head_mut() = Position::new(row, col);
    }

    /// Places a cursor at a clicked viewport row and column, clamped to real
    /// content. Ignored while the clicked line is not loaded.
    pub fn click(&mut self, doc: &Document, view: &Viewport, row: usize, col: usize) {
        let line = view.absolute(row.min(view.last_row(doc)));
        let Some(len) = doc.line_len(line) else {
            return;
        };
        let col = col.min(len);
        self.set_cursor(Position::new(line, col));
        self.max_col = col;
    }

    /// Moves the head up (`delta < 0`) or down (`delta > 0`) one row per unit.
    ///
    /// Vertical moves stop at a line that is not loaded yet.
    pub fn move_row(&mut self, doc: &Document, view: &mut Viewport, delta: isize) {
        for _ in 0..delta.unsigned_abs() {
            if delta > 0 {
                self.move_down(doc, view);
            } else {
                self.move_up(doc, view);
            }
        }
    }

    fn move_down(&mut self, doc: &Document, view: &mut Viewport) {
        let head = self.head();
        if head.row >= doc.last_index() {
            return;
        }
        let row = head.row + 1;
        let Some(len) = doc.line_len(row) else {
            return;
        };
        if head.row >= view.end(doc) {
            view.scroll(doc, 1);
        }
        let col = self.vertical_col(len, self.tail().col);
        *self.head_mut() = Position::new(row, col);
    }

    fn move_up(&mut self, doc: &Document, view: &mut Viewport) {
        let head = self.head();
        if head.row == 0 {
            return;
        }
        let row = head.row - 1;
        let Some(len) = doc.line_len(row) else {
            return;
        };
        let col = if head.row <= view.start() {
            view.scroll(doc, -1);
            head.col.min(len)
        } else {
            self.vertical_col(len, head.col)
        };
        *self.head_mut() = Position::new(row, col);
    }

    /// Moves the head left (`delta < 0`) or right (`delta > 0`), wrapping
    /// across line boundaries and scrolling at the viewport edges.
    ///
    /// A selection cannot extend past the last char of a line, since its
    /// edges are inclusive.
    pub fn move_col(&mut self, doc: &Document, view: &mut Viewport, delta: isize) {
        for _ in 0..delta.unsigned_abs() {
            if delta > 0 {
                self.move_right(doc, view);
            } else {
                self.move_left(doc, view);
            }
        }
    }

    fn selection_trim(&self) -> usize {
        usize::from(self.is_selection())
    }

    /// Moves the head to the start of the next line, scrolling if it sits on
    /// the last visible row.
    fn wrap_forward(&mut self, doc: &Document, view: &mut Viewport) {
        let head = self.head();
        if head.row >= doc.last_index() {
            return;
        }
        if head.row >= view.end(doc) {
            view.scroll(doc, 1);
        }
        self.place_head(head.row + 1, 0);
    }

    /// Moves the head to the end of the previous line, less `trim`, scrolling
    /// if it sits on the first visible row.
    fn wrap_backward(&mut self, doc: &Document, view: &mut Viewport, trim: usize) {
        let head = self.head();
        if head.row == 0 {
            return;
        }
        let row = head.row - 1;
        let Some(len) = doc.line_len(row) else {
            return;
        };
        if head.row <= view.start() {
            view.scroll(doc, -1);
        }
        self.place_head(row, len.saturating_sub(trim));
    }

    fn move_right(&mut self, doc: &Document, view: &mut Viewport) {
        let head = self.head();
        let Some(len) = doc.line_len(head.row) else {
            return;
        };
        if head.col < len.saturating_sub(self.selection_trim()) {
            self.place_head(head.row, head.col + 1);
        } else {
            self.wrap_forward(doc, view);
        }
    }

    fn move_left(&mut self, doc: &Document, view: &mut Viewport) {
        let head = self.head();
        if head.col > 0 {
            self.place_head(head.row, head.col - 1);
        } else {
            self.wrap_backward(doc, view, self.selection_trim());
        }
    }

    /// Smart home: jumps to the first non-space char, or to column 0 when
    /// already at or before it.
    pub fn move_cursor_start_of_line(&mut self, doc: &Document) {
        let head = self.head();
        let Some(line) = doc.line(head.row) else {
            return;
        };
        let first = line.chars().position(|c| c != ' ').unwrap_or(0);
        let col = if first < self.tail().col { first } else { 0 };
        self.place_head(head.row, col);
    }

    pub fn move_cursor_end_of_line(&mut self, doc: &Document) {
        let head = self.head();
        if let Some(len) = doc.line_len(head.row) {
            self.place_head(head.row, len);
        }
    }

    /// Moves the head forward by one word; at line end, to the start of the
    /// next line.
    pub fn move_word(&mut self, doc: &Document, view: &mut Viewport) {
        let head = self.head();
        let Some(line) = doc.line(head.row) else {
            return;
        };
        if head.col < char_len(&line) {
            self.place_head(head.row, next_word_boundary(&line, head.col));
        } else {
            self.wrap_forward(doc, view);
        }
    }

    /// Moves the head back by one word; at column 0, to the end of the
    /// previous line.
    pub fn move_back_word(&mut self, doc: &Document, view: &mut Viewport) {
        let head = self.head();
        if head.col == 0 {
            return self.wrap_backward(doc, view, 0);
        }
        if let Some(line) = doc.line(head.row) {
            self.place_head(head.row, prev_word_boundary(&line, head.col));
        }
    }

    /// Text covered by the selection, one entry per line, edges included.
    ///
    /// A plain cursor yields the single char under it (or `""` at line end).
    /// Returns `None` when a covered line is not loaded.
    pub fn selected_lines(&self, doc: &Document) -> Option<Vec<String>> {
        let [first, second] = self.ordered();
        if first.row == second.row {
            let line = doc.line(first.row)?;
            return Some(vec![slice_cols(&line, first.col, second.col + 1).to_string()]);
        }
        let mut out = Vec::with_capacity(second.row - first.row + 1);
        let line = doc.line(first.row)?;
        out.push(slice_cols(&line, first.col, usize::MAX).to_string());
        for row in first.row + 1..second.row {
            out.push(doc.line(row)?.into_owned());
        }
        let line = doc.line(second.row)?;
        out.push(slice_cols(&line, 0, second.col + 1).to_string());
        Some(out)
    }
}
