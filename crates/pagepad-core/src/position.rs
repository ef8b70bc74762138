//! Text positions.

/// A place in the document: `row` is the document line, `col` is a char
/// offset within that line.
///
/// Positions do not move when the viewport scrolls. Use
/// [`Viewport::row_of`](crate::viewport::Viewport::row_of) to find the
/// visible row of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Position {
    /// 0-indexed document line.
    pub row: usize,
    /// 0-indexed column (char offset). One past the last char is valid.
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.row.cmp(&other.row).then(self.col.cmp(&other.col))
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
