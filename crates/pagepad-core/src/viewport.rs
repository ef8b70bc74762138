/// Scrollable window over a document.
use anyhow::Result;

use crate::document::Document;

/// Marker shown for lines whose chunk is still being decompressed.
pub const DEFAULT_PLACEHOLDER: &str = "…";

/// A `{start, size}` window over a [`Document`].
///
/// `start` is the absolute index of the first displayed line. Rows are
/// counted from it: row `r` shows document line `start + r`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewport {
    start: usize,
    size: usize,
    placeholder: String,
}

impl Viewport {
    /// Creates a viewport of `size` rows at the top of the document.
    ///
    /// # Errors
    ///
    /// Returns an error if `size` is zero.
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 {
            anyhow::bail!("viewport size must be greater than zero");
        }
        Ok(Self {
            start: 0,
            size,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        })
    }

    /// Replaces the placeholder shown while chunks load.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Absolute index of the last displayed line.
    pub fn end(&self, doc: &Document) -> usize {
        (self.start + self.size - 1).min(doc.last_index())
    }

    /// Last row that addresses real content.
    pub fn last_row(&self, doc: &Document) -> usize {
        self.end(doc).saturating_sub(self.start)
    }

    /// Absolute document line of viewport row `row`.
    pub fn absolute(&self, row: usize) -> usize {
        self.start + row
    }

    /// Viewport row showing document line `line`, if it is in the window.
    pub fn row_of(&self, line: usize) -> Option<usize> {
        line.checked_sub(self.start).filter(|row| *row < self.size)
    }

    /// Fails when the viewport could straddle more than two chunks.
    ///
    /// # Errors
    ///
    /// Returns an error in paged mode when `size >= chunk_size`.
    pub fn check_chunk_invariant(&self, doc: &Document) -> Result<()> {
        Self::check_size(self.size, doc)
    }

    fn check_size(size: usize, doc: &Document) -> Result<()> {
        if let Some(chunk_size) = doc.chunk_size() {
            if size >= chunk_size {
                anyhow::bail!(
                    "viewport size {size} must be smaller than the chunk size {chunk_size}"
                );
            }
        }
        Ok(())
    }

    fn clamp_start(start: isize, doc: &Document) -> usize {
        let max = doc.last_index();
        if start < 0 {
            tracing::debug!("Viewport start {start} clamped to 0");
            0
        } else if start as usize > max {
            tracing::debug!("Viewport start {start} clamped to {max}");
            max
        } else {
            start as usize
        }
    }

    /// Shifts the window by `delta` lines, clamped to `[0, last_index]`.
    /// Returns true when `start` changed.
    pub fn scroll(&mut self, doc: &Document, delta: isize) -> bool {
        let before = self.start;
        let target = (self.start as isize).saturating_add(delta);
        self.start = Self::clamp_start(target, doc);
        self.start != before
    }

    /// Scrolls the least amount that brings document line `line` into the
    /// window. Returns true when `start` changed.
    pub fn scroll_to(&mut self, doc: &Document, line: usize) -> bool {
        let bottom = self.start + self.size - 1;
        let delta = if line < self.start {
            line as isize - self.start as isize
        } else if line > bottom {
            (line - bottom) as isize
        } else {
            return false;
        };
        self.scroll(doc, delta)
    }

    /// Repositions and resizes the window.
    ///
    /// Returns true when the size changed, which calls for a full re-layout.
    ///
    /// # Errors
    ///
    /// Returns an error if `size` is zero or, in paged mode, not smaller than
    /// the chunk size. The viewport is left untouched on error.
    pub fn set(&mut self, doc: &Document, start: usize, size: usize) -> Result<bool> {
        if size == 0 {
            anyhow::bail!("viewport size must be greater than zero");
        }
        Self::check_size(size, doc)?;
        self.start = Self::clamp_start(start.min(isize::MAX as usize) as isize, doc);
        let resized = self.size != size;
        self.size = size;
        Ok(resized)
    }

    /// The visible lines. In paged mode these may be placeholders while the
    /// chunk window loads.
    pub fn lines(&self, doc: &Document) -> Vec<String> {
        doc.visible_lines(self.start, self.end(doc), &self.placeholder)
    }
}
