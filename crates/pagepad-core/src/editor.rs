/// The editor facade tying a document to a viewport and a selection.
use anyhow::{Context, Result};

use crate::document::{ChunkStatus, Document};
use crate::encoding::{LineEnding, TextEncoding};
use crate::selection::Selection;
use crate::viewport::Viewport;

/// One editing session over one document.
#[derive(Debug)]
pub struct Editor {
    pub(crate) document: Document,
    pub(crate) viewport: Viewport,
    pub(crate) selection: Selection,
    /// Spaces inserted by Tab and removed by Shift+Tab.
    pub(crate) indentation: usize,
}

impl Editor {
    /// Wraps `document` with a cursor at the top of `viewport`.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is paged and the viewport is not
    /// smaller than its chunk size.
    pub fn new(document: Document, viewport: Viewport) -> Result<Self> {
        viewport.check_chunk_invariant(&document)?;
        Ok(Self {
            indentation: document.indentation,
            document,
            viewport,
            selection: Selection::new(),
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn indentation(&self) -> usize {
        self.indentation
    }

    pub fn set_indentation(&mut self, width: usize) {
        self.indentation = width.max(1);
    }

    /// Moves the document into chunked storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the viewport is not smaller than `chunk_size`, or
    /// if the document cannot be paged.
    pub async fn activate_chunk_mode(&mut self, chunk_size: usize) -> Result<()> {
        if self.viewport.size() >= chunk_size {
            anyhow::bail!(
                "viewport size {} must be smaller than the chunk size {chunk_size}",
                self.viewport.size()
            );
        }
        self.document
            .activate_chunk_mode(chunk_size)
            .await
            .context("failed to activate chunk mode")
    }

    /// Repositions and resizes the viewport, then pulls the head into it.
    /// See [`Viewport::set`].
    pub fn set_viewport(&mut self, start: usize, size: usize) -> Result<bool> {
        let resized = self.viewport.set(&self.document, start, size)?;
        self.selection.clamp_to_viewport(&self.document, &self.viewport);
        Ok(resized)
    }

    /// The visible lines, possibly placeholders while chunks load.
    pub fn lines(&self) -> Vec<String> {
        self.viewport.lines(&self.document)
    }

    /// Requests the visible window and waits until no chunk load is pending.
    pub async fn settle(&self) {
        self.lines();
        self.document.wait_for_window().await;
    }

    /// The selected text joined with `\n`.
    ///
    /// `None` for a plain cursor, or in paged mode when part of the selection
    /// is not loaded.
    pub fn copy(&self) -> Option<String> {
        if !self.selection.is_selection() {
            return None;
        }
        let Some(lines) = self.selection.selected_lines(&self.document) else {
            tracing::warn!("Copy skipped: the selection spans lines that are not loaded");
            return None;
        };
        Some(lines.join("\n"))
    }

    /// Pastes `text`, splitting it into lines on `\n`.
    pub fn paste(&mut self, text: &str) {
        let lines: Vec<String> = text.split('\n').map(str::to_string).collect();
        self.selection
            .insert_lines(&mut self.document, &mut self.viewport, &lines);
    }

    pub fn status(&self) -> StatusLine {
        let head = self.selection.head();
        StatusLine {
            line: head.row + 1,
            column: head.col + 1,
            line_count: self.document.line_count(),
            original_line_count: self.document.original_line_count(),
            byte_count: self.document.byte_count(),
            indentation: self.indentation,
            encoding: self.document.encoding,
            line_ending: self.document.line_ending,
            chunk: self.document.chunk_store().map(|store| store.status()),
        }
    }
}

/// Snapshot of the information shown in a status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    /// 1-based document line of the head.
    pub line: usize,
    /// 1-based column of the head.
    pub column: usize,
    pub line_count: usize,
    pub original_line_count: usize,
    pub byte_count: usize,
    pub indentation: usize,
    pub encoding: TextEncoding,
    pub line_ending: LineEnding,
    /// Window state, in paged mode.
    pub chunk: Option<ChunkStatus>,
}

impl std::fmt::Display for StatusLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Ln {}, Col {} | {}L, originally: {}L {} bytes | Spaces: {} | {} | {}",
            self.line,
            self.column,
            self.line_count,
            self.original_line_count,
            self.byte_count,
            self.indentation,
            self.encoding,
            self.line_ending
        )?;
        if let Some(chunk) = self.chunk {
            write!(f, " | {chunk}")?;
        }
        Ok(())
    }
}
