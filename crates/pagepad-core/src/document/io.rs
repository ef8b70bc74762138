//! Loading documents from disk.
//!
//! Handles encoding and line-ending detection, indentation detection, and
//! optionally moving large files straight into chunk mode.

use std::path::Path;

use anyhow::{Context, Result};

use crate::encoding::decode_text;
use crate::indent::detect_indent_width;

use super::Document;

impl Document {
    /// Opens a document from a file path in flat mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or decoded.
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read file: {}", path.display()))?;
        let decoded = decode_text(&bytes)
            .with_context(|| format!("failed to decode file: {}", path.display()))?;

        let mut doc = Self::new();
        doc.set_text(&decoded.text);
        doc.encoding = decoded.encoding;
        doc.line_ending = decoded.line_ending;
        doc.indentation = detect_indent_width(&decoded.text);
        doc.file_path = Some(path.to_path_buf());
        doc.title = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Untitled".to_string());

        tracing::debug!(
            "Opened {} ({} lines, {} bytes, {}, {})",
            path.display(),
            doc.line_count(),
            doc.byte_count(),
            doc.encoding,
            doc.line_ending
        );
        Ok(doc)
    }

    /// Opens a document and pages it when it has more than
    /// `paging_threshold` lines, or whenever `force_paging` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or decoded, or chunk mode
    /// cannot be activated.
    pub async fn open_paged(
        path: &Path,
        chunk_size: usize,
        paging_threshold: usize,
        force_paging: bool,
    ) -> Result<Self> {
        let mut doc = Self::open(path)?;
        if force_paging || doc.line_count() > paging_threshold {
            doc.activate_chunk_mode(chunk_size)
                .await
                .with_context(|| format!("failed to page file: {}", path.display()))?;
        }
        Ok(doc)
    }
}
