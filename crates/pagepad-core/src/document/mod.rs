//! Document storage.
//!
//! A `Document` owns the line content in one of two modes. Flat mode keeps
//! every line resident in a `Vec<String>` and supports editing. Paged mode
//! keeps lines in gzip-compressed chunks (see [`ChunkStore`]) with only a
//! small decompressed window resident; it is read/navigate-only, and every
//! mutation attempted on it is logged and ignored.
//!
//! File loading lives in the `io` submodule.

mod chunks;
mod codec;
mod io;

use std::borrow::Cow;
use std::path::PathBuf;

use anyhow::Result;
use tokio::sync::watch;

use crate::encoding::{normalize_line_endings, LineEnding, TextEncoding};
use crate::indent::DEFAULT_INDENTATION;

pub use chunks::{ChunkStatus, ChunkStore};
pub use codec::{compress_lines, decompress_lines};

/// Backing storage of a document.
#[derive(Debug)]
enum Storage {
    Flat(Vec<String>),
    Paged(ChunkStore),
}

/// Line content plus load-time metadata.
pub struct Document {
    storage: Storage,
    /// UTF-8 size of the text the document was loaded from.
    byte_count: usize,
    /// Number of lines at load time.
    original_line_count: usize,
    /// The encoding the file was decoded from.
    pub encoding: TextEncoding,
    /// The line ending style detected on load.
    pub line_ending: LineEnding,
    /// Indentation width detected on load.
    pub indentation: usize,
    /// File path on disk, if any.
    pub file_path: Option<PathBuf>,
    /// Display name.
    pub title: String,
    /// Bumped on every content change so renderers can skip unchanged frames.
    pub content_version: u64,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("storage", &self.storage)
            .field("byte_count", &self.byte_count)
            .field("original_line_count", &self.original_line_count)
            .field("file_path", &self.file_path)
            .field("content_version", &self.content_version)
            .finish_non_exhaustive()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for Document {
    fn from(text: &str) -> Self {
        let mut doc = Self::new();
        doc.set_text(text);
        doc
    }
}

impl Document {
    /// Creates an empty flat document holding a single empty line.
    pub fn new() -> Self {
        Self::with_storage(Storage::Flat(vec![String::new()]))
    }

    /// Creates an empty paged document.
    ///
    /// # Errors
    ///
    /// Returns an error if `chunk_size` is zero or no tokio runtime is running.
    pub fn with_chunk_mode(chunk_size: usize) -> Result<Self> {
        let mut doc = Self::with_storage(Storage::Paged(ChunkStore::new(chunk_size)?));
        doc.original_line_count = 0;
        Ok(doc)
    }

    fn with_storage(storage: Storage) -> Self {
        Self {
            storage,
            byte_count: 0,
            original_line_count: 1,
            encoding: TextEncoding::default(),
            line_ending: LineEnding::default(),
            indentation: DEFAULT_INDENTATION,
            file_path: None,
            title: "Untitled".to_string(),
            content_version: 0,
        }
    }

    #[inline]
    fn bump_version(&mut self) {
        self.content_version = self.content_version.wrapping_add(1);
    }

    /// Replaces the whole content with `text`, returning to flat mode.
    pub fn set_text(&mut self, text: &str) {
        let lines: Vec<String> = normalize_line_endings(text)
            .split('\n')
            .map(str::to_owned)
            .collect();
        self.byte_count = text.len();
        self.original_line_count = lines.len();
        self.storage = Storage::Flat(lines);
        self.bump_version();
    }

    /// Moves the content into compressed chunks of `chunk_size` lines.
    ///
    /// A pristine document (a single empty line) becomes an empty paged
    /// document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is already paged, `chunk_size` is
    /// zero, no tokio runtime is running, or compression fails. The document
    /// stays in flat mode on error.
    pub async fn activate_chunk_mode(&mut self, chunk_size: usize) -> Result<()> {
        let lines = match &self.storage {
            Storage::Paged(store) => anyhow::bail!(
                "document is already paged (chunk size {})",
                store.chunk_size()
            ),
            Storage::Flat(lines) if lines.len() == 1 && lines[0].is_empty() => Vec::new(),
            Storage::Flat(lines) => lines.clone(),
        };
        let mut store = ChunkStore::new(chunk_size)?;
        store.append_lines(lines).await?;
        tracing::info!(
            "Activated chunk mode: {} lines in {} chunks of {chunk_size} ({} bytes compressed)",
            store.total_lines(),
            store.chunk_count(),
            store.compressed_bytes()
        );
        self.storage = Storage::Paged(store);
        self.bump_version();
        Ok(())
    }

    /// Returns true when the document is in paged mode.
    pub fn is_paged(&self) -> bool {
        matches!(self.storage, Storage::Paged(_))
    }

    /// Returns true when edits are allowed (flat mode).
    pub fn is_editable(&self) -> bool {
        !self.is_paged()
    }

    /// The chunk store, in paged mode.
    pub fn chunk_store(&self) -> Option<&ChunkStore> {
        match &self.storage {
            Storage::Paged(store) => Some(store),
            Storage::Flat(_) => None,
        }
    }

    /// Chunk size, in paged mode.
    pub fn chunk_size(&self) -> Option<usize> {
        self.chunk_store().map(ChunkStore::chunk_size)
    }

    /// Total number of lines, without decompressing anything.
    pub fn line_count(&self) -> usize {
        match &self.storage {
            Storage::Flat(lines) => lines.len(),
            Storage::Paged(store) => store.total_lines(),
        }
    }

    /// Index of the last line. An empty paged document reports 0.
    pub fn last_index(&self) -> usize {
        self.line_count().saturating_sub(1)
    }

    pub fn byte_count(&self) -> usize {
        self.byte_count
    }

    pub fn original_line_count(&self) -> usize {
        self.original_line_count
    }

    /// Returns line `idx`. In paged mode only resident lines are returned.
    pub fn line(&self, idx: usize) -> Option<Cow<'_, str>> {
        match &self.storage {
            Storage::Flat(lines) => lines.get(idx).map(|l| Cow::Borrowed(l.as_str())),
            Storage::Paged(store) => store.resident_line(idx).map(Cow::Owned),
        }
    }

    /// Length of line `idx` in chars. `None` when the line is out of range
    /// or, in paged mode, not resident.
    pub fn line_len(&self, idx: usize) -> Option<usize> {
        self.line(idx).map(|l| crate::text::char_len(&l))
    }

    /// All lines, in flat mode.
    pub fn lines(&self) -> Option<&[String]> {
        match &self.storage {
            Storage::Flat(lines) => Some(lines),
            Storage::Paged(_) => None,
        }
    }

    /// The content joined with `\n`, in flat mode.
    pub fn to_text(&self) -> Option<String> {
        self.lines().map(|lines| lines.join("\n"))
    }

    /// Lines `start..=end` for display. In paged mode a window miss yields
    /// `placeholder` lines and schedules a background load.
    pub fn visible_lines(&self, start: usize, end: usize, placeholder: &str) -> Vec<String> {
        match &self.storage {
            Storage::Flat(lines) => {
                let end = end.min(lines.len().saturating_sub(1));
                lines.get(start..=end).map(<[String]>::to_vec).unwrap_or_default()
            }
            Storage::Paged(store) => store.visible_lines(start, end, placeholder),
        }
    }

    /// Receiver notified when a chunk window settles, in paged mode.
    pub fn subscribe_window(&self) -> Option<watch::Receiver<u64>> {
        self.chunk_store().map(ChunkStore::subscribe)
    }

    /// Waits for any in-flight chunk window load. Returns at once in flat mode.
    pub async fn wait_for_window(&self) {
        if let Some(store) = self.chunk_store() {
            store.wait_idle().await;
        }
    }

    /// Appends lines at the end of the document.
    ///
    /// # Errors
    ///
    /// In paged mode, returns an error if chunk compression fails.
    pub async fn append_lines(&mut self, new_lines: Vec<String>) -> Result<()> {
        if new_lines.is_empty() {
            return Ok(());
        }
        match &mut self.storage {
            Storage::Flat(lines) => lines.extend(new_lines),
            Storage::Paged(store) => store.append_lines(new_lines).await?,
        }
        self.bump_version();
        Ok(())
    }

    fn flat_mut(&mut self, op: &str) -> Option<&mut Vec<String>> {
        match &mut self.storage {
            Storage::Flat(lines) => Some(lines),
            Storage::Paged(_) => {
                tracing::warn!("Ignoring {op}: paged documents are read-only");
                None
            }
        }
    }

    /// Replaces line `idx`. Returns false when nothing changed.
    pub fn set_line(&mut self, idx: usize, text: String) -> bool {
        let Some(lines) = self.flat_mut("set_line") else {
            return false;
        };
        let Some(line) = lines.get_mut(idx) else {
            tracing::debug!("set_line: line {idx} out of bounds");
            return false;
        };
        *line = text;
        self.bump_version();
        true
    }

    /// Replaces `remove` lines starting at `idx` with `replacement`.
    ///
    /// The range is clamped to the document, and the document never ends up
    /// with zero lines.
    pub fn splice(&mut self, idx: usize, remove: usize, replacement: Vec<String>) -> bool {
        let Some(lines) = self.flat_mut("splice") else {
            return false;
        };
        let start = idx.min(lines.len());
        let end = start.saturating_add(remove).min(lines.len());
        lines.splice(start..end, replacement);
        if lines.is_empty() {
            lines.push(String::new());
        }
        self.bump_version();
        true
    }

    /// Removes line `idx`.
    pub fn remove_line(&mut self, idx: usize) -> bool {
        self.splice(idx, 1, Vec::new())
    }

    /// Chunk currently decompressed for writing, in paged mode.
    pub fn dirty_chunk(&self) -> Option<usize> {
        self.chunk_store().and_then(ChunkStore::dirty_chunk)
    }

    #[cfg(test)]
    pub(crate) fn chunk_store_mut(&mut self) -> Option<&mut ChunkStore> {
        match &mut self.storage {
            Storage::Paged(store) => Some(store),
            Storage::Flat(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document() {
        let doc = Document::new();
        assert_eq!(doc.line_count(), 1);
        assert_eq!(doc.last_index(), 0);
        assert_eq!(doc.line(0).as_deref(), Some(""));
        assert!(doc.is_editable());
    }

    #[test]
    fn test_set_text_metadata() {
        let doc = Document::from("héllo\nworld");
        assert_eq!(doc.lines().unwrap(), ["héllo", "world"]);
        assert_eq!(doc.byte_count(), 12);
        assert_eq!(doc.original_line_count(), 2);
        assert_eq!(doc.line_len(0), Some(5));
    }

    #[test]
    fn test_set_text_normalizes_crlf() {
        let doc = Document::from("a\r\nb\r\n");
        assert_eq!(doc.lines().unwrap(), ["a", "b", ""]);
    }

    #[test]
    fn test_splice_and_remove() {
        let mut doc = Document::from("a\nb\nc\nd");
        assert!(doc.splice(1, 2, vec!["X".to_string()]));
        assert_eq!(doc.lines().unwrap(), ["a", "X", "d"]);
        assert!(doc.remove_line(0));
        assert_eq!(doc.lines().unwrap(), ["X", "d"]);
    }

    #[test]
    fn test_splice_never_leaves_zero_lines() {
        let mut doc = Document::from("only");
        doc.splice(0, 5, Vec::new());
        assert_eq!(doc.lines().unwrap(), [""]);
    }

    #[test]
    fn test_content_version_bumps_on_edits() {
        let mut doc = Document::new();
        let v0 = doc.content_version;
        doc.set_line(0, "x".to_string());
        assert_eq!(doc.content_version, v0 + 1);
        assert!(!doc.set_line(7, "nope".to_string()));
        assert_eq!(doc.content_version, v0 + 1);
    }

    #[test]
    fn test_visible_lines_flat() {
        let doc = Document::from("0\n1\n2\n3");
        assert_eq!(doc.visible_lines(1, 2, "~"), vec!["1", "2"]);
        assert_eq!(doc.visible_lines(2, 99, "~"), vec!["2", "3"]);
    }

    #[tokio::test]
    async fn test_flat_append() {
        let mut doc = Document::from("a");
        doc.append_lines(vec!["b".to_string()]).await.unwrap();
        assert_eq!(doc.to_text().as_deref(), Some("a\nb"));
        assert!(doc.subscribe_window().is_none());
    }

    #[tokio::test]
    async fn test_paged_append_one_at_a_time() {
        let mut doc = Document::with_chunk_mode(2).unwrap();
        assert_eq!(doc.line_count(), 0);
        for i in 0..5 {
            doc.append_lines(vec![format!("line {i}")]).await.unwrap();
            assert_eq!(doc.line_count(), i + 1);
            assert!(doc.dirty_chunk().is_none());
        }
        assert_eq!(doc.chunk_store().unwrap().chunk_count(), 3);
    }

    #[tokio::test]
    async fn test_activate_chunk_mode_moves_content() {
        let text: Vec<String> = (0..10).map(|i| format!("row {i}")).collect();
        let mut doc = Document::from(text.join("\n").as_str());
        doc.activate_chunk_mode(4).await.unwrap();
        assert!(doc.is_paged());
        assert_eq!(doc.line_count(), 10);
        assert_eq!(doc.original_line_count(), 10);
        assert_eq!(doc.chunk_size(), Some(4));

        let mut loaded = doc.subscribe_window().unwrap();
        assert!(doc.visible_lines(0, 3, "~").iter().all(|l| l == "~"));
        loaded.changed().await.unwrap();
        assert_eq!(doc.to_text(), None);
        assert_eq!(doc.visible_lines(0, 3, "~"), text[0..4].to_vec());
    }

    #[tokio::test]
    async fn test_activate_twice_fails() {
        let mut doc = Document::new();
        doc.activate_chunk_mode(4).await.unwrap();
        assert_eq!(doc.line_count(), 0);
        assert!(doc.activate_chunk_mode(4).await.is_err());
    }

    #[tokio::test]
    async fn test_unavailable_chunk_keeps_placeholders() {
        let text: Vec<String> = (0..8).map(|i| i.to_string()).collect();
        let mut doc = Document::from(text.join("\n").as_str());
        doc.activate_chunk_mode(4).await.unwrap();
        doc.chunk_store_mut().unwrap().corrupt_chunk(0);

        assert_eq!(doc.visible_lines(0, 1, "~"), vec!["~", "~"]);
        doc.wait_for_window().await;
        assert_eq!(doc.visible_lines(0, 1, "~"), vec!["~", "~"]);
        assert_eq!(doc.line(0), None);
        assert_eq!(doc.line_len(0), None);
        assert_eq!(doc.line_count(), 8);
    }

    #[tokio::test]
    async fn test_paged_document_rejects_edits() {
        let mut doc = Document::from("a\nb");
        doc.activate_chunk_mode(8).await.unwrap();
        let version = doc.content_version;
        assert!(!doc.set_line(0, "x".to_string()));
        assert!(!doc.splice(0, 1, Vec::new()));
        assert_eq!(doc.content_version, version);
        assert_eq!(doc.line_count(), 2);
    }
}
