//! Line-oriented text buffer engine.
//!
//! A `Document` holds the lines, either flat or gzip-chunked for very large
//! files. A `Viewport` windows over it, and a `Selection` moves and edits
//! through that window. `Editor` bundles the three behind a command API.

pub mod commands;
pub mod document;
pub mod edit;
pub mod editor;
pub mod encoding;
pub mod indent;
pub mod position;
pub mod selection;
pub mod text;
pub mod viewport;
pub mod word;

pub use commands::{Command, Motion};
pub use document::{ChunkStatus, ChunkStore, Document};
pub use edit::LinePartition;
pub use editor::{Editor, StatusLine};
pub use encoding::{LineEnding, TextEncoding};
pub use position::Position;
pub use selection::{Caret, Selection};
pub use viewport::{Viewport, DEFAULT_PLACEHOLDER};
