//! Compressed chunk storage with a three-slot decompressed window.
//!
//! Lines are grouped into chunks of `chunk_size` lines, each stored as a
//! gzip stream. Reads go through a sliding window holding at most the
//! previous, current and next chunk around a center chunk. Loading a new
//! window happens on the tokio blocking pool; until it lands, readers get
//! placeholder lines.
//!
//! Only one window load is in flight at a time. A request for the center
//! already being loaded is a no-op; a request for another center bumps the
//! generation, and a finished load only installs itself if its generation
//! is still current.

use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::watch;

use super::codec::{compress_lines, decompress_lines};

/// Observable state of the decompressed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkStatus {
    /// Nothing has been loaded yet.
    Empty,
    /// The window around `center` is resident.
    Resident { center: usize },
    /// A load for `center` is in flight.
    Loading { center: usize },
    /// The last load for `center` failed; the next read retries.
    Unavailable { center: usize },
}

impl std::fmt::Display for ChunkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "no chunk loaded"),
            Self::Resident { center } => write!(f, "chunk {center}"),
            Self::Loading { center } => write!(f, "loading chunk {center}"),
            Self::Unavailable { center } => write!(f, "chunk {center} unavailable"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct InFlight {
    center: usize,
    generation: u64,
}

/// Decompressed chunks around `center`, keyed by chunk index.
#[derive(Debug, Default)]
struct ChunkWindow {
    center: Option<usize>,
    slots: Vec<(usize, Arc<Vec<String>>)>,
    in_flight: Option<InFlight>,
    unavailable: Option<usize>,
    generation: u64,
}

impl ChunkWindow {
    fn slot(&self, chunk: usize) -> Option<&Arc<Vec<String>>> {
        self.slots
            .iter()
            .find(|(idx, _)| *idx == chunk)
            .map(|(_, lines)| lines)
    }

    fn line(&self, line: usize, chunk_size: usize) -> Option<&str> {
        let chunk = line / chunk_size;
        self.slot(chunk)
            .and_then(|lines| lines.get(line - chunk * chunk_size))
            .map(String::as_str)
    }

    fn covers(&self, chunk: usize) -> bool {
        self.center
            .is_some_and(|center| chunk + 1 >= center && chunk <= center + 1)
    }
}

/// Paged line storage.
pub struct ChunkStore {
    chunk_size: usize,
    /// Compressed chunks, in document order.
    chunks: Vec<Arc<[u8]>>,
    total_lines: usize,
    /// Chunk currently decompressed for writing, if any.
    dirty: Option<usize>,
    window: Arc<Mutex<ChunkWindow>>,
    /// Bumped whenever a window load finishes, fails or is superseded.
    loaded: Arc<watch::Sender<u64>>,
    runtime: Handle,
}

impl std::fmt::Debug for ChunkStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkStore")
            .field("chunk_size", &self.chunk_size)
            .field("chunks", &self.chunks.len())
            .field("total_lines", &self.total_lines)
            .field("dirty", &self.dirty)
            .field("status", &self.status())
            .finish()
    }
}

impl ChunkStore {
    /// Creates an empty store bound to the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if `chunk_size` is zero or no runtime is running.
    pub fn new(chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            anyhow::bail!("chunk size must be greater than zero");
        }
        let runtime =
            Handle::try_current().context("chunk mode requires a running tokio runtime")?;
        let (loaded, _) = watch::channel(0);
        Ok(Self {
            chunk_size,
            chunks: Vec::new(),
            total_lines: 0,
            dirty: None,
            window: Arc::new(Mutex::new(ChunkWindow::default())),
            loaded: Arc::new(loaded),
            runtime,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn total_lines(&self) -> usize {
        self.total_lines
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Chunk decompressed for writing right now. Outside of an append this
    /// is always `None`.
    pub fn dirty_chunk(&self) -> Option<usize> {
        self.dirty
    }

    /// Total size of the compressed chunks in bytes.
    pub fn compressed_bytes(&self) -> usize {
        self.chunks.iter().map(|c| c.len()).sum()
    }

    /// Chunk index owning absolute line `line`.
    pub fn chunk_index(&self, line: usize) -> usize {
        line / self.chunk_size
    }

    pub fn status(&self) -> ChunkStatus {
        let window = self.window.lock();
        if let Some(flight) = window.in_flight {
            return ChunkStatus::Loading {
                center: flight.center,
            };
        }
        if let Some(center) = window.unavailable {
            return ChunkStatus::Unavailable { center };
        }
        match window.center {
            Some(center) => ChunkStatus::Resident { center },
            None => ChunkStatus::Empty,
        }
    }

    /// Indices of the chunks currently decompressed in the window.
    pub fn resident_chunks(&self) -> Vec<usize> {
        let window = self.window.lock();
        let mut resident: Vec<usize> = window.slots.iter().map(|(idx, _)| *idx).collect();
        resident.sort_unstable();
        resident
    }

    /// Receiver that changes whenever a window load settles.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.loaded.subscribe()
    }

    /// Waits until no window load is in flight.
    pub async fn wait_idle(&self) {
        let mut rx = self.loaded.subscribe();
        loop {
            let idle = self.window.lock().in_flight.is_none();
            if idle || rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// Returns line `line` if its chunk is resident. Never triggers a load.
    pub fn resident_line(&self, line: usize) -> Option<String> {
        self.window
            .lock()
            .line(line, self.chunk_size)
            .map(str::to_owned)
    }

    /// Returns lines `start..=end`, stitched from the window.
    ///
    /// When `start`'s chunk is not the resident center, the whole range comes
    /// back as `placeholder` and a load for that window is requested.
    pub fn visible_lines(&self, start: usize, end: usize, placeholder: &str) -> Vec<String> {
        if self.total_lines == 0 || start >= self.total_lines {
            return Vec::new();
        }
        let end = end.min(self.total_lines - 1);
        if start > end {
            return Vec::new();
        }
        let center = self.chunk_index(start);
        {
            let window = self.window.lock();
            if window.center == Some(center) {
                return (start..=end)
                    .map(|i| {
                        window
                            .line(i, self.chunk_size)
                            .unwrap_or(placeholder)
                            .to_owned()
                    })
                    .collect();
            }
        }
        self.request_window(center);
        vec![placeholder.to_owned(); end - start + 1]
    }

    /// Starts loading the window centered on chunk `center` in the background.
    ///
    /// Idempotent for a center that is resident or already loading. A request
    /// for a different center supersedes the load in flight.
    pub fn request_window(&self, center: usize) {
        if center >= self.chunks.len() {
            return;
        }
        let generation = {
            let mut window = self.window.lock();
            if window.center == Some(center) {
                return;
            }
            if let Some(flight) = window.in_flight {
                if flight.center == center {
                    return;
                }
                tracing::debug!(
                    "Chunk window {center} supersedes in-flight load of {}",
                    flight.center
                );
            }
            let generation = window.generation + 1;
            window.generation = generation;
            window.in_flight = Some(InFlight { center, generation });
            generation
        };

        let jobs: Vec<(usize, Arc<[u8]>)> = (center.saturating_sub(1)..=center + 1)
            .filter_map(|idx| self.chunks.get(idx).map(|bytes| (idx, Arc::clone(bytes))))
            .collect();
        let window = Arc::clone(&self.window);
        let loaded = Arc::clone(&self.loaded);

        tracing::debug!("Loading chunk window around {center}");
        self.runtime.spawn_blocking(move || {
            let decoded: Result<Vec<(usize, Arc<Vec<String>>)>> = jobs
                .into_iter()
                .map(|(idx, bytes)| {
                    decompress_lines(&bytes)
                        .with_context(|| format!("failed to decompress chunk {idx}"))
                        .map(|lines| (idx, Arc::new(lines)))
                })
                .collect();

            {
                let mut guard = window.lock();
                if guard.in_flight.map(|f| f.generation) != Some(generation) {
                    tracing::debug!("Discarding superseded load of chunk window {center}");
                    return;
                }
                guard.in_flight = None;
                match decoded {
                    Ok(slots) => {
                        guard.center = Some(center);
                        guard.slots = slots;
                        guard.unavailable = None;
                    }
                    Err(e) => {
                        tracing::error!("Chunk window {center} unavailable: {e:#}");
                        guard.unavailable = Some(center);
                    }
                }
            }
            loaded.send_replace(generation);
        });
    }

    /// Appends lines, filling the tail chunk before opening new ones.
    ///
    /// Each touched chunk is decompressed (or taken from the window when
    /// resident), extended, and recompressed before moving on, so at most one
    /// chunk is dirty at a time. `total_lines` only advances once a chunk is
    /// safely recompressed.
    ///
    /// # Errors
    ///
    /// Returns an error if compression, decompression or the blocking task
    /// fails. Lines placed in earlier chunks stay placed.
    pub async fn append_lines(&mut self, lines: Vec<String>) -> Result<()> {
        let mut pending = lines.into_iter().peekable();
        while pending.peek().is_some() {
            let idx = self.total_lines / self.chunk_size;
            let offset = self.total_lines % self.chunk_size;

            self.dirty = Some(idx);
            let filled = self.fill_chunk(idx, offset, &mut pending).await;
            self.dirty = None;
            let (chunk, bytes) = filled?;

            if idx < self.chunks.len() {
                self.chunks[idx] = bytes;
            } else {
                self.chunks.push(bytes);
            }
            self.total_lines += chunk.len() - offset;
            self.refresh_resident(idx, chunk);
        }
        Ok(())
    }

    async fn fill_chunk(
        &self,
        idx: usize,
        offset: usize,
        pending: &mut impl Iterator<Item = String>,
    ) -> Result<(Arc<Vec<String>>, Arc<[u8]>)> {
        let resident = if offset == 0 {
            None
        } else {
            self.window.lock().slot(idx).cloned()
        };
        let mut chunk = match resident {
            _ if offset == 0 => Vec::with_capacity(self.chunk_size),
            Some(resident) => resident.as_ref().clone(),
            None => self.decompress(idx).await?,
        };
        chunk.extend(pending.take(self.chunk_size - offset));

        let chunk = Arc::new(chunk);
        let for_task = Arc::clone(&chunk);
        let bytes = self
            .runtime
            .spawn_blocking(move || compress_lines(&for_task))
            .await
            .context("chunk compression task failed")??;
        Ok((chunk, bytes.into()))
    }

    async fn decompress(&self, idx: usize) -> Result<Vec<String>> {
        let bytes = self
            .chunks
            .get(idx)
            .cloned()
            .with_context(|| format!("chunk {idx} does not exist"))?;
        self.runtime
            .spawn_blocking(move || decompress_lines(&bytes))
            .await
            .context("chunk decompression task failed")?
            .with_context(|| format!("failed to decompress chunk {idx}"))
    }

    /// Keeps the window in step with a rewritten chunk and drops any load in
    /// flight, which may have read the old bytes.
    fn refresh_resident(&self, idx: usize, chunk: Arc<Vec<String>>) {
        let superseded = {
            let mut window = self.window.lock();
            if window.covers(idx) {
                match window.slots.iter_mut().find(|(slot, _)| *slot == idx) {
                    Some(slot) => slot.1 = chunk,
                    None => window.slots.push((idx, chunk)),
                }
            }
            if window.in_flight.take().is_some() {
                window.generation += 1;
                Some(window.generation)
            } else {
                None
            }
        };
        if let Some(generation) = superseded {
            tracing::debug!("Append to chunk {idx} superseded an in-flight window load");
            self.loaded.send_replace(generation);
        }
    }

    #[cfg(test)]
    pub(crate) fn corrupt_chunk(&mut self, idx: usize) {
        self.chunks[idx] = Arc::from(&b"not gzip"[..]);
    }
}
