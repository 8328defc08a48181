//! # Chunk Persistence
//!
//! Raw per-chunk byte storage keyed by chunk coordinate. The stored bytes are
//! exactly the grid layout of [`VoxelGrid::as_bytes`] with no header.
//!
//! [`VoxelGrid::as_bytes`]: crate::engine_state::voxels::chunk::VoxelGrid::as_bytes

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Context;
use lru::LruCache;

use crate::engine_state::voxels::chunk::ChunkCoordinate;

/// Number of chunk byte buffers the file store keeps in memory.
const FILE_CACHE_CHUNKS: usize = 64;

/// Byte storage for chunk data.
pub trait ChunkPersistence: Send + Sync {
    /// Reads the stored bytes of a chunk, `None` when nothing was saved.
    fn read(&self, coordinate: ChunkCoordinate) -> anyhow::Result<Option<Vec<u8>>>;

    /// Stores the bytes of a chunk, replacing earlier data.
    fn write(&self, coordinate: ChunkCoordinate, bytes: &[u8]) -> anyhow::Result<()>;
}

impl<P: ChunkPersistence + ?Sized> ChunkPersistence for Arc<P> {
    fn read(&self, coordinate: ChunkCoordinate) -> anyhow::Result<Option<Vec<u8>>> {
        (**self).read(coordinate)
    }

    fn write(&self, coordinate: ChunkCoordinate, bytes: &[u8]) -> anyhow::Result<()> {
        (**self).write(coordinate, bytes)
    }
}

/// One file per chunk inside a save directory, fronted by a small LRU cache.
pub struct ChunkFileStore {
    directory: PathBuf,
    cache: Mutex<LruCache<ChunkCoordinate, Vec<u8>>>,
}

impl ChunkFileStore {
    /// Opens (and creates if needed) a save directory.
    pub fn open(directory: impl AsRef<Path>) -> anyhow::Result<Self> {
        let directory = directory.as_ref().to_path_buf();
        fs::create_dir_all(&directory).with_context(|| {
            format!("failed to create save directory {}", directory.display())
        })?;
        Ok(Self {
            directory,
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(FILE_CACHE_CHUNKS).unwrap_or(NonZeroUsize::MIN),
            )),
        })
    }

    /// Path of the file holding a chunk.
    pub fn chunk_path(&self, coordinate: ChunkCoordinate) -> PathBuf {
        self.directory
            .join(format!("chunk{}-{}", coordinate.x, coordinate.z))
    }
}

impl ChunkPersistence for ChunkFileStore {
    fn read(&self, coordinate: ChunkCoordinate) -> anyhow::Result<Option<Vec<u8>>> {
        if let Some(bytes) = self
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&coordinate)
        {
            return Ok(Some(bytes.clone()));
        }

        let path = self.chunk_path(coordinate);
        match fs::read(&path) {
            Ok(bytes) => {
                self.cache
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .put(coordinate, bytes.clone());
                Ok(Some(bytes))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("failed to read {}", path.display())),
        }
    }

    fn write(&self, coordinate: ChunkCoordinate, bytes: &[u8]) -> anyhow::Result<()> {
        let path = self.chunk_path(coordinate);
        fs::write(&path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .put(coordinate, bytes.to_vec());
        Ok(())
    }
}

/// Process-local persistence, used by tests and worlds without a save directory.
#[derive(Default)]
pub struct MemoryChunkStore {
    chunks: Mutex<HashMap<ChunkCoordinate, Vec<u8>>>,
}

impl MemoryChunkStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes currently stored for a chunk.
    pub fn stored(&self, coordinate: ChunkCoordinate) -> Option<Vec<u8>> {
        self.chunks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&coordinate)
            .cloned()
    }

    /// Number of stored chunks.
    pub fn len(&self) -> usize {
        self.chunks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ChunkPersistence for MemoryChunkStore {
    fn read(&self, coordinate: ChunkCoordinate) -> anyhow::Result<Option<Vec<u8>>> {
        Ok(self.stored(coordinate))
    }

    fn write(&self, coordinate: ChunkCoordinate, bytes: &[u8]) -> anyhow::Result<()> {
        self.chunks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(coordinate, bytes.to_vec());
        Ok(())
    }
}
