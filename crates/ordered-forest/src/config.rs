//! Node pool configuration.

use serde::{Deserialize, Serialize};

use crate::error::{ForestError, ForestResult};

/// Chunk size used by trees that own their nodes and by `PoolConfig::default`.
pub const DEFAULT_CHUNK_SIZE: usize = 64;

/// Configuration for a [`NodePool`](crate::pool::NodePool).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Number of node slots in every chunk.
    pub chunk_size: usize,
}

impl PoolConfig {
    pub fn new(chunk_size: usize) -> Self {
        Self { chunk_size }
    }

    /// Sets the chunk size.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn validate(&self) -> ForestResult<()> {
        if self.chunk_size == 0 {
            return Err(ForestError::InvalidChunkSize);
        }
        Ok(())
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}
