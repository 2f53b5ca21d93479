//! Errors raised by node pools and the trees built on top of them.

use thiserror::Error;

use crate::types::NodeId;

/// Result type for pool and tree operations.
pub type ForestResult<T> = Result<T, ForestError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForestError {
    /// `obtain` was called on a pool that was never initialized.
    #[error("node pool is not initialized")]
    Uninitialized,

    #[error("node pool chunk size must be greater than zero")]
    InvalidChunkSize,

    /// The allocator refused a new chunk.
    #[error("failed to allocate a chunk of {slots} node slots")]
    AllocFailed { slots: usize },

    /// Node handles are 32-bit; the pool cannot address more slots.
    #[error("node pool capacity exhausted at {capacity} slots")]
    CapacityExhausted { capacity: usize },

    /// The tree's nodes were freed by `NodePool::release`.
    #[error("node pool was released while the tree still referenced its nodes")]
    PoolReleased,

    #[error("tree nodes live in a different node pool")]
    PoolMismatch,

    /// Another borrow of the same pool is still alive.
    #[error("node pool is already borrowed")]
    PoolBusy,

    #[error("node {0} does not refer to a live slot")]
    StaleNode(NodeId),
}
