//! Red-black ordered containers backed by an optional shared node pool.
//!
//! [`OrderedSet`] and [`OrderedMap`] are red-black trees. By default each tree
//! owns its nodes. Attach a [`NodePool`] to have every node obtained from
//! bulk-allocated chunks instead; one pool can back many trees, and releasing
//! it frees all of their nodes at once.
//!
//! Nodes are addressed by [`NodeId`] handles rather than pointers. A tree
//! borrows its pool, so the pool always outlives it, and remembers the pool's
//! epoch so that use after [`NodePool::release`] fails with
//! [`ForestError::PoolReleased`] instead of touching freed slots.
//!
//! # Module layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`types`] | [`NodeId`], [`Color`], [`SetNode`], [`MapNode`], node traits |
//! | [`pool`] | [`NodePool`] chunked allocator with a free list |
//! | [`set`] | [`OrderedSet`] |
//! | [`map`] | [`OrderedMap`] |
//! | [`config`] | [`PoolConfig`] |
//! | [`error`] | [`ForestError`] |
//!
//! ```
//! use ordered_forest::{NodePool, OrderedSet};
//!
//! let pool = NodePool::with_chunk_size(2).unwrap();
//! let mut set = OrderedSet::with_pool(&pool);
//! for v in [10, 11, 1, 2] {
//!     set.insert(v).unwrap();
//! }
//! assert_eq!(set.to_set().unwrap().into_iter().collect::<Vec<_>>(), vec![1, 2, 10, 11]);
//! assert!(set.find(&3).unwrap().is_none());
//! ```

pub mod config;
pub mod error;
pub mod map;
pub mod pool;
#[path = "red-black/mod.rs"]
mod red_black;
pub mod set;
mod tree;
pub mod types;
mod util;

pub use config::{PoolConfig, DEFAULT_CHUNK_SIZE};
pub use error::{ForestError, ForestResult};
pub use map::OrderedMap;
pub use pool::{NodePool, PoolStats};
pub use set::OrderedSet;
pub use types::{Color, MapNode, Node, NodeId, RbNodeLike, SetNode};
