//! Red-black ordered set that keeps duplicates.

use std::cell::Ref;
use std::collections::BTreeSet;
use std::fmt::Debug;

use crate::config::{PoolConfig, DEFAULT_CHUNK_SIZE};
use crate::error::ForestResult;
use crate::pool::NodePool;
use crate::tree::Tree;
use crate::types::{NodeId, SetNode};

/// Value-ordered red-black tree.
///
/// Equal values are stored as separate nodes (ties descend right); they only
/// collapse in [`to_set`](Self::to_set).
///
/// Without an attached pool the set owns its nodes and frees them one by one.
/// With [`set_pool`](Self::set_pool) every node is obtained from the borrowed
/// [`NodePool`], which may be shared with other trees.
pub struct OrderedSet<'p, V> {
    tree: Tree<'p, SetNode<V>>,
}

impl<'p, V> OrderedSet<'p, V> {
    pub fn new() -> Self {
        Self {
            tree: Tree::new(DEFAULT_CHUNK_SIZE),
        }
    }

    /// Pool-free set whose private store grows by `config.chunk_size` nodes.
    pub fn with_config(config: &PoolConfig) -> ForestResult<Self> {
        config.validate()?;
        Ok(Self {
            tree: Tree::new(config.chunk_size),
        })
    }

    pub fn with_pool(pool: &'p NodePool<SetNode<V>>) -> Self {
        Self {
            tree: Tree::with_pool(pool),
        }
    }

    /// Attaches `pool` for all later insertions.
    ///
    /// Fails with `PoolMismatch` if the set already holds nodes elsewhere.
    pub fn set_pool(&mut self, pool: &'p NodePool<SetNode<V>>) -> ForestResult<()> {
        self.tree.attach(pool)
    }

    pub fn uses_pool(&self, pool: &NodePool<SetNode<V>>) -> bool {
        self.tree.is_shared() && self.tree.uses(pool)
    }

    /// Zero once the pool holding the nodes has been released.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.len() == 0
    }

    /// Drops every value. Nodes in a borrowed pool are abandoned until the pool
    /// is released.
    pub fn clear(&mut self) {
        self.tree.clear()
    }
}

impl<'p, V: Ord> OrderedSet<'p, V> {
    /// Inserts `value` as a new node, even if an equal value is present.
    pub fn insert(&mut self, value: V) -> ForestResult<NodeId> {
        self.tree.insert(SetNode::new(value))
    }

    /// Inserts `value` with its node obtained from `pool`.
    ///
    /// The set adopts `pool` as its store, exactly like `set_pool` followed by
    /// `insert`, so a set that already holds nodes in another store is
    /// rejected with `PoolMismatch`.
    pub fn insert_with(
        &mut self,
        value: V,
        pool: &'p NodePool<SetNode<V>>,
    ) -> ForestResult<NodeId> {
        self.tree.attach(pool)?;
        self.insert(value)
    }

    /// Node holding the first value equal to `value` met on the way down.
    pub fn find(&self, value: &V) -> ForestResult<Option<NodeId>> {
        self.tree.find(value)
    }

    pub fn contains(&self, value: &V) -> ForestResult<bool> {
        Ok(self.find(value)?.is_some())
    }

    /// Value stored in the node `id`, as returned by `insert` or `find`.
    pub fn value(&self, id: NodeId) -> ForestResult<Ref<'_, V>> {
        Ok(Ref::map(self.tree.node(id)?, |n| n.value()))
    }

    /// Removes one node equal to `value`. Returns `false` if there is none.
    ///
    /// The vacated slot goes back to its pool's free list.
    pub fn erase(&mut self, value: &V) -> ForestResult<bool> {
        let Some(id) = self.tree.find(value)? else {
            return Ok(false);
        };
        self.tree.remove(id)?;
        Ok(true)
    }

    /// Sorted, deduplicated copy of the contents.
    pub fn to_set(&self) -> ForestResult<BTreeSet<V>>
    where
        V: Clone,
    {
        let mut out = BTreeSet::new();
        self.tree.for_each(|node| {
            out.insert(node.value().clone());
        })?;
        Ok(out)
    }

    /// Checks ordering, red-black invariants, parent links and the length.
    pub fn assert_valid(&self) -> Result<(), String> {
        self.tree.assert_valid()
    }

    pub fn print(&self) -> ForestResult<String>
    where
        V: Debug,
    {
        self.tree.print(|node| format!("{:?}", node.value()))
    }
}

impl<V> Default for OrderedSet<'_, V> {
    fn default() -> Self {
        Self::new()
    }
}
