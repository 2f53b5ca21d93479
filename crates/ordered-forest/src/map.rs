//! Red-black ordered map with insert-only semantics.

use std::cell::{Ref, RefMut};
use std::fmt::Debug;

use crate::config::{PoolConfig, DEFAULT_CHUNK_SIZE};
use crate::error::ForestResult;
use crate::pool::NodePool;
use crate::tree::Tree;
use crate::types::{MapNode, NodeId};

/// Key-ordered red-black tree mapping keys to values.
///
/// [`insert`](Self::insert) never looks for an existing key: inserting a key
/// twice stores two nodes, and lookups return the equal node met first on the
/// way down (the first one inserted, until rotations move them). Use
/// [`upsert`](Self::upsert) to overwrite instead. Entries cannot be removed
/// individually.
pub struct OrderedMap<'p, K, V> {
    tree: Tree<'p, MapNode<K, V>>,
}

impl<'p, K, V> OrderedMap<'p, K, V> {
    pub fn new() -> Self {
        Self {
            tree: Tree::new(DEFAULT_CHUNK_SIZE),
        }
    }

    /// Pool-free map whose private store grows by `config.chunk_size` nodes.
    pub fn with_config(config: &PoolConfig) -> ForestResult<Self> {
        config.validate()?;
        Ok(Self {
            tree: Tree::new(config.chunk_size),
        })
    }

    pub fn with_pool(pool: &'p NodePool<MapNode<K, V>>) -> Self {
        Self {
            tree: Tree::with_pool(pool),
        }
    }

    /// Attaches `pool` for all later insertions.
    ///
    /// Fails with `PoolMismatch` if the map already holds nodes elsewhere.
    pub fn set_pool(&mut self, pool: &'p NodePool<MapNode<K, V>>) -> ForestResult<()> {
        self.tree.attach(pool)
    }

    pub fn uses_pool(&self, pool: &NodePool<MapNode<K, V>>) -> bool {
        self.tree.is_shared() && self.tree.uses(pool)
    }

    /// Zero once the pool holding the nodes has been released.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.len() == 0
    }

    /// Empties the map.
    ///
    /// A pool-free map drops every entry. A map backed by a borrowed pool only
    /// forgets its root; the nodes stay in the pool until it is released.
    pub fn clear(&mut self) {
        self.tree.clear()
    }
}

impl<'p, K: Ord, V> OrderedMap<'p, K, V> {
    /// Adds `key = value` as a new node without checking for `key`.
    pub fn insert(&mut self, key: K, value: V) -> ForestResult<NodeId> {
        self.tree.insert(MapNode::new(key, value))
    }

    /// Overwrites the value of the first node with `key`, or inserts it.
    pub fn upsert(&mut self, key: K, value: V) -> ForestResult<NodeId> {
        match self.tree.find(&key)? {
            Some(id) => {
                self.tree.node_mut(id)?.set_value(value);
                Ok(id)
            }
            None => self.insert(key, value),
        }
    }

    pub fn find(&self, key: &K) -> ForestResult<Option<NodeId>> {
        self.tree.find(key)
    }

    pub fn contains_key(&self, key: &K) -> ForestResult<bool> {
        Ok(self.find(key)?.is_some())
    }

    pub fn get(&self, key: &K) -> ForestResult<Option<Ref<'_, V>>> {
        let Some(id) = self.tree.find(key)? else {
            return Ok(None);
        };
        Ok(Some(Ref::map(self.tree.node(id)?, |n| n.value())))
    }

    pub fn get_mut(&mut self, key: &K) -> ForestResult<Option<RefMut<'_, V>>> {
        let Some(id) = self.tree.find(key)? else {
            return Ok(None);
        };
        Ok(Some(RefMut::map(self.tree.node_mut(id)?, |n| n.value_mut())))
    }

    /// Value stored in the node `id`, as returned by `insert` or `find`.
    pub fn value(&self, id: NodeId) -> ForestResult<Ref<'_, V>> {
        Ok(Ref::map(self.tree.node(id)?, |n| n.value()))
    }

    /// Mutable access to the value under `key`, inserting `V::default()` first
    /// when the key is missing.
    pub fn at(&mut self, key: K) -> ForestResult<RefMut<'_, V>>
    where
        V: Default,
    {
        let id = match self.tree.find(&key)? {
            Some(id) => id,
            None => self.insert(key, V::default())?,
        };
        Ok(RefMut::map(self.tree.node_mut(id)?, |n| n.value_mut()))
    }

    /// Replaces the contents with a deep copy of `other`.
    ///
    /// New nodes come from this map's current store; `other` is untouched and
    /// shares nothing with the copy.
    pub fn assign_from(&mut self, other: &OrderedMap<'_, K, V>) -> ForestResult<()>
    where
        K: Clone,
        V: Clone,
    {
        self.tree.assign_from(&other.tree)
    }

    /// Calls `f` for every entry in key order.
    pub fn for_each<F: FnMut(&K, &V)>(&self, mut f: F) -> ForestResult<()> {
        self.tree.for_each(|n| f(n.key(), n.value()))
    }

    /// Checks ordering, red-black invariants, parent links and the length.
    pub fn assert_valid(&self) -> Result<(), String> {
        self.tree.assert_valid()
    }

    pub fn print(&self) -> ForestResult<String>
    where
        K: Debug,
        V: Debug,
    {
        self.tree.print(|n| format!("{:?} = {:?}", n.key(), n.value()))
    }
}

impl<K, V> Default for OrderedMap<'_, K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_overwrites_first_match() {
        let mut map = OrderedMap::new();
        let id = map.insert(1, "a").unwrap();
        assert_eq!(map.upsert(1, "b").unwrap(), id);
        assert_eq!(map.len(), 1);
        assert_eq!(*map.get(&1).unwrap().unwrap(), "b");

        map.upsert(2, "c").unwrap();
        assert_eq!(map.len(), 2);
        map.assert_valid().unwrap();
    }

    #[test]
    fn get_mut_updates_in_place() {
        let mut map = OrderedMap::new();
        map.insert("k", 1).unwrap();
        *map.get_mut(&"k").unwrap().unwrap() += 41;
        assert_eq!(*map.get(&"k").unwrap().unwrap(), 42);
        assert!(map.get_mut(&"missing").unwrap().is_none());
    }

    #[test]
    fn print_lists_entries() {
        let mut map = OrderedMap::new();
        map.insert(1, "one").unwrap();
        let dump = map.print().unwrap();
        assert!(dump.contains("black { 1 = \"one\" }"));
    }
}
