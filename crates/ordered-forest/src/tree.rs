//! Shared core of [`OrderedSet`](crate::set::OrderedSet) and
//! [`OrderedMap`](crate::map::OrderedMap).
//!
//! A [`Tree`] pairs a root handle with the store its nodes live in: either a
//! pool borrowed from the caller, or a private pool the tree owns. All nodes
//! of one tree live in one store, so handles never mix provenance.

use std::cell::{Ref, RefMut};

use tracing::debug;

use crate::error::{ForestError, ForestResult};
use crate::pool::{NodePool, Slots};
use crate::red_black;
use crate::types::{Node, NodeId, RbNodeLike};
use crate::util::{first, next, post_order, size};

pub(crate) enum Store<'p, N> {
    /// Pool owned by the tree; nodes are freed one by one.
    Private(NodePool<N>),
    /// Pool borrowed from the caller and possibly shared with other trees.
    Shared(&'p NodePool<N>),
}

impl<N> Store<'_, N> {
    fn pool(&self) -> &NodePool<N> {
        match self {
            Store::Private(pool) => pool,
            Store::Shared(pool) => pool,
        }
    }
}

#[derive(Clone, Copy)]
enum Side {
    Left,
    Right,
}

pub(crate) struct Tree<'p, N> {
    root: Option<NodeId>,
    store: Store<'p, N>,
    /// Pool epoch the current nodes were obtained in.
    epoch: u64,
    len: usize,
}

impl<'p, N: Node> Tree<'p, N> {
    pub(crate) fn new(chunk_size: usize) -> Self {
        Self {
            root: None,
            store: Store::Private(NodePool::lazy(chunk_size)),
            epoch: 0,
            len: 0,
        }
    }

    pub(crate) fn with_pool(pool: &'p NodePool<N>) -> Self {
        Self {
            root: None,
            store: Store::Shared(pool),
            epoch: pool.epoch(),
            len: 0,
        }
    }

    /// Node count. A tree whose pool was released holds nothing.
    pub(crate) fn len(&self) -> usize {
        if self.check_live().is_err() {
            return 0;
        }
        self.len
    }

    pub(crate) fn is_shared(&self) -> bool {
        matches!(self.store, Store::Shared(_))
    }

    pub(crate) fn uses(&self, pool: &NodePool<N>) -> bool {
        std::ptr::eq(self.store.pool(), pool)
    }

    /// Switches the tree to `pool`. A non-empty tree cannot move its nodes.
    pub(crate) fn attach(&mut self, pool: &'p NodePool<N>) -> ForestResult<()> {
        if self.uses(pool) {
            return Ok(());
        }
        if self.root.is_some() {
            return Err(ForestError::PoolMismatch);
        }
        self.store = Store::Shared(pool);
        self.epoch = pool.epoch();
        Ok(())
    }

    /// Fails once the pool holding the tree's nodes has been released.
    pub(crate) fn check_live(&self) -> ForestResult<()> {
        if self.root.is_some() && self.store.pool().epoch() != self.epoch {
            return Err(ForestError::PoolReleased);
        }
        Ok(())
    }

    /// Drops the whole structure. Nodes in a private pool are freed
    /// post-order; nodes in a shared pool are abandoned until it is released.
    pub(crate) fn clear(&mut self) {
        let root = self.root.take();
        let len = std::mem::take(&mut self.len);

        match &mut self.store {
            Store::Private(pool) => {
                let slots = pool.slots_exclusive();
                for id in post_order(slots, root) {
                    slots.recycle(id);
                }
            }
            Store::Shared(_) => {
                if root.is_some() {
                    debug!(nodes = len, "tree cleared, nodes left in shared pool");
                }
            }
        }
    }
}

impl<N: RbNodeLike> Tree<'_, N> {
    pub(crate) fn insert(&mut self, node: N) -> ForestResult<NodeId> {
        self.check_live()?;
        let mut slots = self.store.pool().slots_mut()?;
        let id = slots.obtain(node)?;
        if self.root.is_none() {
            self.epoch = self.store.pool().epoch();
        }
        self.root = red_black::insert(&mut slots, self.root, id);
        self.len += 1;
        Ok(id)
    }

    pub(crate) fn find(&self, key: &N::Key) -> ForestResult<Option<NodeId>> {
        self.check_live()?;
        if self.root.is_none() {
            return Ok(None);
        }
        let slots = self.store.pool().slots()?;
        Ok(red_black::find(&slots, self.root, key))
    }

    /// Unlinks `id` and returns its slot to the pool's free list.
    pub(crate) fn remove(&mut self, id: NodeId) -> ForestResult<N> {
        self.check_live()?;
        let mut slots = self.store.pool().slots_mut()?;
        if slots.get(id).is_none() {
            return Err(ForestError::StaleNode(id));
        }
        self.root = red_black::remove(&mut slots, self.root, id);
        self.len -= 1;
        slots.recycle(id).ok_or(ForestError::StaleNode(id))
    }

    pub(crate) fn node(&self, id: NodeId) -> ForestResult<Ref<'_, N>> {
        self.check_live()?;
        let slots = self.store.pool().slots()?;
        Ref::filter_map(slots, |s| s.get(id)).map_err(|_| ForestError::StaleNode(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> ForestResult<RefMut<'_, N>> {
        self.check_live()?;
        let slots = self.store.pool().slots_mut()?;
        RefMut::filter_map(slots, |s| s.get_mut(id)).map_err(|_| ForestError::StaleNode(id))
    }

    /// Visits every node in key order.
    pub(crate) fn for_each<F: FnMut(&N)>(&self, mut f: F) -> ForestResult<()> {
        self.check_live()?;
        if self.root.is_none() {
            return Ok(());
        }
        let slots = self.store.pool().slots()?;
        let mut curr = first(&slots, self.root);
        while let Some(i) = curr {
            f(&slots[i]);
            curr = next(&slots, i);
        }
        Ok(())
    }

    /// Replaces this tree with a deep copy of `other`, allocating through this
    /// tree's own store. Colors and shape are kept; links are rebuilt.
    pub(crate) fn assign_from(&mut self, other: &Tree<'_, N>) -> ForestResult<()>
    where
        N: Clone,
    {
        let snapshot = other.snapshot()?;
        self.clear();
        if snapshot.is_empty() {
            return Ok(());
        }

        let mut slots = self.store.pool().slots_mut()?;
        let mut ids: Vec<NodeId> = Vec::with_capacity(snapshot.len());
        for (node, parent) in snapshot {
            let id = match slots.obtain(node) {
                Ok(id) => id,
                Err(err) => {
                    for id in ids {
                        slots.recycle(id);
                    }
                    return Err(err);
                }
            };
            if let Some((pos, side)) = parent {
                let p = ids[pos];
                match side {
                    Side::Left => slots[p].set_l(Some(id)),
                    Side::Right => slots[p].set_r(Some(id)),
                }
                slots[id].set_p(Some(p));
            }
            ids.push(id);
        }

        self.root = ids.first().copied();
        self.epoch = self.store.pool().epoch();
        self.len = ids.len();
        Ok(())
    }

    /// Detached clones of every node in pre-order, each with the position of
    /// its parent in the output and the side it hangs from.
    #[allow(clippy::type_complexity)]
    fn snapshot(&self) -> ForestResult<Vec<(N, Option<(usize, Side)>)>>
    where
        N: Clone,
    {
        fn walk<N: RbNodeLike + Clone>(
            slots: &Slots<N>,
            node: Option<NodeId>,
            parent: Option<(usize, Side)>,
            out: &mut Vec<(N, Option<(usize, Side)>)>,
        ) {
            let Some(i) = node else {
                return;
            };
            let mut copy = slots[i].clone();
            copy.unlink();
            let pos = out.len();
            out.push((copy, parent));
            walk(slots, slots[i].l(), Some((pos, Side::Left)), out);
            walk(slots, slots[i].r(), Some((pos, Side::Right)), out);
        }

        self.check_live()?;
        let mut out = Vec::with_capacity(self.len);
        if self.root.is_none() {
            return Ok(out);
        }
        let slots = self.store.pool().slots()?;
        walk(&slots, self.root, None, &mut out);
        Ok(out)
    }

    pub(crate) fn assert_valid(&self) -> Result<(), String> {
        self.check_live().map_err(|e| e.to_string())?;
        if self.root.is_none() {
            return if self.len == 0 {
                Ok(())
            } else {
                Err(format!("Empty tree counts {} nodes", self.len))
            };
        }
        let slots = self.store.pool().slots().map_err(|e| e.to_string())?;
        red_black::assert_red_black_tree(&slots, self.root)?;
        let count = size(&slots, self.root);
        if count != self.len {
            return Err(format!("Tree holds {count} nodes but counts {}", self.len));
        }
        Ok(())
    }

    pub(crate) fn print<F: Fn(&N) -> String>(&self, label: F) -> ForestResult<String> {
        self.check_live()?;
        if self.root.is_none() {
            return Ok("∅".to_string());
        }
        let slots = self.store.pool().slots()?;
        Ok(red_black::print(&slots, self.root, "", &label))
    }
}
