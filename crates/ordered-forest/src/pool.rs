//! Chunked bulk allocator for tree nodes.
//!
//! A [`NodePool`] hands out node slots from fixed-size chunks. Chunks are only
//! ever freed together, by [`NodePool::release`]. Individual slots vacated by
//! an erase go onto a free list and are handed out again before the pool grows.
//!
//! Several trees can share one pool by borrowing it. The pool keeps an
//! *epoch* that `release` bumps; trees remember the epoch their nodes were
//! obtained in and refuse to follow handles from an earlier one.

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::ops::{Index, IndexMut};

use tracing::{debug, trace};

use crate::config::PoolConfig;
use crate::error::{ForestError, ForestResult};
use crate::types::NodeId;

/// Handles are `u32`, so a pool never addresses more slots than this.
const MAX_SLOTS: usize = u32::MAX as usize;

enum Slot<N> {
    Occupied(N),
    Vacant { next: Option<NodeId> },
}

/// Chunk storage behind a [`NodePool`].
///
/// Slots are handed out in order, so the flat index of a freshly bumped slot
/// equals the number of slots obtained so far.
pub(crate) struct Slots<N> {
    chunks: Vec<Vec<Slot<N>>>,
    chunk_size: usize,
    obtained: usize,
    capacity: usize,
    live: usize,
    free_head: Option<NodeId>,
    free_len: usize,
}

impl<N> Slots<N> {
    fn new(chunk_size: usize) -> Self {
        Self {
            chunks: Vec::new(),
            chunk_size,
            obtained: 0,
            capacity: 0,
            live: 0,
            free_head: None,
            free_len: 0,
        }
    }

    #[inline]
    fn locate(&self, id: NodeId) -> (usize, usize) {
        let i = id.0 as usize;
        (i / self.chunk_size, i % self.chunk_size)
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&N> {
        if self.chunk_size == 0 {
            return None;
        }
        let (c, s) = self.locate(id);
        match self.chunks.get(c)?.get(s)? {
            Slot::Occupied(node) => Some(node),
            Slot::Vacant { .. } => None,
        }
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut N> {
        if self.chunk_size == 0 {
            return None;
        }
        let (c, s) = self.locate(id);
        match self.chunks.get_mut(c)?.get_mut(s)? {
            Slot::Occupied(node) => Some(node),
            Slot::Vacant { .. } => None,
        }
    }

    /// Allocates an empty chunk that would bring the pool from `capacity` to
    /// `capacity + chunk_size` slots.
    fn new_chunk(capacity: usize, chunk_size: usize) -> ForestResult<Vec<Slot<N>>> {
        match capacity.checked_add(chunk_size) {
            Some(total) if total <= MAX_SLOTS => {}
            _ => return Err(ForestError::CapacityExhausted { capacity }),
        }

        let mut chunk = Vec::new();
        chunk
            .try_reserve_exact(chunk_size)
            .map_err(|_| ForestError::AllocFailed { slots: chunk_size })?;
        Ok(chunk)
    }

    fn expand(&mut self) -> ForestResult<()> {
        let chunk = Self::new_chunk(self.capacity, self.chunk_size)?;
        self.chunks
            .try_reserve(1)
            .map_err(|_| ForestError::AllocFailed {
                slots: self.chunk_size,
            })?;
        self.chunks.push(chunk);
        self.capacity += self.chunk_size;

        debug!(
            chunks = self.chunks.len(),
            capacity = self.capacity,
            "node pool grew"
        );
        Ok(())
    }

    pub(crate) fn obtain(&mut self, node: N) -> ForestResult<NodeId> {
        if self.chunk_size == 0 {
            return Err(ForestError::Uninitialized);
        }

        if let Some(id) = self.free_head {
            let (c, s) = self.locate(id);
            let slot = &mut self.chunks[c][s];
            let next = match slot {
                Slot::Vacant { next } => *next,
                Slot::Occupied(_) => unreachable!("free list points at occupied slot {id}"),
            };
            *slot = Slot::Occupied(node);
            self.free_head = next;
            self.free_len -= 1;
            self.live += 1;
            return Ok(id);
        }

        if self.obtained + 1 > self.capacity {
            self.expand()?;
        }

        let id = NodeId(self.obtained as u32);
        self.chunks
            .last_mut()
            .expect("pool has a chunk after expand")
            .push(Slot::Occupied(node));
        self.obtained += 1;
        self.live += 1;
        Ok(id)
    }

    /// Moves the node out of its slot and puts the slot on the free list.
    pub(crate) fn recycle(&mut self, id: NodeId) -> Option<N> {
        if self.chunk_size == 0 {
            return None;
        }
        let (c, s) = self.locate(id);
        let slot = self.chunks.get_mut(c)?.get_mut(s)?;
        if let Slot::Vacant { .. } = slot {
            return None;
        }

        let old = std::mem::replace(
            slot,
            Slot::Vacant {
                next: self.free_head,
            },
        );
        self.free_head = Some(id);
        self.free_len += 1;
        self.live -= 1;
        trace!(node = id.0, free = self.free_len, "node slot recycled");

        match old {
            Slot::Occupied(node) => Some(node),
            Slot::Vacant { .. } => None,
        }
    }

    /// Detaches every chunk and zeroes the counters. The chunk size is kept.
    fn reset(&mut self) -> Vec<Vec<Slot<N>>> {
        self.obtained = 0;
        self.capacity = 0;
        self.live = 0;
        self.free_head = None;
        self.free_len = 0;
        std::mem::take(&mut self.chunks)
    }

    fn stats(&self) -> PoolStats {
        PoolStats {
            chunk_size: self.chunk_size,
            chunks: self.chunks.len(),
            capacity: self.capacity,
            obtained: self.obtained,
            live: self.live,
            free: self.free_len,
        }
    }
}

impl<N> Index<NodeId> for Slots<N> {
    type Output = N;

    fn index(&self, id: NodeId) -> &N {
        match self.get(id) {
            Some(node) => node,
            None => panic!("node {id} is not live"),
        }
    }
}

impl<N> IndexMut<NodeId> for Slots<N> {
    fn index_mut(&mut self, id: NodeId) -> &mut N {
        match self.get_mut(id) {
            Some(node) => node,
            None => panic!("node {id} is not live"),
        }
    }
}

/// Snapshot of a pool's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Slots per chunk (zero before `initialize`).
    pub chunk_size: usize,
    pub chunks: usize,
    /// Total slots across all chunks.
    pub capacity: usize,
    /// Slots handed out by bumping the fill offset since the last release.
    pub obtained: usize,
    /// Slots currently holding a node.
    pub live: usize,
    /// Vacated slots waiting on the free list.
    pub free: usize,
}

impl PoolStats {
    /// `(chunk, slot)` position of a handle.
    pub fn location(&self, id: NodeId) -> Option<(usize, usize)> {
        if self.chunk_size == 0 {
            return None;
        }
        let i = id.0 as usize;
        Some((i / self.chunk_size, i % self.chunk_size))
    }
}

/// Bulk allocator for tree nodes of type `N`.
///
/// Trees borrow a pool (`&'p NodePool<N>`), so it always outlives them.
/// Access goes through a `RefCell`; overlapping borrows surface as
/// [`ForestError::PoolBusy`].
pub struct NodePool<N> {
    slots: RefCell<Slots<N>>,
    epoch: Cell<u64>,
}

impl<N> NodePool<N> {
    /// Creates an uninitialized pool. Call [`initialize`](Self::initialize)
    /// before the first `obtain`.
    pub fn new() -> Self {
        Self::lazy(0)
    }

    pub fn with_chunk_size(chunk_size: usize) -> ForestResult<Self> {
        let pool = Self::new();
        pool.initialize(chunk_size)?;
        Ok(pool)
    }

    pub fn from_config(config: &PoolConfig) -> ForestResult<Self> {
        config.validate()?;
        Self::with_chunk_size(config.chunk_size)
    }

    /// Pool that allocates its first chunk on the first `obtain`.
    pub(crate) fn lazy(chunk_size: usize) -> Self {
        Self {
            slots: RefCell::new(Slots::new(chunk_size)),
            epoch: Cell::new(0),
        }
    }

    /// Sets the chunk size and allocates the first chunk.
    ///
    /// Re-initializing a pool that already holds chunks releases them first.
    /// On failure the pool is left as it was.
    pub fn initialize(&self, chunk_size: usize) -> ForestResult<()> {
        if chunk_size == 0 {
            return Err(ForestError::InvalidChunkSize);
        }

        let retired = {
            let mut slots = self.slots_mut()?;
            let chunk = Slots::<N>::new_chunk(0, chunk_size)?;
            let retired = slots.reset();
            slots.chunk_size = chunk_size;
            slots.chunks.push(chunk);
            slots.capacity = chunk_size;
            retired
        };
        if !retired.is_empty() {
            self.bump_epoch();
        }

        debug!(chunk_size, "node pool initialized");
        Ok(())
    }

    /// Places `node` in the next free slot, growing the pool by one chunk when
    /// the current one is full.
    pub fn obtain(&self, node: N) -> ForestResult<NodeId> {
        self.slots_mut()?.obtain(node)
    }

    /// Places a default-constructed node in the next free slot.
    pub fn obtain_default(&self) -> ForestResult<NodeId>
    where
        N: Default,
    {
        self.obtain(N::default())
    }

    /// Frees every chunk at once. Every handle obtained so far becomes invalid
    /// and every tree still referencing them reports
    /// [`ForestError::PoolReleased`].
    pub fn release(&self) -> ForestResult<()> {
        let (retired, stats) = {
            let mut slots = self.slots_mut()?;
            let stats = slots.stats();
            (slots.reset(), stats)
        };
        self.bump_epoch();

        debug!(
            chunks = stats.chunks,
            capacity = stats.capacity,
            live = stats.live,
            epoch = self.epoch.get(),
            "node pool released"
        );
        // Node payloads may own other trees; drop them outside the borrow.
        drop(retired);
        Ok(())
    }

    pub fn stats(&self) -> ForestResult<PoolStats> {
        Ok(self.slots()?.stats())
    }

    /// Whether a chunk size has been set. Stays true across `release`.
    pub fn is_initialized(&self) -> bool {
        self.slots().map_or(true, |slots| slots.chunk_size != 0)
    }

    /// Number of times the pool has been released.
    pub fn epoch(&self) -> u64 {
        self.epoch.get()
    }

    fn bump_epoch(&self) {
        self.epoch.set(self.epoch.get() + 1);
    }

    pub(crate) fn slots(&self) -> ForestResult<Ref<'_, Slots<N>>> {
        self.slots.try_borrow().map_err(|_| ForestError::PoolBusy)
    }

    pub(crate) fn slots_mut(&self) -> ForestResult<RefMut<'_, Slots<N>>> {
        self.slots.try_borrow_mut().map_err(|_| ForestError::PoolBusy)
    }

    /// Borrow-free access for a pool owned by exactly one tree.
    pub(crate) fn slots_exclusive(&mut self) -> &mut Slots<N> {
        self.slots.get_mut()
    }
}

impl<N> Default for NodePool<N> {
    fn default() -> Self {
        Self::new()
    }
}
