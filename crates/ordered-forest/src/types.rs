//! Node descriptors and the traits the tree algorithms are written against.
//!
//! Nodes never point at each other directly. Every link is an
//! `Option<NodeId>` into the [`NodePool`](crate::pool::NodePool) that owns the
//! node, so parent links are plain back-references and the tree graph can be
//! cyclic without shared ownership.

use std::fmt;

/// Opaque handle to a node slot inside a pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Flat slot index inside the owning pool.
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    #[default]
    Black,
}

/// Structural links (`p`, `l`, `r`).
pub trait Node {
    fn p(&self) -> Option<NodeId>;
    fn l(&self) -> Option<NodeId>;
    fn r(&self) -> Option<NodeId>;
    fn set_p(&mut self, v: Option<NodeId>);
    fn set_l(&mut self, v: Option<NodeId>);
    fn set_r(&mut self, v: Option<NodeId>);

    /// Drops every link, leaving a detached node.
    fn unlink(&mut self) {
        self.set_p(None);
        self.set_l(None);
        self.set_r(None);
    }
}

/// Red-black specific node behavior.
pub trait RbNodeLike: Node {
    type Key: Ord;

    fn key(&self) -> &Self::Key;
    fn color(&self) -> Color;
    fn set_color(&mut self, color: Color);

    fn is_black(&self) -> bool {
        self.color() == Color::Black
    }
}

/// Value-only node used by [`OrderedSet`](crate::set::OrderedSet).
#[derive(Clone, Debug, Default)]
pub struct SetNode<V> {
    pub(crate) p: Option<NodeId>,
    pub(crate) l: Option<NodeId>,
    pub(crate) r: Option<NodeId>,
    pub(crate) v: V,
    pub(crate) color: Color,
}

impl<V> SetNode<V> {
    /// Detached RED node holding `v`.
    pub fn new(v: V) -> Self {
        Self {
            p: None,
            l: None,
            r: None,
            v,
            color: Color::Red,
        }
    }

    pub fn value(&self) -> &V {
        &self.v
    }

    pub fn color(&self) -> Color {
        self.color
    }
}

/// Key/value node used by [`OrderedMap`](crate::map::OrderedMap).
#[derive(Clone, Debug, Default)]
pub struct MapNode<K, V> {
    pub(crate) p: Option<NodeId>,
    pub(crate) l: Option<NodeId>,
    pub(crate) r: Option<NodeId>,
    pub(crate) k: K,
    pub(crate) v: V,
    pub(crate) color: Color,
}

impl<K, V> MapNode<K, V> {
    /// Detached RED node holding `k = v`.
    pub fn new(k: K, v: V) -> Self {
        Self {
            p: None,
            l: None,
            r: None,
            k,
            v,
            color: Color::Red,
        }
    }

    pub fn key(&self) -> &K {
        &self.k
    }

    pub fn value(&self) -> &V {
        &self.v
    }

    pub fn value_mut(&mut self) -> &mut V {
        &mut self.v
    }

    pub fn set_value(&mut self, v: V) {
        self.v = v;
    }

    pub fn color(&self) -> Color {
        self.color
    }
}

impl<V> Node for SetNode<V> {
    fn p(&self) -> Option<NodeId> {
        self.p
    }

    fn l(&self) -> Option<NodeId> {
        self.l
    }

    fn r(&self) -> Option<NodeId> {
        self.r
    }

    fn set_p(&mut self, v: Option<NodeId>) {
        self.p = v;
    }

    fn set_l(&mut self, v: Option<NodeId>) {
        self.l = v;
    }

    fn set_r(&mut self, v: Option<NodeId>) {
        self.r = v;
    }
}

impl<V: Ord> RbNodeLike for SetNode<V> {
    type Key = V;

    fn key(&self) -> &V {
        &self.v
    }

    fn color(&self) -> Color {
        self.color
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
    }
}

impl<K, V> Node for MapNode<K, V> {
    fn p(&self) -> Option<NodeId> {
        self.p
    }

    fn l(&self) -> Option<NodeId> {
        self.l
    }

    fn r(&self) -> Option<NodeId> {
        self.r
    }

    fn set_p(&mut self, v: Option<NodeId>) {
        self.p = v;
    }

    fn set_l(&mut self, v: Option<NodeId>) {
        self.l = v;
    }

    fn set_r(&mut self, v: Option<NodeId>) {
        self.r = v;
    }
}

impl<K: Ord, V> RbNodeLike for MapNode<K, V> {
    type Key = K;

    fn key(&self) -> &K {
        &self.k
    }

    fn color(&self) -> Color {
        self.color
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
    }
}
