//! Link-only traversal helpers shared by both trees.

use crate::pool::Slots;
use crate::types::{Node, NodeId};

/// Leftmost node of the subtree rooted at `root`.
pub(crate) fn first<N: Node>(arena: &Slots<N>, root: Option<NodeId>) -> Option<NodeId> {
    let mut curr = root?;
    while let Some(l) = arena[curr].l() {
        curr = l;
    }
    Some(curr)
}

/// In-order successor of `node`.
pub(crate) fn next<N: Node>(arena: &Slots<N>, node: NodeId) -> Option<NodeId> {
    if let Some(r) = arena[node].r() {
        return first(arena, Some(r));
    }
    let mut curr = node;
    let mut p = arena[node].p();
    while let Some(pi) = p {
        if arena[pi].r() == Some(curr) {
            curr = pi;
            p = arena[pi].p();
        } else {
            return Some(pi);
        }
    }
    None
}

/// Collects the subtree in post-order, children before parents.
pub(crate) fn post_order<N: Node>(arena: &Slots<N>, root: Option<NodeId>) -> Vec<NodeId> {
    fn walk<N: Node>(arena: &Slots<N>, node: Option<NodeId>, out: &mut Vec<NodeId>) {
        if let Some(i) = node {
            walk(arena, arena[i].l(), out);
            walk(arena, arena[i].r(), out);
            out.push(i);
        }
    }

    let mut out = Vec::new();
    walk(arena, root, &mut out);
    out
}

/// Number of nodes reachable from `root`.
pub(crate) fn size<N: Node>(arena: &Slots<N>, root: Option<NodeId>) -> usize {
    let mut count = 0;
    let mut curr = first(arena, root);
    while let Some(i) = curr {
        count += 1;
        curr = next(arena, i);
    }
    count
}
