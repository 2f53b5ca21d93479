use crate::pool::Slots;
use crate::types::{Color, NodeId, RbNodeLike};
use crate::util::{first, next};

#[path = "util/print.rs"]
mod print_impl;

pub(crate) use print_impl::print;

/// Color of a possibly absent node. Missing children are BLACK leaves.
#[inline]
pub(crate) fn color_of<N: RbNodeLike>(arena: &Slots<N>, node: Option<NodeId>) -> Color {
    node.map_or(Color::Black, |i| arena[i].color())
}

#[inline]
fn is_red<N: RbNodeLike>(arena: &Slots<N>, node: Option<NodeId>) -> bool {
    color_of(arena, node) == Color::Red
}

#[inline]
fn set_color<N: RbNodeLike>(arena: &mut Slots<N>, node: NodeId, color: Color) {
    arena[node].set_color(color);
}

/// Points `parent`'s link that held `old` at `new`, or makes `new` the root.
fn replace_child<N: RbNodeLike>(
    arena: &mut Slots<N>,
    root: Option<NodeId>,
    parent: Option<NodeId>,
    old: NodeId,
    new: Option<NodeId>,
) -> Option<NodeId> {
    match parent {
        None => new,
        Some(p) => {
            if arena[p].l() == Some(old) {
                arena[p].set_l(new);
            } else {
                arena[p].set_r(new);
            }
            root
        }
    }
}

/// Promotes `x`'s right child into `x`'s position. Returns the new root.
fn rotate_left<N: RbNodeLike>(
    arena: &mut Slots<N>,
    root: Option<NodeId>,
    x: NodeId,
) -> Option<NodeId> {
    let y = arena[x].r().expect("left rotation needs a right child");
    let yl = arena[y].l();
    arena[x].set_r(yl);
    if let Some(yl) = yl {
        arena[yl].set_p(Some(x));
    }

    let xp = arena[x].p();
    arena[y].set_p(xp);
    let root = replace_child(arena, root, xp, x, Some(y));

    arena[y].set_l(Some(x));
    arena[x].set_p(Some(y));
    root
}

/// Promotes `y`'s left child into `y`'s position. Returns the new root.
fn rotate_right<N: RbNodeLike>(
    arena: &mut Slots<N>,
    root: Option<NodeId>,
    y: NodeId,
) -> Option<NodeId> {
    let x = arena[y].l().expect("right rotation needs a left child");
    let xr = arena[x].r();
    arena[y].set_l(xr);
    if let Some(xr) = xr {
        arena[xr].set_p(Some(y));
    }

    let yp = arena[y].p();
    arena[x].set_p(yp);
    let root = replace_child(arena, root, yp, y, Some(x));

    arena[x].set_r(Some(y));
    arena[y].set_p(Some(x));
    root
}

/// First node whose key equals `key`.
pub(crate) fn find<N: RbNodeLike>(
    arena: &Slots<N>,
    root: Option<NodeId>,
    key: &N::Key,
) -> Option<NodeId> {
    let mut curr = root;
    while let Some(i) = curr {
        let k = arena[i].key();
        if key == k {
            return Some(i);
        }
        curr = if key < k { arena[i].l() } else { arena[i].r() };
    }
    None
}

/// Links the detached node `n` into the tree and rebalances.
///
/// Equal keys descend right, so duplicates become distinct nodes and keep
/// their insertion order in an in-order walk. Returns the new root.
pub(crate) fn insert<N: RbNodeLike>(
    arena: &mut Slots<N>,
    root: Option<NodeId>,
    n: NodeId,
) -> Option<NodeId> {
    let mut parent = None;
    let mut left = false;
    let mut curr = root;
    while let Some(c) = curr {
        parent = Some(c);
        left = arena[n].key() < arena[c].key();
        curr = if left { arena[c].l() } else { arena[c].r() };
    }

    arena[n].unlink();
    arena[n].set_p(parent);
    set_color(arena, n, Color::Red);

    let root = match parent {
        None => Some(n),
        Some(p) => {
            if left {
                arena[p].set_l(Some(n));
            } else {
                arena[p].set_r(Some(n));
            }
            root
        }
    };
    insert_fixup(arena, root, n)
}

fn insert_fixup<N: RbNodeLike>(
    arena: &mut Slots<N>,
    mut root: Option<NodeId>,
    mut z: NodeId,
) -> Option<NodeId> {
    while let Some(p) = arena[z].p().filter(|&p| is_red(arena, Some(p))) {
        let g = arena[p].p().expect("red node has a parent");

        if arena[g].l() == Some(p) {
            let uncle = arena[g].r();
            if is_red(arena, uncle) {
                set_color(arena, p, Color::Black);
                set_color(arena, uncle.expect("red uncle exists"), Color::Black);
                set_color(arena, g, Color::Red);
                z = g;
                continue;
            }
            if arena[p].r() == Some(z) {
                z = p;
                root = rotate_left(arena, root, z);
            }
            let p = arena[z].p().expect("rotated node has a parent");
            let g = arena[p].p().expect("rotated node has a grandparent");
            set_color(arena, p, Color::Black);
            set_color(arena, g, Color::Red);
            root = rotate_right(arena, root, g);
        } else {
            let uncle = arena[g].l();
            if is_red(arena, uncle) {
                set_color(arena, p, Color::Black);
                set_color(arena, uncle.expect("red uncle exists"), Color::Black);
                set_color(arena, g, Color::Red);
                z = g;
                continue;
            }
            if arena[p].l() == Some(z) {
                z = p;
                root = rotate_right(arena, root, z);
            }
            let p = arena[z].p().expect("rotated node has a parent");
            let g = arena[p].p().expect("rotated node has a grandparent");
            set_color(arena, p, Color::Black);
            set_color(arena, g, Color::Red);
            root = rotate_left(arena, root, g);
        }
    }

    if let Some(r) = root {
        set_color(arena, r, Color::Black);
    }
    root
}

/// Replaces the subtree rooted at `u` with the one rooted at `v`.
fn transplant<N: RbNodeLike>(
    arena: &mut Slots<N>,
    root: Option<NodeId>,
    u: NodeId,
    v: Option<NodeId>,
) -> Option<NodeId> {
    let up = arena[u].p();
    let root = replace_child(arena, root, up, u, v);
    if let Some(v) = v {
        arena[v].set_p(up);
    }
    root
}

fn minimum<N: RbNodeLike>(arena: &Slots<N>, node: NodeId) -> NodeId {
    first(arena, Some(node)).expect("subtree is not empty")
}

/// Unlinks `z` from the tree and rebalances. `z` stays in the arena, detached.
/// Returns the new root.
pub(crate) fn remove<N: RbNodeLike>(
    arena: &mut Slots<N>,
    mut root: Option<NodeId>,
    z: NodeId,
) -> Option<NodeId> {
    let zl = arena[z].l();
    let zr = arena[z].r();
    let mut vacated = arena[z].color();
    let x;
    let x_parent;

    match (zl, zr) {
        (None, _) => {
            x = zr;
            x_parent = arena[z].p();
            root = transplant(arena, root, z, zr);
        }
        (Some(_), None) => {
            x = zl;
            x_parent = arena[z].p();
            root = transplant(arena, root, z, zl);
        }
        (Some(zl), Some(zr)) => {
            let y = minimum(arena, zr);
            vacated = arena[y].color();
            x = arena[y].r();
            if arena[y].p() == Some(z) {
                x_parent = Some(y);
            } else {
                x_parent = arena[y].p();
                root = transplant(arena, root, y, x);
                arena[y].set_r(Some(zr));
                arena[zr].set_p(Some(y));
            }
            root = transplant(arena, root, z, Some(y));
            arena[y].set_l(Some(zl));
            arena[zl].set_p(Some(y));
            let color = arena[z].color();
            set_color(arena, y, color);
        }
    }

    arena[z].unlink();
    if vacated == Color::Black {
        root = erase_fixup(arena, root, x, x_parent);
    }
    root
}

/// Restores the invariants after a BLACK slot was vacated at `x`.
///
/// `x` may be an absent leaf, so its parent is tracked separately.
fn erase_fixup<N: RbNodeLike>(
    arena: &mut Slots<N>,
    mut root: Option<NodeId>,
    mut x: Option<NodeId>,
    mut parent: Option<NodeId>,
) -> Option<NodeId> {
    while x != root && color_of(arena, x) == Color::Black {
        let Some(p) = parent else {
            break;
        };

        if arena[p].l() == x {
            let mut w = arena[p].r().expect("double-black node has a sibling");
            if is_red(arena, Some(w)) {
                set_color(arena, w, Color::Black);
                set_color(arena, p, Color::Red);
                root = rotate_left(arena, root, p);
                w = arena[p].r().expect("sibling survives rotation");
            }

            let wl = arena[w].l();
            let wr = arena[w].r();
            if color_of(arena, wl) == Color::Black && color_of(arena, wr) == Color::Black {
                set_color(arena, w, Color::Red);
                x = Some(p);
                parent = arena[p].p();
                continue;
            }

            if color_of(arena, wr) == Color::Black {
                if let Some(wl) = wl {
                    set_color(arena, wl, Color::Black);
                }
                set_color(arena, w, Color::Red);
                root = rotate_right(arena, root, w);
                w = arena[p].r().expect("sibling survives rotation");
            }

            let pc = arena[p].color();
            set_color(arena, w, pc);
            set_color(arena, p, Color::Black);
            if let Some(wr) = arena[w].r() {
                set_color(arena, wr, Color::Black);
            }
            root = rotate_left(arena, root, p);
        } else {
            let mut w = arena[p].l().expect("double-black node has a sibling");
            if is_red(arena, Some(w)) {
                set_color(arena, w, Color::Black);
                set_color(arena, p, Color::Red);
                root = rotate_right(arena, root, p);
                w = arena[p].l().expect("sibling survives rotation");
            }

            let wl = arena[w].l();
            let wr = arena[w].r();
            if color_of(arena, wr) == Color::Black && color_of(arena, wl) == Color::Black {
                set_color(arena, w, Color::Red);
                x = Some(p);
                parent = arena[p].p();
                continue;
            }

            if color_of(arena, wl) == Color::Black {
                if let Some(wr) = wr {
                    set_color(arena, wr, Color::Black);
                }
                set_color(arena, w, Color::Red);
                root = rotate_left(arena, root, w);
                w = arena[p].l().expect("sibling survives rotation");
            }

            let pc = arena[p].color();
            set_color(arena, w, pc);
            set_color(arena, p, Color::Black);
            if let Some(wl) = arena[w].l() {
                set_color(arena, wl, Color::Black);
            }
            root = rotate_right(arena, root, p);
        }

        x = root;
        parent = None;
    }

    if let Some(x) = x {
        set_color(arena, x, Color::Black);
    }
    root
}

pub(crate) fn assert_red_black_tree<N: RbNodeLike>(
    arena: &Slots<N>,
    root: Option<NodeId>,
) -> Result<(), String> {
    let Some(root) = root else {
        return Ok(());
    };

    if arena[root].p().is_some() {
        return Err("Root has parent".to_string());
    }
    if !arena[root].is_black() {
        return Err("Root is not black".to_string());
    }

    fn black_height<N: RbNodeLike>(
        arena: &Slots<N>,
        node: Option<NodeId>,
    ) -> Result<usize, String> {
        let Some(node) = node else {
            return Ok(0);
        };

        let l = arena[node].l();
        let r = arena[node].r();

        if let Some(li) = l {
            if arena[li].p() != Some(node) {
                return Err(format!("Broken parent link on left child of {node}"));
            }
        }
        if let Some(ri) = r {
            if arena[ri].p() != Some(node) {
                return Err(format!("Broken parent link on right child of {node}"));
            }
        }

        if !arena[node].is_black() && (is_red(arena, l) || is_red(arena, r)) {
            return Err(format!("Red node {node} has a red child"));
        }

        let lh = black_height(arena, l)?;
        let rh = black_height(arena, r)?;
        if lh != rh {
            return Err(format!("Black height mismatch under {node}: {lh} != {rh}"));
        }

        Ok(lh + usize::from(arena[node].is_black()))
    }

    black_height(arena, Some(root))?;

    let mut curr = first(arena, Some(root));
    let mut prev: Option<NodeId> = None;
    while let Some(i) = curr {
        if let Some(prev) = prev {
            if arena[i].key() < arena[prev].key() {
                return Err("Node order violated".to_string());
            }
        }
        prev = Some(i);
        curr = next(arena, i);
    }

    Ok(())
}
