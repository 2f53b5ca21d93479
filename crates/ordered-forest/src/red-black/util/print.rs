use crate::pool::Slots;
use crate::types::{NodeId, RbNodeLike};

/// Debug dump of the subtree rooted at `node`, one node per line.
///
/// `label` renders the payload of a node.
pub(crate) fn print<N, F>(
    arena: &Slots<N>,
    node: Option<NodeId>,
    tab: &str,
    label: &F,
) -> String
where
    N: RbNodeLike,
    F: Fn(&N) -> String,
{
    match node {
        None => "∅".to_string(),
        Some(i) => {
            let n = &arena[i];
            let color = if n.is_black() { "black" } else { "red" };
            let left = print(arena, n.l(), &format!("{tab}  "), label);
            let right = print(arena, n.r(), &format!("{tab}  "), label);
            format!(
                "Node[{}] {color} {{ {} }}\n{tab}L={left}\n{tab}R={right}",
                i.index(),
                label(n)
            )
        }
    }
}
