use super::node::tag_eq;
use super::tree::DomTree;
use super::NodeId;

/// Walk from `from` up the ancestor chain and return the first node matching
/// the predicate.
///
/// With `include_self`, `from` itself is considered first. When `root` is
/// given the walk stops after considering `root`; otherwise it ends at the
/// tree root. Returns `None` when nothing on the chain matches.
pub fn closest<F>(
    tree: &DomTree,
    from: NodeId,
    include_self: bool,
    root: Option<NodeId>,
    pred: F,
) -> Option<NodeId>
where
    F: Fn(&DomTree, NodeId) -> bool,
{
    let mut cursor = if include_self {
        Some(from)
    } else {
        tree.parent(from)
    };
    while let Some(node) = cursor {
        if pred(tree, node) {
            return Some(node);
        }
        if Some(node) == root {
            return None;
        }
        cursor = tree.parent(node);
    }
    None
}

/// Walk from `from` up the ancestor chain and return the first element with
/// the given tag (ASCII case-insensitive).
pub fn closest_tag(
    tree: &DomTree,
    from: NodeId,
    include_self: bool,
    root: Option<NodeId>,
    tag: &str,
) -> Option<NodeId> {
    closest(tree, from, include_self, root, |tree, id| {
        matches!(tree.tag(id), Some(t) if tag_eq(t, tag))
    })
}

/// Collect every element with the given tag among the nodes and their
/// descendants, in document order. The given roots themselves are
/// candidates too.
pub fn collect_tagged(tree: &DomTree, roots: &[NodeId], tag: &str) -> Vec<NodeId> {
    let mut found = Vec::new();
    for &root in roots {
        collect_into(tree, root, tag, &mut found);
    }
    found
}

fn collect_into(tree: &DomTree, node: NodeId, tag: &str, found: &mut Vec<NodeId>) {
    if matches!(tree.tag(node), Some(t) if tag_eq(t, tag)) {
        found.push(node);
    }
    for &child in tree.children(node) {
        collect_into(tree, child, tag, found);
    }
}

#[cfg(test)]
mod tests {
    use super::{closest_tag, collect_tagged};
    use crate::helper::{b, build, div, i, p};

    #[test]
    fn test_closest() {
        let tree = build(div((p((b((i(("x",)),)),)),)));
        let root = tree.root();
        let p1 = tree.child(root, 0).unwrap();
        let b1 = tree.child(p1, 0).unwrap();
        let i1 = tree.child(b1, 0).unwrap();
        let t = tree.child(i1, 0).unwrap();

        assert_eq!(closest_tag(&tree, t, true, None, "b"), Some(b1));
        assert_eq!(closest_tag(&tree, t, true, None, "B"), Some(b1));
        assert_eq!(closest_tag(&tree, i1, true, None, "i"), Some(i1));
        assert_eq!(closest_tag(&tree, i1, false, None, "i"), None);
        assert_eq!(closest_tag(&tree, t, true, None, "u"), None);
        // the bounding root is still considered
        assert_eq!(closest_tag(&tree, t, true, Some(p1), "p"), Some(p1));
        assert_eq!(closest_tag(&tree, t, true, Some(b1), "p"), None);
    }

    #[test]
    fn test_collect_tagged() {
        let tree = build(div((b((p((b(("x",)),)),)), b(("y",)))));
        let root = tree.root();
        let b_outer = tree.child(root, 0).unwrap();
        let p1 = tree.child(b_outer, 0).unwrap();
        let b_inner = tree.child(p1, 0).unwrap();
        let b_last = tree.child(root, 1).unwrap();

        assert_eq!(
            collect_tagged(&tree, tree.children(root), "b"),
            vec![b_outer, b_inner, b_last]
        );
        assert_eq!(collect_tagged(&tree, &[b_outer], "p"), vec![p1]);
        assert_eq!(collect_tagged(&tree, &[], "b"), Vec::new());
    }
}
