use super::tree::DomTree;
use super::NodeId;

/// A lazy document-order iterator over the nodes after a starting point.
///
/// The iterator holds nothing but a cursor id and resolves each step against
/// the tree passed to the `next_*` call, so the caller may mutate branches
/// the cursor has already passed over between calls; nodes that were
/// produced once are never produced again. It is finite (it stops at the end
/// of the scope, or of the document) and cannot be restarted.
pub struct DomIterator {
    cursor: Option<NodeId>,
    scope: Option<NodeId>,
}

impl DomIterator {
    /// Iterate the document order after `start`, to the end of the tree.
    pub fn new(start: NodeId) -> DomIterator {
        DomIterator {
            cursor: Some(start),
            scope: None,
        }
    }

    /// Iterate the document order after `start`, never leaving the subtree
    /// of `scope`.
    pub fn scoped(start: NodeId, scope: NodeId) -> DomIterator {
        DomIterator {
            cursor: Some(start),
            scope: Some(scope),
        }
    }

    /// The next node in document order, descending into children first.
    pub fn next_node(&mut self, tree: &DomTree) -> Option<NodeId> {
        let current = self.cursor?;
        if !tree.exists(current) {
            self.cursor = None;
            return None;
        }
        self.cursor = self.advance(tree, current);
        self.cursor
    }

    /// The next leaf node: a text node, or an element without children.
    pub fn next_leaf(&mut self, tree: &DomTree) -> Option<NodeId> {
        self.next_where(tree, |tree, id| tree.child_count(id) == 0)
    }

    /// The next text node.
    pub fn next_text(&mut self, tree: &DomTree) -> Option<NodeId> {
        self.next_where(tree, |tree, id| tree.is_text(id))
    }

    /// The next node matching the predicate.
    pub fn next_where<F>(&mut self, tree: &DomTree, pred: F) -> Option<NodeId>
    where
        F: Fn(&DomTree, NodeId) -> bool,
    {
        while let Some(id) = self.next_node(tree) {
            if pred(tree, id) {
                return Some(id);
            }
        }
        None
    }

    fn advance(&self, tree: &DomTree, current: NodeId) -> Option<NodeId> {
        if let Some(&first) = tree.children(current).first() {
            return Some(first);
        }
        let mut node = current;
        loop {
            if Some(node) == self.scope {
                return None;
            }
            if let Some(sibling) = tree.next_sibling(node) {
                return Some(sibling);
            }
            node = tree.parent(node)?;
            if Some(node) == self.scope {
                return None;
            }
        }
    }
}
