use super::node::NodeId;
use super::tree::DomTree;

/// A detached, ordered list of nodes.
///
/// This is what [`extract`](crate::transform::extract) produces: the roots
/// live in the same arena as the document but have no parent. Inserting the
/// fragment moves them back into the tree.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Fragment {
    roots: Vec<NodeId>,
}

impl Fragment {
    /// Create an empty fragment.
    pub fn new() -> Fragment {
        Fragment::default()
    }

    pub(crate) fn from_roots(roots: Vec<NodeId>) -> Fragment {
        Fragment { roots }
    }

    /// The root nodes in order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// The number of roots.
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Whether the fragment has no roots.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub(crate) fn take_roots(self) -> Vec<NodeId> {
        self.roots
    }

    /// Replace the root at `index` by the given nodes, keeping order. Used
    /// when a root itself is unwrapped inside the fragment.
    pub(crate) fn splice_root(&mut self, index: usize, replacement: &[NodeId]) {
        self.roots.splice(index..index + 1, replacement.iter().copied());
    }

    pub(crate) fn root_index(&self, id: NodeId) -> Option<usize> {
        self.roots.iter().position(|r| *r == id)
    }

    /// The concatenated text of all roots.
    pub fn text_content(&self, tree: &DomTree) -> String {
        let mut out = String::new();
        for &root in &self.roots {
            out.push_str(&tree.text_content(root));
        }
        out
    }
}
