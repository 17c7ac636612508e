use super::node::{NodeData, NodeId};
use crate::util::{char_len, split_at_char};
use std::fmt::Write;

enum Slot {
    Free,
    Node {
        parent: Option<NodeId>,
        data: NodeData,
    },
}

/// An arena that owns every node of one document.
///
/// Nodes are addressed by [`NodeId`]. The tree keeps the parent backlink for
/// every attached node, so child order lives in the element payloads and
/// parent lookup stays a tree concern. Detached nodes (for example the roots
/// of an extracted fragment) remain in the arena without a parent until they
/// are reinserted or removed.
pub struct DomTree {
    nodes: Vec<Slot>,
    free: Vec<usize>,
    root: NodeId,
}

impl DomTree {
    /// Create a tree holding a single root element with the given tag.
    pub fn new(root_tag: &str) -> DomTree {
        let mut tree = DomTree {
            nodes: Vec::new(),
            free: Vec::new(),
            root: NodeId::from_index(0),
        };
        tree.root = tree.alloc(NodeData::element(root_tag));
        tree
    }

    /// The root element of the document.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Create a detached element node.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeData::element(tag))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeData::text(text))
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let slot = Slot::Node { parent: None, data };
        if let Some(index) = self.free.pop() {
            self.nodes[index] = slot;
            NodeId::from_index(index)
        } else {
            let index = self.nodes.len();
            self.nodes.push(slot);
            NodeId::from_index(index)
        }
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&NodeData> {
        match self.nodes.get(id.index()) {
            Some(Slot::Node { data, .. }) => Some(data),
            _ => None,
        }
    }

    /// Get the payload of a live node.
    ///
    /// Panics if the id is not part of the tree.
    pub(crate) fn data(&self, id: NodeId) -> &NodeData {
        match self.get(id) {
            Some(data) => data,
            None => panic!("{:?} is not part of the tree", id),
        }
    }

    fn data_mut(&mut self, id: NodeId) -> &mut NodeData {
        match self.nodes.get_mut(id.index()) {
            Some(Slot::Node { data, .. }) => data,
            _ => panic!("{:?} is not part of the tree", id),
        }
    }

    fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) {
        match self.nodes.get_mut(id.index()) {
            Some(Slot::Node { parent: p, .. }) => *p = parent,
            _ => panic!("{:?} is not part of the tree", id),
        }
    }

    fn children_mut(&mut self, id: NodeId) -> &mut Vec<NodeId> {
        match self.data_mut(id) {
            NodeData::Element { children, .. } => children,
            NodeData::Text { .. } => panic!("{:?} is a text node", id),
        }
    }

    /// Whether the id refers to a live node of this tree.
    pub fn exists(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// The tag of an element node, `None` for text nodes.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(NodeData::tag)
    }

    /// The content of a text node, `None` for elements.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.get(id) {
            Some(NodeData::Text { text }) => Some(text),
            _ => None,
        }
    }

    /// Whether the node is a text leaf.
    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.get(id), Some(NodeData::Text { .. }))
    }

    /// Whether the node is an element.
    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.get(id), Some(NodeData::Element { .. }))
    }

    /// The children of a node, empty for text leaves.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(NodeData::children).unwrap_or(&[])
    }

    /// The child at the given index, if any.
    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).get(index).copied()
    }

    /// The number of children.
    pub fn child_count(&self, id: NodeId) -> usize {
        self.children(id).len()
    }

    /// The boundary length of a node: child count for elements, char count
    /// for text leaves.
    pub fn node_len(&self, id: NodeId) -> usize {
        self.get(id).map(NodeData::len).unwrap_or(0)
    }

    /// The parent of a node, `None` for the root and for detached nodes.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        match self.nodes.get(id.index()) {
            Some(Slot::Node { parent, .. }) => *parent,
            _ => None,
        }
    }

    /// The position of a node in its parent's child list.
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|c| *c == id)
    }

    /// The sibling before the node, if any.
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        if index == 0 {
            None
        } else {
            self.child(parent, index - 1)
        }
    }

    /// The sibling after the node, if any.
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        self.child(parent, index + 1)
    }

    /// Whether `ancestor` contains `node`. A node contains itself.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        if !self.exists(ancestor) || !self.exists(node) {
            return false;
        }
        let mut cursor = Some(node);
        while let Some(n) = cursor {
            if n == ancestor {
                return true;
            }
            cursor = self.parent(n);
        }
        false
    }

    /// Insert a detached node into a parent's child list at the given index.
    ///
    /// Panics if the child is attached elsewhere, if the parent is a text
    /// node, or if the index is out of bounds.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        assert!(
            self.parent(child).is_none() && self.exists(child),
            "{:?} cannot be inserted here",
            child
        );
        self.children_mut(parent).insert(index, child);
        self.set_parent(child, Some(parent));
    }

    /// Append a detached node to a parent's child list.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let index = self.child_count(parent);
        self.insert_child(parent, index, child);
    }

    /// Detach a node from its parent. The node and its subtree stay alive in
    /// the arena. Detaching an already detached node is a no-op.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.parent(id) {
            let index = self
                .index_in_parent(id)
                .unwrap_or_else(|| panic!("{:?} is missing from its parent", id));
            self.children_mut(parent).remove(index);
            self.set_parent(id, None);
        }
    }

    /// Detach a node and free it together with its whole subtree. All ids
    /// into the subtree become dangling.
    pub fn remove(&mut self, id: NodeId) {
        self.detach(id);
        self.free_subtree(id);
    }

    fn free_subtree(&mut self, id: NodeId) {
        let children = self.children(id).to_vec();
        for child in children {
            self.free_subtree(child);
        }
        self.free_slot(id);
    }

    /// Free a single node slot. The caller must have rehomed or freed its
    /// children already.
    pub(crate) fn free_slot(&mut self, id: NodeId) {
        if self.exists(id) {
            self.nodes[id.index()] = Slot::Free;
            self.free.push(id.index());
        }
    }

    /// Split a text node at a char offset. The node keeps the head; a new
    /// text node takes the tail and becomes the following sibling when the
    /// node has a parent (it is left detached otherwise). Returns the tail
    /// node.
    ///
    /// Panics if the node is not a text leaf.
    pub fn split_text(&mut self, id: NodeId, at: usize) -> NodeId {
        let (head, tail) = match self.data(id) {
            NodeData::Text { text } => {
                let (head, tail) = split_at_char(text, at);
                (head.to_owned(), tail.to_owned())
            }
            NodeData::Element { .. } => panic!("{:?} is not a text node", id),
        };
        *self.data_mut(id) = NodeData::Text { text: head };
        let tail_id = self.create_text(&tail);
        if let Some(parent) = self.parent(id) {
            let index = self.index_in_parent(id).unwrap_or(0);
            self.insert_child(parent, index + 1, tail_id);
        }
        tail_id
    }

    /// Delete the chars `[from..to)` from a text node.
    ///
    /// Panics if the node is not a text leaf or if `from > to`.
    pub fn delete_text(&mut self, id: NodeId, from: usize, to: usize) {
        assert!(from <= to, "invalid text range {}..{}", from, to);
        let merged = match self.data(id) {
            NodeData::Text { text } => {
                let (head, rest) = split_at_char(text, from);
                let (_, tail) = split_at_char(rest, to - from);
                format!("{}{}", head, tail)
            }
            NodeData::Element { .. } => panic!("{:?} is not a text node", id),
        };
        *self.data_mut(id) = NodeData::Text { text: merged };
    }

    /// Merge adjacent text siblings and drop empty text nodes in the whole
    /// subtree, like DOM `Node.normalize()`.
    ///
    /// This invalidates char offsets and child indices saved for the
    /// subtree, so it is a host operation to run between editing operations,
    /// not during them.
    pub fn merge_adjacent_text(&mut self, id: NodeId) {
        let children = self.children(id).to_vec();
        let mut kept: Vec<NodeId> = Vec::with_capacity(children.len());
        for child in children {
            match self.data(child) {
                NodeData::Text { text } => {
                    if text.is_empty() {
                        self.free_slot(child);
                        continue;
                    }
                    if let Some(&prev) = kept.last() {
                        if self.is_text(prev) {
                            let extra = text.clone();
                            if let NodeData::Text { text: t } = self.data_mut(prev) {
                                t.push_str(&extra);
                            }
                            self.free_slot(child);
                            continue;
                        }
                    }
                    kept.push(child);
                }
                NodeData::Element { .. } => {
                    self.merge_adjacent_text(child);
                    kept.push(child);
                }
            }
        }
        if self.is_element(id) {
            *self.children_mut(id) = kept;
        }
    }

    /// The child indices leading from `ancestor` down to `node`, empty when
    /// both are the same node. `None` when `ancestor` does not contain
    /// `node`.
    pub fn path_from(&self, ancestor: NodeId, node: NodeId) -> Option<Vec<usize>> {
        if !self.exists(ancestor) || !self.exists(node) {
            return None;
        }
        let mut steps = Vec::new();
        let mut cursor = node;
        while cursor != ancestor {
            let index = self.index_in_parent(cursor)?;
            steps.push(index);
            cursor = self.parent(cursor)?;
        }
        steps.reverse();
        Some(steps)
    }

    /// Resolve a child-index path starting at `ancestor`.
    pub fn node_at_path(&self, ancestor: NodeId, steps: &[usize]) -> Option<NodeId> {
        let mut cursor = ancestor;
        for &step in steps {
            cursor = self.child(cursor, step)?;
        }
        Some(cursor)
    }

    /// The concatenated text of all text leaves under the node.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.data(id) {
            NodeData::Text { text } => out.push_str(text),
            NodeData::Element { children, .. } => {
                for &child in children.iter() {
                    self.collect_text(child, out);
                }
            }
        }
    }

    /// The concatenated text of all text leaves under the node, without
    /// zero-width spaces. This is the visible text a selection denotes.
    pub fn visible_text(&self, id: NodeId) -> String {
        self.text_content(id)
            .chars()
            .filter(|c| *c != '\u{200B}')
            .collect()
    }

    /// Serialize the children of a node in minimal markup notation, tags and
    /// text only. For diagnostics and tests.
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id).iter() {
            self.write_html(child, &mut out);
        }
        out
    }

    /// Serialize a node and its subtree in minimal markup notation.
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_html(id, &mut out);
        out
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        match self.data(id) {
            NodeData::Text { text } => out.push_str(text),
            NodeData::Element { tag, children } => {
                let _ = write!(out, "<{}>", tag);
                for &child in children.iter() {
                    self.write_html(child, out);
                }
                let _ = write!(out, "</{}>", tag);
            }
        }
    }

    /// Total number of chars in the text leaves under the node.
    pub fn text_len(&self, id: NodeId) -> usize {
        match self.data(id) {
            NodeData::Text { text } => char_len(text),
            NodeData::Element { children, .. } => children
                .iter()
                .map(|&child| self.text_len(child))
                .sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DomTree;

    #[test]
    fn test_structure() {
        let mut tree = DomTree::new("div");
        let root = tree.root();
        let b = tree.create_element("b");
        let t1 = tree.create_text("hello worl");
        let t2 = tree.create_text("d");
        tree.append_child(b, t1);
        tree.append_child(root, b);
        tree.append_child(root, t2);

        assert_eq!(tree.tag(root), Some("div"));
        assert_eq!(tree.children(root), &[b, t2]);
        assert_eq!(tree.parent(t1), Some(b));
        assert_eq!(tree.index_in_parent(t2), Some(1));
        assert_eq!(tree.prev_sibling(t2), Some(b));
        assert_eq!(tree.next_sibling(b), Some(t2));
        assert!(tree.contains(root, t1));
        assert!(tree.contains(t1, t1));
        assert!(!tree.contains(b, t2));
        assert_eq!(tree.text_content(root), "hello world");
        assert_eq!(tree.inner_html(root), "<b>hello worl</b>d");
        assert_eq!(tree.outer_html(b), "<b>hello worl</b>");
        assert_eq!(tree.node_len(root), 2);
        assert_eq!(tree.node_len(t1), 10);
    }

    #[test]
    fn test_paths() {
        let mut tree = DomTree::new("div");
        let root = tree.root();
        let b = tree.create_element("b");
        let t1 = tree.create_text("x");
        tree.append_child(b, t1);
        tree.append_child(root, b);

        assert_eq!(tree.path_from(root, t1), Some(vec![0, 0]));
        assert_eq!(tree.path_from(root, root), Some(vec![]));
        assert_eq!(tree.path_from(b, root), None);
        assert_eq!(tree.node_at_path(root, &[0, 0]), Some(t1));
        assert_eq!(tree.node_at_path(root, &[1]), None);
    }

    #[test]
    fn test_split_and_delete_text() {
        let mut tree = DomTree::new("div");
        let root = tree.root();
        let t = tree.create_text("hello");
        tree.append_child(root, t);

        let tail = tree.split_text(t, 2);
        assert_eq!(tree.text(t), Some("he"));
        assert_eq!(tree.text(tail), Some("llo"));
        assert_eq!(tree.children(root), &[t, tail]);
        assert_eq!(tree.parent(tail), Some(root));

        tree.delete_text(tail, 0, 2);
        assert_eq!(tree.text(tail), Some("o"));
        tree.delete_text(tail, 1, 5);
        assert_eq!(tree.text(tail), Some("o"));
    }

    #[test]
    fn test_detach_remove_reuse() {
        let mut tree = DomTree::new("div");
        let root = tree.root();
        let b = tree.create_element("b");
        let t = tree.create_text("x");
        tree.append_child(b, t);
        tree.append_child(root, b);

        tree.detach(b);
        assert_eq!(tree.parent(b), None);
        assert!(tree.exists(b));
        assert_eq!(tree.children(root), &[]);
        assert!(!tree.contains(root, t));
        assert!(tree.contains(b, t));

        tree.remove(b);
        assert!(!tree.exists(b));
        assert!(!tree.exists(t));

        // freed slots are reused
        let n = tree.create_text("y");
        assert!(n == b || n == t);
    }

    #[test]
    fn test_merge_adjacent_text() {
        let mut tree = DomTree::new("div");
        let root = tree.root();
        let a = tree.create_text("he");
        let b = tree.create_text("");
        let c = tree.create_text("llo");
        let em = tree.create_element("em");
        let d = tree.create_text(" wor");
        let e = tree.create_text("ld");
        tree.append_child(em, d);
        tree.append_child(em, e);
        tree.append_child(root, a);
        tree.append_child(root, b);
        tree.append_child(root, c);
        tree.append_child(root, em);

        tree.merge_adjacent_text(root);
        assert_eq!(tree.inner_html(root), "hello<em> world</em>");
        assert_eq!(tree.child_count(root), 2);
        assert_eq!(tree.child_count(em), 1);
    }
}
