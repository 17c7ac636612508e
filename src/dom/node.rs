use crate::util::char_len;

/// Identifies a node inside a [`DomTree`](super::DomTree).
///
/// Ids are stable across structural mutation: moving a node to a different
/// parent does not change its id. An id becomes dangling once the node is
/// removed from the tree.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn from_index(index: usize) -> NodeId {
        NodeId(index as u32)
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// The payload of a node: an element with a tag and ordered children, or a
/// text leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum NodeData {
    Element { tag: String, children: Vec<NodeId> },
    Text { text: String },
}

impl NodeData {
    pub(crate) fn element(tag: &str) -> NodeData {
        NodeData::Element {
            tag: tag.to_owned(),
            children: Vec::new(),
        }
    }

    pub(crate) fn text(text: &str) -> NodeData {
        NodeData::Text {
            text: text.to_owned(),
        }
    }

    pub(crate) fn tag(&self) -> Option<&str> {
        match self {
            NodeData::Element { tag, .. } => Some(tag),
            NodeData::Text { .. } => None,
        }
    }

    pub(crate) fn children(&self) -> &[NodeId] {
        match self {
            NodeData::Element { children, .. } => children,
            NodeData::Text { .. } => &[],
        }
    }

    pub(crate) fn is_text(&self) -> bool {
        matches!(self, NodeData::Text { .. })
    }

    /// The boundary length of the node: child count for elements, char
    /// count for text.
    pub(crate) fn len(&self) -> usize {
        match self {
            NodeData::Element { children, .. } => children.len(),
            NodeData::Text { text } => char_len(text),
        }
    }
}

/// Case-insensitive tag name comparison (ASCII), the way tag selectors
/// match.
pub(crate) fn tag_eq(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}
