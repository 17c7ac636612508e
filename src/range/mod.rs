//! # Selection ranges
//!
//! A [`Range`] is a contiguous span of the document between two
//! [`Boundary`] points, like a DOM `Range`: each boundary is a container
//! node plus an offset, where the offset counts children for element
//! containers and chars for text containers. Collapsed ranges (equal
//! boundaries) represent a caret.
//!
//! Boundaries are plain values into the arena; they do not track mutation.
//! To keep a range valid across destructive edits, serialize it with
//! [`save`] and re-resolve it with [`SavedRange::load`] afterwards.

mod persist;

pub use persist::{save, Location, PersistError, SavedRange};

use crate::dom::{DomIterator, DomTree, NodeId};
use crate::util::{char_len, split_at_char};
use derive_new::new;
use std::cmp::Ordering;

/// One end of a [`Range`]: a container node and an offset inside it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, new)]
pub struct Boundary {
    /// The container node
    pub node: NodeId,
    /// The position inside the container: a child index for elements, a
    /// char index for text
    pub offset: usize,
}

/// A contiguous span of the document between two boundaries.
///
/// The start never comes after the end in document order. The DOM-style
/// setters maintain this: setting one boundary past the other collapses the
/// range onto the boundary that was just set.
#[derive(Debug, Copy, Clone, PartialEq, Eq, new)]
pub struct Range {
    start: Boundary,
    end: Boundary,
}

impl Range {
    /// A collapsed range (caret) at the given point.
    pub fn collapsed(at: Boundary) -> Range {
        Range::new(at, at)
    }

    /// A range spanning the node itself: from before it to after it in its
    /// parent.
    ///
    /// Panics if the node has no parent.
    pub fn select_node(tree: &DomTree, node: NodeId) -> Range {
        let before = point_before(tree, node);
        Range::new(before, Boundary::new(before.node, before.offset + 1))
    }

    /// A range spanning everything inside the node.
    pub fn select_node_contents(tree: &DomTree, node: NodeId) -> Range {
        Range::new(
            Boundary::new(node, 0),
            Boundary::new(node, tree.node_len(node)),
        )
    }

    /// The start boundary.
    pub fn start(&self) -> Boundary {
        self.start
    }

    /// The end boundary.
    pub fn end(&self) -> Boundary {
        self.end
    }

    /// Whether the boundaries are the same point.
    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Set the start boundary, collapsing onto it when it lies after the
    /// current end.
    pub fn set_start(&mut self, tree: &DomTree, boundary: Boundary) {
        self.start = boundary;
        if let Some(Ordering::Greater) = cmp_boundaries(tree, self.start, self.end) {
            self.end = boundary;
        }
    }

    /// Set the end boundary, collapsing onto it when it lies before the
    /// current start.
    pub fn set_end(&mut self, tree: &DomTree, boundary: Boundary) {
        self.end = boundary;
        if let Some(Ordering::Greater) = cmp_boundaries(tree, self.start, self.end) {
            self.start = boundary;
        }
    }

    /// Move the start to just before the node, in its parent.
    ///
    /// Panics if the node has no parent.
    pub fn set_start_before(&mut self, tree: &DomTree, node: NodeId) {
        self.set_start(tree, point_before(tree, node));
    }

    /// Move the start to just after the node, in its parent.
    ///
    /// Panics if the node has no parent.
    pub fn set_start_after(&mut self, tree: &DomTree, node: NodeId) {
        let before = point_before(tree, node);
        self.set_start(tree, Boundary::new(before.node, before.offset + 1));
    }

    /// Move the end to just before the node, in its parent.
    ///
    /// Panics if the node has no parent.
    pub fn set_end_before(&mut self, tree: &DomTree, node: NodeId) {
        self.set_end(tree, point_before(tree, node));
    }

    /// Move the end to just after the node, in its parent.
    ///
    /// Panics if the node has no parent.
    pub fn set_end_after(&mut self, tree: &DomTree, node: NodeId) {
        let before = point_before(tree, node);
        self.set_end(tree, Boundary::new(before.node, before.offset + 1));
    }

    /// The deepest node containing both boundaries. A range wholly inside
    /// one text node reports that text node. `None` when the boundaries are
    /// not part of the same tree.
    pub fn common_ancestor(&self, tree: &DomTree) -> Option<NodeId> {
        if !tree.exists(self.start.node) || !tree.exists(self.end.node) {
            return None;
        }
        let mut chain = Vec::new();
        let mut cursor = Some(self.start.node);
        while let Some(node) = cursor {
            chain.push(node);
            cursor = tree.parent(node);
        }
        let mut cursor = Some(self.end.node);
        while let Some(node) = cursor {
            if chain.contains(&node) {
                return Some(node);
            }
            cursor = tree.parent(node);
        }
        None
    }

    /// The flattened text the range spans.
    pub fn text(&self, tree: &DomTree) -> String {
        let mut out = String::new();
        if self.is_collapsed() {
            return out;
        }
        if self.start.node == self.end.node {
            if let Some(text) = tree.text(self.start.node) {
                let (_, rest) = split_at_char(text, self.start.offset);
                let (mid, _) = split_at_char(rest, self.end.offset - self.start.offset);
                return mid.to_owned();
            }
        }
        let ca = match self.common_ancestor(tree) {
            Some(ca) => ca,
            None => return out,
        };
        let mut iter = DomIterator::scoped(ca, ca);
        while let Some(id) = iter.next_node(tree) {
            let text = match tree.text(id) {
                Some(text) => text,
                None => continue,
            };
            let len = char_len(text);
            if let Some(Ordering::Less) | Some(Ordering::Equal) =
                cmp_boundaries(tree, Boundary::new(id, len), self.start)
            {
                continue;
            }
            if let Some(Ordering::Greater) | Some(Ordering::Equal) =
                cmp_boundaries(tree, Boundary::new(id, 0), self.end)
            {
                break;
            }
            let lo = if id == self.start.node {
                self.start.offset
            } else {
                0
            };
            let hi = if id == self.end.node { self.end.offset } else { len };
            let (_, rest) = split_at_char(text, lo);
            let (mid, _) = split_at_char(rest, hi - lo);
            out.push_str(mid);
        }
        out
    }

    /// The flattened text the range spans, without zero-width spaces.
    pub fn visible_text(&self, tree: &DomTree) -> String {
        self.text(tree).chars().filter(|c| *c != '\u{200B}').collect()
    }

    /// Canonicalize the boundary representation without touching the tree:
    /// element offsets descend to the deepest equivalent position (into
    /// text nodes where possible) and boundaries sitting on the edge
    /// between two text siblings pull inward, toward the range content.
    pub fn normalize(&mut self, tree: &DomTree) {
        if self.is_collapsed() {
            let mut caret = self.start;
            deepen_start(tree, &mut caret);
            self.start = caret;
            self.end = caret;
            return;
        }
        deepen_start(tree, &mut self.start);
        loop {
            let at_end = tree.is_text(self.start.node)
                && self.start.offset == tree.node_len(self.start.node);
            let next = tree.next_sibling(self.start.node);
            match (at_end, next) {
                (true, Some(next)) if tree.is_text(next) => {
                    self.start = Boundary::new(next, 0);
                }
                _ => break,
            }
        }
        deepen_end(tree, &mut self.end);
        loop {
            let at_start = tree.is_text(self.end.node) && self.end.offset == 0;
            let prev = tree.prev_sibling(self.end.node);
            match (at_start, prev) {
                (true, Some(prev)) if tree.is_text(prev) => {
                    self.end = Boundary::new(prev, tree.node_len(prev));
                }
                _ => break,
            }
        }
    }
}

fn point_before(tree: &DomTree, node: NodeId) -> Boundary {
    let parent = match tree.parent(node) {
        Some(parent) => parent,
        None => panic!("{:?} has no parent", node),
    };
    let index = tree.index_in_parent(node).unwrap_or(0);
    Boundary::new(parent, index)
}

fn deepen_start(tree: &DomTree, boundary: &mut Boundary) {
    loop {
        if !tree.is_element(boundary.node) {
            return;
        }
        let count = tree.child_count(boundary.node);
        if count == 0 {
            return;
        }
        if boundary.offset < count {
            match tree.child(boundary.node, boundary.offset) {
                Some(child) => *boundary = Boundary::new(child, 0),
                None => return,
            }
        } else {
            match tree.child(boundary.node, count - 1) {
                Some(child) => *boundary = Boundary::new(child, tree.node_len(child)),
                None => return,
            }
        }
    }
}

fn deepen_end(tree: &DomTree, boundary: &mut Boundary) {
    loop {
        if !tree.is_element(boundary.node) {
            return;
        }
        let count = tree.child_count(boundary.node);
        if count == 0 {
            return;
        }
        if boundary.offset > 0 {
            match tree.child(boundary.node, boundary.offset - 1) {
                Some(child) => *boundary = Boundary::new(child, tree.node_len(child)),
                None => return,
            }
        } else {
            match tree.child(boundary.node, 0) {
                Some(child) => *boundary = Boundary::new(child, 0),
                None => return,
            }
        }
    }
}

/// Compare two boundaries in document order. `None` when they do not share
/// a tree.
pub(crate) fn cmp_boundaries(
    tree: &DomTree,
    a: Boundary,
    b: Boundary,
) -> Option<Ordering> {
    if a.node == b.node {
        return Some(a.offset.cmp(&b.offset));
    }
    let (root_a, key_a) = position_key(tree, a)?;
    let (root_b, key_b) = position_key(tree, b)?;
    if root_a != root_b {
        return None;
    }
    for (x, y) in key_a.iter().zip(key_b.iter()) {
        match x.cmp(y) {
            Ordering::Equal => continue,
            other => return Some(other),
        }
    }
    // a boundary on an ancestor sorts before the positions inside the child
    // it points at
    Some(key_a.len().cmp(&key_b.len()))
}

fn position_key(tree: &DomTree, boundary: Boundary) -> Option<(NodeId, Vec<usize>)> {
    let mut steps = Vec::new();
    let mut cursor = boundary.node;
    while let Some(parent) = tree.parent(cursor) {
        steps.push(tree.index_in_parent(cursor)?);
        cursor = parent;
    }
    steps.reverse();
    steps.push(boundary.offset);
    Some((cursor, steps))
}
