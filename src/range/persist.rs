//! # Saving ranges across mutation
//!
//! [`NodeId`]s survive reparenting but not removal, and boundary offsets go
//! stale the moment siblings are spliced. [`save`] turns a [`Range`] into
//! pure index data relative to an anchor node that the mutation will leave
//! alone; [`SavedRange::load`] resolves it back afterwards. Callers that
//! restructured the region a saved path runs through are expected to adjust
//! the steps themselves before loading.

use crate::dom::{DomTree, NodeId};
use crate::range::{Boundary, Range};
use derive_new::new;
use displaydoc::Display;
use thiserror::Error;

/// The error type for saving and loading ranges
#[derive(Debug, Display, Error, PartialEq, Eq)]
pub enum PersistError {
    /// the anchor is not an ancestor of the boundary
    UnrelatedAnchor,
    /// the anchor node is no longer part of the tree
    LostAnchor,
    /// no child at step {step} (depth {depth})
    MissingChild {
        /// The child index that did not resolve
        step: usize,
        /// How many steps had already resolved
        depth: usize,
    },
    /// offset {offset} does not fit in a node of length {len}
    OffsetOutOfRange {
        /// The saved offset
        offset: usize,
        /// The length of the resolved container
        len: usize,
    },
}

/// One boundary as pure index data: child-index steps down from the anchor,
/// then an offset inside the node the steps land on.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Location {
    /// Child indices leading from the anchor to the container
    pub steps: Vec<usize>,
    /// The offset inside the container
    pub offset: usize,
}

/// A [`Range`] serialized to index data relative to an anchor node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedRange {
    /// The node the locations are relative to
    pub anchor: NodeId,
    /// The saved start boundary
    pub start: Location,
    /// The saved end boundary
    pub end: Location,
}

/// Serialize a range to index data relative to `anchor`.
///
/// Fails with [`PersistError::UnrelatedAnchor`] when `anchor` is not an
/// ancestor (or the container itself) of both boundaries.
pub fn save(tree: &DomTree, range: &Range, anchor: NodeId) -> Result<SavedRange, PersistError> {
    Ok(SavedRange {
        anchor,
        start: save_boundary(tree, range.start(), anchor)?,
        end: save_boundary(tree, range.end(), anchor)?,
    })
}

fn save_boundary(
    tree: &DomTree,
    boundary: Boundary,
    anchor: NodeId,
) -> Result<Location, PersistError> {
    let steps = tree
        .path_from(anchor, boundary.node)
        .ok_or(PersistError::UnrelatedAnchor)?;
    Ok(Location::new(steps, boundary.offset))
}

impl SavedRange {
    /// Resolve the saved indices against the tree as it is now.
    pub fn load(&self, tree: &DomTree) -> Result<Range, PersistError> {
        if !tree.exists(self.anchor) {
            return Err(PersistError::LostAnchor);
        }
        let start = load_boundary(tree, self.anchor, &self.start)?;
        let end = load_boundary(tree, self.anchor, &self.end)?;
        Ok(Range::new(start, end))
    }
}

fn load_boundary(
    tree: &DomTree,
    anchor: NodeId,
    location: &Location,
) -> Result<Boundary, PersistError> {
    let mut node = anchor;
    for (depth, &step) in location.steps.iter().enumerate() {
        node = tree
            .child(node, step)
            .ok_or(PersistError::MissingChild { step, depth })?;
    }
    let len = tree.node_len(node);
    if location.offset > len {
        return Err(PersistError::OffsetOutOfRange {
            offset: location.offset,
            len,
        });
    }
    Ok(Boundary::new(node, location.offset))
}
