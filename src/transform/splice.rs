//! # Content splices
//!
//! [`extract`] cuts the content a range spans out of the tree into a
//! [`Fragment`]; [`insert`] splices a fragment back in at a point. Between
//! them they preserve the flattened text exactly, which is what lets the
//! unwrap orchestrator pull a region out, rewrite it, and put it back.
//!
//! Fully covered nodes keep their identity through a round trip; partially
//! covered boundary nodes are split, with the part outside the range
//! keeping its node (truncated in place) and the covered part moving as a
//! fresh node.

use crate::dom::{DomTree, Fragment, NodeId};
use crate::range::{cmp_boundaries, Boundary, Range};
use crate::transform::map::Splice;
use crate::transform::UnwrapError;
use std::cmp::Ordering;

/// The child-index path from the tree root down to an attached node.
pub(crate) fn root_path(tree: &DomTree, node: NodeId) -> Vec<usize> {
    tree.path_from(tree.root(), node).unwrap_or_default()
}

pub(crate) fn check_boundary(tree: &DomTree, boundary: Boundary) -> Result<(), UnwrapError> {
    if !tree.exists(boundary.node) || !tree.contains(tree.root(), boundary.node) {
        return Err(UnwrapError::ForeignNode(boundary.node));
    }
    let len = tree.node_len(boundary.node);
    if boundary.offset > len {
        return Err(UnwrapError::OffsetOutOfRange {
            offset: boundary.offset,
            len,
        });
    }
    Ok(())
}

pub(crate) fn check_range(tree: &DomTree, range: &Range) -> Result<(), UnwrapError> {
    check_boundary(tree, range.start())?;
    check_boundary(tree, range.end())?;
    match cmp_boundaries(tree, range.start(), range.end()) {
        Some(Ordering::Greater) => Err(UnwrapError::InvertedRange),
        None => Err(UnwrapError::ForeignNode(range.end().node)),
        _ => Ok(()),
    }
}

/// Re-express a boundary sitting on the edge of a node as the equivalent
/// position in an ancestor, so that nodes with nothing outside the range
/// are covered whole instead of being emptied in place. Never lifts out of
/// a node that also holds the other end of the range.
pub(crate) fn lift_start(tree: &DomTree, mut boundary: Boundary, end: Boundary) -> Boundary {
    loop {
        let len = tree.node_len(boundary.node);
        if boundary.offset != 0 && boundary.offset != len {
            return boundary;
        }
        if tree.contains(boundary.node, end.node) {
            return boundary;
        }
        let parent = match tree.parent(boundary.node) {
            Some(parent) => parent,
            None => return boundary,
        };
        let index = tree.index_in_parent(boundary.node).unwrap_or(0);
        let offset = if boundary.offset == 0 { index } else { index + 1 };
        boundary = Boundary::new(parent, offset);
    }
}

/// The end-side counterpart of [`lift_start`].
pub(crate) fn lift_end(tree: &DomTree, mut boundary: Boundary, start: Boundary) -> Boundary {
    loop {
        let len = tree.node_len(boundary.node);
        if boundary.offset != 0 && boundary.offset != len {
            return boundary;
        }
        if tree.contains(boundary.node, start.node) {
            return boundary;
        }
        let parent = match tree.parent(boundary.node) {
            Some(parent) => parent,
            None => return boundary,
        };
        let index = tree.index_in_parent(boundary.node).unwrap_or(0);
        let offset = if boundary.offset == len { index + 1 } else { index };
        boundary = Boundary::new(parent, offset);
    }
}

/// The nodes from `node` up to (excluding) `ancestor`, bottom-up. Empty
/// when the two are the same node.
pub(crate) fn chain_to(tree: &DomTree, ancestor: NodeId, node: NodeId) -> Vec<NodeId> {
    let mut chain = Vec::new();
    let mut cursor = node;
    while cursor != ancestor {
        chain.push(cursor);
        cursor = match tree.parent(cursor) {
            Some(parent) => parent,
            None => break,
        };
    }
    chain
}

/// Detach everything after the boundary described by `(chain, offset)` from
/// the chain's subtree and return it as a single covered piece: the split
/// tail for a text chain bottom, otherwise a fresh shell per chain level.
/// The splices performed on the live tree are appended to `trace`.
pub(crate) fn take_tail(
    tree: &mut DomTree,
    chain: &[NodeId],
    offset: usize,
    trace: &mut Vec<Splice>,
) -> Option<NodeId> {
    let container = match chain.first() {
        Some(&container) => container,
        None => return None,
    };
    // positions of each chain node in its parent, before anything moves
    let indices: Vec<usize> = chain
        .iter()
        .map(|&node| tree.index_in_parent(node).unwrap_or(0))
        .collect();
    let mut piece = if tree.is_text(container) {
        let path = root_path(tree, container);
        trace.push(Splice::Split {
            path: path.clone(),
            at: offset,
        });
        let tail = tree.split_text(container, offset);
        tree.detach(tail);
        let mut parent = path;
        parent.pop();
        trace.push(Splice::Removed {
            parent,
            from: indices[0] + 1,
            to: indices[0] + 2,
        });
        Some(tail)
    } else {
        let covered: Vec<NodeId> = tree.children(container)[offset..].to_vec();
        if covered.is_empty() {
            None
        } else {
            trace.push(Splice::Removed {
                parent: root_path(tree, container),
                from: offset,
                to: offset + covered.len(),
            });
            let tag = tree.tag(container).unwrap_or("").to_owned();
            let shell = tree.create_element(&tag);
            for node in covered {
                tree.detach(node);
                tree.append_child(shell, node);
            }
            Some(shell)
        }
    };
    for (depth, window) in chain.windows(2).enumerate() {
        let level = window[1];
        let following: Vec<NodeId> = tree.children(level)[indices[depth] + 1..].to_vec();
        if piece.is_none() && following.is_empty() {
            continue;
        }
        if !following.is_empty() {
            trace.push(Splice::Removed {
                parent: root_path(tree, level),
                from: indices[depth] + 1,
                to: indices[depth] + 1 + following.len(),
            });
        }
        let tag = tree.tag(level).unwrap_or("").to_owned();
        let shell = tree.create_element(&tag);
        if let Some(deep) = piece {
            tree.append_child(shell, deep);
        }
        for node in following {
            tree.detach(node);
            tree.append_child(shell, node);
        }
        piece = Some(shell);
    }
    piece
}

/// The start-side counterpart of [`take_tail`]: everything before the
/// boundary leaves the chain's subtree.
pub(crate) fn take_head(
    tree: &mut DomTree,
    chain: &[NodeId],
    offset: usize,
    trace: &mut Vec<Splice>,
) -> Option<NodeId> {
    let container = match chain.first() {
        Some(&container) => container,
        None => return None,
    };
    let indices: Vec<usize> = chain
        .iter()
        .map(|&node| tree.index_in_parent(node).unwrap_or(0))
        .collect();
    let mut piece = if tree.is_text(container) {
        let path = root_path(tree, container);
        trace.push(Splice::Split {
            path: path.clone(),
            at: offset,
        });
        tree.split_text(container, offset);
        tree.detach(container);
        let mut parent = path;
        parent.pop();
        trace.push(Splice::Removed {
            parent,
            from: indices[0],
            to: indices[0] + 1,
        });
        Some(container)
    } else {
        let covered: Vec<NodeId> = tree.children(container)[..offset].to_vec();
        if covered.is_empty() {
            None
        } else {
            trace.push(Splice::Removed {
                parent: root_path(tree, container),
                from: 0,
                to: offset,
            });
            let tag = tree.tag(container).unwrap_or("").to_owned();
            let shell = tree.create_element(&tag);
            for node in covered {
                tree.detach(node);
                tree.append_child(shell, node);
            }
            Some(shell)
        }
    };
    for (depth, window) in chain.windows(2).enumerate() {
        let level = window[1];
        let preceding: Vec<NodeId> = tree.children(level)[..indices[depth]].to_vec();
        if piece.is_none() && preceding.is_empty() {
            continue;
        }
        if !preceding.is_empty() {
            trace.push(Splice::Removed {
                parent: root_path(tree, level),
                from: 0,
                to: indices[depth],
            });
        }
        let tag = tree.tag(level).unwrap_or("").to_owned();
        let shell = tree.create_element(&tag);
        for node in preceding {
            tree.detach(node);
            tree.append_child(shell, node);
        }
        if let Some(deep) = piece {
            tree.append_child(shell, deep);
        }
        piece = Some(shell);
    }
    piece
}

/// Detach exactly the content the range spans into a fragment.
///
/// Partially covered text at the boundaries is split, the remainder
/// staying in place; boundary elements that keep content outside the range
/// stay as well, with the covered side moving into a fresh shell of the
/// same tag. Fully covered nodes move whole, keeping their identity. A
/// boundary at the very edge of a node counts as sitting just outside it.
///
/// The range collapses to the splice point. Extracting and reinserting at
/// the same point is the identity on the flattened text.
pub fn extract(tree: &mut DomTree, range: &mut Range) -> Result<Fragment, UnwrapError> {
    let mut trace = Vec::new();
    extract_traced(tree, range, &mut trace)
}

pub(crate) fn extract_traced(
    tree: &mut DomTree,
    range: &mut Range,
    trace: &mut Vec<Splice>,
) -> Result<Fragment, UnwrapError> {
    check_range(tree, range)?;
    if range.is_collapsed() {
        return Ok(Fragment::new());
    }
    let start = lift_start(tree, range.start(), range.end());
    let end = lift_end(tree, range.end(), start);

    // both ends inside one text node
    if start.node == end.node && tree.is_text(start.node) {
        let node = start.node;
        let parent = match tree.parent(node) {
            Some(parent) => parent,
            None => return Err(UnwrapError::ForeignNode(node)),
        };
        let index = tree.index_in_parent(node).unwrap_or(0);
        let path = root_path(tree, node);
        if end.offset < tree.node_len(node) {
            trace.push(Splice::Split {
                path: path.clone(),
                at: end.offset,
            });
            tree.split_text(node, end.offset);
        }
        let (covered, gap) = if start.offset > 0 {
            trace.push(Splice::Split {
                path: path.clone(),
                at: start.offset,
            });
            (tree.split_text(node, start.offset), index + 1)
        } else {
            (node, index)
        };
        tree.detach(covered);
        let mut parent_path = path;
        parent_path.pop();
        trace.push(Splice::Removed {
            parent: parent_path,
            from: gap,
            to: gap + 1,
        });
        *range = Range::collapsed(Boundary::new(parent, gap));
        return Ok(Fragment::from_roots(vec![covered]));
    }

    let probe = Range::new(start, end);
    let ca = match probe.common_ancestor(tree) {
        Some(ca) => ca,
        None => return Err(UnwrapError::ForeignNode(start.node)),
    };
    let start_chain = chain_to(tree, ca, start.node);
    let end_chain = chain_to(tree, ca, end.node);
    let mid_from = match start_chain.last() {
        Some(&top) => tree.index_in_parent(top).unwrap_or(0) + 1,
        None => start.offset,
    };
    let mid_to = match end_chain.last() {
        Some(&top) => tree.index_in_parent(top).unwrap_or(0),
        None => end.offset,
    };
    let middles: Vec<NodeId> = tree.children(ca)[mid_from..mid_to].to_vec();

    let head = take_tail(tree, &start_chain, start.offset, trace);
    let tail = take_head(tree, &end_chain, end.offset, trace);
    if mid_to > mid_from {
        trace.push(Splice::Removed {
            parent: root_path(tree, ca),
            from: mid_from,
            to: mid_to,
        });
    }
    for &node in &middles {
        tree.detach(node);
    }

    let mut roots = Vec::new();
    roots.extend(head);
    roots.extend(middles);
    roots.extend(tail);
    *range = Range::collapsed(Boundary::new(ca, mid_from));
    Ok(Fragment::from_roots(roots))
}

/// Splice the fragment's roots into the tree at the range's start point,
/// splitting a text container at the offset first. The range ends up
/// spanning exactly the inserted roots. Inserting an empty fragment is a
/// no-op that leaves the range untouched.
pub fn insert(tree: &mut DomTree, range: &mut Range, fragment: Fragment) -> Result<(), UnwrapError> {
    let mut trace = Vec::new();
    insert_traced(tree, range, fragment, &mut trace)
}

pub(crate) fn insert_traced(
    tree: &mut DomTree,
    range: &mut Range,
    fragment: Fragment,
    trace: &mut Vec<Splice>,
) -> Result<(), UnwrapError> {
    check_range(tree, range)?;
    if fragment.is_empty() {
        return Ok(());
    }
    let start = range.start();
    let (parent, index) = if tree.is_text(start.node) {
        let parent = match tree.parent(start.node) {
            Some(parent) => parent,
            None => return Err(UnwrapError::ForeignNode(start.node)),
        };
        let at = tree.index_in_parent(start.node).unwrap_or(0);
        if start.offset == 0 {
            (parent, at)
        } else if start.offset == tree.node_len(start.node) {
            (parent, at + 1)
        } else {
            trace.push(Splice::Split {
                path: root_path(tree, start.node),
                at: start.offset,
            });
            tree.split_text(start.node, start.offset);
            (parent, at + 1)
        }
    } else {
        (start.node, start.offset)
    };
    let roots = fragment.take_roots();
    let count = roots.len();
    trace.push(Splice::Inserted {
        parent: root_path(tree, parent),
        at: index,
        count,
    });
    for (shift, root) in roots.into_iter().enumerate() {
        tree.insert_child(parent, index + shift, root);
    }
    *range = Range::new(
        Boundary::new(parent, index),
        Boundary::new(parent, index + count),
    );
    Ok(())
}
