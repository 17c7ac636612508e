//! # Structural transforms
//!
//! The operations that restructure a tree around a [`Range`](crate::range::Range):
//!
//! - [`extract`] / [`insert`] move the spanned content out of and back into
//!   the tree,
//! - [`unwrap_node`] replaces an element by its children,
//! - [`wrap_range`] puts the spanned content into a fresh element,
//! - [`unwrap`] is the composite: it removes every element of a target tag
//!   overlapping a range, re-wraps the portions that reach outside the
//!   range, and returns an equivalent range into the changed tree.
//!
//! All of them keep the tree well-formed at every return and report
//! malformed input through [`UnwrapError`] instead of panicking.

mod map;
mod splice;
mod unwrap;
mod wrap;

pub use splice::{extract, insert};
pub use unwrap::{unwrap, unwrap_node, BlockTags, UnwrapOptions, ZERO_WIDTH_SPACE};
pub use wrap::wrap_range;

use crate::dom::NodeId;
use crate::range::PersistError;
use displaydoc::Display;
use thiserror::Error;

/// The error type for structural transforms
#[derive(Debug, Display, Error, PartialEq, Eq)]
pub enum UnwrapError {
    /// boundary node {0:?} is not part of the tree
    ForeignNode(NodeId),
    /// offset {offset} does not fit in a node of length {len}
    OffsetOutOfRange {
        /// The offending boundary offset
        offset: usize,
        /// The length of its container
        len: usize,
    },
    /// range start comes after its end
    InvertedRange,
    /// the configured root does not contain the range
    RootNotAncestor,
    /// {0:?} has no parent to receive its children
    Unparented(NodeId),
    /// could not restore a saved range
    Persist(#[from] PersistError),
}
