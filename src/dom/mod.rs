//! # The document tree
//!
//! This module holds the arena that documents live in ([`DomTree`]), the
//! handle type for nodes ([`NodeId`]), and the read-side traversal
//! primitives: ancestor search ([`closest`]), tag queries
//! ([`collect_tagged`]) and the lazy document-order iterator
//! ([`DomIterator`]).
//!
//! A document is a tree of element nodes (tag plus ordered children) and
//! text leaves. Nodes are addressed by id; the tree maintains the parent
//! backlink, so there are no cyclic references to keep consistent and a
//! detached subtree is simply one whose topmost node has no parent.

mod fragment;
mod iter;
mod node;
mod query;
mod tree;

pub use fragment::Fragment;
pub use iter::DomIterator;
pub use node::NodeId;
pub use query::{closest, closest_tag, collect_tagged};
pub use tree::DomTree;

pub(crate) use node::{tag_eq, NodeData};
