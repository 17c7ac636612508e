//! # Helpers
//!
//! This module contains some functions to create trees programmatically,
//! and [`NodeSpec`], a plain-data description of a subtree that can be
//! serialized, compared, and turned into a [`DomTree`].
//!
//! See also: <https://github.com/prosemirror/prosemirror-test-builder>

use crate::dom::{DomTree, NodeId};
use serde::{Deserialize, Serialize};

/// A plain-data description of a subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeSpec {
    /// A text node
    Text(String),
    /// An element with a tag and children
    Element {
        /// The tag name
        tag: String,
        /// The child nodes, in order
        #[serde(default)]
        children: Vec<NodeSpec>,
    },
}

impl NodeSpec {
    /// Read the subtree under a node back into a spec value.
    pub fn from_tree(tree: &DomTree, node: NodeId) -> NodeSpec {
        if let Some(text) = tree.text(node) {
            return NodeSpec::Text(text.to_owned());
        }
        NodeSpec::Element {
            tag: tree.tag(node).unwrap_or("").to_owned(),
            children: tree
                .children(node)
                .iter()
                .map(|&child| NodeSpec::from_tree(tree, child))
                .collect(),
        }
    }
}

impl From<&str> for NodeSpec {
    fn from(text: &str) -> NodeSpec {
        NodeSpec::Text(text.to_owned())
    }
}

impl From<String> for NodeSpec {
    fn from(text: String) -> NodeSpec {
        NodeSpec::Text(text)
    }
}

/// The children of an element spec under construction.
#[derive(Debug, Default)]
pub struct Content(Vec<NodeSpec>);

impl From<()> for Content {
    fn from(_: ()) -> Self {
        Content(Vec::new())
    }
}

impl From<Vec<NodeSpec>> for Content {
    fn from(children: Vec<NodeSpec>) -> Self {
        Content(children)
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content(vec![NodeSpec::from(text)])
    }
}

impl<A> From<(A,)> for Content
where
    A: Into<NodeSpec>,
{
    fn from((a,): (A,)) -> Self {
        Content(vec![a.into()])
    }
}

impl<A, B> From<(A, B)> for Content
where
    A: Into<NodeSpec>,
    B: Into<NodeSpec>,
{
    fn from((a, b): (A, B)) -> Self {
        Content(vec![a.into(), b.into()])
    }
}

impl<A, B, C> From<(A, B, C)> for Content
where
    A: Into<NodeSpec>,
    B: Into<NodeSpec>,
    C: Into<NodeSpec>,
{
    fn from((a, b, c): (A, B, C)) -> Self {
        Content(vec![a.into(), b.into(), c.into()])
    }
}

impl<A, B, C, D> From<(A, B, C, D)> for Content
where
    A: Into<NodeSpec>,
    B: Into<NodeSpec>,
    C: Into<NodeSpec>,
    D: Into<NodeSpec>,
{
    fn from((a, b, c, d): (A, B, C, D)) -> Self {
        Content(vec![a.into(), b.into(), c.into(), d.into()])
    }
}

/// Create an element spec with the given tag.
pub fn el<A: Into<Content>>(tag: &str, content: A) -> NodeSpec {
    NodeSpec::Element {
        tag: tag.to_owned(),
        children: content.into().0,
    }
}

/// Create a `<div>` element spec.
pub fn div<A: Into<Content>>(content: A) -> NodeSpec {
    el("div", content)
}

/// Create a `<p>` element spec.
pub fn p<A: Into<Content>>(content: A) -> NodeSpec {
    el("p", content)
}

/// Create a `<b>` element spec.
pub fn b<A: Into<Content>>(content: A) -> NodeSpec {
    el("b", content)
}

/// Create an `<i>` element spec.
pub fn i<A: Into<Content>>(content: A) -> NodeSpec {
    el("i", content)
}

/// Create an `<em>` element spec.
pub fn em<A: Into<Content>>(content: A) -> NodeSpec {
    el("em", content)
}

/// Create a `<strong>` element spec.
pub fn strong<A: Into<Content>>(content: A) -> NodeSpec {
    el("strong", content)
}

/// Create a `<span>` element spec.
pub fn span<A: Into<Content>>(content: A) -> NodeSpec {
    el("span", content)
}

/// Create a `<ul>` element spec.
pub fn ul<A: Into<Content>>(content: A) -> NodeSpec {
    el("ul", content)
}

/// Create an `<li>` element spec.
pub fn li<A: Into<Content>>(content: A) -> NodeSpec {
    el("li", content)
}

/// Build a tree from a spec.
///
/// Panics if the root of the spec is a text node.
pub fn build(spec: NodeSpec) -> DomTree {
    match spec {
        NodeSpec::Text(_) => panic!("the root of a tree must be an element"),
        NodeSpec::Element { tag, children } => {
            let mut tree = DomTree::new(&tag);
            let root = tree.root();
            for child in children {
                build_into(&mut tree, root, child);
            }
            tree
        }
    }
}

fn build_into(tree: &mut DomTree, parent: NodeId, spec: NodeSpec) {
    match spec {
        NodeSpec::Text(text) => {
            let node = tree.create_text(&text);
            tree.append_child(parent, node);
        }
        NodeSpec::Element { tag, children } => {
            let node = tree.create_element(&tag);
            tree.append_child(parent, node);
            for child in children {
                build_into(tree, node, child);
            }
        }
    }
}
