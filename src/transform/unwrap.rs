//! # The unwrap operation
//!
//! [`unwrap_node`] is the primitive: one element out, its children in its
//! place. [`unwrap`] is the full operation: remove every element of a
//! target tag overlapping a range, partitioned at block boundaries, with
//! the parts of a removed element's span that reach outside the range
//! re-wrapped, and an equivalent range reported back even though the
//! original boundary nodes may no longer exist.
//!
//! The collapsed case follows a separate protocol: the enclosing element
//! is removed, its span re-wrapped around the caret, and a zero-width
//! marker placed at the caret so that continued typing lands outside the
//! removed formatting instead of recreating it.

use crate::dom::{closest, closest_tag, collect_tagged, tag_eq, DomIterator, DomTree, Fragment, NodeId};
use crate::range::{save, Boundary, Range, SavedRange};
use crate::transform::map::{rewrite_all, Bias, Splice};
use crate::transform::splice::{check_range, extract_traced, insert, insert_traced, root_path};
use crate::transform::wrap::{wrap_range, wrap_range_traced};
use crate::transform::UnwrapError;
use log::debug;
use std::collections::HashSet;
use std::iter::FromIterator;

/// The character placed inside a caret marker. Invisible, but it gives the
/// caret a text position to sit in outside the removed element.
pub const ZERO_WIDTH_SPACE: &str = "\u{200B}";

const DEFAULT_BLOCK_TAGS: &[&str] = &[
    "address",
    "article",
    "aside",
    "audio",
    "blockquote",
    "canvas",
    "dd",
    "div",
    "dl",
    "dt",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hgroup",
    "hr",
    "li",
    "main",
    "nav",
    "noscript",
    "ol",
    "output",
    "p",
    "pre",
    "section",
    "table",
    "tbody",
    "td",
    "tfoot",
    "th",
    "thead",
    "tr",
    "ul",
    "video",
];

/// The set of tags a selection must not cross when it is partitioned into
/// per-block sub-ranges.
///
/// The default set covers paragraph-like containers, headings, list and
/// table items. Matching is ASCII case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockTags {
    tags: HashSet<String>,
}

impl BlockTags {
    /// An empty set: nothing is treated as a block boundary.
    pub fn none() -> BlockTags {
        BlockTags {
            tags: HashSet::new(),
        }
    }

    /// Whether the tag is in the set.
    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(&tag.to_ascii_lowercase())
    }

    /// Add a tag to the set.
    pub fn insert(&mut self, tag: &str) {
        self.tags.insert(tag.to_ascii_lowercase());
    }
}

impl Default for BlockTags {
    fn default() -> BlockTags {
        BlockTags {
            tags: HashSet::from_iter(DEFAULT_BLOCK_TAGS.iter().map(|t| (*t).to_owned())),
        }
    }
}

impl<'a> FromIterator<&'a str> for BlockTags {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> BlockTags {
        let mut tags = BlockTags::none();
        for tag in iter {
            tags.insert(tag);
        }
        tags
    }
}

/// Configuration for [`unwrap`].
#[derive(Debug, Clone)]
pub struct UnwrapOptions {
    /// Ancestor searches for the target tag stop after considering this
    /// node. `None` walks up to the tree root.
    pub root: Option<NodeId>,
    /// The block classifier used to partition the range.
    pub blocks: BlockTags,
    /// The tag of the zero-width caret marker created in the collapsed
    /// case.
    pub marker_tag: String,
}

impl Default for UnwrapOptions {
    fn default() -> UnwrapOptions {
        UnwrapOptions {
            root: None,
            blocks: BlockTags::default(),
            marker_tag: "span".to_owned(),
        }
    }
}

/// Remove an element, reinserting its children in its place.
///
/// With the default `target_parent` of `None` (or the node's own parent),
/// the children take over the node's slot in original order. With an
/// explicit different parent they are appended to it instead. Returns the
/// range spanning exactly the reinserted children; this is how callers
/// recover what used to be inside the node after the node itself is gone.
///
/// Fails with [`UnwrapError::Unparented`] for a detached node and no
/// explicit parent; the tree root cannot be unwrapped.
pub fn unwrap_node(
    tree: &mut DomTree,
    node: NodeId,
    target_parent: Option<NodeId>,
) -> Result<Range, UnwrapError> {
    if !tree.exists(node) {
        return Err(UnwrapError::ForeignNode(node));
    }
    let parent = tree.parent(node);
    let children = tree.children(node).to_vec();
    match (target_parent, parent) {
        (Some(target), _) if Some(target) != parent => {
            if !tree.exists(target) {
                return Err(UnwrapError::ForeignNode(target));
            }
            let from = tree.child_count(target);
            for &child in &children {
                tree.detach(child);
                tree.append_child(target, child);
            }
            tree.remove(node);
            Ok(Range::new(
                Boundary::new(target, from),
                Boundary::new(target, from + children.len()),
            ))
        }
        (_, Some(parent)) => {
            let index = tree.index_in_parent(node).unwrap_or(0);
            tree.detach(node);
            for (shift, &child) in children.iter().enumerate() {
                tree.detach(child);
                tree.insert_child(parent, index + shift, child);
            }
            tree.remove(node);
            Ok(Range::new(
                Boundary::new(parent, index),
                Boundary::new(parent, index + children.len()),
            ))
        }
        (_, None) => Err(UnwrapError::Unparented(node)),
    }
}

/// In-place unwrap that reports the splice it performed.
fn unwrap_node_traced(
    tree: &mut DomTree,
    node: NodeId,
    trace: &mut Vec<Splice>,
) -> Result<Range, UnwrapError> {
    let record = Splice::Unwrapped {
        path: root_path(tree, node),
        children: tree.child_count(node),
    };
    let outer = unwrap_node(tree, node, None)?;
    trace.push(record);
    Ok(outer)
}

/// Remove every element of `tag` whose span overlaps `range`.
///
/// Content outside the range keeps its formatting: where a removed element
/// extended beyond the range, the protruding part is re-wrapped in a fresh
/// element of the same tag. The tree is mutated in place; the returned
/// range denotes the same text span as the input did, re-expressed against
/// the changed tree.
///
/// A collapsed range removes the enclosing element (if any) and leaves the
/// caret in a zero-width marker beside the re-wrapped content, so that
/// subsequent insertions land outside the removed formatting. Without an
/// enclosing element the collapsed call is a no-op.
///
/// The range must belong to `tree` with start before end, and
/// `options.root`, when set, must contain it; violations fail fast without
/// mutating.
pub fn unwrap(
    tree: &mut DomTree,
    range: &Range,
    tag: &str,
    options: &UnwrapOptions,
) -> Result<Range, UnwrapError> {
    check_range(tree, range)?;
    if let Some(root) = options.root {
        if !tree.contains(root, range.start().node) || !tree.contains(root, range.end().node) {
            return Err(UnwrapError::RootNotAncestor);
        }
    }
    if range.is_collapsed() {
        unwrap_collapsed(tree, *range, tag, options)
    } else {
        unwrap_spanning(tree, *range, tag, options)
    }
}

fn unwrap_collapsed(
    tree: &mut DomTree,
    range: Range,
    tag: &str,
    options: &UnwrapOptions,
) -> Result<Range, UnwrapError> {
    debug!("unwrapping collapsed range");
    let node = match closest_tag(tree, range.start().node, true, options.root, tag) {
        Some(node) => node,
        None => return Ok(range),
    };
    debug!("found enclosing <{}> element {:?}", tag, node);
    let root = tree.root();
    let (claimed, caret) = claim_marker(tree, range.start(), &options.marker_tag, node);

    let saved = save(tree, &Range::collapsed(caret), root)?;
    let mut trace = Vec::new();
    let outer = unwrap_node_traced(tree, node, &mut trace)?;
    let saved = rewrite_all(&trace, saved, Bias::Before, Bias::Before);
    let mut caret = saved.load(tree)?.start();
    let mut outer_end = outer.end();

    // re-wrap the span on each side of the caret, leaving a seam for the
    // marker between the two wrappers
    let left = Range::new(outer.start(), caret);
    if !left.visible_text(tree).is_empty() {
        debug!("re-wrapping span before the caret in <{}>", tag);
        let saved_end = save(tree, &Range::collapsed(outer_end), root)?;
        let mut left = left;
        let mut trace = Vec::new();
        wrap_range_traced(tree, &mut left, tag, &mut trace)?;
        // the caret leaves the re-wrapped span and sits right after the
        // fresh wrapper
        caret = left.end();
        outer_end = rewrite_all(&trace, saved_end, Bias::After, Bias::After)
            .load(tree)?
            .start();
    }
    let right = Range::new(caret, outer_end);
    if !right.visible_text(tree).is_empty() {
        debug!("re-wrapping span after the caret in <{}>", tag);
        let mut right = right;
        wrap_range(tree, &mut right, tag)?;
        caret = right.start();
    }

    let marker = match claimed {
        Some(marker) => marker,
        None => create_marker(tree, &options.marker_tag),
    };
    let mut point = Range::collapsed(caret);
    insert(tree, &mut point, Fragment::from_roots(vec![marker]))?;
    let text = tree.child(marker, 0).ok_or(UnwrapError::ForeignNode(marker))?;
    Ok(Range::collapsed(Boundary::new(text, tree.node_len(text))))
}

fn unwrap_spanning(
    tree: &mut DomTree,
    range: Range,
    tag: &str,
    options: &UnwrapOptions,
) -> Result<Range, UnwrapError> {
    let root = tree.root();
    let mut saved = save(tree, &range, root)?;
    let end_node = range.end().node;
    let mut working = range;
    let mut iter = DomIterator::new(range.start().node);
    let mut cursor = Some(range.start().node);
    let mut prev_block: Option<NodeId> = None;

    while let Some(node) = cursor {
        let block = closest(tree, node, true, None, |t, id| {
            t.tag(id).map_or(false, |name| options.blocks.contains(name))
        });
        if let (Some(prev), Some(block)) = (prev_block, block) {
            if prev != block {
                debug!("block boundary after {:?}", prev);
                if tree.parent(prev).is_some() {
                    working.set_end_after(tree, prev);
                } else {
                    working.set_end_before(tree, block);
                }
                do_range(tree, &mut saved, working, tag, options)?;

                working = saved.load(tree)?;
                if tree.parent(block).is_some() {
                    working.set_start_before(tree, block);
                } else if tree.exists(prev) && tree.parent(prev).is_some() {
                    working.set_start_after(tree, prev);
                }
            }
        }
        prev_block = block;
        if tree.contains(end_node, node) {
            break;
        }
        cursor = iter.next_text(tree);
    }
    do_range(tree, &mut saved, working, tag, options)?;

    let mut result = saved.load(tree)?;
    result.normalize(tree);
    Ok(result)
}

/// Process one block-local sub-range: unwrap the enclosing target element
/// (re-wrapping its protruding span), then extract the sub-range, unwrap
/// every target element inside the detached fragment, and splice it back.
/// `saved_overall` is kept in step with every splice performed.
fn do_range(
    tree: &mut DomTree,
    saved_overall: &mut SavedRange,
    working: Range,
    tag: &str,
    options: &UnwrapOptions,
) -> Result<(), UnwrapError> {
    let root = tree.root();
    let mut working = working;
    working.normalize(tree);
    debug!("do_range() {:?}", working.visible_text(tree));

    let ca = working
        .common_ancestor(tree)
        .ok_or_else(|| UnwrapError::ForeignNode(working.start().node))?;
    if let Some(found) = closest_tag(tree, ca, true, options.root, tag) {
        debug!("found <{}> common ancestor element {:?}", tag, found);
        let mut saved_working = save(tree, &working, root)?;
        let mut trace = Vec::new();
        let outer = unwrap_node_traced(tree, found, &mut trace)?;
        *saved_overall = rewrite_all(&trace, saved_overall.clone(), Bias::Before, Bias::After);
        saved_working = rewrite_all(&trace, saved_working, Bias::Before, Bias::After);
        working = saved_working.load(tree)?;
        let mut outer_end = outer.end();

        // ties at the seam belong after the left wrapper and before the
        // right one: the wrappers hold unselected content
        let left = Range::new(outer.start(), working.start());
        if !left.visible_text(tree).is_empty() {
            debug!("re-wrapping left-hand side with new <{}> node", tag);
            let saved_end = save(tree, &Range::collapsed(outer_end), root)?;
            let mut left = left;
            let mut trace = Vec::new();
            wrap_range_traced(tree, &mut left, tag, &mut trace)?;
            *saved_overall = rewrite_all(&trace, saved_overall.clone(), Bias::After, Bias::After);
            saved_working = rewrite_all(&trace, saved_working, Bias::After, Bias::After);
            outer_end = rewrite_all(&trace, saved_end, Bias::After, Bias::After)
                .load(tree)?
                .start();
            working = saved_working.load(tree)?;
        }
        let right = Range::new(working.end(), outer_end);
        if !right.visible_text(tree).is_empty() {
            debug!("re-wrapping right-hand side with new <{}> node", tag);
            let mut right = right;
            let mut trace = Vec::new();
            wrap_range_traced(tree, &mut right, tag, &mut trace)?;
            *saved_overall = rewrite_all(&trace, saved_overall.clone(), Bias::Before, Bias::Before);
            saved_working = rewrite_all(&trace, saved_working, Bias::Before, Bias::Before);
            working = saved_working.load(tree)?;
        }
    }

    let mut trace = Vec::new();
    let mut region = working;
    let mut fragment = extract_traced(tree, &mut region, &mut trace)?;
    let targets = collect_tagged(tree, fragment.roots(), tag);
    debug!("{} <{}> elements to unwrap", targets.len(), tag);
    for target in targets {
        unwrap_in_fragment(tree, &mut fragment, target)?;
    }
    insert_traced(tree, &mut region, fragment, &mut trace)?;
    *saved_overall = rewrite_all(&trace, saved_overall.clone(), Bias::Before, Bias::After);
    Ok(())
}

/// Unwrap one element inside a detached fragment. Fragment roots are
/// replaced by their children in the root list; deeper elements unwrap in
/// place. The fragment has no outstanding range references to preserve, so
/// no splice bookkeeping is needed.
fn unwrap_in_fragment(
    tree: &mut DomTree,
    fragment: &mut Fragment,
    node: NodeId,
) -> Result<(), UnwrapError> {
    if let Some(index) = fragment.root_index(node) {
        let children = tree.children(node).to_vec();
        for &child in &children {
            tree.detach(child);
        }
        fragment.splice_root(index, &children);
        tree.remove(node);
        Ok(())
    } else {
        unwrap_node(tree, node, None).map(|_| ())
    }
}

fn is_marker(tree: &DomTree, id: NodeId, marker_tag: &str) -> bool {
    if !matches!(tree.tag(id), Some(t) if tag_eq(t, marker_tag)) {
        return false;
    }
    if tree.child_count(id) != 1 {
        return false;
    }
    match tree.child(id, 0) {
        Some(child) => tree.text(child) == Some(ZERO_WIDTH_SPACE),
        None => false,
    }
}

/// Detach an existing caret marker adjacent to (or containing) the caret
/// so it can be re-placed after the mutation, and report the caret
/// position with the marker gone. `exclude` is the element about to be
/// unwrapped; it is never claimed even when it looks like a marker.
fn claim_marker(
    tree: &mut DomTree,
    caret: Boundary,
    marker_tag: &str,
    exclude: NodeId,
) -> (Option<NodeId>, Boundary) {
    // caret inside the marker's text node
    if tree.is_text(caret.node) {
        if let Some(parent) = tree.parent(caret.node) {
            if parent != exclude && is_marker(tree, parent, marker_tag) {
                if let (Some(grandparent), Some(index)) =
                    (tree.parent(parent), tree.index_in_parent(parent))
                {
                    tree.detach(parent);
                    return (Some(parent), Boundary::new(grandparent, index));
                }
            }
        }
        if caret.offset == 0 {
            if let Some(prev) = tree.prev_sibling(caret.node) {
                if prev != exclude && is_marker(tree, prev, marker_tag) {
                    tree.detach(prev);
                    return (Some(prev), caret);
                }
            }
        }
        if caret.offset == tree.node_len(caret.node) {
            if let Some(next) = tree.next_sibling(caret.node) {
                if next != exclude && is_marker(tree, next, marker_tag) {
                    tree.detach(next);
                    return (Some(next), caret);
                }
            }
        }
        return (None, caret);
    }
    // caret on the marker element itself
    if caret.node != exclude && is_marker(tree, caret.node, marker_tag) {
        if let (Some(parent), Some(index)) =
            (tree.parent(caret.node), tree.index_in_parent(caret.node))
        {
            let marker = caret.node;
            tree.detach(marker);
            return (Some(marker), Boundary::new(parent, index));
        }
    }
    // caret between children of an element
    if let Some(at) = tree.child(caret.node, caret.offset) {
        if at != exclude && is_marker(tree, at, marker_tag) {
            tree.detach(at);
            return (Some(at), caret);
        }
    }
    if caret.offset > 0 {
        if let Some(before) = tree.child(caret.node, caret.offset - 1) {
            if before != exclude && is_marker(tree, before, marker_tag) {
                tree.detach(before);
                return (Some(before), Boundary::new(caret.node, caret.offset - 1));
            }
        }
    }
    (None, caret)
}

fn create_marker(tree: &mut DomTree, marker_tag: &str) -> NodeId {
    let marker = tree.create_element(marker_tag);
    let text = tree.create_text(ZERO_WIDTH_SPACE);
    tree.append_child(marker, text);
    marker
}

#[cfg(test)]
mod tests {
    use super::{unwrap, unwrap_node, BlockTags, UnwrapOptions, ZERO_WIDTH_SPACE};
    use crate::helper::{b, build, div, el, em, i, p, strong};
    use crate::range::{Boundary, Range};
    use crate::transform::UnwrapError;
    use pretty_assertions::assert_eq;

    fn opts() -> UnwrapOptions {
        UnwrapOptions::default()
    }

    #[test]
    fn test_selecting_a_b_element() {
        let mut tree = build(div((b(("hello worl",)), "d")));
        let root = tree.root();
        let b1 = tree.child(root, 0).unwrap();

        let range = Range::select_node(&tree, b1);
        assert_eq!(range.text(&tree), "hello worl");

        let range = unwrap(&mut tree, &range, "b", &opts()).unwrap();

        assert_eq!(tree.inner_html(root), "hello world");
        assert_eq!(range.text(&tree), "hello worl");
        assert_eq!(range.start(), Boundary::new(tree.child(root, 0).unwrap(), 0));
        assert_eq!(range.end(), Boundary::new(tree.child(root, 0).unwrap(), 10));
    }

    #[test]
    fn test_selecting_text_within_a_b_element() {
        let mut tree = build(div(("h", b(("ello worl",)), "d")));
        let root = tree.root();
        let t = tree.node_at_path(root, &[1, 0]).unwrap();

        let range = Range::new(Boundary::new(t, 0), Boundary::new(t, 9));
        assert_eq!(range.text(&tree), "ello worl");

        let range = unwrap(&mut tree, &range, "b", &opts()).unwrap();

        assert_eq!(tree.inner_html(root), "hello world");
        assert_eq!(range.text(&tree), "ello worl");
        // the text node survives the unwrap, one level up
        assert_eq!(range.start(), Boundary::new(t, 0));
        assert_eq!(range.end(), Boundary::new(t, 9));
        assert_eq!(tree.child(root, 1), Some(t));
    }

    #[test]
    fn test_selecting_multiple_b_elements() {
        let mut tree = build(div(vec![
            "h".into(),
            b(("e",)),
            "l".into(),
            i(("l",)),
            "o ".into(),
            b(("w",)),
            "or".into(),
            i(("l",)),
            "d".into(),
        ]));
        let root = tree.root();
        let first = tree.child(root, 0).unwrap();
        let last = tree.child(root, 8).unwrap();

        let range = Range::new(Boundary::new(first, 0), Boundary::new(last, 1));
        assert_eq!(range.text(&tree), "hello world");

        let range = unwrap(&mut tree, &range, "b", &opts()).unwrap();

        assert_eq!(tree.inner_html(root), "hel<i>l</i>o wor<i>l</i>d");
        assert_eq!(range.text(&tree), "hello world");
        assert_eq!(range.start(), Boundary::new(tree.child(root, 0).unwrap(), 0));
        assert_eq!(range.end(), Boundary::new(last, 1));
    }

    #[test]
    fn test_selecting_part_of_a_b_element() {
        let mut tree = build(div(("he", b(("ll",)), "o")));
        let root = tree.root();
        let t_he = tree.child(root, 0).unwrap();
        let t_ll = tree.node_at_path(root, &[1, 0]).unwrap();

        let range = Range::new(Boundary::new(t_he, 1), Boundary::new(t_ll, 1));
        assert_eq!(range.text(&tree), "el");

        let range = unwrap(&mut tree, &range, "b", &opts()).unwrap();

        assert_eq!(tree.inner_html(root), "hel<b>l</b>o");
        assert_eq!(range.visible_text(&tree), "el");
    }

    #[test]
    fn test_selecting_all_text_within_a_b_element() {
        let mut tree = build(div((b(("hello worl",)), "d")));
        let root = tree.root();
        let b1 = tree.child(root, 0).unwrap();

        let range = Range::select_node_contents(&tree, b1);
        assert_eq!(range.text(&tree), "hello worl");

        let range = unwrap(&mut tree, &range, "b", &opts()).unwrap();

        assert_eq!(tree.inner_html(root), "hello world");
        assert_eq!(range.text(&tree), "hello worl");
    }

    #[test]
    fn test_selecting_the_first_two_chars() {
        let mut tree = build(div((b(("hello worl",)), "d")));
        let root = tree.root();
        let t = tree.node_at_path(root, &[0, 0]).unwrap();

        let range = Range::new(Boundary::new(t, 0), Boundary::new(t, 2));
        assert_eq!(range.text(&tree), "he");

        let range = unwrap(&mut tree, &range, "b", &opts()).unwrap();

        assert_eq!(tree.inner_html(root), "he<b>llo worl</b>d");
        assert_eq!(range.visible_text(&tree), "he");
    }

    #[test]
    fn test_selecting_the_middle_two_chars() {
        let mut tree = build(div((b(("hello worl",)), "d")));
        let root = tree.root();
        let t = tree.node_at_path(root, &[0, 0]).unwrap();

        let range = Range::new(Boundary::new(t, 2), Boundary::new(t, 4));
        assert_eq!(range.text(&tree), "ll");

        let range = unwrap(&mut tree, &range, "b", &opts()).unwrap();

        assert_eq!(tree.inner_html(root), "<b>he</b>ll<b>o worl</b>d");
        assert_eq!(range.visible_text(&tree), "ll");
    }

    #[test]
    fn test_selecting_the_last_two_chars() {
        let mut tree = build(div((b(("hello worl",)), "d")));
        let root = tree.root();
        let t = tree.node_at_path(root, &[0, 0]).unwrap();

        let range = Range::new(Boundary::new(t, 8), Boundary::new(t, 10));
        assert_eq!(range.text(&tree), "rl");

        let range = unwrap(&mut tree, &range, "b", &opts()).unwrap();

        assert_eq!(tree.inner_html(root), "<b>hello wo</b>rld");
        assert_eq!(range.visible_text(&tree), "rl");
    }

    #[test]
    fn test_spanning_across_block_elements() {
        let mut tree = build(div((p((b(("hello",)),)), p((b(("world",)),)))));
        let root = tree.root();
        let t1 = tree.node_at_path(root, &[0, 0, 0]).unwrap();
        let t2 = tree.node_at_path(root, &[1, 0, 0]).unwrap();

        let range = Range::new(Boundary::new(t1, 3), Boundary::new(t2, 3));
        assert_eq!(range.text(&tree), "lowor");

        let range = unwrap(&mut tree, &range, "b", &opts()).unwrap();

        assert_eq!(
            tree.inner_html(root),
            "<p><b>hel</b>lo</p><p>wor<b>ld</b></p>"
        );
        assert_eq!(range.visible_text(&tree), "lowor");
    }

    #[test]
    fn test_target_spanning_two_blocks() {
        // a single <b> stretching over the block boundary: the first
        // sub-range re-wraps the trailing block, the second one must find
        // that wrapper again and free the selected text inside it
        let mut tree = build(div((b((p(("hello",)), p(("world",)))),)));
        let root = tree.root();
        let t1 = tree.node_at_path(root, &[0, 0, 0]).unwrap();
        let t2 = tree.node_at_path(root, &[0, 1, 0]).unwrap();

        let range = Range::new(Boundary::new(t1, 3), Boundary::new(t2, 3));
        assert_eq!(range.text(&tree), "lowor");

        let range = unwrap(&mut tree, &range, "b", &opts()).unwrap();

        assert_eq!(
            tree.inner_html(root),
            "<b><p>hel</p></b><p>lo</p><p>wor</p><b><p>ld</p></b>"
        );
        assert_eq!(range.visible_text(&tree), "lowor");
        assert_eq!(tree.text_content(root), "helloworld");
    }

    #[test]
    fn test_nested_inside_another_inline_element() {
        let mut tree = build(div((p((em((strong(("hello",)),)),)),)));
        let root = tree.root();
        let t = tree.node_at_path(root, &[0, 0, 0, 0]).unwrap();

        let range = Range::new(Boundary::new(t, 0), Boundary::new(t, 5));
        assert_eq!(range.text(&tree), "hello");

        let range = unwrap(&mut tree, &range, "em", &opts()).unwrap();

        assert_eq!(tree.inner_html(root), "<p><strong>hello</strong></p>");
        assert_eq!(range.text(&tree), "hello");
    }

    #[test]
    fn test_no_matching_element_leaves_the_tree_alone() {
        let mut tree = build(div(("hello",)));
        let root = tree.root();
        let t = tree.child(root, 0).unwrap();

        let range = Range::new(Boundary::new(t, 1), Boundary::new(t, 4));
        let range = unwrap(&mut tree, &range, "b", &opts()).unwrap();

        assert_eq!(tree.inner_html(root), "hello");
        assert_eq!(range.visible_text(&tree), "ell");
    }

    #[test]
    fn test_tag_matching_is_case_insensitive() {
        let mut tree = build(div((el("B", ("hi",)),)));
        let root = tree.root();
        let b1 = tree.child(root, 0).unwrap();

        let range = Range::select_node(&tree, b1);
        unwrap(&mut tree, &range, "b", &opts()).unwrap();
        assert_eq!(tree.inner_html(root), "hi");
    }

    #[test]
    fn test_without_block_partitioning() {
        let mut tree = build(div((p((b(("hello",)),)), p((b(("world",)),)))));
        let root = tree.root();
        let t1 = tree.node_at_path(root, &[0, 0, 0]).unwrap();
        let t2 = tree.node_at_path(root, &[1, 0, 0]).unwrap();

        let options = UnwrapOptions {
            blocks: BlockTags::none(),
            ..UnwrapOptions::default()
        };
        let range = Range::new(Boundary::new(t1, 0), Boundary::new(t2, 5));
        let range = unwrap(&mut tree, &range, "b", &options).unwrap();

        assert_eq!(tree.inner_html(root), "<p>hello</p><p>world</p>");
        assert_eq!(range.visible_text(&tree), "helloworld");
    }

    #[test]
    fn test_collapsed_without_enclosing_element_is_a_noop() {
        let mut tree = build(div((p(("hello",)),)));
        let root = tree.root();
        let t = tree.node_at_path(root, &[0, 0]).unwrap();

        let caret = Range::collapsed(Boundary::new(t, 2));
        let result = unwrap(&mut tree, &caret, "b", &opts()).unwrap();

        assert_eq!(tree.inner_html(root), "<p>hello</p>");
        assert_eq!(result, caret);
    }

    #[test]
    fn test_collapsed_caret_at_the_end() {
        let mut tree = build(div((p((i(("hello",)),)),)));
        let root = tree.root();
        let t = tree.node_at_path(root, &[0, 0, 0]).unwrap();

        let caret = Range::collapsed(Boundary::new(t, 5));
        let result = unwrap(&mut tree, &caret, "i", &opts()).unwrap();

        assert_eq!(
            tree.inner_html(root),
            "<p><i>hello</i><span>\u{200B}</span></p>"
        );
        let marker_text = tree.node_at_path(root, &[0, 1, 0]).unwrap();
        assert_eq!(result, Range::collapsed(Boundary::new(marker_text, 1)));
    }

    #[test]
    fn test_collapsed_caret_at_the_start() {
        let mut tree = build(div((p((i(("hello",)), " world")),)));
        let root = tree.root();
        let t = tree.node_at_path(root, &[0, 0, 0]).unwrap();

        let caret = Range::collapsed(Boundary::new(t, 0));
        let result = unwrap(&mut tree, &caret, "i", &opts()).unwrap();

        assert_eq!(
            tree.inner_html(root),
            "<p><span>\u{200B}</span><i>hello</i> world</p>"
        );
        let marker_text = tree.node_at_path(root, &[0, 0, 0]).unwrap();
        assert_eq!(result, Range::collapsed(Boundary::new(marker_text, 1)));
    }

    #[test]
    fn test_collapsed_caret_in_the_middle() {
        let mut tree = build(div((i((b(("test",)),)),)));
        let root = tree.root();
        let t = tree.node_at_path(root, &[0, 0, 0]).unwrap();

        let caret = Range::collapsed(Boundary::new(t, 2));
        let result = unwrap(&mut tree, &caret, "i", &opts()).unwrap();

        assert_eq!(
            tree.inner_html(root),
            "<i><b>te</b></i><span>\u{200B}</span><i><b>st</b></i>"
        );
        let marker_text = tree.node_at_path(root, &[1, 0]).unwrap();
        assert_eq!(result, Range::collapsed(Boundary::new(marker_text, 1)));
    }

    #[test]
    fn test_collapsed_caret_in_an_empty_element() {
        let mut tree = build(div((p((b(("x",)), el("i", ()))),)));
        let root = tree.root();
        let i1 = tree.node_at_path(root, &[0, 1]).unwrap();

        let caret = Range::collapsed(Boundary::new(i1, 0));
        unwrap(&mut tree, &caret, "i", &opts()).unwrap();

        assert_eq!(
            tree.inner_html(root),
            "<p><b>x</b><span>\u{200B}</span></p>"
        );
    }

    #[test]
    fn test_collapsed_reuses_an_adjacent_marker() {
        let mut tree = build(div((b((i(("hi",)),)),)));
        let root = tree.root();
        let t = tree.node_at_path(root, &[0, 0, 0]).unwrap();

        let caret = Range::collapsed(Boundary::new(t, 2));
        let result = unwrap(&mut tree, &caret, "i", &opts()).unwrap();
        assert_eq!(
            tree.inner_html(root),
            "<b><i>hi</i><span>\u{200B}</span></b>"
        );

        let result = unwrap(&mut tree, &result, "b", &opts()).unwrap();
        assert_eq!(
            tree.inner_html(root),
            "<b><i>hi</i></b><span>\u{200B}</span>"
        );
        // the old marker moved, no second one appeared
        let zwsp_count = tree
            .text_content(root)
            .chars()
            .filter(|c| *c == '\u{200B}')
            .count();
        assert_eq!(zwsp_count, 1);
        let marker_text = tree.node_at_path(root, &[1, 0]).unwrap();
        assert_eq!(result, Range::collapsed(Boundary::new(marker_text, 1)));
    }

    #[test]
    fn test_collapsed_custom_marker_tag() {
        let mut tree = build(div((i(("hi",)),)));
        let root = tree.root();
        let t = tree.node_at_path(root, &[0, 0]).unwrap();

        let options = UnwrapOptions {
            marker_tag: "mark".to_owned(),
            ..UnwrapOptions::default()
        };
        let caret = Range::collapsed(Boundary::new(t, 2));
        unwrap(&mut tree, &caret, "i", &options).unwrap();

        assert_eq!(
            tree.inner_html(root),
            "<i>hi</i><mark>\u{200B}</mark>"
        );
        assert_eq!(tree.visible_text(root), "hi");
    }

    #[test]
    fn test_search_stops_at_the_configured_root() {
        let mut tree = build(div((b((p(("hi",)),)),)));
        let root = tree.root();
        let p1 = tree.node_at_path(root, &[0, 0]).unwrap();
        let t = tree.child(p1, 0).unwrap();

        let options = UnwrapOptions {
            root: Some(p1),
            ..UnwrapOptions::default()
        };
        let caret = Range::collapsed(Boundary::new(t, 1));
        let result = unwrap(&mut tree, &caret, "b", &options).unwrap();

        assert_eq!(tree.inner_html(root), "<b><p>hi</p></b>");
        assert_eq!(result, caret);
    }

    #[test]
    fn test_root_must_contain_the_range() {
        let mut tree = build(div((p(("one",)), p(("two",)))));
        let root = tree.root();
        let p1 = tree.child(root, 0).unwrap();
        let t2 = tree.node_at_path(root, &[1, 0]).unwrap();

        let options = UnwrapOptions {
            root: Some(p1),
            ..UnwrapOptions::default()
        };
        let range = Range::new(Boundary::new(t2, 0), Boundary::new(t2, 3));
        assert_eq!(
            unwrap(&mut tree, &range, "b", &options).unwrap_err(),
            UnwrapError::RootNotAncestor
        );
        assert_eq!(tree.inner_html(root), "<p>one</p><p>two</p>");
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let mut tree = build(div(("hello",)));
        let t = tree.child(tree.root(), 0).unwrap();

        let range = Range::new(Boundary::new(t, 4), Boundary::new(t, 1));
        assert_eq!(
            unwrap(&mut tree, &range, "b", &opts()).unwrap_err(),
            UnwrapError::InvertedRange
        );
    }

    #[test]
    fn test_unwrap_node_in_place() {
        let mut tree = build(div(("a", b(("b", i(("c",)))), "d")));
        let root = tree.root();
        let b1 = tree.child(root, 1).unwrap();

        let range = unwrap_node(&mut tree, b1, None).unwrap();
        assert_eq!(tree.inner_html(root), "ab<i>c</i>d");
        assert_eq!(range.start(), Boundary::new(root, 1));
        assert_eq!(range.end(), Boundary::new(root, 3));
    }

    #[test]
    fn test_unwrap_node_into_another_parent() {
        let mut tree = build(div((p(("x",)), b(("y", "z")))));
        let root = tree.root();
        let p1 = tree.child(root, 0).unwrap();
        let b1 = tree.child(root, 1).unwrap();

        let range = unwrap_node(&mut tree, b1, Some(p1)).unwrap();
        assert_eq!(tree.inner_html(root), "<p>xyz</p>");
        assert_eq!(range.start(), Boundary::new(p1, 1));
        assert_eq!(range.end(), Boundary::new(p1, 3));
    }

    #[test]
    fn test_unwrap_node_detached_without_target() {
        let mut tree = build(div((b(("hi",)),)));
        let b1 = tree.child(tree.root(), 0).unwrap();
        tree.detach(b1);

        assert_eq!(
            unwrap_node(&mut tree, b1, None).unwrap_err(),
            UnwrapError::Unparented(b1)
        );
    }

    #[test]
    fn test_block_tags_defaults() {
        let blocks = BlockTags::default();
        assert!(blocks.contains("p"));
        assert!(blocks.contains("LI"));
        assert!(!blocks.contains("b"));
        assert!(!BlockTags::none().contains("p"));

        let custom: BlockTags = ["p", "section"].iter().copied().collect();
        assert!(custom.contains("section"));
        assert!(!custom.contains("div"));

        assert_eq!(ZERO_WIDTH_SPACE, "\u{200B}");
    }
}
