//! # Range wrapping
//!
//! [`wrap_range`] puts the content a range spans into a freshly created
//! element. It is the inverse-adjacent operation to unwrapping: the
//! orchestrator uses it to re-wrap the parts of a removed element's span
//! that lie outside the selection.

use crate::dom::{DomTree, Fragment, NodeId};
use crate::range::Range;
use crate::transform::map::Splice;
use crate::transform::splice::{extract_traced, insert_traced, root_path};
use crate::transform::UnwrapError;

/// Wrap the content the range spans in a fresh element of the given tag.
///
/// Boundary text nodes are split so the wrapper covers exactly the spanned
/// chars and never any adjacent unselected content. Returns the created
/// wrappers in document order; a collapsed range, or one spanning no
/// content at all, creates nothing and returns an empty list. The range is
/// left spanning the inserted wrapper.
pub fn wrap_range(
    tree: &mut DomTree,
    range: &mut Range,
    tag: &str,
) -> Result<Vec<NodeId>, UnwrapError> {
    let mut trace = Vec::new();
    wrap_range_traced(tree, range, tag, &mut trace)
}

pub(crate) fn wrap_range_traced(
    tree: &mut DomTree,
    range: &mut Range,
    tag: &str,
    trace: &mut Vec<Splice>,
) -> Result<Vec<NodeId>, UnwrapError> {
    let mut steps = Vec::new();
    let fragment = extract_traced(tree, range, &mut steps)?;
    if fragment.is_empty() {
        trace.extend(steps);
        return Ok(Vec::new());
    }

    // Extraction ends with the removal of the run of fully covered
    // children, and the wrapper lands in exactly that slot. When the run
    // is the whole fragment, the cut-and-splice pair is really one edit:
    // the run moved a level down. Folding the two records into a single
    // `Wrapped` lets locations inside the run keep resolving instead of
    // clamping to the cut.
    let gap = range.start();
    let parent = root_path(tree, gap.node);
    let covered = match steps.last() {
        Some(Splice::Removed {
            parent: cut,
            from,
            to,
        }) if *cut == parent && *from == gap.offset && to - from == fragment.len() => Some(*to),
        _ => None,
    };
    let to = match covered {
        Some(to) => {
            steps.pop();
            to
        }
        None => gap.offset,
    };
    trace.extend(steps);

    let wrapper = tree.create_element(tag);
    for root in fragment.take_roots() {
        tree.append_child(wrapper, root);
    }
    // the gap container is an element here, so the insertion below is a
    // single child splice; the `Wrapped` record stands in for it
    let mut skipped = Vec::new();
    insert_traced(tree, range, Fragment::from_roots(vec![wrapper]), &mut skipped)?;
    trace.push(Splice::Wrapped {
        parent,
        from: gap.offset,
        to,
    });
    Ok(vec![wrapper])
}

#[cfg(test)]
mod tests {
    use super::wrap_range;
    use crate::helper::{b, build, div, p};
    use crate::range::{Boundary, Range};

    #[test]
    fn test_wrap_splits_boundary_text() {
        let mut tree = build(div(("hello world",)));
        let root = tree.root();
        let t = tree.child(root, 0).unwrap();

        let mut range = Range::new(Boundary::new(t, 6), Boundary::new(t, 11));
        let wrappers = wrap_range(&mut tree, &mut range, "b").unwrap();
        assert_eq!(wrappers.len(), 1);
        assert_eq!(tree.inner_html(root), "hello <b>world</b>");
        assert_eq!(tree.outer_html(wrappers[0]), "<b>world</b>");
        assert_eq!(range.start(), Boundary::new(root, 1));
        assert_eq!(range.end(), Boundary::new(root, 2));
    }

    #[test]
    fn test_wrap_mid_text() {
        let mut tree = build(div(("hello",)));
        let root = tree.root();
        let t = tree.child(root, 0).unwrap();

        let mut range = Range::new(Boundary::new(t, 1), Boundary::new(t, 3));
        wrap_range(&mut tree, &mut range, "i").unwrap();
        assert_eq!(tree.inner_html(root), "h<i>el</i>lo");
    }

    #[test]
    fn test_wrap_across_elements() {
        let mut tree = build(div(("he", b(("llo",)), " world")));
        let root = tree.root();
        let t_he = tree.child(root, 0).unwrap();
        let t_world = tree.child(root, 2).unwrap();

        let mut range = Range::new(Boundary::new(t_he, 1), Boundary::new(t_world, 3));
        wrap_range(&mut tree, &mut range, "u").unwrap();
        assert_eq!(tree.inner_html(root), "h<u>e<b>llo</b> wo</u>rld");
        assert_eq!(tree.text_content(root), "hello world");
    }

    #[test]
    fn test_wrap_whole_element() {
        let mut tree = build(div((p(("hi",)),)));
        let root = tree.root();
        let p1 = tree.child(root, 0).unwrap();

        let mut range = Range::select_node(&tree, p1);
        let wrappers = wrap_range(&mut tree, &mut range, "blockquote").unwrap();
        assert_eq!(tree.inner_html(root), "<blockquote><p>hi</p></blockquote>");
        assert_eq!(tree.child(root, 0), Some(wrappers[0]));
    }

    #[test]
    fn test_wrap_collapsed_is_noop() {
        let mut tree = build(div(("hello",)));
        let root = tree.root();
        let t = tree.child(root, 0).unwrap();

        let mut range = Range::collapsed(Boundary::new(t, 2));
        let wrappers = wrap_range(&mut tree, &mut range, "b").unwrap();
        assert!(wrappers.is_empty());
        assert_eq!(tree.inner_html(root), "hello");
    }
}
