//! # Splice records
//!
//! Saved [`Location`]s are pure index paths; every structural edit between
//! saving and loading shifts what those indices mean. Each mutating
//! primitive in this module tree therefore reports the reshuffle it
//! performed as a [`Splice`], and the orchestrator pushes its saved
//! locations through the records before resolving them again.
//!
//! A location sitting exactly on an edit point is ambiguous: it can stay
//! with the content before the edit or follow the content after it. The
//! caller resolves this per boundary with a [`Bias`], the way a selection
//! start sticks to the left of an insertion and a selection end to its
//! right. Locations strictly inside a removed region are clamped to the
//! cut point; a wrapped region keeps its interior locations, one level
//! deeper.

use crate::range::{Location, SavedRange};

/// Which side of an edit a location that sits exactly on it belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Bias {
    /// The location stays with the content before the edit
    Before,
    /// The location follows the content after the edit
    After,
}

/// One structural edit, described as index data relative to the tree root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Splice {
    /// The node at `path` was split at `at` (a char offset for text, a
    /// child index for elements); the second half became its next sibling.
    Split { path: Vec<usize>, at: usize },
    /// The element at `path` was replaced by its `children` children.
    Unwrapped { path: Vec<usize>, children: usize },
    /// The children `from..to` of the node at `parent` were taken out.
    Removed {
        parent: Vec<usize>,
        from: usize,
        to: usize,
    },
    /// `count` new children appeared at index `at` of the node at `parent`.
    Inserted {
        parent: Vec<usize>,
        at: usize,
        count: usize,
    },
    /// The children `from..to` of the node at `parent` moved into a fresh
    /// wrapper element that took their place at `from`. `from == to`
    /// records a wrapper landing in a gap, with its content coming from
    /// boundary splits rather than whole children.
    Wrapped {
        parent: Vec<usize>,
        from: usize,
        to: usize,
    },
}

fn is_prefix(prefix: &[usize], steps: &[usize]) -> bool {
    steps.len() >= prefix.len() && &steps[..prefix.len()] == prefix
}

impl Splice {
    /// Map a location taken before this edit to the equivalent location
    /// after it.
    pub(crate) fn rewrite(&self, loc: &Location, bias: Bias) -> Location {
        match self {
            Splice::Split { path, at } => rewrite_split(loc, path, *at, bias),
            Splice::Unwrapped { path, children } => rewrite_unwrapped(loc, path, *children),
            Splice::Removed { parent, from, to } => rewrite_removed(loc, parent, *from, *to),
            Splice::Inserted { parent, at, count } => {
                rewrite_inserted(loc, parent, *at, *count, bias)
            }
            Splice::Wrapped { parent, from, to } => {
                rewrite_wrapped(loc, parent, *from, *to, bias)
            }
        }
    }
}

/// Push a saved range through a sequence of edits, oldest first.
pub(crate) fn rewrite_all(
    splices: &[Splice],
    mut saved: SavedRange,
    start_bias: Bias,
    end_bias: Bias,
) -> SavedRange {
    for splice in splices {
        saved.start = splice.rewrite(&saved.start, start_bias);
        saved.end = splice.rewrite(&saved.end, end_bias);
    }
    saved
}

fn rewrite_split(loc: &Location, path: &[usize], at: usize, bias: Bias) -> Location {
    let last = path.len() - 1;
    let (parent, index) = (&path[..last], path[last]);
    if loc.steps == path {
        // inside the split node itself
        return match (loc.offset > at, loc.offset == at && bias == Bias::After) {
            (true, _) => {
                let mut steps = parent.to_vec();
                steps.push(index + 1);
                Location::new(steps, loc.offset - at)
            }
            (false, true) => {
                let mut steps = parent.to_vec();
                steps.push(index + 1);
                Location::new(steps, 0)
            }
            (false, false) => loc.clone(),
        };
    }
    if is_prefix(path, &loc.steps) {
        // below the split node: children at and after the cut moved into
        // the second half
        let step = loc.steps[path.len()];
        if step >= at {
            let mut steps = parent.to_vec();
            steps.push(index + 1);
            steps.push(step - at);
            steps.extend_from_slice(&loc.steps[path.len() + 1..]);
            return Location::new(steps, loc.offset);
        }
        return loc.clone();
    }
    if loc.steps == parent {
        if loc.offset >= index + 1 {
            return Location::new(loc.steps.clone(), loc.offset + 1);
        }
        return loc.clone();
    }
    if is_prefix(parent, &loc.steps) {
        let step = loc.steps[parent.len()];
        if step >= index + 1 {
            let mut steps = loc.steps.clone();
            steps[parent.len()] += 1;
            return Location::new(steps, loc.offset);
        }
    }
    loc.clone()
}

fn rewrite_unwrapped(loc: &Location, path: &[usize], children: usize) -> Location {
    let last = path.len() - 1;
    let (parent, index) = (&path[..last], path[last]);
    if loc.steps == path {
        // the container itself is gone; its child positions became
        // positions in the parent
        return Location::new(parent.to_vec(), index + loc.offset);
    }
    if is_prefix(path, &loc.steps) {
        let step = loc.steps[path.len()];
        let mut steps = parent.to_vec();
        steps.push(index + step);
        steps.extend_from_slice(&loc.steps[path.len() + 1..]);
        return Location::new(steps, loc.offset);
    }
    if loc.steps == parent {
        if loc.offset > index {
            return Location::new(loc.steps.clone(), loc.offset - 1 + children);
        }
        return loc.clone();
    }
    if is_prefix(parent, &loc.steps) {
        let step = loc.steps[parent.len()];
        if step > index {
            let mut steps = loc.steps.clone();
            steps[parent.len()] = step - 1 + children;
            return Location::new(steps, loc.offset);
        }
    }
    loc.clone()
}

fn rewrite_removed(loc: &Location, parent: &[usize], from: usize, to: usize) -> Location {
    if loc.steps == parent {
        if loc.offset >= to {
            return Location::new(loc.steps.clone(), loc.offset - (to - from));
        }
        if loc.offset > from {
            // interior of the removed run; clamp to the cut
            return Location::new(loc.steps.clone(), from);
        }
        return loc.clone();
    }
    if is_prefix(parent, &loc.steps) {
        let step = loc.steps[parent.len()];
        if step >= to {
            let mut steps = loc.steps.clone();
            steps[parent.len()] -= to - from;
            return Location::new(steps, loc.offset);
        }
        if step >= from && to > from {
            // the node this location ran through is gone; clamp to the cut
            return Location::new(parent.to_vec(), from);
        }
    }
    loc.clone()
}

fn rewrite_wrapped(
    loc: &Location,
    parent: &[usize],
    from: usize,
    to: usize,
    bias: Bias,
) -> Location {
    if from == to {
        // nothing moved inside; a plain insertion of the wrapper
        return rewrite_inserted(loc, parent, from, 1, bias);
    }
    if loc.steps == parent {
        if loc.offset >= to {
            return Location::new(loc.steps.clone(), loc.offset - (to - from) + 1);
        }
        if loc.offset > from {
            // between two wrapped children; still between them, one level
            // down
            let mut steps = parent.to_vec();
            steps.push(from);
            return Location::new(steps, loc.offset - from);
        }
        return loc.clone();
    }
    if is_prefix(parent, &loc.steps) {
        let step = loc.steps[parent.len()];
        if step >= to {
            let mut steps = loc.steps.clone();
            steps[parent.len()] = step - (to - from) + 1;
            return Location::new(steps, loc.offset);
        }
        if step >= from {
            let mut steps = parent.to_vec();
            steps.push(from);
            steps.push(step - from);
            steps.extend_from_slice(&loc.steps[parent.len() + 1..]);
            return Location::new(steps, loc.offset);
        }
    }
    loc.clone()
}

fn rewrite_inserted(
    loc: &Location,
    parent: &[usize],
    at: usize,
    count: usize,
    bias: Bias,
) -> Location {
    if loc.steps == parent {
        if loc.offset > at || (loc.offset == at && bias == Bias::After) {
            return Location::new(loc.steps.clone(), loc.offset + count);
        }
        return loc.clone();
    }
    if is_prefix(parent, &loc.steps) {
        let step = loc.steps[parent.len()];
        if step >= at {
            let mut steps = loc.steps.clone();
            steps[parent.len()] += count;
            return Location::new(steps, loc.offset);
        }
    }
    loc.clone()
}
