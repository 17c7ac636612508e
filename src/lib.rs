#![warn(missing_docs)]
//! # Range-preserving unwrap
//!
//! This crate removes inline formatting elements (say, every `<b>`) that
//! overlap a selection range in a DOM-style tree, without losing either the
//! surrounding formatting or the selection itself: parts of a removed
//! element that stick out of the range are re-wrapped in a fresh element of
//! the same tag, and an equivalent range into the changed tree is returned
//! even when the original boundary nodes were destroyed.
//!
//! The entry point is [`transform::unwrap`]; [`dom`] holds the tree,
//! [`range`] the selection model, and [`helper`] builders for constructing
//! trees in tests and examples.

pub mod dom;
pub mod helper;
pub mod range;
pub mod transform;
pub mod util;
