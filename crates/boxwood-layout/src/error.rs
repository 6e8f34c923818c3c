//! Errors reported at the public mutation boundary.

use thiserror::Error;

use crate::tree::BoxId;

/// A caller handed the box tree something it cannot act on.
///
/// Internal invariant breakage is not reported here: it is caught by
/// `debug_assert!` and logged through `warn_once` in release builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The handle was never allocated, or its box has been destroyed.
    #[error("box {0} is dead or was never allocated")]
    DeadBox(BoxId),

    /// `before_child` does not live inside `parent` (or its continuation chain).
    #[error("box {child} is not inside {parent}")]
    NotADescendant {
        /// The misplaced reference box.
        child: BoxId,
        /// The box it was expected under.
        parent: BoxId,
    },

    /// Text runs, list markers and replaced boxes have no children.
    #[error("box {0} cannot have children")]
    Leaf(BoxId),

    /// Only detached boxes may be inserted.
    #[error("box {child} is already attached to {parent}")]
    AlreadyAttached {
        /// The box being inserted.
        child: BoxId,
        /// Its current parent.
        parent: BoxId,
    },

    /// The new child is an ancestor of the insertion parent.
    #[error("inserting {child} into {parent} would create a cycle")]
    Cycle {
        /// The box being inserted.
        child: BoxId,
        /// The insertion parent.
        parent: BoxId,
    },

    /// The root box is never removed from the tree.
    #[error("the root box cannot be removed")]
    DetachRoot,

    /// A block was inserted into an inline box that has no enclosing block
    /// container to split into.
    #[error("inline box {0} has no enclosing block container")]
    NoContainingBlock(BoxId),
}
