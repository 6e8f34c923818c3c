//! Incremental box-tree maintenance for block formatting layout.
//!
//! # Scope
//!
//! This crate keeps a tree of layout boxes structurally legal while content
//! and style change, and decides how much layout each change requires. Box
//! sizing itself is supplied by the caller through [`LayoutAlgorithm`].
//!
//! - **Box tree mutation** ([CSS 2.1 § 9.2](https://www.w3.org/TR/CSS2/visuren.html#box-gen))
//!   - anonymous block generation and removal, block-in-inline splitting
//! - **Descendant indices** ([CSS 2.1 § 10.1](https://www.w3.org/TR/CSS2/visudet.html#containing-block-details))
//!   - out-of-flow and percentage-height descendants per containing block
//! - **Overflow** ([CSS Overflow Level 3](https://www.w3.org/TR/css-overflow-3/))
//!   - scrollable (layout) and ink (visual) overflow aggregation
//! - **Incremental layout**
//!   - dirty states, relayout boundaries, position-only fast path
//!
//! # Example
//!
//! ```
//! use boxwood_layout::{BoxTree, ElementId};
//! use boxwood_style::ComputedStyle;
//!
//! let mut tree = BoxTree::default();
//! let root = tree.root();
//! let text = tree.create_text("hello");
//! tree.append_child(root, text).unwrap();
//!
//! let block = tree.create_element(ElementId(1), ComputedStyle::block());
//! tree.append_child(root, block).unwrap();
//!
//! // The text now sits in an anonymous block next to the new block.
//! assert_eq!(tree.children(root).len(), 2);
//! assert!(tree.check_invariants().is_empty());
//! ```

use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;

/// Rectangles and box areas.
pub mod box_model;
/// Generation of anonymous wrappers, continuations and teardown.
pub mod mutator;
/// The positioned and percent-height descendant indices.
pub mod descendants;
/// Tree dumping for diagnostics.
pub mod dump;
/// Errors reported at the public API boundary.
pub mod error;
/// Structural invariant checks.
pub mod invariants;
/// Layout and visual overflow aggregation.
pub mod overflow;
/// Dirty states, relayout boundaries and the layout pass driver.
pub mod scheduler;
/// Deferred scroll-info notifications.
pub mod scroll;
/// Style change handling.
pub mod style_change;
/// The box arena.
pub mod tree;

mod continuation;

/// Insertion-ordered hash set with the Fx hasher.
pub(crate) type FxIndexSet<T> = IndexSet<T, FxBuildHasher>;

pub use box_model::{BoxDimensions, EdgeSizes, Rect};
pub use descendants::{DescendantIndex, DescendantIndices};
pub use dump::{DumpEntry, DumpOptions};
pub use error::TreeError;
pub use invariants::InvariantViolation;
pub use overflow::{LineBox, NoTheme, OverflowRecord, ThemeOverflow};
pub use scheduler::{
    BoxLayoutOutput, DirtyBits, LayoutAlgorithm, LayoutScheduler, LayoutState, PassReport,
    SchedulerConfig,
};
pub use scroll::{ScrollInfoBatch, ScrollInfoGuard, ScrollInfoSink};
pub use tree::{
    AnonymousKind, BoxFlags, BoxId, BoxTree, BoxType, ContainerKind, ElementId, ElementKind,
    LayoutBox, PseudoElement,
};
