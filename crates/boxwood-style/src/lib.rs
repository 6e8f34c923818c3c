//! Computed style snapshot consumed by the boxwood box tree.
//!
//! # Scope
//!
//! Cascade, inheritance and parsing of stylesheets are upstream concerns.
//! This crate only models the properties that box-tree maintenance reads:
//!
//! - **Display** ([CSS Display Level 3](https://www.w3.org/TR/css-display-3/))
//!   - inline vs block vs table-internal, atomic inlines, blockification
//! - **Positioning** ([CSS 2.1 § 9.3](https://www.w3.org/TR/CSS2/visuren.html#positioning-scheme))
//!   - static/relative/absolute/fixed/sticky, floats, box offsets
//! - **Overflow** ([CSS Overflow Level 3](https://www.w3.org/TR/css-overflow-3/))
//! - **Writing modes** ([CSS Writing Modes Level 4](https://www.w3.org/TR/css-writing-modes-4/))
//! - **Visual effects** that extend ink overflow (outline, box-shadow)

/// Display types per [CSS Display Level 3](https://www.w3.org/TR/css-display-3/).
pub mod display;
/// Positioning, float and overflow per [CSS 2.1 § 9](https://www.w3.org/TR/CSS2/visuren.html).
pub mod position;
/// Writing mode and direction per [CSS Writing Modes Level 4](https://www.w3.org/TR/css-writing-modes-4/).
pub mod writing_mode;
/// Size and visual-effect values.
pub mod values;
/// The per-box computed style snapshot.
pub mod computed;

pub use computed::{BoxOffsets, ComputedStyle, StyleDifference};
pub use display::{DisplayValue, InnerDisplayType, OuterDisplayType, TablePart};
pub use position::{FloatSide, Overflow, PositionType};
pub use values::{AutoLength, BoxShadow};
pub use writing_mode::{Direction, PhysicalSide, WritingMode};
