//! The computed style snapshot consumed by the box tree.
//!
//! [§ 4.4 Computed Values](https://www.w3.org/TR/css-cascade-4/#computed)
//!
//! "The computed value is the result of resolving the specified value as
//! defined in the 'Computed Value' line of the property definition table."
//!
//! Cascade and inheritance happen upstream; the box tree only reads the
//! handful of properties that decide box generation, containing blocks,
//! formatting-context boundaries and overflow.

use serde::{Deserialize, Serialize};

use crate::display::{DisplayValue, InnerDisplayType, OuterDisplayType, TablePart};
use crate::position::{FloatSide, Overflow, PositionType};
use crate::values::{AutoLength, BoxShadow};
use crate::writing_mode::{Direction, WritingMode};

/// [§ 9.3.2 Box offsets: 'top', 'right', 'bottom', 'left'](https://www.w3.org/TR/CSS2/visuren.html#position-props)
///
/// "An element is said to be positioned if its 'position' property has
/// a value other than 'static'. Positioned elements generate positioned
/// boxes, laid out according to four properties: top, right, bottom, left."
///
/// `None` means 'auto'.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoxOffsets {
    /// "how far the top margin edge of the box is offset below the top
    /// edge of the box's containing block."
    pub top: Option<f32>,
    /// "how far the right margin edge of the box is offset to the left of
    /// the right edge of the box's containing block."
    pub right: Option<f32>,
    /// "how far the bottom margin edge of the box is offset above the
    /// bottom edge of the box's containing block."
    pub bottom: Option<f32>,
    /// "how far the left margin edge of the box is offset to the right of
    /// the left edge of the box's containing block."
    pub left: Option<f32>,
}

/// How much work a style change requires from the box tree.
///
/// Ordered from least to most invasive so callers can take the maximum of
/// several differences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StyleDifference {
    /// Nothing the box tree reads changed.
    Equal,
    /// Only offsets or visual effects changed: the box keeps its size, its
    /// position and overflow must be recomputed.
    SimplifiedLayout,
    /// Geometry-affecting properties changed.
    Layout,
}

/// Per-box computed style snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ComputedStyle {
    /// [§ 2 The display property](https://www.w3.org/TR/css-display-3/#the-display-properties)
    pub display: DisplayValue,

    /// [§ 9.3.1 'position'](https://www.w3.org/TR/CSS2/visuren.html#choose-position)
    pub position: PositionType,

    /// [§ 9.3.2 Box offsets](https://www.w3.org/TR/CSS2/visuren.html#position-props)
    pub offsets: BoxOffsets,

    /// [§ 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats)
    ///
    /// None means the element is not floated (float: none).
    pub float: Option<FloatSide>,

    /// [§ 3 overflow-x](https://www.w3.org/TR/css-overflow-3/#overflow-properties)
    pub overflow_x: Overflow,

    /// [§ 3 overflow-y](https://www.w3.org/TR/css-overflow-3/#overflow-properties)
    pub overflow_y: Overflow,

    /// [§ 2 Block Flow Direction](https://www.w3.org/TR/css-writing-modes-4/#block-flow)
    pub writing_mode: WritingMode,

    /// [§ 2.1 Specifying Directionality](https://www.w3.org/TR/css-writing-modes-4/#direction)
    pub direction: Direction,

    /// [§ 10.5 'height'](https://www.w3.org/TR/CSS2/visudet.html#the-height-property)
    pub height: AutoLength,

    /// [§ 3.2 'column-count'](https://www.w3.org/TR/css-multicol-1/#cc)
    ///
    /// None means 'auto' (not a multi-column container).
    pub column_count: Option<u32>,

    /// [§ 6.1 'column-span'](https://www.w3.org/TR/css-multicol-1/#column-span)
    ///
    /// "all: The element spans across all columns."
    pub column_span_all: bool,

    /// [§ 3.2 'outline-width'](https://www.w3.org/TR/css-ui-4/#outline-width)
    pub outline_width: f32,

    /// [§ 3.5 'outline-offset'](https://www.w3.org/TR/css-ui-4/#outline-offset)
    pub outline_offset: f32,

    /// [§ 6.1 'box-shadow'](https://www.w3.org/TR/css-backgrounds-3/#box-shadow)
    pub box_shadow: Option<BoxShadow>,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display: DisplayValue::inline(),
            position: PositionType::Static,
            offsets: BoxOffsets::default(),
            float: None,
            overflow_x: Overflow::Visible,
            overflow_y: Overflow::Visible,
            writing_mode: WritingMode::HorizontalTb,
            direction: Direction::Ltr,
            height: AutoLength::Auto,
            column_count: None,
            column_span_all: false,
            outline_width: 0.0,
            outline_offset: 0.0,
            box_shadow: None,
        }
    }
}

impl ComputedStyle {
    /// Style with the given display and every other property at its initial value.
    #[must_use]
    pub fn with_display(display: DisplayValue) -> Self {
        Self {
            display,
            ..Self::default()
        }
    }

    /// `display: block`
    #[must_use]
    pub fn block() -> Self {
        Self::with_display(DisplayValue::block())
    }

    /// `display: inline`
    #[must_use]
    pub fn inline() -> Self {
        Self::with_display(DisplayValue::inline())
    }

    /// The style an anonymous block inherits from its parent: only the
    /// writing mode and direction carry over, display is `block`.
    ///
    /// [§ 9.2.1.1 Anonymous block boxes](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level)
    ///
    /// "The properties of anonymous boxes are inherited from the enclosing
    /// non-anonymous box. Non-inherited properties have their initial value."
    #[must_use]
    pub fn anonymous_block_of(parent: &Self) -> Self {
        Self {
            writing_mode: parent.writing_mode,
            direction: parent.direction,
            ..Self::block()
        }
    }

    /// Builder: set the positioning scheme.
    #[must_use]
    pub const fn positioned(mut self, position: PositionType) -> Self {
        self.position = position;
        self
    }

    /// Builder: float the box.
    #[must_use]
    pub const fn floated(mut self, side: FloatSide) -> Self {
        self.float = Some(side);
        self
    }

    /// Builder: set both overflow axes.
    #[must_use]
    pub const fn overflowing(mut self, overflow: Overflow) -> Self {
        self.overflow_x = overflow;
        self.overflow_y = overflow;
        self
    }

    /// Builder: set the 'height' property.
    #[must_use]
    pub const fn with_height(mut self, height: AutoLength) -> Self {
        self.height = height;
        self
    }

    /// Builder: set the writing mode.
    #[must_use]
    pub const fn with_writing_mode(mut self, writing_mode: WritingMode) -> Self {
        self.writing_mode = writing_mode;
        self
    }

    /// [§ 9.7 Relationships between 'display', 'position', and 'float'](https://www.w3.org/TR/CSS2/visuren.html#dis-pos-flo)
    ///
    /// "Otherwise, if 'position' has the value 'absolute' or 'fixed', the box
    /// is absolutely positioned, the computed value of 'float' is 'none'."
    #[must_use]
    pub const fn is_floating(&self) -> bool {
        self.float.is_some() && !self.position.is_out_of_flow()
    }

    /// Absolutely or fixed positioned.
    #[must_use]
    pub const fn is_out_of_flow(&self) -> bool {
        self.position.is_out_of_flow()
    }

    /// Either taken out of flow by a float or by absolute positioning.
    #[must_use]
    pub const fn is_floating_or_out_of_flow(&self) -> bool {
        self.is_floating() || self.is_out_of_flow()
    }

    /// [§ 9.7](https://www.w3.org/TR/CSS2/visuren.html#dis-pos-flo)
    ///
    /// "Otherwise, if 'float' has a value other than 'none', the box is
    /// floated and 'display' is set according to the table below."
    /// Floats and out-of-flow boxes are blockified.
    #[must_use]
    pub const fn used_display(&self) -> DisplayValue {
        if self.is_floating_or_out_of_flow() {
            self.display.blockified()
        } else {
            self.display
        }
    }

    /// Participates in an inline formatting context.
    #[must_use]
    pub const fn is_inline_level(&self) -> bool {
        matches!(self.used_display().outer, OuterDisplayType::Inline)
    }

    /// [§ 3 Scrolling and Clipping](https://www.w3.org/TR/css-overflow-3/#overflow-properties)
    #[must_use]
    pub const fn has_overflow_clip(&self) -> bool {
        self.overflow_x.clips() || self.overflow_y.clips()
    }

    /// [§ 3 The Number and Width of Columns](https://www.w3.org/TR/css-multicol-1/#the-number-and-width-of-columns)
    #[must_use]
    pub const fn specifies_columns(&self) -> bool {
        self.column_count.is_some()
    }

    /// Whether this box is the containing block of absolutely positioned
    /// descendants.
    #[must_use]
    pub const fn can_contain_absolute(&self) -> bool {
        self.position.is_positioned()
    }

    /// Inner display lays out children with flow layout (block containers).
    #[must_use]
    pub const fn is_flow_container(&self) -> bool {
        matches!(
            self.used_display().inner,
            InnerDisplayType::Flow
                | InnerDisplayType::FlowRoot
                | InnerDisplayType::TablePart(TablePart::Cell | TablePart::Caption)
        )
    }

    /// Compare two snapshots of the same box.
    #[must_use]
    pub fn difference(&self, new: &Self) -> StyleDifference {
        if self == new {
            return StyleDifference::Equal;
        }
        let layout_affecting = self.display != new.display
            || self.position != new.position
            || self.float != new.float
            || self.overflow_x != new.overflow_x
            || self.overflow_y != new.overflow_y
            || self.writing_mode != new.writing_mode
            || self.direction != new.direction
            || self.height != new.height
            || self.column_count != new.column_count
            || self.column_span_all != new.column_span_all;
        if layout_affecting {
            StyleDifference::Layout
        } else {
            // Offsets, outline and box-shadow.
            StyleDifference::SimplifiedLayout
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_is_blockified() {
        let style = ComputedStyle::inline().floated(FloatSide::Left);
        assert!(style.is_floating());
        assert!(!style.is_inline_level());
        assert_eq!(style.used_display(), DisplayValue::block());
    }

    #[test]
    fn test_absolute_wins_over_float() {
        let style = ComputedStyle::block()
            .floated(FloatSide::Right)
            .positioned(PositionType::Absolute);
        assert!(!style.is_floating());
        assert!(style.is_out_of_flow());
    }

    #[test]
    fn test_difference_classifies_offsets_as_simplified() {
        let old = ComputedStyle::block().positioned(PositionType::Absolute);
        let mut new = old.clone();
        new.offsets.top = Some(10.0);
        assert_eq!(old.difference(&new), StyleDifference::SimplifiedLayout);

        new.height = AutoLength::Percent(50.0);
        assert_eq!(old.difference(&new), StyleDifference::Layout);
        assert_eq!(old.difference(&old.clone()), StyleDifference::Equal);
    }
}
