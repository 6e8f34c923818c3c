//! Positioning scheme, float and overflow properties.
//!
//! [§ 9.3 Positioning schemes](https://www.w3.org/TR/CSS2/visuren.html#positioning-scheme)
//!
//! "In CSS 2, a box may be laid out according to three positioning schemes:
//!
//! 1. Normal flow. In CSS 2, normal flow includes block formatting of block-level
//!    boxes, inline formatting of inline-level boxes, and relative positioning of
//!    block-level and inline-level boxes.
//!
//! 2. Floats. In the float model, a box is first laid out according to the normal
//!    flow, then taken out of the flow and shifted to the left or right as far as
//!    possible.
//!
//! 3. Absolute positioning. In the absolute positioning model, a box is removed
//!    from the normal flow entirely and assigned a position with respect to a
//!    containing block."

use serde::{Deserialize, Serialize};

/// [§ 9.3.1 Choosing a positioning scheme: 'position' property](https://www.w3.org/TR/CSS2/visuren.html#choose-position)
///
/// "The 'position' and 'float' properties determine which of the CSS 2
/// positioning algorithms is used to calculate the position of a box."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PositionType {
    /// "The box is a normal box, laid out according to the normal flow."
    #[default]
    Static,
    /// "The box's position is calculated according to the normal flow.
    /// Then the box is offset relative to its normal position."
    Relative,
    /// "The box's position (and possibly size) is specified with the
    /// 'top', 'right', 'bottom', and 'left' properties."
    Absolute,
    /// "The box's position is calculated according to the 'absolute' model,
    /// but the box is fixed with respect to some reference."
    Fixed,
    /// [CSS Positioned Layout Module Level 3 § 3.2](https://www.w3.org/TR/css-position-3/#sticky-position)
    ///
    /// "A stickily positioned box is positioned similarly to a relatively
    /// positioned box, but the offset is computed with reference to the
    /// nearest ancestor with a scrolling mechanism."
    Sticky,
}

impl PositionType {
    /// [§ 9.6 Absolute positioning](https://www.w3.org/TR/CSS2/visuren.html#absolute-positioning)
    ///
    /// "In the absolute positioning model, a box is explicitly offset with
    /// respect to its containing block. It is removed from the normal flow
    /// entirely (it has no impact on later siblings)."
    #[must_use]
    pub const fn is_out_of_flow(self) -> bool {
        matches!(self, Self::Absolute | Self::Fixed)
    }

    /// [§ 10.1 Definition of "containing block"](https://www.w3.org/TR/CSS2/visudet.html#containing-block-details)
    ///
    /// "If the element has 'position: absolute', the containing block is
    /// established by the nearest ancestor with a 'position' of 'absolute',
    /// 'relative' or 'fixed'."
    #[must_use]
    pub const fn is_positioned(self) -> bool {
        !matches!(self, Self::Static)
    }
}

/// [§ 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats)
///
/// "left: The element generates a block box that is floated to the left.
/// right: The element generates a block box that is floated to the right.
/// none: The box is not floated."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FloatSide {
    /// "The element generates a block box that is floated to the left."
    Left,
    /// "The element generates a block box that is floated to the right."
    Right,
}

/// [§ 3 Scrolling and Clipping: the overflow-x, overflow-y, and overflow properties](https://www.w3.org/TR/css-overflow-3/#overflow-properties)
///
/// "These properties specify whether a box's content (including any ink
/// overflow) is clipped to its padding edge, and if so, whether it is a
/// scroll container that allows the user to scroll clipped parts of its
/// scrollable overflow area into view."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Overflow {
    /// "There is no special handling of overflow, that is, the box's
    /// content is rendered outside the box if positioned there."
    #[default]
    Visible,
    /// "This value indicates that the box's content is clipped to its
    /// padding box and that the UA must not provide any scrolling user
    /// interface."
    Hidden,
    /// "This value indicates that the box's content is clipped to its
    /// overflow clip edge and that no scrolling user interface should be
    /// provided by the UA."
    Clip,
    /// "This value indicates that the content is clipped to the padding
    /// box, but can be scrolled into view."
    Scroll,
    /// "Like scroll when the box has scrollable overflow; like hidden otherwise."
    Auto,
}

impl Overflow {
    /// Any value other than `visible` clips.
    #[must_use]
    pub const fn clips(self) -> bool {
        !matches!(self, Self::Visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_flow_positions() {
        assert!(PositionType::Absolute.is_out_of_flow());
        assert!(PositionType::Fixed.is_out_of_flow());
        assert!(!PositionType::Relative.is_out_of_flow());
        assert!(!PositionType::Sticky.is_out_of_flow());
    }

    #[test]
    fn test_static_is_not_positioned() {
        assert!(!PositionType::Static.is_positioned());
        assert!(PositionType::Sticky.is_positioned());
    }
}
