//! Box geometry: rectangles, edge sizes and the four box areas.
//!
//! [CSS Box Model Module Level 3](https://www.w3.org/TR/css-box-3/)
//!
//! Geometry is written by the external layout algorithm. Every box stores its
//! content rectangle in the coordinate space of its parent's border box; the
//! overflow aggregator works in the box's own border-box space, where the
//! border box starts at the origin.

use serde::{Deserialize, Serialize};

/// A rectangle positioned in 2D space.
///
/// [§ 3 The CSS Box Model](https://www.w3.org/TR/css-box-3/#box-model)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Horizontal position of the top-left corner.
    pub x: f32,
    /// Vertical position of the top-left corner.
    pub y: f32,
    /// Width of the rectangle.
    pub width: f32,
    /// Height of the rectangle.
    pub height: f32,
}

impl Rect {
    /// Construct a rectangle from its origin and size.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge.
    #[must_use]
    pub fn max_x(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn max_y(&self) -> f32 {
        self.y + self.height
    }

    /// A rectangle with no area contributes nothing to a union.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Whether `other` lies entirely inside `self` (edges inclusive).
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.max_x() <= self.max_x()
            && other.max_y() <= self.max_y()
    }

    /// Smallest rectangle containing both. Empty operands are ignored.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        if other.is_empty() {
            return *self;
        }
        if self.is_empty() {
            return *other;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Self {
            x,
            y,
            width: self.max_x().max(other.max_x()) - x,
            height: self.max_y().max(other.max_y()) - y,
        }
    }

    /// The rectangle moved by `(dx, dy)`.
    #[must_use]
    pub fn translate(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Grow each side outward by the matching edge size.
    #[must_use]
    pub fn expand(&self, edges: EdgeSizes) -> Self {
        Self {
            x: self.x - edges.left,
            y: self.y - edges.top,
            width: self.width + edges.left + edges.right,
            height: self.height + edges.top + edges.bottom,
        }
    }

    /// Move the left edge to `x`, keeping the right edge in place.
    pub fn shift_x_edge_to(&mut self, x: f32) {
        self.width = (self.max_x() - x).max(0.0);
        self.x = x;
    }

    /// Move the top edge to `y`, keeping the bottom edge in place.
    pub fn shift_y_edge_to(&mut self, y: f32) {
        self.height = (self.max_y() - y).max(0.0);
        self.y = y;
    }

    /// Move the right edge to `max_x`, keeping the left edge in place.
    pub fn shift_max_x_edge_to(&mut self, max_x: f32) {
        self.width = (max_x - self.x).max(0.0);
    }

    /// Move the bottom edge to `max_y`, keeping the top edge in place.
    pub fn shift_max_y_edge_to(&mut self, max_y: f32) {
        self.height = (max_y - self.y).max(0.0);
    }
}

/// Edge sizes for padding, border, or margin.
///
/// [§ 3 The CSS Box Model](https://www.w3.org/TR/css-box-3/#box-model)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeSizes {
    /// Top edge size.
    pub top: f32,
    /// Right edge size.
    pub right: f32,
    /// Bottom edge size.
    pub bottom: f32,
    /// Left edge size.
    pub left: f32,
}

impl EdgeSizes {
    /// The same size on every side.
    #[must_use]
    pub const fn uniform(size: f32) -> Self {
        Self {
            top: size,
            right: size,
            bottom: size,
            left: size,
        }
    }
}

/// [§ 3. The CSS Box Model](https://www.w3.org/TR/css-box-3/#box-model)
///
/// "Each box has a content area and optional surrounding padding, border,
/// and margin areas."
///
/// `content` is expressed in the parent's border-box coordinate space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxDimensions {
    /// Content area dimensions
    pub content: Rect,
    /// Padding edge (content + padding)
    pub padding: EdgeSizes,
    /// Border edge (content + padding + border)
    pub border: EdgeSizes,
    /// Margin edge (content + padding + border + margin)
    pub margin: EdgeSizes,
}

impl BoxDimensions {
    /// A box without padding, border or margin whose border box is `rect`.
    #[must_use]
    pub fn from_border_box(rect: Rect) -> Self {
        Self {
            content: rect,
            ..Self::default()
        }
    }

    /// [§ 3.2 Padding](https://www.w3.org/TR/css-box-3/#paddings)
    ///
    /// "The padding box contains both the content and padding areas."
    #[must_use]
    pub fn padding_box(&self) -> Rect {
        self.content.expand(self.padding)
    }

    /// [§ 3.3 Borders](https://www.w3.org/TR/css-box-3/#borders)
    ///
    /// "The border box contains content, padding, and border areas."
    ///
    /// ```text
    /// x = content.x - padding.left - border.left
    /// y = content.y - padding.top - border.top
    /// ```
    #[must_use]
    pub fn border_box(&self) -> Rect {
        self.padding_box().expand(self.border)
    }

    /// [§ 3.1 Margins](https://www.w3.org/TR/css-box-3/#margins)
    ///
    /// "The margin box is the outermost box, and contains all four areas."
    #[must_use]
    pub fn margin_box(&self) -> Rect {
        self.border_box().expand(self.margin)
    }

    /// The border box in the box's own coordinate space (origin at its
    /// top-left corner).
    #[must_use]
    pub fn local_border_box(&self) -> Rect {
        let border_box = self.border_box();
        Rect::new(0.0, 0.0, border_box.width, border_box.height)
    }

    /// The padding box in the box's own coordinate space. This is the
    /// client box that scrollable overflow is measured against.
    #[must_use]
    pub fn local_padding_box(&self) -> Rect {
        let padding_box = self.padding_box();
        Rect::new(
            self.border.left,
            self.border.top,
            padding_box.width,
            padding_box.height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_ignores_empty_rects() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(a.union(&Rect::default()), a);
        assert_eq!(Rect::default().union(&a), a);
        assert_eq!(
            a.union(&Rect::new(5.0, -5.0, 20.0, 5.0)),
            Rect::new(0.0, -5.0, 25.0, 15.0)
        );
    }

    #[test]
    fn test_border_box_expands_padding_and_border() {
        let dims = BoxDimensions {
            content: Rect::new(15.0, 15.0, 100.0, 50.0),
            padding: EdgeSizes::uniform(10.0),
            border: EdgeSizes::uniform(5.0),
            margin: EdgeSizes::uniform(20.0),
        };
        assert_eq!(dims.border_box(), Rect::new(0.0, 0.0, 130.0, 80.0));
        assert_eq!(dims.margin_box(), Rect::new(-20.0, -20.0, 170.0, 120.0));
        assert_eq!(dims.local_padding_box(), Rect::new(5.0, 5.0, 120.0, 70.0));
    }

    #[test]
    fn test_shift_edges_keep_opposite_edge() {
        let mut rect = Rect::new(-10.0, -10.0, 30.0, 30.0);
        rect.shift_x_edge_to(0.0);
        rect.shift_y_edge_to(0.0);
        assert_eq!(rect, Rect::new(0.0, 0.0, 20.0, 20.0));
    }
}
