//! Overflow aggregation.
//!
//! [§ 2 Types of Overflow](https://www.w3.org/TR/css-overflow-3/#overflow-concepts)
//!
//! "It is possible for the content of a box to overflow its bounds. There
//! are two types of overflow that are useful to track: ink overflow and
//! scrollable overflow."
//!
//! Layout overflow is the scrollable overflow area and is measured against
//! the client (padding) box. Visual overflow is the ink overflow area and is
//! measured against the border box. Both are kept in the box's own
//! coordinate space, where its border box starts at the origin, and both are
//! recomputed from scratch only after the geometry of every child and
//! positioned descendant is final.

use serde::{Deserialize, Serialize};

use boxwood_style::{ComputedStyle, PhysicalSide, PositionType};

use crate::box_model::{EdgeSizes, Rect};
use crate::tree::{BoxId, BoxTree, LayoutBox};

/// One line box produced by the external inline layout, in the coordinate
/// space of the block that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LineBox {
    /// The line box itself.
    pub frame: Rect,
    /// Scrollable extent of the line's content.
    pub layout_overflow: Rect,
    /// Ink extent of the line's content.
    pub visual_overflow: Rect,
}

impl LineBox {
    /// A line whose content stays inside its frame.
    #[must_use]
    pub const fn new(frame: Rect) -> Self {
        Self {
            frame,
            layout_overflow: frame,
            visual_overflow: frame,
        }
    }

    /// The same line moved by `(dx, dy)`.
    #[must_use]
    pub fn translate(&self, dx: f32, dy: f32) -> Self {
        Self {
            frame: self.frame.translate(dx, dy),
            layout_overflow: self.layout_overflow.translate(dx, dy),
            visual_overflow: self.visual_overflow.translate(dx, dy),
        }
    }
}

/// Overflow that reaches past a box's own areas.
///
/// Only allocated for boxes whose content actually overflows; every other
/// box reports its client box and border box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OverflowRecord {
    /// Scrollable overflow, starting from the client box.
    pub layout: Rect,
    /// Ink overflow, starting from the border box.
    pub visual: Rect,
}

/// Platform decoration that paints outside the border box (focus rings,
/// native control chrome).
pub trait ThemeOverflow {
    /// Extra ink area for `id`, in its own coordinate space, or `None`.
    fn visual_overflow(&self, tree: &BoxTree, id: BoxId, border_box: Rect) -> Option<Rect>;
}

/// A theme that never paints outside the border box.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTheme;

impl ThemeOverflow for NoTheme {
    fn visual_overflow(&self, _tree: &BoxTree, _id: BoxId, _border_box: Rect) -> Option<Rect> {
        None
    }
}

/// [§ 9.4.3 Relative positioning](https://www.w3.org/TR/CSS2/visuren.html#relative-positioning)
///
/// "If both 'left' and 'right' are not 'auto', ... the value of 'right'
/// is ignored." The same holds for 'top' over 'bottom'.
fn relative_offset(style: &ComputedStyle) -> (f32, f32) {
    if style.position != PositionType::Relative {
        return (0.0, 0.0);
    }
    let dx = style
        .offsets
        .left
        .or_else(|| style.offsets.right.map(|r| -r))
        .unwrap_or(0.0);
    let dy = style
        .offsets
        .top
        .or_else(|| style.offsets.bottom.map(|b| -b))
        .unwrap_or(0.0);
    (dx, dy)
}

/// Running state of one overflow computation.
struct OverflowAccumulator {
    client_box: Rect,
    border_box: Rect,
    /// Clamp layout overflow to the reachable side of the client box.
    clamps: bool,
    has_top_overflow: bool,
    has_left_overflow: bool,
    clips: bool,
    record: Option<OverflowRecord>,
}

impl OverflowAccumulator {
    fn new(layout_box: &LayoutBox) -> Self {
        let style = layout_box.style();
        // Content running past the inline-start edge stays reachable when
        // that edge is the bottom or right side.
        let inline_start = style.writing_mode.inline_start_physical(style.direction);
        Self {
            client_box: layout_box.dimensions.local_padding_box(),
            border_box: layout_box.dimensions.local_border_box(),
            clamps: style.has_overflow_clip() || layout_box.is_viewport(),
            has_top_overflow: inline_start == PhysicalSide::Bottom,
            has_left_overflow: inline_start == PhysicalSide::Right,
            clips: style.has_overflow_clip(),
            record: None,
        }
    }

    fn record(&mut self) -> &mut OverflowRecord {
        let (layout, visual) = (self.client_box, self.border_box);
        self.record.get_or_insert(OverflowRecord { layout, visual })
    }

    /// Scrollable overflow never reaches into the area before the client
    /// box's start edges of a scroll container: that area is unreachable.
    fn add_layout_overflow(&mut self, rect: Rect) {
        if rect.is_empty() || self.client_box.contains(&rect) {
            return;
        }
        let mut rect = rect;
        if self.clamps {
            if self.has_top_overflow {
                rect.shift_max_y_edge_to(rect.max_y().min(self.client_box.max_y()));
            } else {
                rect.shift_y_edge_to(rect.y.max(self.client_box.y));
            }
            if self.has_left_overflow {
                rect.shift_max_x_edge_to(rect.max_x().min(self.client_box.max_x()));
            } else {
                rect.shift_x_edge_to(rect.x.max(self.client_box.x));
            }
            if rect.is_empty() || self.client_box.contains(&rect) {
                return;
            }
        }
        let record = self.record();
        record.layout = record.layout.union(&rect);
    }

    fn add_visual_overflow(&mut self, rect: Rect) {
        if rect.is_empty() || self.border_box.contains(&rect) {
            return;
        }
        let record = self.record();
        record.visual = record.visual.union(&rect);
    }

    /// Propagate a child's overflow, given the child's origin in this box's
    /// coordinate space.
    fn add_overflow_from_child(&mut self, child: &LayoutBox, dx: f32, dy: f32) {
        // A clipping child keeps its overflow to itself; only its border box
        // is scrollable from here.
        let mut layout = child.dimensions.local_border_box();
        if !child.style().has_overflow_clip() {
            layout = layout.union(&child_layout_overflow(child));
        }
        self.add_layout_overflow(layout.translate(dx, dy));

        if child.style().position.is_positioned() || self.clips {
            return;
        }
        self.add_visual_overflow(child_visual_overflow(child).translate(dx, dy));
    }
}

fn child_layout_overflow(layout_box: &LayoutBox) -> Rect {
    layout_box
        .overflow()
        .map_or_else(|| layout_box.dimensions.local_padding_box(), |o| o.layout)
}

fn child_visual_overflow(layout_box: &LayoutBox) -> Rect {
    layout_box
        .overflow()
        .map_or_else(|| layout_box.dimensions.local_border_box(), |o| o.visual)
}

impl BoxTree {
    /// Scrollable overflow of `id` in its own coordinate space. Without an
    /// overflow record this is the client box.
    #[must_use]
    pub fn layout_overflow_rect(&self, id: BoxId) -> Rect {
        self.get(id).map_or_else(Rect::default, child_layout_overflow)
    }

    /// Ink overflow of `id` in its own coordinate space. Without an overflow
    /// record this is the border box.
    #[must_use]
    pub fn visual_overflow_rect(&self, id: BoxId) -> Rect {
        self.get(id).map_or_else(Rect::default, child_visual_overflow)
    }

    /// Translation from `descendant`'s coordinate space into `ancestor`'s.
    fn offset_from_ancestor(&self, descendant: BoxId, ancestor: BoxId) -> (f32, f32) {
        let (mut dx, mut dy) = (0.0, 0.0);
        let mut current = descendant;
        while current != ancestor {
            let Some(layout_box) = self.get(current) else {
                break;
            };
            let origin = layout_box.dimensions.border_box();
            dx += origin.x;
            dy += origin.y;
            match layout_box.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }
        (dx, dy)
    }

    /// Recompute the overflow record of `id` from its children, its
    /// positioned descendants and its own visual effects.
    ///
    /// `old_client_after_edge` is the block-end edge of the content before
    /// the box's own height was applied. For a box that clips, the span
    /// between the client box start and that edge stays scrollable so that
    /// collapsed-through margins and end padding remain reachable.
    ///
    /// Must only run once the geometry of every child and positioned
    /// descendant of `id` is final. Returns whether the record changed.
    pub fn compute_overflow(
        &mut self,
        id: BoxId,
        old_client_after_edge: f32,
        theme: &dyn ThemeOverflow,
    ) -> bool {
        let Some(layout_box) = self.get(id) else {
            return false;
        };
        let mut acc = OverflowAccumulator::new(layout_box);

        // STEP 1: In-flow content.
        if layout_box.children_inline() {
            for line in &layout_box.line_boxes {
                acc.add_layout_overflow(line.layout_overflow);
                if !acc.clips {
                    acc.add_visual_overflow(line.visual_overflow);
                }
            }
        } else {
            for &child_id in layout_box.children() {
                let Some(child) = self.get(child_id) else {
                    continue;
                };
                if child.is_floating_or_out_of_flow() {
                    continue;
                }
                let origin = child.dimensions.border_box();
                let (rx, ry) = relative_offset(child.style());
                acc.add_overflow_from_child(child, origin.x + rx, origin.y + ry);
            }
        }

        // STEP 2: Floats.
        // [§ 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats)
        for &child_id in layout_box.children() {
            let Some(child) = self.get(child_id) else {
                continue;
            };
            if child.is_floating() {
                let origin = child.dimensions.border_box();
                acc.add_overflow_from_child(child, origin.x, origin.y);
            }
        }

        // STEP 3: Positioned descendants.
        //
        // Fixed-position boxes do not scroll with the container, so they add
        // no scrollable overflow. Their ink still counts.
        for descendant in self.indices.positioned.descendants_of(id) {
            let Some(positioned) = self.get(descendant) else {
                continue;
            };
            let (dx, dy) = self.offset_from_ancestor(descendant, id);
            if positioned.is_fixed_position() {
                if !acc.clips {
                    acc.add_visual_overflow(child_visual_overflow(positioned).translate(dx, dy));
                }
            } else {
                acc.add_overflow_from_child(positioned, dx, dy);
            }
        }

        // STEP 4: Keep the end-edge spill of a scroll container reachable.
        // The axis that does not matter is 1 wide so it is always reachable.
        if acc.clips {
            let client = acc.client_box;
            let spill = match layout_box.style().writing_mode.block_end_physical() {
                PhysicalSide::Top | PhysicalSide::Bottom => Rect::new(
                    client.x,
                    client.y,
                    1.0,
                    (old_client_after_edge - client.y).max(0.0),
                ),
                PhysicalSide::Left | PhysicalSide::Right => Rect::new(
                    client.x,
                    client.y,
                    (old_client_after_edge - client.x).max(0.0),
                    1.0,
                ),
            };
            acc.add_layout_overflow(spill);
        }

        // STEP 5: Visual effects.
        // [§ 6.1 box-shadow](https://www.w3.org/TR/css-backgrounds-3/#box-shadow)
        // [§ 3 Outline properties](https://www.w3.org/TR/css-ui-4/#outline-props)
        let style = layout_box.style();
        if let Some(shadow) = style.box_shadow {
            let (top, right, bottom, left) = shadow.outsets();
            acc.add_visual_overflow(acc.border_box.expand(EdgeSizes {
                top,
                right,
                bottom,
                left,
            }));
        }
        let outline = style.outline_width + style.outline_offset;
        if style.outline_width > 0.0 && outline > 0.0 {
            acc.add_visual_overflow(acc.border_box.expand(EdgeSizes::uniform(outline)));
        }

        // STEP 6: Platform decoration.
        if let Some(rect) = theme.visual_overflow(self, id, acc.border_box) {
            acc.add_visual_overflow(rect);
        }

        let record = acc.record.map(Box::new);
        let Some(layout_box) = self.get_mut(id) else {
            return false;
        };
        let changed = layout_box.overflow != record;
        layout_box.overflow = record;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::box_model::BoxDimensions;
    use crate::tree::ElementId;

    #[test]
    fn test_contained_content_allocates_no_record() {
        let mut tree = BoxTree::default();
        let root = tree.root();
        let block = tree.create_element(ElementId(1), ComputedStyle::block());
        tree.link_child(root, block, None);
        if let Some(b) = tree.get_mut(block) {
            b.dimensions = BoxDimensions::from_border_box(Rect::new(0.0, 0.0, 100.0, 50.0));
        }
        if let Some(r) = tree.get_mut(root) {
            r.dimensions = BoxDimensions::from_border_box(Rect::new(0.0, 0.0, 200.0, 200.0));
        }
        assert!(!tree.compute_overflow(root, 0.0, &NoTheme));
        assert!(tree.get(root).is_some_and(|r| r.overflow().is_none()));
    }

    #[test]
    fn test_relative_offset_prefers_left_and_top() {
        let mut style = ComputedStyle::block().positioned(PositionType::Relative);
        style.offsets.left = Some(5.0);
        style.offsets.right = Some(50.0);
        style.offsets.bottom = Some(3.0);
        assert_eq!(relative_offset(&style), (5.0, -3.0));
    }
}
