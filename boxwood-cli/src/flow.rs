//! A small flow layout used to give scenario boxes geometry.
//!
//! Blocks stack vertically and take the width of their containing block,
//! inline content is broken into line boxes, floats and atomic inlines take
//! half the available width, and out-of-flow boxes are placed from their
//! offsets. Text is measured with approximate font metrics.

use boxwood_layout::{
    BoxId, BoxLayoutOutput, BoxTree, BoxType, LayoutAlgorithm, LayoutBox, LineBox, Rect,
};
use boxwood_style::{AutoLength, FloatSide};

/// [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
///
/// Without font data the average advance is 0.6em and `line-height: normal`
/// is 1.2em.
const FONT_SIZE: f32 = 16.0;
const CHAR_WIDTH_RATIO: f32 = 0.6;
const LINE_HEIGHT_RATIO: f32 = 1.2;

#[allow(clippy::cast_precision_loss)]
fn text_width(text: &str) -> f32 {
    text.chars().count() as f32 * FONT_SIZE * CHAR_WIDTH_RATIO
}

const fn line_height() -> f32 {
    FONT_SIZE * LINE_HEIGHT_RATIO
}

/// Lays out scenario trees inside a fixed viewport.
#[derive(Debug, Clone, Copy)]
pub struct FlowLayout {
    viewport_width: f32,
    viewport_height: f32,
}

impl FlowLayout {
    /// A layout for a viewport of the given size.
    pub const fn new(viewport_width: f32, viewport_height: f32) -> Self {
        Self {
            viewport_width,
            viewport_height,
        }
    }

    /// Content size of the box that `id` is laid out against.
    fn containing_block_size(&self, tree: &BoxTree, id: BoxId) -> (f32, f32) {
        tree.containing_block(id)
            .and_then(|cb| tree.get(cb))
            .map_or((self.viewport_width, self.viewport_height), |cb| {
                let content = cb.dimensions.content;
                (content.width, content.height)
            })
    }

    /// [§ 10.5 Content height: the 'height' property](https://www.w3.org/TR/CSS2/visudet.html#the-height-property)
    ///
    /// "If the height of the containing block is not specified explicitly
    /// (i.e., it depends on content height), and this element is not
    /// absolutely positioned, the value computes to 'auto'."
    fn used_height(&self, tree: &BoxTree, id: BoxId, content_height: f32) -> f32 {
        if id == tree.root() {
            return self.viewport_height.max(content_height);
        }
        let Some(layout_box) = tree.get(id) else {
            return content_height;
        };
        match layout_box.style().height {
            AutoLength::Px(px) => px,
            AutoLength::Percent(percent) => {
                let definite = tree.containing_block(id).is_some_and(|cb| {
                    cb == tree.root()
                        || layout_box.is_out_of_flow()
                        || tree.get(cb).is_some_and(|b| b.style().height.is_fixed())
                });
                if definite {
                    self.containing_block_size(tree, id).1 * percent / 100.0
                } else {
                    content_height
                }
            }
            AutoLength::Auto => content_height,
        }
    }

    /// [§ 9.4.1 Block formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
    ///
    /// "In a block formatting context, boxes are laid out one after the
    /// other, vertically, beginning at the top of a containing block."
    fn layout_block_children(tree: &mut BoxTree, id: BoxId, width: f32) -> f32 {
        let mut cursor = 0.0;
        for child in tree.children(id).to_vec() {
            let Some(child_box) = tree.get_mut(child) else {
                continue;
            };
            if child_box.is_out_of_flow() {
                continue;
            }
            let size = child_box.dimensions.border_box();
            if child_box.is_floating() {
                let x = if child_box.style().float == Some(FloatSide::Right) {
                    width - size.width
                } else {
                    0.0
                };
                move_border_box_to(child_box, x, cursor);
                continue;
            }
            move_border_box_to(child_box, 0.0, cursor);
            cursor += size.height;
        }
        cursor
    }

    /// [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
    ///
    /// "In an inline formatting context, boxes are laid out horizontally,
    /// one after the other, beginning at the top of a containing block."
    ///
    /// Returns the width of the widest line and the total height.
    fn layout_inline_children(tree: &mut BoxTree, id: BoxId, available: f32) -> (f32, f32) {
        let mut lines = Vec::new();
        let (mut x, mut y, mut line_max) = (0.0_f32, 0.0_f32, 0.0_f32);
        let mut widest = 0.0_f32;

        for child in tree.children(id).to_vec() {
            let Some(child_box) = tree.get_mut(child) else {
                continue;
            };
            if child_box.is_out_of_flow() {
                continue;
            }
            let size = child_box.dimensions.border_box();
            // "When an inline box exceeds the width of a line box, it is
            // split into several boxes and these boxes are distributed
            // across several line boxes."
            if x > 0.0 && x + size.width > available {
                lines.push(finish_line(y, x, line_max, available));
                widest = widest.max(x);
                y += line_max;
                x = 0.0;
                line_max = 0.0;
            }
            move_border_box_to(child_box, x, y);
            x += size.width;
            line_max = line_max.max(size.height);
        }
        if x > 0.0 || line_max > 0.0 {
            lines.push(finish_line(y, x, line_max, available));
            widest = widest.max(x);
            y += line_max;
        }

        if let Some(layout_box) = tree.get_mut(id) {
            layout_box.line_boxes = lines;
        }
        (widest, y)
    }
}

/// A line box whose content may run past the end of the line.
fn finish_line(y: f32, content_width: f32, height: f32, available: f32) -> LineBox {
    let width = if available.is_finite() {
        available
    } else {
        content_width
    };
    let mut line = LineBox::new(Rect::new(0.0, y, width, height));
    if content_width > width {
        let content = Rect::new(0.0, y, content_width, height);
        line.layout_overflow = line.layout_overflow.union(&content);
        line.visual_overflow = line.visual_overflow.union(&content);
    }
    line
}

fn move_border_box_to(layout_box: &mut LayoutBox, x: f32, y: f32) {
    let border_box = layout_box.dimensions.border_box();
    layout_box.dimensions.content.x += x - border_box.x;
    layout_box.dimensions.content.y += y - border_box.y;
}

impl LayoutAlgorithm for FlowLayout {
    fn logical_width(&mut self, tree: &mut BoxTree, id: BoxId) -> f32 {
        let (cb_width, _) = self.containing_block_size(tree, id);
        let Some(layout_box) = tree.get(id) else {
            return 0.0;
        };
        let width = if id == tree.root() {
            self.viewport_width
        } else if let BoxType::Text(text) = layout_box.box_type() {
            text_width(text)
        } else if layout_box.is_out_of_flow() {
            let offsets = layout_box.style().offsets;
            match (offsets.left, offsets.right) {
                (Some(left), Some(right)) => (cb_width - left - right).max(0.0),
                _ => cb_width / 2.0,
            }
        } else if layout_box.is_floating()
            || (layout_box.is_inline() && layout_box.style().used_display().is_atomic_inline())
        {
            cb_width / 2.0
        } else if layout_box.is_inline() {
            // Inline boxes shrink to their content once it is laid out.
            layout_box.dimensions.content.width
        } else {
            cb_width
        };
        if let Some(layout_box) = tree.get_mut(id) {
            layout_box.dimensions.content.width = width;
        }
        width
    }

    fn layout_box(&mut self, tree: &mut BoxTree, id: BoxId) -> BoxLayoutOutput {
        let Some(layout_box) = tree.get(id) else {
            return BoxLayoutOutput::default();
        };
        if layout_box.is_text() {
            if let Some(layout_box) = tree.get_mut(id) {
                layout_box.dimensions.content.height = line_height();
            }
            return BoxLayoutOutput::default();
        }

        let width = layout_box.dimensions.content.width;
        let shrinks = layout_box.is_inline() && !layout_box.style().used_display().is_atomic_inline();
        let content_height = if layout_box.children_inline() {
            let available = if shrinks { f32::INFINITY } else { width };
            let (widest, height) = Self::layout_inline_children(tree, id, available);
            if shrinks && let Some(layout_box) = tree.get_mut(id) {
                layout_box.dimensions.content.width = widest;
            }
            height
        } else {
            Self::layout_block_children(tree, id, width)
        };

        let height = self.used_height(tree, id, content_height);
        if let Some(layout_box) = tree.get_mut(id) {
            layout_box.dimensions.content.height = height;
        }
        BoxLayoutOutput {
            client_after_edge: Some(content_height),
        }
    }

    /// [§ 10.3.7 Absolutely positioned, non-replaced elements](https://www.w3.org/TR/CSS2/visudet.html#abs-non-replaced-width)
    ///
    /// 'left' wins over 'right' and 'top' over 'bottom'; with neither the
    /// box sits at the start of its containing block.
    fn place_out_of_flow(&mut self, tree: &mut BoxTree, id: BoxId) {
        let (cb_width, cb_height) = self.containing_block_size(tree, id);
        let Some(cb) = tree.containing_block(id) else {
            return;
        };
        let (dx, dy) = offset_between(tree, id, cb);
        let Some(layout_box) = tree.get_mut(id) else {
            return;
        };
        let offsets = layout_box.style().offsets;
        let size = layout_box.dimensions.border_box();
        let x = offsets
            .left
            .or_else(|| offsets.right.map(|right| cb_width - right - size.width))
            .unwrap_or(0.0);
        let y = offsets
            .top
            .or_else(|| offsets.bottom.map(|bottom| cb_height - bottom - size.height))
            .unwrap_or(0.0);
        move_border_box_to(layout_box, x - dx, y - dy);
    }
}

/// Origin of `id`'s parent inside `ancestor`'s border box.
fn offset_between(tree: &BoxTree, id: BoxId, ancestor: BoxId) -> (f32, f32) {
    let (mut dx, mut dy) = (0.0, 0.0);
    for current in tree.ancestors(id) {
        if current == ancestor {
            break;
        }
        if let Some(layout_box) = tree.get(current) {
            let border_box = layout_box.dimensions.border_box();
            dx += border_box.x;
            dy += border_box.y;
        }
    }
    (dx, dy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxwood_layout::{ElementId, LayoutScheduler};
    use boxwood_style::{ComputedStyle, PositionType};

    #[test]
    fn test_text_wraps_into_line_boxes() {
        let mut tree = BoxTree::default();
        let root = tree.root();
        let paragraph = tree.create_element(ElementId(1), ComputedStyle::block());
        tree.append_child(root, paragraph).unwrap();
        for word in ["aaaaaaaaaa", "bbbbbbbbbb", "cccccccccc"] {
            let text = tree.create_text(word);
            tree.append_child(paragraph, text).unwrap();
        }

        // Each word is 96px wide; two fit on a 200px line.
        let mut layout = FlowLayout::new(200.0, 100.0);
        let _ = LayoutScheduler::default().run_pass(&mut tree, &mut layout);

        let paragraph_box = tree.get(paragraph).unwrap();
        assert_eq!(paragraph_box.line_boxes.len(), 2);
        assert_eq!(paragraph_box.dimensions.content.height, 2.0 * line_height());
    }

    #[test]
    fn test_absolute_box_is_placed_from_its_offsets() {
        let mut tree = BoxTree::default();
        let root = tree.root();
        let container = tree.create_element(
            ElementId(1),
            ComputedStyle::block().positioned(PositionType::Relative),
        );
        let mut style = ComputedStyle::block().positioned(PositionType::Absolute);
        style.offsets.left = Some(10.0);
        style.offsets.top = Some(5.0);
        let abs = tree.create_element(ElementId(2), style);
        tree.append_child(root, container).unwrap();
        tree.append_child(container, abs).unwrap();

        let mut layout = FlowLayout::new(400.0, 300.0);
        let _ = LayoutScheduler::default().run_pass(&mut tree, &mut layout);

        let content = tree.get(abs).unwrap().dimensions.content;
        assert_eq!((content.x, content.y, content.width), (10.0, 5.0, 200.0));
    }
}
