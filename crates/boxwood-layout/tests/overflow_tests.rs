//! Integration tests for layout and visual overflow aggregation.

use boxwood_layout::{
    BoxDimensions, BoxId, BoxTree, EdgeSizes, ElementId, LineBox, NoTheme, Rect, ThemeOverflow,
};
use boxwood_style::{BoxShadow, ComputedStyle, Direction, Overflow, PositionType, WritingMode};

fn place(tree: &mut BoxTree, id: BoxId, rect: Rect) {
    tree.get_mut(id).unwrap().dimensions = BoxDimensions::from_border_box(rect);
}

/// `root > parent > child`, the parent 100x100 at the origin.
fn parent_with_child(
    parent_style: ComputedStyle,
    child_style: ComputedStyle,
    child_rect: Rect,
) -> (BoxTree, BoxId, BoxId) {
    let mut tree = BoxTree::default();
    let root = tree.root();
    let parent = tree.create_element(ElementId(1), parent_style);
    let child = tree.create_element(ElementId(2), child_style);
    tree.append_child(root, parent).unwrap();
    tree.append_child(parent, child).unwrap();
    place(&mut tree, root, Rect::new(0.0, 0.0, 800.0, 600.0));
    place(&mut tree, parent, Rect::new(0.0, 0.0, 100.0, 100.0));
    place(&mut tree, child, child_rect);
    (tree, parent, child)
}

#[test]
fn test_overflowing_child_extends_both_rects() {
    let (mut tree, parent, _child) = parent_with_child(
        ComputedStyle::block(),
        ComputedStyle::block(),
        Rect::new(50.0, 50.0, 100.0, 100.0),
    );

    assert!(tree.compute_overflow(parent, 100.0, &NoTheme));
    assert_eq!(tree.layout_overflow_rect(parent), Rect::new(0.0, 0.0, 150.0, 150.0));
    assert_eq!(tree.visual_overflow_rect(parent), Rect::new(0.0, 0.0, 150.0, 150.0));

    // Nothing changed since the last computation.
    assert!(!tree.compute_overflow(parent, 100.0, &NoTheme));
}

#[test]
fn test_contained_child_reports_own_boxes() {
    let (mut tree, parent, _child) = parent_with_child(
        ComputedStyle::block(),
        ComputedStyle::block(),
        Rect::new(10.0, 10.0, 50.0, 50.0),
    );

    assert!(!tree.compute_overflow(parent, 100.0, &NoTheme));
    assert!(tree.get(parent).unwrap().overflow().is_none());
    assert_eq!(tree.layout_overflow_rect(parent), Rect::new(0.0, 0.0, 100.0, 100.0));
    assert_eq!(tree.visual_overflow_rect(parent), Rect::new(0.0, 0.0, 100.0, 100.0));
}

#[test]
fn test_start_side_overflow_is_kept_without_clip() {
    let (mut tree, parent, _child) = parent_with_child(
        ComputedStyle::block(),
        ComputedStyle::block(),
        Rect::new(-30.0, -30.0, 50.0, 50.0),
    );

    let _ = tree.compute_overflow(parent, 100.0, &NoTheme);
    assert_eq!(
        tree.layout_overflow_rect(parent),
        Rect::new(-30.0, -30.0, 130.0, 130.0)
    );
}

#[test]
fn test_scroll_container_clamps_start_side_overflow() {
    let (mut tree, parent, child) = parent_with_child(
        ComputedStyle::block().overflowing(Overflow::Hidden),
        ComputedStyle::block(),
        Rect::new(-30.0, -30.0, 50.0, 50.0),
    );

    let _ = tree.compute_overflow(parent, 100.0, &NoTheme);
    assert!(tree.get(parent).unwrap().overflow().is_none());

    place(&mut tree, child, Rect::new(-30.0, 80.0, 50.0, 50.0));
    let _ = tree.compute_overflow(parent, 100.0, &NoTheme);
    assert_eq!(tree.layout_overflow_rect(parent), Rect::new(0.0, 0.0, 100.0, 130.0));
    // Clipped content adds no ink.
    assert_eq!(tree.visual_overflow_rect(parent), Rect::new(0.0, 0.0, 100.0, 100.0));
}

#[test]
fn test_vertical_rtl_scroll_container_keeps_top_overflow() {
    let mut style = ComputedStyle::block().overflowing(Overflow::Auto);
    style.direction = Direction::Rtl;
    style.writing_mode = WritingMode::VerticalLr;
    let (mut tree, parent, _child) = parent_with_child(
        style,
        ComputedStyle::block(),
        Rect::new(10.0, -30.0, 50.0, 50.0),
    );

    let _ = tree.compute_overflow(parent, 100.0, &NoTheme);
    assert_eq!(
        tree.layout_overflow_rect(parent),
        Rect::new(0.0, -30.0, 100.0, 130.0)
    );
}

#[test]
fn test_rtl_scroll_container_keeps_left_overflow() {
    let mut style = ComputedStyle::block().overflowing(Overflow::Auto);
    style.direction = Direction::Rtl;
    let (mut tree, parent, _child) = parent_with_child(
        style,
        ComputedStyle::block(),
        Rect::new(-30.0, 10.0, 50.0, 50.0),
    );

    let _ = tree.compute_overflow(parent, 100.0, &NoTheme);
    assert_eq!(
        tree.layout_overflow_rect(parent),
        Rect::new(-30.0, 0.0, 130.0, 100.0)
    );
}

#[test]
fn test_scroll_container_keeps_end_spill_reachable() {
    let mut tree = BoxTree::default();
    let root = tree.root();
    let scroller = tree.create_element(
        ElementId(1),
        ComputedStyle::block().overflowing(Overflow::Scroll),
    );
    tree.append_child(root, scroller).unwrap();
    place(&mut tree, scroller, Rect::new(0.0, 0.0, 100.0, 100.0));

    let _ = tree.compute_overflow(scroller, 140.0, &NoTheme);
    assert_eq!(tree.layout_overflow_rect(scroller), Rect::new(0.0, 0.0, 100.0, 140.0));
}

#[test]
fn test_clipping_child_contributes_only_its_border_box() {
    let (mut tree, parent, child) = parent_with_child(
        ComputedStyle::block(),
        ComputedStyle::block().overflowing(Overflow::Hidden),
        Rect::new(0.0, 0.0, 50.0, 50.0),
    );
    let _ = tree.compute_overflow(child, 300.0, &NoTheme);
    assert_eq!(tree.layout_overflow_rect(child), Rect::new(0.0, 0.0, 50.0, 300.0));

    let _ = tree.compute_overflow(parent, 100.0, &NoTheme);
    assert!(tree.get(parent).unwrap().overflow().is_none());
}

#[test]
fn test_relative_offset_moves_child_overflow() {
    let mut child_style = ComputedStyle::block().positioned(PositionType::Relative);
    child_style.offsets.left = Some(20.0);
    let (mut tree, parent, _child) = parent_with_child(
        ComputedStyle::block(),
        child_style,
        Rect::new(0.0, 0.0, 100.0, 100.0),
    );

    let _ = tree.compute_overflow(parent, 100.0, &NoTheme);
    assert_eq!(tree.layout_overflow_rect(parent), Rect::new(0.0, 0.0, 120.0, 100.0));
}

#[test]
fn test_line_boxes_feed_inline_content_overflow() {
    let mut tree = BoxTree::default();
    let root = tree.root();
    let paragraph = tree.create_element(ElementId(1), ComputedStyle::block());
    let text = tree.create_text("a long unbreakable word");
    tree.append_child(root, paragraph).unwrap();
    tree.append_child(paragraph, text).unwrap();
    place(&mut tree, paragraph, Rect::new(0.0, 0.0, 100.0, 20.0));
    tree.get_mut(paragraph).unwrap().line_boxes = vec![LineBox {
        frame: Rect::new(0.0, 0.0, 100.0, 20.0),
        layout_overflow: Rect::new(0.0, 0.0, 180.0, 20.0),
        visual_overflow: Rect::new(0.0, 0.0, 180.0, 24.0),
    }];

    let _ = tree.compute_overflow(paragraph, 20.0, &NoTheme);
    assert_eq!(tree.layout_overflow_rect(paragraph), Rect::new(0.0, 0.0, 180.0, 20.0));
    assert_eq!(tree.visual_overflow_rect(paragraph), Rect::new(0.0, 0.0, 180.0, 24.0));
}

/// Places an out-of-flow box of the given position type far outside a
/// 200x200 root.
fn root_with_out_of_flow(position: PositionType) -> BoxTree {
    let mut tree = BoxTree::default();
    let root = tree.root();
    let positioned = tree.create_element(ElementId(1), ComputedStyle::block().positioned(position));
    tree.append_child(root, positioned).unwrap();
    place(&mut tree, root, Rect::new(0.0, 0.0, 200.0, 200.0));
    place(&mut tree, positioned, Rect::new(300.0, 300.0, 50.0, 50.0));
    let _ = tree.compute_overflow(root, 200.0, &NoTheme);
    tree
}

#[test]
fn test_fixed_descendant_adds_only_visual_overflow() {
    let tree = root_with_out_of_flow(PositionType::Fixed);
    let root = tree.root();
    assert_eq!(tree.layout_overflow_rect(root), Rect::new(0.0, 0.0, 200.0, 200.0));
    assert_eq!(tree.visual_overflow_rect(root), Rect::new(0.0, 0.0, 350.0, 350.0));
}

#[test]
fn test_absolute_descendant_adds_only_layout_overflow() {
    let tree = root_with_out_of_flow(PositionType::Absolute);
    let root = tree.root();
    assert_eq!(tree.layout_overflow_rect(root), Rect::new(0.0, 0.0, 350.0, 350.0));
    assert_eq!(tree.visual_overflow_rect(root), Rect::new(0.0, 0.0, 200.0, 200.0));
}

#[test]
fn test_box_shadow_and_outline_extend_visual_overflow() {
    let mut tree = BoxTree::default();
    let root = tree.root();
    let mut style = ComputedStyle::block();
    style.box_shadow = Some(BoxShadow {
        blur: 5.0,
        ..BoxShadow::default()
    });
    let shadowed = tree.create_element(ElementId(1), style);
    tree.append_child(root, shadowed).unwrap();
    place(&mut tree, shadowed, Rect::new(0.0, 0.0, 100.0, 100.0));

    let _ = tree.compute_overflow(shadowed, 100.0, &NoTheme);
    assert_eq!(tree.visual_overflow_rect(shadowed), Rect::new(-5.0, -5.0, 110.0, 110.0));
    assert_eq!(tree.layout_overflow_rect(shadowed), Rect::new(0.0, 0.0, 100.0, 100.0));

    let mut style = ComputedStyle::block();
    style.outline_width = 2.0;
    style.outline_offset = 1.0;
    let _ = tree.set_style(shadowed, style).unwrap();
    let _ = tree.compute_overflow(shadowed, 100.0, &NoTheme);
    assert_eq!(tree.visual_overflow_rect(shadowed), Rect::new(-3.0, -3.0, 106.0, 106.0));
}

#[test]
fn test_outline_pulled_inside_adds_nothing() {
    let mut tree = BoxTree::default();
    let root = tree.root();
    let mut style = ComputedStyle::block();
    style.outline_width = 2.0;
    style.outline_offset = -2.0;
    let outlined = tree.create_element(ElementId(1), style);
    tree.append_child(root, outlined).unwrap();
    place(&mut tree, outlined, Rect::new(0.0, 0.0, 100.0, 100.0));

    let _ = tree.compute_overflow(outlined, 100.0, &NoTheme);
    assert!(tree.get(outlined).unwrap().overflow().is_none());
}

struct FocusRing;

impl ThemeOverflow for FocusRing {
    fn visual_overflow(&self, _tree: &BoxTree, _id: BoxId, border_box: Rect) -> Option<Rect> {
        Some(border_box.expand(EdgeSizes::uniform(4.0)))
    }
}

#[test]
fn test_theme_decoration_extends_visual_overflow() {
    let mut tree = BoxTree::default();
    let root = tree.root();
    let button = tree.create_element(ElementId(1), ComputedStyle::block());
    tree.append_child(root, button).unwrap();
    place(&mut tree, button, Rect::new(10.0, 10.0, 80.0, 20.0));

    let _ = tree.compute_overflow(button, 20.0, &FocusRing);
    assert_eq!(tree.visual_overflow_rect(button), Rect::new(-4.0, -4.0, 88.0, 28.0));
}
