//! Property tests: random mutation and restyle sequences keep the tree
//! legal.

use std::cell::RefCell;
use std::rc::Rc;

use boxwood_layout::{BoxDimensions, BoxId, BoxTree, ElementId, NoTheme, Rect, ScrollInfoBatch};
use boxwood_style::{ComputedStyle, FloatSide, Overflow, PositionType};
use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;

#[derive(Debug, Clone, Copy)]
enum Kind {
    Block,
    Inline,
    Text,
    Float,
    Relative,
    Absolute,
}

impl Kind {
    fn style(self) -> Option<ComputedStyle> {
        match self {
            Self::Text => None,
            Self::Block => Some(ComputedStyle::block()),
            Self::Inline => Some(ComputedStyle::inline()),
            Self::Float => Some(ComputedStyle::block().floated(FloatSide::Left)),
            Self::Relative => Some(ComputedStyle::block().positioned(PositionType::Relative)),
            Self::Absolute => Some(ComputedStyle::block().positioned(PositionType::Absolute)),
        }
    }

    fn create(self, tree: &mut BoxTree, element: u64) -> BoxId {
        match self.style() {
            Some(style) => tree.create_element(ElementId(element), style),
            None => tree.create_text("t"),
        }
    }
}

/// One mutation. Box choices are indices into the boxes created so far,
/// taken modulo their count.
#[derive(Debug, Clone)]
enum Op {
    Append { parent: usize, kind: Kind },
    InsertBefore { parent: usize, before: usize, kind: Kind },
    Remove { target: usize },
    Destroy { target: usize },
    Restyle { target: usize, kind: Kind },
    Reclaim,
}

impl Arbitrary for Kind {
    fn arbitrary(g: &mut Gen) -> Self {
        *g.choose(&[
            Self::Block,
            Self::Block,
            Self::Inline,
            Self::Text,
            Self::Text,
            Self::Float,
            Self::Relative,
            Self::Absolute,
        ])
        .unwrap_or(&Self::Block)
    }
}

impl Arbitrary for Op {
    fn arbitrary(g: &mut Gen) -> Self {
        let index = usize::arbitrary(g);
        let other = usize::arbitrary(g);
        let kind = Kind::arbitrary(g);
        match u8::arbitrary(g) % 12 {
            0..=3 => Self::Append {
                parent: index,
                kind,
            },
            4..=5 => Self::InsertBefore {
                parent: index,
                before: other,
                kind,
            },
            6..=7 => Self::Remove { target: index },
            8 => Self::Destroy { target: index },
            9..=10 => Self::Restyle {
                target: index,
                kind,
            },
            _ => Self::Reclaim,
        }
    }
}

fn pick(boxes: &[BoxId], index: usize) -> BoxId {
    boxes[index % boxes.len()]
}

/// Apply `ops` to a fresh tree. Operations the tree rejects are skipped.
fn apply(ops: &[Op]) -> BoxTree {
    let mut tree = BoxTree::default();
    let mut boxes = vec![tree.root()];
    let mut next_element = 1;

    for op in ops {
        boxes.retain(|&id| tree.is_live(id));
        match *op {
            Op::Append { parent, kind } => {
                let parent = pick(&boxes, parent);
                let child = kind.create(&mut tree, next_element);
                next_element += 1;
                if tree.append_child(parent, child).is_ok() {
                    boxes.push(child);
                } else {
                    tree.destroy_box(child).unwrap();
                }
            }
            Op::InsertBefore {
                parent,
                before,
                kind,
            } => {
                let parent = pick(&boxes, parent);
                let children = tree.children(parent).to_vec();
                if children.is_empty() {
                    continue;
                }
                let before = children[before % children.len()];
                let child = kind.create(&mut tree, next_element);
                next_element += 1;
                if tree.insert_child(parent, child, Some(before)).is_ok() {
                    boxes.push(child);
                } else {
                    tree.destroy_box(child).unwrap();
                }
            }
            Op::Remove { target } => {
                let target = pick(&boxes, target);
                if let Some(parent) = tree.parent(target)
                    && tree.get(target).is_some_and(|b| !b.is_anonymous())
                {
                    tree.remove_child(parent, target).unwrap();
                    tree.destroy_box(target).unwrap();
                }
            }
            Op::Destroy { target } => {
                let target = pick(&boxes, target);
                if target != tree.root() && tree.get(target).is_some_and(|b| !b.is_anonymous()) {
                    tree.destroy_box(target).unwrap();
                }
            }
            Op::Restyle { target, kind } => {
                let target = pick(&boxes, target);
                let restylable = target != tree.root()
                    && tree
                        .get(target)
                        .is_some_and(|b| !b.is_anonymous() && !b.is_text());
                if restylable && let Some(style) = kind.style() {
                    let _ = tree.set_style(target, style).unwrap();
                }
            }
            Op::Reclaim => {
                let _ = tree.reclaim_dead_boxes();
            }
        }
    }
    tree
}

#[quickcheck]
fn prop_mutations_preserve_invariants(ops: Vec<Op>) -> bool {
    let tree = apply(&ops);
    let violations = tree.check_invariants();
    if !violations.is_empty() {
        eprintln!("{violations:?}\n{}", tree.dump(tree.root()));
    }
    violations.is_empty()
}

#[quickcheck]
fn prop_descendant_indices_stay_symmetric(ops: Vec<Op>) -> bool {
    let tree = apply(&ops);
    tree.positioned_index().is_symmetric() && tree.percent_height_index().is_symmetric()
}

#[quickcheck]
fn prop_positioned_index_matches_containing_blocks(ops: Vec<Op>) -> bool {
    let tree = apply(&ops);
    tree.positioned_index()
        .memberships()
        .into_iter()
        .all(|(container, descendant)| tree.containing_block(descendant) == Some(container))
}

#[quickcheck]
fn prop_no_adjacent_anonymous_blocks(ops: Vec<Op>) -> bool {
    let tree = apply(&ops);
    tree.subtree(tree.root()).into_iter().all(|id| {
        tree.children(id).windows(2).all(|pair| {
            !pair
                .iter()
                .all(|&c| tree.get(c).is_some_and(|b| b.is_anonymous_block()))
        })
    })
}

fn collapse_wrappers_everywhere(tree: &mut BoxTree) {
    for id in tree.subtree(tree.root()) {
        if tree.is_live(id) {
            tree.remove_anonymous_wrappers_if_required(id).unwrap();
        }
    }
}

#[quickcheck]
fn prop_wrapper_collapse_is_idempotent(ops: Vec<Op>) -> bool {
    let mut tree = apply(&ops);
    collapse_wrappers_everywhere(&mut tree);
    let once = tree.dump(tree.root());
    collapse_wrappers_everywhere(&mut tree);
    tree.dump(tree.root()) == once && tree.check_invariants().is_empty()
}

/// A child rectangle within a few hundred pixels of a 100x100 parent.
fn child_rect(x: i8, y: i8, w: u8, h: u8) -> Rect {
    Rect::new(
        f32::from(x),
        f32::from(y),
        f32::from(w % 200),
        f32::from(h % 200),
    )
}

#[quickcheck]
fn prop_overflow_contains_own_boxes(children: Vec<(i8, i8, u8, u8)>, clips: bool) -> bool {
    let mut tree = BoxTree::default();
    let root = tree.root();
    let style = if clips {
        ComputedStyle::block().overflowing(Overflow::Hidden)
    } else {
        ComputedStyle::block()
    };
    let parent = tree.create_element(ElementId(1), style);
    tree.append_child(root, parent).unwrap();
    tree.get_mut(parent).unwrap().dimensions =
        BoxDimensions::from_border_box(Rect::new(0.0, 0.0, 100.0, 100.0));
    let mut element = 1;
    for &(x, y, w, h) in &children {
        element += 1;
        let child = tree.create_element(ElementId(element), ComputedStyle::block());
        tree.append_child(parent, child).unwrap();
        tree.get_mut(child).unwrap().dimensions =
            BoxDimensions::from_border_box(child_rect(x, y, w, h));
    }

    let _ = tree.compute_overflow(parent, 100.0, &NoTheme);
    let own = tree.get(parent).unwrap().dimensions.local_border_box();
    let layout = tree.layout_overflow_rect(parent);
    let visual = tree.visual_overflow_rect(parent);
    let clamped = !clips || (layout.x >= 0.0 && layout.y >= 0.0);

    layout.contains(&own)
        && visual.contains(&own)
        && clamped
        && !tree.compute_overflow(parent, 100.0, &NoTheme)
}

#[quickcheck]
fn prop_adding_a_child_never_shrinks_overflow(
    children: Vec<(i8, i8, u8, u8)>,
    extra: (i8, i8, u8, u8),
) -> bool {
    let mut tree = BoxTree::default();
    let root = tree.root();
    let parent = tree.create_element(ElementId(1), ComputedStyle::block());
    tree.append_child(root, parent).unwrap();
    tree.get_mut(parent).unwrap().dimensions =
        BoxDimensions::from_border_box(Rect::new(0.0, 0.0, 100.0, 100.0));
    let mut element = 1;
    let mut add_child = |tree: &mut BoxTree, (x, y, w, h): (i8, i8, u8, u8)| {
        element += 1;
        let child = tree.create_element(ElementId(element), ComputedStyle::block());
        tree.append_child(parent, child).unwrap();
        tree.get_mut(child).unwrap().dimensions =
            BoxDimensions::from_border_box(child_rect(x, y, w, h));
    };
    for &child in &children {
        add_child(&mut tree, child);
    }
    let _ = tree.compute_overflow(parent, 100.0, &NoTheme);
    let layout = tree.layout_overflow_rect(parent);
    let visual = tree.visual_overflow_rect(parent);

    add_child(&mut tree, extra);
    let _ = tree.compute_overflow(parent, 100.0, &NoTheme);

    tree.layout_overflow_rect(parent).contains(&layout)
        && tree.visual_overflow_rect(parent).contains(&visual)
}

#[quickcheck]
fn prop_scroll_batch_delivers_each_box_once(requests: Vec<u8>) -> bool {
    let delivered = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&delivered);
    let batch = ScrollInfoBatch::new(move |id: BoxId| sink.borrow_mut().push(id));

    let mut tree = BoxTree::default();
    let boxes: Vec<BoxId> = (0..8)
        .map(|i| tree.create_element(ElementId(i), ComputedStyle::block()))
        .collect();
    let mut expected = Vec::new();
    {
        let _outer = batch.delay();
        let _inner = batch.delay();
        for &request in &requests {
            let id = boxes[usize::from(request) % boxes.len()];
            batch.update_scroll_info(id);
            if !expected.contains(&id) {
                expected.push(id);
            }
        }
    }
    *delivered.borrow() == expected && batch.pending_len() == 0
}
