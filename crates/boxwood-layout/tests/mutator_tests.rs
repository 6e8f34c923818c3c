//! Integration tests for box tree mutation: anonymous blocks, continuations and teardown.

use boxwood_layout::{AnonymousKind, BoxId, BoxTree, BoxType, ElementId, TreeError};
use boxwood_style::{ComputedStyle, DisplayValue, FloatSide, TablePart};

fn block(tree: &mut BoxTree, id: u64) -> BoxId {
    tree.create_element(ElementId(id), ComputedStyle::block())
}

fn inline(tree: &mut BoxTree, id: u64) -> BoxId {
    tree.create_element(ElementId(id), ComputedStyle::inline())
}

fn is_anonymous_block(tree: &BoxTree, id: BoxId) -> bool {
    tree.get(id).is_some_and(|b| b.is_anonymous_block())
}

fn assert_legal(tree: &BoxTree) {
    let violations = tree.check_invariants();
    assert!(violations.is_empty(), "{violations:?}\n{}", tree.dump(tree.root()));
}

#[test]
fn test_block_after_text_wraps_text_in_anonymous_block() {
    let mut tree = BoxTree::default();
    let root = tree.root();
    let text = tree.create_text("hello");
    tree.append_child(root, text).unwrap();
    assert!(tree.get(root).unwrap().children_inline());

    let div = block(&mut tree, 1);
    tree.append_child(root, div).unwrap();

    let root_box = tree.get(root).unwrap();
    assert!(!root_box.children_inline());
    let children = tree.children(root).to_vec();
    assert_eq!(children.len(), 2);
    assert!(is_anonymous_block(&tree, children[0]));
    assert_eq!(tree.children(children[0]), &[text]);
    assert_eq!(children[1], div);
    assert_legal(&tree);
}

#[test]
fn test_block_before_text_keeps_insertion_order() {
    let mut tree = BoxTree::default();
    let root = tree.root();
    let text = tree.create_text("hello");
    tree.append_child(root, text).unwrap();

    let div = block(&mut tree, 1);
    tree.insert_child(root, div, Some(text)).unwrap();

    let children = tree.children(root).to_vec();
    assert_eq!(children.len(), 2);
    assert_eq!(children[0], div);
    assert_eq!(tree.children(children[1]), &[text]);
    assert_legal(&tree);
}

#[test]
fn test_removing_block_between_wrappers_merges_them() {
    let mut tree = BoxTree::default();
    let root = tree.root();
    let flex = tree.create_element(ElementId(1), ComputedStyle::with_display(DisplayValue::flex()));
    tree.append_child(root, flex).unwrap();

    let t1 = tree.create_text("one");
    let div = block(&mut tree, 2);
    let t2 = tree.create_text("two");
    for child in [t1, div, t2] {
        tree.append_child(flex, child).unwrap();
    }
    assert_eq!(tree.children(flex).len(), 3);

    tree.remove_child(flex, div).unwrap();

    // Flex containers keep their anonymous items, so one wrapper remains.
    let children = tree.children(flex).to_vec();
    assert_eq!(children.len(), 1);
    assert!(is_anonymous_block(&tree, children[0]));
    assert_eq!(tree.children(children[0]), &[t1, t2]);
    assert!(tree.is_live(div));
    assert!(tree.parent(div).is_none());
    assert_legal(&tree);
}

#[test]
fn test_removing_last_block_collapses_wrapper_into_parent() {
    let mut tree = BoxTree::default();
    let root = tree.root();
    let t1 = tree.create_text("one");
    let div = block(&mut tree, 1);
    let t2 = tree.create_text("two");
    for child in [t1, div, t2] {
        tree.append_child(root, child).unwrap();
    }

    tree.remove_child(root, div).unwrap();

    assert_eq!(tree.children(root), &[t1, t2]);
    assert!(tree.get(root).unwrap().children_inline());
    assert_legal(&tree);
}

#[test]
fn test_removing_only_child_of_wrapper_removes_wrapper() {
    let mut tree = BoxTree::default();
    let root = tree.root();
    let text = tree.create_text("a");
    let div = block(&mut tree, 1);
    tree.append_child(root, text).unwrap();
    tree.append_child(root, div).unwrap();
    let wrapper = tree.first_child(root).unwrap();

    tree.remove_child(wrapper, text).unwrap();

    assert!(!tree.is_live(wrapper));
    assert_eq!(tree.children(root), &[div]);
    assert_legal(&tree);
}

#[test]
fn test_inline_after_blocks_reuses_trailing_wrapper() {
    let mut tree = BoxTree::default();
    let root = tree.root();
    let div = block(&mut tree, 1);
    let a = tree.create_text("a");
    let b = tree.create_text("b");
    tree.append_child(root, div).unwrap();
    tree.append_child(root, a).unwrap();
    tree.append_child(root, b).unwrap();

    let children = tree.children(root).to_vec();
    assert_eq!(children.len(), 2);
    assert_eq!(tree.children(children[1]), &[a, b]);
    assert_legal(&tree);
}

#[test]
fn test_block_inside_wrapper_splits_it() {
    let mut tree = BoxTree::default();
    let root = tree.root();
    let t1 = tree.create_text("one");
    let t2 = tree.create_text("two");
    let div = block(&mut tree, 1);
    for child in [t1, t2, div] {
        tree.append_child(root, child).unwrap();
    }
    let wrapper = tree.first_child(root).unwrap();
    assert_eq!(tree.children(wrapper), &[t1, t2]);

    let p = block(&mut tree, 2);
    tree.insert_child(root, p, Some(t2)).unwrap();

    let children = tree.children(root).to_vec();
    assert_eq!(children.len(), 4);
    assert_eq!(tree.children(children[0]), &[t1]);
    assert_eq!(children[1], p);
    assert_eq!(tree.children(children[2]), &[t2]);
    assert_eq!(children[3], div);
    assert_legal(&tree);
}

#[test]
fn test_block_before_first_child_of_wrapper_goes_before_wrapper() {
    let mut tree = BoxTree::default();
    let root = tree.root();
    let t1 = tree.create_text("one");
    let div = block(&mut tree, 1);
    tree.append_child(root, t1).unwrap();
    tree.append_child(root, div).unwrap();
    let wrapper = tree.first_child(root).unwrap();

    let p = block(&mut tree, 2);
    tree.insert_child(root, p, Some(t1)).unwrap();

    assert_eq!(tree.children(root), &[p, wrapper, div]);
    assert_legal(&tree);
}

#[test]
fn test_floats_join_the_surrounding_inline_run() {
    let mut tree = BoxTree::default();
    let root = tree.root();
    let text = tree.create_text("a");
    let float = tree.create_element(ElementId(1), ComputedStyle::block().floated(FloatSide::Left));
    tree.append_child(root, text).unwrap();
    tree.append_child(root, float).unwrap();
    assert!(tree.get(root).unwrap().children_inline());
    assert_eq!(tree.children(root), &[text, float]);

    let div = block(&mut tree, 2);
    tree.append_child(root, div).unwrap();

    let wrapper = tree.first_child(root).unwrap();
    assert_eq!(tree.children(wrapper), &[text, float]);
    assert_legal(&tree);
}

#[test]
fn test_table_parts_share_an_anonymous_table() {
    let mut tree = BoxTree::default();
    let root = tree.root();
    let row_style = ComputedStyle::with_display(DisplayValue::table_part(TablePart::Row));
    let row1 = tree.create_element(ElementId(1), row_style.clone());
    let row2 = tree.create_element(ElementId(2), row_style);
    tree.append_child(root, row1).unwrap();
    tree.append_child(root, row2).unwrap();

    let children = tree.children(root).to_vec();
    assert_eq!(children.len(), 1);
    assert!(matches!(
        tree.get(children[0]).unwrap().box_type(),
        BoxType::Anonymous(AnonymousKind::Table)
    ));
    assert_eq!(tree.children(children[0]), &[row1, row2]);
}

#[test]
fn test_removing_block_from_split_inline_rejoins_pieces() {
    let mut tree = BoxTree::default();
    let root = tree.root();
    let div = block(&mut tree, 1);
    tree.append_child(root, div).unwrap();
    let a = tree.create_text("a");
    let span = inline(&mut tree, 2);
    tree.append_child(div, a).unwrap();
    tree.append_child(div, span).unwrap();
    let p = block(&mut tree, 3);
    tree.append_child(span, p).unwrap();

    let chain = tree.continuation_chain(span);
    assert_eq!(chain.len(), 3);
    let (middle, clone) = (chain[1], chain[2]);
    assert_legal(&tree);

    tree.remove_child(middle, p).unwrap();

    assert!(!tree.is_live(middle));
    assert_eq!(tree.continuation_chain(span), vec![span, clone]);
    assert_eq!(tree.children(div), &[a, span, clone]);
    assert!(tree.get(div).unwrap().children_inline());
    assert_legal(&tree);
}

#[test]
fn test_destroying_split_inline_destroys_every_piece() {
    let mut tree = BoxTree::default();
    let root = tree.root();
    let div = block(&mut tree, 1);
    tree.append_child(root, div).unwrap();
    let a = tree.create_text("a");
    let span = inline(&mut tree, 2);
    tree.append_child(div, a).unwrap();
    tree.append_child(div, span).unwrap();
    let p = block(&mut tree, 3);
    tree.append_child(span, p).unwrap();
    let chain = tree.continuation_chain(span);

    tree.destroy_box(span).unwrap();

    for piece in chain {
        assert!(!tree.is_live(piece));
    }
    assert!(!tree.is_live(p));
    assert_eq!(tree.children(div), &[a]);
    assert!(tree.get(div).unwrap().children_inline());
    assert_legal(&tree);
}

#[test]
fn test_destroyed_handles_stay_invalid_after_reclaim() {
    let mut tree = BoxTree::default();
    let root = tree.root();
    let div = block(&mut tree, 1);
    tree.append_child(root, div).unwrap();
    tree.destroy_box(div).unwrap();

    assert_eq!(tree.try_get(div).err(), Some(TreeError::DeadBox(div)));
    assert_eq!(tree.reclaim_dead_boxes(), 1);

    let reused = block(&mut tree, 2);
    assert_eq!(reused.index(), div.index());
    assert_ne!(reused.generation(), div.generation());
    assert!(tree.get(div).is_none());
    assert_eq!(tree.append_child(div, reused), Err(TreeError::DeadBox(div)));
}

#[test]
fn test_destroy_tree_skips_coalescing() {
    let mut tree = BoxTree::default();
    let root = tree.root();
    let text = tree.create_text("a");
    let div = block(&mut tree, 1);
    tree.append_child(root, text).unwrap();
    tree.append_child(root, div).unwrap();
    let total = tree.len();

    let reclaimed = tree.destroy_tree();

    assert_eq!(reclaimed, total - 1);
    assert!(tree.children(root).is_empty());
    assert!(tree.is_live(root));
    assert!(tree.is_tearing_down());
    assert!(tree.check_invariants().is_empty());
}

#[test]
fn test_insertion_errors() {
    let mut tree = BoxTree::default();
    let root = tree.root();
    let text = tree.create_text("a");
    let div = block(&mut tree, 1);
    let inner = block(&mut tree, 2);
    tree.append_child(root, text).unwrap();
    tree.append_child(root, div).unwrap();
    tree.append_child(div, inner).unwrap();

    let orphan = block(&mut tree, 3);
    assert_eq!(tree.append_child(text, orphan), Err(TreeError::Leaf(text)));
    assert_eq!(
        tree.append_child(root, inner),
        Err(TreeError::AlreadyAttached {
            child: inner,
            parent: div
        })
    );
    assert_eq!(
        tree.append_child(div, root),
        Err(TreeError::Cycle {
            child: root,
            parent: div
        })
    );
    assert_eq!(
        tree.insert_child(div, orphan, Some(text)),
        Err(TreeError::NotADescendant {
            child: text,
            parent: div
        })
    );
    assert!(tree.parent(orphan).is_none());
}

#[test]
fn test_removal_errors() {
    let mut tree = BoxTree::default();
    let root = tree.root();
    let div = block(&mut tree, 1);
    let other = block(&mut tree, 2);
    tree.append_child(root, div).unwrap();
    tree.append_child(root, other).unwrap();

    assert_eq!(tree.remove_child(root, root), Err(TreeError::DetachRoot));
    assert_eq!(tree.destroy_box(root), Err(TreeError::DetachRoot));
    assert_eq!(
        tree.remove_child(div, other),
        Err(TreeError::NotADescendant {
            child: other,
            parent: div
        })
    );
}

#[test]
fn test_detached_subtree_can_be_reinserted() {
    let mut tree = BoxTree::default();
    let root = tree.root();
    let div = block(&mut tree, 1);
    let text = tree.create_text("a");
    tree.append_child(root, div).unwrap();
    tree.append_child(div, text).unwrap();

    tree.remove_child(root, div).unwrap();
    assert!(!tree.is_attached(div));
    assert_eq!(tree.children(div), &[text]);

    tree.append_child(root, div).unwrap();
    assert!(tree.is_attached(text));
    assert_legal(&tree);
}
