//! Structural invariant checks.
//!
//! Every public mutation leaves the tree in a state where these checks find
//! nothing. They walk the whole tree and are meant for tests and
//! diagnostics, not for the layout path.

use std::fmt;

use crate::mutator::can_collapse_anonymous_block_child;
use crate::tree::{BoxId, BoxTree, ContainerKind, LayoutBox};

/// One broken invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A child's parent link does not point back at the box listing it.
    BrokenParentLink {
        /// The box listing the child.
        parent: BoxId,
        /// The child.
        child: BoxId,
    },
    /// In-flow children mix inline-level and block-level boxes, or disagree
    /// with the container's `children_inline` flag.
    MixedChildren(BoxId),
    /// An inline box holds an in-flow block-level child.
    BlockInInline {
        /// The inline box.
        parent: BoxId,
        /// The block-level child.
        child: BoxId,
    },
    /// A collapsible anonymous block is the only child of its parent.
    RedundantAnonymousBlock {
        /// The parent.
        parent: BoxId,
        /// The anonymous block.
        child: BoxId,
    },
    /// An anonymous block without children outlived the removal of its
    /// last child.
    EmptyAnonymousBlock(BoxId),
    /// The forward and reverse maps of an index disagree.
    AsymmetricIndex(&'static str),
    /// A box's memberships in an index differ from what its style and
    /// position in the tree call for.
    WrongRegistration {
        /// Name of the index.
        index: &'static str,
        /// The registered box.
        descendant: BoxId,
        /// Containers the box is registered with.
        actual: Vec<BoxId>,
        /// Containers the box should be registered with.
        expected: Vec<BoxId>,
    },
    /// An index refers to a box that is dead or detached.
    StaleEntry {
        /// Name of the index.
        index: &'static str,
        /// The stale box.
        id: BoxId,
    },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BrokenParentLink { parent, child } => {
                write!(f, "{child} is listed under {parent} but points elsewhere")
            }
            Self::MixedChildren(id) => write!(f, "{id} mixes inline and block children"),
            Self::BlockInInline { parent, child } => {
                write!(f, "inline {parent} holds block {child}")
            }
            Self::RedundantAnonymousBlock { parent, child } => {
                write!(f, "anonymous block {child} is the only child of {parent}")
            }
            Self::EmptyAnonymousBlock(id) => write!(f, "anonymous block {id} is empty"),
            Self::AsymmetricIndex(name) => write!(f, "{name} index maps disagree"),
            Self::WrongRegistration {
                index,
                descendant,
                actual,
                expected,
            } => write!(
                f,
                "{descendant} is registered with {actual:?} in the {index} index, expected {expected:?}"
            ),
            Self::StaleEntry { index, id } => {
                write!(f, "{index} index refers to dead or detached {id}")
            }
        }
    }
}

impl BoxTree {
    /// Check homogeneity, anonymous-box minimality and index consistency
    /// over the whole attached tree.
    #[must_use]
    pub fn check_invariants(&self) -> Vec<InvariantViolation> {
        let mut violations = Vec::new();
        let attached = self.subtree(self.root());
        for &id in &attached {
            let Some(layout_box) = self.get(id) else {
                continue;
            };
            self.check_links(id, &mut violations);
            self.check_homogeneity(id, layout_box, &mut violations);
            if !self.is_tearing_down() {
                self.check_minimality(id, layout_box, &mut violations);
            }
            self.check_registration(id, &mut violations);
        }
        self.check_indices(&mut violations);
        violations
    }

    fn check_links(&self, id: BoxId, violations: &mut Vec<InvariantViolation>) {
        for &child in self.children(id) {
            if self.parent(child) != Some(id) {
                violations.push(InvariantViolation::BrokenParentLink { parent: id, child });
            }
        }
    }

    /// I1: all in-flow children inline or all block.
    fn check_homogeneity(
        &self,
        id: BoxId,
        layout_box: &LayoutBox,
        violations: &mut Vec<InvariantViolation>,
    ) {
        let mut in_flow = layout_box
            .children()
            .iter()
            .filter_map(|&c| self.get(c).map(|b| (c, b)))
            .filter(|(_, b)| !b.is_floating_or_out_of_flow());
        match layout_box.container_kind() {
            ContainerKind::BlockFlow | ContainerKind::FlexOrGrid => {
                let expect_inline = layout_box.children_inline();
                if in_flow.any(|(_, b)| b.is_inline() != expect_inline) {
                    violations.push(InvariantViolation::MixedChildren(id));
                }
            }
            ContainerKind::Inline => {
                for (child, child_box) in in_flow {
                    if !child_box.is_inline() {
                        violations.push(InvariantViolation::BlockInInline { parent: id, child });
                    }
                }
            }
            ContainerKind::Table | ContainerKind::Ruby | ContainerKind::Leaf => {}
        }
    }

    /// I2: no anonymous block that could be pulled into its parent.
    fn check_minimality(
        &self,
        id: BoxId,
        layout_box: &LayoutBox,
        violations: &mut Vec<InvariantViolation>,
    ) {
        if layout_box.is_anonymous_block()
            && !layout_box.is_ruby_wrapper()
            && layout_box.children().is_empty()
        {
            violations.push(InvariantViolation::EmptyAnonymousBlock(id));
        }
        if !can_collapse_anonymous_block_child(layout_box) {
            return;
        }
        if let [only] = layout_box.children()
            && self.get(*only).is_some_and(|c| {
                c.is_anonymous_block() && !c.is_in_continuation_chain() && !c.is_ruby_wrapper()
            })
        {
            violations.push(InvariantViolation::RedundantAnonymousBlock {
                parent: id,
                child: *only,
            });
        }
    }

    /// I3: memberships match containing blocks.
    fn check_registration(&self, id: BoxId, violations: &mut Vec<InvariantViolation>) {
        let expected: Vec<BoxId> = if self.get(id).is_some_and(LayoutBox::is_out_of_flow) {
            self.containing_block_for_out_of_flow(id).into_iter().collect()
        } else {
            Vec::new()
        };
        let actual: Vec<BoxId> = self.indices.positioned.containers_of(id).collect();
        if actual != expected {
            violations.push(InvariantViolation::WrongRegistration {
                index: "positioned",
                descendant: id,
                actual,
                expected,
            });
        }

        let expected = self.percent_height_containers(id);
        let actual: Vec<BoxId> = self.indices.percent_height.containers_of(id).collect();
        if actual != expected {
            violations.push(InvariantViolation::WrongRegistration {
                index: "percent-height",
                descendant: id,
                actual,
                expected,
            });
        }
    }

    fn check_indices(&self, violations: &mut Vec<InvariantViolation>) {
        for (name, index) in [
            ("positioned", &self.indices.positioned),
            ("percent-height", &self.indices.percent_height),
        ] {
            if !index.is_symmetric() {
                violations.push(InvariantViolation::AsymmetricIndex(name));
            }
            for (descendant, container) in index.memberships() {
                for id in [descendant, container] {
                    if !self.is_live(id) || !self.is_attached(id) {
                        violations.push(InvariantViolation::StaleEntry { index: name, id });
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{AnonymousKind, ElementId};
    use boxwood_style::ComputedStyle;

    #[test]
    fn test_detects_mixed_children() {
        let mut tree = BoxTree::default();
        let root = tree.root();
        let text = tree.create_text("a");
        let div = tree.create_element(ElementId(1), ComputedStyle::block());
        tree.link_child(root, text, None);
        tree.link_child(root, div, None);

        assert!(
            tree.check_invariants()
                .contains(&InvariantViolation::MixedChildren(root))
        );
    }

    #[test]
    fn test_detects_redundant_anonymous_block() {
        let mut tree = BoxTree::default();
        let root = tree.root();
        let wrapper = tree.create_anonymous(AnonymousKind::Block, &ComputedStyle::block());
        let text = tree.create_text("a");
        tree.link_child(root, wrapper, None);
        tree.link_child(wrapper, text, None);
        tree.set_children_inline(root, false);

        assert_eq!(
            tree.check_invariants(),
            vec![InvariantViolation::RedundantAnonymousBlock {
                parent: root,
                child: wrapper
            }]
        );
    }

    #[test]
    fn test_legal_tree_has_no_violations() {
        let mut tree = BoxTree::default();
        let root = tree.root();
        let text = tree.create_text("a");
        tree.append_child(root, text).unwrap();
        assert!(tree.check_invariants().is_empty());
    }
}
