//! Applying new style snapshots to existing boxes.
//!
//! A style change can turn an inline into a block, take a box out of flow
//! or make it a containing block for absolutely positioned descendants. The
//! box tree follows: the box is re-inserted where it no longer fits, its
//! children are re-legalized when it changes container kind, and its
//! subtree is re-registered in the descendant indices.

use boxwood_style::{ComputedStyle, StyleDifference};

use crate::error::TreeError;
use crate::tree::{AnonymousKind, BoxId, BoxTree, BoxType, ContainerKind, LayoutBox};

impl BoxTree {
    /// Replace the style of `id` and restructure the tree around it.
    ///
    /// Returns how much the new style differs from the old one.
    ///
    /// # Errors
    ///
    /// - [`TreeError::DeadBox`] if `id` is dead.
    /// - Any insertion error from re-legalizing the box or its children;
    ///   see [`Self::insert_child`].
    pub fn set_style(
        &mut self,
        id: BoxId,
        style: ComputedStyle,
    ) -> Result<StyleDifference, TreeError> {
        let layout_box = self.try_get(id)?;
        let difference = layout_box.style().difference(&style);
        let old_kind = layout_box.container_kind();
        let was_floating_or_out_of_flow = layout_box.is_floating_or_out_of_flow();
        let old_containing_block = if layout_box.is_out_of_flow() {
            self.containing_block_for_out_of_flow(id)
        } else {
            None
        };

        let old_style = self.swap_style(id, style);

        match difference {
            StyleDifference::Equal => return Ok(difference),
            StyleDifference::SimplifiedLayout => {
                self.mark_needs_position_only_layout(id);
                return Ok(difference);
            }
            StyleDifference::Layout => {}
        }
        log::debug!(target: "boxwood::style", "layout-affecting style change on {id}");

        // STEP 1: Move the box if it no longer fits its parent's children.
        if let Some(parent) = self.parent(id) {
            let is_floating_or_out_of_flow =
                self.get(id).is_some_and(LayoutBox::is_floating_or_out_of_flow);
            if !self.fits_in_parent(id, parent)
                && let Some(old_style) = old_style
            {
                self.relegalize(id, parent, old_style)?;
            }
            if was_floating_or_out_of_flow != is_floating_or_out_of_flow
                && let Some(parent) = self.parent(id)
            {
                self.mark_needs_layout(parent);
                self.remove_anonymous_wrappers_if_required(parent)?;
            }
        }

        // STEP 2: Children are legalized for the new container kind.
        let new_kind = self.try_get(id)?.container_kind();
        if new_kind != old_kind {
            self.rebuild_children(id)?;
        }

        // STEP 3: Containing blocks may have changed anywhere below.
        self.refresh_subtree_registration(id);

        self.mark_needs_layout(id);
        if let Some(old_containing_block) = old_containing_block {
            self.mark_needs_layout(old_containing_block);
        }
        Ok(difference)
    }

    /// Whether `id`, with its current style, may stay among `parent`'s
    /// children.
    fn fits_in_parent(&self, id: BoxId, parent: BoxId) -> bool {
        let (Some(child), Some(parent)) = (self.get(id), self.get(parent)) else {
            return true;
        };
        match parent.container_kind() {
            ContainerKind::Inline => !child.is_in_flow_block_level(),
            ContainerKind::BlockFlow | ContainerKind::FlexOrGrid => {
                child.is_floating_or_out_of_flow() || child.is_inline() == parent.children_inline()
            }
            ContainerKind::Table | ContainerKind::Ruby | ContainerKind::Leaf => true,
        }
    }

    fn swap_style(&mut self, id: BoxId, style: ComputedStyle) -> Option<ComputedStyle> {
        self.get_mut(id).map(|layout_box| layout_box.replace_style(style))
    }

    /// Take `id` out and insert it again at the same place.
    ///
    /// The siblings left behind are merged and collapsed as they would be
    /// for the box as it was, under `old_style`.
    fn relegalize(
        &mut self,
        id: BoxId,
        parent: BoxId,
        old_style: ComputedStyle,
    ) -> Result<(), TreeError> {
        let next = self.next_sibling(id);
        let candidates = [next, next.and_then(|n| self.first_child(n))];
        let ancestors: Vec<BoxId> = std::iter::once(parent).chain(self.ancestors(parent)).collect();

        let new_style = self.swap_style(id, old_style);
        self.remove_child_internal(parent, id);
        if let Some(new_style) = new_style {
            let _ = self.swap_style(id, new_style);
        }

        // Removal may have destroyed an emptied anonymous parent.
        let Some(target) = ancestors.into_iter().find(|&a| self.is_live(a)) else {
            return Ok(());
        };
        let before = candidates
            .into_iter()
            .flatten()
            .find(|&c| self.is_live(c) && self.is_descendant_of(c, target));
        if self.insert_child_internal(target, id, before).is_err() {
            self.insert_child_internal(target, id, None)?;
        }
        self.finish_attach(id);
        Ok(())
    }

    /// Re-insert every child of `id`, dropping the anonymous blocks that
    /// were generated for its old container kind.
    fn rebuild_children(&mut self, id: BoxId) -> Result<(), TreeError> {
        let mut flattened = Vec::new();
        for child in self.children(id).to_vec() {
            let dissolve = self.get(child).is_some_and(|c| {
                c.is_anonymous_block() && !c.is_in_continuation_chain() && !c.is_ruby_wrapper()
            }) || self.get(child).is_some_and(|c| {
                matches!(c.box_type(), BoxType::Anonymous(AnonymousKind::Table))
            });
            let _ = self.unlink_child(child);
            if dissolve {
                for grandchild in self.children(child).to_vec() {
                    let _ = self.unlink_child(grandchild);
                    flattened.push(grandchild);
                }
                self.discard_box(child);
            } else {
                flattened.push(child);
            }
        }

        let Some(kind) = self.get(id).map(LayoutBox::container_kind) else {
            return Ok(());
        };
        self.set_children_inline(id, kind != ContainerKind::FlexOrGrid);
        self.clear_line_boxes(id);
        for child in flattened {
            self.insert_child_internal(id, child, None)?;
            self.finish_attach(child);
        }
        Ok(())
    }
}
