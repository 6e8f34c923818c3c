//! Box tree mutation.
//!
//! [§ 9.2.1.1 Anonymous block boxes](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level)
//!
//! "if a block container box has a block-level box inside it, then we force
//! it to have only block-level boxes inside it."
//!
//! Every public entry point leaves each block container with children that
//! are all inline-level or all block-level (floats and out-of-flow boxes go
//! either way), and removes anonymous wrappers as soon as they stop being
//! needed. Wrapping, splitting and merging may destroy boxes other than the
//! ones passed in: a caller must not assume a parent it passed is still
//! live after the call returns.

use crate::error::TreeError;
use crate::tree::{AnonymousKind, BoxId, BoxTree, BoxType, ContainerKind, LayoutBox};

impl BoxTree {
    /// Append `child` as the last child of `parent`.
    ///
    /// # Errors
    ///
    /// See [`Self::insert_child`].
    pub fn append_child(&mut self, parent: BoxId, child: BoxId) -> Result<(), TreeError> {
        self.insert_child(parent, child, None)
    }

    /// Insert the detached box `new_child` into `parent` before `before`,
    /// generating whatever anonymous boxes keep the tree legal.
    ///
    /// `before` may be a direct child of `parent`, a box inside one of
    /// `parent`'s anonymous children, or a child of another piece of
    /// `parent`'s continuation chain.
    ///
    /// # Errors
    ///
    /// - [`TreeError::DeadBox`] if a handle is dead.
    /// - [`TreeError::Leaf`] if `parent` cannot have children.
    /// - [`TreeError::AlreadyAttached`] if `new_child` has a parent.
    /// - [`TreeError::Cycle`] if `new_child` is `parent`, an ancestor of it,
    ///   or the root.
    /// - [`TreeError::NotADescendant`] if `before` is not inside `parent`.
    /// - [`TreeError::NoContainingBlock`] if a block is inserted into a
    ///   detached inline box.
    pub fn insert_child(
        &mut self,
        parent: BoxId,
        new_child: BoxId,
        before: Option<BoxId>,
    ) -> Result<(), TreeError> {
        if self.try_get(parent)?.container_kind() == ContainerKind::Leaf {
            return Err(TreeError::Leaf(parent));
        }
        if let Some(current) = self.try_get(new_child)?.parent() {
            return Err(TreeError::AlreadyAttached {
                child: new_child,
                parent: current,
            });
        }
        if new_child == self.root()
            || new_child == parent
            || self.is_descendant_of(parent, new_child)
        {
            return Err(TreeError::Cycle {
                child: new_child,
                parent,
            });
        }
        if let Some(before) = before {
            let _ = self.try_get(before)?;
            let inside = self
                .continuation_chain(parent)
                .into_iter()
                .any(|piece| self.is_descendant_of(before, piece));
            if !inside {
                return Err(TreeError::NotADescendant {
                    child: before,
                    parent,
                });
            }
        }

        self.insert_child_internal(parent, new_child, before)?;
        self.finish_attach(new_child);
        Ok(())
    }

    /// Detach `old_child` from `parent`, merging or collapsing the anonymous
    /// blocks around it. The detached subtree stays live and may be
    /// inserted again.
    ///
    /// # Errors
    ///
    /// - [`TreeError::DeadBox`] if a handle is dead.
    /// - [`TreeError::DetachRoot`] if `old_child` is the root.
    /// - [`TreeError::NotADescendant`] if `old_child` is not a child of
    ///   `parent`.
    pub fn remove_child(&mut self, parent: BoxId, old_child: BoxId) -> Result<(), TreeError> {
        let _ = self.try_get(parent)?;
        let _ = self.try_get(old_child)?;
        if old_child == self.root() {
            return Err(TreeError::DetachRoot);
        }
        if self.parent(old_child) != Some(parent) {
            return Err(TreeError::NotADescendant {
                child: old_child,
                parent,
            });
        }
        self.remove_child_internal(parent, old_child);
        Ok(())
    }

    /// Remove `id` from the tree and destroy it together with its subtree
    /// and every later piece of its continuation chain.
    ///
    /// # Errors
    ///
    /// - [`TreeError::DeadBox`] if `id` is dead.
    /// - [`TreeError::DetachRoot`] if `id` is the root.
    pub fn destroy_box(&mut self, id: BoxId) -> Result<(), TreeError> {
        let _ = self.try_get(id)?;
        if id == self.root() {
            return Err(TreeError::DetachRoot);
        }
        self.destroy_internal(id);
        Ok(())
    }

    /// Destroy every box but the root without any coalescing, then reclaim
    /// the arena. The tree stays in teardown mode afterwards. Returns the
    /// number of reclaimed slots.
    pub fn destroy_tree(&mut self) -> usize {
        self.begin_teardown();
        let root = self.root();
        for child in self.children(root).to_vec() {
            self.destroy_internal(child);
        }
        self.clear_line_boxes(root);
        self.reclaim_dead_boxes()
    }

    /// Collapse `parent`'s anonymous blocks into it when nothing but
    /// anonymous inline-content blocks, floats and out-of-flow boxes are
    /// left among its children.
    ///
    /// Runs when a child starts or stops being floating or out of flow.
    /// Split inlines are left alone.
    ///
    /// # Errors
    ///
    /// [`TreeError::DeadBox`] if `parent` is dead.
    pub fn remove_anonymous_wrappers_if_required(&mut self, parent: BoxId) -> Result<(), TreeError> {
        let parent_box = self.try_get(parent)?;
        if !can_collapse_anonymous_block_child(parent_box) || self.is_tearing_down() {
            return Ok(());
        }
        let children = parent_box.children().to_vec();
        let all_wrappable = children.iter().all(|&child| {
            self.get(child).is_some_and(|c| {
                c.is_floating_or_out_of_flow()
                    || (is_mergeable_anonymous_block(c) && c.children_inline())
            })
        });
        if !all_wrappable {
            return Ok(());
        }
        for child in children {
            if self.get(child).is_some_and(LayoutBox::is_anonymous_block) {
                self.collapse_anonymous_block_child(parent, child);
            }
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Insertion
    // ---------------------------------------------------------------------

    /// Index bookkeeping and dirtying for a subtree that was just attached.
    pub(crate) fn finish_attach(&mut self, child: BoxId) {
        self.register_subtree(child);
        self.mark_needs_layout(child);
        // Out-of-flow boxes are laid out by their containing block, which
        // may sit outside the subtree.
        for id in self.subtree(child) {
            if id != child && self.get(id).is_some_and(LayoutBox::is_out_of_flow) {
                self.mark_needs_layout(id);
            }
        }
    }

    /// Insertion without argument validation or bookkeeping of the new
    /// subtree.
    pub(crate) fn insert_child_internal(
        &mut self,
        parent: BoxId,
        new_child: BoxId,
        before: Option<BoxId>,
    ) -> Result<(), TreeError> {
        match self.try_get(parent)?.container_kind() {
            ContainerKind::Leaf => Err(TreeError::Leaf(parent)),
            ContainerKind::Inline => self.insert_into_inline(parent, new_child, before),
            ContainerKind::BlockFlow | ContainerKind::FlexOrGrid => {
                self.insert_into_block_flow(parent, new_child, before)
            }
            ContainerKind::Table | ContainerKind::Ruby => {
                let before = match before {
                    Some(b) => Some(self.child_of_ancestor(b, parent).ok_or(
                        TreeError::NotADescendant {
                            child: b,
                            parent,
                        },
                    )?),
                    None => None,
                };
                self.add_child_node(parent, new_child, before);
                Ok(())
            }
        }
    }

    /// The ancestor of `descendant` (or `descendant` itself) whose parent
    /// is `ancestor`.
    pub(crate) fn child_of_ancestor(&self, descendant: BoxId, ancestor: BoxId) -> Option<BoxId> {
        let mut current = descendant;
        loop {
            let parent = self.parent(current)?;
            if parent == ancestor {
                return Some(current);
            }
            current = parent;
        }
    }

    /// Link `new_child` under `parent`.
    ///
    /// [§ 17.2.1 Anonymous table objects](https://www.w3.org/TR/CSS2/tables.html#anonymous-boxes)
    ///
    /// A table-internal box outside a table is wrapped in an anonymous
    /// table, reusing one that ends at the insertion point.
    pub(crate) fn add_child_node(&mut self, parent: BoxId, new_child: BoxId, before: Option<BoxId>) {
        let Some(parent_box) = self.get(parent) else {
            return;
        };
        let needs_table = parent_box.container_kind() != ContainerKind::Table
            && self.get(new_child).is_some_and(LayoutBox::is_table_part);
        if !needs_table {
            self.link_child(parent, new_child, before);
            return;
        }

        let parent_style = parent_box.style().clone();
        let previous = match before {
            Some(b) => self.prev_sibling(b),
            None => self.last_child(parent),
        };
        let reusable = previous.filter(|&p| {
            self.get(p).is_some_and(|b| {
                matches!(b.box_type(), BoxType::Anonymous(AnonymousKind::Table))
                    && !b.is_being_destroyed()
            })
        });
        let table = if let Some(table) = reusable {
            table
        } else {
            let table = self.create_anonymous(AnonymousKind::Table, &parent_style);
            self.link_child(parent, table, before);
            self.mark_needs_layout(table);
            table
        };
        self.link_child(table, new_child, None);
    }

    /// Insertion into a block container.
    pub(crate) fn insert_into_block_flow(
        &mut self,
        parent: BoxId,
        new_child: BoxId,
        before: Option<BoxId>,
    ) -> Result<(), TreeError> {
        let mut before = before;

        // STEP 1: `before` inside an anonymous child: insert there, or split
        // the anonymous boxes around it.
        if let Some(b) = before
            && self.parent(b) != Some(parent)
        {
            let not_inside = TreeError::NotADescendant { child: b, parent };
            let container = self.child_of_ancestor(b, parent).ok_or(not_inside)?;
            let b_parent = self.parent(b).ok_or(not_inside)?;
            let container_box = self.try_get(container)?;
            let new_box = self.try_get(new_child)?;

            if container_box.is_anonymous_block() {
                if new_box.is_inline()
                    || new_box.is_floating_or_out_of_flow()
                    || self.first_child(b_parent) != Some(b)
                {
                    return self.insert_child_internal(b_parent, new_child, Some(b));
                }
                return self.insert_child_internal(parent, new_child, Some(b_parent));
            }
            if !container_box.is_anonymous() {
                return Err(not_inside);
            }
            if container_box.is_table() && new_box.is_table_part() {
                return self.insert_child_internal(container, new_child, Some(b));
            }
            before = Some(self.split_anonymous_boxes_around_child(parent, b));
        }

        let new_box = self.try_get(new_child)?;
        let child_is_inline = new_box.is_inline();
        let child_is_out_of_flow = new_box.is_floating_or_out_of_flow();
        let parent_box = self.try_get(parent)?;
        let reset_to_inline = parent_box.children().is_empty()
            && parent_box.container_kind() == ContainerKind::BlockFlow;
        if reset_to_inline {
            self.set_children_inline(parent, true);
        }
        let children_inline = self.get(parent).is_some_and(LayoutBox::children_inline);

        // STEP 2: A block among inline children wraps the inline runs.
        let mut made_boxes_non_inline = false;
        if children_inline && !child_is_inline && !child_is_out_of_flow {
            self.make_children_non_inline(parent, before);
            made_boxes_non_inline = true;
            if let Some(b) = before
                && self.parent(b) != Some(parent)
            {
                before = self.parent(b);
            }
        } else if !children_inline && (child_is_inline || child_is_out_of_flow) {
            // STEP 3: Inline content among blocks goes into an anonymous
            // block, preferably one that ends at the insertion point.
            let after = match before {
                Some(b) => self.prev_sibling(b),
                None => self.last_child(parent),
            };
            if let Some(after) = after
                && self.get(after).is_some_and(is_reusable_anonymous_block)
            {
                return self.insert_child_internal(after, new_child, None);
            }
            if child_is_inline {
                let style = self.try_get(parent)?.style().clone();
                let wrapper = self.create_anonymous(AnonymousKind::Block, &style);
                self.link_child(parent, wrapper, before);
                self.mark_needs_layout(wrapper);
                return self.insert_child_internal(wrapper, new_child, None);
            }
        }

        // STEP 4: Plain insertion.
        self.add_child_node(parent, new_child, before);

        if made_boxes_non_inline
            && let Some(grandparent) = self.parent(parent)
            && self.get(grandparent).is_some_and(LayoutBox::is_block_flow)
        {
            // The anonymous block now holds only blocks of its own.
            self.remove_leftover_anonymous_block(parent);
        }
        Ok(())
    }

    /// Wrap every maximal run of inline-level children of `parent` in a new
    /// anonymous block. Runs never extend across `insertion_point`.
    pub(crate) fn make_children_non_inline(&mut self, parent: BoxId, insertion_point: Option<BoxId>) {
        self.set_children_inline(parent, false);
        if self.children(parent).is_empty() {
            return;
        }
        self.clear_line_boxes(parent);

        let Some(style) = self.get(parent).map(|p| p.style().clone()) else {
            return;
        };
        let mut from = 0;
        while let Some((start, end)) = self.inline_run(parent, from, insertion_point) {
            let run: Vec<BoxId> = self.children(parent)[start..=end].to_vec();
            let block = self.create_anonymous(AnonymousKind::Block, &style);
            self.link_child(parent, block, Some(run[0]));
            for &child in &run {
                let _ = self.unlink_child(child);
                self.link_child(block, child, None);
            }
            self.refresh_registration_after_move(&run);
            self.mark_needs_layout(block);
            from = start + 1;
        }
    }

    /// The next run of inline-level children at or after index `from`, as
    /// inclusive child indices.
    ///
    /// Floats and out-of-flow boxes join whichever run surrounds them; a run
    /// made of nothing else is skipped. `boundary` always starts a new run.
    fn inline_run(&self, parent: BoxId, from: usize, boundary: Option<BoxId>) -> Option<(usize, usize)> {
        let children = self.children(parent);
        let is_inline = |id: BoxId| self.get(id).is_some_and(LayoutBox::is_inline);
        let joins_run = |id: BoxId| {
            self.get(id)
                .is_some_and(|b| b.is_inline() || b.is_floating_or_out_of_flow())
        };

        let mut current = from;
        loop {
            while current < children.len() && !joins_run(children[current]) {
                current += 1;
            }
            if current >= children.len() {
                return None;
            }
            let start = current;
            let mut end = current;
            let mut saw_inline = is_inline(children[current]);
            current += 1;
            while current < children.len()
                && joins_run(children[current])
                && Some(children[current]) != boundary
            {
                end = current;
                saw_inline |= is_inline(children[current]);
                current += 1;
            }
            if saw_inline {
                return Some((start, end));
            }
        }
    }

    /// Promote the children of an anonymous block that holds only blocks
    /// into its parent and destroy it.
    fn remove_leftover_anonymous_block(&mut self, block: BoxId) {
        let Some(block_box) = self.get(block) else {
            return;
        };
        if !is_mergeable_anonymous_block(block_box) || block_box.children_inline() {
            return;
        }
        let Some(grandparent) = block_box.parent() else {
            return;
        };
        let moved = self.move_children(block, 0, grandparent, Some(block));
        let _ = self.unlink_child(block);
        self.discard_box(block);
        self.refresh_registration_after_move(&moved);
        self.mark_needs_layout(grandparent);
    }

    /// Split every anonymous box between `before` and `parent` so that
    /// `before` starts a box, and return the child of `parent` to insert
    /// before.
    pub(crate) fn split_anonymous_boxes_around_child(&mut self, parent: BoxId, before: BoxId) -> BoxId {
        let mut before = before;
        let mut did_split = false;
        while let Some(box_to_split) = self.parent(before)
            && box_to_split != parent
        {
            let Some(split_box) = self.get(box_to_split) else {
                break;
            };
            if split_box.is_anonymous() && self.first_child(box_to_split) != Some(before) {
                did_split = true;
                let box_type = split_box.box_type().clone();
                let style = split_box.style().clone();
                let children_inline = split_box.children_inline();

                let post_box = self.create_box(box_type, style);
                self.set_children_inline(post_box, children_inline);
                if let Some(grandparent) = self.parent(box_to_split) {
                    let after = self.next_sibling(box_to_split);
                    self.link_child(grandparent, post_box, after);
                    self.mark_needs_layout(grandparent);
                }
                let start = self.child_index(before).unwrap_or_default();
                let moved = self.move_children(box_to_split, start, post_box, None);
                self.clear_line_boxes(box_to_split);
                self.refresh_registration_after_move(&moved);
                self.mark_needs_layout(box_to_split);
                self.mark_needs_layout(post_box);
                before = post_box;
            } else {
                before = box_to_split;
            }
        }
        if did_split {
            self.mark_needs_layout(parent);
        }
        before
    }

    // ---------------------------------------------------------------------
    // Removal
    // ---------------------------------------------------------------------

    /// Detach `old_child` and restore the anonymous-block invariants of
    /// `parent`. `parent` may be destroyed as a side effect.
    pub(crate) fn remove_child_internal(&mut self, parent: BoxId, old_child: BoxId) {
        self.unregister_subtree(old_child);
        self.mark_needs_layout(parent);

        let Some(parent_box) = self.get(parent) else {
            return;
        };
        if self.is_tearing_down() || parent_box.is_being_destroyed() || !parent_box.is_block_flow() {
            let _ = self.unlink_child(old_child);
            return;
        }
        let old_was_list_marker = self.get(old_child).is_some_and(LayoutBox::is_list_marker);

        // STEP 1: A block between two anonymous blocks: fold them together.
        let mut prev = self.prev_sibling(old_child);
        let mut next = self.next_sibling(old_child);
        let can_merge = self.can_merge_contiguous_anonymous_blocks(old_child, prev, next);
        if can_merge
            && let (Some(p), Some(n)) = (prev, next)
        {
            self.mark_needs_layout(p);
            let prev_inline = self.get(p).is_some_and(LayoutBox::children_inline);
            let next_inline = self.get(n).is_some_and(LayoutBox::children_inline);
            if prev_inline == next_inline {
                let moved = self.move_children(n, 0, p, None);
                self.clear_line_boxes(p);
                let _ = self.unlink_child(n);
                self.discard_box(n);
                self.refresh_registration_after_move(&moved);
                next = None;
            } else {
                // The inline-content block goes inside the block-content one.
                let (inline_holder, block_holder) = if prev_inline { (p, n) } else { (n, p) };
                let _ = self.unlink_child(inline_holder);
                let position = if inline_holder == p {
                    self.first_child(block_holder)
                } else {
                    None
                };
                self.link_child(block_holder, inline_holder, position);
                self.refresh_registration_after_move(&[inline_holder]);
                self.mark_needs_layout(n);
                if inline_holder == p {
                    prev = None;
                } else {
                    next = None;
                }
            }
        }

        // STEP 2: Unlink.
        let _ = self.unlink_child(old_child);

        // STEP 3: A single anonymous block left behind is pulled up.
        let can_collapse = self.get(parent).is_some_and(can_collapse_anonymous_block_child);
        let only_child = |tree: &Self, id: BoxId| tree.children(parent) == [id];
        if let Some(child) = prev.or(next)
            && can_merge
            && can_collapse
            && only_child(self, child)
        {
            self.collapse_anonymous_block_child(parent, child);
        } else if can_collapse
            && let Some(anonymous) = [prev, next].into_iter().flatten().find(|&s| {
                self.get(s).is_some_and(LayoutBox::is_anonymous_block)
            })
            && self.has_only_floating_pseudo_siblings(anonymous)
        {
            self.collapse_anonymous_block_child(parent, anonymous);
        }

        // STEP 4: An emptied anonymous block goes away, fixing the
        // continuation chain it was part of.
        let Some(parent_box) = self.get(parent) else {
            return;
        };
        if !parent_box.children().is_empty() {
            return;
        }
        if parent_box.children_inline() {
            self.clear_line_boxes(parent);
        }
        let Some(parent_box) = self.get(parent) else {
            return;
        };
        let removable = parent_box.is_anonymous_block()
            && !parent_box.is_ruby_wrapper()
            && !parent_box.is_being_destroyed()
            && !old_was_list_marker;
        if let Some(grandparent) = parent_box.parent()
            && removable
        {
            log::trace!(target: "boxwood::tree", "removing empty anonymous block {parent}");
            self.unlink_from_continuation_chain(parent);
            self.remove_child_internal(grandparent, parent);
            self.discard_box(parent);
        }
    }

    /// [§ 9.2.1.1](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level)
    ///
    /// Removing the block `old_child` may leave `prev` and `next` as
    /// adjacent anonymous blocks that can hold their content together.
    fn can_merge_contiguous_anonymous_blocks(
        &self,
        old_child: BoxId,
        prev: Option<BoxId>,
        next: Option<BoxId>,
    ) -> bool {
        let Some(old_box) = self.get(old_child) else {
            return false;
        };
        if self.is_tearing_down() || old_box.is_inline() || old_box.is_in_continuation_chain() {
            return false;
        }
        [prev, next]
            .into_iter()
            .flatten()
            .all(|sibling| self.get(sibling).is_some_and(is_mergeable_anonymous_block))
    }

    /// `anonymous` is flanked only by floating generated content, itself
    /// without further siblings.
    fn has_only_floating_pseudo_siblings(&self, anonymous: BoxId) -> bool {
        let prev = self.prev_sibling(anonymous);
        let next = self.next_sibling(anonymous);
        if prev.is_none() && next.is_none() {
            return false;
        }
        let floating_pseudo = |id: BoxId| {
            self.get(id)
                .is_some_and(|b| b.is_pseudo() && b.is_floating())
        };
        let prev_ok = prev.is_none_or(|p| floating_pseudo(p) && self.prev_sibling(p).is_none());
        let next_ok = next.is_none_or(|n| floating_pseudo(n) && self.next_sibling(n).is_none());
        prev_ok && next_ok
    }

    /// Move the children of the anonymous block `child` into `parent` in
    /// its place, together with its line boxes, and destroy it.
    pub(crate) fn collapse_anonymous_block_child(&mut self, parent: BoxId, child: BoxId) {
        let Some(child_box) = self.get(child) else {
            return;
        };
        if child_box.is_being_destroyed() {
            return;
        }
        let children_inline = child_box.children_inline();
        let origin = child_box.dimensions.border_box();
        let lines: Vec<_> = child_box
            .line_boxes
            .iter()
            .map(|line| line.translate(origin.x, origin.y))
            .collect();

        self.mark_needs_layout(parent);
        self.set_children_inline(parent, children_inline);
        if let Some(parent_box) = self.get_mut(parent) {
            parent_box.line_boxes = lines;
        }
        let next_sibling = self.next_sibling(child);
        let _ = self.unlink_child(child);
        let moved = self.move_children(child, 0, parent, next_sibling);
        self.clear_line_boxes(child);
        self.discard_box(child);
        self.refresh_registration_after_move(&moved);
    }

    // ---------------------------------------------------------------------
    // Destruction
    // ---------------------------------------------------------------------

    pub(crate) fn destroy_internal(&mut self, id: BoxId) {
        let Some(layout_box) = self.get(id) else {
            return;
        };
        if layout_box.is_being_destroyed() {
            return;
        }
        let forward = layout_box.continuation();
        self.set_being_destroyed(id);

        // STEP 1: Later pieces of a split element go with it.
        self.unlink_from_continuation_chain(id);
        if let Some(forward) = forward {
            self.destroy_internal(forward);
        }

        // STEP 2: Detach, letting the parent coalesce around the hole.
        if let Some(parent) = self.parent(id) {
            self.remove_child_internal(parent, id);
        }

        // STEP 3: Tear down the subtree, innermost first.
        let subtree = self.subtree(id);
        for &descendant in &subtree {
            self.set_being_destroyed(descendant);
        }
        for &descendant in subtree.iter().skip(1) {
            if let Some(continuation) = self.continuation(descendant) {
                self.unlink_from_continuation_chain(descendant);
                self.destroy_internal(continuation);
            }
        }
        for &descendant in subtree.iter().rev() {
            self.remove_from_global_maps(descendant);
            self.unlink_from_continuation_chain(descendant);
            self.mark_dead(descendant);
        }
    }

    /// Forget a box that has already been unlinked from its parent.
    pub(crate) fn discard_box(&mut self, id: BoxId) {
        self.remove_from_global_maps(id);
        self.unlink_from_continuation_chain(id);
        self.mark_dead(id);
    }

    pub(crate) fn clear_line_boxes(&mut self, id: BoxId) {
        if let Some(layout_box) = self.get_mut(id) {
            layout_box.line_boxes.clear();
        }
    }
}

/// An anonymous block that merging and collapsing may absorb.
fn is_mergeable_anonymous_block(layout_box: &LayoutBox) -> bool {
    layout_box.is_anonymous_block()
        && !layout_box.is_in_continuation_chain()
        && !layout_box.is_being_destroyed()
        && !layout_box.is_ruby_wrapper()
}

/// An anonymous block that new inline content may be appended to.
fn is_reusable_anonymous_block(layout_box: &LayoutBox) -> bool {
    layout_box.is_anonymous_block() && !layout_box.is_being_destroyed() && !layout_box.is_ruby_wrapper()
}

/// Flex and grid containers keep their anonymous items, ruby wrappers keep
/// their bases.
pub(crate) fn can_collapse_anonymous_block_child(parent: &LayoutBox) -> bool {
    parent.container_kind() == ContainerKind::BlockFlow && !parent.is_ruby_wrapper()
}
