//! Block-in-inline splitting.
//!
//! [§ 9.2.1.1 Anonymous block boxes](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level)
//!
//! "When an inline box contains an in-flow block-level box, the inline box
//! (and its inline ancestors within the same line box) are broken around
//! the block-level box (and any block-level siblings that are consecutive
//! or separated only by collapsible whitespace and/or out-of-flow
//! elements), splitting the inline box into two boxes (even if either side
//! is empty), one on each side of the block-level box(es)."
//!
//! The pieces of one split inline form a continuation chain:
//! `inline -> anonymous block -> inline clone -> ...`. The anonymous block
//! holds the block-level content, the clones hold what followed it.

use boxwood_style::{ComputedStyle, PositionType};

use crate::error::TreeError;
use crate::tree::{AnonymousKind, BoxId, BoxTree, BoxType, ContainerKind, LayoutBox, PseudoElement};

/// Inline nesting deeper than this is not cloned when splitting.
const MAX_SPLIT_DEPTH: usize = 200;

impl BoxTree {
    pub(crate) fn insert_into_inline(
        &mut self,
        inline: BoxId,
        new_child: BoxId,
        before: Option<BoxId>,
    ) -> Result<(), TreeError> {
        if self.continuation(inline).is_some() {
            self.add_child_to_continuation(inline, new_child, before)
        } else {
            self.inline_add_child_ignoring_continuation(inline, new_child, before)
        }
    }

    /// Insert into one piece of a chain without looking at the others.
    fn add_child_ignoring_continuation(
        &mut self,
        piece: BoxId,
        new_child: BoxId,
        before: Option<BoxId>,
    ) -> Result<(), TreeError> {
        if self.try_get(piece)?.container_kind() == ContainerKind::Inline {
            self.inline_add_child_ignoring_continuation(piece, new_child, before)
        } else {
            self.insert_into_block_flow(piece, new_child, before)
        }
    }

    fn inline_add_child_ignoring_continuation(
        &mut self,
        inline: BoxId,
        new_child: BoxId,
        before: Option<BoxId>,
    ) -> Result<(), TreeError> {
        if let Some(b) = before
            && self.parent(b) != Some(inline)
        {
            return Err(TreeError::NotADescendant {
                child: b,
                parent: inline,
            });
        }
        // Nothing goes after ::after content.
        let before = before.or_else(|| {
            self.last_child(inline).filter(|&last| {
                self.get(last).is_some_and(|b| {
                    matches!(b.box_type(), BoxType::Pseudo(PseudoElement::After, _))
                })
            })
        });

        if !self.try_get(new_child)?.is_in_flow_block_level() {
            self.add_child_node(inline, new_child, before);
            return Ok(());
        }

        let containing_block = self
            .containing_block(inline)
            .ok_or(TreeError::NoContainingBlock(inline))?;
        let inline_style = self.try_get(inline)?.style().clone();
        let mut style = ComputedStyle::anonymous_block_of(&inline_style);
        if let Some(position) = self.in_flow_positioned_inline_ancestor(inline) {
            style.position = position;
        }
        let middle = self.create_box(BoxType::Anonymous(AnonymousKind::Block), style);
        let old_continuation = self.continuation(inline);
        self.set_continuation(inline, Some(middle));
        log::debug!(target: "boxwood::tree", "splitting inline {inline} around {new_child}");
        self.split_flow(inline, containing_block, before, middle, new_child, old_continuation)
    }

    /// [§ 9.4.3 Relative positioning](https://www.w3.org/TR/CSS2/visuren.html#relative-positioning)
    ///
    /// A block inside a relatively positioned inline moves with it.
    fn in_flow_positioned_inline_ancestor(&self, inline: BoxId) -> Option<PositionType> {
        std::iter::once(inline)
            .chain(self.ancestors(inline))
            .map_while(|id| self.get(id).filter(|b| b.is_inline_box()))
            .map(|b| b.style().position)
            .find(|&p| matches!(p, PositionType::Relative | PositionType::Sticky))
    }

    /// Split the block around `inline` into `pre`, `middle` and `post`,
    /// then split the inlines between them and put `new_child` in `middle`.
    fn split_flow(
        &mut self,
        inline: BoxId,
        containing_block: BoxId,
        before: Option<BoxId>,
        middle: BoxId,
        new_child: BoxId,
        old_continuation: Option<BoxId>,
    ) -> Result<(), TreeError> {
        self.clear_line_boxes(containing_block);

        // STEP 1: Reuse an anonymous containing block as the pre block.
        let reuse = self.get(containing_block).is_some_and(|b| {
            b.is_anonymous_block() && !b.is_ruby_wrapper()
        }) && self
            .parent(containing_block)
            .and_then(|p| self.get(p))
            .is_some_and(|p| p.container_kind() == ContainerKind::BlockFlow);
        let (pre, block) = if reuse {
            let block = self
                .parent(containing_block)
                .ok_or(TreeError::NoContainingBlock(inline))?;
            (containing_block, block)
        } else {
            let style = self.try_get(containing_block)?.style().clone();
            (
                self.create_anonymous(AnonymousKind::Block, &style),
                containing_block,
            )
        };
        let block_style = self.try_get(block)?.style().clone();
        let post = self.create_anonymous(AnonymousKind::Block, &block_style);

        // STEP 2: Link pre, middle and post where the inline content was.
        let box_first = if reuse {
            self.next_sibling(pre)
        } else {
            self.first_child(block)
        };
        if !reuse {
            self.link_child(block, pre, box_first);
        }
        self.link_child(block, middle, box_first);
        self.link_child(block, post, box_first);
        self.set_children_inline(block, false);

        let mut moved = Vec::new();
        if !reuse {
            let start = self.child_index(post).map_or(0, |i| i + 1);
            moved = self.move_children(block, start, pre, None);
        }

        // STEP 3: Split the inlines and fill the middle block.
        moved.extend(self.split_inlines(pre, post, middle, inline, before, old_continuation));
        self.set_children_inline(middle, false);
        self.insert_child_internal(middle, new_child, None)?;

        self.refresh_registration_after_move(&moved);
        for id in [pre, block, middle, post] {
            self.mark_needs_layout(id);
        }
        Ok(())
    }

    /// Clone `inline` and each inline ancestor up to `from_block`, moving
    /// everything after the split point into the clones, and hang the
    /// outermost clone in `to_block`. Returns the boxes moved.
    fn split_inlines(
        &mut self,
        from_block: BoxId,
        to_block: BoxId,
        middle: BoxId,
        inline: BoxId,
        before: Option<BoxId>,
        old_continuation: Option<BoxId>,
    ) -> Vec<BoxId> {
        let mut moved = Vec::new();

        let mut clone = self.clone_box(inline);
        self.set_continuation(clone, old_continuation);
        if let Some(start) = before.and_then(|b| self.child_index(b)) {
            moved.extend(self.move_children(inline, start, clone, None));
        }
        self.set_continuation(middle, Some(clone));

        let mut current_child = inline;
        let mut current = self.parent(inline);
        let mut depth = 1;
        while let Some(ancestor) = current
            && ancestor != from_block
        {
            if depth < MAX_SPLIT_DEPTH {
                let inner_clone = clone;
                clone = self.clone_box(ancestor);
                self.link_child(clone, inner_clone, None);

                let old = self.continuation(ancestor);
                self.set_continuation(ancestor, Some(clone));
                self.set_continuation(clone, old);

                let start = self.child_index(current_child).map_or(0, |i| i + 1);
                moved.extend(self.move_children(ancestor, start, clone, None));
            } else {
                let _ = boxwood_common::warn_once("boxwood", "inline nesting too deep to split");
            }
            current_child = ancestor;
            current = self.parent(ancestor);
            depth += 1;
        }

        self.link_child(to_block, clone, None);
        let start = self.child_index(current_child).map_or(0, |i| i + 1);
        moved.extend(self.move_children(from_block, start, to_block, None));
        moved
    }

    /// A detached box of the same type and style as `id`.
    fn clone_box(&mut self, id: BoxId) -> BoxId {
        let (box_type, style) = self.get(id).map_or_else(
            || (BoxType::Anonymous(AnonymousKind::Block), ComputedStyle::inline()),
            |b| (b.box_type().clone(), b.style().clone()),
        );
        self.create_box(box_type, style)
    }

    /// The piece of `inline`'s chain that `new_child` should go into when
    /// inserted before `before`: the piece holding `before`, the piece
    /// before it when `before` starts its piece, or the last piece.
    fn continuation_before(&self, inline: BoxId, before: Option<BoxId>) -> BoxId {
        if let Some(b) = before
            && self.parent(b) == Some(inline)
        {
            return inline;
        }
        let mut next_to_last = inline;
        let mut last = inline;
        let mut current = self.continuation(inline);
        while let Some(piece) = current {
            if let Some(b) = before
                && self.parent(b) == Some(piece)
            {
                return if self.first_child(piece) == Some(b) {
                    last
                } else {
                    piece
                };
            }
            next_to_last = last;
            last = piece;
            current = self.continuation(piece);
        }
        if before.is_none() && self.first_child(last).is_none() {
            return next_to_last;
        }
        last
    }

    /// Pick the piece of the chain that keeps continuations to a minimum.
    fn add_child_to_continuation(
        &mut self,
        inline: BoxId,
        new_child: BoxId,
        before: Option<BoxId>,
    ) -> Result<(), TreeError> {
        let flow = self.continuation_before(inline, before);
        let before_parent = match before {
            Some(b) => self.parent(b).ok_or(TreeError::NotADescendant {
                child: b,
                parent: inline,
            })?,
            None => self.continuation(flow).unwrap_or(flow),
        };

        let new_box = self.try_get(new_child)?;
        if new_box.is_floating_or_out_of_flow() {
            return self.add_child_ignoring_continuation(before_parent, new_child, before);
        }
        let child_inline = new_box.is_inline();
        let is_inline = |tree: &Self, id: BoxId| tree.get(id).is_some_and(LayoutBox::is_inline);
        let before_parent_inline = is_inline(self, before_parent);
        let flow_inline = is_inline(self, flow);

        if flow == before_parent || child_inline == before_parent_inline {
            self.add_child_ignoring_continuation(before_parent, new_child, before)
        } else if flow_inline == child_inline {
            self.add_child_ignoring_continuation(flow, new_child, None)
        } else {
            self.add_child_ignoring_continuation(before_parent, new_child, before)
        }
    }
}
