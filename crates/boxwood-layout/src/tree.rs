//! The box arena.
//!
//! [§ 2 Box Layout Modes](https://www.w3.org/TR/css-display-3/#box-generation)
//!
//! "The display property determines the type of box or boxes that are
//! generated for an element."
//!
//! Boxes live in a generational arena owned by [`BoxTree`]. Parent, child and
//! continuation relationships are [`BoxId`] handles, so tree surgery never
//! holds a borrow across a mutation. Destroying a box marks its slot dead;
//! the slot is only reused after [`BoxTree::reclaim_dead_boxes`], and the
//! generation counter makes stale handles detectable after reuse.

use std::fmt;

use bitflags::bitflags;
use boxwood_style::{
    ComputedStyle, DisplayValue, InnerDisplayType, OuterDisplayType, PositionType, TablePart,
};

use crate::FxIndexSet;
use crate::box_model::BoxDimensions;
use crate::descendants::DescendantIndices;
use crate::error::TreeError;
use crate::overflow::{LineBox, OverflowRecord};
use crate::scheduler::DirtyBits;

/// A checked handle into the box arena.
///
/// Handles stay valid until the box is destroyed. A handle to a destroyed
/// box keeps failing lookups, both before and after its slot is reclaimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoxId {
    index: u32,
    generation: u32,
}

impl BoxId {
    /// Position of the slot in the arena.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// How many times the slot had been reclaimed when this handle was issued.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.generation == 0 {
            write!(f, "#{}", self.index)
        } else {
            write!(f, "#{}v{}", self.index, self.generation)
        }
    }
}

/// Opaque identity of the source element that generated a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(pub u64);

/// The few element semantics the box tree cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ElementKind {
    /// Any element without special box-tree behaviour.
    #[default]
    Generic,
    /// [§ 4.10.15 The fieldset element](https://html.spec.whatwg.org/multipage/form-elements.html#the-fieldset-element)
    ///
    /// Always establishes a new formatting context.
    Fieldset,
    /// [§ 3.2 Replaced elements](https://www.w3.org/TR/css-display-3/#replaced-element)
    ///
    /// "An element whose content is outside the scope of the CSS formatting
    /// model." Replaced boxes have no box children.
    Replaced,
}

/// [§ 2.5 Generated Content](https://www.w3.org/TR/css-pseudo-4/#generated-content)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PseudoElement {
    /// `::before`
    Before,
    /// `::after`
    After,
    /// `::first-letter`
    FirstLetter,
}

/// Synthetic boxes created by the tree itself.
///
/// [§ 9.2.1.1 Anonymous block boxes](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnonymousKind {
    /// Wraps runs of inline-level content among block-level siblings.
    Block,
    /// [§ 17.2.1 Anonymous table objects](https://www.w3.org/TR/CSS2/tables.html#anonymous-boxes)
    ///
    /// "If a child C of a 'table' or 'inline-table' box is not a proper
    /// table child, then generate an anonymous 'table' box around C."
    Table,
    /// [§ 2.2 Anonymous Ruby Box Generation](https://www.w3.org/TR/css-ruby-1/#box-fixup)
    RubyRun,
    /// Anonymous ruby base container.
    RubyBase,
}

/// What generated a box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoxType {
    /// The document root box. It is the initial containing block and the
    /// outermost relayout boundary.
    Viewport,
    /// A box generated by a source element.
    Principal(ElementId, ElementKind),
    /// A text run. Text is always inline-level and has no children.
    Text(String),
    /// A list-item marker box.
    ListMarker,
    /// Generated content of a pseudo-element of the given element.
    Pseudo(PseudoElement, ElementId),
    /// A box with no originating element.
    Anonymous(AnonymousKind),
}

/// How a box treats the children inserted into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// Block container: children are all inline-level or all block-level.
    BlockFlow,
    /// Non-atomic inline box: block children split it into continuations.
    Inline,
    /// Flex or grid container: inline-level children are always wrapped.
    FlexOrGrid,
    /// Table or table-internal box: children are inserted as given.
    Table,
    /// Ruby container: children are inserted as given.
    Ruby,
    /// Cannot have children.
    Leaf,
}

bitflags! {
    /// Lifecycle flags of a box.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct BoxFlags: u8 {
        /// Teardown of this box has started. Coalescing logic leaves it alone.
        const BEING_DESTROYED = 1 << 0;
    }
}

/// One layout participant.
#[derive(Debug, Clone)]
pub struct LayoutBox {
    box_type: BoxType,
    style: ComputedStyle,
    pub(crate) parent: Option<BoxId>,
    pub(crate) children: Vec<BoxId>,
    pub(crate) children_inline: bool,
    pub(crate) flags: BoxFlags,
    pub(crate) continuation: Option<BoxId>,
    pub(crate) continuation_prev: Option<BoxId>,
    /// Geometry written by the layout algorithm.
    pub dimensions: BoxDimensions,
    /// Line boxes written by inline layout, in this box's coordinate space.
    pub line_boxes: Vec<LineBox>,
    pub(crate) overflow: Option<Box<OverflowRecord>>,
    pub(crate) client_after_edge: f32,
    pub(crate) dirty: DirtyBits,
}

impl LayoutBox {
    fn new(box_type: BoxType, style: ComputedStyle) -> Self {
        let mut layout_box = Self {
            box_type,
            style,
            parent: None,
            children: Vec::new(),
            children_inline: true,
            flags: BoxFlags::empty(),
            continuation: None,
            continuation_prev: None,
            dimensions: BoxDimensions::default(),
            line_boxes: Vec::new(),
            overflow: None,
            client_after_edge: 0.0,
            dirty: DirtyBits::SELF_NEEDS_LAYOUT,
        };
        // Flex and grid items are blockified, so their container never
        // holds inline-level children directly.
        layout_box.children_inline = layout_box.container_kind() != ContainerKind::FlexOrGrid;
        layout_box
    }

    /// What generated this box.
    #[must_use]
    pub const fn box_type(&self) -> &BoxType {
        &self.box_type
    }

    /// The computed style snapshot.
    #[must_use]
    pub const fn style(&self) -> &ComputedStyle {
        &self.style
    }

    pub(crate) fn replace_style(&mut self, style: ComputedStyle) -> ComputedStyle {
        std::mem::replace(&mut self.style, style)
    }

    /// The parent box, if attached.
    #[must_use]
    pub const fn parent(&self) -> Option<BoxId> {
        self.parent
    }

    /// Children in document order.
    #[must_use]
    pub fn children(&self) -> &[BoxId] {
        &self.children
    }

    /// Whether the children are inline-level (or there are none).
    #[must_use]
    pub const fn children_inline(&self) -> bool {
        self.children_inline
    }

    /// The next piece of a split element, if any.
    #[must_use]
    pub const fn continuation(&self) -> Option<BoxId> {
        self.continuation
    }

    /// The previous piece of a split element, if any.
    #[must_use]
    pub const fn continuation_prev(&self) -> Option<BoxId> {
        self.continuation_prev
    }

    /// Whether this box is one piece of a split element.
    #[must_use]
    pub const fn is_in_continuation_chain(&self) -> bool {
        self.continuation.is_some() || self.continuation_prev.is_some()
    }

    /// Lifecycle flags.
    #[must_use]
    pub const fn flags(&self) -> BoxFlags {
        self.flags
    }

    /// Teardown of this box has started.
    #[must_use]
    pub const fn is_being_destroyed(&self) -> bool {
        self.flags.contains(BoxFlags::BEING_DESTROYED)
    }

    /// The dirty bits consulted by the layout scheduler.
    #[must_use]
    pub const fn dirty_bits(&self) -> DirtyBits {
        self.dirty
    }

    /// The overflow record, present only when content overflows the
    /// border box.
    #[must_use]
    pub fn overflow(&self) -> Option<&OverflowRecord> {
        self.overflow.as_deref()
    }

    /// The block-end edge of the content area recorded by the last layout.
    #[must_use]
    pub const fn client_after_edge(&self) -> f32 {
        self.client_after_edge
    }

    /// A synthetic box with no originating element.
    #[must_use]
    pub const fn is_anonymous(&self) -> bool {
        matches!(self.box_type, BoxType::Anonymous(_))
    }

    /// An anonymous block container, including anonymous ruby bases.
    #[must_use]
    pub const fn is_anonymous_block(&self) -> bool {
        matches!(
            self.box_type,
            BoxType::Anonymous(AnonymousKind::Block | AnonymousKind::RubyBase)
        )
    }

    /// Anonymous ruby run or ruby base: never merged or collapsed.
    #[must_use]
    pub const fn is_ruby_wrapper(&self) -> bool {
        matches!(
            self.box_type,
            BoxType::Anonymous(AnonymousKind::RubyRun | AnonymousKind::RubyBase)
        )
    }

    /// An anonymous block that holds one piece of a split inline.
    #[must_use]
    pub const fn is_anonymous_block_continuation(&self) -> bool {
        self.is_anonymous_block() && self.is_in_continuation_chain()
    }

    /// A text run.
    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self.box_type, BoxType::Text(_))
    }

    /// A list-item marker.
    #[must_use]
    pub const fn is_list_marker(&self) -> bool {
        matches!(self.box_type, BoxType::ListMarker)
    }

    /// A replaced element.
    #[must_use]
    pub const fn is_replaced(&self) -> bool {
        matches!(self.box_type, BoxType::Principal(_, ElementKind::Replaced))
    }

    /// The document root box.
    #[must_use]
    pub const fn is_viewport(&self) -> bool {
        matches!(self.box_type, BoxType::Viewport)
    }

    /// Generated content of a pseudo-element.
    #[must_use]
    pub const fn is_pseudo(&self) -> bool {
        matches!(self.box_type, BoxType::Pseudo(..))
    }

    /// [§ 9.2.2 Inline-level elements and inline boxes](https://www.w3.org/TR/CSS2/visuren.html#inline-boxes)
    ///
    /// "Inline-level elements are those elements of the source document that
    /// do not form new blocks of content; the content is distributed in lines."
    #[must_use]
    pub const fn is_inline(&self) -> bool {
        match self.box_type {
            BoxType::Text(_) | BoxType::ListMarker => true,
            BoxType::Viewport => false,
            _ => self.style.is_inline_level(),
        }
    }

    /// Floated, but not out of flow.
    #[must_use]
    pub const fn is_floating(&self) -> bool {
        !self.is_text() && self.style.is_floating()
    }

    /// Absolutely or fixed positioned.
    #[must_use]
    pub const fn is_out_of_flow(&self) -> bool {
        !self.is_text() && self.style.is_out_of_flow()
    }

    /// Fixed positioned.
    #[must_use]
    pub fn is_fixed_position(&self) -> bool {
        self.is_out_of_flow() && self.style.position == PositionType::Fixed
    }

    /// Taken out of normal flow.
    #[must_use]
    pub const fn is_floating_or_out_of_flow(&self) -> bool {
        !self.is_text() && self.style.is_floating_or_out_of_flow()
    }

    /// Block-level and in normal flow.
    #[must_use]
    pub const fn is_in_flow_block_level(&self) -> bool {
        !self.is_inline() && !self.is_floating_or_out_of_flow()
    }

    /// A table-internal box (row group, row, cell, column, caption).
    #[must_use]
    pub const fn is_table_part(&self) -> bool {
        !self.is_text() && self.style.used_display().is_table_part()
    }

    /// A table box, anonymous or not.
    #[must_use]
    pub const fn is_table(&self) -> bool {
        matches!(self.box_type, BoxType::Anonymous(AnonymousKind::Table))
            || (!self.is_text()
                && matches!(self.style.used_display().inner, InnerDisplayType::Table))
    }

    /// How children inserted into this box are legalized.
    #[must_use]
    pub fn container_kind(&self) -> ContainerKind {
        match self.box_type {
            BoxType::Text(_) | BoxType::ListMarker => return ContainerKind::Leaf,
            BoxType::Principal(_, ElementKind::Replaced) => return ContainerKind::Leaf,
            BoxType::Viewport
            | BoxType::Anonymous(
                AnonymousKind::Block | AnonymousKind::RubyBase | AnonymousKind::RubyRun,
            ) => return ContainerKind::BlockFlow,
            BoxType::Anonymous(AnonymousKind::Table) => return ContainerKind::Table,
            BoxType::Principal(..) | BoxType::Pseudo(..) => {}
        }
        let display = self.style.used_display();
        match display.inner {
            InnerDisplayType::Flex | InnerDisplayType::Grid => ContainerKind::FlexOrGrid,
            InnerDisplayType::TablePart(TablePart::Cell | TablePart::Caption)
            | InnerDisplayType::FlowRoot => ContainerKind::BlockFlow,
            InnerDisplayType::Table | InnerDisplayType::TablePart(_) => ContainerKind::Table,
            InnerDisplayType::Ruby => ContainerKind::Ruby,
            InnerDisplayType::Flow
                if display.outer == OuterDisplayType::Inline && !display.list_item =>
            {
                ContainerKind::Inline
            }
            InnerDisplayType::Flow => ContainerKind::BlockFlow,
        }
    }

    /// A block container whose children follow the homogeneity rule.
    #[must_use]
    pub fn is_block_flow(&self) -> bool {
        matches!(
            self.container_kind(),
            ContainerKind::BlockFlow | ContainerKind::FlexOrGrid
        )
    }

    /// A non-atomic inline box.
    #[must_use]
    pub fn is_inline_box(&self) -> bool {
        self.container_kind() == ContainerKind::Inline
    }
}

#[derive(Debug, Clone)]
enum SlotState {
    Live(Box<LayoutBox>),
    Dead,
    Free,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    state: SlotState,
}

/// Arena-based box tree with O(1) box access.
///
/// Owns the boxes, the positioned and percent-height descendant indices and
/// the set of scheduled layout roots. All of it is scoped to one document.
#[derive(Debug, Clone)]
pub struct BoxTree {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
    pending_reclaim: Vec<u32>,
    root: BoxId,
    pub(crate) indices: DescendantIndices,
    pub(crate) layout_roots: FxIndexSet<BoxId>,
    tearing_down: bool,
}

impl Default for BoxTree {
    fn default() -> Self {
        Self::new(ComputedStyle::block())
    }
}

impl BoxTree {
    /// Create a tree holding only the root box.
    #[must_use]
    pub fn new(root_style: ComputedStyle) -> Self {
        let root = BoxId {
            index: 0,
            generation: 0,
        };
        let mut tree = Self {
            slots: vec![Slot {
                generation: 0,
                state: SlotState::Live(Box::new(LayoutBox::new(BoxType::Viewport, root_style))),
            }],
            free_list: Vec::new(),
            pending_reclaim: Vec::new(),
            root,
            indices: DescendantIndices::default(),
            layout_roots: FxIndexSet::default(),
            tearing_down: false,
        };
        let _ = tree.layout_roots.insert(root);
        tree
    }

    /// The root box.
    #[must_use]
    pub const fn root(&self) -> BoxId {
        self.root
    }

    /// Allocate a detached box. It starts out needing full layout.
    ///
    /// # Panics
    ///
    /// Panics if the arena already holds `u32::MAX` slots.
    pub fn create_box(&mut self, box_type: BoxType, style: ComputedStyle) -> BoxId {
        let layout_box = Box::new(LayoutBox::new(box_type, style));
        if let Some(index) = self.free_list.pop()
            && let Some(slot) = self.slots.get_mut(index as usize)
        {
            slot.state = SlotState::Live(layout_box);
            return BoxId {
                index,
                generation: slot.generation,
            };
        }
        let Ok(index) = u32::try_from(self.slots.len()) else {
            panic!("box arena exhausted");
        };
        self.slots.push(Slot {
            generation: 0,
            state: SlotState::Live(layout_box),
        });
        BoxId {
            index,
            generation: 0,
        }
    }

    /// Allocate a detached box for a source element.
    pub fn create_element(&mut self, element: ElementId, style: ComputedStyle) -> BoxId {
        self.create_box(BoxType::Principal(element, ElementKind::Generic), style)
    }

    /// Allocate a detached text run.
    pub fn create_text(&mut self, text: impl Into<String>) -> BoxId {
        self.create_box(BoxType::Text(text.into()), ComputedStyle::inline())
    }

    /// Allocate a detached anonymous box whose style inherits from
    /// `parent_style`.
    pub fn create_anonymous(&mut self, kind: AnonymousKind, parent_style: &ComputedStyle) -> BoxId {
        let mut style = ComputedStyle::anonymous_block_of(parent_style);
        match kind {
            AnonymousKind::Block | AnonymousKind::RubyBase => {}
            AnonymousKind::Table => style.display = DisplayValue::table(),
            AnonymousKind::RubyRun => style.display = DisplayValue::inline_block(),
        }
        self.create_box(BoxType::Anonymous(kind), style)
    }

    fn slot(&self, id: BoxId) -> Option<&Slot> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
    }

    /// Get a live box by its ID.
    #[must_use]
    pub fn get(&self, id: BoxId) -> Option<&LayoutBox> {
        match &self.slot(id)?.state {
            SlotState::Live(layout_box) => Some(layout_box),
            SlotState::Dead | SlotState::Free => None,
        }
    }

    /// Get a mutable reference to a live box by its ID.
    pub fn get_mut(&mut self, id: BoxId) -> Option<&mut LayoutBox> {
        let slot = self
            .slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)?;
        match &mut slot.state {
            SlotState::Live(layout_box) => Some(layout_box),
            SlotState::Dead | SlotState::Free => None,
        }
    }

    /// Get a live box or report the dead handle.
    ///
    /// # Errors
    ///
    /// [`TreeError::DeadBox`] if `id` does not name a live box.
    pub fn try_get(&self, id: BoxId) -> Result<&LayoutBox, TreeError> {
        self.get(id).ok_or(TreeError::DeadBox(id))
    }

    /// Whether `id` names a live box.
    #[must_use]
    pub fn is_live(&self, id: BoxId) -> bool {
        self.get(id).is_some()
    }

    /// Number of live boxes, attached or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot.state, SlotState::Live(_)))
            .count()
    }

    /// The tree always holds at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the parent of a box.
    #[must_use]
    pub fn parent(&self, id: BoxId) -> Option<BoxId> {
        self.get(id).and_then(|b| b.parent)
    }

    /// Get all children of a box.
    #[must_use]
    pub fn children(&self, id: BoxId) -> &[BoxId] {
        self.get(id).map_or(&[], |b| b.children.as_slice())
    }

    /// Get the first child of a box.
    #[must_use]
    pub fn first_child(&self, id: BoxId) -> Option<BoxId> {
        self.children(id).first().copied()
    }

    /// Get the last child of a box.
    #[must_use]
    pub fn last_child(&self, id: BoxId) -> Option<BoxId> {
        self.children(id).last().copied()
    }

    /// Position of `id` among its parent's children.
    #[must_use]
    pub fn child_index(&self, id: BoxId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    /// Get the next sibling of a box.
    #[must_use]
    pub fn next_sibling(&self, id: BoxId) -> Option<BoxId> {
        let parent = self.parent(id)?;
        let index = self.child_index(id)?;
        self.children(parent).get(index + 1).copied()
    }

    /// Get the previous sibling of a box.
    #[must_use]
    pub fn prev_sibling(&self, id: BoxId) -> Option<BoxId> {
        let parent = self.parent(id)?;
        let index = self.child_index(id)?;
        index
            .checked_sub(1)
            .and_then(|i| self.children(parent).get(i).copied())
    }

    /// Iterate over all ancestors of a box, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: BoxId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Check if `descendant` is a strict descendant of `ancestor`.
    #[must_use]
    pub fn is_descendant_of(&self, descendant: BoxId, ancestor: BoxId) -> bool {
        self.ancestors(descendant).any(|a| a == ancestor)
    }

    /// Whether the box is connected to the root.
    #[must_use]
    pub fn is_attached(&self, id: BoxId) -> bool {
        id == self.root || self.ancestors(id).any(|a| a == self.root)
    }

    /// Number of ancestors.
    #[must_use]
    pub fn depth(&self, id: BoxId) -> usize {
        self.ancestors(id).count()
    }

    /// The box and all of its descendants, in tree order.
    #[must_use]
    pub fn subtree(&self, id: BoxId) -> Vec<BoxId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if !self.is_live(current) {
                continue;
            }
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// The next piece of a split element.
    #[must_use]
    pub fn continuation(&self, id: BoxId) -> Option<BoxId> {
        self.get(id).and_then(|b| b.continuation)
    }

    /// Every piece of the split element `id` belongs to, first piece first.
    #[must_use]
    pub fn continuation_chain(&self, id: BoxId) -> Vec<BoxId> {
        let mut head = id;
        while let Some(prev) = self.get(head).and_then(|b| b.continuation_prev) {
            head = prev;
        }
        let mut chain = vec![head];
        let mut current = self.continuation(head);
        while let Some(piece) = current {
            chain.push(piece);
            current = self.continuation(piece);
        }
        chain
    }

    /// Whether the whole tree is being torn down.
    #[must_use]
    pub const fn is_tearing_down(&self) -> bool {
        self.tearing_down
    }

    /// Enter teardown: from now on removals are pure unlinks.
    pub fn begin_teardown(&mut self) {
        self.tearing_down = true;
    }

    // ---------------------------------------------------------------------
    // Raw structural edits. These neither legalize the tree nor touch the
    // descendant indices; the mutator composes them.
    // ---------------------------------------------------------------------

    /// Insert `child` into `parent` before `before` (or append). `before`
    /// must be a direct child of `parent`.
    pub(crate) fn link_child(&mut self, parent: BoxId, child: BoxId, before: Option<BoxId>) {
        let position = before.and_then(|b| self.children(parent).iter().position(|&c| c == b));
        debug_assert!(
            before.is_none() || position.is_some(),
            "insertion point {before:?} is not a child of {parent}"
        );
        if let Some(p) = self.get_mut(parent) {
            match position {
                Some(index) => p.children.insert(index, child),
                None => p.children.push(child),
            }
        }
        if let Some(c) = self.get_mut(child) {
            c.parent = Some(parent);
        }
    }

    /// Detach `child` from its parent, returning its former index.
    pub(crate) fn unlink_child(&mut self, child: BoxId) -> Option<usize> {
        let parent = self.parent(child)?;
        let index = self.child_index(child)?;
        if let Some(p) = self.get_mut(parent) {
            let _ = p.children.remove(index);
        }
        if let Some(c) = self.get_mut(child) {
            c.parent = None;
        }
        Some(index)
    }

    /// Move `from`'s children starting at `start` into `to`, before `before`,
    /// preserving their order.
    pub(crate) fn move_children(
        &mut self,
        from: BoxId,
        start: usize,
        to: BoxId,
        before: Option<BoxId>,
    ) -> Vec<BoxId> {
        let moved: Vec<BoxId> = self.children(from).iter().skip(start).copied().collect();
        for &child in &moved {
            let _ = self.unlink_child(child);
            self.link_child(to, child, before);
        }
        moved
    }

    /// Point `from`'s continuation at `to`, keeping the back link in sync.
    pub(crate) fn set_continuation(&mut self, from: BoxId, to: Option<BoxId>) {
        let old = self.get(from).and_then(|b| b.continuation);
        if let Some(old) = old
            && let Some(old_box) = self.get_mut(old)
            && old_box.continuation_prev == Some(from)
        {
            old_box.continuation_prev = None;
        }
        if let Some(b) = self.get_mut(from) {
            b.continuation = to;
        }
        if let Some(to) = to
            && let Some(to_box) = self.get_mut(to)
        {
            to_box.continuation_prev = Some(from);
        }
    }

    /// Remove `id` from its split chain, linking its neighbours together.
    pub(crate) fn unlink_from_continuation_chain(&mut self, id: BoxId) {
        let Some((prev, next)) = self.get(id).map(|b| (b.continuation_prev, b.continuation))
        else {
            return;
        };
        if let Some(b) = self.get_mut(id) {
            b.continuation = None;
            b.continuation_prev = None;
        }
        match prev {
            Some(prev) => self.set_continuation(prev, next),
            None => {
                if let Some(next) = next
                    && let Some(next_box) = self.get_mut(next)
                {
                    next_box.continuation_prev = None;
                }
            }
        }
    }

    pub(crate) fn set_children_inline(&mut self, id: BoxId, children_inline: bool) {
        if let Some(b) = self.get_mut(id) {
            b.children_inline = children_inline;
        }
    }

    pub(crate) fn set_being_destroyed(&mut self, id: BoxId) {
        if let Some(b) = self.get_mut(id) {
            b.flags.insert(BoxFlags::BEING_DESTROYED);
        }
    }

    /// Drop the box's contents and mark its slot dead. The slot is reused
    /// only after [`Self::reclaim_dead_boxes`].
    pub(crate) fn mark_dead(&mut self, id: BoxId) {
        debug_assert!(id != self.root, "the root box is never destroyed");
        let Some(slot) = self
            .slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
        else {
            return;
        };
        if matches!(slot.state, SlotState::Live(_)) {
            slot.state = SlotState::Dead;
            self.pending_reclaim.push(id.index);
        }
        let _ = self.layout_roots.shift_remove(&id);
    }

    /// Return dead slots to the free list. Call only when no caller still
    /// holds handles it expects to resolve; the scheduler does so at the end
    /// of every pass.
    pub fn reclaim_dead_boxes(&mut self) -> usize {
        let reclaimed = self.pending_reclaim.len();
        for index in self.pending_reclaim.drain(..) {
            if let Some(slot) = self.slots.get_mut(index as usize) {
                slot.state = SlotState::Free;
                slot.generation = slot.generation.wrapping_add(1);
                self.free_list.push(index);
            }
        }
        if reclaimed > 0 {
            log::debug!(target: "boxwood::tree", "reclaimed {reclaimed} dead boxes");
        }
        reclaimed
    }
}

/// Iterator over ancestors of a box, from parent to root.
#[derive(Debug)]
pub struct Ancestors<'a> {
    tree: &'a BoxTree,
    current: Option<BoxId>,
}

impl Iterator for Ancestors<'_> {
    type Item = BoxId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;
        self.current = self.tree.parent(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tree_has_only_root() {
        let tree = BoxTree::default();
        assert_eq!(tree.len(), 1);
        assert!(tree.get(tree.root()).is_some_and(LayoutBox::is_viewport));
        assert!(tree.is_attached(tree.root()));
    }

    #[test]
    fn test_dead_handle_is_detected_after_reuse() {
        let mut tree = BoxTree::default();
        let text = tree.create_text("a");
        tree.mark_dead(text);
        assert!(!tree.is_live(text));
        assert_eq!(tree.reclaim_dead_boxes(), 1);

        let reused = tree.create_text("b");
        assert_eq!(reused.index(), text.index());
        assert_ne!(reused, text);
        assert!(tree.get(text).is_none());
        assert_eq!(tree.try_get(text).unwrap_err(), TreeError::DeadBox(text));
    }

    #[test]
    fn test_sibling_navigation() {
        let mut tree = BoxTree::default();
        let root = tree.root();
        let a = tree.create_text("a");
        let b = tree.create_text("b");
        let c = tree.create_text("c");
        tree.link_child(root, a, None);
        tree.link_child(root, c, None);
        tree.link_child(root, b, Some(c));

        assert_eq!(tree.children(root), &[a, b, c]);
        assert_eq!(tree.next_sibling(a), Some(b));
        assert_eq!(tree.prev_sibling(a), None);
        assert_eq!(tree.prev_sibling(c), Some(b));
        assert_eq!(tree.ancestors(b).collect::<Vec<_>>(), vec![root]);
    }

    #[test]
    fn test_container_kinds() {
        let mut tree = BoxTree::default();
        let span = tree.create_element(ElementId(1), ComputedStyle::inline());
        let flex = tree.create_element(
            ElementId(2),
            ComputedStyle::with_display(DisplayValue::flex()),
        );
        let cell = tree.create_element(
            ElementId(3),
            ComputedStyle::with_display(DisplayValue::table_part(TablePart::Cell)),
        );
        let row = tree.create_element(
            ElementId(4),
            ComputedStyle::with_display(DisplayValue::table_part(TablePart::Row)),
        );
        let text = tree.create_text("x");

        let kind = |id| tree.get(id).map(LayoutBox::container_kind);
        assert_eq!(kind(span), Some(ContainerKind::Inline));
        assert_eq!(kind(flex), Some(ContainerKind::FlexOrGrid));
        assert_eq!(kind(cell), Some(ContainerKind::BlockFlow));
        assert_eq!(kind(row), Some(ContainerKind::Table));
        assert_eq!(kind(text), Some(ContainerKind::Leaf));
        assert!(tree.get(flex).is_some_and(|b| !b.children_inline()));
    }

    #[test]
    fn test_continuation_links_stay_symmetric() {
        let mut tree = BoxTree::default();
        let a = tree.create_element(ElementId(1), ComputedStyle::inline());
        let b = tree.create_anonymous(AnonymousKind::Block, &ComputedStyle::block());
        let c = tree.create_element(ElementId(1), ComputedStyle::inline());
        tree.set_continuation(a, Some(b));
        tree.set_continuation(b, Some(c));
        assert_eq!(tree.continuation_chain(c), vec![a, b, c]);

        tree.unlink_from_continuation_chain(b);
        assert_eq!(tree.continuation_chain(a), vec![a, c]);
        assert_eq!(tree.get(c).and_then(LayoutBox::continuation_prev), Some(a));
    }
}
