//! Incremental layout scheduling.
//!
//! Every box carries [`DirtyBits`]. A change marks the box itself and then
//! walks outward marking "a child needs layout" until it reaches a relayout
//! boundary, a box whose own geometry does not depend on the exact layout
//! of its contents. That boundary becomes a layout root. A pass lays out
//! each root depth-first, runs the overflow aggregator once a box's geometry
//! and that of its positioned descendants is final, and then carries
//! overflow changes outward as overflow-only updates.
//!
//! The geometry itself comes from the caller's [`LayoutAlgorithm`].

#[cfg(feature = "layout-trace")]
use std::cell::Cell;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use boxwood_style::{InnerDisplayType, PhysicalSide, TablePart};

use crate::overflow::{NoTheme, ThemeOverflow};
use crate::scroll::ScrollInfoBatch;
use crate::tree::{BoxId, BoxTree, BoxType, ContainerKind, ElementKind, LayoutBox};

#[cfg(feature = "layout-trace")]
thread_local! {
    static LAYOUT_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Indents trace output by recursion depth for as long as it is alive.
#[cfg(feature = "layout-trace")]
struct DepthGuard;

#[cfg(feature = "layout-trace")]
impl DepthGuard {
    fn enter(mode: &str, id: BoxId) -> Self {
        let depth = LAYOUT_DEPTH.with(|d| {
            let current = d.get();
            d.set(current + 1);
            current
        });
        log::trace!(target: "boxwood::layout", "{:indent$}[{mode}] {id}", "", indent = depth * 2);
        Self
    }
}

#[cfg(feature = "layout-trace")]
impl Drop for DepthGuard {
    fn drop(&mut self) {
        LAYOUT_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}

/// Sizes closer than one layout unit are the same size.
const LAYOUT_UNIT: f32 = 1.0 / 64.0;

fn differs(a: f32, b: f32) -> bool {
    (a - b).abs() >= LAYOUT_UNIT
}

bitflags! {
    /// Pending layout work on one box.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct DirtyBits: u8 {
        /// The box's own geometry must be recomputed.
        const SELF_NEEDS_LAYOUT = 1 << 0;
        /// Only the box's position changed; its size is expected to hold.
        const POSITION_ONLY = 1 << 1;
        /// Some descendant below this box is dirty.
        const CHILD_NEEDS_LAYOUT = 1 << 2;
    }
}

impl DirtyBits {
    /// The externally visible state these bits amount to.
    #[must_use]
    pub const fn state(self) -> LayoutState {
        if self.contains(Self::SELF_NEEDS_LAYOUT) {
            LayoutState::NeedsFullLayout
        } else if self.contains(Self::POSITION_ONLY) {
            LayoutState::NeedsPositionOnlyLayout
        } else if self.contains(Self::CHILD_NEEDS_LAYOUT) {
            LayoutState::NeedsChildLayout
        } else {
            LayoutState::Clean
        }
    }
}

/// Layout state of a box, as exposed to the layout driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum LayoutState {
    /// Nothing to do.
    Clean,
    /// The box's geometry must be recomputed.
    NeedsFullLayout,
    /// The box moved with its containing block; its size is expected to hold.
    NeedsPositionOnlyLayout,
    /// The box is clean but a descendant is not.
    NeedsChildLayout,
}

/// What [`LayoutAlgorithm::layout_box`] reports back.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoxLayoutOutput {
    /// Block-end edge of the content (including end padding) before the box's
    /// own block size was applied, in the box's coordinate space. `None`
    /// uses the end of the padding box.
    pub client_after_edge: Option<f32>,
}

/// The external geometry algorithm.
///
/// The scheduler decides which boxes are laid out and in what order; the
/// algorithm decides where they go.
pub trait LayoutAlgorithm {
    /// Resolve the logical width and inline position of `id` from its
    /// containing block. Runs before the box's children are laid out.
    /// Returns the new logical width.
    fn logical_width(&mut self, tree: &mut BoxTree, id: BoxId) -> f32;

    /// Finish `id` once its in-flow children are laid out: block size,
    /// child positions and, for inline content, line boxes.
    fn layout_box(&mut self, tree: &mut BoxTree, id: BoxId) -> BoxLayoutOutput;

    /// Place an out-of-flow box against its containing block, whose size is
    /// final. Must not change the box's size.
    fn place_out_of_flow(&mut self, tree: &mut BoxTree, id: BoxId);
}

/// Scheduler configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Content is fragmented into pages. A position-only layout that moves a
    /// box in the block direction may change where it breaks, so it is
    /// escalated to a full layout.
    pub paginated: bool,
}

/// Counts of the work done by one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PassReport {
    /// Boxes whose geometry was recomputed.
    pub full: usize,
    /// Boxes moved by the position-only fast path.
    pub position_only: usize,
    /// Position-only layouts that failed their precondition and were redone
    /// as full layouts.
    pub escalated: usize,
    /// Boxes whose overflow alone was recomputed.
    pub overflow_only: usize,
    /// Arena slots reclaimed at the end of the pass.
    pub reclaimed: usize,
}

impl BoxTree {
    /// The layout state of `id`. Dead boxes are clean.
    #[must_use]
    pub fn layout_state(&self, id: BoxId) -> LayoutState {
        self.get(id)
            .map_or(LayoutState::Clean, |b| b.dirty_bits().state())
    }

    /// Whether `id` contains its own layout.
    ///
    /// [§ 9.4.1 Block formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
    ///
    /// "Floats, absolutely positioned elements, block containers (such as
    /// inline-blocks, table-cells, and table-captions) that are not block
    /// boxes, and block boxes with 'overflow' other than 'visible' ...
    /// establish new block formatting contexts for their contents."
    ///
    /// Flex and grid items, multi-column containers, spanners, fieldsets and
    /// writing-mode roots are boundaries too, and so is the root.
    #[must_use]
    pub fn is_relayout_boundary(&self, id: BoxId) -> bool {
        let Some(layout_box) = self.get(id) else {
            return false;
        };
        if id == self.root() {
            return true;
        }
        if layout_box.is_text() {
            return false;
        }
        let style = layout_box.style();
        let display = style.used_display();
        let establishes_context = (layout_box.is_inline() && display.is_atomic_inline())
            || layout_box.is_floating_or_out_of_flow()
            || style.has_overflow_clip()
            || style.specifies_columns()
            || style.column_span_all
            || matches!(
                display.inner,
                InnerDisplayType::TablePart(TablePart::Cell | TablePart::Caption)
                    | InnerDisplayType::FlowRoot
            )
            || matches!(
                layout_box.box_type(),
                BoxType::Principal(_, ElementKind::Fieldset)
            );
        if establishes_context {
            return true;
        }
        layout_box
            .parent()
            .and_then(|parent| self.get(parent))
            .is_some_and(|parent| {
                parent.container_kind() == ContainerKind::FlexOrGrid
                    || parent.style().writing_mode != style.writing_mode
            })
    }

    /// The box that lays `id` out: the containing block for out-of-flow
    /// boxes, the parent otherwise.
    pub(crate) fn layout_container(&self, id: BoxId) -> Option<BoxId> {
        if self.get(id)?.is_out_of_flow() {
            self.containing_block_for_out_of_flow(id)
        } else {
            self.parent(id)
        }
    }

    /// The box needs its geometry recomputed.
    pub fn mark_needs_layout(&mut self, id: BoxId) {
        let Some(layout_box) = self.get_mut(id) else {
            return;
        };
        layout_box.dirty.insert(DirtyBits::SELF_NEEDS_LAYOUT);
        self.mark_containing_blocks_for_layout(id);
    }

    /// The box moved but its size is expected to hold. Has no effect on a
    /// box that already needs full layout.
    pub fn mark_needs_position_only_layout(&mut self, id: BoxId) {
        let Some(layout_box) = self.get_mut(id) else {
            return;
        };
        if layout_box.dirty.contains(DirtyBits::SELF_NEEDS_LAYOUT) {
            return;
        }
        layout_box.dirty.insert(DirtyBits::POSITION_ONLY);
        self.mark_containing_blocks_for_layout(id);
    }

    /// Mark "a child needs layout" from `id`'s layout container outward up
    /// to the nearest relayout boundary, and schedule that boundary.
    ///
    /// The top of a detached subtree is left alone: it is marked when the
    /// subtree is attached.
    pub(crate) fn mark_containing_blocks_for_layout(&mut self, id: BoxId) {
        let mut last = id;
        let mut current = self.layout_container(id);
        while let Some(container) = current {
            let next = self.layout_container(container);
            if next.is_none() && container != self.root() {
                return;
            }
            let Some(container_box) = self.get_mut(container) else {
                return;
            };
            if container_box.dirty.contains(DirtyBits::CHILD_NEEDS_LAYOUT) {
                return;
            }
            container_box.dirty.insert(DirtyBits::CHILD_NEEDS_LAYOUT);
            last = container;
            if self.is_relayout_boundary(container) {
                break;
            }
            current = next;
        }
        if self.is_attached(last) {
            let _ = self.layout_roots.insert(last);
        }
    }

    /// Boxes scheduled as layout roots, in scheduling order.
    #[must_use]
    pub fn layout_roots(&self) -> Vec<BoxId> {
        self.layout_roots.iter().copied().collect()
    }

    fn clear_dirty(&mut self, id: BoxId) {
        if let Some(layout_box) = self.get_mut(id) {
            layout_box.dirty = DirtyBits::empty();
        }
    }

    fn border_box_size(&self, id: BoxId) -> (f32, f32) {
        self.get(id).map_or((0.0, 0.0), |b| {
            let border_box = b.dimensions.border_box();
            (border_box.width, border_box.height)
        })
    }

    /// Offset of `id` along its containing block's block axis.
    fn block_offset(&self, id: BoxId) -> f32 {
        let block_start = self
            .layout_container(id)
            .and_then(|c| self.get(c))
            .map_or(PhysicalSide::Top, |c| c.style().writing_mode.block_start_physical());
        self.get(id).map_or(0.0, |b| {
            let border_box = b.dimensions.border_box();
            match block_start {
                PhysicalSide::Top | PhysicalSide::Bottom => border_box.y,
                PhysicalSide::Left | PhysicalSide::Right => border_box.x,
            }
        })
    }

    /// Content size of `id` along its own block axis.
    fn block_size(&self, id: BoxId) -> f32 {
        self.get(id).map_or(0.0, |b| {
            let content = b.dimensions.content;
            match b.style().writing_mode.block_start_physical() {
                PhysicalSide::Top | PhysicalSide::Bottom => content.height,
                PhysicalSide::Left | PhysicalSide::Right => content.width,
            }
        })
    }

    /// Mark `id` for full layout and its ancestors up to `container` as
    /// having a dirty child, without scheduling a layout root.
    fn mark_for_relayout_within(&mut self, id: BoxId, container: BoxId) {
        let Some(layout_box) = self.get_mut(id) else {
            return;
        };
        layout_box.dirty.insert(DirtyBits::SELF_NEEDS_LAYOUT);
        for ancestor in self.ancestors(id).collect::<Vec<_>>() {
            if ancestor == container {
                break;
            }
            if let Some(ancestor_box) = self.get_mut(ancestor) {
                ancestor_box.dirty.insert(DirtyBits::CHILD_NEEDS_LAYOUT);
            }
        }
    }
}

/// Drives layout passes over a [`BoxTree`].
#[derive(Debug, Default)]
pub struct LayoutScheduler {
    config: SchedulerConfig,
    scroll_batch: ScrollInfoBatch,
}

/// State threaded through one pass.
struct Pass<'a> {
    tree: &'a mut BoxTree,
    algorithm: &'a mut dyn LayoutAlgorithm,
    theme: &'a dyn ThemeOverflow,
    config: SchedulerConfig,
    scroll_batch: &'a ScrollInfoBatch,
    report: PassReport,
}

impl LayoutScheduler {
    /// A scheduler reporting scrollable-area changes to `scroll_batch`.
    #[must_use]
    pub const fn new(config: SchedulerConfig, scroll_batch: ScrollInfoBatch) -> Self {
        Self {
            config,
            scroll_batch,
        }
    }

    /// The configuration in effect.
    #[must_use]
    pub const fn config(&self) -> SchedulerConfig {
        self.config
    }

    /// The batch scroll-info updates go through.
    #[must_use]
    pub const fn scroll_batch(&self) -> &ScrollInfoBatch {
        &self.scroll_batch
    }

    /// Lay out every scheduled root, shallowest first, and leave every
    /// attached box clean.
    pub fn run_pass(
        &mut self,
        tree: &mut BoxTree,
        algorithm: &mut dyn LayoutAlgorithm,
    ) -> PassReport {
        self.run_pass_with_theme(tree, algorithm, &NoTheme)
    }

    /// [`Self::run_pass`] with platform decoration overflow from `theme`.
    pub fn run_pass_with_theme(
        &mut self,
        tree: &mut BoxTree,
        algorithm: &mut dyn LayoutAlgorithm,
        theme: &dyn ThemeOverflow,
    ) -> PassReport {
        // Scroll notifications for the whole pass go out once, at the end.
        let _scroll_guard = self.scroll_batch.delay();

        // STEP 1: Collect the layout roots that are still attached.
        let mut roots: Vec<BoxId> = tree.layout_roots.drain(..).collect();
        roots.retain(|&r| tree.is_attached(r));
        roots.sort_by_cached_key(|&r| tree.depth(r));

        let mut pass = Pass {
            tree,
            algorithm,
            theme,
            config: self.config,
            scroll_batch: &self.scroll_batch,
            report: PassReport::default(),
        };

        // STEP 2: Lay out each root, then carry its overflow outward.
        for root in roots {
            if pass.tree.layout_state(root) == LayoutState::Clean {
                continue;
            }
            log::debug!(target: "boxwood::layout", "layout root {root}");
            pass.layout_dirty(root, false);
            pass.propagate_overflow(root);
        }

        // STEP 3: No call frame holds box handles any more.
        pass.report.reclaimed = pass.tree.reclaim_dead_boxes();
        let report = pass.report;
        log::debug!(
            target: "boxwood::layout",
            "pass done: {} full, {} position-only, {} escalated, {} overflow-only",
            report.full,
            report.position_only,
            report.escalated,
            report.overflow_only
        );
        report
    }
}

impl Pass<'_> {
    /// Do whatever `id`'s dirty bits ask for. `force` lays it out fully.
    fn layout_dirty(&mut self, id: BoxId, force: bool) {
        let bits = self
            .tree
            .get(id)
            .map_or(DirtyBits::empty(), |b| b.dirty_bits());
        if force || bits.contains(DirtyBits::SELF_NEEDS_LAYOUT) {
            self.layout_full(id);
        } else if bits.contains(DirtyBits::CHILD_NEEDS_LAYOUT) {
            let moved = bits.contains(DirtyBits::POSITION_ONLY) && self.is_out_of_flow(id);
            if moved && !self.keeps_width(id) {
                self.escalate(id);
            } else {
                self.layout_dirty_children(id, moved);
            }
        } else if bits.contains(DirtyBits::POSITION_ONLY) {
            self.layout_position_only(id);
        }
    }

    fn is_out_of_flow(&self, id: BoxId) -> bool {
        self.tree.get(id).is_some_and(LayoutBox::is_out_of_flow)
    }

    /// A position-only layout that failed its precondition.
    fn escalate(&mut self, id: BoxId) {
        log::debug!(target: "boxwood::layout", "position-only layout of {id} escalated");
        self.report.escalated += 1;
        self.layout_full(id);
    }

    /// Resolve `id`'s width again and report whether it held. A changed
    /// width is rolled back so the full layout that follows sees it change.
    fn keeps_width(&mut self, id: BoxId) -> bool {
        let Some(old_width) = self.tree.get(id).map(|b| b.dimensions.content.width) else {
            return false;
        };
        let new_width = self.algorithm.logical_width(self.tree, id);
        if !differs(old_width, new_width) {
            return true;
        }
        if let Some(layout_box) = self.tree.get_mut(id) {
            layout_box.dimensions.content.width = old_width;
        }
        false
    }

    /// Recompute `id`'s geometry, its dirty in-flow children (all of them if
    /// its width changed) and its positioned descendants, then its overflow.
    fn layout_full(&mut self, id: BoxId) {
        #[cfg(feature = "layout-trace")]
        let _depth = DepthGuard::enter("full", id);

        let Some(old_width) = self.tree.get(id).map(|b| b.dimensions.content.width) else {
            return;
        };

        // STEP 1: Width comes from the containing block.
        let new_width = self.algorithm.logical_width(self.tree, id);
        let relayout_children = differs(old_width, new_width);

        // STEP 2: In-flow children.
        // [§ 9.4.1](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
        for child in self.tree.children(id).to_vec() {
            if self.tree.get(child).is_none_or(|c| c.is_out_of_flow()) {
                continue;
            }
            self.layout_dirty(child, relayout_children);
        }

        // STEP 3: The box's own block size and its children's positions.
        let old_block_size = self.tree.block_size(id);
        let output = self.algorithm.layout_box(self.tree, id);
        self.record_client_after_edge(id, output);
        let resized = self.relayout_if_block_size_changed(id, old_block_size);

        // STEP 4: Positioned descendants, once the containing block's size
        // is known.
        // [§ 10.1](https://www.w3.org/TR/CSS2/visudet.html#containing-block-details)
        self.layout_positioned_descendants(id, relayout_children || resized);

        if self.tree.get(id).is_some_and(|b| b.is_out_of_flow()) {
            self.algorithm.place_out_of_flow(self.tree, id);
        }

        // STEP 5: Overflow, strictly after all of the above.
        self.finish_box(id);
        self.report.full += 1;
    }

    /// `id` itself is clean but a descendant is not.
    fn layout_dirty_children(&mut self, id: BoxId, moved: bool) {
        #[cfg(feature = "layout-trace")]
        let _depth = DepthGuard::enter("children", id);

        let inline_content = self.tree.get(id).is_some_and(|b| b.children_inline());
        let mut rerun_self = false;
        for child in self.tree.children(id).to_vec() {
            let Some(child_box) = self.tree.get(child) else {
                continue;
            };
            if child_box.is_out_of_flow() || child_box.dirty_bits().is_empty() {
                continue;
            }
            let old_size = self.tree.border_box_size(child);
            self.layout_dirty(child, false);
            let (width, height) = self.tree.border_box_size(child);
            // Lines are rebuilt whenever anything in them changed.
            if inline_content || differs(old_size.0, width) || differs(old_size.1, height) {
                rerun_self = true;
            }
        }

        let mut resized = false;
        if rerun_self {
            let old_block_size = self.tree.block_size(id);
            let output = self.algorithm.layout_box(self.tree, id);
            self.record_client_after_edge(id, output);
            resized = self.relayout_if_block_size_changed(id, old_block_size);
            self.report.full += 1;
        } else {
            self.report.overflow_only += 1;
        }

        self.layout_positioned_descendants(id, resized);
        if moved {
            let old_offset = self.tree.block_offset(id);
            self.algorithm.place_out_of_flow(self.tree, id);
            if self.config.paginated && differs(old_offset, self.tree.block_offset(id)) {
                self.escalate(id);
                return;
            }
        }
        self.finish_box(id);
    }

    /// [§ 10.5 Content height](https://www.w3.org/TR/CSS2/visudet.html#the-height-property)
    ///
    /// Percentage heights below `id` resolve against its block size. When
    /// that changed, lay those boxes out again and then `id` itself, whose
    /// children may have moved. Returns whether the block size changed.
    fn relayout_if_block_size_changed(&mut self, id: BoxId, old_block_size: f32) -> bool {
        if !differs(old_block_size, self.tree.block_size(id)) {
            return false;
        }
        let descendants = self.tree.percent_height_descendants_of(id);
        let mut dirtied = false;
        for descendant in descendants {
            if !self.is_out_of_flow(descendant) {
                self.tree.mark_for_relayout_within(descendant, id);
                dirtied = true;
            }
        }
        if !dirtied {
            return true;
        }
        log::trace!(target: "boxwood::layout", "block size of {id} changed; relaying percentage heights");
        for child in self.tree.children(id).to_vec() {
            let dirty = self
                .tree
                .get(child)
                .is_some_and(|c| !c.is_out_of_flow() && !c.dirty_bits().is_empty());
            if dirty {
                self.layout_dirty(child, false);
            }
        }
        let output = self.algorithm.layout_box(self.tree, id);
        self.record_client_after_edge(id, output);
        true
    }

    /// The box kept its size and only moved.
    fn layout_position_only(&mut self, id: BoxId) {
        #[cfg(feature = "layout-trace")]
        let _depth = DepthGuard::enter("position", id);

        let Some(layout_box) = self.tree.get(id) else {
            return;
        };
        if !layout_box.is_out_of_flow() {
            // In-flow boxes are moved by their parent; only the overflow
            // (visual effects, relative offsets) needs recomputing.
            self.finish_box(id);
            self.report.overflow_only += 1;
            return;
        }
        if self.try_position_only(id) {
            self.report.position_only += 1;
        } else {
            self.escalate(id);
        }
    }

    /// Move an out-of-flow box without laying out its contents. Fails when
    /// its width changes, or under pagination when its block offset does.
    fn try_position_only(&mut self, id: BoxId) -> bool {
        if !self.keeps_width(id) {
            return false;
        }
        let old_offset = self.tree.block_offset(id);
        self.algorithm.place_out_of_flow(self.tree, id);
        if self.config.paginated && differs(old_offset, self.tree.block_offset(id)) {
            return false;
        }
        self.finish_box(id);
        true
    }

    fn layout_positioned_descendants(&mut self, container: BoxId, relayout_children: bool) {
        for descendant in self.tree.positioned_descendants_of(container) {
            if relayout_children {
                self.layout_full(descendant);
                continue;
            }
            let bits = self
                .tree
                .get(descendant)
                .map_or(DirtyBits::empty(), |b| b.dirty_bits());
            if !bits.is_empty() {
                self.layout_dirty(descendant, false);
            }
        }
    }

    fn record_client_after_edge(&mut self, id: BoxId, output: BoxLayoutOutput) {
        let Some(layout_box) = self.tree.get_mut(id) else {
            return;
        };
        let padding_box = layout_box.dimensions.local_padding_box();
        let fallback = match layout_box.style().writing_mode.block_end_physical() {
            PhysicalSide::Top | PhysicalSide::Bottom => padding_box.max_y(),
            PhysicalSide::Left | PhysicalSide::Right => padding_box.max_x(),
        };
        layout_box.client_after_edge = output.client_after_edge.unwrap_or(fallback);
    }

    /// Recompute overflow, report scroll containers and mark the box clean.
    fn finish_box(&mut self, id: BoxId) {
        let Some(client_after_edge) = self.tree.get(id).map(|b| b.client_after_edge()) else {
            return;
        };
        let _ = self
            .tree
            .compute_overflow(id, client_after_edge, self.theme);
        if self
            .tree
            .get(id)
            .is_some_and(|b| b.style().has_overflow_clip())
        {
            self.scroll_batch.update_scroll_info(id);
        }
        self.tree.clear_dirty(id);
    }

    /// Carry a finished root's overflow to the boxes that lay it out, for as
    /// long as their overflow keeps changing. Their dirty state is untouched.
    fn propagate_overflow(&mut self, root: BoxId) {
        let mut current = self.tree.layout_container(root);
        while let Some(container) = current {
            let Some(client_after_edge) = self.tree.get(container).map(|b| b.client_after_edge())
            else {
                return;
            };
            let changed = self
                .tree
                .compute_overflow(container, client_after_edge, self.theme);
            self.report.overflow_only += 1;
            if !changed {
                return;
            }
            if self
                .tree
                .get(container)
                .is_some_and(|b| b.style().has_overflow_clip())
            {
                self.scroll_batch.update_scroll_info(container);
            }
            current = self.tree.layout_container(container);
        }
    }
}
