//! Descendant indices and containing-block bookkeeping.
//!
//! [§ 10.1 Definition of "containing block"](https://www.w3.org/TR/CSS2/visudet.html#containing-block-details)
//!
//! "The position and size of an element's box(es) are sometimes calculated
//! relative to a certain rectangle, called the containing block of the
//! element."
//!
//! A container must find its out-of-flow descendants (to place them after
//! its own size is known) and its percentage-height descendants (to re-lay
//! them out when its height changes) without walking its subtree. Each
//! [`DescendantIndex`] keeps a forward map `container -> descendants` and a
//! reverse map `descendant -> containers`; the two are always mirrors of
//! each other.

use rustc_hash::FxHashMap;

use boxwood_common::warn_once;

use crate::FxIndexSet;
use crate::tree::{BoxId, BoxTree, ContainerKind, LayoutBox};
use boxwood_style::{InnerDisplayType, TablePart};

#[derive(Debug, Clone, Default)]
struct IndexMaps {
    descendants: FxHashMap<BoxId, FxIndexSet<BoxId>>,
    containers: FxHashMap<BoxId, FxIndexSet<BoxId>>,
}

/// A two-way membership map between containers and the descendants that
/// depend on them.
///
/// Both maps are allocated together on first insertion.
#[derive(Debug, Clone)]
pub struct DescendantIndex {
    name: &'static str,
    maps: Option<Box<IndexMaps>>,
}

impl DescendantIndex {
    /// An empty index. `name` labels its diagnostics.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self { name, maps: None }
    }

    /// Whether the maps have been allocated yet.
    #[must_use]
    pub const fn is_allocated(&self) -> bool {
        self.maps.is_some()
    }

    /// Record that `descendant` depends on `container`. Returns `false` if
    /// the membership already existed.
    pub fn insert(&mut self, descendant: BoxId, container: BoxId) -> bool {
        let maps = self.maps.get_or_insert_with(Box::default);
        let members = maps.descendants.entry(container).or_default();
        if !members.insert(descendant) {
            debug_assert!(
                maps.containers
                    .get(&descendant)
                    .is_some_and(|c| c.contains(&container)),
                "{} index: {descendant} listed under {container} without its mirror entry",
                self.name
            );
            return false;
        }
        let _ = maps
            .containers
            .entry(descendant)
            .or_default()
            .insert(container);
        true
    }

    /// Drop `descendant` from every container that references it. Returns the
    /// containers it was removed from.
    pub fn remove(&mut self, descendant: BoxId) -> Vec<BoxId> {
        let Some(maps) = self.maps.as_mut() else {
            return Vec::new();
        };
        let Some(containers) = maps.containers.remove(&descendant) else {
            return Vec::new();
        };
        for &container in &containers {
            let emptied = match maps.descendants.get_mut(&container) {
                Some(members) => {
                    if !members.shift_remove(&descendant) {
                        report_desync(self.name, descendant, container);
                    }
                    members.is_empty()
                }
                None => {
                    report_desync(self.name, descendant, container);
                    false
                }
            };
            if emptied {
                let _ = maps.descendants.remove(&container);
            }
        }
        containers.into_iter().collect()
    }

    /// Forget everything registered under `container`. Returns the
    /// descendants that lost it.
    pub fn remove_container(&mut self, container: BoxId) -> Vec<BoxId> {
        let Some(maps) = self.maps.as_mut() else {
            return Vec::new();
        };
        let Some(members) = maps.descendants.remove(&container) else {
            return Vec::new();
        };
        for &descendant in &members {
            let emptied = match maps.containers.get_mut(&descendant) {
                Some(containers) => {
                    if !containers.shift_remove(&container) {
                        report_desync(self.name, descendant, container);
                    }
                    containers.is_empty()
                }
                None => {
                    report_desync(self.name, descendant, container);
                    false
                }
            };
            if emptied {
                let _ = maps.containers.remove(&descendant);
            }
        }
        members.into_iter().collect()
    }

    /// Descendants registered under `container`, in registration order.
    pub fn descendants_of(&self, container: BoxId) -> impl Iterator<Item = BoxId> + '_ {
        self.maps
            .as_ref()
            .and_then(|maps| maps.descendants.get(&container))
            .into_iter()
            .flatten()
            .copied()
    }

    /// Containers `descendant` is registered under.
    pub fn containers_of(&self, descendant: BoxId) -> impl Iterator<Item = BoxId> + '_ {
        self.maps
            .as_ref()
            .and_then(|maps| maps.containers.get(&descendant))
            .into_iter()
            .flatten()
            .copied()
    }

    /// Whether `descendant` is registered under `container`.
    #[must_use]
    pub fn contains(&self, container: BoxId, descendant: BoxId) -> bool {
        self.maps
            .as_ref()
            .and_then(|maps| maps.descendants.get(&container))
            .is_some_and(|members| members.contains(&descendant))
    }

    /// Whether `container` has an entry. Entries never exist empty.
    #[must_use]
    pub fn has_descendants(&self, container: BoxId) -> bool {
        self.maps
            .as_ref()
            .is_some_and(|maps| maps.descendants.contains_key(&container))
    }

    /// Whether `descendant` is registered anywhere.
    #[must_use]
    pub fn is_tracked(&self, descendant: BoxId) -> bool {
        self.maps
            .as_ref()
            .is_some_and(|maps| maps.containers.contains_key(&descendant))
    }

    /// Number of containers with at least one descendant.
    #[must_use]
    pub fn container_count(&self) -> usize {
        self.maps.as_ref().map_or(0, |maps| maps.descendants.len())
    }

    /// Every `(container, descendant)` membership, in no particular order.
    #[must_use]
    pub fn memberships(&self) -> Vec<(BoxId, BoxId)> {
        self.maps.as_ref().map_or_else(Vec::new, |maps| {
            maps.descendants
                .iter()
                .flat_map(|(&container, members)| members.iter().map(move |&d| (container, d)))
                .collect()
        })
    }

    /// `C ∈ containers[B]` if and only if `B ∈ descendants[C]`, and no
    /// entry in either map is empty.
    #[must_use]
    pub fn is_symmetric(&self) -> bool {
        let Some(maps) = self.maps.as_ref() else {
            return true;
        };
        let forward_ok = maps.descendants.iter().all(|(container, members)| {
            !members.is_empty()
                && members.iter().all(|d| {
                    maps.containers
                        .get(d)
                        .is_some_and(|containers| containers.contains(container))
                })
        });
        let backward_ok = maps.containers.iter().all(|(descendant, containers)| {
            !containers.is_empty()
                && containers.iter().all(|c| {
                    maps.descendants
                        .get(c)
                        .is_some_and(|members| members.contains(descendant))
                })
        });
        forward_ok && backward_ok
    }
}

fn report_desync(name: &str, descendant: BoxId, container: BoxId) {
    let _ = warn_once(
        "Descendant index",
        &format!("{name} index out of sync for {descendant} under {container}; skipping"),
    );
}

/// The two independent indices owned by a [`BoxTree`].
#[derive(Debug, Clone)]
pub struct DescendantIndices {
    /// Absolutely and fixed positioned boxes, keyed by containing block.
    pub positioned: DescendantIndex,
    /// Boxes with a percentage height, keyed by every containing block
    /// consulted while resolving it.
    pub percent_height: DescendantIndex,
}

impl Default for DescendantIndices {
    fn default() -> Self {
        Self {
            positioned: DescendantIndex::new("positioned"),
            percent_height: DescendantIndex::new("percent-height"),
        }
    }
}

fn is_table_cell(layout_box: &LayoutBox) -> bool {
    matches!(
        layout_box.style().used_display().inner,
        InnerDisplayType::TablePart(TablePart::Cell)
    )
}

/// Boxes that can act as the containing block of in-flow descendants:
/// block containers, flex and grid containers, and tables. Inline boxes and
/// table rows or sections never do.
fn is_block_container(layout_box: &LayoutBox) -> bool {
    match layout_box.container_kind() {
        ContainerKind::BlockFlow | ContainerKind::FlexOrGrid => true,
        ContainerKind::Table => layout_box.is_table(),
        ContainerKind::Ruby => !layout_box.is_inline(),
        ContainerKind::Inline | ContainerKind::Leaf => false,
    }
}

impl BoxTree {
    /// The positioned-descendant index.
    #[must_use]
    pub const fn positioned_index(&self) -> &DescendantIndex {
        &self.indices.positioned
    }

    /// The percent-height-descendant index.
    #[must_use]
    pub const fn percent_height_index(&self) -> &DescendantIndex {
        &self.indices.percent_height
    }

    /// Out-of-flow boxes whose containing block is `container`.
    #[must_use]
    pub fn positioned_descendants_of(&self, container: BoxId) -> Vec<BoxId> {
        self.indices.positioned.descendants_of(container).collect()
    }

    /// Boxes whose percentage height depends on the height of `container`.
    #[must_use]
    pub fn percent_height_descendants_of(&self, container: BoxId) -> Vec<BoxId> {
        self.indices.percent_height.descendants_of(container).collect()
    }

    /// Whether some box resolves a percentage height against `id`.
    #[must_use]
    pub fn has_percent_height_descendant(&self, id: BoxId) -> bool {
        self.indices.percent_height.has_descendants(id)
    }

    /// [§ 10.1](https://www.w3.org/TR/CSS2/visudet.html#containing-block-details)
    ///
    /// "For other elements, if the element's position is 'relative' or
    /// 'static', the containing block is formed by the content edge of the
    /// nearest ancestor box that is a block container or which establishes a
    /// formatting context."
    #[must_use]
    pub fn containing_block(&self, id: BoxId) -> Option<BoxId> {
        if self.get(id)?.is_out_of_flow() {
            return self.containing_block_for_out_of_flow(id);
        }
        self.ancestors(id)
            .find(|&a| self.get(a).is_some_and(is_block_container))
    }

    /// [§ 10.1](https://www.w3.org/TR/CSS2/visudet.html#containing-block-details)
    ///
    /// "If the element has 'position: fixed', the containing block is
    /// established by the viewport."
    ///
    /// "If the element has 'position: absolute', the containing block is
    /// established by the nearest ancestor with a 'position' of 'absolute',
    /// 'relative' or 'fixed'."
    ///
    /// A positioned inline ancestor resolves to its enclosing non-anonymous
    /// block container. Returns `None` inside a detached subtree.
    #[must_use]
    pub fn containing_block_for_out_of_flow(&self, id: BoxId) -> Option<BoxId> {
        let layout_box = self.get(id)?;
        if layout_box.is_fixed_position() {
            return self.is_attached(id).then_some(self.root());
        }
        for ancestor in self.ancestors(id) {
            if ancestor == self.root() {
                return Some(ancestor);
            }
            let candidate = self.get(ancestor)?;
            if candidate.is_anonymous() || !candidate.style().can_contain_absolute() {
                continue;
            }
            if candidate.is_inline_box() {
                return self.enclosing_non_anonymous_block(ancestor);
            }
            return Some(ancestor);
        }
        None
    }

    fn enclosing_non_anonymous_block(&self, id: BoxId) -> Option<BoxId> {
        self.ancestors(id).find(|&a| {
            self.get(a)
                .is_some_and(|b| is_block_container(b) && !b.is_anonymous())
        })
    }

    /// [§ 10.5 Content height](https://www.w3.org/TR/CSS2/visudet.html#the-height-property)
    ///
    /// "The percentage is calculated with respect to the height of the
    /// generated box's containing block."
    ///
    /// Walks containing blocks outward while their height is `auto`,
    /// collecting each non-anonymous one, and stops at the first containing block with a
    /// non-auto height, a table cell, an out-of-flow box or the root.
    pub(crate) fn percent_height_containers(&self, id: BoxId) -> Vec<BoxId> {
        let Some(layout_box) = self.get(id) else {
            return Vec::new();
        };
        if !layout_box.style().height.is_percent()
            || layout_box.is_text()
            || layout_box.is_inline_box()
        {
            return Vec::new();
        }
        let mut containers = Vec::new();
        let mut current = self.containing_block(id);
        while let Some(container) = current {
            let Some(container_box) = self.get(container) else {
                break;
            };
            // Anonymous blocks are transparent: they come and go with
            // sibling changes and never carry a height of their own.
            if !container_box.is_anonymous() {
                containers.push(container);
            }
            let keep_walking = container != self.root()
                && (container_box.is_anonymous()
                    || (container_box.style().height.is_auto()
                        && !container_box.is_out_of_flow()
                        && !is_table_cell(container_box)));
            if !keep_walking {
                break;
            }
            current = self.containing_block(container);
        }
        containers
    }

    /// Bring `id`'s memberships in both indices in line with its current
    /// style and position in the tree.
    pub(crate) fn update_index_registration(&mut self, id: BoxId) {
        let attached = self.is_attached(id);
        let positioned_container = if attached && self.get(id).is_some_and(LayoutBox::is_out_of_flow)
        {
            self.containing_block_for_out_of_flow(id)
        } else {
            None
        };
        let wanted: Vec<BoxId> = positioned_container.into_iter().collect();
        let current: Vec<BoxId> = self.indices.positioned.containers_of(id).collect();
        if wanted != current {
            let _ = self.indices.positioned.remove(id);
            for container in wanted {
                let _ = self.indices.positioned.insert(id, container);
            }
        }

        let wanted = if attached {
            self.percent_height_containers(id)
        } else {
            Vec::new()
        };
        let current: Vec<BoxId> = self.indices.percent_height.containers_of(id).collect();
        if wanted != current {
            let _ = self.indices.percent_height.remove(id);
            for container in wanted {
                let _ = self.indices.percent_height.insert(id, container);
            }
        }
    }

    /// Register every box of a freshly attached subtree.
    pub(crate) fn register_subtree(&mut self, root: BoxId) {
        if !self.is_attached(root) {
            return;
        }
        for id in self.subtree(root) {
            self.update_index_registration(id);
        }
    }

    /// Re-register boxes moved between wrappers. Percent-height chains run
    /// through every auto-height block, so the whole subtree is refreshed.
    pub(crate) fn refresh_registration_after_move(&mut self, moved: &[BoxId]) {
        for &id in moved {
            self.refresh_subtree_registration(id);
        }
    }

    /// Drop `id` from both indices, as a descendant and as a container.
    pub(crate) fn remove_from_global_maps(&mut self, id: BoxId) {
        let _ = self.indices.positioned.remove(id);
        let _ = self.indices.percent_height.remove(id);
        let _ = self.indices.positioned.remove_container(id);
        let _ = self.indices.percent_height.remove_container(id);
    }

    /// Drop every box of a detached subtree from both indices.
    pub(crate) fn unregister_subtree(&mut self, root: BoxId) {
        for id in self.subtree(root) {
            self.remove_from_global_maps(id);
        }
    }

    /// Re-register a whole subtree after a style change of its root.
    pub(crate) fn refresh_subtree_registration(&mut self, root: BoxId) {
        for id in self.subtree(root) {
            self.update_index_registration(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(tree: &mut BoxTree, n: usize) -> Vec<BoxId> {
        (0..n).map(|i| tree.create_text(format!("{i}"))).collect()
    }

    #[test]
    fn test_maps_are_allocated_lazily() {
        let mut tree = BoxTree::default();
        let boxes = ids(&mut tree, 2);
        let mut index = DescendantIndex::new("test");
        assert!(!index.is_allocated());
        assert!(index.remove(boxes[0]).is_empty());
        assert!(!index.is_allocated());
        assert!(index.insert(boxes[0], boxes[1]));
        assert!(index.is_allocated());
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut tree = BoxTree::default();
        let boxes = ids(&mut tree, 2);
        let mut index = DescendantIndex::new("test");
        assert!(index.insert(boxes[0], boxes[1]));
        assert!(!index.insert(boxes[0], boxes[1]));
        assert_eq!(index.descendants_of(boxes[1]).count(), 1);
        assert!(index.is_symmetric());
    }

    #[test]
    fn test_remove_erases_emptied_container_entries() {
        let mut tree = BoxTree::default();
        let boxes = ids(&mut tree, 4);
        let (d1, d2, c1, c2) = (boxes[0], boxes[1], boxes[2], boxes[3]);
        let mut index = DescendantIndex::new("test");
        let _ = index.insert(d1, c1);
        let _ = index.insert(d1, c2);
        let _ = index.insert(d2, c2);

        assert_eq!(index.remove(d1), vec![c1, c2]);
        assert!(!index.has_descendants(c1));
        assert!(index.has_descendants(c2));
        assert!(!index.is_tracked(d1));
        assert!(index.is_symmetric());
    }

    #[test]
    fn test_remove_container_clears_reverse_entries() {
        let mut tree = BoxTree::default();
        let boxes = ids(&mut tree, 3);
        let (d1, d2, c) = (boxes[0], boxes[1], boxes[2]);
        let mut index = DescendantIndex::new("test");
        let _ = index.insert(d1, c);
        let _ = index.insert(d2, c);

        assert_eq!(index.remove_container(c), vec![d1, d2]);
        assert!(!index.is_tracked(d1));
        assert!(!index.is_tracked(d2));
        assert_eq!(index.container_count(), 0);
        assert!(index.is_symmetric());
    }
}
