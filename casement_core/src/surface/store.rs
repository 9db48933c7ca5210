// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays surface storage with allocation, topology, and property
//! management.

use alloc::boxed::Box;
use alloc::vec::Vec;

use understory_dirty::{CycleHandling, DirtyTracker};

use crate::dirty;
use crate::error::TreeError;
use crate::geometry::{Axis, Rect, Size};

use super::grid::GridTable;
use super::handlers::{DestroyFn, Handlers};
use super::id::{INVALID, SurfaceId};

/// Fallback size for a childless widget with no explicit size request.
pub const DEFAULT_WIDGET_SIZE: Size = Size::new(32, 32);

/// How a container arranges its children.
///
/// Exactly one child representation is meaningful per surface, selected by
/// this value: the sibling list for every variant except [`Grid`](Self::Grid),
/// which uses the surface's [`GridTable`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Layout {
    /// A leaf; children are refused.
    #[default]
    Leaf,
    /// Exactly one child, filling the content box.
    Single,
    /// Children flow left to right.
    Row,
    /// Children flow right to left (tail of the list is leftmost).
    RowReverse,
    /// Children flow top to bottom.
    Column,
    /// Children flow bottom to top (tail of the list is topmost).
    ColumnReverse,
    /// Every child covers the full content box; later children stack on top.
    Cover,
    /// Children occupy rectangular cell spans of a grid.
    Grid,
}

impl Layout {
    /// The packing axis of a directional layout.
    #[must_use]
    pub const fn axis(self) -> Option<Axis> {
        match self {
            Self::Row | Self::RowReverse => Some(Axis::Horizontal),
            Self::Column | Self::ColumnReverse => Some(Axis::Vertical),
            _ => None,
        }
    }

    /// Whether children are enumerated from the tail of the sibling list.
    #[must_use]
    pub const fn reversed(self) -> bool {
        matches!(self, Self::RowReverse | Self::ColumnReverse)
    }
}

/// Per-axis expansion flags: whether a surface absorbs surplus space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ExpandFlags {
    /// Absorb horizontal surplus.
    pub horizontal: bool,
    /// Absorb vertical surplus.
    pub vertical: bool,
}

impl ExpandFlags {
    /// Expand on both axes.
    pub const BOTH: Self = Self {
        horizontal: true,
        vertical: true,
    };

    /// Returns the flag for the given axis.
    #[inline]
    #[must_use]
    pub const fn along(self, axis: Axis) -> bool {
        match axis {
            Axis::Horizontal => self.horizontal,
            Axis::Vertical => self.vertical,
        }
    }
}

/// Which of a window's two draw queues a surface currently sits in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum DqSlot {
    /// Not queued.
    #[default]
    None,
    /// In the write queue (accepting new entries).
    Write,
    /// In the read queue (being drained this frame).
    Read,
}

/// Struct-of-arrays storage for all surfaces (windows and widgets).
///
/// Surfaces are addressed by [`SurfaceId`] handles. Internally, each surface
/// occupies a slot in parallel arrays. Destroyed surfaces are recycled via a
/// free list, and generation counters prevent stale handle access.
///
/// A surface with no parent is a *window root*; every other surface is a
/// widget. Each slot's `window` field caches the slot index of its nearest
/// window root, maintained at link time.
#[derive(Debug)]
pub struct SurfaceStore {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,
    pub(crate) window: Vec<u32>,
    pub(crate) layout: Vec<Layout>,
    pub(crate) grid: Vec<Option<Box<GridTable>>>,

    // -- Local properties (set by callers) --
    pub(crate) requested: Vec<Size>,
    pub(crate) expand: Vec<ExpandFlags>,
    pub(crate) border: Vec<u16>,
    pub(crate) hidden: Vec<bool>,

    // -- Computed properties (written by the allocation pass) --
    pub(crate) aggregated: Vec<Size>,
    pub(crate) allocation: Vec<Rect>,
    pub(crate) culled: Vec<bool>,
    pub(crate) needs_allocate: Vec<bool>,

    // -- Draw-queue bookkeeping --
    pub(crate) dq_slot: Vec<DqSlot>,

    // -- Behavior --
    pub(crate) handlers: Vec<Handlers>,

    // -- Slot allocation --
    pub(crate) generation: Vec<u32>,
    free_list: Vec<u32>,
    len: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,

    default_widget_size: Size,
}

impl Default for SurfaceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SurfaceStore {
    /// Creates an empty surface store.
    #[must_use]
    pub fn new() -> Self {
        Self::with_default_widget_size(DEFAULT_WIDGET_SIZE)
    }

    /// Creates an empty store with a custom fallback widget size.
    #[must_use]
    pub fn with_default_widget_size(default_widget_size: Size) -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            window: Vec::new(),
            layout: Vec::new(),
            grid: Vec::new(),
            requested: Vec::new(),
            expand: Vec::new(),
            border: Vec::new(),
            hidden: Vec::new(),
            aggregated: Vec::new(),
            allocation: Vec::new(),
            culled: Vec::new(),
            needs_allocate: Vec::new(),
            dq_slot: Vec::new(),
            handlers: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            default_widget_size,
        }
    }

    /// The fallback size for childless widgets without an explicit request.
    #[inline]
    #[must_use]
    pub fn default_widget_size(&self) -> Size {
        self.default_widget_size
    }

    // -- Allocation API --

    /// Creates a new window root with the given layout.
    ///
    /// The root starts unsized; the first configure (or an explicit
    /// allocation pass) gives it geometry.
    pub fn create_window(&mut self, layout: Layout) -> SurfaceId {
        let idx = self.alloc_slot(layout);
        self.window[idx as usize] = idx;
        self.dirty.mark(idx, dirty::TOPOLOGY);
        self.dirty.mark(idx, dirty::LAYOUT);
        SurfaceId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Creates a widget as the last child of `parent` (sibling-list layouts).
    ///
    /// Fails if the parent's layout refuses children, already has its one
    /// child (`Single`), or is a `Grid` (use
    /// [`create_grid_widget`](Self::create_grid_widget)).
    ///
    /// # Panics
    ///
    /// Panics if `parent` is stale.
    pub fn create_widget(&mut self, parent: SurfaceId, layout: Layout) -> Result<SurfaceId, TreeError> {
        self.validate(parent);
        let p = parent.idx;
        match self.layout[p as usize] {
            Layout::Leaf => {
                return Err(TreeError::LayoutForbidsChildren {
                    layout: Layout::Leaf,
                });
            }
            Layout::Single if self.first_child[p as usize] != INVALID => {
                return Err(TreeError::TooManyChildren);
            }
            Layout::Grid => return Err(TreeError::GridNeedsCell),
            _ => {}
        }

        let idx = self.alloc_slot(layout);
        self.link_last(p, idx);
        self.window[idx as usize] = self.window[p as usize];
        self.dirty.mark(p, dirty::TOPOLOGY);
        self.dirty.mark(idx, dirty::LAYOUT);
        Ok(SurfaceId {
            idx,
            generation: self.generation[idx as usize],
        })
    }

    /// Creates a widget occupying the cell span anchored at (`row`, `col`)
    /// of the `Grid` container `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is stale.
    pub fn create_grid_widget(
        &mut self,
        parent: SurfaceId,
        layout: Layout,
        row: u32,
        col: u32,
        row_span: u32,
        col_span: u32,
    ) -> Result<SurfaceId, TreeError> {
        self.validate(parent);
        let p = parent.idx;
        if self.layout[p as usize] != Layout::Grid {
            return Err(TreeError::NotAGrid);
        }

        let idx = self.alloc_slot(layout);
        let table = self.grid[p as usize].get_or_insert_with(Box::default);
        if let Err(e) = table.attach(idx, row, col, row_span, col_span) {
            // Roll the fresh slot back; it was never reachable.
            self.release_slot(idx);
            return Err(e);
        }
        self.parent[idx as usize] = p;
        self.window[idx as usize] = self.window[p as usize];
        self.dirty.mark(p, dirty::TOPOLOGY);
        self.dirty.mark(idx, dirty::LAYOUT);
        Ok(SurfaceId {
            idx,
            generation: self.generation[idx as usize],
        })
    }

    /// Destroys a surface and its entire subtree, children first.
    ///
    /// For every destroyed surface: draw-queue membership is cleared, the
    /// destroy-callback stack runs LIFO, and the slot is freed (generation
    /// bump). Returns the destroyed slot indices, deepest first, so callers
    /// holding focus or grab references can unwind them.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn destroy(&mut self, id: SurfaceId) -> Vec<u32> {
        self.validate(id);
        let mut destroyed = Vec::new();
        self.destroy_recursive(id.idx, &mut destroyed);

        // Unlink the subtree root from its parent.
        let root = id.idx;
        let p = self.parent[root as usize];
        if p != INVALID {
            if self.layout[p as usize] == Layout::Grid {
                if let Some(table) = self.grid[p as usize].as_deref_mut() {
                    table.detach(root);
                }
                self.parent[root as usize] = INVALID;
            } else {
                self.unlink_from_parent(root);
            }
            self.dirty.mark(p, dirty::TOPOLOGY);
            self.dirty.mark(p, dirty::LAYOUT);
        }

        for &idx in &destroyed {
            self.release_slot_destroyed(idx);
        }
        destroyed
    }

    /// Returns whether the given handle refers to a live surface.
    #[must_use]
    pub fn is_alive(&self, id: SurfaceId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    // -- Topology queries --

    /// Returns the parent of a surface, if any.
    #[must_use]
    pub fn parent(&self, id: SurfaceId) -> Option<SurfaceId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        (p != INVALID).then(|| self.id_at(p))
    }

    /// Returns the window root this surface belongs to (itself, for roots).
    #[must_use]
    pub fn window_of(&self, id: SurfaceId) -> SurfaceId {
        self.validate(id);
        self.id_at(self.window[id.idx as usize])
    }

    /// Returns an iterator over the direct children of a sibling-list
    /// container. Empty for `Grid` containers; use [`grid`](Self::grid).
    #[must_use]
    pub fn children(&self, id: SurfaceId) -> super::traverse::Children<'_> {
        self.validate(id);
        super::traverse::Children::new(self, self.first_child[id.idx as usize])
    }

    /// Returns the grid table of a `Grid` container, if any cells were
    /// attached.
    #[must_use]
    pub fn grid(&self, id: SurfaceId) -> Option<&GridTable> {
        self.validate(id);
        self.grid[id.idx as usize].as_deref()
    }

    /// Returns all window roots.
    #[must_use]
    pub fn roots(&self) -> Vec<SurfaceId> {
        let mut roots = Vec::new();
        for idx in 0..self.len {
            if self.parent[idx as usize] == INVALID && !self.free_list.contains(&idx) {
                roots.push(self.id_at(idx));
            }
        }
        roots
    }

    /// Returns whether `ancestor` is an ancestor of `id` (or `id` itself).
    #[must_use]
    pub fn is_ancestor_or_self(&self, ancestor: SurfaceId, id: SurfaceId) -> bool {
        self.validate(ancestor);
        self.validate(id);
        let mut cur = id.idx;
        while cur != INVALID {
            if cur == ancestor.idx {
                return true;
            }
            cur = self.parent[cur as usize];
        }
        false
    }

    // -- Property getters --

    /// Returns the explicit size request (zero extents mean "unset").
    #[must_use]
    pub fn requested(&self, id: SurfaceId) -> Size {
        self.validate(id);
        self.requested[id.idx as usize]
    }

    /// Returns the expand flags.
    #[must_use]
    pub fn expand(&self, id: SurfaceId) -> ExpandFlags {
        self.validate(id);
        self.expand[id.idx as usize]
    }

    /// Returns the border unit this surface contributes as a container.
    #[must_use]
    pub fn border(&self, id: SurfaceId) -> u16 {
        self.validate(id);
        self.border[id.idx as usize]
    }

    /// Returns whether the surface is explicitly hidden.
    #[must_use]
    pub fn hidden(&self, id: SurfaceId) -> bool {
        self.validate(id);
        self.hidden[id.idx as usize]
    }

    /// Returns the layout.
    #[must_use]
    pub fn layout(&self, id: SurfaceId) -> Layout {
        self.validate(id);
        self.layout[id.idx as usize]
    }

    /// Returns the computed allocation.
    ///
    /// Only meaningful after an allocation pass; for a culled surface the
    /// value is stale by design ([`culled`](Self::culled) is authoritative).
    #[must_use]
    pub fn allocation(&self, id: SurfaceId) -> Rect {
        self.validate(id);
        self.allocation[id.idx as usize]
    }

    /// Returns whether the surface was culled by the last allocation pass
    /// (hidden, or ran out of space).
    #[must_use]
    pub fn culled(&self, id: SurfaceId) -> bool {
        self.validate(id);
        self.culled[id.idx as usize]
    }

    /// Returns the aggregated (requested) size computed by the last
    /// allocation pass.
    #[must_use]
    pub fn aggregated(&self, id: SurfaceId) -> Size {
        self.validate(id);
        self.aggregated[id.idx as usize]
    }

    // -- Mutation API (auto-marks dirty) --

    /// Sets the explicit size request.
    pub fn set_requested_size(&mut self, id: SurfaceId, size: Size) {
        self.validate(id);
        self.requested[id.idx as usize] = size;
        self.dirty.mark(id.idx, dirty::LAYOUT);
    }

    /// Sets the expand flags.
    pub fn set_expand(&mut self, id: SurfaceId, expand: ExpandFlags) {
        self.validate(id);
        self.expand[id.idx as usize] = expand;
        self.dirty.mark(id.idx, dirty::LAYOUT);
    }

    /// Sets the border unit.
    pub fn set_border(&mut self, id: SurfaceId, border: u16) {
        self.validate(id);
        self.border[id.idx as usize] = border;
        self.dirty.mark(id.idx, dirty::LAYOUT);
    }

    /// Shows or hides the surface. A hidden surface is culled by the next
    /// allocation pass; unhiding restores it without losing its properties.
    pub fn set_hidden(&mut self, id: SurfaceId, hidden: bool) {
        self.validate(id);
        if self.hidden[id.idx as usize] == hidden {
            return;
        }
        self.hidden[id.idx as usize] = hidden;
        self.dirty.mark(id.idx, dirty::LAYOUT);
        self.dirty.mark(id.idx, dirty::VISIBILITY);
    }

    /// Directly sets a window root's allocation (configure handling).
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or not a window root.
    pub fn set_window_size(&mut self, id: SurfaceId, size: Size) {
        self.validate(id);
        assert!(
            self.parent[id.idx as usize] == INVALID,
            "set_window_size on a non-root surface"
        );
        self.allocation[id.idx as usize] = Rect::from_origin_size(crate::geometry::Point::ZERO, size);
        self.dirty.mark(id.idx, dirty::LAYOUT);
    }

    // -- Behavior --

    /// Returns the callback slots for registration.
    pub fn handlers_mut(&mut self, id: SurfaceId) -> &mut Handlers {
        self.validate(id);
        &mut self.handlers[id.idx as usize]
    }

    /// Pushes a destroy callback; callbacks run LIFO at destroy.
    pub fn push_destroy(&mut self, id: SurfaceId, f: DestroyFn) {
        self.validate(id);
        self.handlers[id.idx as usize].destroy.push(f);
    }

    /// Registers action chain `index`. Chains must be registered densely in
    /// order: the first registration must be index 0, the next 1, and so on.
    pub fn register_action(&mut self, id: SurfaceId, index: u32) -> Result<(), TreeError> {
        self.validate(id);
        let actions = &mut self.handlers[id.idx as usize].actions;
        #[expect(clippy::cast_possible_truncation, reason = "chain counts are small")]
        let expected = actions.len() as u32;
        if index != expected {
            return Err(TreeError::ActionIndexOutOfOrder {
                expected,
                got: index,
            });
        }
        actions.push(Vec::new());
        Ok(())
    }

    /// Appends a handler to an already-registered action chain.
    pub fn add_action_handler(
        &mut self,
        id: SurfaceId,
        index: u32,
        f: super::handlers::ActionFn,
    ) -> Result<(), TreeError> {
        self.validate(id);
        let actions = &mut self.handlers[id.idx as usize].actions;
        let chain = actions
            .get_mut(index as usize)
            .ok_or(TreeError::UnknownAction)?;
        chain.push(f);
        Ok(())
    }

    // -- Raw-index accessors --
    //
    // These accept raw slot indices (as found in queue entries and pass
    // reports) rather than `SurfaceId` handles, skipping generation
    // validation. Only use with indices that came from this store.

    /// Rebuilds a handle for a live raw slot index.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= len`.
    #[must_use]
    pub fn id_at(&self, idx: u32) -> SurfaceId {
        assert!(idx < self.len, "slot index {idx} out of range");
        SurfaceId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Returns the allocation at raw slot `idx`.
    #[must_use]
    pub fn allocation_at(&self, idx: u32) -> Rect {
        assert!(idx < self.len, "slot index {idx} out of range");
        self.allocation[idx as usize]
    }

    /// Returns whether the surface at raw slot `idx` is culled.
    #[must_use]
    pub fn culled_at(&self, idx: u32) -> bool {
        assert!(idx < self.len, "slot index {idx} out of range");
        self.culled[idx as usize]
    }

    /// Returns the layout at raw slot `idx`.
    #[must_use]
    pub fn layout_at(&self, idx: u32) -> Layout {
        assert!(idx < self.len, "slot index {idx} out of range");
        self.layout[idx as usize]
    }

    /// Returns and clears the pending-configure flag at raw slot `idx`.
    pub fn take_needs_allocate(&mut self, idx: u32) -> bool {
        assert!(idx < self.len, "slot index {idx} out of range");
        core::mem::take(&mut self.needs_allocate[idx as usize])
    }

    /// Returns the callback slots at raw slot `idx`.
    pub fn handlers_at_mut(&mut self, idx: u32) -> &mut Handlers {
        assert!(idx < self.len, "slot index {idx} out of range");
        &mut self.handlers[idx as usize]
    }

    /// Returns the child slots of `idx` in paint order: sibling-list order,
    /// or span attach order for grids (each spanning widget exactly once).
    #[must_use]
    pub fn children_slots(&self, idx: u32) -> Vec<u32> {
        let mut out = Vec::new();
        self.for_each_child(idx, |c| out.push(c));
        out
    }

    // -- Internal helpers --

    /// Whether the raw slot currently holds a live surface.
    pub(crate) fn slot_live(&self, idx: u32) -> bool {
        idx < self.len && !self.free_list.contains(&idx)
    }

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: SurfaceId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale SurfaceId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    /// Visits every child of `idx` regardless of representation.
    pub(crate) fn for_each_child(&self, idx: u32, mut f: impl FnMut(u32)) {
        if self.layout[idx as usize] == Layout::Grid {
            if let Some(table) = self.grid[idx as usize].as_deref() {
                for span in table.spans() {
                    f(span.owner);
                }
            }
        } else {
            let mut child = self.first_child[idx as usize];
            while child != INVALID {
                let next = self.next_sibling[child as usize];
                f(child);
                child = next;
            }
        }
    }

    /// Collects the children of `idx` in enumeration order for its layout
    /// (tail-first for reversed layouts).
    pub(crate) fn enumerate_children(&self, idx: u32) -> Vec<u32> {
        let mut out = Vec::new();
        self.for_each_child(idx, |c| out.push(c));
        if self.layout[idx as usize].reversed() {
            out.reverse();
        }
        out
    }

    fn alloc_slot(&mut self, layout: Layout) -> u32 {
        if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot.
            self.generation[idx as usize] += 1;
            self.parent[idx as usize] = INVALID;
            self.first_child[idx as usize] = INVALID;
            self.next_sibling[idx as usize] = INVALID;
            self.prev_sibling[idx as usize] = INVALID;
            self.window[idx as usize] = INVALID;
            self.layout[idx as usize] = layout;
            self.grid[idx as usize] = None;
            self.requested[idx as usize] = Size::ZERO;
            self.expand[idx as usize] = ExpandFlags::default();
            self.border[idx as usize] = 0;
            self.hidden[idx as usize] = false;
            self.aggregated[idx as usize] = Size::ZERO;
            self.allocation[idx as usize] = Rect::ZERO;
            self.culled[idx as usize] = false;
            self.needs_allocate[idx as usize] = true;
            self.dq_slot[idx as usize] = DqSlot::None;
            self.handlers[idx as usize] = Handlers::default();
            idx
        } else {
            // Allocate a new slot.
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.window.push(INVALID);
            self.layout.push(layout);
            self.grid.push(None);
            self.requested.push(Size::ZERO);
            self.expand.push(ExpandFlags::default());
            self.border.push(0);
            self.hidden.push(false);
            self.aggregated.push(Size::ZERO);
            self.allocation.push(Rect::ZERO);
            self.culled.push(false);
            self.needs_allocate.push(true);
            self.dq_slot.push(DqSlot::None);
            self.handlers.push(Handlers::default());
            self.generation.push(0);
            idx
        }
    }

    /// Returns a never-linked slot to the free list (failed constructor).
    fn release_slot(&mut self, idx: u32) {
        self.generation[idx as usize] += 1;
        self.free_list.push(idx);
    }

    /// Frees one already-unwound slot after destroy.
    fn release_slot_destroyed(&mut self, idx: u32) {
        self.dirty.remove_key(idx);
        self.generation[idx as usize] += 1;
        self.free_list.push(idx);
    }

    /// Depth-first unwinding: children first, then queue membership and the
    /// destroy stack of `idx` itself. Slots are freed by the caller once the
    /// whole subtree has unwound.
    fn destroy_recursive(&mut self, idx: u32, destroyed: &mut Vec<u32>) {
        let mut children = Vec::new();
        self.for_each_child(idx, |c| children.push(c));
        for c in children {
            self.destroy_recursive(c, destroyed);
        }

        // Queue membership: the queue entry becomes a tombstone the drain
        // skips; the flag is the authority.
        self.dq_slot[idx as usize] = DqSlot::None;
        self.needs_allocate[idx as usize] = false;

        let id = SurfaceId {
            idx,
            generation: self.generation[idx as usize],
        };
        let mut stack = core::mem::take(&mut self.handlers[idx as usize].destroy);
        while let Some(f) = stack.pop() {
            f(id);
        }
        self.handlers[idx as usize] = Handlers::default();
        destroyed.push(idx);
    }

    /// Appends `child` to `parent`'s sibling list.
    fn link_last(&mut self, parent: u32, child: u32) {
        self.parent[child as usize] = parent;
        if self.first_child[parent as usize] == INVALID {
            self.first_child[parent as usize] = child;
        } else {
            let mut last = self.first_child[parent as usize];
            while self.next_sibling[last as usize] != INVALID {
                last = self.next_sibling[last as usize];
            }
            self.next_sibling[last as usize] = child;
            self.prev_sibling[child as usize] = last;
        }
    }

    /// Removes `idx` from its parent's sibling list.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            // Was first child.
            self.first_child[p as usize] = next;
        }
        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn create_and_destroy() {
        let mut store = SurfaceStore::new();
        let win = store.create_window(Layout::Row);
        assert!(store.is_alive(win));
        store.destroy(win);
        assert!(!store.is_alive(win));
    }

    #[test]
    fn generation_prevents_stale_access() {
        let mut store = SurfaceStore::new();
        let a = store.create_window(Layout::Row);
        store.destroy(a);
        let b = store.create_window(Layout::Row);
        // b reuses the same slot but has a different generation.
        assert!(!store.is_alive(a));
        assert!(store.is_alive(b));
        assert_eq!(a.idx, b.idx);
        assert_ne!(a.generation, b.generation);
    }

    #[test]
    fn widget_links_into_parent_and_window() {
        let mut store = SurfaceStore::new();
        let win = store.create_window(Layout::Row);
        let a = store.create_widget(win, Layout::Leaf).unwrap();
        let b = store.create_widget(win, Layout::Leaf).unwrap();

        assert_eq!(store.parent(a), Some(win));
        assert_eq!(store.window_of(a), win);
        assert_eq!(store.window_of(b), win);

        let kids: Vec<_> = store.children(win).collect();
        assert_eq!(kids, vec![a, b]);
    }

    #[test]
    fn leaf_refuses_children() {
        let mut store = SurfaceStore::new();
        let win = store.create_window(Layout::Row);
        let leaf = store.create_widget(win, Layout::Leaf).unwrap();
        assert_eq!(
            store.create_widget(leaf, Layout::Leaf),
            Err(TreeError::LayoutForbidsChildren {
                layout: Layout::Leaf
            })
        );
    }

    #[test]
    fn single_refuses_second_child() {
        let mut store = SurfaceStore::new();
        let win = store.create_window(Layout::Single);
        let _only = store.create_widget(win, Layout::Leaf).unwrap();
        assert_eq!(
            store.create_widget(win, Layout::Leaf),
            Err(TreeError::TooManyChildren)
        );
    }

    #[test]
    fn grid_children_go_through_cells() {
        let mut store = SurfaceStore::new();
        let win = store.create_window(Layout::Grid);
        assert_eq!(
            store.create_widget(win, Layout::Leaf),
            Err(TreeError::GridNeedsCell)
        );

        let cell = store
            .create_grid_widget(win, Layout::Leaf, 1, 2, 1, 1)
            .unwrap();
        assert_eq!(store.parent(cell), Some(win));
        let table = store.grid(win).unwrap();
        assert_eq!(table.cell(1, 2), Some(cell.idx));
    }

    #[test]
    fn overlapping_grid_span_rolls_back_the_slot() {
        let mut store = SurfaceStore::new();
        let win = store.create_window(Layout::Grid);
        let _a = store
            .create_grid_widget(win, Layout::Leaf, 0, 0, 2, 2)
            .unwrap();
        assert_eq!(
            store.create_grid_widget(win, Layout::Leaf, 1, 1, 1, 1),
            Err(TreeError::SpanOverlap)
        );
        // Only the window and the one widget remain reachable.
        assert_eq!(store.grid(win).unwrap().spans().len(), 1);
    }

    #[test]
    fn destroy_runs_stack_lifo_children_first() {
        use alloc::rc::Rc;
        use core::cell::RefCell;

        let order = Rc::new(RefCell::new(Vec::new()));

        let mut store = SurfaceStore::new();
        let win = store.create_window(Layout::Row);
        let child = store.create_widget(win, Layout::Leaf).unwrap();

        for (who, label) in [(win, "win-a"), (win, "win-b"), (child, "child")] {
            let order = Rc::clone(&order);
            store.push_destroy(who, alloc::boxed::Box::new(move |_| {
                order.borrow_mut().push(label);
            }));
        }

        store.destroy(win);
        // Child unwinds before the window; the window's stack pops LIFO.
        assert_eq!(*order.borrow(), vec!["child", "win-b", "win-a"]);
    }

    #[test]
    fn destroy_subtree_detaches_from_grid() {
        let mut store = SurfaceStore::new();
        let win = store.create_window(Layout::Grid);
        let cell = store
            .create_grid_widget(win, Layout::Leaf, 0, 0, 1, 1)
            .unwrap();
        store.destroy(cell);
        assert_eq!(store.grid(win).unwrap().cell(0, 0), None);
    }

    #[test]
    fn action_chains_register_in_order() {
        let mut store = SurfaceStore::new();
        let win = store.create_window(Layout::Row);
        let w = store.create_widget(win, Layout::Leaf).unwrap();

        assert_eq!(
            store.register_action(w, 1),
            Err(TreeError::ActionIndexOutOfOrder {
                expected: 0,
                got: 1
            })
        );
        store.register_action(w, 0).unwrap();
        store.register_action(w, 1).unwrap();
        assert_eq!(
            store.add_action_handler(w, 5, alloc::boxed::Box::new(|_| {})),
            Err(TreeError::UnknownAction)
        );
        store
            .add_action_handler(w, 1, alloc::boxed::Box::new(|_| {}))
            .unwrap();
    }

    #[test]
    fn is_ancestor_or_self_walks_the_chain() {
        let mut store = SurfaceStore::new();
        let win = store.create_window(Layout::Row);
        let mid = store.create_widget(win, Layout::Column).unwrap();
        let leaf = store.create_widget(mid, Layout::Leaf).unwrap();
        let other = store.create_widget(win, Layout::Leaf).unwrap();

        assert!(store.is_ancestor_or_self(win, leaf));
        assert!(store.is_ancestor_or_self(mid, leaf));
        assert!(store.is_ancestor_or_self(leaf, leaf));
        assert!(!store.is_ancestor_or_self(leaf, mid));
        assert!(!store.is_ancestor_or_self(other, leaf));
    }

    #[test]
    #[should_panic(expected = "stale SurfaceId")]
    fn destroyed_handle_panics_on_access() {
        let mut store = SurfaceStore::new();
        let win = store.create_window(Layout::Row);
        store.destroy(win);
        let _ = store.allocation(win);
    }

    #[test]
    fn roots_lists_windows_only() {
        let mut store = SurfaceStore::new();
        let a = store.create_window(Layout::Row);
        let b = store.create_window(Layout::Column);
        let w = store.create_widget(a, Layout::Leaf).unwrap();

        let roots = store.roots();
        assert!(roots.contains(&a));
        assert!(roots.contains(&b));
        assert!(!roots.contains(&w));
    }

    #[test]
    fn enumerate_children_respects_reversal() {
        let mut store = SurfaceStore::new();
        let win = store.create_window(Layout::RowReverse);
        let a = store.create_widget(win, Layout::Leaf).unwrap();
        let b = store.create_widget(win, Layout::Leaf).unwrap();
        assert_eq!(store.enumerate_children(win.idx), vec![b.idx, a.idx]);
    }
}
