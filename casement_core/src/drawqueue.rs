// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-window draw queues with ancestor deduplication.
//!
//! Each window owns two queues. New redraw requests append to the **write**
//! queue; when a redraw opportunity arrives the engine swaps the queues
//! (O(1)) and drains the now-current **read** queue. A paint callback that
//! requests another frame re-queues its surface, which always lands in the
//! *new* write queue — never the one being drained — so every redraw cycle
//! terminates in a single pass even under steady-state animation.
//!
//! Queueing is idempotent and ancestor-deduplicated: if the surface or one
//! of its ancestors is already in the write queue the request is a no-op,
//! and queueing a surface evicts any of its descendants already queued
//! (painting the ancestor repaints them anyway).
//!
//! Entries are raw slot indices; the authoritative membership state is the
//! per-slot flag in the store, which destroy clears in O(1) — an entry whose
//! flag no longer matches is a tombstone the drain skips.

use alloc::collections::VecDeque;

use crate::dirty;
use crate::surface::{DqSlot, INVALID, SurfaceId, SurfaceStore};

/// The write/read queue pair of one window.
#[derive(Debug, Default)]
pub struct DrawQueues {
    write: VecDeque<u32>,
    read: VecDeque<u32>,
}

impl DrawQueues {
    /// Creates an empty queue pair.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a redraw of `surface`.
    ///
    /// `needs_reallocate` additionally flags that geometry (not just pixels)
    /// changed, scheduling an allocation pass over the surface's parent
    /// scope before the next draw. The layout request is recorded *before*
    /// the idempotency check so it is never lost when the surface is
    /// already queued.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn queue(&mut self, store: &mut SurfaceStore, surface: SurfaceId, needs_reallocate: bool) {
        store.validate(surface);
        let idx = surface.index();

        if needs_reallocate {
            store.needs_allocate[idx as usize] = true;
            store.dirty.mark(idx, dirty::LAYOUT);
        }

        // Already queued (in either queue): a write entry will be painted
        // next cycle; a read entry is painted this cycle and may re-queue
        // itself afterwards.
        if store.dq_slot[idx as usize] != DqSlot::None {
            return;
        }

        // An ancestor pending in the write queue supersedes this request.
        let mut cur = store.parent[idx as usize];
        while cur != INVALID {
            if store.dq_slot[cur as usize] == DqSlot::Write {
                return;
            }
            cur = store.parent[cur as usize];
        }

        // Queued descendants are implied by this entry; evict them.
        let write = &mut self.write;
        write.retain(|&e| {
            let covered = store.dq_slot[e as usize] == DqSlot::Write && {
                let mut a = e;
                loop {
                    if a == idx {
                        break true;
                    }
                    a = store.parent[a as usize];
                    if a == INVALID {
                        break false;
                    }
                }
            };
            if covered {
                store.dq_slot[e as usize] = DqSlot::None;
            }
            !covered
        });

        store.dq_slot[idx as usize] = DqSlot::Write;
        self.write.push_back(idx);
    }

    /// Returns whether both queues are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.write.is_empty() && self.read.is_empty()
    }

    /// Returns the live entries currently pending in the write queue.
    #[must_use]
    pub fn pending(&self, store: &SurfaceStore) -> usize {
        self.write
            .iter()
            .filter(|&&e| store.dq_slot[e as usize] == DqSlot::Write)
            .count()
    }

    /// Swaps the queues at the start of a redraw cycle.
    ///
    /// The read queue must have been fully drained by the previous cycle.
    pub fn swap(&mut self, store: &mut SurfaceStore) {
        debug_assert!(self.read.is_empty(), "read queue drained every cycle");
        for &e in &self.write {
            if store.dq_slot[e as usize] == DqSlot::Write {
                store.dq_slot[e as usize] = DqSlot::Read;
            }
        }
        core::mem::swap(&mut self.write, &mut self.read);
    }

    /// Pops the next live entry from the read queue, clearing its membership
    /// flag. Tombstones (destroyed or evicted entries) are skipped.
    pub fn pop_read(&mut self, store: &mut SurfaceStore) -> Option<u32> {
        while let Some(e) = self.read.pop_front() {
            if store.dq_slot[e as usize] == DqSlot::Read {
                store.dq_slot[e as usize] = DqSlot::None;
                return Some(e);
            }
        }
        None
    }

    /// Empties the write queue without drawing (a full-window redraw is
    /// superseding incremental requests). The caller is responsible for
    /// cancelling any pending frame-callback registration.
    pub fn flush(&mut self, store: &mut SurfaceStore) {
        for &e in &self.write {
            if store.dq_slot[e as usize] == DqSlot::Write {
                store.dq_slot[e as usize] = DqSlot::None;
            }
        }
        self.write.clear();
    }
}

#[cfg(test)]
mod tests {
    use crate::surface::Layout;

    use super::*;

    fn tree() -> (SurfaceStore, SurfaceId, SurfaceId, SurfaceId) {
        // win -> mid -> leaf
        let mut store = SurfaceStore::new();
        let win = store.create_window(Layout::Row);
        let mid = store.create_widget(win, Layout::Column).unwrap();
        let leaf = store.create_widget(mid, Layout::Leaf).unwrap();
        (store, win, mid, leaf)
    }

    #[test]
    fn queueing_is_idempotent() {
        let (mut store, win, ..) = tree();
        let mut q = DrawQueues::new();
        q.queue(&mut store, win, false);
        q.queue(&mut store, win, false);
        assert_eq!(q.pending(&store), 1);
    }

    #[test]
    fn ancestor_supersedes_descendant() {
        let (mut store, win, _mid, leaf) = tree();
        let mut q = DrawQueues::new();
        q.queue(&mut store, leaf, false);
        q.queue(&mut store, win, false);

        // Only the window remains.
        assert_eq!(q.pending(&store), 1);
        assert_eq!(q.pop_read_after_swap(&mut store), alloc::vec![win.index()]);
    }

    #[test]
    fn queueing_under_a_pending_ancestor_is_a_noop() {
        let (mut store, win, _mid, leaf) = tree();
        let mut q = DrawQueues::new();
        q.queue(&mut store, win, false);
        q.queue(&mut store, leaf, false);
        assert_eq!(q.pending(&store), 1);
    }

    #[test]
    fn grandparent_covers_grandchild() {
        // Queue a grandchild, then its grandparent: one entry, the
        // grandparent, survives.
        let (mut store, win, mid, leaf) = tree();
        let mut q = DrawQueues::new();
        q.queue(&mut store, leaf, false);
        q.queue(&mut store, win, false);
        assert_eq!(q.pop_read_after_swap(&mut store), alloc::vec![win.index()]);

        // And the sibling case: two disjoint subtrees both stay queued.
        let leaf2 = store.create_widget(mid, Layout::Leaf).unwrap();
        q.queue(&mut store, leaf, false);
        q.queue(&mut store, leaf2, false);
        assert_eq!(q.pending(&store), 2);
    }

    #[test]
    fn requeue_during_drain_lands_in_next_cycle() {
        let (mut store, win, ..) = tree();
        let mut q = DrawQueues::new();
        q.queue(&mut store, win, false);
        q.swap(&mut store);

        // Drain the cycle; an "animation" re-queues while draining.
        let popped = q.pop_read(&mut store).unwrap();
        assert_eq!(popped, win.index());
        q.queue(&mut store, win, false);

        // The read queue is dry; the request sits in the write queue.
        assert_eq!(q.pop_read(&mut store), None);
        assert_eq!(q.pending(&store), 1);
    }

    #[test]
    fn destroy_leaves_only_a_tombstone() {
        let (mut store, _win, mid, leaf) = tree();
        let mut q = DrawQueues::new();
        q.queue(&mut store, leaf, false);
        store.destroy(mid);

        assert_eq!(q.pending(&store), 0);
        q.swap(&mut store);
        assert_eq!(q.pop_read(&mut store), None);
    }

    #[test]
    fn flush_discards_without_drawing() {
        let (mut store, win, _mid, leaf) = tree();
        let mut q = DrawQueues::new();
        q.queue(&mut store, leaf, false);
        q.flush(&mut store);

        assert!(q.is_empty());
        // Everything can be queued fresh afterwards.
        q.queue(&mut store, win, false);
        assert_eq!(q.pending(&store), 1);
    }

    #[test]
    fn needs_reallocate_survives_the_idempotent_return() {
        let (mut store, _win, mid, leaf) = tree();
        let mut q = DrawQueues::new();
        q.queue(&mut store, leaf, false);
        let _ = store.collect_invalidations();

        // Already queued, but the relayout request must still register.
        q.queue(&mut store, leaf, true);
        let report = store.collect_invalidations();
        assert_eq!(report.layout_scopes, alloc::vec![mid.index()]);
        assert!(store.needs_allocate[leaf.index() as usize]);
    }

    impl DrawQueues {
        /// Test helper: swap then drain everything.
        fn pop_read_after_swap(&mut self, store: &mut SurfaceStore) -> alloc::vec::Vec<u32> {
            self.swap(store);
            let mut out = alloc::vec::Vec::new();
            while let Some(e) = self.pop_read(store) {
                out.push(e);
            }
            out
        }
    }
}
