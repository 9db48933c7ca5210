// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Draining dirty channels into a per-frame invalidation report.

use alloc::vec::Vec;

use crate::dirty;

use super::id::INVALID;
use super::store::SurfaceStore;

/// The set of invalidations accumulated since the last frame pass.
///
/// All fields carry raw slot indices so the frame pass can index the store's
/// arrays directly without per-access generation checks.
#[derive(Clone, Debug, Default)]
pub struct InvalidationReport {
    /// Deduplicated reallocation scope roots: for each, re-aggregate and
    /// redistribute the subtree within the scope's current allocation. A
    /// scope contained in another listed scope is dropped.
    pub layout_scopes: Vec<u32>,
    /// Surfaces whose hidden flag flipped; their window regions need
    /// repainting even if nothing else moved.
    pub visibility: Vec<u32>,
    /// Whether the tree structure changed since the last drain.
    pub topology_changed: bool,
}

impl InvalidationReport {
    /// Clears all lists.
    pub fn clear(&mut self) {
        self.layout_scopes.clear();
        self.visibility.clear();
        self.topology_changed = false;
    }

    /// Returns whether nothing was invalidated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layout_scopes.is_empty() && self.visibility.is_empty() && !self.topology_changed
    }
}

impl SurfaceStore {
    /// Drains all dirty channels, resolving marks into reallocation scopes.
    pub fn collect_invalidations(&mut self) -> InvalidationReport {
        let mut report = InvalidationReport::default();
        self.collect_invalidations_into(&mut report);
        report
    }

    /// Like [`collect_invalidations`](Self::collect_invalidations), but
    /// reuses a caller-provided buffer to avoid allocation.
    pub fn collect_invalidations_into(&mut self, report: &mut InvalidationReport) {
        report.clear();

        // LAYOUT marks resolve to the mutated surface's parent (window roots
        // resolve to themselves).
        let marked: Vec<u32> = self
            .dirty
            .drain(dirty::LAYOUT)
            .deterministic()
            .run()
            .collect();
        let mut scopes: Vec<u32> = Vec::new();
        for idx in marked {
            if !self.slot_live(idx) {
                continue;
            }
            let p = self.parent[idx as usize];
            let scope = if p == INVALID { idx } else { p };
            if !scopes.contains(&scope) {
                scopes.push(scope);
            }
        }
        // Drop scopes already covered by a listed ancestor.
        let all = scopes.clone();
        scopes.retain(|&s| {
            let mut cur = self.parent[s as usize];
            while cur != INVALID {
                if all.contains(&cur) {
                    return false;
                }
                cur = self.parent[cur as usize];
            }
            true
        });
        report.layout_scopes = scopes;

        // VISIBILITY marks pass through (live slots only).
        let visibility: Vec<u32> = self
            .dirty
            .drain(dirty::VISIBILITY)
            .deterministic()
            .run()
            .collect();
        report.visibility = visibility
            .into_iter()
            .filter(|&idx| self.slot_live(idx))
            .collect();

        // TOPOLOGY collapses to a flag; the structural work already happened
        // at mutation time.
        let topology: Vec<u32> = self
            .dirty
            .drain(dirty::TOPOLOGY)
            .deterministic()
            .run()
            .collect();
        report.topology_changed = !topology.is_empty();
    }
}
