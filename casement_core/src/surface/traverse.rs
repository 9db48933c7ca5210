// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use super::id::{INVALID, SurfaceId};
use super::store::SurfaceStore;

/// An iterator over the direct children of a sibling-list container.
///
/// Created by [`SurfaceStore::children`].
#[derive(Debug)]
pub struct Children<'a> {
    store: &'a SurfaceStore,
    current: u32,
}

impl<'a> Children<'a> {
    pub(crate) fn new(store: &'a SurfaceStore, first: u32) -> Self {
        Self {
            store,
            current: first,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = SurfaceId;

    fn next(&mut self) -> Option<SurfaceId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.store.next_sibling[idx as usize];
        Some(SurfaceId {
            idx,
            generation: self.store.generation[idx as usize],
        })
    }
}
