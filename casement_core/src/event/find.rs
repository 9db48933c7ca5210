// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometric hit testing: narrowing a point to the most specific surface.

use crate::geometry::{Axis, Point};
use crate::surface::{INVALID, Layout, SurfaceId, SurfaceStore};

/// Returns the deepest non-culled surface containing `point`.
///
/// `point` is window-relative and must lie inside `from` (callers hit-test
/// from a surface already known to contain it, usually the window root).
///
/// Linear layouts use an early-exit scan in packing order: children are
/// allocated in monotonic position order along the packing axis, so the scan
/// breaks as soon as it passes the point. `Cover` scans topmost-first (the
/// last sibling paints last and sits on top). Grid layouts bisect the
/// cumulative edge arrays, giving O(log n) per axis.
///
/// # Panics
///
/// Panics if the handle is stale.
#[must_use]
pub fn find_surface(store: &SurfaceStore, from: SurfaceId, point: Point) -> SurfaceId {
    store.validate(from);
    let mut cur = from.index();
    while let Some(child) = hit_child(store, cur, point) {
        cur = child;
    }
    store.id_at(cur)
}

/// Finds the direct child of `idx` containing `point`, if any.
fn hit_child(store: &SurfaceStore, idx: u32, point: Point) -> Option<u32> {
    match store.layout[idx as usize] {
        Layout::Leaf => None,
        Layout::Single => {
            let child = store.first_child[idx as usize];
            (child != INVALID
                && !store.culled[child as usize]
                && store.allocation[child as usize].contains(point))
            .then_some(child)
        }
        Layout::Cover => {
            // Topmost first: later siblings stack on top of earlier ones.
            let mut hit = None;
            let mut child = store.first_child[idx as usize];
            while child != INVALID {
                if !store.culled[child as usize]
                    && store.allocation[child as usize].contains(point)
                {
                    hit = Some(child);
                }
                child = store.next_sibling[child as usize];
            }
            hit
        }
        Layout::Row | Layout::RowReverse => scan(store, idx, point, Axis::Horizontal),
        Layout::Column | Layout::ColumnReverse => scan(store, idx, point, Axis::Vertical),
        Layout::Grid => hit_grid(store, idx, point),
    }
}

/// Early-exit scan along the packing axis, in enumeration order.
fn scan(store: &SurfaceStore, idx: u32, point: Point, axis: Axis) -> Option<u32> {
    let v = point.on(axis);
    for child in store.enumerate_children(idx) {
        if store.culled[child as usize] {
            continue;
        }
        let alloc = store.allocation[child as usize];
        let start = alloc.origin().on(axis);
        if v < start {
            // Children are placed in increasing enumeration order along the
            // axis; everything later starts further still.
            return None;
        }
        if alloc.contains(point) {
            return Some(child);
        }
    }
    None
}

/// Bisection through the grid's cumulative edges, with a span fallback for
/// points on a border gap covered by a multi-cell span.
fn hit_grid(store: &SurfaceStore, idx: u32, point: Point) -> Option<u32> {
    let table = store.grid[idx as usize].as_deref()?;
    let alloc = store.allocation[idx as usize];
    let rel = point - alloc.origin();

    if let (Some(col), Some(row)) = (table.col_at(rel.x), table.row_at(rel.y)) {
        if let Some(owner) = table.cell(row, col) {
            if !store.culled[owner as usize] && store.allocation[owner as usize].contains(point) {
                return Some(owner);
            }
        }
        return None;
    }

    // The point sits on a border gap; a span crossing the gap still covers
    // it with its allocation.
    table
        .spans()
        .iter()
        .map(|s| s.owner)
        .find(|&owner| {
            !store.culled[owner as usize] && store.allocation[owner as usize].contains(point)
        })
}
