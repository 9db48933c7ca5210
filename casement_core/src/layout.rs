// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The allocation engine: two-pass size aggregation and distribution.
//!
//! Given a scope root whose `allocation` rectangle is the *available* space,
//! the engine assigns every descendant's `allocation` and `culled` flag:
//!
//! 1. **Aggregation** (post-order): each container's requested size is the
//!    sum of its visible children along the packing axis — one border unit
//!    between and around each child — and the maximum across the other axis
//!    plus two border units. An explicit size request overrides the computed
//!    value per axis. Hidden children are culled here (the only pre-pass
//!    culling reason) and their subtrees are skipped.
//!
//! 2. **Distribution** (pre-order): children are placed sequentially along
//!    the packing axis. Surplus space is split evenly among children whose
//!    expand flag is set on that axis, with the integer remainder absorbed
//!    by the last expander in enumeration order, so assigned sizes sum
//!    exactly to the available extent. When space is short, the first child
//!    whose cumulative position would pass the bound is culled along with
//!    every later child in enumeration order — a scan-break cutoff, not a
//!    best fit, preserved exactly for layout compatibility. Reversed layouts
//!    enumerate from the tail of the sibling list, so their culled children
//!    form a prefix of the list instead of a suffix.
//!
//! Grid containers run the same two passes over per-column width and
//! per-row height arrays, then build the cumulative edge offsets the event
//! router bisects.
//!
//! A culled surface keeps its stale allocation so re-showing it is cheap;
//! `culled` is authoritative over `allocation` validity.

use alloc::vec;
use alloc::vec::Vec;

use crate::geometry::{Axis, Point, Rect, Size};
use crate::surface::{GridSpan, INVALID, Layout, SurfaceId, SurfaceStore};

/// Runs both passes from a window root, with `available` as the root's box.
pub fn allocate(store: &mut SurfaceStore, root: SurfaceId, available: Size) {
    store.validate(root);
    let idx = root.index();
    store.allocation[idx as usize] = Rect::from_origin_size(Point::ZERO, available);
    allocate_scope_raw(store, idx);
}

/// Re-runs both passes over `scope`'s subtree within its current allocation.
///
/// This is the form the draw pass uses for `needs_reallocate` requests: the
/// scope's own box is not renegotiated.
pub fn allocate_scope(store: &mut SurfaceStore, scope: SurfaceId) {
    store.validate(scope);
    allocate_scope_raw(store, scope.index());
}

pub(crate) fn allocate_scope_raw(store: &mut SurfaceStore, idx: u32) {
    store.culled[idx as usize] = store.hidden[idx as usize];
    if store.culled[idx as usize] {
        return;
    }
    aggregate(store, idx);
    distribute(store, idx);
}

// ---------------------------------------------------------------------------
// Pass 1: aggregation
// ---------------------------------------------------------------------------

/// Computes `aggregated` for `idx`'s subtree, post-order. Returns the size.
fn aggregate(store: &mut SurfaceStore, idx: u32) -> Size {
    let layout = store.layout[idx as usize];
    let b = i32::from(store.border[idx as usize]);

    let computed = match layout {
        Layout::Leaf => store.default_widget_size(),
        Layout::Grid => aggregate_grid(store, idx, b),
        _ => {
            let mut visible = 0;
            let mut sum = Size::ZERO;
            let mut max = Size::ZERO;
            let mut child = store.first_child[idx as usize];
            while child != INVALID {
                if store.hidden[child as usize] {
                    store.culled[child as usize] = true;
                } else {
                    let req = aggregate(store, child);
                    visible += 1;
                    sum.width += req.width;
                    sum.height += req.height;
                    max.width = max.width.max(req.width);
                    max.height = max.height.max(req.height);
                }
                child = store.next_sibling[child as usize];
            }

            if visible == 0 {
                // An empty container still reserves one border unit.
                Size::new(b, b)
            } else {
                match layout {
                    Layout::Single | Layout::Cover => {
                        Size::new(max.width + 2 * b, max.height + 2 * b)
                    }
                    Layout::Row | Layout::RowReverse => {
                        Size::new(sum.width + (visible + 1) * b, max.height + 2 * b)
                    }
                    Layout::Column | Layout::ColumnReverse => {
                        Size::new(max.width + 2 * b, sum.height + (visible + 1) * b)
                    }
                    Layout::Leaf | Layout::Grid => unreachable!(),
                }
            }
        }
    };

    // An explicit request overrides the computed value per axis.
    let explicit = store.requested[idx as usize];
    let agg = Size::new(
        if explicit.width > 0 {
            explicit.width
        } else {
            computed.width
        },
        if explicit.height > 0 {
            explicit.height
        } else {
            computed.height
        },
    );
    store.aggregated[idx as usize] = agg;
    agg
}

/// Aggregates a grid: fills the table's per-line extent arrays and returns
/// the summed size.
fn aggregate_grid(store: &mut SurfaceStore, idx: u32, b: i32) -> Size {
    let spans: Vec<GridSpan> = store.grid[idx as usize]
        .as_deref()
        .map(|t| t.spans().to_vec())
        .unwrap_or_default();

    let mut any_visible = false;
    for span in &spans {
        if store.hidden[span.owner as usize] {
            store.culled[span.owner as usize] = true;
        } else {
            aggregate(store, span.owner);
            any_visible = true;
        }
    }

    let Some(table) = store.grid[idx as usize].as_deref() else {
        return Size::new(b, b);
    };
    if !any_visible {
        return Size::new(b, b);
    }

    let cols = table.cols() as usize;
    let rows = table.rows() as usize;
    let mut col_widths = vec![0_i32; cols];
    let mut row_heights = vec![0_i32; rows];

    // A spanning widget contributes request / span per crossed line, the
    // integer remainder landing on the last line of its span.
    for span in &spans {
        if store.hidden[span.owner as usize] {
            continue;
        }
        let req = store.aggregated[span.owner as usize];
        spread(
            &mut col_widths,
            span.col as usize,
            span.col_span as usize,
            req.width,
        );
        spread(
            &mut row_heights,
            span.row as usize,
            span.row_span as usize,
            req.height,
        );
    }

    #[expect(clippy::cast_possible_truncation, reason = "table dimensions fit i32")]
    let size = Size::new(
        col_widths.iter().sum::<i32>() + (cols as i32 + 1) * b,
        row_heights.iter().sum::<i32>() + (rows as i32 + 1) * b,
    );

    let table = store.grid[idx as usize]
        .as_deref_mut()
        .expect("grid table checked above");
    table.col_widths = col_widths;
    table.row_heights = row_heights;
    size
}

/// Raises `extents[at..at + span]` so they can hold `total`, dividing evenly
/// with the remainder on the last crossed line.
fn spread(extents: &mut [i32], at: usize, span: usize, total: i32) {
    #[expect(clippy::cast_possible_truncation, reason = "span counts are small")]
    let span_lines = span as i32;
    let per = total / span_lines;
    for (i, extent) in extents[at..at + span].iter_mut().enumerate() {
        let want = if i == span - 1 {
            per + total % span_lines
        } else {
            per
        };
        *extent = (*extent).max(want);
    }
}

// ---------------------------------------------------------------------------
// Pass 2: distribution
// ---------------------------------------------------------------------------

/// Places `idx`'s children inside its allocation, pre-order.
fn distribute(store: &mut SurfaceStore, idx: u32) {
    let layout = store.layout[idx as usize];
    let b = i32::from(store.border[idx as usize]);
    let alloc = store.allocation[idx as usize];

    match layout {
        Layout::Leaf => {}
        Layout::Single | Layout::Cover => {
            let content = Rect::new(
                alloc.x + b,
                alloc.y + b,
                alloc.width - 2 * b,
                alloc.height - 2 * b,
            );
            let children = store.enumerate_children(idx);
            for child in children {
                if store.hidden[child as usize] {
                    continue; // culled in pass 1
                }
                if content.is_empty() {
                    store.culled[child as usize] = true;
                    continue;
                }
                place(store, child, content);
            }
        }
        Layout::Row | Layout::RowReverse => distribute_linear(store, idx, Axis::Horizontal),
        Layout::Column | Layout::ColumnReverse => distribute_linear(store, idx, Axis::Vertical),
        Layout::Grid => distribute_grid(store, idx),
    }
}

/// Linear distribution along `axis` in enumeration order.
fn distribute_linear(store: &mut SurfaceStore, idx: u32, axis: Axis) {
    let b = i32::from(store.border[idx as usize]);
    let alloc = store.allocation[idx as usize];
    let cross = axis.cross();

    let children: Vec<u32> = store
        .enumerate_children(idx)
        .into_iter()
        .filter(|&c| !store.hidden[c as usize])
        .collect();
    if children.is_empty() {
        return;
    }
    let n = children.len();

    let avail_along = alloc.size().along(axis);
    let avail_cross = alloc.size().along(cross) - 2 * b;

    #[expect(clippy::cast_possible_truncation, reason = "child counts fit i32")]
    let total_req = children
        .iter()
        .map(|&c| store.aggregated[c as usize].along(axis))
        .sum::<i32>()
        + (n as i32 + 1) * b;
    let surplus = avail_along - total_req;

    // Surplus splits evenly among expanders; the last expander in
    // enumeration order absorbs the integer remainder so assigned sizes sum
    // exactly to the available extent.
    let mut extra = vec![0_i32; n];
    if surplus > 0 {
        let expanders: Vec<usize> = (0..n)
            .filter(|&i| store.expand[children[i] as usize].along(axis))
            .collect();
        if let Some(&last) = expanders.last() {
            #[expect(clippy::cast_possible_truncation, reason = "child counts fit i32")]
            let k = expanders.len() as i32;
            for &i in &expanders {
                extra[i] = surplus / k;
            }
            extra[last] += surplus % k;
        }
    }

    let limit = avail_along - b;
    let mut pos = b;
    let mut overflowed = false;
    for (i, &child) in children.iter().enumerate() {
        let size_along = store.aggregated[child as usize].along(axis) + extra[i];
        if overflowed || pos + size_along > limit {
            // Ran out of room: this child and the rest of the enumeration
            // are culled. Not a best fit, deliberately.
            store.culled[child as usize] = true;
            overflowed = true;
            continue;
        }

        let mut size_cross = store.aggregated[child as usize].along(cross);
        if store.expand[child as usize].along(cross) {
            size_cross = avail_cross;
        } else {
            size_cross = size_cross.min(avail_cross);
        }

        let rect = match axis {
            Axis::Horizontal => Rect::new(alloc.x + pos, alloc.y + b, size_along, size_cross),
            Axis::Vertical => Rect::new(alloc.x + b, alloc.y + pos, size_cross, size_along),
        };
        place(store, child, rect);
        pos += size_along + b;
    }
}

/// Grid distribution: finalize line extents, build cumulative edges, place
/// each span owner once.
fn distribute_grid(store: &mut SurfaceStore, idx: u32) {
    let b = i32::from(store.border[idx as usize]);
    let alloc = store.allocation[idx as usize];

    let Some(table) = store.grid[idx as usize].as_deref() else {
        return;
    };
    let spans = table.spans().to_vec();
    let cols = table.cols() as usize;
    let rows = table.rows() as usize;
    let mut col_widths = table.col_widths.clone();
    let mut row_heights = table.row_heights.clone();
    if col_widths.len() != cols || row_heights.len() != rows {
        // No visible spans were aggregated.
        return;
    }

    // Per-line expandability: a line expands if any visible span crossing it
    // has the matching expand flag.
    let mut col_expand = vec![false; cols];
    let mut row_expand = vec![false; rows];
    for span in &spans {
        if store.hidden[span.owner as usize] {
            continue;
        }
        let flags = store.expand[span.owner as usize];
        if flags.horizontal {
            for e in &mut col_expand[span.col as usize..(span.col + span.col_span) as usize] {
                *e = true;
            }
        }
        if flags.vertical {
            for e in &mut row_expand[span.row as usize..(span.row + span.row_span) as usize] {
                *e = true;
            }
        }
    }

    #[expect(clippy::cast_possible_truncation, reason = "table dimensions fit i32")]
    {
        let surplus_x = alloc.width - (col_widths.iter().sum::<i32>() + (cols as i32 + 1) * b);
        distribute_surplus(&mut col_widths, &col_expand, surplus_x);
        let surplus_y = alloc.height - (row_heights.iter().sum::<i32>() + (rows as i32 + 1) * b);
        distribute_surplus(&mut row_heights, &row_expand, surplus_y);
    }

    // Cumulative edges, content-relative: xs[0] is the leading border, each
    // next edge adds the line extent plus one border unit.
    let mut xs = vec![0_i32; cols + 1];
    xs[0] = b;
    for i in 0..cols {
        xs[i + 1] = xs[i] + col_widths[i] + b;
    }
    let mut ys = vec![0_i32; rows + 1];
    ys[0] = b;
    for i in 0..rows {
        ys[i + 1] = ys[i] + row_heights[i] + b;
    }

    let table = store.grid[idx as usize]
        .as_deref_mut()
        .expect("grid table checked above");
    table.col_widths = col_widths;
    table.row_heights = row_heights;
    table.xs = xs.clone();
    table.ys = ys.clone();

    for span in &spans {
        let owner = span.owner;
        if store.hidden[owner as usize] {
            continue; // culled in pass 1
        }
        let (c0, c1) = (span.col as usize, (span.col + span.col_span) as usize);
        let (r0, r1) = (span.row as usize, (span.row + span.row_span) as usize);
        let w = xs[c1] - xs[c0] - b;
        let h = ys[r1] - ys[r0] - b;
        if xs[c0] + w > alloc.width - b || ys[r0] + h > alloc.height - b {
            store.culled[owner as usize] = true;
            continue;
        }
        let rect = Rect::new(alloc.x + xs[c0], alloc.y + ys[r0], w, h);
        place(store, owner, rect);
    }
}

/// Splits positive surplus among expandable lines, remainder to the last.
fn distribute_surplus(extents: &mut [i32], expandable: &[bool], surplus: i32) {
    if surplus <= 0 {
        return;
    }
    let expanders: Vec<usize> = (0..extents.len()).filter(|&i| expandable[i]).collect();
    let Some(&last) = expanders.last() else {
        return;
    };
    #[expect(clippy::cast_possible_truncation, reason = "line counts fit i32")]
    let k = expanders.len() as i32;
    for &i in &expanders {
        extents[i] += surplus / k;
    }
    extents[last] += surplus % k;
}

/// Commits one child's rectangle and recurses.
fn place(store: &mut SurfaceStore, child: u32, rect: Rect) {
    store.culled[child as usize] = false;
    if store.allocation[child as usize] != rect {
        store.allocation[child as usize] = rect;
        store.needs_allocate[child as usize] = true;
    }
    distribute(store, child);
}
