// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Row-major grid cell table with rectangular spans.
//!
//! A `Grid` container does not use the sibling list for placement. Instead it
//! owns a [`GridTable`]: a flat, growable, row-major array of cell owners
//! plus one [`GridSpan`] record per child. A widget may occupy a rectangular
//! span of cells; the span record (not duplicated cell pointers) is the
//! canonical ownership statement, and the upper-left cell is the anchor.
//!
//! The table also stores the products of the allocation pass: per-column
//! widths, per-row heights, and the cumulative `xs`/`ys` offset arrays that
//! the event router bisects for O(log n) hit testing.

use alloc::vec;
use alloc::vec::Vec;

use crate::error::TreeError;

use super::id::INVALID;

/// One widget's rectangular cell span.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridSpan {
    /// Slot index of the owning widget.
    pub owner: u32,
    /// Anchor row (upper-left cell).
    pub row: u32,
    /// Anchor column (upper-left cell).
    pub col: u32,
    /// Number of rows covered (at least 1).
    pub row_span: u32,
    /// Number of columns covered (at least 1).
    pub col_span: u32,
}

/// The cell table of one `Grid` container.
#[derive(Clone, Debug, Default)]
pub struct GridTable {
    cols: u32,
    rows: u32,
    /// Row-major owner indices; `INVALID` marks a free cell.
    cells: Vec<u32>,
    /// One record per child widget, in attach order.
    spans: Vec<GridSpan>,

    // -- Allocation-pass products --
    /// Width of each column.
    pub(crate) col_widths: Vec<i32>,
    /// Height of each row.
    pub(crate) row_heights: Vec<i32>,
    /// Cumulative x offset of each column edge, content-box relative;
    /// `xs.len() == cols + 1`.
    pub(crate) xs: Vec<i32>,
    /// Cumulative y offset of each row edge; `ys.len() == rows + 1`.
    pub(crate) ys: Vec<i32>,
}

impl GridTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current column count.
    #[inline]
    #[must_use]
    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// Returns the current row count.
    #[inline]
    #[must_use]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Returns the span records in attach order.
    #[inline]
    #[must_use]
    pub fn spans(&self) -> &[GridSpan] {
        &self.spans
    }

    /// Returns the owner slot of the given cell, if occupied.
    #[must_use]
    pub fn cell(&self, row: u32, col: u32) -> Option<u32> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        let owner = self.cells[(row * self.cols + col) as usize];
        (owner != INVALID).then_some(owner)
    }

    /// Returns the span record of the given owner, if attached.
    #[must_use]
    pub fn span_of(&self, owner: u32) -> Option<GridSpan> {
        self.spans.iter().copied().find(|s| s.owner == owner)
    }

    /// Attaches `owner` to the span anchored at (`row`, `col`).
    ///
    /// The table grows to fit the span. Fails if the span is empty or any
    /// covered cell is already owned.
    pub fn attach(
        &mut self,
        owner: u32,
        row: u32,
        col: u32,
        row_span: u32,
        col_span: u32,
    ) -> Result<(), TreeError> {
        if row_span == 0 || col_span == 0 {
            return Err(TreeError::EmptySpan);
        }
        self.grow_to(row + row_span, col + col_span);

        for r in row..row + row_span {
            for c in col..col + col_span {
                if self.cells[(r * self.cols + c) as usize] != INVALID {
                    return Err(TreeError::SpanOverlap);
                }
            }
        }
        for r in row..row + row_span {
            for c in col..col + col_span {
                self.cells[(r * self.cols + c) as usize] = owner;
            }
        }
        self.spans.push(GridSpan {
            owner,
            row,
            col,
            row_span,
            col_span,
        });
        Ok(())
    }

    /// Detaches `owner`, freeing its cells. No-op if not attached.
    pub fn detach(&mut self, owner: u32) {
        let Some(pos) = self.spans.iter().position(|s| s.owner == owner) else {
            return;
        };
        let span = self.spans.remove(pos);
        for r in span.row..span.row + span.row_span {
            for c in span.col..span.col + span.col_span {
                self.cells[(r * self.cols + c) as usize] = INVALID;
            }
        }
    }

    /// Finds the column containing content-relative `x` by bisecting the
    /// cumulative offsets. Returns `None` when `x` falls on a border gap or
    /// outside the table.
    #[must_use]
    pub fn col_at(&self, x: i32) -> Option<u32> {
        Self::line_at(&self.xs, &self.col_widths, x)
    }

    /// Finds the row containing content-relative `y`. See [`Self::col_at`].
    #[must_use]
    pub fn row_at(&self, y: i32) -> Option<u32> {
        Self::line_at(&self.ys, &self.row_heights, y)
    }

    /// Bisection over cumulative edge offsets: the candidate line is the last
    /// one whose start offset is `<= v`; the extent check rejects border gaps.
    fn line_at(edges: &[i32], extents: &[i32], v: i32) -> Option<u32> {
        if extents.is_empty() || v < edges[0] {
            return None;
        }
        // partition_point gives the first edge > v; the line before it starts
        // at or before v.
        let i = edges[..extents.len()].partition_point(|&e| e <= v);
        if i == 0 {
            return None;
        }
        let line = i - 1;
        #[expect(
            clippy::cast_possible_truncation,
            reason = "table dimensions fit u32 by construction"
        )]
        (v < edges[line] + extents[line]).then_some(line as u32)
    }

    /// Grows the table to at least `rows` x `cols`, preserving ownership.
    fn grow_to(&mut self, rows: u32, cols: u32) {
        if rows <= self.rows && cols <= self.cols {
            return;
        }
        let new_rows = rows.max(self.rows);
        let new_cols = cols.max(self.cols);
        let mut cells = vec![INVALID; (new_rows * new_cols) as usize];
        for r in 0..self.rows {
            for c in 0..self.cols {
                cells[(r * new_cols + c) as usize] = self.cells[(r * self.cols + c) as usize];
            }
        }
        self.cells = cells;
        self.rows = new_rows;
        self.cols = new_cols;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attach_grows_and_occupies() {
        let mut table = GridTable::new();
        table.attach(7, 0, 0, 1, 1).unwrap();
        table.attach(8, 1, 2, 1, 1).unwrap();

        assert_eq!(table.rows(), 2);
        assert_eq!(table.cols(), 3);
        assert_eq!(table.cell(0, 0), Some(7));
        assert_eq!(table.cell(1, 2), Some(8));
        assert_eq!(table.cell(0, 1), None);
    }

    #[test]
    fn span_overlap_is_rejected() {
        let mut table = GridTable::new();
        table.attach(1, 0, 0, 2, 2).unwrap();
        assert_eq!(table.attach(2, 1, 1, 1, 1), Err(TreeError::SpanOverlap));
        // The failed attach must not claim any cells.
        assert_eq!(table.span_of(2), None);
    }

    #[test]
    fn empty_span_is_rejected() {
        let mut table = GridTable::new();
        assert_eq!(table.attach(1, 0, 0, 0, 1), Err(TreeError::EmptySpan));
    }

    #[test]
    fn detach_frees_all_cells_of_span() {
        let mut table = GridTable::new();
        table.attach(1, 0, 0, 2, 3).unwrap();
        table.detach(1);

        for r in 0..2 {
            for c in 0..3 {
                assert_eq!(table.cell(r, c), None);
            }
        }
        assert!(table.spans().is_empty());
    }

    #[test]
    fn grow_preserves_existing_ownership() {
        let mut table = GridTable::new();
        table.attach(1, 0, 0, 1, 1).unwrap();
        table.attach(2, 4, 4, 1, 1).unwrap();
        assert_eq!(table.cell(0, 0), Some(1));
        assert_eq!(table.cell(4, 4), Some(2));
    }

    #[test]
    fn line_bisection_matches_extents() {
        let mut table = GridTable::new();
        table.attach(1, 0, 0, 1, 3).unwrap();
        // Columns at offsets 0, 12, 24 with width 10 (2px gaps).
        table.col_widths = vec![10, 10, 10];
        table.xs = vec![0, 12, 24, 36];

        assert_eq!(table.col_at(0), Some(0));
        assert_eq!(table.col_at(9), Some(0));
        assert_eq!(table.col_at(10), None); // border gap
        assert_eq!(table.col_at(12), Some(1));
        assert_eq!(table.col_at(35), None); // trailing gap
        assert_eq!(table.col_at(-1), None);
        assert_eq!(table.col_at(100), None);
    }
}
