// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable tree and trace output.
//!
//! [`print_tree`] writes one line per surface, indented by depth, with
//! layout, allocation, and flags — the quickest way to see why a widget
//! landed where it did (or got culled).
//!
//! [`PrettyPrintSink`] implements
//! [`TraceSink`](casement_core::trace::TraceSink) and writes one line per
//! frame-loop event to a [`Write`](std::io::Write) destination (default:
//! stderr).

use std::io::Write;

use casement_core::surface::{Layout, SurfaceId, SurfaceStore};
use casement_core::trace::{
    DeferredEvent, DrawPassEvent, FocusChangeEvent, GrabEvent, LayoutPassEvent, TraceSink,
    ZoomRejectedEvent,
};

/// Writes an indented dump of the subtree rooted at `root`.
pub fn print_tree(
    out: &mut impl Write,
    store: &SurfaceStore,
    root: SurfaceId,
) -> std::io::Result<()> {
    print_node(out, store, root.index(), 0)
}

fn print_node(
    out: &mut impl Write,
    store: &SurfaceStore,
    idx: u32,
    depth: usize,
) -> std::io::Result<()> {
    let id = store.id_at(idx);
    let alloc = store.allocation(id);
    let mut flags = String::new();
    if store.hidden(id) {
        flags.push_str(" hidden");
    }
    if store.culled(id) {
        flags.push_str(" culled");
    }
    writeln!(
        out,
        "{:indent$}#{} {:?} {:?} req={:?}{}",
        "",
        idx,
        store.layout(id),
        alloc,
        store.aggregated(id),
        flags,
        indent = depth * 2,
    )?;

    if store.layout(id) == Layout::Grid {
        if let Some(table) = store.grid(id) {
            for span in table.spans() {
                writeln!(
                    out,
                    "{:indent$}[cell {},{} span {}x{}]",
                    "",
                    span.row,
                    span.col,
                    span.row_span,
                    span.col_span,
                    indent = (depth + 1) * 2,
                )?;
                print_node(out, store, span.owner, depth + 2)?;
            }
        }
    } else {
        for child in store.children_slots(idx) {
            print_node(out, store, child, depth + 1)?;
        }
    }
    Ok(())
}

/// Writes human-readable trace lines to a [`Write`](std::io::Write)
/// destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn layout_pass(&mut self, event: &LayoutPassEvent) {
        let _ = writeln!(
            self.writer,
            "layout  win #{} scope #{}",
            event.window, event.scope
        );
    }

    fn draw_pass(&mut self, event: &DrawPassEvent) {
        let _ = writeln!(
            self.writer,
            "draw    win #{} painted {} requeued {}",
            event.window, event.painted, event.requeued
        );
    }

    fn deferred(&mut self, event: &DeferredEvent) {
        let _ = writeln!(self.writer, "defer   win #{} (buffers busy)", event.window);
    }

    fn focus_change(&mut self, event: &FocusChangeEvent) {
        let _ = writeln!(
            self.writer,
            "focus   {:?} -> {:?}",
            event.from, event.to
        );
    }

    fn grab(&mut self, event: &GrabEvent) {
        let _ = writeln!(
            self.writer,
            "grab    {:?} {:?} {}",
            event.owner,
            event.button,
            if event.acquired { "acquired" } else { "released" }
        );
    }

    fn zoom_rejected(&mut self, _event: &ZoomRejectedEvent) {
        let _ = writeln!(self.writer, "zoom    rejected (degenerate span)");
    }

    fn damage_rects(&mut self, window: u32, rects: &[casement_core::geometry::Rect]) {
        let _ = writeln!(self.writer, "damage  win #{window} {rects:?}");
    }
}
