// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON snapshots of the surface tree for post-mortem inspection.
//!
//! [`snapshot`] serializes one subtree — topology, layouts, geometry, and
//! flags — into a `serde_json::Value`, suitable for dumping next to a bug
//! report or diffing between two frames.

use casement_core::surface::{Layout, SurfaceId, SurfaceStore};
use serde_json::{Value, json};

/// Serializes the subtree rooted at `root`.
#[must_use]
pub fn snapshot(store: &SurfaceStore, root: SurfaceId) -> Value {
    node(store, root.index())
}

/// Writes the snapshot as pretty-printed JSON.
pub fn write_snapshot(
    out: &mut impl std::io::Write,
    store: &SurfaceStore,
    root: SurfaceId,
) -> std::io::Result<()> {
    let value = snapshot(store, root);
    serde_json::to_writer_pretty(&mut *out, &value)?;
    writeln!(out)
}

fn node(store: &SurfaceStore, idx: u32) -> Value {
    let id = store.id_at(idx);
    let alloc = store.allocation(id);
    let req = store.aggregated(id);

    let children: Vec<Value> = if store.layout(id) == Layout::Grid {
        store
            .grid(id)
            .map(|table| {
                table
                    .spans()
                    .iter()
                    .map(|span| {
                        let mut cell = node(store, span.owner);
                        cell["cell"] = json!({
                            "row": span.row,
                            "col": span.col,
                            "row_span": span.row_span,
                            "col_span": span.col_span,
                        });
                        cell
                    })
                    .collect()
            })
            .unwrap_or_default()
    } else {
        store
            .children_slots(idx)
            .into_iter()
            .map(|child| node(store, child))
            .collect()
    };

    json!({
        "surface": idx,
        "layout": format!("{:?}", store.layout(id)),
        "allocation": { "x": alloc.x, "y": alloc.y, "width": alloc.width, "height": alloc.height },
        "requested": { "width": req.width, "height": req.height },
        "hidden": store.hidden(id),
        "culled": store.culled(id),
        "border": store.border(id),
        "children": children,
    })
}
