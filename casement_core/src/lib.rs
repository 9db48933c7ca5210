// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core surface tree and engines for damage-driven widget compositing.
//!
//! `casement_core` provides the data model and the three engines of a
//! lightweight windowing toolkit built atop a compositor protocol: the
//! layout/allocation engine, the draw-queue/damage engine, and the event
//! router. It is `no_std` compatible (with `alloc`) and uses array-based
//! struct-of-arrays storage with index handles for cache-friendly traversal.
//!
//! # Architecture
//!
//! The crate is organized around a frame loop that turns compositor events
//! into incremental repaints:
//!
//! ```text
//!   Backend (pointer / configure / buffer release)
//!       │
//!       ▼
//!   Display::pointer_event ──► PointerRouter ──► widget callbacks
//!       │                                            │ requests
//!       ▼                                            ▼
//!   DrawQueues (write) ◄──────────────── Display::apply (queue_draw)
//!       │ swap on redraw opportunity
//!       ▼
//!   layout::allocate ──► dispatch (casement_render) ──► damage + present
//! ```
//!
//! **[`surface`]** — Struct-of-arrays surface tree with generational
//! handles. Local properties (size request, expand, border, hidden) are set
//! by the caller; allocations and cull flags are computed by the allocation
//! engine.
//!
//! **[`layout`]** — The two-pass allocation engine: post-order size
//! aggregation, pre-order distribution with expand fairness and scan-break
//! culling, per-line arrays for grids.
//!
//! **[`drawqueue`]** — Per-window write/read queue pairs with ancestor
//! deduplication and single-pass-per-cycle termination.
//!
//! **[`event`]** — Hit testing (early-exit scans, grid bisection) and the
//! pointer focus/grab state machine.
//!
//! **[`display`]** — The explicit context object: windows, outputs, router
//! state, request settlement, teardown.
//!
//! **[`zoom`]** — Bounded push/pop view-transform history for plot widgets.
//!
//! **[`swapchain`]** — Two-buffer busy bookkeeping with deferral.
//!
//! **[`backend`]** — The contracts platform backends implement
//! ([`PresentTarget`](backend::PresentTarget), pointer/configure events).
//!
//! **[`dirty`]** — Multi-channel geometry invalidation via
//! `understory_dirty`, drained per frame.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) trait and event types for
//! frame-loop instrumentation, with zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one
//!   branch per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-frame
//!   damage-rectangle events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod backend;
pub mod dirty;
pub mod display;
pub mod drawqueue;
pub mod error;
pub mod event;
pub mod geometry;
pub mod layout;
pub mod output;
pub mod surface;
pub mod swapchain;
pub mod trace;
pub mod zoom;
