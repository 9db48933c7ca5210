// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Surface tree data model.
//!
//! A *surface* is a node in the window/widget tree. Each surface has:
//!
//! - An identity ([`SurfaceId`]) — a generational handle that becomes stale
//!   when the surface is destroyed, preventing use-after-free bugs at the
//!   API level.
//! - A role — a surface with no parent is a *window root*; every other
//!   surface is a widget owned by exactly one window (the cached `window`
//!   back-reference, set at link time and stable until destroy).
//! - Topology — parent and sibling links forming an ordered tree, or a
//!   [`GridTable`] of cell spans when the layout is [`Layout::Grid`].
//!   Exactly one representation is meaningful per surface.
//! - **Local properties** set by the caller: the size
//!   [request](SurfaceStore::set_requested_size),
//!   [expand flags](SurfaceStore::set_expand),
//!   [border](SurfaceStore::set_border), and the
//!   [hidden flag](SurfaceStore::set_hidden).
//! - **Computed properties** produced by the allocation pass
//!   ([`layout::allocate`](crate::layout::allocate)): the pixel `allocation`
//!   and the `culled` flag.
//! - Behavior — the typed callback slots of [`Handlers`], a LIFO destroy
//!   stack, and dense-indexed action chains.
//!
//! Surfaces are stored in struct-of-arrays layout with index-based handles
//! for cache-friendly traversal.
//!
//! # Dirty tracking
//!
//! Property mutations automatically mark the corresponding dirty channel
//! (see [`dirty`](crate::dirty)); the frame pass drains the channels through
//! [`SurfaceStore::collect_invalidations`] before painting.

mod grid;
mod handlers;
mod id;
mod invalidate;
mod store;
mod traverse;

pub use grid::{GridSpan, GridTable};
pub use handlers::{
    ActionArgs, ActionFn, AxisArgs, AxisFn, ButtonArgs, ConfigureArgs, ConfigureFn, DestroyFn,
    EnterFn, EnterResponse, Handlers, LeaveFn, MotionFn, PaintArgs, PaintFn, PaintOutcome,
    PointerArgs, PressFn, PressResponse, ReleaseFn, Requests,
};
pub use id::{BufferId, INVALID, SurfaceId};
pub use invalidate::InvalidationReport;
pub use store::{DEFAULT_WIDGET_SIZE, ExpandFlags, Layout, SurfaceStore};
pub use traverse::Children;

pub(crate) use store::DqSlot;
