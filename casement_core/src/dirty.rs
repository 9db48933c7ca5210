// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! Casement uses multi-channel dirty tracking (via [`understory_dirty`]) to
//! carry geometry invalidation through the surface tree between frames. Each
//! channel represents an independent category of change; all three are
//! marked locally on the mutated surface and resolved to their effective
//! scope when drained.
//!
//! # Channel semantics
//!
//! - [`LAYOUT`] — the surface's size request, border, expand flags, or
//!   hidden state changed. The effective reallocation scope is the
//!   surface's *parent* subtree, redistributed within the parent's current
//!   box (a request change never renegotiates the parent's own allocation
//!   mid-frame; that happens on the next full pass from the window root).
//!
//! - [`VISIBILITY`] — the `hidden` flag toggled. Reported so the frame pass
//!   repaints the affected window region even when no other geometry moved.
//!
//! - [`TOPOLOGY`] — structural change (create/destroy, link/unlink, grid
//!   attach/detach). Structural changes imply a layout pass for the
//!   affected scope.
//!
//! # Consumption
//!
//! Callers never query dirty state directly. The frame pass calls
//! [`SurfaceStore::collect_invalidations`], which drains all channels,
//! resolves marks to deduplicated reallocation scopes (an inner scope
//! covered by an outer one is dropped), and lists the visibility flips.
//!
//! [`SurfaceStore::collect_invalidations`]: crate::surface::SurfaceStore::collect_invalidations

use understory_dirty::Channel;

/// Requested size, border, expand flags, layout-affecting state changed —
/// the parent's subtree needs redistribution.
pub const LAYOUT: Channel = Channel::new(0);

/// The `hidden` flag toggled — the surface's window region needs repainting.
pub const VISIBILITY: Channel = Channel::new(1);

/// Tree topology changed (create/destroy/link/unlink).
pub const TOPOLOGY: Channel = Channel::new(2);
