// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-surface behavior: typed callback slots and the request channel.
//!
//! Every event kind has its own closure signature and its own typed response
//! enum — there is no type-erased payload anywhere in the dispatch path.
//! Callbacks never receive the store; instead each argument struct carries a
//! `&mut` [`Requests`] sink that *records* follow-up work (queue a redraw,
//! change the cursor, fire an action), and the router or dispatcher applies
//! the recorded requests after the callback returns. This keeps dispatch
//! non-reentrant by construction: a surface can be destroyed, re-queued, or
//! re-focused only between callbacks, never under one.

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::backend::{Button, Cursor, PixelRegion};
use crate::geometry::{Point, Rect};

use super::id::SurfaceId;

/// What a paint callback wants next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaintOutcome {
    /// Drawn; nothing further.
    Done,
    /// Continuous animation: re-queue this surface for the next frame.
    Again,
}

/// Whether an enter callback accepts pointer focus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnterResponse {
    /// This surface becomes the pointer focus.
    TakeFocus,
    /// Keep walking up the ancestor chain.
    Pass,
}

/// How a press callback wants subsequent events routed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PressResponse {
    /// Route motion and release for this button exclusively to this surface
    /// until the button is released, even outside its bounds.
    Grab,
    /// Consumed, no grab.
    Handled,
    /// Not interested.
    Pass,
}

/// Arguments for a `configure` callback (geometry changed, paint follows).
#[derive(Debug)]
pub struct ConfigureArgs<'a> {
    /// The surface being configured.
    pub surface: SurfaceId,
    /// The new allocation, window-relative.
    pub allocation: Rect,
    /// Request sink.
    pub requests: &'a mut Requests,
}

/// Arguments for a `paint` callback.
pub struct PaintArgs<'a> {
    /// The surface being painted.
    pub surface: SurfaceId,
    /// The surface's allocation, window-relative.
    pub allocation: Rect,
    /// The pixel sub-rectangle scoped to this surface.
    pub region: PixelRegion<'a>,
    /// Request sink.
    pub requests: &'a mut Requests,
}

impl core::fmt::Debug for PaintArgs<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PaintArgs")
            .field("surface", &self.surface)
            .field("allocation", &self.allocation)
            .finish_non_exhaustive()
    }
}

/// Arguments for enter/leave/motion callbacks.
#[derive(Debug)]
pub struct PointerArgs<'a> {
    /// The surface receiving the event.
    pub surface: SurfaceId,
    /// Pointer position in the surface's local frame. May lie outside the
    /// surface's bounds during a grab.
    pub position: Point,
    /// Protocol serial of the triggering event, for focus-sensitive requests.
    pub serial: u32,
    /// Request sink.
    pub requests: &'a mut Requests,
}

/// Arguments for press/release callbacks.
#[derive(Debug)]
pub struct ButtonArgs<'a> {
    /// The surface receiving the event.
    pub surface: SurfaceId,
    /// Pointer position in the surface's local frame.
    pub position: Point,
    /// Which button.
    pub button: Button,
    /// Protocol serial of the triggering event.
    pub serial: u32,
    /// Request sink.
    pub requests: &'a mut Requests,
}

/// Arguments for an axis (scroll) callback.
#[derive(Debug)]
pub struct AxisArgs<'a> {
    /// The surface receiving the event.
    pub surface: SurfaceId,
    /// Horizontal scroll delta.
    pub horizontal: f64,
    /// Vertical scroll delta.
    pub vertical: f64,
    /// Request sink.
    pub requests: &'a mut Requests,
}

/// Arguments for an action-chain callback.
#[derive(Debug)]
pub struct ActionArgs<'a> {
    /// The surface the action fired on.
    pub surface: SurfaceId,
    /// The action index.
    pub action: u32,
    /// Request sink.
    pub requests: &'a mut Requests,
}

/// Configure callback.
pub type ConfigureFn = Box<dyn FnMut(&mut ConfigureArgs<'_>)>;
/// Paint callback.
pub type PaintFn = Box<dyn FnMut(&mut PaintArgs<'_>) -> PaintOutcome>;
/// Enter callback.
pub type EnterFn = Box<dyn FnMut(&mut PointerArgs<'_>) -> EnterResponse>;
/// Leave callback.
pub type LeaveFn = Box<dyn FnMut(&mut PointerArgs<'_>)>;
/// Motion callback.
pub type MotionFn = Box<dyn FnMut(&mut PointerArgs<'_>)>;
/// Press callback.
pub type PressFn = Box<dyn FnMut(&mut ButtonArgs<'_>) -> PressResponse>;
/// Release callback.
pub type ReleaseFn = Box<dyn FnMut(&mut ButtonArgs<'_>)>;
/// Axis callback.
pub type AxisFn = Box<dyn FnMut(&mut AxisArgs<'_>)>;
/// Destroy callback, run LIFO before the slot is freed.
pub type DestroyFn = Box<dyn FnOnce(SurfaceId)>;
/// One link of an action chain.
pub type ActionFn = Box<dyn FnMut(&mut ActionArgs<'_>)>;

/// The callback slots of one surface.
#[derive(Default)]
pub struct Handlers {
    /// Geometry-changed notification, invoked before paint.
    pub configure: Option<ConfigureFn>,
    /// Paint callback. Exactly one paint mechanism per surface; vector
    /// drawing layers over the same entry point (see `casement_render`).
    pub paint: Option<PaintFn>,
    /// Pointer entered (focus offer).
    pub enter: Option<EnterFn>,
    /// Pointer left.
    pub leave: Option<LeaveFn>,
    /// Pointer moved.
    pub motion: Option<MotionFn>,
    /// Button pressed.
    pub press: Option<PressFn>,
    /// Button released.
    pub release: Option<ReleaseFn>,
    /// Scroll.
    pub axis: Option<AxisFn>,
    /// Destroy stack, run LIFO at destroy.
    pub destroy: Vec<DestroyFn>,
    /// Action chains, dense-indexed in registration order.
    pub actions: Vec<Vec<ActionFn>>,
}

impl Handlers {
    /// Returns whether no slot is populated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.configure.is_none()
            && self.paint.is_none()
            && self.enter.is_none()
            && self.leave.is_none()
            && self.motion.is_none()
            && self.press.is_none()
            && self.release.is_none()
            && self.axis.is_none()
            && self.destroy.is_empty()
            && self.actions.is_empty()
    }
}

impl core::fmt::Debug for Handlers {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Handlers")
            .field("configure", &self.configure.is_some())
            .field("paint", &self.paint.is_some())
            .field("enter", &self.enter.is_some())
            .field("leave", &self.leave.is_some())
            .field("motion", &self.motion.is_some())
            .field("press", &self.press.is_some())
            .field("release", &self.release.is_some())
            .field("axis", &self.axis.is_some())
            .field("destroy", &self.destroy.len())
            .field("actions", &self.actions.len())
            .finish()
    }
}

/// Follow-up work recorded by callbacks and applied after dispatch.
#[derive(Default, Debug)]
pub struct Requests {
    pub(crate) draws: Vec<(SurfaceId, bool)>,
    pub(crate) cursor: Option<(Cursor, u32)>,
    pub(crate) release_grabs: bool,
    pub(crate) actions: Vec<(SurfaceId, u32)>,
}

impl Requests {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a redraw of `surface`; `needs_reallocate` additionally
    /// requests a layout pass over its parent's subtree.
    pub fn queue_draw(&mut self, surface: SurfaceId, needs_reallocate: bool) {
        self.draws.push((surface, needs_reallocate));
    }

    /// Requests a cursor image change, attributed to the given enter serial.
    pub fn set_cursor(&mut self, cursor: Cursor, serial: u32) {
        self.cursor = Some((cursor, serial));
    }

    /// Requests that all of this surface's button grabs be dropped.
    pub fn release_grabs(&mut self) {
        self.release_grabs = true;
    }

    /// Requests that `surface`'s action chain `action` fire after dispatch.
    pub fn fire_action(&mut self, surface: SurfaceId, action: u32) {
        self.actions.push((surface, action));
    }

    /// Takes the recorded redraw requests. Frame passes apply these to the
    /// window's write queue themselves; everything else goes back through
    /// [`Display::settle_requests`](crate::display::Display::settle_requests).
    pub fn take_draws(&mut self) -> Vec<(SurfaceId, bool)> {
        core::mem::take(&mut self.draws)
    }

    /// Returns whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
            && self.cursor.is_none()
            && !self.release_grabs
            && self.actions.is_empty()
    }

    /// Takes the pending cursor request, if any.
    pub fn take_cursor(&mut self) -> Option<(Cursor, u32)> {
        self.cursor.take()
    }
}
