// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the frame loop.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! allocation engine, draw pass, and event router call at each stage. All
//! method bodies default to no-ops, so implementing only the events you care
//! about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace`
//! feature is **off**, every `Tracer` method compiles to nothing (zero
//! overhead). When **on**, each method performs a single `Option` branch
//! before dispatching.
//!
//! # Crate features
//!
//! - `trace` — enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`) — gates the per-rectangle damage events.

use crate::backend::Button;
use crate::geometry::Rect;
use crate::surface::SurfaceId;

/// Emitted after an allocation pass over one scope.
#[derive(Clone, Copy, Debug)]
pub struct LayoutPassEvent {
    /// Raw slot index of the window root.
    pub window: u32,
    /// Raw slot index of the reallocated scope.
    pub scope: u32,
}

/// Emitted after one draw pass over a window's read queue.
#[derive(Clone, Copy, Debug)]
pub struct DrawPassEvent {
    /// Raw slot index of the window root.
    pub window: u32,
    /// Surfaces painted this cycle.
    pub painted: u32,
    /// Surfaces that requested another frame.
    pub requeued: u32,
}

/// Emitted when a draw pass found no free back buffer and deferred.
#[derive(Clone, Copy, Debug)]
pub struct DeferredEvent {
    /// Raw slot index of the window root.
    pub window: u32,
}

/// Emitted when the pointer focus moves.
#[derive(Clone, Copy, Debug)]
pub struct FocusChangeEvent {
    /// The widget losing focus, if any.
    pub from: Option<SurfaceId>,
    /// The widget gaining focus, if any.
    pub to: Option<SurfaceId>,
}

/// Emitted when a button grab is acquired or fully released.
#[derive(Clone, Copy, Debug)]
pub struct GrabEvent {
    /// The grab owner.
    pub owner: SurfaceId,
    /// The button that changed the grab set.
    pub button: Button,
    /// `true` on acquisition, `false` when the last button bit cleared.
    pub acquired: bool,
}

/// Emitted when a zoom push is rejected as degenerate.
#[derive(Clone, Copy, Debug)]
pub struct ZoomRejectedEvent;

/// Receives frame-loop diagnostics. All methods default to no-ops.
pub trait TraceSink {
    /// An allocation pass finished.
    fn layout_pass(&mut self, event: &LayoutPassEvent) {
        let _ = event;
    }

    /// A draw pass finished.
    fn draw_pass(&mut self, event: &DrawPassEvent) {
        let _ = event;
    }

    /// A draw pass deferred for want of a free buffer.
    fn deferred(&mut self, event: &DeferredEvent) {
        let _ = event;
    }

    /// The pointer focus changed.
    fn focus_change(&mut self, event: &FocusChangeEvent) {
        let _ = event;
    }

    /// A button grab was acquired or released.
    fn grab(&mut self, event: &GrabEvent) {
        let _ = event;
    }

    /// A zoom push was rejected.
    fn zoom_rejected(&mut self, event: &ZoomRejectedEvent) {
        let _ = event;
    }

    /// The damage rectangles of one presented frame.
    #[cfg(feature = "trace-rich")]
    fn damage_rects(&mut self, window: u32, rects: &[Rect]) {
        let _ = (window, rects);
    }
}

/// A sink that drops every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

/// Zero-overhead wrapper over an optional sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _phantom: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Wraps a sink.
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            let _ = sink;
            Self {
                _phantom: core::marker::PhantomData,
            }
        }
    }

    /// A tracer that records nothing.
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _phantom: core::marker::PhantomData,
            }
        }
    }

    /// Emits [`LayoutPassEvent`].
    #[inline]
    pub fn layout_pass(&mut self, event: &LayoutPassEvent) {
        #[cfg(feature = "trace")]
        if let Some(sink) = self.sink.as_deref_mut() {
            sink.layout_pass(event);
        }
        #[cfg(not(feature = "trace"))]
        let _ = event;
    }

    /// Emits [`DrawPassEvent`].
    #[inline]
    pub fn draw_pass(&mut self, event: &DrawPassEvent) {
        #[cfg(feature = "trace")]
        if let Some(sink) = self.sink.as_deref_mut() {
            sink.draw_pass(event);
        }
        #[cfg(not(feature = "trace"))]
        let _ = event;
    }

    /// Emits [`DeferredEvent`].
    #[inline]
    pub fn deferred(&mut self, event: &DeferredEvent) {
        #[cfg(feature = "trace")]
        if let Some(sink) = self.sink.as_deref_mut() {
            sink.deferred(event);
        }
        #[cfg(not(feature = "trace"))]
        let _ = event;
    }

    /// Emits [`FocusChangeEvent`].
    #[inline]
    pub fn focus_change(&mut self, event: &FocusChangeEvent) {
        #[cfg(feature = "trace")]
        if let Some(sink) = self.sink.as_deref_mut() {
            sink.focus_change(event);
        }
        #[cfg(not(feature = "trace"))]
        let _ = event;
    }

    /// Emits [`GrabEvent`].
    #[inline]
    pub fn grab(&mut self, event: &GrabEvent) {
        #[cfg(feature = "trace")]
        if let Some(sink) = self.sink.as_deref_mut() {
            sink.grab(event);
        }
        #[cfg(not(feature = "trace"))]
        let _ = event;
    }

    /// Emits [`ZoomRejectedEvent`].
    #[inline]
    pub fn zoom_rejected(&mut self, event: &ZoomRejectedEvent) {
        #[cfg(feature = "trace")]
        if let Some(sink) = self.sink.as_deref_mut() {
            sink.zoom_rejected(event);
        }
        #[cfg(not(feature = "trace"))]
        let _ = event;
    }

    /// Emits per-frame damage rectangles.
    #[inline]
    pub fn damage_rects(&mut self, window: u32, rects: &[Rect]) {
        #[cfg(feature = "trace-rich")]
        if let Some(sink) = self.sink.as_deref_mut() {
            sink.damage_rects(window, rects);
        }
        #[cfg(not(feature = "trace-rich"))]
        let _ = (window, rects);
    }
}

#[cfg(all(test, feature = "trace"))]
mod tests {
    use alloc::vec::Vec;

    use super::*;

    #[derive(Default)]
    struct Counting {
        layout: Vec<u32>,
        focus: u32,
    }

    impl TraceSink for Counting {
        fn layout_pass(&mut self, event: &LayoutPassEvent) {
            self.layout.push(event.scope);
        }

        fn focus_change(&mut self, _event: &FocusChangeEvent) {
            self.focus += 1;
        }
    }

    #[test]
    fn tracer_forwards_to_the_sink() {
        let mut sink = Counting::default();
        let mut tracer = Tracer::new(&mut sink);
        tracer.layout_pass(&LayoutPassEvent { window: 0, scope: 3 });
        tracer.focus_change(&FocusChangeEvent {
            from: None,
            to: None,
        });
        drop(tracer);

        assert_eq!(sink.layout, alloc::vec![3]);
        assert_eq!(sink.focus, 1);
    }

    #[test]
    fn none_tracer_is_silent() {
        let mut tracer = Tracer::none();
        tracer.layout_pass(&LayoutPassEvent { window: 0, scope: 0 });
    }
}
