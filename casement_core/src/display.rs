// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The display context: windows, outputs, and pointer routing.
//!
//! `Display` replaces the classic process-wide singleton with an explicit
//! context object: the surface store, the list of live windows (each with
//! its draw-queue pair and configured size), the output descriptors, and the
//! pointer router for the seat. Constructors and dispatch entry points all
//! take `&mut Display`; lifecycle is a documented contract, not a hidden
//! static.
//!
//! The display is also where callback *requests* are settled: after every
//! router dispatch or action chain, recorded requests (queue a draw, fire an
//! action, release grabs, set a cursor) are drained and applied, repeating
//! until no callback produces new ones. Destroying a surface synchronously
//! unwinds its draw-queue membership and any focus or grab references, so a
//! destroyed surface is never reachable from either.

use alloc::vec::Vec;

use crate::backend::{ConfigureEvent, Cursor, PointerEvent};
use crate::drawqueue::DrawQueues;
use crate::error::TreeError;
use crate::event::PointerRouter;
use crate::geometry::Size;
use crate::layout;
use crate::output::OutputInfo;
use crate::surface::{ActionArgs, Layout, Requests, SurfaceId, SurfaceStore};
use crate::trace::Tracer;

/// One toplevel window: a root surface plus its redraw machinery.
#[derive(Debug)]
pub struct Window {
    root: SurfaceId,
    /// The window's write/read draw-queue pair.
    pub queues: DrawQueues,
    size: Size,
    frame_requested: bool,
}

impl Window {
    fn new(root: SurfaceId) -> Self {
        Self {
            root,
            queues: DrawQueues::new(),
            size: Size::ZERO,
            frame_requested: false,
        }
    }

    /// The window's root surface.
    #[must_use]
    pub fn root(&self) -> SurfaceId {
        self.root
    }

    /// The last configured size (zero until the first configure).
    #[must_use]
    pub fn size(&self) -> Size {
        self.size
    }

    /// Whether a frame callback is registered with the backend.
    #[must_use]
    pub fn frame_requested(&self) -> bool {
        self.frame_requested
    }

    /// Records that the backend registered (or retired) a frame callback.
    pub fn set_frame_requested(&mut self, requested: bool) {
        self.frame_requested = requested;
    }

    /// Empties the write queue without drawing and retires any pending
    /// frame-callback registration (a full redraw supersedes it).
    pub fn flush_draws(&mut self, store: &mut SurfaceStore) {
        self.queues.flush(store);
        self.frame_requested = false;
    }
}

/// The toolkit context for one compositor connection and seat.
#[derive(Debug)]
pub struct Display {
    /// The shared surface tree.
    pub store: SurfaceStore,
    windows: Vec<Window>,
    outputs: Vec<OutputInfo>,
    router: PointerRouter,
    requests: Requests,
    pending_cursor: Option<(Cursor, u32)>,
}

impl Default for Display {
    fn default() -> Self {
        Self::new()
    }
}

impl Display {
    /// Creates an empty display context.
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: SurfaceStore::new(),
            windows: Vec::new(),
            outputs: Vec::new(),
            router: PointerRouter::new(),
            requests: Requests::new(),
            pending_cursor: None,
        }
    }

    // -- Windows --

    /// Creates a toplevel window whose root arranges children with `layout`.
    pub fn create_window(&mut self, layout: Layout) -> SurfaceId {
        let root = self.store.create_window(layout);
        self.windows.push(Window::new(root));
        root
    }

    /// Returns the roots of all live windows.
    #[must_use]
    pub fn window_ids(&self) -> Vec<SurfaceId> {
        self.windows.iter().map(|w| w.root).collect()
    }

    /// Returns the window owning `root`.
    #[must_use]
    pub fn window(&self, root: SurfaceId) -> Option<&Window> {
        self.windows.iter().find(|w| w.root == root)
    }

    /// Returns the window owning `root`, mutably.
    pub fn window_mut(&mut self, root: SurfaceId) -> Option<&mut Window> {
        self.windows.iter_mut().find(|w| w.root == root)
    }

    /// Splits the context into the store and the window list, for frame
    /// passes that need both.
    pub fn split_mut(&mut self) -> (&mut SurfaceStore, &mut [Window]) {
        (&mut self.store, &mut self.windows)
    }

    // -- Outputs --

    /// Records or updates an output descriptor.
    pub fn upsert_output(&mut self, info: OutputInfo) {
        if let Some(existing) = self.outputs.iter_mut().find(|o| o.id == info.id) {
            *existing = info;
        } else {
            self.outputs.push(info);
        }
    }

    /// Removes an output descriptor.
    pub fn remove_output(&mut self, id: crate::output::OutputId) {
        self.outputs.retain(|o| o.id != id);
    }

    /// The known outputs.
    #[must_use]
    pub fn outputs(&self) -> &[OutputInfo] {
        &self.outputs
    }

    // -- Lifecycle --

    /// Destroys a surface subtree, unwinding draw-queue, focus, and grab
    /// references before the slots are freed.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn destroy_surface(&mut self, id: SurfaceId) {
        let destroyed = self.store.destroy(id);
        self.router.forget(&destroyed);
        self.windows
            .retain(|w| !destroyed.contains(&w.root.index()));
    }

    /// Destroys every remaining window. The display stays usable (new
    /// windows may be created afterwards).
    pub fn teardown(&mut self) {
        for root in self.window_ids() {
            self.destroy_surface(root);
        }
    }

    // -- Event entry points --

    /// Routes one pointer event for `window` and settles callback requests.
    pub fn pointer_event(
        &mut self,
        window: SurfaceId,
        event: PointerEvent,
        tracer: &mut Tracer<'_>,
    ) {
        self.router
            .dispatch(&mut self.store, window, event, &mut self.requests, tracer);
        self.apply_requests();
    }

    /// Applies an asynchronous resize: the root's allocation becomes the new
    /// size and a full relayout + redraw is queued.
    ///
    /// # Panics
    ///
    /// Panics if `window` is not a live window root.
    pub fn configure(&mut self, window: SurfaceId, event: ConfigureEvent) {
        self.store.set_window_size(window, event.size);
        let win = self
            .windows
            .iter_mut()
            .find(|w| w.root == window)
            .expect("configure for an unknown window");
        win.size = event.size;
        // Superseded incremental work is discarded; the root covers it all.
        win.queues.flush(&mut self.store);
        win.queues.queue(&mut self.store, window, true);
    }

    /// Requests a redraw of `surface` on its window's queue.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn queue_draw(&mut self, surface: SurfaceId, needs_reallocate: bool) {
        let root = self.store.window_of(surface);
        if let Some(win) = self.windows.iter_mut().find(|w| w.root == root) {
            win.queues.queue(&mut self.store, surface, needs_reallocate);
        }
    }

    /// Fires an action chain and settles any requests it records.
    pub fn fire_action(&mut self, surface: SurfaceId, action: u32) -> Result<(), TreeError> {
        self.dispatch_action(surface, action)?;
        self.apply_requests();
        Ok(())
    }

    /// Merges requests collected outside the display (e.g. by a frame pass)
    /// and settles them.
    pub fn settle_requests(&mut self, requests: &mut Requests) {
        self.requests.draws.append(&mut requests.draws);
        self.requests.actions.append(&mut requests.actions);
        self.requests.release_grabs |= core::mem::take(&mut requests.release_grabs);
        if let Some(cursor) = requests.take_cursor() {
            self.requests.cursor = Some(cursor);
        }
        self.apply_requests();
    }

    /// The pointer focus widget, if any.
    #[must_use]
    pub fn pointer_focus(&self) -> Option<SurfaceId> {
        self.router.focus()
    }

    /// The active grab owner, if any.
    #[must_use]
    pub fn grab_owner(&self) -> Option<SurfaceId> {
        self.router.grab_owner()
    }

    /// Takes the most recent cursor request for the backend to apply.
    pub fn take_cursor_request(&mut self) -> Option<(Cursor, u32)> {
        self.pending_cursor.take()
    }

    /// Runs allocation for every invalidated scope, then queues repaints for
    /// visibility flips. Called by the frame pass before drawing; also
    /// useful headlessly in tests.
    pub fn flush_layout(&mut self, tracer: &mut Tracer<'_>) {
        let report = self.store.collect_invalidations();
        for &scope in &report.layout_scopes {
            if !self.store.slot_live(scope) {
                continue;
            }
            layout::allocate_scope_raw(&mut self.store, scope);
            tracer.layout_pass(&crate::trace::LayoutPassEvent {
                window: self.store.window[scope as usize],
                scope,
            });
        }
        for &idx in &report.visibility {
            if !self.store.slot_live(idx) {
                continue;
            }
            // Repaint the region the surface occupied or now occupies: its
            // parent covers both the shown and hidden states.
            let id = self.store.id_at(idx);
            let target = self.store.parent(id).unwrap_or(id);
            self.queue_draw(target, false);
        }
    }

    // -- Request settlement --

    /// Drains recorded requests until no callback produces new ones.
    fn apply_requests(&mut self) {
        loop {
            if let Some(cursor) = self.requests.take_cursor() {
                self.pending_cursor = Some(cursor);
            }
            let release = core::mem::take(&mut self.requests.release_grabs);
            let draws = core::mem::take(&mut self.requests.draws);
            let actions = core::mem::take(&mut self.requests.actions);
            if !release && draws.is_empty() && actions.is_empty() {
                return;
            }

            if release {
                self.router.clear_grabs();
            }
            for (id, needs_reallocate) in draws {
                if self.store.is_alive(id) {
                    self.queue_draw(id, needs_reallocate);
                }
            }
            for (id, action) in actions {
                if self.store.is_alive(id) {
                    // Unknown chains are ignored here; the widget that
                    // recorded the request owned the index.
                    let _ = self.dispatch_action(id, action);
                }
            }
        }
    }

    fn dispatch_action(&mut self, surface: SurfaceId, action: u32) -> Result<(), TreeError> {
        self.store.validate(surface);
        let idx = surface.index() as usize;
        let len = self.store.handlers[idx]
            .actions
            .get(action as usize)
            .ok_or(TreeError::UnknownAction)?
            .len();
        for k in 0..len {
            let f = &mut self.store.handlers[idx].actions[action as usize][k];
            f(&mut ActionArgs {
                surface,
                action,
                requests: &mut self.requests,
            });
        }
        Ok(())
    }
}
