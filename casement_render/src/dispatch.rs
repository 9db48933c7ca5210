// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The surface draw dispatcher: one redraw cycle for one window.
//!
//! [`run_frame`] is the redraw-opportunity entry point. It acquires a back
//! buffer (deferring, not erroring, when both are busy), swaps the window's
//! draw queues, and drains the read queue. Each drained entry is painted as
//! a depth-first pre-order walk of its non-culled subtree: a surface whose
//! reallocation flag is set gets its `configure` callback first, with its
//! new pixel sub-region, so it can react to the new size before painting;
//! then its paint callback runs against the stride-addressed sub-rectangle.
//! A paint callback answering [`PaintOutcome::Again`] is re-queued — into
//! the *write* queue, so steady-state animation still terminates in exactly
//! one dispatch per cycle.
//!
//! Each entry's allocation is merged into the frame's [`DamageRegion`],
//! which is flattened and handed to the backend together with the buffer.
//!
//! The caller is expected to run [`Display::flush_layout`] first so
//! invalidated scopes are re-allocated before painting, and to pass the
//! leftover `requests` back to [`Display::settle_requests`] afterwards.
//!
//! [`Display::flush_layout`]: casement_core::display::Display::flush_layout
//! [`Display::settle_requests`]: casement_core::display::Display::settle_requests

use casement_core::backend::{BackBuffer, PresentTarget};
use casement_core::display::Window;
use casement_core::geometry::{Point, Rect};
use casement_core::surface::{ConfigureArgs, PaintArgs, PaintOutcome, Requests, SurfaceStore};
use casement_core::trace::{DeferredEvent, DrawPassEvent, Tracer};

use crate::damage::DamageRegion;

/// The outcome of one [`run_frame`] call.
#[derive(Debug, PartialEq, Eq)]
pub enum FrameResult {
    /// A buffer was painted and presented with the given damage.
    Painted {
        /// The region handed to the compositor.
        damage: DamageRegion,
    },
    /// Both buffers were busy; the queues were left intact for the next
    /// release notification.
    Deferred,
    /// Nothing to draw (no live queue entries, or the window is unsized).
    Idle,
}

#[derive(Default)]
struct PassCounters {
    painted: u32,
    requeued: u32,
}

/// Runs one redraw cycle for `window`, painting into a buffer from `target`.
///
/// Callback follow-ups accumulate in `requests`; redraw requests are applied
/// to the window's write queue before returning, everything else is left for
/// the caller to settle.
pub fn run_frame(
    store: &mut SurfaceStore,
    window: &mut Window,
    target: &mut dyn PresentTarget,
    requests: &mut Requests,
    tracer: &mut Tracer<'_>,
) -> FrameResult {
    let root = window.root();
    let size = window.size();
    if size.is_empty() || window.queues.pending(store) == 0 {
        return FrameResult::Idle;
    }

    let Some(mut buffer) = target.acquire(size) else {
        tracer.deferred(&DeferredEvent {
            window: root.index(),
        });
        return FrameResult::Deferred;
    };
    let buffer_id = buffer.id;

    window.queues.swap(store);
    let mut damage = DamageRegion::None;
    let mut counters = PassCounters::default();
    while let Some(idx) = window.queues.pop_read(store) {
        if store.culled_at(idx) {
            continue;
        }
        paint_subtree(store, idx, &mut buffer, requests, &mut counters);
        if idx == root.index() {
            damage.add_full();
        } else {
            damage.add(store.allocation_at(idx));
        }
    }
    drop(buffer);

    // Animation re-queues land in the new write queue now, keeping this
    // cycle's read queue fully drained.
    let draws = requests.take_draws();
    for (id, needs_reallocate) in draws {
        if store.is_alive(id) {
            window.queues.queue(store, id, needs_reallocate);
        }
    }

    if damage.is_empty() {
        // Every entry turned out to be a tombstone or culled.
        return FrameResult::Idle;
    }

    let bounds = Rect::from_origin_size(Point::ZERO, size);
    let rects = damage.to_rects(bounds);
    target.present(buffer_id, &rects);
    tracer.draw_pass(&DrawPassEvent {
        window: root.index(),
        painted: counters.painted,
        requeued: counters.requeued,
    });
    tracer.damage_rects(root.index(), &rects);

    FrameResult::Painted { damage }
}

/// Depth-first pre-order paint of one non-culled subtree.
fn paint_subtree(
    store: &mut SurfaceStore,
    idx: u32,
    buffer: &mut BackBuffer<'_>,
    requests: &mut Requests,
    counters: &mut PassCounters,
) {
    if store.culled_at(idx) {
        return;
    }
    let id = store.id_at(idx);
    let allocation = store.allocation_at(idx);

    // Geometry changed since the last paint: let the widget react to its
    // new sub-region before pixels land.
    if store.take_needs_allocate(idx) {
        if let Some(configure) = store.handlers_at_mut(idx).configure.as_mut() {
            configure(&mut ConfigureArgs {
                surface: id,
                allocation,
                requests,
            });
        }
    }

    if let Some(paint) = store.handlers_at_mut(idx).paint.as_mut() {
        let region = buffer.region(allocation);
        let outcome = paint(&mut PaintArgs {
            surface: id,
            allocation,
            region,
            requests,
        });
        counters.painted += 1;
        if outcome == PaintOutcome::Again {
            requests.queue_draw(id, false);
            counters.requeued += 1;
        }
    }

    for child in store.children_slots(idx) {
        paint_subtree(store, child, buffer, requests, counters);
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    use casement_core::backend::{ConfigureEvent, PresentTarget};
    use casement_core::display::Display;
    use casement_core::geometry::Size;
    use casement_core::surface::{BufferId, Layout, SurfaceId};
    use casement_core::swapchain::Swapchain;

    use super::*;

    /// An in-memory two-buffer present target.
    struct MemoryTarget {
        buffers: [Vec<u8>; 2],
        size: Size,
        chain: Swapchain,
        presented: Vec<(BufferId, Vec<Rect>)>,
    }

    impl MemoryTarget {
        fn new() -> Self {
            Self {
                buffers: [Vec::new(), Vec::new()],
                size: Size::ZERO,
                chain: Swapchain::new(),
                presented: Vec::new(),
            }
        }

        fn release(&mut self, id: BufferId) {
            self.chain.release(id.0 as usize);
        }
    }

    impl PresentTarget for MemoryTarget {
        fn acquire(&mut self, size: Size) -> Option<BackBuffer<'_>> {
            let slot = self.chain.acquire()?;
            if self.size != size {
                let len = size.width as usize * 4 * size.height as usize;
                self.buffers = [alloc::vec![0; len], alloc::vec![0; len]];
                self.size = size;
            }
            #[expect(clippy::cast_possible_truncation, reason = "slot is 0 or 1")]
            let id = BufferId(slot as u32);
            Some(BackBuffer {
                id,
                size,
                stride: size.width as usize * 4,
                pixels: &mut self.buffers[slot],
            })
        }

        fn present(&mut self, id: BufferId, damage: &[Rect]) {
            self.chain.mark_busy(id.0 as usize);
            self.presented.push((id, damage.to_vec()));
        }
    }

    fn configured_display(size: Size) -> (Display, SurfaceId) {
        let mut display = Display::new();
        let win = display.create_window(Layout::Row);
        display.configure(
            win,
            ConfigureEvent {
                size,
                serial: 1,
            },
        );
        (display, win)
    }

    fn paint_counter(display: &mut Display, id: SurfaceId, again: bool) -> Rc<RefCell<u32>> {
        let count = Rc::new(RefCell::new(0_u32));
        let c = Rc::clone(&count);
        display.store.handlers_mut(id).paint = Some(Box::new(move |_args| {
            *c.borrow_mut() += 1;
            if again {
                PaintOutcome::Again
            } else {
                PaintOutcome::Done
            }
        }));
        count
    }

    fn frame(display: &mut Display, win: SurfaceId, target: &mut MemoryTarget) -> FrameResult {
        let mut tracer = Tracer::none();
        display.flush_layout(&mut tracer);
        let mut requests = Requests::new();
        let (store, windows) = display.split_mut();
        let window = windows.iter_mut().find(|w| w.root() == win).unwrap();
        let result = run_frame(store, window, target, &mut requests, &mut tracer);
        display.settle_requests(&mut requests);
        result
    }

    #[test]
    fn first_frame_paints_and_presents_full_damage() {
        let (mut display, win) = configured_display(Size::new(100, 50));
        let count = paint_counter(&mut display, win, false);
        let mut target = MemoryTarget::new();

        let result = frame(&mut display, win, &mut target);
        assert_eq!(
            result,
            FrameResult::Painted {
                damage: DamageRegion::Full
            }
        );
        assert_eq!(*count.borrow(), 1);
        assert_eq!(
            target.presented,
            alloc::vec![(BufferId(0), alloc::vec![Rect::new(0, 0, 100, 50)])]
        );

        // Nothing queued: the next opportunity is idle.
        assert_eq!(frame(&mut display, win, &mut target), FrameResult::Idle);
    }

    #[test]
    fn configure_runs_before_paint_with_the_new_region() {
        let (mut display, win) = configured_display(Size::new(100, 50));
        let w = display.store.create_widget(win, Layout::Leaf).unwrap();
        display.store.set_requested_size(w, Size::new(40, 40));

        let order = Rc::new(RefCell::new(Vec::new()));
        let o = Rc::clone(&order);
        display.store.handlers_mut(w).configure = Some(Box::new(move |args| {
            o.borrow_mut().push(("configure", args.allocation.width));
        }));
        let o = Rc::clone(&order);
        display.store.handlers_mut(w).paint = Some(Box::new(move |args| {
            o.borrow_mut().push(("paint", args.region.width()));
            PaintOutcome::Done
        }));

        let mut target = MemoryTarget::new();
        let _ = frame(&mut display, win, &mut target);

        assert_eq!(*order.borrow(), alloc::vec![("configure", 40), ("paint", 40)]);
    }

    #[test]
    fn always_again_paints_exactly_once_per_cycle() {
        let (mut display, win) = configured_display(Size::new(64, 64));
        let count = paint_counter(&mut display, win, true);
        let mut target = MemoryTarget::new();

        let result = frame(&mut display, win, &mut target);
        assert!(matches!(result, FrameResult::Painted { .. }));
        // One dispatch, not a loop: the re-queue landed in the write queue.
        assert_eq!(*count.borrow(), 1);
        assert_eq!(display.window(win).unwrap().queues.pending(&display.store), 1);

        // Next cycle paints once more.
        target.release(BufferId(0));
        let _ = frame(&mut display, win, &mut target);
        assert_eq!(*count.borrow(), 2);
    }

    #[test]
    fn grandparent_entry_paints_the_grandchild_via_the_walk_only() {
        let (mut display, win) = configured_display(Size::new(100, 100));
        let mid = display.store.create_widget(win, Layout::Row).unwrap();
        display.store.set_requested_size(mid, Size::new(80, 80));
        let leaf = display.store.create_widget(mid, Layout::Leaf).unwrap();
        display.store.set_requested_size(leaf, Size::new(20, 20));

        let leaf_count = paint_counter(&mut display, leaf, false);
        let win_count = paint_counter(&mut display, win, false);

        // Queue the grandchild, then its grandparent: the queue keeps only
        // the grandparent, and the grandchild paints once, via the subtree
        // walk rather than its own entry.
        display.queue_draw(leaf, false);
        display.queue_draw(win, false);

        let mut target = MemoryTarget::new();
        let _ = frame(&mut display, win, &mut target);

        assert_eq!(*win_count.borrow(), 1);
        assert_eq!(*leaf_count.borrow(), 1);
    }

    #[test]
    fn culled_subtrees_are_skipped() {
        let (mut display, win) = configured_display(Size::new(50, 50));
        let w = display.store.create_widget(win, Layout::Leaf).unwrap();
        display.store.set_requested_size(w, Size::new(200, 10));
        let count = paint_counter(&mut display, w, false);
        let _root_count = paint_counter(&mut display, win, false);

        let mut target = MemoryTarget::new();
        let _ = frame(&mut display, win, &mut target);

        // 200px in a 50px window: culled, never painted.
        assert!(display.store.culled(w));
        assert_eq!(*count.borrow(), 0);
    }

    #[test]
    fn both_buffers_busy_defers_and_keeps_the_queue() {
        let (mut display, win) = configured_display(Size::new(32, 32));
        let _count = paint_counter(&mut display, win, false);
        let mut target = MemoryTarget::new();

        let _ = frame(&mut display, win, &mut target); // buffer 0 busy
        display.queue_draw(win, false);
        let _ = frame(&mut display, win, &mut target); // buffer 1 busy
        display.queue_draw(win, false);

        let result = frame(&mut display, win, &mut target);
        assert_eq!(result, FrameResult::Deferred);
        assert_eq!(display.window(win).unwrap().queues.pending(&display.store), 1);

        // A release notification makes the retry succeed.
        target.release(BufferId(0));
        let result = frame(&mut display, win, &mut target);
        assert!(matches!(result, FrameResult::Painted { .. }));
    }

    #[test]
    fn widget_entries_damage_their_allocation_only() {
        let (mut display, win) = configured_display(Size::new(100, 50));
        let w = display.store.create_widget(win, Layout::Leaf).unwrap();
        display.store.set_requested_size(w, Size::new(40, 30));
        let _count = paint_counter(&mut display, w, false);

        let mut target = MemoryTarget::new();
        let _ = frame(&mut display, win, &mut target); // initial full frame
        target.release(BufferId(0));

        display.queue_draw(w, false);
        let result = frame(&mut display, win, &mut target);
        assert_eq!(
            result,
            FrameResult::Painted {
                damage: DamageRegion::Rects(alloc::vec![Rect::new(0, 0, 40, 30)])
            }
        );
    }

    #[test]
    fn paint_writes_land_in_the_acquired_buffer() {
        let (mut display, win) = configured_display(Size::new(8, 4));
        display.store.handlers_mut(win).paint = Some(Box::new(|args| {
            args.region.fill(0xff00_ff00);
            PaintOutcome::Done
        }));

        let mut target = MemoryTarget::new();
        let _ = frame(&mut display, win, &mut target);

        let px: u32 = u32::from_le_bytes(target.buffers[0][0..4].try_into().unwrap());
        assert_eq!(px, 0xff00_ff00);
    }
}
