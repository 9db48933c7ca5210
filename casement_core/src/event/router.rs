// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer focus and button-grab routing.
//!
//! The router is the small state machine between raw pointer events and
//! widget callbacks. Its states: no pointer; pointer in a window with no
//! focus widget; pointer in a window with a focus widget — plus an
//! orthogonal grab set.
//!
//! **Focus transitions.** On every hit change the router walks from the
//! newly hit surface up through its ancestors. The walk stops at the first
//! ancestor that either *is* the current focus (nothing changes) or accepts
//! the focus offer ([`EnterResponse::TakeFocus`]); in the latter case the
//! old focus receives `leave` exactly once, strictly before the new focus
//! commits. If nobody accepts, the old focus still receives its `leave`.
//! Offers are made once per hit change, so enter/leave calls always pair
//! and never repeat on the same widget without an intervening transition.
//!
//! **Grabs.** A press whose callback answers [`PressResponse::Grab`] makes
//! that widget the exclusive recipient of motion and release events for
//! that button — even outside its bounds or window — with coordinates
//! translated into its local frame. Several buttons may be grabbed by the
//! same owner (a bitmask); the grab ends when the last bit clears, at which
//! point the router re-runs hit testing and fires any enter/leave the
//! pointer's travels earned while grabbed.
//!
//! All gesture state lives here (not in statics), so multiple routers could
//! serve multiple seats.

use crate::backend::{Button, PointerEvent};
use crate::geometry::Point;
use crate::surface::{
    ButtonArgs, EnterResponse, PointerArgs, PressResponse, Requests, SurfaceId, SurfaceStore,
};
use crate::trace::{FocusChangeEvent, GrabEvent, Tracer};

use super::find::find_surface;

/// An active button grab.
#[derive(Clone, Copy, Debug)]
struct Grab {
    owner: SurfaceId,
    buttons: u8,
}

/// Pointer routing state for one seat.
#[derive(Debug, Default)]
pub struct PointerRouter {
    /// Window currently under the pointer.
    window: Option<SurfaceId>,
    /// Widget holding pointer focus.
    focus: Option<SurfaceId>,
    /// Deepest surface the last hit test returned; guards repeat offers.
    last_hit: Option<SurfaceId>,
    /// Last pointer position, window-relative.
    position: Point,
    grab: Option<Grab>,
    /// Serial of the most recent enter, for cursor requests.
    enter_serial: u32,
}

impl PointerRouter {
    /// Creates a router in the no-pointer state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The widget holding pointer focus, if any.
    #[must_use]
    pub fn focus(&self) -> Option<SurfaceId> {
        self.focus
    }

    /// The current grab owner, if any button is grabbed.
    #[must_use]
    pub fn grab_owner(&self) -> Option<SurfaceId> {
        self.grab.map(|g| g.owner)
    }

    /// The last observed pointer position, window-relative.
    #[must_use]
    pub fn position(&self) -> Point {
        self.position
    }

    /// The serial of the most recent enter event.
    #[must_use]
    pub fn enter_serial(&self) -> u32 {
        self.enter_serial
    }

    /// Routes one pointer event for `window`.
    ///
    /// Callback follow-ups land in `requests`; the caller applies them after
    /// dispatch (see [`Display`](crate::display::Display)).
    pub fn dispatch(
        &mut self,
        store: &mut SurfaceStore,
        window: SurfaceId,
        event: PointerEvent,
        requests: &mut Requests,
        tracer: &mut Tracer<'_>,
    ) {
        match event {
            PointerEvent::Enter { x, y, serial } => {
                let bounds = store.allocation(window).size();
                // Compositors may report slightly out-of-bounds coordinates
                // at window edges; enter clamps them in.
                let pos = Point::new(
                    x.to_pixel_clamped(bounds.width.max(1)),
                    y.to_pixel_clamped(bounds.height.max(1)),
                );
                self.window = Some(window);
                self.position = pos;
                self.enter_serial = serial;
                if self.grab.is_none() {
                    let hit = find_surface(store, window, pos);
                    self.enter_and_leave(store, hit, requests, tracer);
                }
            }
            PointerEvent::Leave { serial: _ } => {
                self.window = None;
                if self.grab.is_some() {
                    // The grab outlives the window; focus settles on release.
                    return;
                }
                if let Some(old) = self.focus.take() {
                    fire_leave(store, old, self.position, self.enter_serial, requests);
                    tracer.focus_change(&FocusChangeEvent {
                        from: Some(old),
                        to: None,
                    });
                }
                self.last_hit = None;
            }
            PointerEvent::Motion { x, y } => {
                // Unclamped: a grab legitimately produces out-of-bounds
                // coordinates.
                let pos = Point::new(x.to_pixel(), y.to_pixel());
                self.position = pos;

                if let Some(grab) = self.grab {
                    fire_motion(store, grab.owner, pos, self.enter_serial, requests);
                    return;
                }
                let Some(win) = self.window else {
                    return;
                };
                if !store.allocation(win).contains(pos) {
                    // Outside the window with no grab: nothing to route.
                    return;
                }
                let hit = find_surface(store, win, pos);
                self.enter_and_leave(store, hit, requests, tracer);
                if let Some(focus) = self.focus {
                    fire_motion(store, focus, pos, self.enter_serial, requests);
                }
            }
            PointerEvent::Button {
                code,
                pressed,
                serial,
            } => {
                let button = Button::from_raw(code);
                if pressed {
                    self.press(store, button, serial, requests, tracer);
                } else {
                    self.release(store, button, serial, requests, tracer);
                }
            }
            PointerEvent::Axis {
                horizontal,
                vertical,
            } => {
                let target = self.grab.map(|g| g.owner).or(self.focus);
                if let Some(target) = target {
                    let idx = target.index() as usize;
                    if let Some(f) = store.handlers[idx].axis.as_mut() {
                        f(&mut crate::surface::AxisArgs {
                            surface: target,
                            horizontal,
                            vertical,
                            requests,
                        });
                    }
                }
            }
        }
    }

    /// Drops every grab unconditionally (a widget asked via
    /// [`Requests::release_grabs`], or teardown).
    pub(crate) fn clear_grabs(&mut self) {
        self.grab = None;
    }

    /// Unwinds references to destroyed slots. No callbacks fire; the
    /// surfaces are already gone.
    pub(crate) fn forget(&mut self, destroyed: &[u32]) {
        if self.focus.is_some_and(|f| destroyed.contains(&f.index())) {
            self.focus = None;
        }
        if self.last_hit.is_some_and(|h| destroyed.contains(&h.index())) {
            self.last_hit = None;
        }
        if self
            .grab
            .is_some_and(|g| destroyed.contains(&g.owner.index()))
        {
            self.grab = None;
        }
        if self.window.is_some_and(|w| destroyed.contains(&w.index())) {
            self.window = None;
            self.focus = None;
            self.last_hit = None;
        }
    }

    fn press(
        &mut self,
        store: &mut SurfaceStore,
        button: Button,
        serial: u32,
        requests: &mut Requests,
        tracer: &mut Tracer<'_>,
    ) {
        // During a grab the owner receives every button, and may widen the
        // grab to more buttons.
        if let Some(grab) = &mut self.grab {
            let owner = grab.owner;
            let response = fire_press(store, owner, self.position, button, serial, requests);
            if response == PressResponse::Grab {
                grab.buttons |= button.mask();
                tracer.grab(&GrabEvent {
                    owner,
                    button,
                    acquired: true,
                });
            }
            return;
        }

        let Some(focus) = self.focus else {
            return;
        };
        let response = fire_press(store, focus, self.position, button, serial, requests);
        if response == PressResponse::Grab {
            self.grab = Some(Grab {
                owner: focus,
                buttons: button.mask(),
            });
            tracer.grab(&GrabEvent {
                owner: focus,
                button,
                acquired: true,
            });
        }
    }

    fn release(
        &mut self,
        store: &mut SurfaceStore,
        button: Button,
        serial: u32,
        requests: &mut Requests,
        tracer: &mut Tracer<'_>,
    ) {
        if let Some(grab) = &mut self.grab {
            if grab.buttons & button.mask() != 0 {
                let owner = grab.owner;
                fire_release(store, owner, self.position, button, serial, requests);
                grab.buttons &= !button.mask();
                if grab.buttons == 0 {
                    self.grab = None;
                    tracer.grab(&GrabEvent {
                        owner,
                        button,
                        acquired: false,
                    });
                    // The pointer may have travelled while grabbed:
                    // re-evaluate the hit and settle enter/leave.
                    if let Some(win) = self.window {
                        if store.allocation(win).contains(self.position) {
                            let hit = find_surface(store, win, self.position);
                            self.enter_and_leave(store, hit, requests, tracer);
                        }
                    } else if let Some(old) = self.focus.take() {
                        // Released outside every window.
                        fire_leave(store, old, self.position, self.enter_serial, requests);
                        tracer.focus_change(&FocusChangeEvent {
                            from: Some(old),
                            to: None,
                        });
                        self.last_hit = None;
                    }
                }
                return;
            }
        }

        if let Some(focus) = self.focus {
            fire_release(store, focus, self.position, button, serial, requests);
        }
    }

    /// The focus-transition walk; see the module docs.
    fn enter_and_leave(
        &mut self,
        store: &mut SurfaceStore,
        hit: SurfaceId,
        requests: &mut Requests,
        tracer: &mut Tracer<'_>,
    ) {
        if self.last_hit == Some(hit) {
            return;
        }
        self.last_hit = Some(hit);

        let old = self.focus;
        let mut candidate = Some(hit);
        while let Some(c) = candidate {
            if Some(c) == old {
                // Same focus retained.
                return;
            }
            let response = fire_enter(store, c, self.position, self.enter_serial, requests);
            if response == EnterResponse::TakeFocus {
                if let Some(old) = old {
                    fire_leave(store, old, self.position, self.enter_serial, requests);
                }
                self.focus = Some(c);
                tracer.focus_change(&FocusChangeEvent { from: old, to: Some(c) });
                return;
            }
            candidate = store.parent(c);
        }

        // Nobody in the chain accepted.
        if let Some(old) = old {
            fire_leave(store, old, self.position, self.enter_serial, requests);
            tracer.focus_change(&FocusChangeEvent {
                from: Some(old),
                to: None,
            });
        }
        self.focus = None;
    }
}

fn local(store: &SurfaceStore, id: SurfaceId, position: Point) -> Point {
    position - store.allocation(id).origin()
}

fn fire_enter(
    store: &mut SurfaceStore,
    id: SurfaceId,
    position: Point,
    serial: u32,
    requests: &mut Requests,
) -> EnterResponse {
    let position = local(store, id, position);
    match store.handlers[id.index() as usize].enter.as_mut() {
        Some(f) => f(&mut PointerArgs {
            surface: id,
            position,
            serial,
            requests,
        }),
        None => EnterResponse::Pass,
    }
}

fn fire_leave(
    store: &mut SurfaceStore,
    id: SurfaceId,
    position: Point,
    serial: u32,
    requests: &mut Requests,
) {
    let position = local(store, id, position);
    if let Some(f) = store.handlers[id.index() as usize].leave.as_mut() {
        f(&mut PointerArgs {
            surface: id,
            position,
            serial,
            requests,
        });
    }
}

fn fire_motion(
    store: &mut SurfaceStore,
    id: SurfaceId,
    position: Point,
    serial: u32,
    requests: &mut Requests,
) {
    let position = local(store, id, position);
    if let Some(f) = store.handlers[id.index() as usize].motion.as_mut() {
        f(&mut PointerArgs {
            surface: id,
            position,
            serial,
            requests,
        });
    }
}

fn fire_press(
    store: &mut SurfaceStore,
    id: SurfaceId,
    position: Point,
    button: Button,
    serial: u32,
    requests: &mut Requests,
) -> PressResponse {
    let position = local(store, id, position);
    match store.handlers[id.index() as usize].press.as_mut() {
        Some(f) => f(&mut ButtonArgs {
            surface: id,
            position,
            button,
            serial,
            requests,
        }),
        None => PressResponse::Pass,
    }
}

fn fire_release(
    store: &mut SurfaceStore,
    id: SurfaceId,
    position: Point,
    button: Button,
    serial: u32,
    requests: &mut Requests,
) {
    let position = local(store, id, position);
    if let Some(f) = store.handlers[id.index() as usize].release.as_mut() {
        f(&mut ButtonArgs {
            surface: id,
            position,
            button,
            serial,
            requests,
        });
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    use crate::geometry::{Fixed, Size};
    use crate::layout::allocate;
    use crate::surface::Layout;

    use super::*;

    type Log = Rc<RefCell<Vec<(&'static str, i32, i32)>>>;

    fn log_of(log: &Log) -> Vec<(&'static str, i32, i32)> {
        log.borrow().clone()
    }

    /// Installs enter (accepting), leave, motion, press (grabbing on
    /// request), release handlers that record into `log` tagged with `tag`.
    fn instrument(
        store: &mut SurfaceStore,
        id: SurfaceId,
        tag: &'static str,
        log: &Log,
        grab_on_press: bool,
    ) {
        let h = store.handlers_mut(id);
        let l = Rc::clone(log);
        h.enter = Some(Box::new(move |args| {
            l.borrow_mut().push((tag, args.position.x, args.position.y));
            EnterResponse::TakeFocus
        }));
        let l = Rc::clone(log);
        h.leave = Some(Box::new(move |args| {
            l.borrow_mut().push(("leave", args.position.x, args.position.y));
        }));
        let l = Rc::clone(log);
        h.motion = Some(Box::new(move |args| {
            l.borrow_mut().push(("motion", args.position.x, args.position.y));
        }));
        let l = Rc::clone(log);
        h.press = Some(Box::new(move |args| {
            l.borrow_mut().push(("press", args.position.x, args.position.y));
            if grab_on_press {
                PressResponse::Grab
            } else {
                PressResponse::Handled
            }
        }));
        let l = Rc::clone(log);
        h.release = Some(Box::new(move |args| {
            l.borrow_mut()
                .push(("release", args.position.x, args.position.y));
        }));
    }

    /// A 200x100 window with two 100x100 accepting widgets side by side.
    fn two_pane() -> (SurfaceStore, SurfaceId, SurfaceId, SurfaceId, Log, Log) {
        let mut store = SurfaceStore::new();
        let win = store.create_window(Layout::Row);
        let left = store.create_widget(win, Layout::Leaf).unwrap();
        store.set_requested_size(left, Size::new(100, 100));
        let right = store.create_widget(win, Layout::Leaf).unwrap();
        store.set_requested_size(right, Size::new(100, 100));
        allocate(&mut store, win, Size::new(200, 100));

        let left_log: Log = Rc::default();
        let right_log: Log = Rc::default();
        instrument(&mut store, left, "left", &left_log, false);
        instrument(&mut store, right, "right", &right_log, false);
        (store, win, left, right, left_log, right_log)
    }

    fn motion(x: i32, y: i32) -> PointerEvent {
        PointerEvent::Motion {
            x: Fixed::from_pixel(x),
            y: Fixed::from_pixel(y),
        }
    }

    #[test]
    fn enter_sets_focus_on_the_deepest_acceptor() {
        let (mut store, win, left, _right, left_log, _rl) = two_pane();
        let mut router = PointerRouter::new();
        let mut requests = Requests::new();

        router.dispatch(
            &mut store,
            win,
            PointerEvent::Enter {
                x: Fixed::from_pixel(10),
                y: Fixed::from_pixel(20),
                serial: 7,
            },
            &mut requests,
            &mut Tracer::none(),
        );

        assert_eq!(router.focus(), Some(left));
        assert_eq!(router.enter_serial(), 7);
        // Local coordinates: left pane starts at the window origin.
        assert_eq!(log_of(&left_log), alloc::vec![("left", 10, 20)]);
    }

    #[test]
    fn enter_clamps_out_of_bounds_coordinates() {
        let (mut store, win, left, ..) = two_pane();
        let mut router = PointerRouter::new();
        let mut requests = Requests::new();

        router.dispatch(
            &mut store,
            win,
            PointerEvent::Enter {
                x: Fixed::from_raw(-64),
                y: Fixed::from_pixel(150),
                serial: 1,
            },
            &mut requests,
            &mut Tracer::none(),
        );

        assert_eq!(router.position(), Point::new(0, 99));
        assert_eq!(router.focus(), Some(left));
    }

    #[test]
    fn crossing_panes_pairs_enter_and_leave() {
        let (mut store, win, left, right, left_log, right_log) = two_pane();
        let mut router = PointerRouter::new();
        let mut requests = Requests::new();
        let mut tracer = Tracer::none();

        router.dispatch(
            &mut store,
            win,
            PointerEvent::Enter {
                x: Fixed::from_pixel(10),
                y: Fixed::from_pixel(10),
                serial: 1,
            },
            &mut requests,
            &mut tracer,
        );
        // Wander within the left pane: no further enters.
        router.dispatch(&mut store, win, motion(40, 10), &mut requests, &mut tracer);
        // Cross into the right pane.
        router.dispatch(&mut store, win, motion(150, 10), &mut requests, &mut tracer);
        assert_eq!(router.focus(), Some(right));

        let left_events: Vec<&str> = log_of(&left_log).iter().map(|e| e.0).collect();
        assert_eq!(left_events, alloc::vec!["left", "motion", "leave"]);
        // The right pane's enter came strictly after the left pane's leave
        // was decided; it receives enter then its own motion.
        let right_events: Vec<&str> = log_of(&right_log).iter().map(|e| e.0).collect();
        assert_eq!(right_events, alloc::vec!["right", "motion"]);

        // Leave the window entirely.
        router.dispatch(
            &mut store,
            win,
            PointerEvent::Leave { serial: 2 },
            &mut requests,
            &mut tracer,
        );
        assert_eq!(router.focus(), None);
        let right_events: Vec<&str> = log_of(&right_log).iter().map(|e| e.0).collect();
        assert_eq!(right_events, alloc::vec!["right", "motion", "leave"]);
    }

    #[test]
    fn enter_and_leave_counts_stay_paired_over_a_motion_stream() {
        let (mut store, win, _left, _right, left_log, right_log) = two_pane();
        let mut router = PointerRouter::new();
        let mut requests = Requests::new();
        let mut tracer = Tracer::none();

        router.dispatch(
            &mut store,
            win,
            PointerEvent::Enter {
                x: Fixed::from_pixel(5),
                y: Fixed::from_pixel(5),
                serial: 1,
            },
            &mut requests,
            &mut tracer,
        );
        // Zigzag across the boundary.
        for x in [20, 120, 30, 130, 40, 140, 50] {
            router.dispatch(&mut store, win, motion(x, 50), &mut requests, &mut tracer);
        }
        router.dispatch(
            &mut store,
            win,
            PointerEvent::Leave { serial: 2 },
            &mut requests,
            &mut tracer,
        );

        for log in [&left_log, &right_log] {
            let events = log_of(log);
            let enters = events.iter().filter(|e| e.0 == "left" || e.0 == "right").count();
            let leaves = events.iter().filter(|e| e.0 == "leave").count();
            assert_eq!(enters, leaves, "enter/leave must pair: {events:?}");
            // Never two consecutive enters without a leave between.
            let mut inside = false;
            for e in &events {
                match e.0 {
                    "left" | "right" => {
                        assert!(!inside, "double enter: {events:?}");
                        inside = true;
                    }
                    "leave" => {
                        assert!(inside, "leave without enter: {events:?}");
                        inside = false;
                    }
                    _ => {}
                }
            }
        }
    }

    #[test]
    fn focus_falls_to_an_accepting_ancestor() {
        let mut store = SurfaceStore::new();
        let win = store.create_window(Layout::Row);
        let panel = store.create_widget(win, Layout::Row).unwrap();
        store.set_requested_size(panel, Size::new(100, 100));
        let plain = store.create_widget(panel, Layout::Leaf).unwrap();
        store.set_requested_size(plain, Size::new(50, 50));
        allocate(&mut store, win, Size::new(100, 100));

        let log: Log = Rc::default();
        instrument(&mut store, panel, "panel", &log, false);
        // `plain` has no handlers at all: the offer passes through it.

        let mut router = PointerRouter::new();
        let mut requests = Requests::new();
        router.dispatch(
            &mut store,
            win,
            PointerEvent::Enter {
                x: Fixed::from_pixel(10),
                y: Fixed::from_pixel(10),
                serial: 1,
            },
            &mut requests,
            &mut Tracer::none(),
        );

        assert_eq!(router.focus(), Some(panel));
    }

    #[test]
    fn grab_routes_motion_outside_bounds_in_local_frame() {
        let (mut store, win, _left, right, _left_log, _right_log) = two_pane();
        // Re-instrument the right pane to grab on press.
        let right_log2: Log = Rc::default();
        instrument(&mut store, right, "right", &right_log2, true);

        let mut router = PointerRouter::new();
        let mut requests = Requests::new();
        let mut tracer = Tracer::none();
        router.dispatch(
            &mut store,
            win,
            PointerEvent::Enter {
                x: Fixed::from_pixel(150),
                y: Fixed::from_pixel(50),
                serial: 1,
            },
            &mut requests,
            &mut tracer,
        );
        router.dispatch(
            &mut store,
            win,
            PointerEvent::Button {
                code: 0x110,
                pressed: true,
                serial: 2,
            },
            &mut requests,
            &mut tracer,
        );
        assert_eq!(router.grab_owner(), Some(right));

        // Drag far outside the window: still delivered, locally translated.
        // The right pane starts at x = 100.
        router.dispatch(&mut store, win, motion(-40, 250), &mut requests, &mut tracer);
        let events = log_of(&right_log2);
        assert!(events.contains(&("motion", -140, 250)), "{events:?}");
    }

    #[test]
    fn multi_button_grab_releases_on_the_last_bit() {
        let (mut store, win, _left, right, _ll, _rl) = two_pane();
        let log: Log = Rc::default();
        instrument(&mut store, right, "right", &log, true);

        let mut router = PointerRouter::new();
        let mut requests = Requests::new();
        let mut tracer = Tracer::none();
        router.dispatch(
            &mut store,
            win,
            PointerEvent::Enter {
                x: Fixed::from_pixel(150),
                y: Fixed::from_pixel(50),
                serial: 1,
            },
            &mut requests,
            &mut tracer,
        );

        let press = |code| PointerEvent::Button {
            code,
            pressed: true,
            serial: 3,
        };
        let release = |code| PointerEvent::Button {
            code,
            pressed: false,
            serial: 4,
        };

        router.dispatch(&mut store, win, press(0x110), &mut requests, &mut tracer);
        router.dispatch(&mut store, win, press(0x111), &mut requests, &mut tracer);
        assert_eq!(router.grab_owner(), Some(right));

        router.dispatch(&mut store, win, release(0x110), &mut requests, &mut tracer);
        // One button still held: the grab survives.
        assert_eq!(router.grab_owner(), Some(right));

        router.dispatch(&mut store, win, release(0x111), &mut requests, &mut tracer);
        assert_eq!(router.grab_owner(), None);
    }

    #[test]
    fn releasing_the_grab_settles_focus_where_the_pointer_went() {
        let (mut store, win, left, right, left_log, _rl) = two_pane();
        let grab_log: Log = Rc::default();
        instrument(&mut store, right, "right", &grab_log, true);

        let mut router = PointerRouter::new();
        let mut requests = Requests::new();
        let mut tracer = Tracer::none();
        router.dispatch(
            &mut store,
            win,
            PointerEvent::Enter {
                x: Fixed::from_pixel(150),
                y: Fixed::from_pixel(50),
                serial: 1,
            },
            &mut requests,
            &mut tracer,
        );
        router.dispatch(
            &mut store,
            win,
            PointerEvent::Button {
                code: 0x110,
                pressed: true,
                serial: 2,
            },
            &mut requests,
            &mut tracer,
        );

        // Drag over the left pane while grabbed: no enter fires yet.
        router.dispatch(&mut store, win, motion(20, 50), &mut requests, &mut tracer);
        assert!(log_of(&left_log).is_empty());

        // Release: hit testing re-runs and the left pane gains focus.
        router.dispatch(
            &mut store,
            win,
            PointerEvent::Button {
                code: 0x110,
                pressed: false,
                serial: 3,
            },
            &mut requests,
            &mut tracer,
        );
        assert_eq!(router.focus(), Some(left));
        let events: Vec<&str> = log_of(&left_log).iter().map(|e| e.0).collect();
        assert_eq!(events, alloc::vec!["left"]);
    }

    #[test]
    fn motion_outside_the_window_without_grab_is_dropped() {
        let (mut store, win, _left, _right, left_log, _rl) = two_pane();
        let mut router = PointerRouter::new();
        let mut requests = Requests::new();
        let mut tracer = Tracer::none();
        router.dispatch(
            &mut store,
            win,
            PointerEvent::Enter {
                x: Fixed::from_pixel(10),
                y: Fixed::from_pixel(10),
                serial: 1,
            },
            &mut requests,
            &mut tracer,
        );
        let before = log_of(&left_log).len();
        router.dispatch(&mut store, win, motion(500, 500), &mut requests, &mut tracer);
        assert_eq!(log_of(&left_log).len(), before);
    }

    #[test]
    fn forget_clears_dangling_references() {
        let (mut store, win, left, ..) = two_pane();
        let mut router = PointerRouter::new();
        let mut requests = Requests::new();
        router.dispatch(
            &mut store,
            win,
            PointerEvent::Enter {
                x: Fixed::from_pixel(10),
                y: Fixed::from_pixel(10),
                serial: 1,
            },
            &mut requests,
            &mut Tracer::none(),
        );
        assert_eq!(router.focus(), Some(left));

        let destroyed = store.destroy(left);
        router.forget(&destroyed);
        assert_eq!(router.focus(), None);
    }
}
