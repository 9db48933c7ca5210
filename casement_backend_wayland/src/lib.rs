// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wayland backend for casement.
//!
//! This crate provides the compositor-facing half of the toolkit's
//! collaborator contracts:
//!
//! - [`ShmPool`](shm::ShmPool) — a two-buffer `wl_shm` pool implementing
//!   [`PresentTarget`](casement_core::backend::PresentTarget), with busy
//!   state driven by `wl_buffer.release`.
//! - [`WaylandBackend`](conn::WaylandBackend) — owned-queue connection
//!   management: registry binding, xdg-shell window setup, and translation
//!   of pointer/configure/frame traffic into
//!   [`BackendEvent`](events::BackendEvent) values.
//! - [`Reactor`](reactor::Reactor) — a poll-based readiness multiplexer
//!   over the connection descriptor plus caller-registered readers.
//!
//! Single-surface contract: one backend instance manages one toplevel
//! `wl_surface`. Multi-window routing is intentionally deferred.
//!
//! # Event loop wiring
//!
//! The host owns the loop and composes the pieces:
//!
//! ```rust,ignore
//! let mut backend = WaylandBackend::connect()?;
//! backend.create_window("org.example.app", "example")?;
//! let mut reactor = Reactor::new();
//! let mut display = Display::new();
//! let win = display.create_window(Layout::Column);
//!
//! loop {
//!     backend.flush()?;
//!     if reactor.wait(backend.connection().as_fd(), None)? {
//!         backend.read_events()?;
//!     }
//!     backend.dispatch_pending()?;
//!
//!     let mut tracer = Tracer::none();
//!     while let Some(event) = backend.state.pop_event() {
//!         match event {
//!             BackendEvent::Pointer(e) => display.pointer_event(win, e, &mut tracer),
//!             BackendEvent::Configure(e) => display.configure(win, e),
//!             BackendEvent::BufferReleased | BackendEvent::FrameReady => {}
//!             BackendEvent::Output(info) => display.upsert_output(info),
//!             BackendEvent::CloseRequested => return Ok(()),
//!         }
//!     }
//!
//!     display.flush_layout(&mut tracer);
//!     let mut requests = Requests::new();
//!     let (store, windows) = display.split_mut();
//!     for window in windows.iter_mut() {
//!         if let Some(pool) = backend.state.pool_mut() {
//!             let _ = run_frame(store, window, pool, &mut requests, &mut tracer);
//!         }
//!     }
//!     display.settle_requests(&mut requests);
//! }
//! ```

pub mod conn;
pub mod error;
pub mod events;
pub mod reactor;
pub mod shm;

pub use conn::{WaylandBackend, WaylandState};
pub use error::WaylandBackendError;
pub use events::BackendEvent;
pub use reactor::{Reactor, ReaderId};
pub use shm::ShmPool;
