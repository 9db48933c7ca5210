// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Connection ownership and protocol dispatch.
//!
//! [`WaylandBackend`] is the owned-queue integration: it owns the
//! `Connection`, the `EventQueue<WaylandState>`, and the state all protocol
//! objects dispatch into. Single-surface contract: one backend instance
//! manages one toplevel `wl_surface`; multi-window routing is intentionally
//! deferred.
//!
//! Protocol events are translated into [`BackendEvent`] values and queued;
//! the host drains them after each dispatch and feeds the core. Nothing in
//! here touches the surface tree directly.

use std::collections::VecDeque;

use casement_core::backend::{ConfigureEvent, PointerEvent};
use casement_core::geometry::{Fixed, Size};
use casement_core::output::{OutputId, OutputInfo};

use wayland_client::protocol::{
    wl_buffer, wl_callback, wl_compositor, wl_output, wl_pointer, wl_registry, wl_seat, wl_shm,
    wl_shm_pool, wl_surface,
};
use wayland_client::{
    Connection, Dispatch, EventQueue, Proxy, QueueHandle, WEnum, delegate_noop,
};
use wayland_protocols::xdg::shell::client::{xdg_surface, xdg_toplevel, xdg_wm_base};

use crate::error::WaylandBackendError;
use crate::events::BackendEvent;
use crate::shm::ShmPool;

/// Dispatch state for one compositor connection.
#[derive(Debug, Default)]
pub struct WaylandState {
    compositor: Option<wl_compositor::WlCompositor>,
    shm: Option<wl_shm::WlShm>,
    seat: Option<wl_seat::WlSeat>,
    pointer: Option<wl_pointer::WlPointer>,
    wm_base: Option<xdg_wm_base::XdgWmBase>,

    surface: Option<wl_surface::WlSurface>,
    xdg_surface: Option<xdg_surface::XdgSurface>,
    toplevel: Option<xdg_toplevel::XdgToplevel>,
    pool: Option<ShmPool>,

    /// Size from the latest `xdg_toplevel.configure`, committed on the
    /// following `xdg_surface.configure`.
    pending_size: Size,
    configured_size: Size,

    events: VecDeque<BackendEvent>,
    outputs: Vec<(u32, OutputInfo)>,
}

impl WaylandState {
    /// Pops the next translated event.
    pub fn pop_event(&mut self) -> Option<BackendEvent> {
        self.events.pop_front()
    }

    /// The pixel pool of the managed window, as a present target.
    pub fn pool_mut(&mut self) -> Option<&mut ShmPool> {
        self.pool.as_mut()
    }

    fn push(&mut self, event: BackendEvent) {
        self.events.push_back(event);
    }
}

/// Owned-queue Wayland integration for one window.
#[derive(Debug)]
pub struct WaylandBackend {
    connection: Connection,
    event_queue: EventQueue<WaylandState>,
    qh: QueueHandle<WaylandState>,
    /// Protocol state; also the event drain and pool owner.
    pub state: WaylandState,
}

impl WaylandBackend {
    /// Connects to the compositor named by the environment and binds the
    /// required globals.
    pub fn connect() -> Result<Self, WaylandBackendError> {
        let connection = Connection::connect_to_env()?;
        let event_queue = connection.new_event_queue();
        let qh = event_queue.handle();
        let display = connection.display();
        let _registry = display.get_registry(&qh, ());

        let mut backend = Self {
            connection,
            event_queue,
            qh,
            state: WaylandState::default(),
        };
        // Two round trips: one for globals, one for their initial events
        // (seat capabilities, output modes).
        backend.roundtrip()?;
        backend.roundtrip()?;

        if backend.state.compositor.is_none() {
            return Err(WaylandBackendError::MissingGlobal("wl_compositor"));
        }
        if backend.state.shm.is_none() {
            return Err(WaylandBackendError::MissingGlobal("wl_shm"));
        }
        if backend.state.wm_base.is_none() {
            return Err(WaylandBackendError::MissingGlobal("xdg_wm_base"));
        }
        Ok(backend)
    }

    /// Creates the managed toplevel window with its shm pool. The first
    /// [`BackendEvent::Configure`] carries the usable size.
    pub fn create_window(&mut self, app_id: &str, title: &str) -> Result<(), WaylandBackendError> {
        let compositor = self
            .state
            .compositor
            .as_ref()
            .ok_or(WaylandBackendError::MissingGlobal("wl_compositor"))?;
        let wm_base = self
            .state
            .wm_base
            .as_ref()
            .ok_or(WaylandBackendError::MissingGlobal("xdg_wm_base"))?;
        let shm = self
            .state
            .shm
            .clone()
            .ok_or(WaylandBackendError::MissingGlobal("wl_shm"))?;

        let surface = compositor.create_surface(&self.qh, ());
        let xdg_surface = wm_base.get_xdg_surface(&surface, &self.qh, ());
        let toplevel = xdg_surface.get_toplevel(&self.qh, ());
        toplevel.set_app_id(app_id.into());
        toplevel.set_title(title.into());
        surface.commit();

        self.state.pool = Some(ShmPool::new(shm, surface.clone(), self.qh.clone())?);
        self.state.surface = Some(surface);
        self.state.xdg_surface = Some(xdg_surface);
        self.state.toplevel = Some(toplevel);
        Ok(())
    }

    /// Registers a frame callback on the managed surface; a
    /// [`BackendEvent::FrameReady`] arrives when the compositor wants the
    /// next frame.
    pub fn request_frame(&mut self) {
        if let Some(surface) = &self.state.surface {
            surface.frame(&self.qh, ());
            surface.commit();
        }
    }

    /// Flushes requests and blocks until events arrive, then dispatches.
    pub fn blocking_dispatch(&mut self) -> Result<usize, WaylandBackendError> {
        Ok(self.event_queue.blocking_dispatch(&mut self.state)?)
    }

    /// Dispatches already-read events without blocking. Pair with
    /// [`read_events`](Self::read_events) in a poll loop.
    pub fn dispatch_pending(&mut self) -> Result<usize, WaylandBackendError> {
        Ok(self.event_queue.dispatch_pending(&mut self.state)?)
    }

    /// Flushes outgoing requests to the socket.
    pub fn flush(&mut self) -> Result<(), WaylandBackendError> {
        Ok(self.event_queue.flush()?)
    }

    /// Reads pending socket data into the queue (non-blocking). Call when
    /// the reactor reports the connection readable.
    pub fn read_events(&mut self) -> Result<(), WaylandBackendError> {
        if let Some(guard) = self.event_queue.prepare_read() {
            // WouldBlock is normal when another thread/queue read first.
            if let Err(wayland_client::backend::WaylandError::Io(e)) = guard.read() {
                if e.kind() != std::io::ErrorKind::WouldBlock {
                    return Err(WaylandBackendError::Backend(
                        wayland_client::backend::WaylandError::Io(e),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Blocks until all issued requests are processed.
    pub fn roundtrip(&mut self) -> Result<usize, WaylandBackendError> {
        Ok(self.event_queue.roundtrip(&mut self.state)?)
    }

    /// The underlying connection (for the reactor's descriptor).
    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.connection
    }
}

// -- Registry --

impl Dispatch<wl_registry::WlRegistry, ()> for WaylandState {
    fn event(
        state: &mut Self,
        registry: &wl_registry::WlRegistry,
        event: wl_registry::Event,
        _data: &(),
        _conn: &Connection,
        qh: &QueueHandle<Self>,
    ) {
        let wl_registry::Event::Global {
            name,
            interface,
            version,
        } = event
        else {
            return;
        };
        match interface.as_str() {
            "wl_compositor" => {
                state.compositor =
                    Some(registry.bind(name, version.min(4), qh, ()));
            }
            "wl_shm" => {
                state.shm = Some(registry.bind(name, 1, qh, ()));
            }
            "wl_seat" => {
                state.seat = Some(registry.bind(name, version.min(5), qh, ()));
            }
            "xdg_wm_base" => {
                state.wm_base = Some(registry.bind(name, version.min(2), qh, ()));
            }
            "wl_output" => {
                let output: wl_output::WlOutput = registry.bind(name, version.min(2), qh, name);
                log::debug!("bound output {:?} (global {name})", output.id());
            }
            _ => {}
        }
    }
}

// -- Seat and pointer --

impl Dispatch<wl_seat::WlSeat, ()> for WaylandState {
    fn event(
        state: &mut Self,
        seat: &wl_seat::WlSeat,
        event: wl_seat::Event,
        _data: &(),
        _conn: &Connection,
        qh: &QueueHandle<Self>,
    ) {
        if let wl_seat::Event::Capabilities {
            capabilities: WEnum::Value(capabilities),
        } = event
        {
            let has_pointer = capabilities.contains(wl_seat::Capability::Pointer);
            if has_pointer && state.pointer.is_none() {
                state.pointer = Some(seat.get_pointer(qh, ()));
            } else if !has_pointer {
                if let Some(pointer) = state.pointer.take() {
                    pointer.release();
                }
            }
        }
    }
}

impl Dispatch<wl_pointer::WlPointer, ()> for WaylandState {
    fn event(
        state: &mut Self,
        _pointer: &wl_pointer::WlPointer,
        event: wl_pointer::Event,
        _data: &(),
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        let translated = match event {
            wl_pointer::Event::Enter {
                serial,
                surface_x,
                surface_y,
                ..
            } => Some(PointerEvent::Enter {
                x: Fixed::from_f64(surface_x),
                y: Fixed::from_f64(surface_y),
                serial,
            }),
            wl_pointer::Event::Leave { serial, .. } => Some(PointerEvent::Leave { serial }),
            wl_pointer::Event::Motion {
                surface_x,
                surface_y,
                ..
            } => Some(PointerEvent::Motion {
                x: Fixed::from_f64(surface_x),
                y: Fixed::from_f64(surface_y),
            }),
            wl_pointer::Event::Button {
                serial,
                button,
                state: WEnum::Value(button_state),
                ..
            } => Some(PointerEvent::Button {
                code: button,
                pressed: button_state == wl_pointer::ButtonState::Pressed,
                serial,
            }),
            wl_pointer::Event::Axis {
                axis: WEnum::Value(axis),
                value,
                ..
            } => Some(match axis {
                wl_pointer::Axis::HorizontalScroll => PointerEvent::Axis {
                    horizontal: value,
                    vertical: 0.0,
                },
                _ => PointerEvent::Axis {
                    horizontal: 0.0,
                    vertical: value,
                },
            }),
            _ => None,
        };
        if let Some(event) = translated {
            state.push(BackendEvent::Pointer(event));
        }
    }
}

// -- xdg-shell --

impl Dispatch<xdg_wm_base::XdgWmBase, ()> for WaylandState {
    fn event(
        _state: &mut Self,
        wm_base: &xdg_wm_base::XdgWmBase,
        event: xdg_wm_base::Event,
        _data: &(),
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        if let xdg_wm_base::Event::Ping { serial } = event {
            wm_base.pong(serial);
        }
    }
}

impl Dispatch<xdg_surface::XdgSurface, ()> for WaylandState {
    fn event(
        state: &mut Self,
        xdg_surface: &xdg_surface::XdgSurface,
        event: xdg_surface::Event,
        _data: &(),
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        if let xdg_surface::Event::Configure { serial } = event {
            xdg_surface.ack_configure(serial);
            if !state.pending_size.is_empty() {
                state.configured_size = state.pending_size;
            }
            if state.configured_size.is_empty() {
                // The compositor left the size to us.
                state.configured_size = Size::new(640, 480);
            }
            state.push(BackendEvent::Configure(ConfigureEvent {
                size: state.configured_size,
                serial,
            }));
        }
    }
}

impl Dispatch<xdg_toplevel::XdgToplevel, ()> for WaylandState {
    fn event(
        state: &mut Self,
        _toplevel: &xdg_toplevel::XdgToplevel,
        event: xdg_toplevel::Event,
        _data: &(),
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        match event {
            xdg_toplevel::Event::Configure { width, height, .. } => {
                if width > 0 && height > 0 {
                    state.pending_size = Size::new(width, height);
                }
            }
            xdg_toplevel::Event::Close => state.push(BackendEvent::CloseRequested),
            _ => {}
        }
    }
}

// -- Buffers and frame callbacks --

impl Dispatch<wl_buffer::WlBuffer, usize> for WaylandState {
    fn event(
        state: &mut Self,
        _buffer: &wl_buffer::WlBuffer,
        event: wl_buffer::Event,
        slot: &usize,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        if let wl_buffer::Event::Release = event {
            if let Some(pool) = state.pool.as_mut() {
                pool.chain.release(*slot);
            }
            state.push(BackendEvent::BufferReleased);
        }
    }
}

impl Dispatch<wl_callback::WlCallback, ()> for WaylandState {
    fn event(
        state: &mut Self,
        _callback: &wl_callback::WlCallback,
        event: wl_callback::Event,
        _data: &(),
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        if let wl_callback::Event::Done { .. } = event {
            state.push(BackendEvent::FrameReady);
        }
    }
}

// -- Outputs --

impl Dispatch<wl_output::WlOutput, u32> for WaylandState {
    fn event(
        state: &mut Self,
        _output: &wl_output::WlOutput,
        event: wl_output::Event,
        global: &u32,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        let entry = match state.outputs.iter_mut().find(|(name, _)| name == global) {
            Some((_, info)) => info,
            None => {
                state.outputs.push((
                    *global,
                    OutputInfo {
                        id: OutputId(*global),
                        mode: Size::ZERO,
                        scale: 1,
                    },
                ));
                &mut state.outputs.last_mut().expect("just pushed").1
            }
        };
        match event {
            wl_output::Event::Mode {
                flags: WEnum::Value(flags),
                width,
                height,
                ..
            } => {
                if flags.contains(wl_output::Mode::Current) {
                    entry.mode = Size::new(width, height);
                }
            }
            wl_output::Event::Scale { factor } => entry.scale = factor,
            wl_output::Event::Done => {
                let info = *entry;
                state.push(BackendEvent::Output(info));
            }
            _ => {}
        }
    }
}

// Event-less (or ignorable) interfaces.
delegate_noop!(WaylandState: ignore wl_compositor::WlCompositor);
delegate_noop!(WaylandState: ignore wl_shm::WlShm);
delegate_noop!(WaylandState: ignore wl_shm_pool::WlShmPool);
delegate_noop!(WaylandState: ignore wl_surface::WlSurface);
