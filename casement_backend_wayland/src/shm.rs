// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Double-buffered shared-memory pixel pool.
//!
//! One pool backs one `wl_surface` with exactly two ARGB8888 buffers, per
//! the core's two-buffer discipline. Paint callbacks write into a staging
//! buffer on the client side; [`present`](ShmPool::present) copies the
//! staging bytes into the memfd the compositor reads, attaches, damages,
//! and commits. The extra copy keeps the whole crate free of `unsafe`
//! (no mapping), and is cheap next to the paint work it carries.
//!
//! Buffer busy state is the core [`Swapchain`]; `wl_buffer.release` events
//! clear the matching slot (see the dispatch glue in [`conn`](crate::conn)).

use std::fs::File;
use std::os::fd::AsFd;
use std::os::unix::fs::FileExt;

use casement_core::backend::{BackBuffer, PresentTarget};
use casement_core::geometry::{Rect, Size};
use casement_core::surface::BufferId;
use casement_core::swapchain::Swapchain;

use wayland_client::QueueHandle;
use wayland_client::protocol::{wl_buffer, wl_shm, wl_shm_pool, wl_surface};

use crate::conn::WaylandState;
use crate::error::WaylandBackendError;

/// The two-buffer shm pool of one window surface.
#[derive(Debug)]
pub struct ShmPool {
    file: File,
    shm: wl_shm::WlShm,
    surface: wl_surface::WlSurface,
    qh: QueueHandle<WaylandState>,
    pool: Option<wl_shm_pool::WlShmPool>,
    buffers: [Option<wl_buffer::WlBuffer>; 2],
    staging: [Vec<u8>; 2],
    pub(crate) chain: Swapchain,
    size: Size,
    stride: usize,
}

impl ShmPool {
    /// Creates an empty pool for `surface`. Buffers materialize on the
    /// first [`acquire`](PresentTarget::acquire).
    pub fn new(
        shm: wl_shm::WlShm,
        surface: wl_surface::WlSurface,
        qh: QueueHandle<WaylandState>,
    ) -> Result<Self, WaylandBackendError> {
        let fd = rustix::fs::memfd_create("casement-shm", rustix::fs::MemfdFlags::CLOEXEC)
            .map_err(std::io::Error::from)?;
        Ok(Self {
            file: File::from(fd),
            shm,
            surface,
            qh,
            pool: None,
            buffers: [None, None],
            staging: [Vec::new(), Vec::new()],
            chain: Swapchain::new(),
            size: Size::ZERO,
            stride: 0,
        })
    }

    /// Bytes per buffer slot.
    fn slot_len(&self) -> usize {
        self.stride * self.size.height.max(0) as usize
    }

    /// Re-creates the pool and both buffers for a new size.
    fn remap(&mut self, size: Size) -> Result<(), WaylandBackendError> {
        for buffer in self.buffers.iter_mut().filter_map(Option::take) {
            buffer.destroy();
        }
        if let Some(pool) = self.pool.take() {
            pool.destroy();
        }

        let stride = size.width.max(0) as usize * 4;
        let slot_len = stride * size.height.max(0) as usize;
        let total = slot_len * 2;
        self.file.set_len(total as u64)?;

        let pool = self.shm.create_pool(
            self.file.as_fd(),
            i32::try_from(total).expect("pool size fits i32"),
            &self.qh,
            (),
        );
        for (slot, entry) in self.buffers.iter_mut().enumerate() {
            *entry = Some(pool.create_buffer(
                i32::try_from(slot * slot_len).expect("offset fits i32"),
                size.width,
                size.height,
                i32::try_from(stride).expect("stride fits i32"),
                wl_shm::Format::Argb8888,
                &self.qh,
                slot,
            ));
        }
        self.pool = Some(pool);
        self.staging = [vec![0; slot_len], vec![0; slot_len]];
        self.size = size;
        self.stride = stride;
        Ok(())
    }
}

impl PresentTarget for ShmPool {
    fn acquire(&mut self, size: Size) -> Option<BackBuffer<'_>> {
        if size.is_empty() {
            return None;
        }
        if size != self.size {
            if let Err(e) = self.remap(size) {
                log::error!("shm remap to {size:?} failed: {e}");
                return None;
            }
        }
        let slot = self.chain.acquire()?;
        #[expect(clippy::cast_possible_truncation, reason = "slot is 0 or 1")]
        let id = BufferId(slot as u32);
        Some(BackBuffer {
            id,
            size,
            stride: self.stride,
            pixels: &mut self.staging[slot],
        })
    }

    fn present(&mut self, id: BufferId, damage: &[Rect]) {
        let slot = id.0 as usize;
        let Some(buffer) = self.buffers[slot].as_ref() else {
            log::error!("present on an unmapped buffer slot {slot}");
            return;
        };

        let offset = (slot * self.slot_len()) as u64;
        if let Err(e) = self.file.write_all_at(&self.staging[slot], offset) {
            log::error!("shm upload failed: {e}");
            return;
        }

        self.surface.attach(Some(buffer), 0, 0);
        for rect in damage {
            self.surface
                .damage_buffer(rect.x, rect.y, rect.width, rect.height);
        }
        self.surface.commit();
        self.chain.mark_busy(slot);
        log::trace!("presented slot {slot} with {} damage rects", damage.len());
    }
}
