// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend contract for compositor integrations.
//!
//! Casement splits compositor-specific work into *backend* crates. Each
//! backend provides the following pieces:
//!
//! - **Pixel buffers** — Implements [`PresentTarget`]: hand out a writable
//!   [`BackBuffer`] when one is free, and submit damage + present when the
//!   frame pass finishes. Exactly two buffers back one window; the busy
//!   bookkeeping is the [`Swapchain`](crate::swapchain::Swapchain) state
//!   machine, driven by the backend's release notifications.
//!
//! - **Pointer input** — Translates protocol pointer traffic into
//!   [`PointerEvent`] values ([`Fixed`] 24.8 coordinates, raw button codes)
//!   and feeds them to the [`Display`](crate::display::Display).
//!
//! - **Configure** — Delivers [`ConfigureEvent`] resize notifications. Until
//!   one arrives, the current allocations are provisional.
//!
//! - **Reactor** — A readiness multiplexer over the compositor connection's
//!   descriptor plus any caller-registered descriptors, so unrelated I/O can
//!   interleave with compositor traffic in the same wait loop. The reactor
//!   is backend-owned and not abstracted by a trait here, because descriptor
//!   ownership and wakeup mechanics differ per platform.
//!
//! # Frame loop pseudocode
//!
//! A typical buffer-release (or first-queue) callback wires the pieces
//! together like this:
//!
//! ```rust,ignore
//! fn on_redraw_opportunity(display: &mut Display, target: &mut impl PresentTarget) {
//!     for win in display.window_ids() {
//!         match run_frame(display, win, target, &mut tracer) {
//!             FrameResult::Painted { .. } => {}          // damage presented
//!             FrameResult::Deferred => {}                // both buffers busy; retry on release
//!             FrameResult::Idle => {}                    // queue was empty
//!         }
//!     }
//! }
//! ```

use crate::geometry::{Fixed, Rect, Size};
use crate::surface::BufferId;

/// A small dense button index space.
///
/// Raw protocol button codes are mapped so that left = 0, middle = 1,
/// right = 2; remaining codes map onto the next indices. Grab bookkeeping
/// packs these indices into a bitmask.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Button(u8);

impl Button {
    /// The left (primary) button.
    pub const LEFT: Self = Self(0);
    /// The middle button.
    pub const MIDDLE: Self = Self(1);
    /// The right (secondary) button.
    pub const RIGHT: Self = Self(2);

    /// Maps a raw Linux input event code to a dense index.
    ///
    /// `BTN_LEFT` (0x110), `BTN_MIDDLE` (0x112), and `BTN_RIGHT` (0x111) get
    /// the canonical first three indices; side/extra/task buttons follow.
    /// Codes beyond the eighth index share the last slot.
    #[must_use]
    pub const fn from_raw(code: u32) -> Self {
        match code {
            0x110 => Self::LEFT,
            0x112 => Self::MIDDLE,
            0x111 => Self::RIGHT,
            0x113 => Self(3), // BTN_SIDE
            0x114 => Self(4), // BTN_EXTRA
            0x115 => Self(5), // BTN_FORWARD
            0x116 => Self(6), // BTN_BACK
            _ => Self(7),
        }
    }

    /// Returns the dense index (0..8).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Returns the bitmask bit for this button.
    #[inline]
    #[must_use]
    pub const fn mask(self) -> u8 {
        1 << self.0
    }
}

impl core::fmt::Debug for Button {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match *self {
            Self::LEFT => write!(f, "Button::LEFT"),
            Self::MIDDLE => write!(f, "Button::MIDDLE"),
            Self::RIGHT => write!(f, "Button::RIGHT"),
            Self(n) => write!(f, "Button({n})"),
        }
    }
}

/// Cursor images a widget can request on enter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Cursor {
    /// The default arrow.
    #[default]
    Default,
    /// Pointing hand.
    Pointer,
    /// Open/closed hand for draggable content.
    Grab,
    /// Text caret.
    Text,
    /// Crosshair, e.g. over plot areas.
    Crosshair,
}

/// One pointer event, window-relative, as produced by a backend.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    /// Pointer entered the window. Coordinates are clamped into the window
    /// bounds before routing.
    Enter {
        /// Horizontal coordinate, 24.8 fixed point.
        x: Fixed,
        /// Vertical coordinate, 24.8 fixed point.
        y: Fixed,
        /// Protocol serial, required for cursor requests.
        serial: u32,
    },
    /// Pointer left the window.
    Leave {
        /// Protocol serial.
        serial: u32,
    },
    /// Pointer moved. Coordinates are not clamped; a grab may legitimately
    /// produce out-of-bounds positions.
    Motion {
        /// Horizontal coordinate, 24.8 fixed point.
        x: Fixed,
        /// Vertical coordinate, 24.8 fixed point.
        y: Fixed,
    },
    /// Button state changed.
    Button {
        /// Raw protocol button code; mapped via [`Button::from_raw`].
        code: u32,
        /// `true` on press, `false` on release.
        pressed: bool,
        /// Protocol serial.
        serial: u32,
    },
    /// Scroll.
    Axis {
        /// Horizontal delta.
        horizontal: f64,
        /// Vertical delta.
        vertical: f64,
    },
}

/// An asynchronous resize notification from the compositor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConfigureEvent {
    /// The new window size.
    pub size: Size,
    /// Protocol serial to acknowledge.
    pub serial: u32,
}

/// A writable back buffer handed out by a [`PresentTarget`].
pub struct BackBuffer<'a> {
    /// Backend identity of this buffer, passed back on present.
    pub id: BufferId,
    /// Buffer dimensions in pixels.
    pub size: Size,
    /// Bytes per row (at least `size.width * 4`).
    pub stride: usize,
    /// The raw pixel bytes, `stride * size.height` long, ARGB8888.
    pub pixels: &'a mut [u8],
}

impl core::fmt::Debug for BackBuffer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BackBuffer")
            .field("id", &self.id)
            .field("size", &self.size)
            .field("stride", &self.stride)
            .finish_non_exhaustive()
    }
}

impl BackBuffer<'_> {
    /// Returns a view of the sub-rectangle `rect` (buffer coordinates),
    /// clipped to the buffer bounds.
    pub fn region(&mut self, rect: Rect) -> PixelRegion<'_> {
        let bounds = Rect::from_origin_size(crate::geometry::Point::ZERO, self.size);
        PixelRegion {
            pixels: self.pixels,
            stride: self.stride,
            rect: rect.intersect(bounds),
        }
    }
}

/// A stride-addressed mutable view of one surface's pixel sub-rectangle.
///
/// Rows are addressed region-relative; the view cannot write outside its
/// rectangle.
pub struct PixelRegion<'a> {
    pixels: &'a mut [u8],
    stride: usize,
    rect: Rect,
}

impl core::fmt::Debug for PixelRegion<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PixelRegion")
            .field("stride", &self.stride)
            .field("rect", &self.rect)
            .finish_non_exhaustive()
    }
}

impl<'a> PixelRegion<'a> {
    /// Creates a view over raw buffer bytes. `rect` must already be clipped
    /// to the buffer bounds.
    #[must_use]
    pub fn new(pixels: &'a mut [u8], stride: usize, rect: Rect) -> Self {
        Self {
            pixels,
            stride,
            rect,
        }
    }

    /// The viewed rectangle in buffer coordinates.
    #[inline]
    #[must_use]
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Width in pixels.
    #[inline]
    #[must_use]
    pub fn width(&self) -> i32 {
        self.rect.width
    }

    /// Height in pixels.
    #[inline]
    #[must_use]
    pub fn height(&self) -> i32 {
        self.rect.height
    }

    /// Bytes per buffer row.
    #[inline]
    #[must_use]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the bytes of region-relative row `y` (`width * 4` long).
    ///
    /// # Panics
    ///
    /// Panics if `y` is outside `0..height()`.
    pub fn row_mut(&mut self, y: i32) -> &mut [u8] {
        assert!(y >= 0 && y < self.rect.height, "row {y} out of region");
        let offset = (self.rect.y + y) as usize * self.stride + self.rect.x as usize * 4;
        &mut self.pixels[offset..offset + self.rect.width as usize * 4]
    }

    /// Returns region-relative row `y` as ARGB8888 pixels.
    ///
    /// # Panics
    ///
    /// Panics if `y` is out of range or the underlying row is not 4-byte
    /// aligned (shm rows always are).
    pub fn row_argb_mut(&mut self, y: i32) -> &mut [u32] {
        bytemuck::cast_slice_mut(self.row_mut(y))
    }

    /// Fills the whole region with one ARGB8888 value.
    pub fn fill(&mut self, argb: u32) {
        for y in 0..self.rect.height {
            self.row_argb_mut(y).fill(argb);
        }
    }

    /// Reborrows the region for a nested call.
    pub fn reborrow(&mut self) -> PixelRegion<'_> {
        PixelRegion {
            pixels: self.pixels,
            stride: self.stride,
            rect: self.rect,
        }
    }
}

/// Supplies back buffers and accepts presented frames for one window.
///
/// The two-buffer discipline is fixed: when both buffers are busy,
/// [`acquire`](Self::acquire) returns `None` and the frame pass defers —
/// queue entries are never dropped for this reason.
pub trait PresentTarget {
    /// Returns a free back buffer of the given size, or `None` when both
    /// buffers are held by the compositor.
    fn acquire(&mut self, size: Size) -> Option<BackBuffer<'_>>;

    /// Submits the buffer with the accumulated damage rectangles.
    fn present(&mut self, id: BufferId, damage: &[Rect]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use alloc::vec;

    #[test]
    fn button_mapping_is_dense() {
        assert_eq!(Button::from_raw(0x110), Button::LEFT);
        assert_eq!(Button::from_raw(0x112), Button::MIDDLE);
        assert_eq!(Button::from_raw(0x111), Button::RIGHT);
        assert_eq!(Button::LEFT.index(), 0);
        assert_eq!(Button::MIDDLE.index(), 1);
        assert_eq!(Button::RIGHT.index(), 2);
        assert_eq!(Button::from_raw(0x113).index(), 3);
        // Codes beyond the table share the last index.
        assert_eq!(Button::from_raw(0x1000).index(), 7);
    }

    #[test]
    fn button_masks_are_disjoint() {
        assert_eq!(Button::LEFT.mask(), 0b001);
        assert_eq!(Button::MIDDLE.mask(), 0b010);
        assert_eq!(Button::RIGHT.mask(), 0b100);
    }

    #[test]
    fn region_is_clipped_to_buffer() {
        let mut pixels = vec![0_u8; 16 * 8 * 4];
        let mut buf = BackBuffer {
            id: BufferId(0),
            size: Size::new(16, 8),
            stride: 16 * 4,
            pixels: &mut pixels,
        };
        let region = buf.region(Rect::new(10, 4, 10, 10));
        assert_eq!(region.rect(), Rect::new(10, 4, 6, 4));
    }

    #[test]
    fn rows_address_the_right_bytes() {
        let mut pixels = vec![0_u8; 8 * 4 * 4];
        let mut region = PixelRegion::new(&mut pixels, 8 * 4, Rect::new(2, 1, 3, 2));
        region.fill(0xff11_2233);

        let whole: &[u32] = bytemuck::cast_slice(&pixels);
        // Row 1, columns 2..5 and row 2, columns 2..5 are painted.
        for y in 0..4 {
            for x in 0..8 {
                let expect = if (1..3).contains(&y) && (2..5).contains(&x) {
                    0xff11_2233
                } else {
                    0
                };
                assert_eq!(whole[y * 8 + x], expect, "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn empty_region_paints_nothing() {
        let mut pixels = vec![0_u8; 4 * 4 * 4];
        let mut buf = BackBuffer {
            id: BufferId(1),
            size: Size::new(4, 4),
            stride: 16,
            pixels: &mut pixels,
        };
        // Fully outside.
        let mut region = buf.region(Rect::from_origin_size(Point::new(10, 10), Size::new(2, 2)));
        region.fill(0xffff_ffff);
        assert!(pixels.iter().all(|&b| b == 0));
    }
}
