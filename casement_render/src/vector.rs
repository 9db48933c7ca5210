// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Vector painting over a pixel region via `tiny-skia`.
//!
//! Paint callbacks that want vector drawing render into a [`VectorCanvas`]
//! scratch pixmap and blit it into their [`PixelRegion`]. The scratch is the
//! widget's to keep between frames (it only reallocates when the region
//! size changes), so steady-state animation does not allocate.
//!
//! `tiny-skia` pixmaps are premultiplied RGBA in memory; window buffers are
//! ARGB8888 little-endian. The blit converts per pixel.

use casement_core::backend::PixelRegion;
use tiny_skia::Pixmap;

/// A reusable vector scratch surface for one widget.
#[derive(Debug)]
pub struct VectorCanvas {
    pixmap: Pixmap,
}

impl VectorCanvas {
    /// Creates a canvas of the given pixel size. Returns `None` for empty
    /// dimensions.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Option<Self> {
        Some(Self {
            pixmap: Pixmap::new(width, height)?,
        })
    }

    /// Resizes the canvas if the target region's size changed, clearing it
    /// in that case. Returns `false` for empty regions.
    pub fn fit(&mut self, region: &PixelRegion<'_>) -> bool {
        let (w, h) = (region.width(), region.height());
        if w <= 0 || h <= 0 {
            return false;
        }
        #[expect(clippy::cast_sign_loss, reason = "checked non-negative above")]
        let (w, h) = (w as u32, h as u32);
        if self.pixmap.width() != w || self.pixmap.height() != h {
            match Pixmap::new(w, h) {
                Some(p) => self.pixmap = p,
                None => return false,
            }
        }
        true
    }

    /// The underlying pixmap, for `tiny-skia` drawing calls.
    pub fn pixmap_mut(&mut self) -> &mut Pixmap {
        &mut self.pixmap
    }

    /// Copies the canvas into `region`, converting premultiplied RGBA to
    /// ARGB8888. The copy covers the overlap of the two sizes.
    pub fn blit(&self, region: &mut PixelRegion<'_>) {
        let height = region.height().min(self.pixmap.height().cast_signed());
        let width = region.width().min(self.pixmap.width().cast_signed());
        if height <= 0 || width <= 0 {
            return;
        }
        let src = self.pixmap.data();
        let src_stride = self.pixmap.width() as usize * 4;
        for y in 0..height {
            let row = region.row_argb_mut(y);
            let src_row = &src[y as usize * src_stride..];
            for (x, dst) in row.iter_mut().enumerate().take(width as usize) {
                let p = &src_row[x * 4..x * 4 + 4];
                *dst = (u32::from(p[3]) << 24)
                    | (u32::from(p[0]) << 16)
                    | (u32::from(p[1]) << 8)
                    | u32::from(p[2]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use casement_core::geometry::Rect;

    use super::*;

    #[test]
    fn blit_converts_rgba_to_argb() {
        let mut canvas = VectorCanvas::new(2, 1).unwrap();
        canvas
            .pixmap_mut()
            .fill(tiny_skia::Color::from_rgba8(0x10, 0x20, 0x30, 0xff));

        let mut pixels = vec![0_u8; 4 * 4];
        let mut region = PixelRegion::new(&mut pixels, 16, Rect::new(0, 0, 2, 1));
        canvas.blit(&mut region);

        let px = u32::from_le_bytes(pixels[0..4].try_into().unwrap());
        assert_eq!(px, 0xff10_2030);
    }

    #[test]
    fn fit_reallocates_only_on_size_change() {
        let mut canvas = VectorCanvas::new(4, 4).unwrap();
        let mut pixels = vec![0_u8; 4 * 4 * 4];

        let mut region = PixelRegion::new(&mut pixels, 16, Rect::new(0, 0, 4, 4));
        assert!(canvas.fit(&mut region));
        assert_eq!(canvas.pixmap_mut().width(), 4);

        let mut small = PixelRegion::new(&mut pixels, 16, Rect::new(0, 0, 2, 2));
        assert!(canvas.fit(&mut small));
        assert_eq!(canvas.pixmap_mut().width(), 2);
    }

    #[test]
    fn empty_region_is_rejected() {
        let mut canvas = VectorCanvas::new(4, 4).unwrap();
        let mut pixels = vec![0_u8; 16];
        let region = PixelRegion::new(&mut pixels, 16, Rect::ZERO);
        assert!(!canvas.fit(&region));
    }
}
