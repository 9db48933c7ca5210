// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Surface identity types.

use core::fmt;

/// Sentinel value indicating "no surface" in raw index fields.
pub const INVALID: u32 = u32::MAX;

/// A handle to a surface in a [`SurfaceStore`](super::SurfaceStore).
///
/// Contains both a slot index and a generation counter so that stale handles
/// can be detected after a surface is destroyed and the slot is reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId {
    /// Slot index into the store's arrays.
    pub(crate) idx: u32,
    /// Generation counter, must match the store's generation for this slot.
    pub(crate) generation: u32,
}

impl SurfaceId {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SurfaceId({}@gen{})", self.idx, self.generation)
    }
}

/// An opaque identity for one back buffer handed out by a
/// [`PresentTarget`](crate::backend::PresentTarget).
///
/// Buffer ids are assigned by the backend; core passes them back verbatim
/// when presenting.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub u32);

impl fmt::Debug for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BufferId({})", self.0)
    }
}
