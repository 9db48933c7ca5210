// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Spatial damage tracking for partial re-presentation.

use alloc::vec::Vec;

use casement_core::geometry::Rect;

/// A region of the window that changed this frame.
///
/// Backends forward this to the compositor so only the touched areas are
/// recomposited.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum DamageRegion {
    /// Nothing changed; the previous frame can be reused.
    #[default]
    None,
    /// A list of axis-aligned pixel rectangles that changed.
    Rects(Vec<Rect>),
    /// The entire window changed.
    Full,
}

impl DamageRegion {
    /// Returns `true` if no region changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Merges one rectangle. Empty rectangles are ignored.
    pub fn add(&mut self, rect: Rect) {
        if rect.is_empty() {
            return;
        }
        match self {
            Self::Full => {}
            Self::None => *self = Self::Rects(alloc::vec![rect]),
            Self::Rects(rects) => rects.push(rect),
        }
    }

    /// Escalates to full-window damage.
    pub fn add_full(&mut self) {
        *self = Self::Full;
    }

    /// Merges another damage region into this one.
    pub fn merge(&mut self, other: &Self) {
        match (&mut *self, other) {
            (Self::Full, _) => {}
            (_, Self::Full) => *self = Self::Full,
            (_, Self::None) => {}
            (Self::None, Self::Rects(_)) => *self = other.clone(),
            (Self::Rects(a), Self::Rects(b)) => a.extend_from_slice(b),
        }
    }

    /// Flattens into a rectangle list, using `bounds` for [`Full`](Self::Full).
    #[must_use]
    pub fn to_rects(&self, bounds: Rect) -> Vec<Rect> {
        match self {
            Self::None => Vec::new(),
            Self::Full => alloc::vec![bounds],
            Self::Rects(rects) => rects.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_collects_rects() {
        let mut damage = DamageRegion::None;
        assert!(damage.is_empty());

        damage.add(Rect::new(0, 0, 10, 10));
        damage.add(Rect::new(20, 0, 5, 5));
        assert_eq!(
            damage.to_rects(Rect::ZERO),
            alloc::vec![Rect::new(0, 0, 10, 10), Rect::new(20, 0, 5, 5)]
        );
    }

    #[test]
    fn empty_rects_are_ignored() {
        let mut damage = DamageRegion::None;
        damage.add(Rect::ZERO);
        assert!(damage.is_empty());
    }

    #[test]
    fn full_swallows_everything() {
        let mut damage = DamageRegion::None;
        damage.add(Rect::new(0, 0, 10, 10));
        damage.add_full();
        damage.add(Rect::new(1, 1, 2, 2));

        let bounds = Rect::new(0, 0, 100, 100);
        assert_eq!(damage.to_rects(bounds), alloc::vec![bounds]);
    }

    #[test]
    fn merge_combines_lists() {
        let mut a = DamageRegion::None;
        a.add(Rect::new(0, 0, 1, 1));
        let mut b = DamageRegion::None;
        b.add(Rect::new(2, 2, 1, 1));

        a.merge(&b);
        assert_eq!(a.to_rects(Rect::ZERO).len(), 2);

        a.merge(&DamageRegion::Full);
        assert_eq!(a, DamageRegion::Full);
    }
}
