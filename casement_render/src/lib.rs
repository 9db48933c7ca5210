// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Damage tracking and the surface draw dispatcher for casement.
//!
//! This crate turns queued redraw requests into presented frames:
//!
//! - [`damage`] — The [`DamageRegion`](damage::DamageRegion) accumulated
//!   over one redraw cycle and handed to the backend.
//! - [`dispatch`] — [`run_frame`](dispatch::run_frame): acquire a back
//!   buffer, swap the window's queues, walk each entry's non-culled subtree
//!   (configure before paint), merge damage, present.
//! - [`vector`] (feature `vector`) — A `tiny-skia` scratch canvas for paint
//!   callbacks that draw vectors instead of raw pixels.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `vector` (disabled by default): Enables the `tiny-skia` canvas helper.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod damage;
pub mod dispatch;
#[cfg(feature = "vector")]
pub mod vector;

pub use damage::DamageRegion;
pub use dispatch::{FrameResult, run_frame};
