// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Events drained from the compositor connection, ready for the core.

use casement_core::backend::{ConfigureEvent, PointerEvent};
use casement_core::output::OutputInfo;

/// One translated compositor event.
///
/// The host drains these after each dispatch and feeds them to the
/// [`Display`](casement_core::display::Display) (pointer, configure) or its
/// frame loop (buffer release, frame callback).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BackendEvent {
    /// A pointer event for the managed window.
    Pointer(PointerEvent),
    /// The compositor configured the window (resize + serial ack already
    /// sent).
    Configure(ConfigureEvent),
    /// The user asked the window to close.
    CloseRequested,
    /// The compositor released one of the two shm buffers; a deferred frame
    /// can retry now.
    BufferReleased,
    /// The frame callback fired; it is a good time to draw.
    FrameReady,
    /// An output appeared or changed.
    Output(OutputInfo),
}
