// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend error type.

use thiserror::Error;

/// Anything that can go wrong while talking to the compositor.
#[derive(Debug, Error)]
pub enum WaylandBackendError {
    /// Connecting to the compositor socket failed.
    #[error("connecting to the wayland socket: {0}")]
    Connect(#[from] wayland_client::ConnectError),

    /// A required global is missing from the registry.
    #[error("compositor does not advertise {0}")]
    MissingGlobal(&'static str),

    /// Dispatching queued events failed.
    #[error("event dispatch: {0}")]
    Dispatch(#[from] wayland_client::DispatchError),

    /// The connection backend reported an I/O or protocol error.
    #[error("wayland connection: {0}")]
    Backend(#[from] wayland_client::backend::WaylandError),

    /// Creating or sizing the shared-memory pool failed.
    #[error("shm pool: {0}")]
    Shm(#[from] std::io::Error),
}
