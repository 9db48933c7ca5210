// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Display output identification.
//!
//! [`OutputId`] is a lightweight handle identifying a specific monitor.
//! Backends assign these; core treats them as opaque.

use core::fmt;

use crate::geometry::Size;

/// Identifies a specific display output.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct OutputId(pub u32);

impl fmt::Debug for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OutputId({})", self.0)
    }
}

/// One monitor's descriptor as reported by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputInfo {
    /// Backend-assigned identity.
    pub id: OutputId,
    /// Current mode in pixels.
    pub mode: Size,
    /// Integer scale factor.
    pub scale: i32,
}
