// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event routing: geometric hit testing plus the pointer focus and grab
//! state machine, layered on the surface tree and the allocation results.

mod find;
mod router;

pub use find::find_surface;
pub use router::PointerRouter;
