// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing and JSON snapshots for casement diagnostics.
//!
//! This crate provides [`TraceSink`](casement_core::trace::TraceSink)
//! implementations and tree dumps for development and post-mortem analysis:
//!
//! - [`pretty::print_tree`] — indented one-line-per-surface tree dump.
//! - [`pretty::PrettyPrintSink`] — human-readable one-line-per-event trace
//!   output.
//! - [`snapshot::snapshot`] — JSON serialization of a subtree for diffing
//!   and bug reports.

pub mod pretty;
pub mod snapshot;
