// Copyright 2026 the Shroud Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and JSON export for shroud diagnostics.
//!
//! This crate provides [`TraceSink`](shroud_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: an in-memory event log whose handle stays
//!   readable after the sink is moved into a compositor.
//! - [`json::export`]: writes recorded events as Chrome Trace Event Format
//!   JSON, one instant event per trace event in recording order.

pub mod json;
pub mod pretty;
pub mod recorder;
