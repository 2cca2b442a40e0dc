// Copyright 2026 the Shroud Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Capture-excluded rendering surfaces.
//!
//! `shroud_core` displays images, animations and text on screen while
//! keeping them out of the platform's screen-capture, recording and
//! mirroring pipelines. It does so by borrowing the surface a host platform
//! allocates for sensitive text entry (which the system compositor already
//! leaves out of captured frame buffers), hiding the owning widget's chrome,
//! and drawing arbitrary content into that surface.
//!
//! The crate is `no_std` compatible (with `alloc`). Platform access goes
//! through the [`Host`](host::Host) trait and rasterization through the
//! [`Rasterizer`](render::Rasterizer) trait, so the whole mechanism,
//! including its fail-closed paths, runs against simulated hosts in tests.
//!
//! # Architecture
//!
//! ```text
//!   view property change (SecureImageView / SecureLabel)
//!       │
//!       ▼
//!   SecureCompositor ──► SurfaceFactory ──► Host::acquire (once per view)
//!       │
//!       ▼
//!   ContentAdapter ──► Rasterizer ──► Host::set_child_contents
//!       │                                  (surface marked Dirty)
//!       ▼
//!   CaptureGuard ──► Host::refresh_protected ──► Clean
//! ```
//!
//! **factory** mints [`SurfaceId`]s. It probes the platform once,
//! refuses to create anything on unsupported platforms, and keeps a surface
//! only if the host reports it capture-excluded.
//!
//! **[`adapter`]** keeps each surface's single content child in sync with
//! its [`Drawable`], keyed by content digest and pixel size, with an
//! allocation fallback chain that never shows the payload unprotected.
//!
//! **[`guard`]** commits every content change through the host's protected
//! refresh path before returning, and empties a surface whose protection
//! classification changes.
//!
//! **[`timer`]** drives animated drawables from the host's frame callback.
//!
//! **[`view`]** provides [`SecureImageView`](view::SecureImageView) and
//! [`SecureLabel`](view::SecureLabel).
//!
//! **[`trace`]** provides the [`TraceSink`](trace::TraceSink) trait and the
//! zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod adapter;
pub mod capability;
mod compositor;
pub mod config;
pub mod content;
pub mod digest;
pub mod error;
mod factory;
pub mod guard;
pub mod host;
pub mod render;
pub mod surface;
pub mod time;
pub mod timer;
pub mod trace;
pub mod view;

#[cfg(test)]
mod testing;

pub use adapter::ContentOutcome;
pub use compositor::SecureCompositor;
pub use config::ShroudConfig;
pub use content::Drawable;
pub use error::SurfaceError;
pub use surface::SurfaceId;
