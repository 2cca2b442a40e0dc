// Copyright 2026 the Shroud Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! UIKit host for shroud.
//!
//! [`UiKitHost`] implements [`Host`](shroud_core::host::Host) on iOS. Each
//! protected surface is the first sublayer of a hidden `UITextField` with
//! `secureTextEntry` set. The system compositor leaves that canvas out of
//! screenshots, screen recordings and mirroring, so content drawn into a
//! `CALayer` hung off it stays on the device's own display.
//!
//! - **[`UiKitHost`]**: widget lifecycle, content children and the
//!   protected refresh (`setNeedsDisplay` + `layoutIfNeeded` +
//!   `CATransaction::flush`)
//! - **`image`**: wraps rendered frames as `CGImage` layer contents
//!
//! All methods must be called on the main thread; construction requires a
//! [`MainThreadMarker`](objc2::MainThreadMarker).

#![no_std]
#![expect(unsafe_code, reason = "UIKit and Core Graphics bindings require unsafe calls")]

extern crate alloc;

mod host;
mod image;

pub use host::{SECURE_TEXT_CANVAS, UiKitHost};
