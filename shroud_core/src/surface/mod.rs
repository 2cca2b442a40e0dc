// Copyright 2026 the Shroud Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Protected surface handles and storage.

mod id;
pub(crate) mod store;

pub use id::SurfaceId;
pub use store::RenderState;
