// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node identity.

pub use crate::handle::INVALID;
use crate::handle::generational_handle;

generational_handle!(
    /// A handle to a node in a [`NodeStore`](super::NodeStore).
    ///
    /// Handles order by slot first, then generation, which lets
    /// [`Trail`](crate::trail::Trail)s act as ordered map keys.
    NodeId
);
