// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! Weft keeps two kinds of dirty state. The geometry and paint flag families
//! on [`NodeStore`](crate::node::NodeStore) are hand-rolled because they
//! propagate *upward* with an early stop at already-marked ancestors. The
//! channels below use [`understory_dirty`] for the remaining, set-like
//! bookkeeping where a key only needs to be remembered once per frame.
//!
//! # Channels
//!
//! - [`TOPOLOGY`]: marked by every structural mutation of the node tree
//!   (children, renderer, visibility). Draining it tells the display whether
//!   the instance tree needs to be re-synced this frame.
//! - [`TRANSFORM`]: marked on the node whose local transform changed. The
//!   display drains these as the frame's *dirty transform roots* and notifies
//!   transform watchers once each.
//! - [`PAINT`]: keyed by instance slot, not node slot. Marking is
//!   idempotent, so draining yields each affected instance exactly once even
//!   when it was reached through several paint-dirty ancestors.
//!
//! None of these channels propagate; all are marked with the default policy.

use understory_dirty::Channel;

/// Node tree structure changed (children, renderer, or visibility).
pub const TOPOLOGY: Channel = Channel::new(0);

/// A node's local transform changed.
pub const TRANSFORM: Channel = Channel::new(1);

/// An instance's drawable must be repainted.
pub const PAINT: Channel = Channel::new(2);
