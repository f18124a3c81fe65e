// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene graph data model.
//!
//! A *node* is a vertex of the scene DAG. Each node has:
//!
//! - An identity ([`NodeId`]), a generational handle that becomes stale when
//!   the node is destroyed.
//! - Topology: an ordered child list and a set of parents. A node may appear
//!   under several parents; every root-to-node path is a distinct
//!   [`Trail`](crate::Trail) and renders separately.
//! - **Local properties** set by the caller: [`transform`](NodeStore::set_transform),
//!   [`self bounds`](NodeStore::invalidate_self),
//!   [`renderer`](NodeStore::set_renderer), [`visibility`](NodeStore::set_visible)
//!   and [`cursor`](NodeStore::set_cursor).
//! - **Computed properties** produced by
//!   [`validate_bounds`](NodeStore::validate_bounds): `child_bounds` (union of
//!   the children's bounds, local frame) and `bounds` (transformed union of
//!   self and child bounds, parent frame).
//!
//! # Invalidation
//!
//! Geometry and paint each use a pair of flag families. Setting a node-local
//! flag walks upward setting the matching `child_*` flag on every ancestor,
//! stopping at the first ancestor that already has it. Validation walks down
//! from a root, only entering subtrees whose `child_*` flag is set, and clears
//! what it consumes.
//!
//! Coarser structural signals go through [`dirty`](crate::dirty) channels:
//!
//! - **TOPOLOGY**: edges, renderer, visibility and node lifetime. Drained by
//!   the display to decide whether the instance tree needs a resync.
//! - **TRANSFORM**: local transform writes. Drained by the display to notify
//!   transform watchers.

mod id;
mod invalidate;
mod store;
mod traverse;

pub use id::{INVALID, NodeId};
pub use invalidate::PaintDamage;
pub use store::{BoundsListener, DEFAULT_MAX_VALIDATION_PASSES, NodeDirty, NodeStore};
pub use traverse::{Children, Parents};
