// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Incremental scene-graph rendering core.
//!
//! `weft_core` turns a mutable scene of nodes into a small, stable set of
//! render targets. It tracks which geometry and paint are stale, mirrors the
//! scene as one instance per rendered path, lays the instances' drawables
//! out in paint order, and groups runs of compatible drawables into blocks,
//! each backed by one physical surface. Between frames only the parts of the
//! block partition touched by a change are rebuilt. It is `no_std`
//! compatible (with `alloc`).
//!
//! # Architecture
//!
//! ```text
//!   NodeStore mutations ──► dirty flags + TOPOLOGY/TRANSFORM channels
//!                                  │
//!                                  ▼
//!   Display::update_display()
//!       validate bounds ──► sync instances ──► transform watchers
//!                                  │
//!                                  ▼
//!       dispose ──► Backbone::set_order() ──► change_intervals()
//!                                  │
//!                                  ▼
//!       Backbone::stitch() ──► StitchOutcome ──► surfaces (Backend)
//!                                  │
//!                                  ▼
//!       cursor ──► resize ──► Backend::present(RenderChanges)
//! ```
//!
//! **[`node`]**: struct-of-arrays scene DAG with generational handles and
//! the bounds/paint invalidation algebra.
//!
//! **[`trail`]** and **[`instance`]**: a trail names one path from a root to
//! a node; an instance is the display's state for one trail.
//!
//! **[`drawable`]**, **[`block`]** and **[`backbone`]**: arenas for drawables
//! and blocks, and the linked drawable order they live in.
//!
//! **[`interval`]** and **[`stitch`]**: change intervals between two orders,
//! and the pass that repairs the block partition inside them.
//!
//! **[`audit`]**: a side-effect-free check of the partition invariants.
//!
//! **[`display`]**: the per-frame orchestrator.
//!
//! **[`backend`]** and **[`hit`]**: the seams platform code implements.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! update instrumentation, with a zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-block
//!   change events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

mod handle;

pub mod audit;
pub mod backbone;
pub mod backend;
pub mod block;
pub mod bounds;
pub mod dirty;
pub mod display;
pub mod drawable;
pub mod hit;
pub mod instance;
pub mod interval;
pub mod node;
pub mod renderer;
pub mod stitch;
pub mod trace;
pub mod trail;

pub use audit::AuditError;
pub use backbone::Backbone;
pub use backend::{Backend, Cursor, PaintDrawable, Surface};
pub use block::BlockId;
pub use display::{Display, DisplayConfig, RenderChanges};
pub use drawable::DrawableId;
pub use hit::{BoundsHitTester, HitFlags, HitTest};
pub use instance::InstanceId;
pub use interval::ChangeInterval;
pub use node::{NodeId, NodeStore, PaintDamage};
pub use renderer::Renderer;
pub use stitch::StitchOutcome;
pub use trail::Trail;
