// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer hit testing.

use kurbo::Point;

use crate::node::{NodeId, NodeStore};
use crate::trail::Trail;

/// Options for a hit test.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct HitFlags {
    /// Also consider hidden nodes.
    pub include_invisible: bool,
}

/// Finds the trail under a point.
///
/// `point` is in the frame `root`'s bounds are expressed in, i.e. display
/// coordinates. Bounds must be validated before calling.
pub trait HitTest {
    /// Returns the trail to the top-most node under `point`, if any.
    fn hit_test(&self, scene: &NodeStore, root: NodeId, point: Point, flags: HitFlags)
    -> Option<Trail>;
}

/// Hit tests against validated node bounds.
///
/// A node is hit when the point lies inside its self bounds. Children are
/// tested before their parent, last child first, so the node painted on top
/// wins. Subtrees whose aggregate bounds miss the point are skipped.
#[derive(Clone, Copy, Debug, Default)]
pub struct BoundsHitTester;

impl HitTest for BoundsHitTester {
    fn hit_test(
        &self,
        scene: &NodeStore,
        root: NodeId,
        point: Point,
        flags: HitFlags,
    ) -> Option<Trail> {
        hit_node(scene, Trail::root(root), point, flags)
    }
}

fn hit_node(scene: &NodeStore, trail: Trail, point: Point, flags: HitFlags) -> Option<Trail> {
    let node = trail.leaf();
    if !flags.include_invisible && !scene.is_visible(node) {
        return None;
    }
    if !scene.bounds(node).contains(point) {
        return None;
    }
    let transform = scene.transform(node);
    if transform.determinant() == 0.0 {
        return None;
    }
    let local = transform.inverse() * point;

    let count = scene.child_count(node);
    for index in (0..count).rev() {
        let child = scene.child_at(node, index);
        let child_trail = trail.with_child(child, index as u32);
        if let Some(hit) = hit_node(scene, child_trail, local, flags) {
            return Some(hit);
        }
    }

    scene.self_bounds(node).contains(local).then_some(trail)
}
