// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property-based tests for block stitching and bounds validation.
//!
//! 1. A fresh install produces exactly the maximal partition.
//! 2. Any sequence of edits, stitched one at a time, keeps the partition
//!    valid and maximal.
//! 3. The same edits stitched in one batch reach the same block count.
//! 4. Re-installing an unchanged order does nothing.
//! 5. Inserting a drawable and removing it again restores the same blocks.
//! 6. Validated bounds equal a from-scratch recomputation, before and after
//!    random invalidations.

use kurbo::{Affine, Rect};
use proptest::prelude::*;
use proptest::sample::Index;

use weft_core::bounds::{self, NOTHING};
use weft_core::{
    Backbone, DrawableId, NodeId, NodeStore, PaintDrawable, Renderer, StitchOutcome, Surface,
};

// ── Helpers ─────────────────────────────────────────────────────────────

struct Paint(Renderer);

impl PaintDrawable for Paint {
    fn renderer(&self) -> Renderer {
        self.0
    }

    fn mark_dirty(&mut self) {}

    fn dispose(&mut self) {}
}

struct Target;

impl Surface for Target {
    fn dispose(&mut self) {}
}

type Spine = Backbone<Paint, Target>;

/// The drawable order as the test sees it.
type Model = Vec<(DrawableId, Renderer)>;

#[derive(Clone, Debug)]
enum Edit {
    Insert(Index, Renderer),
    Remove(Index),
    Move(Index, Index),
    Recolor(Index, Renderer),
}

fn renderer() -> impl Strategy<Value = Renderer> {
    prop::sample::select(Renderer::ALL.to_vec())
}

fn edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        (any::<Index>(), renderer()).prop_map(|(at, r)| Edit::Insert(at, r)),
        any::<Index>().prop_map(Edit::Remove),
        (any::<Index>(), any::<Index>()).prop_map(|(from, to)| Edit::Move(from, to)),
        (any::<Index>(), renderer()).prop_map(|(at, r)| Edit::Recolor(at, r)),
    ]
}

fn expected_blocks(renderers: &[Renderer]) -> usize {
    if renderers.is_empty() {
        return 0;
    }
    1 + renderers
        .windows(2)
        .filter(|pair| Renderer::needs_gap(pair[0], pair[1]))
        .count()
}

fn renderers_of(model: &Model) -> Vec<Renderer> {
    model.iter().map(|&(_, r)| r).collect()
}

fn acquire(spine: &mut Spine, renderer: Renderer) -> DrawableId {
    spine.acquire_drawable(renderer, 0, Paint(renderer))
}

fn install(spine: &mut Spine, model: &Model) -> StitchOutcome {
    let order: Vec<DrawableId> = model.iter().map(|&(d, _)| d).collect();
    spine.set_order(&order);
    let intervals = spine.change_intervals();
    let outcome = spine.stitch(&intervals);
    for &block in &outcome.created {
        spine.attach_surface(block, Target);
    }
    outcome
}

fn build(renderers: &[Renderer]) -> (Spine, Model) {
    let mut spine = Spine::new();
    let model: Model = renderers
        .iter()
        .map(|&r| (acquire(&mut spine, r), r))
        .collect();
    let _ = install(&mut spine, &model);
    (spine, model)
}

fn apply(spine: &mut Spine, model: &mut Model, edit: &Edit) {
    match *edit {
        Edit::Insert(at, r) => {
            let pos = at.index(model.len() + 1);
            let d = acquire(spine, r);
            model.insert(pos, (d, r));
        }
        Edit::Remove(at) => {
            if model.is_empty() {
                return;
            }
            let (d, _) = model.remove(at.index(model.len()));
            spine.retire_drawable(d);
        }
        Edit::Move(from, to) => {
            if model.is_empty() {
                return;
            }
            let item = model.remove(from.index(model.len()));
            let pos = to.index(model.len() + 1);
            model.insert(pos, item);
        }
        Edit::Recolor(at, r) => {
            if model.is_empty() {
                return;
            }
            let pos = at.index(model.len());
            spine.retire_drawable(model[pos].0);
            model[pos] = (acquire(spine, r), r);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Fresh installs are maximal
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn fresh_install_is_maximal(renderers in prop::collection::vec(renderer(), 0..40)) {
        let mut spine = Spine::new();
        let model: Model = renderers
            .iter()
            .map(|&r| (acquire(&mut spine, r), r))
            .collect();
        let outcome = install(&mut spine, &model);

        prop_assert_eq!(spine.audit(), Ok(()));
        prop_assert_eq!(spine.block_count(), expected_blocks(&renderers));
        prop_assert_eq!(outcome.created.len(), expected_blocks(&renderers));
        prop_assert!(outcome.disposed.is_empty());
        prop_assert_eq!(outcome.added as usize, renderers.len());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Incremental edits keep the partition valid
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn edits_keep_the_partition_valid(
        initial in prop::collection::vec(renderer(), 0..24),
        edits in prop::collection::vec(edit(), 1..16),
    ) {
        let (mut spine, mut model) = build(&initial);
        for edit in &edits {
            apply(&mut spine, &mut model, edit);
            let _ = install(&mut spine, &model);
            prop_assert_eq!(spine.audit(), Ok(()), "after {:?}", edit);
            prop_assert_eq!(spine.block_count(), expected_blocks(&renderers_of(&model)));
            prop_assert_eq!(spine.blocks().len(), spine.block_count());
        }
        prop_assert_eq!(spine.drawables().len(), model.len());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Batched edits reach the same partition
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn batched_edits_match_a_fresh_partition(
        initial in prop::collection::vec(renderer(), 0..24),
        edits in prop::collection::vec(edit(), 1..16),
    ) {
        let (mut spine, mut model) = build(&initial);
        for edit in &edits {
            apply(&mut spine, &mut model, edit);
        }
        let outcome = install(&mut spine, &model);

        prop_assert_eq!(spine.audit(), Ok(()));
        prop_assert_eq!(spine.block_count(), expected_blocks(&renderers_of(&model)));
        prop_assert!(outcome.created.iter().all(|&b| spine.is_block_alive(b)));
        prop_assert!(outcome.disposed.iter().all(|&b| !spine.is_block_alive(b)));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Re-installing is a no-op
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn reinstall_is_a_noop(
        initial in prop::collection::vec(renderer(), 0..24),
        edits in prop::collection::vec(edit(), 0..8),
    ) {
        let (mut spine, mut model) = build(&initial);
        for edit in &edits {
            apply(&mut spine, &mut model, edit);
        }
        let _ = install(&mut spine, &model);
        let blocks: Vec<_> = spine.block_order().collect();

        let outcome = install(&mut spine, &model);
        prop_assert!(outcome.is_noop(), "{:?}", outcome);
        prop_assert_eq!(outcome.intervals, 0);
        prop_assert_eq!(spine.block_order().collect::<Vec<_>>(), blocks);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Unglue then glue restores the block set
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn insert_then_remove_restores_blocks(
        initial in prop::collection::vec(renderer(), 1..24),
        at in any::<Index>(),
        r in renderer(),
    ) {
        let (mut spine, mut model) = build(&initial);
        let mut before: Vec<_> = spine.block_order().collect();
        before.sort();

        let pos = at.index(model.len() + 1);
        let d = acquire(&mut spine, r);
        model.insert(pos, (d, r));
        let _ = install(&mut spine, &model);
        prop_assert_eq!(spine.audit(), Ok(()));

        let _ = model.remove(pos);
        spine.retire_drawable(d);
        let outcome = install(&mut spine, &model);
        prop_assert_eq!(spine.audit(), Ok(()));
        let mut after: Vec<_> = spine.block_order().collect();
        after.sort();
        prop_assert_eq!(after, before);
        prop_assert!(outcome.created.is_empty(), "{:?}", outcome);
        prop_assert_eq!(outcome.removed, 1);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Bounds validation matches a naive recomputation
// ═════════════════════════════════════════════════════════════════════════

/// One generated node: parent pick, optional self bounds, translation.
type NodeSpec = (Index, Option<(i32, i32, i32, i32)>, (i32, i32));

fn node_spec() -> impl Strategy<Value = NodeSpec> {
    (
        any::<Index>(),
        prop::option::of((0..50, 0..50, 1..20, 1..20)),
        (-10..10, -10..10),
    )
}

fn rect_of(spec: Option<(i32, i32, i32, i32)>) -> Rect {
    spec.map_or(NOTHING, |(x, y, w, h)| {
        Rect::new(
            f64::from(x),
            f64::from(y),
            f64::from(x + w),
            f64::from(y + h),
        )
    })
}

fn build_scene(specs: &[NodeSpec]) -> (NodeStore, Vec<NodeId>) {
    let mut scene = NodeStore::new();
    let mut nodes = Vec::with_capacity(specs.len());
    for (k, &(parent, rect, (tx, ty))) in specs.iter().enumerate() {
        let node = scene.create_node();
        if k > 0 {
            let parent = nodes[parent.index(k)];
            scene.add_child(parent, node);
        }
        scene.invalidate_self(node, rect_of(rect));
        scene.set_transform(node, Affine::translate((f64::from(tx), f64::from(ty))));
        nodes.push(node);
    }
    (scene, nodes)
}

fn naive_bounds(scene: &NodeStore, node: NodeId) -> Rect {
    let children = scene
        .children(node)
        .map(|child| naive_bounds(scene, child))
        .fold(NOTHING, bounds::union);
    let local = bounds::union(scene.self_bounds(node), children);
    bounds::transform_bounds(scene.transform(node), local)
}

proptest! {
    #[test]
    fn validated_bounds_match_naive_recomputation(
        specs in prop::collection::vec(node_spec(), 1..24),
        changes in prop::collection::vec(node_spec(), 0..8),
    ) {
        let (mut scene, nodes) = build_scene(&specs);
        let root = nodes[0];
        let passes = scene.validate_bounds(root);
        prop_assert!(passes <= 1);
        for &node in &nodes {
            prop_assert_eq!(scene.bounds(node), naive_bounds(&scene, node));
        }

        // Re-dirty a few nodes; the first component picks the node.
        for &(pick, rect, (tx, ty)) in &changes {
            let node = nodes[pick.index(nodes.len())];
            scene.invalidate_self(node, rect_of(rect));
            scene.set_transform(node, Affine::translate((f64::from(tx), f64::from(ty))));
        }
        let _ = scene.validate_bounds(root);
        prop_assert!(!scene.is_bounds_dirty(root));
        for &node in &nodes {
            prop_assert_eq!(scene.bounds(node), naive_bounds(&scene, node));
        }
    }
}
