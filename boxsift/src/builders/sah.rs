// Copyright 2025 the Boxsift Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Top-down builder using SAH-like splits.

use alloc::vec;
use alloc::vec::Vec;

use log::debug;

use crate::builder::{BuildConfig, BuildError, Builder};
use crate::set::{BoxSet, apply_order};
use crate::tree::{Node, NodeIdx, Tree};
use crate::types::{Aabb, Scalar, ScalarAcc, area, union_aabb};

/// Surface-area-heuristic builder.
///
/// Every range is sorted by centroid along each axis in turn and split where the
/// weighted areas of both halves are smallest. Produces tighter trees than
/// [`LinearBuilder`](super::LinearBuilder) at `O(n log² n)` build cost. The parallel
/// flag is accepted but this builder always runs on the calling thread, and a caller
/// root box is ignored since splits only compare element boxes.
#[derive(Clone, Debug, Default)]
pub struct SahBuilder {
    config: BuildConfig,
}

impl SahBuilder {
    /// Create a builder with the given limits.
    pub const fn new(config: BuildConfig) -> Self {
        Self { config }
    }
}

/// Per-element data the split search reads.
#[derive(Copy, Clone, Debug)]
struct Item<T, const D: usize> {
    index: usize,
    aabb: Aabb<T, D>,
    center: [T; D],
}

/// Stable sort by centroid along `axis`. Keys are compared with `f64::total_cmp`, so
/// NaN centroids sort to the ends instead of breaking the order.
fn sort_axis<T: Scalar, const D: usize>(items: &mut [Item<T, D>], axis: usize) {
    items.sort_by(|a, b| T::to_f64(a.center[axis]).total_cmp(&T::to_f64(b.center[axis])));
}

/// SAH-like split: sort along each axis, precompute prefix/suffix AABBs, and choose
/// `k` that minimizes `area(LB_k) * k + area(RB_k) * (n - k)`. Ties prefer the more
/// balanced split. Leaves `items` sorted along the winning axis and returns `k`.
fn split_sah<T: Scalar, const D: usize>(items: &mut [Item<T, D>]) -> usize {
    let n = items.len();
    debug_assert!(n >= 2, "SAH split requires at least 2 items");
    let mut best: Option<(ScalarAcc<T>, usize, usize)> = None;
    let mut prefix: Vec<Aabb<T, D>> = Vec::with_capacity(n);
    let mut suffix: Vec<Aabb<T, D>> = vec![Aabb::empty(); n];
    for axis in 0..D {
        sort_axis(items, axis);

        // Precompute prefix/suffix bboxes for O(1) split evaluation
        prefix.clear();
        let mut acc = items[0].aabb;
        for it in items.iter() {
            acc = union_aabb(acc, it.aabb);
            prefix.push(acc);
        }
        let mut acc = items[n - 1].aabb;
        for (i, it) in items.iter().enumerate().rev() {
            acc = union_aabb(it.aabb, acc);
            suffix[i] = acc;
        }

        for k in 1..n {
            let cost = area(&prefix[k - 1]) * T::acc_from_usize(k)
                + area(&suffix[k]) * T::acc_from_usize(n - k);
            let better = match best {
                None => true,
                Some((bc, bk, _)) => {
                    cost < bc || (cost == bc && n.abs_diff(2 * k) < n.abs_diff(2 * bk))
                }
            };
            if better {
                best = Some((cost, k, axis));
            }
        }
    }
    let Some((_, k, axis)) = best else {
        return n / 2;
    };
    if axis + 1 != D {
        sort_axis(items, axis);
    }
    k
}

impl Builder for SahBuilder {
    fn config(&self) -> &BuildConfig {
        &self.config
    }

    fn build_with_root<T, const D: usize, S>(
        &self,
        set: &mut S,
        _root: Option<Aabb<T, D>>,
    ) -> Result<Tree<T, D>, BuildError>
    where
        T: Scalar,
        S: BoxSet<T, D> + ?Sized,
    {
        self.config.validate()?;
        let n = set.len();
        if n == 0 {
            debug!("sah build over an empty set");
            return Ok(Tree::default());
        }
        let leaf_size = self.config.leaf_size();
        let max_depth = self.config.max_depth();
        let mut items: Vec<Item<T, D>> = (0..n)
            .map(|i| Item {
                index: i,
                aabb: set.aabb(i),
                center: core::array::from_fn(|a| set.center(i, a)),
            })
            .collect();

        // (slot, start, end, depth)
        let mut nodes = vec![Node::leaf(0, n, 0)];
        let mut stack = vec![(0_usize, 0_usize, n, 0_usize)];
        while let Some((slot, start, end, depth)) = stack.pop() {
            let len = end - start;
            if len <= leaf_size || depth >= max_depth {
                nodes[slot] = Node::leaf(start, end, depth);
                continue;
            }
            let mid = start + split_sah(&mut items[start..end]);
            let left = nodes.len();
            nodes.push(Node::leaf(start, mid, depth + 1));
            nodes.push(Node::leaf(mid, end, depth + 1));
            nodes[slot] = Node::internal(NodeIdx::new(left), NodeIdx::new(left + 1), depth);
            stack.push((left + 1, mid, end, depth + 1));
            stack.push((left, start, mid, depth + 1));
        }

        let order: Vec<usize> = items.iter().map(|it| it.index).collect();
        let sorted: Vec<Aabb<T, D>> = items.iter().map(|it| it.aabb).collect();
        apply_order(set, &order);
        let tree = Tree::assemble(nodes, &sorted);
        debug!(
            "sah build: {} elements, {} nodes, {} leaves, depth {}",
            n,
            tree.len(),
            tree.leaf_count(),
            tree.max_depth()
        );
        Ok(tree)
    }
}
