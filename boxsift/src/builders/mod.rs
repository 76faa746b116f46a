// Copyright 2025 the Boxsift Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Builder implementations.
//!
//! - `linear`: Morton-code LBVH. Sorts centroids along the Z-order curve with a radix
//!   sort and splits ranges where key bits flip. Fastest to build.
//! - `sah`: top-down surface-area-heuristic builder. Slower to build, tighter trees.
//!
//! SAH note
//! --------
//! For a split point `k` along a sorted axis we minimize:
//!
//! `cost(k) = area(LB_k) * k + area(RB_k) * (n - k)`
//!
//! where `LB_k` and `RB_k` are the bounding boxes of the first `k` and remaining `n - k` items.
//! We evaluate all `k` in O(n) per axis using prefix/suffix bounding boxes, and pick the lowest cost.
//! Accumulators are widened (`f32`→`f64`, `f64`→`f64`, `i64`→`i128`) for robust comparisons.
//!
//! Both builders finish the same way: the set is permuted once so that leaves cover
//! contiguous index ranges, then node boxes are computed bottom-up.

pub mod linear;
pub mod morton;
pub mod sah;

pub use linear::LinearBuilder;
pub use sah::SahBuilder;

/// Number of worker threads a parallel build may use.
#[cfg(feature = "std")]
pub(crate) fn available_workers() -> usize {
    std::thread::available_parallelism()
        .map(core::num::NonZero::get)
        .unwrap_or(1)
}

#[cfg(not(feature = "std"))]
pub(crate) fn available_workers() -> usize {
    1
}

#[cfg(test)]
pub(crate) mod testing {
    use alloc::vec::Vec;

    use rand::Rng;

    use crate::set::BoxSet;
    use crate::tree::Tree;
    use crate::types::{Aabb, Scalar};

    /// `count` boxes with corners in `[0, extent)` and sides up to `max_side`.
    pub(crate) fn random_boxes<const D: usize>(
        rng: &mut impl Rng,
        count: usize,
        extent: f64,
        max_side: f64,
    ) -> Vec<Aabb<f64, D>> {
        (0..count)
            .map(|_| {
                let min: [f64; D] = core::array::from_fn(|_| rng.random_range(0.0..extent));
                let max = min.map(|v| v + rng.random_range(0.0..max_side));
                Aabb::new(min, max)
            })
            .collect()
    }

    /// Sorted indices of every element whose box overlaps `query`.
    pub(crate) fn brute_force<T: Scalar, const D: usize, S: BoxSet<T, D> + ?Sized>(
        set: &S,
        query: &Aabb<T, D>,
    ) -> Vec<usize> {
        (0..set.len())
            .filter(|&i| !set.aabb(i).is_out(query))
            .collect()
    }

    /// Check partition, bounding, and depth invariants of a built tree.
    pub(crate) fn assert_invariants<T: Scalar, const D: usize, S: BoxSet<T, D> + ?Sized>(
        tree: &Tree<T, D>,
        set: &S,
        leaf_size: usize,
        max_depth: usize,
    ) {
        let n = set.len();
        assert_eq!(tree.element_count(), n, "tree must cover the whole set");
        assert!(tree.max_depth() <= max_depth, "depth bound violated");
        if n == 0 {
            assert!(tree.is_empty(), "empty set must give an empty tree");
            return;
        }
        let mut seen = alloc::vec![0_u32; n];
        for node in tree.nodes() {
            assert!(node.depth() <= max_depth, "node deeper than the limit");
            if let Some(range) = node.range() {
                assert!(!range.is_empty(), "leaves are never empty");
                assert!(
                    range.len() <= leaf_size || node.depth() == max_depth,
                    "oversized leaf above the depth limit"
                );
                for i in range {
                    seen[i] += 1;
                    let b = set.aabb(i);
                    assert_eq!(node.aabb().union(&b), *node.aabb(), "leaf box too small");
                }
            } else if let Some((l, r)) = node.children() {
                for c in [l, r] {
                    let child = tree.node(c);
                    assert_eq!(child.depth(), node.depth() + 1, "child depth");
                    assert_eq!(
                        node.aabb().union(child.aabb()),
                        *node.aabb(),
                        "internal box too small"
                    );
                }
            }
        }
        assert!(seen.iter().all(|&c| c == 1), "leaf ranges must tile 0..n");
    }
}
