// Copyright 2025 the Boxsift Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simultaneous descent of two trees, reporting overlapping element pairs.
//!
//! This is the broad phase between two box sets: node pairs whose boxes are separated
//! are pruned together, so the cost follows the number of nearby pairs rather than the
//! product of the set sizes.

use alloc::vec;
use alloc::vec::Vec;

use crate::set::BoxSet;
use crate::tree::{Kind, NodeIdx, Tree};
use crate::types::{Aabb, Scalar, area};

/// Predicates steering [`select_pairs`] and [`select_self_pairs`].
pub trait PairSelector<T: Scalar, const D: usize> {
    /// Whether the node pair `(a, b)` can be skipped entirely.
    fn reject_node_pair(&self, a: &Aabb<T, D>, b: &Aabb<T, D>) -> bool {
        a.is_out(b)
    }

    /// Called for every candidate element pair; `i` indexes the first set, `j` the
    /// second. Returns whether the pair was accepted.
    fn accept_pair(&mut self, i: usize, j: usize) -> bool;

    /// Ends the traversal early when true. Checked before every node pair.
    fn stop(&self) -> bool {
        false
    }
}

/// Report every candidate pair between `tree_a` and `tree_b` to `selector` and return
/// how many it accepted.
pub fn select_pairs<T, const D: usize, P>(
    tree_a: &Tree<T, D>,
    tree_b: &Tree<T, D>,
    selector: &mut P,
) -> usize
where
    T: Scalar,
    P: PairSelector<T, D> + ?Sized,
{
    let (Some(a), Some(b)) = (tree_a.root(), tree_b.root()) else {
        return 0;
    };
    descend(tree_a, tree_b, (a, b), false, selector)
}

/// Report every candidate pair within one tree. Each unordered pair is reported once,
/// as `(i, j)` with `i < j`, and no element is paired with itself.
pub fn select_self_pairs<T, const D: usize, P>(tree: &Tree<T, D>, selector: &mut P) -> usize
where
    T: Scalar,
    P: PairSelector<T, D> + ?Sized,
{
    let Some(root) = tree.root() else {
        return 0;
    };
    descend(tree, tree, (root, root), true, selector)
}

fn descend<T, const D: usize, P>(
    tree_a: &Tree<T, D>,
    tree_b: &Tree<T, D>,
    start: (NodeIdx, NodeIdx),
    same: bool,
    selector: &mut P,
) -> usize
where
    T: Scalar,
    P: PairSelector<T, D> + ?Sized,
{
    let mut accepted = 0;
    let mut stack = vec![start];
    while let Some((ia, ib)) = stack.pop() {
        if selector.stop() {
            break;
        }
        let (na, nb) = (tree_a.node(ia), tree_b.node(ib));

        // A node against itself: only meaningful within one tree.
        if same && ia == ib {
            match na.kind {
                Kind::Leaf { begin, end } => {
                    for i in begin..end {
                        for j in i + 1..end {
                            if selector.accept_pair(i, j) {
                                accepted += 1;
                            }
                        }
                    }
                }
                Kind::Internal { left, right } => {
                    stack.push((right, right));
                    stack.push((left, right));
                    stack.push((left, left));
                }
            }
            continue;
        }

        if selector.reject_node_pair(na.aabb(), nb.aabb()) {
            continue;
        }
        match (na.kind, nb.kind) {
            (Kind::Leaf { begin: ab, end: ae }, Kind::Leaf { begin: bb, end: be }) => {
                for i in ab..ae {
                    for j in bb..be {
                        // Disjoint subtrees of one tree may meet in either order.
                        let pair = if same && j < i { (j, i) } else { (i, j) };
                        if selector.accept_pair(pair.0, pair.1) {
                            accepted += 1;
                        }
                    }
                }
            }
            (Kind::Internal { left, right }, Kind::Leaf { .. }) => {
                stack.push((right, ib));
                stack.push((left, ib));
            }
            (Kind::Leaf { .. }, Kind::Internal { left, right }) => {
                stack.push((ia, right));
                stack.push((ia, left));
            }
            (Kind::Internal { left: al, right: ar }, Kind::Internal { left: bl, right: br }) => {
                // Open the larger node first.
                if area(na.aabb()) >= area(nb.aabb()) {
                    stack.push((ar, ib));
                    stack.push((al, ib));
                } else {
                    stack.push((ia, br));
                    stack.push((ia, bl));
                }
            }
        }
    }
    accepted
}

/// Collects element pairs whose boxes overlap.
#[derive(Debug)]
pub struct BoxPairSelector<'a, T, const D: usize, SA: ?Sized, SB: ?Sized = SA> {
    set_a: &'a SA,
    set_b: &'a SB,
    pairs: Vec<(usize, usize)>,
    _scalar: core::marker::PhantomData<T>,
}

impl<'a, T, const D: usize, SA, SB> BoxPairSelector<'a, T, D, SA, SB>
where
    T: Scalar,
    SA: BoxSet<T, D> + ?Sized,
    SB: BoxSet<T, D> + ?Sized,
{
    /// Pair elements of `set_a` with elements of `set_b`.
    pub fn new(set_a: &'a SA, set_b: &'a SB) -> Self {
        Self {
            set_a,
            set_b,
            pairs: Vec::new(),
            _scalar: core::marker::PhantomData,
        }
    }

    /// Pairs collected so far, in traversal order.
    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    /// Forget collected pairs, keeping the allocation.
    pub fn clear(&mut self) {
        self.pairs.clear();
    }

    /// Consume the selector, returning the collected pairs.
    pub fn into_pairs(self) -> Vec<(usize, usize)> {
        self.pairs
    }

    /// Run the broad phase between `tree_a` (built over `set_a`) and `tree_b` (built
    /// over `set_b`).
    pub fn select(&mut self, tree_a: &Tree<T, D>, tree_b: &Tree<T, D>) -> usize {
        select_pairs(tree_a, tree_b, self)
    }
}

impl<'a, T, const D: usize, S> BoxPairSelector<'a, T, D, S, S>
where
    T: Scalar,
    S: BoxSet<T, D> + ?Sized,
{
    /// Pair elements of one set with each other.
    pub fn new_same(set: &'a S) -> Self {
        Self::new(set, set)
    }

    /// Run the broad phase of `tree` against itself, reporting `(i, j)` with `i < j`.
    pub fn select_self(&mut self, tree: &Tree<T, D>) -> usize {
        select_self_pairs(tree, self)
    }
}

impl<T, const D: usize, SA, SB> PairSelector<T, D> for BoxPairSelector<'_, T, D, SA, SB>
where
    T: Scalar,
    SA: BoxSet<T, D> + ?Sized,
    SB: BoxSet<T, D> + ?Sized,
{
    fn accept_pair(&mut self, i: usize, j: usize) -> bool {
        if self.set_a.aabb(i).is_out(&self.set_b.aabb(j)) {
            return false;
        }
        self.pairs.push((i, j));
        true
    }
}
