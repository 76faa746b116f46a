// Copyright 2025 the Boxsift Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Depth-first selection over a [`Tree`].
//!
//! A [`Selector`] decides which subtrees to prune and which leaf elements to keep;
//! [`select`] drives the traversal. Selectors own their state, and the traversal only
//! reads the tree, so any number of selectors may walk the same tree concurrently.

use alloc::vec;
use alloc::vec::Vec;

use crate::set::BoxSet;
use crate::tree::{Kind, Tree};
use crate::types::{Aabb, Scalar};

/// Predicates steering a [`select`] traversal.
pub trait Selector<T: Scalar, const D: usize> {
    /// Node-level test against the node box `[min, max]`.
    ///
    /// Returns `(is_rejected, is_fully_inside)`. A rejected subtree is skipped; a
    /// subtree reported fully inside is not tested again below this node.
    fn reject_node(&self, min: &[T; D], max: &[T; D]) -> (bool, bool);

    /// Whether a fully-inside verdict lets the subtree skip per-element checks.
    fn accept_metric(&self, is_fully_inside: bool) -> bool {
        is_fully_inside
    }

    /// Precise per-element rejection.
    fn reject_element(&self, index: usize) -> bool;

    /// Called for every element of every visited leaf. Returns whether the element
    /// was accepted.
    fn accept(&mut self, index: usize, is_fully_inside: bool) -> bool;

    /// Ends the traversal early when true. Checked before every node.
    fn stop(&self) -> bool {
        false
    }
}

/// Walk `tree` depth-first, left child first, and return how many elements `selector`
/// accepted.
pub fn select<T, const D: usize, S>(tree: &Tree<T, D>, selector: &mut S) -> usize
where
    T: Scalar,
    S: Selector<T, D> + ?Sized,
{
    let Some(root) = tree.root() else {
        return 0;
    };
    let root_box = tree.node(root).aabb();
    let (rejected, inside) = selector.reject_node(&root_box.min, &root_box.max);
    if rejected {
        return 0;
    }
    let mut accepted = 0;
    let mut stack = vec![(root, selector.accept_metric(inside))];
    while let Some((idx, inside)) = stack.pop() {
        if selector.stop() {
            break;
        }
        match tree.node(idx).kind {
            Kind::Leaf { begin, end } => {
                for i in begin..end {
                    if selector.accept(i, inside) {
                        accepted += 1;
                    }
                }
            }
            Kind::Internal { left, right } => {
                for child in [right, left] {
                    if inside {
                        stack.push((child, true));
                        continue;
                    }
                    let b = tree.node(child).aabb();
                    let (rejected, child_inside) = selector.reject_node(&b.min, &b.max);
                    if !rejected {
                        stack.push((child, selector.accept_metric(child_inside)));
                    }
                }
            }
        }
    }
    accepted
}

/// Collects every element whose box overlaps a query box.
///
/// The result may over-report only in the sense that boxes, not exact shapes, are
/// compared: every element whose box touches the query is returned.
#[derive(Debug)]
pub struct BoxSelector<'a, T, const D: usize, S: ?Sized> {
    set: &'a S,
    query: Aabb<T, D>,
    indices: Vec<usize>,
}

impl<'a, T, const D: usize, S> BoxSelector<'a, T, D, S>
where
    T: Scalar,
    S: BoxSet<T, D> + ?Sized,
{
    /// Create a selector over `set` (the set the tree was built from) for `query`.
    pub fn new(set: &'a S, query: Aabb<T, D>) -> Self {
        Self {
            set,
            query,
            indices: Vec::new(),
        }
    }

    /// The query box.
    pub fn query(&self) -> &Aabb<T, D> {
        &self.query
    }

    /// Replace the query box. Collected indices are kept.
    pub fn set_query(&mut self, query: Aabb<T, D>) {
        self.query = query;
    }

    /// Forget collected indices, keeping the allocation for the next query.
    pub fn clear(&mut self) {
        self.indices.clear();
    }

    /// Indices collected so far, in traversal order.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Consume the selector, returning the collected indices.
    pub fn into_indices(self) -> Vec<usize> {
        self.indices
    }

    /// Run the query against `tree`, appending to the collected indices.
    pub fn select(&mut self, tree: &Tree<T, D>) -> usize {
        select(tree, self)
    }
}

impl<T, const D: usize, S> Selector<T, D> for BoxSelector<'_, T, D, S>
where
    T: Scalar,
    S: BoxSet<T, D> + ?Sized,
{
    fn reject_node(&self, min: &[T; D], max: &[T; D]) -> (bool, bool) {
        let (inside, overlap) = self.query.contains(min, max);
        (!overlap, inside)
    }

    fn reject_element(&self, index: usize) -> bool {
        self.set.aabb(index).is_out(&self.query)
    }

    fn accept(&mut self, index: usize, is_fully_inside: bool) -> bool {
        if is_fully_inside || !self.reject_element(index) {
            self.indices.push(index);
            return true;
        }
        false
    }
}

/// Collects every element whose box contains a point.
#[derive(Debug)]
pub struct PointSelector<'a, T, const D: usize, S: ?Sized> {
    set: &'a S,
    point: [T; D],
    indices: Vec<usize>,
}

impl<'a, T, const D: usize, S> PointSelector<'a, T, D, S>
where
    T: Scalar,
    S: BoxSet<T, D> + ?Sized,
{
    /// Create a selector over `set` for `point`.
    pub fn new(set: &'a S, point: [T; D]) -> Self {
        Self {
            set,
            point,
            indices: Vec::new(),
        }
    }

    /// Replace the query point. Collected indices are kept.
    pub fn set_point(&mut self, point: [T; D]) {
        self.point = point;
    }

    /// Forget collected indices.
    pub fn clear(&mut self) {
        self.indices.clear();
    }

    /// Indices collected so far.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Run the query against `tree`, appending to the collected indices.
    pub fn select(&mut self, tree: &Tree<T, D>) -> usize {
        select(tree, self)
    }
}

impl<T, const D: usize, S> Selector<T, D> for PointSelector<'_, T, D, S>
where
    T: Scalar,
    S: BoxSet<T, D> + ?Sized,
{
    fn reject_node(&self, min: &[T; D], max: &[T; D]) -> (bool, bool) {
        (!Aabb::new(*min, *max).contains_point(&self.point), false)
    }

    fn reject_element(&self, index: usize) -> bool {
        !self.set.aabb(index).contains_point(&self.point)
    }

    fn accept(&mut self, index: usize, _is_fully_inside: bool) -> bool {
        if self.reject_element(index) {
            return false;
        }
        self.indices.push(index);
        true
    }
}
