// Copyright 2025 the Boxsift Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive sets: the caller-owned collections a [`Tree`](crate::Tree) is built over.

use alloc::vec::Vec;
use core::fmt::Debug;

use crate::types::{Aabb, Scalar};

/// An index-addressable collection of primitives with bounding boxes.
///
/// Builders never own geometry. They read boxes and centroids through this trait and
/// reorder the collection in place with [`BoxSet::swap`], so that after a build every
/// leaf of the tree covers a contiguous index range.
///
/// Implementations must answer consistently: the box reported for an index may only
/// change through `swap` while a tree built over the set is in use. Mutating boxes
/// afterwards silently invalidates that tree.
pub trait BoxSet<T: Scalar, const D: usize> {
    /// Number of primitives.
    fn len(&self) -> usize;

    /// Whether the set holds no primitives.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bounding box of the primitive at `index`.
    fn aabb(&self, index: usize) -> Aabb<T, D>;

    /// Centroid coordinate of the primitive at `index` along `axis`.
    ///
    /// Defaults to the center of its bounding box.
    fn center(&self, index: usize, axis: usize) -> T {
        self.aabb(index).center(axis)
    }

    /// Exchange the primitives at `a` and `b`.
    fn swap(&mut self, a: usize, b: usize);

    /// Union of all primitive boxes. Empty for an empty set.
    fn bounding_box(&self) -> Aabb<T, D> {
        let mut out = Aabb::empty();
        for i in 0..self.len() {
            out.add_box(&self.aabb(i));
        }
        out
    }
}

impl<T: Scalar, const D: usize> BoxSet<T, D> for [Aabb<T, D>] {
    fn len(&self) -> usize {
        <[Aabb<T, D>]>::len(self)
    }

    fn aabb(&self, index: usize) -> Aabb<T, D> {
        self[index]
    }

    fn swap(&mut self, a: usize, b: usize) {
        <[Aabb<T, D>]>::swap(self, a, b);
    }
}

impl<T: Scalar, const D: usize> BoxSet<T, D> for Vec<Aabb<T, D>> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn aabb(&self, index: usize) -> Aabb<T, D> {
        self[index]
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.as_mut_slice().swap(a, b);
    }
}

/// A set of boxes, each tagged with a caller element `E` (an edge id, a face id, ...).
///
/// The element travels with its box when the builder reorders the set, so after a
/// build `element(i)` still names the primitive whose box is `aabb(i)`.
#[derive(Clone, Debug)]
pub struct BoxList<T, const D: usize, E> {
    boxes: Vec<Aabb<T, D>>,
    elements: Vec<E>,
}

impl<T, const D: usize, E> Default for BoxList<T, D, E> {
    fn default() -> Self {
        Self {
            boxes: Vec::new(),
            elements: Vec::new(),
        }
    }
}

impl<T: Scalar, const D: usize, E: Copy + Debug> BoxList<T, D, E> {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty list with room for `n` entries.
    pub fn with_capacity(n: usize) -> Self {
        Self {
            boxes: Vec::with_capacity(n),
            elements: Vec::with_capacity(n),
        }
    }

    /// Append a box with its element.
    pub fn push(&mut self, aabb: Aabb<T, D>, element: E) {
        self.boxes.push(aabb);
        self.elements.push(element);
    }

    /// Remove all entries, keeping the allocations.
    pub fn clear(&mut self) {
        self.boxes.clear();
        self.elements.clear();
    }

    /// Element stored at `index`.
    pub fn element(&self, index: usize) -> E {
        self.elements[index]
    }

    /// All elements in current order.
    pub fn elements(&self) -> &[E] {
        &self.elements
    }

    /// All boxes in current order.
    pub fn boxes(&self) -> &[Aabb<T, D>] {
        &self.boxes
    }
}

impl<T: Scalar, const D: usize, E: Copy + Debug> BoxSet<T, D> for BoxList<T, D, E> {
    fn len(&self) -> usize {
        self.boxes.len()
    }

    fn aabb(&self, index: usize) -> Aabb<T, D> {
        self.boxes[index]
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.boxes.swap(a, b);
        self.elements.swap(a, b);
    }
}

impl<T: Scalar, const D: usize, E: Copy + Debug> FromIterator<(Aabb<T, D>, E)>
    for BoxList<T, D, E>
{
    fn from_iter<I: IntoIterator<Item = (Aabb<T, D>, E)>>(iter: I) -> Self {
        let (boxes, elements) = iter.into_iter().unzip();
        Self { boxes, elements }
    }
}

/// Reorder `set` so that position `k` holds the primitive that was at `order[k]`.
///
/// `order` must be a permutation of `0..set.len()`. Uses at most `len - 1` swaps.
pub(crate) fn apply_order<T, const D: usize, S>(set: &mut S, order: &[usize])
where
    T: Scalar,
    S: BoxSet<T, D> + ?Sized,
{
    let n = order.len();
    debug_assert_eq!(n, set.len(), "order must cover the whole set");
    // at[p]: original index now sitting at position p; pos[e]: current position of e.
    let mut at: Vec<usize> = (0..n).collect();
    let mut pos: Vec<usize> = (0..n).collect();
    for (k, &want) in order.iter().enumerate() {
        let p = pos[want];
        if p == k {
            continue;
        }
        set.swap(k, p);
        let displaced = at[k];
        at[p] = displaced;
        pos[displaced] = p;
        at[k] = want;
        pos[want] = k;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Aabb2D;
    use alloc::vec;

    fn unit(x: i64) -> Aabb2D<i64> {
        Aabb2D::from_coords(x, 0, x + 1, 1)
    }

    #[test]
    fn apply_order_permutes_boxes_and_elements() {
        let mut list: BoxList<i64, 2, char> = [
            (unit(0), 'a'),
            (unit(1), 'b'),
            (unit(2), 'c'),
            (unit(3), 'd'),
        ]
        .into_iter()
        .collect();
        apply_order(&mut list, &[2, 0, 3, 1]);
        assert_eq!(list.elements(), &['c', 'a', 'd', 'b']);
        assert_eq!(list.aabb(0), unit(2));
        assert_eq!(list.aabb(3), unit(1));
    }

    #[test]
    fn apply_order_identity_does_not_swap() {
        #[derive(Debug)]
        struct Counting(Vec<Aabb2D<i64>>, usize);
        impl BoxSet<i64, 2> for Counting {
            fn len(&self) -> usize {
                self.0.len()
            }
            fn aabb(&self, index: usize) -> Aabb2D<i64> {
                self.0[index]
            }
            fn swap(&mut self, a: usize, b: usize) {
                self.0.swap(a, b);
                self.1 += 1;
            }
        }
        let mut set = Counting((0..5).map(unit).collect(), 0);
        apply_order(&mut set, &[0, 1, 2, 3, 4]);
        assert_eq!(set.1, 0);
        apply_order(&mut set, &[4, 3, 2, 1, 0]);
        assert!(set.1 <= 4);
        assert_eq!(set.0[0], unit(4));
        assert_eq!(set.0[4], unit(0));
    }

    #[test]
    fn bounding_box_of_slice_and_empty_set() {
        let boxes = [unit(-2), unit(5)];
        assert_eq!(boxes[..].bounding_box(), Aabb2D::from_coords(-2, 0, 6, 1));
        let none: Vec<Aabb2D<i64>> = Vec::new();
        assert!(none.bounding_box().is_empty());
        assert!(BoxSet::is_empty(&none));
    }

    #[test]
    fn default_center_is_box_midpoint() {
        let v = vec![Aabb2D::from_coords(0.0, 2.0, 4.0, 6.0)];
        assert_eq!(v.center(0, 0), 2.0);
        assert_eq!(v.center(0, 1), 4.0);
    }
}
