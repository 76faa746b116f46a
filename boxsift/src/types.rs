// Copyright 2025 the Boxsift Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive geometry types and helpers.

use core::cmp::Ordering;
use core::fmt::Debug;

/// Axis-aligned bounding box in `D` dimensions.
///
/// A box with `min[i] > max[i]` on any axis is empty. [`Aabb::empty`] returns the
/// canonical empty sentinel, which absorbs nothing under [`Aabb::union`] and overlaps
/// nothing under [`Aabb::is_out`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Aabb<T, const D: usize> {
    /// Minimum corner.
    pub min: [T; D],
    /// Maximum corner.
    pub max: [T; D],
}

/// Axis-aligned bounding box in 2D.
pub type Aabb2D<T> = Aabb<T, 2>;

/// Axis-aligned bounding box in 3D.
pub type Aabb3D<T> = Aabb<T, 3>;

impl<T, const D: usize> Aabb<T, D> {
    /// Create a new AABB from min/max corners.
    pub const fn new(min: [T; D], max: [T; D]) -> Self {
        Self { min, max }
    }
}

impl<T: Scalar, const D: usize> Aabb<T, D> {
    /// The empty box. `min` is at the scalar's upper bound and `max` at its lower bound.
    pub const fn empty() -> Self {
        Self {
            min: [T::MAX; D],
            max: [T::MIN; D],
        }
    }

    /// A degenerate box covering a single point.
    pub const fn from_point(p: [T; D]) -> Self {
        Self { min: p, max: p }
    }

    /// Return true if the AABB is empty or inverted on any axis. A NaN corner does not
    /// make a box empty.
    pub fn is_empty(&self) -> bool {
        (0..D).any(|a| lt(self.max[a], self.min[a]))
    }

    /// Grow the box to include the point.
    pub fn add_point(&mut self, p: [T; D]) {
        for a in 0..D {
            self.min[a] = lower(self.min[a], p[a]);
            self.max[a] = upper(self.max[a], p[a]);
        }
    }

    /// Grow the box to include another box. Empty boxes are ignored.
    pub fn add_box(&mut self, other: &Self) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            *self = *other;
            return;
        }
        *self = union_aabb(*self, *other);
    }

    /// The union of two AABBs.
    pub fn union(&self, other: &Self) -> Self {
        let mut out = *self;
        out.add_box(other);
        out
    }

    /// The intersection of two AABBs. May be empty.
    pub fn intersect(&self, other: &Self) -> Self {
        let mut out = *self;
        for a in 0..D {
            out.min[a] = max_t(self.min[a], other.min[a]);
            out.max[a] = min_t(self.max[a], other.max[a]);
        }
        out
    }

    /// Whether the boxes are strictly separated along at least one axis.
    ///
    /// Touching boxes are not out. Empty boxes are out of everything.
    pub fn is_out(&self, other: &Self) -> bool {
        if self.is_empty() || other.is_empty() {
            return true;
        }
        (0..D).any(|a| lt(self.max[a], other.min[a]) || lt(other.max[a], self.min[a]))
    }

    /// Test the box `[min, max]` against this one.
    ///
    /// Returns `(is_inside, has_overlap)`: whether `[min, max]` lies entirely within
    /// `self`, and whether the two boxes overlap at all.
    pub fn contains(&self, min: &[T; D], max: &[T; D]) -> (bool, bool) {
        let other = Self::new(*min, *max);
        if self.is_out(&other) {
            return (false, false);
        }
        let inside = (0..D).all(|a| le(self.min[a], min[a]) && le(max[a], self.max[a]));
        (inside, true)
    }

    /// Whether this AABB contains the point (boundary inclusive).
    pub fn contains_point(&self, p: &[T; D]) -> bool {
        (0..D).all(|a| le(self.min[a], p[a]) && le(p[a], self.max[a]))
    }

    /// Center of the box along `axis`.
    pub fn center(&self, axis: usize) -> T {
        T::mid(self.min[axis], self.max[axis])
    }

    /// Extent of the box along `axis`, clamped at zero.
    pub fn extent(&self, axis: usize) -> T {
        T::max_zero(T::sub(self.max[axis], self.min[axis]))
    }

    /// A copy of the box inflated by `tol` on every side. Empty boxes stay empty.
    pub fn enlarged(&self, tol: T) -> Self {
        if self.is_empty() {
            return *self;
        }
        let mut out = *self;
        for a in 0..D {
            out.min[a] = T::sub(self.min[a], tol);
            out.max[a] = T::add(self.max[a], tol);
        }
        out
    }
}

impl<T: Scalar, const D: usize> Default for Aabb<T, D> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: Scalar> Aabb2D<T> {
    /// Create a 2D AABB from its four coordinates.
    pub const fn from_coords(min_x: T, min_y: T, max_x: T, max_y: T) -> Self {
        Self::new([min_x, min_y], [max_x, max_y])
    }
}

#[cfg(feature = "kurbo")]
impl From<kurbo::Rect> for Aabb2D<f64> {
    fn from(r: kurbo::Rect) -> Self {
        let r = r.abs();
        Self::new([r.x0, r.y0], [r.x1, r.y1])
    }
}

#[cfg(feature = "kurbo")]
impl From<Aabb2D<f64>> for kurbo::Rect {
    fn from(b: Aabb2D<f64>) -> Self {
        Self::new(b.min[0], b.min[1], b.max[0], b.max[1])
    }
}

/// Numeric scalar abstraction for AABBs used by builders and selectors.
///
/// This trait provides the operations required for SAH metrics, centroid computations,
/// and Morton normalization, plus an associated widened accumulator type for area
/// (e.g., f32→f64, i64→i128).
pub trait Scalar: Copy + PartialOrd + Debug + Send + Sync + 'static {
    /// Widened accumulator type suitable for area/cost computations.
    type Acc: Copy
        + PartialOrd
        + core::ops::Add<Output = Self::Acc>
        + core::ops::Sub<Output = Self::Acc>
        + core::ops::Mul<Output = Self::Acc>
        + Debug;

    /// Lowest representable value; used as the empty box's `max`.
    const MIN: Self;

    /// Highest representable value; used as the empty box's `min`.
    const MAX: Self;

    /// Add two scalar values.
    fn add(a: Self, b: Self) -> Self;

    /// Subtract two scalar values: a - b.
    fn sub(a: Self, b: Self) -> Self;

    /// Zero value for the scalar type.
    fn zero() -> Self;

    /// Max of the scalar value and zero.
    fn max_zero(v: Self) -> Self;

    /// Midpoint between a and b (used for centroid ordering).
    fn mid(a: Self, b: Self) -> Self;

    /// Convert a scalar to the accumulator type.
    fn widen(v: Self) -> Self::Acc;

    /// Convert a `usize` to the accumulator type (for SAH weighting).
    fn acc_from_usize(n: usize) -> Self::Acc;

    /// Lossy conversion to `f64`, used to normalize centroids for Morton coding.
    fn to_f64(v: Self) -> f64;
}

impl Scalar for f32 {
    type Acc = f64;

    const MIN: Self = Self::NEG_INFINITY;
    const MAX: Self = Self::INFINITY;

    #[inline]
    fn add(a: Self, b: Self) -> Self {
        a + b
    }

    #[inline]
    fn sub(a: Self, b: Self) -> Self {
        a - b
    }

    #[inline]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn max_zero(v: Self) -> Self {
        v.max(0.0)
    }

    #[inline]
    fn mid(a: Self, b: Self) -> Self {
        0.5 * (a + b)
    }

    #[inline]
    fn widen(v: Self) -> Self::Acc {
        v as f64
    }

    #[inline]
    fn acc_from_usize(n: usize) -> Self::Acc {
        n as f64
    }

    #[inline]
    fn to_f64(v: Self) -> f64 {
        v as f64
    }
}

impl Scalar for f64 {
    type Acc = Self;

    const MIN: Self = Self::NEG_INFINITY;
    const MAX: Self = Self::INFINITY;

    #[inline]
    fn add(a: Self, b: Self) -> Self {
        a + b
    }

    #[inline]
    fn sub(a: Self, b: Self) -> Self {
        a - b
    }

    #[inline]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn max_zero(v: Self) -> Self {
        v.max(0.0)
    }

    #[inline]
    fn mid(a: Self, b: Self) -> Self {
        0.5 * (a + b)
    }

    #[inline]
    fn widen(v: Self) -> Self::Acc {
        v
    }

    #[inline]
    fn acc_from_usize(n: usize) -> Self::Acc {
        n as Self::Acc
    }

    #[inline]
    fn to_f64(v: Self) -> f64 {
        v
    }
}

impl Scalar for i64 {
    type Acc = i128;

    const MIN: Self = Self::MIN;
    const MAX: Self = Self::MAX;

    #[inline]
    fn add(a: Self, b: Self) -> Self {
        a.saturating_add(b)
    }

    #[inline]
    fn sub(a: Self, b: Self) -> Self {
        a.saturating_sub(b)
    }

    #[inline]
    fn zero() -> Self {
        0
    }

    #[inline]
    fn max_zero(v: Self) -> Self {
        v.max(0)
    }

    #[inline]
    fn mid(a: Self, b: Self) -> Self {
        // Average without overflow: (a & b) + ((a ^ b) >> 1)
        (a & b) + ((a ^ b) >> 1)
    }

    #[inline]
    fn widen(v: Self) -> Self::Acc {
        v as i128
    }

    #[inline]
    fn acc_from_usize(n: usize) -> Self::Acc {
        n as i128
    }

    #[inline]
    fn to_f64(v: Self) -> f64 {
        v as f64
    }
}

/// Compute the SAH area metric of an AABB using the scalar's widened accumulator type.
///
/// In 1D this is the length, in 2D the area, and in 3D and above the half surface area
/// (sum of pairwise extent products). Empty boxes measure zero.
#[inline]
pub fn area<T: Scalar, const D: usize>(a: &Aabb<T, D>) -> T::Acc {
    let zero = T::widen(T::zero());
    if a.is_empty() {
        return zero;
    }
    match D {
        0 => zero,
        1 => T::widen(a.extent(0)),
        2 => T::widen(a.extent(0)) * T::widen(a.extent(1)),
        _ => {
            let mut acc = zero;
            for i in 0..D {
                for j in (i + 1)..D {
                    acc = acc + T::widen(a.extent(i)) * T::widen(a.extent(j));
                }
            }
            acc
        }
    }
}

// Helper type to access Scalar::Acc in type aliases elsewhere.
/// Helper alias for the widened accumulator type associated with a scalar `T`.
pub type ScalarAcc<T> = <T as Scalar>::Acc;

pub(crate) fn min_t<T: PartialOrd + Copy>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Greater) => b,
        _ => a,
    }
}

pub(crate) fn max_t<T: PartialOrd + Copy>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Less) => b,
        _ => a,
    }
}

pub(crate) fn le<T: PartialOrd>(a: T, b: T) -> bool {
    a.partial_cmp(&b)
        .map(|o| o != Ordering::Greater)
        .unwrap_or(false)
}

pub(crate) fn lt<T: PartialOrd>(a: T, b: T) -> bool {
    a.partial_cmp(&b)
        .map(|o| o == Ordering::Less)
        .unwrap_or(false)
}

/// Lower bound of `a` and `b` that also covers unordered values: a NaN operand
/// widens the bound to `T::MIN`.
fn lower<T: Scalar>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Greater) => b,
        Some(_) => a,
        None => T::MIN,
    }
}

/// Upper bound of `a` and `b`; a NaN operand widens it to `T::MAX`.
fn upper<T: Scalar>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Less) => b,
        Some(_) => a,
        None => T::MAX,
    }
}

/// Union of two boxes. An axis with NaN on either side grows to the full scalar range,
/// so the result still bounds both inputs under [`Aabb::is_out`].
pub(crate) fn union_aabb<T: Scalar, const D: usize>(a: Aabb<T, D>, b: Aabb<T, D>) -> Aabb<T, D> {
    let mut out = a;
    for i in 0..D {
        out.min[i] = lower(a.min[i], b.min[i]);
        out.max[i] = upper(a.max[i], b.max[i]);
    }
    out
}
