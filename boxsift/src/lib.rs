// Copyright 2025 the Boxsift Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Boxsift: a bounding volume hierarchy over axis-aligned boxes in `D` dimensions.
//!
//! Boxsift answers "which of these boxes overlap that one?" for large, mostly static box
//! sets, such as the sub-shapes of a solid model before a Boolean operation.
//!
//! - A [`BoxSet`] is anything that can report, for an element index, its box and center,
//!   and swap two elements. Slices and vectors of [`Aabb`] qualify, and [`BoxList`] pairs
//!   boxes with a payload.
//! - A [`Builder`] turns a set into a [`Tree`]. [`LinearBuilder`] sorts centroids along a
//!   Morton curve and splits where key bits flip; [`SahBuilder`] spends more time for
//!   tighter splits. Building reorders the set in place so each leaf covers a contiguous
//!   index range.
//! - A [`Selector`] walks the tree. [`BoxSelector`] collects every element whose box
//!   overlaps a query box; [`BoxPairSelector`] finds overlapping pairs between two trees.
//!
//! It is generic over the scalar type (`f32`, `f64`, `i64`) and the dimension, and does
//! not depend on any geometry crate.
//!
//! # Example
//!
//! ```rust
//! use boxsift::{Aabb2D, BuildConfig, Builder, LinearBuilder};
//!
//! // Eight points on a 4x2 grid.
//! let mut set: Vec<_> = (0..8)
//!     .map(|i| Aabb2D::from_point([f64::from(i % 4), f64::from(i / 4)]))
//!     .collect();
//!
//! let builder = LinearBuilder::new(BuildConfig::new(2, 32).unwrap());
//! let tree = builder.build(&mut set).unwrap();
//! assert_eq!(tree.leaf_count(), 4);
//!
//! // The set was reordered; results index into it as it is now.
//! let hits = tree.query_box(&set, &Aabb2D::from_coords(0.0, 0.0, 1.0, 0.0));
//! let mut points: Vec<_> = hits.iter().map(|&i| set[i].min).collect();
//! points.sort_by(|a, b| a.partial_cmp(b).unwrap());
//! assert_eq!(points, vec![[0.0, 0.0], [1.0, 0.0]]);
//! ```
//!
//! ## Features
//!
//! - `std` (default): threaded parallel builds via [`BuildConfig::with_parallel`].
//!   Without it the crate is `no_std` + `alloc` and parallel builds run sequentially.
//! - `kurbo`: conversions between `kurbo::Rect` and `Aabb2D<f64>`.
//!
//! ### Float semantics
//!
//! NaN coordinates never make a box disappear from results: separation tests treat
//! unordered comparisons as overlapping, and a node box covering a NaN corner spans the
//! whole scalar range on that axis. Morton keys clamp NaN centroids to zero, and the SAH
//! builder orders centroids with `f64::total_cmp`.
//!
//! ## Logging
//!
//! Builders report a one-line summary per build at `debug` level through the [`log`]
//! facade. Queries do not log.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod builder;
pub mod builders;
pub mod pair;
pub mod select;
pub mod set;
pub mod tree;
pub mod types;

pub use builder::{BuildConfig, BuildError, Builder, DEFAULT_LEAF_SIZE, DEFAULT_MAX_DEPTH};
pub use builders::morton::EncodedLink;
pub use builders::{LinearBuilder, SahBuilder};
pub use pair::{BoxPairSelector, PairSelector, select_pairs, select_self_pairs};
pub use select::{BoxSelector, PointSelector, Selector, select};
pub use set::{BoxList, BoxSet};
pub use tree::{Node, NodeIdx, Tree};
pub use types::{Aabb, Aabb2D, Aabb3D, Scalar, area};
