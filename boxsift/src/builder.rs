// Copyright 2025 the Boxsift Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Builder trait and shared build configuration.

use crate::set::BoxSet;
use crate::tree::Tree;
use crate::types::{Aabb, Scalar};

/// Default maximum number of elements per leaf.
pub const DEFAULT_LEAF_SIZE: usize = 4;

/// Default hard ceiling on tree depth.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Errors reported when a build cannot start.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// Leaf size must be at least one element.
    #[error("invalid configuration: leaf size must be positive")]
    ZeroLeafSize,
    /// Max depth must allow at least one split.
    #[error("invalid configuration: max tree depth must be positive")]
    ZeroMaxDepth,
}

impl BuildError {
    /// Whether the error stems from an invalid [`BuildConfig`].
    pub const fn is_invalid_configuration(&self) -> bool {
        matches!(self, Self::ZeroLeafSize | Self::ZeroMaxDepth)
    }
}

/// Limits shared by all builders.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BuildConfig {
    leaf_size: usize,
    max_depth: usize,
    parallel: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            leaf_size: DEFAULT_LEAF_SIZE,
            max_depth: DEFAULT_MAX_DEPTH,
            parallel: false,
        }
    }
}

impl BuildConfig {
    /// Create a sequential configuration, rejecting zero limits.
    pub const fn new(leaf_size: usize, max_depth: usize) -> Result<Self, BuildError> {
        let config = Self {
            leaf_size,
            max_depth,
            parallel: false,
        };
        match config.validate() {
            Ok(()) => Ok(config),
            Err(e) => Err(e),
        }
    }

    /// Enable or disable multi-threaded construction.
    ///
    /// Advisory: without the `std` feature, or for small inputs, builds stay sequential.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Maximum number of elements per leaf.
    pub const fn leaf_size(&self) -> usize {
        self.leaf_size
    }

    /// Hard ceiling on node depth. The root is at depth 0.
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Whether parallel construction was requested.
    pub const fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Check the limits.
    pub const fn validate(&self) -> Result<(), BuildError> {
        if self.leaf_size == 0 {
            return Err(BuildError::ZeroLeafSize);
        }
        if self.max_depth == 0 {
            return Err(BuildError::ZeroMaxDepth);
        }
        Ok(())
    }
}

/// A tree construction strategy.
///
/// After a successful build every index in `0..set.len()` belongs to exactly one leaf,
/// and the set has been physically reordered (through [`BoxSet::swap`]) so that each
/// leaf covers a contiguous index range.
pub trait Builder {
    /// The configured limits.
    fn config(&self) -> &BuildConfig;

    /// Build a tree over `set`. `root` bounds the element centroids; when `None` it is
    /// computed as the union of all element boxes.
    fn build_with_root<T, const D: usize, S>(
        &self,
        set: &mut S,
        root: Option<Aabb<T, D>>,
    ) -> Result<Tree<T, D>, BuildError>
    where
        T: Scalar,
        S: BoxSet<T, D> + ?Sized;

    /// Build a tree over `set`, bounding it by the union of its element boxes.
    fn build<T, const D: usize, S>(&self, set: &mut S) -> Result<Tree<T, D>, BuildError>
    where
        T: Scalar,
        S: BoxSet<T, D> + ?Sized,
    {
        self.build_with_root(set, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_limits_are_rejected() {
        assert_eq!(BuildConfig::new(0, 8), Err(BuildError::ZeroLeafSize));
        assert_eq!(BuildConfig::new(4, 0), Err(BuildError::ZeroMaxDepth));
        assert!(BuildError::ZeroMaxDepth.is_invalid_configuration());
    }

    #[test]
    fn defaults_are_small_and_sequential() {
        let c = BuildConfig::default();
        assert_eq!(c.leaf_size(), DEFAULT_LEAF_SIZE);
        assert_eq!(c.max_depth(), DEFAULT_MAX_DEPTH);
        assert!(!c.is_parallel());
        assert!(c.with_parallel(true).is_parallel());
    }

    #[test]
    fn builders_reject_invalid_config_without_touching_the_set() {
        use crate::builders::{LinearBuilder, SahBuilder};
        use crate::types::Aabb2D;
        use alloc::vec::Vec;

        let original: Vec<_> = (0..10)
            .rev()
            .map(|i| Aabb2D::from_point([i, 0_i64]))
            .collect();
        let zero_leaf = BuildConfig {
            leaf_size: 0,
            max_depth: 4,
            parallel: false,
        };
        let zero_depth = BuildConfig {
            leaf_size: 4,
            max_depth: 0,
            parallel: true,
        };

        let mut set = original.clone();
        let err = LinearBuilder::new(zero_leaf).build(&mut set).unwrap_err();
        assert_eq!(err, BuildError::ZeroLeafSize);
        assert_eq!(set, original);

        let err = SahBuilder::new(zero_depth).build(&mut set).unwrap_err();
        assert_eq!(err, BuildError::ZeroMaxDepth);
        assert!(err.is_invalid_configuration());
        assert_eq!(set, original);
    }

    #[test]
    fn error_messages_name_the_limit() {
        use alloc::string::ToString;
        assert!(BuildError::ZeroLeafSize.to_string().contains("leaf size"));
        assert!(BuildError::ZeroMaxDepth.to_string().contains("depth"));
    }
}
