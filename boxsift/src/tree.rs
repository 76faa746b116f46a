// Copyright 2025 the Boxsift Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The built hierarchy: a flat arena of nodes addressed by index.

use alloc::vec::Vec;
use core::ops::Range;

use crate::select::BoxSelector;
use crate::set::BoxSet;
use crate::types::{Aabb, Scalar};

/// Index of a node in a [`Tree`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIdx(usize);

impl NodeIdx {
    pub(crate) const fn new(i: usize) -> Self {
        Self(i)
    }

    /// Position of the node in [`Tree::nodes`].
    pub const fn get(self) -> usize {
        self.0
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Kind {
    Leaf { begin: usize, end: usize },
    Internal { left: NodeIdx, right: NodeIdx },
}

/// A tree node: either a leaf over a contiguous element range or an internal node
/// with two children.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Node<T, const D: usize> {
    pub(crate) aabb: Aabb<T, D>,
    pub(crate) kind: Kind,
    pub(crate) depth: usize,
}

impl<T: Scalar, const D: usize> Node<T, D> {
    pub(crate) fn leaf(begin: usize, end: usize, depth: usize) -> Self {
        Self {
            aabb: Aabb::empty(),
            kind: Kind::Leaf { begin, end },
            depth,
        }
    }

    pub(crate) fn internal(left: NodeIdx, right: NodeIdx, depth: usize) -> Self {
        Self {
            aabb: Aabb::empty(),
            kind: Kind::Internal { left, right },
            depth,
        }
    }

    /// Bounding box of everything below this node.
    pub fn aabb(&self) -> &Aabb<T, D> {
        &self.aabb
    }

    /// Whether this node is a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, Kind::Leaf { .. })
    }

    /// Children of an internal node.
    pub fn children(&self) -> Option<(NodeIdx, NodeIdx)> {
        match self.kind {
            Kind::Internal { left, right } => Some((left, right)),
            Kind::Leaf { .. } => None,
        }
    }

    /// Element range of a leaf, as indices into the reordered set.
    pub fn range(&self) -> Option<Range<usize>> {
        match self.kind {
            Kind::Leaf { begin, end } => Some(begin..end),
            Kind::Internal { .. } => None,
        }
    }

    /// Distance from the root (the root is at depth 0).
    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// A bounding volume hierarchy over a [`BoxSet`].
///
/// Node 0 is the root; an empty tree has no nodes. Children always sit after their
/// parent in the arena. The tree holds no reference to the set it was built from: leaf
/// ranges index into the set as it was left by the build, and mutating the set's boxes
/// afterwards makes query results stale without any detection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tree<T, const D: usize> {
    nodes: Vec<Node<T, D>>,
    elements: usize,
    max_depth: usize,
}

impl<T, const D: usize> Default for Tree<T, D> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            elements: 0,
            max_depth: 0,
        }
    }
}

impl<T: Scalar, const D: usize> Tree<T, D> {
    /// Finish a node arena produced by a builder: compute boxes bottom-up from the
    /// element boxes (given in final set order) and record the depth reached.
    pub(crate) fn assemble(mut nodes: Vec<Node<T, D>>, boxes: &[Aabb<T, D>]) -> Self {
        let mut max_depth = 0;
        // Children follow their parents, so a reverse sweep sees children first.
        for i in (0..nodes.len()).rev() {
            let aabb = match nodes[i].kind {
                Kind::Leaf { begin, end } => {
                    let mut acc = Aabb::empty();
                    for b in &boxes[begin..end] {
                        acc.add_box(b);
                    }
                    acc
                }
                Kind::Internal { left, right } => {
                    nodes[left.get()].aabb.union(&nodes[right.get()].aabb)
                }
            };
            nodes[i].aabb = aabb;
            max_depth = max_depth.max(nodes[i].depth);
        }
        Self {
            nodes,
            elements: boxes.len(),
            max_depth,
        }
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no nodes (built from an empty set).
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of elements the tree was built over.
    pub fn element_count(&self) -> usize {
        self.elements
    }

    /// Deepest node depth reached by the build.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// The root node index, if any.
    pub fn root(&self) -> Option<NodeIdx> {
        (!self.nodes.is_empty()).then_some(NodeIdx::new(0))
    }

    /// Bounding box of the whole tree. Empty for an empty tree.
    pub fn root_box(&self) -> Aabb<T, D> {
        self.nodes.first().map(|n| n.aabb).unwrap_or_default()
    }

    /// Node at `idx`.
    pub fn node(&self, idx: NodeIdx) -> &Node<T, D> {
        &self.nodes[idx.get()]
    }

    /// All nodes in arena order.
    pub fn nodes(&self) -> &[Node<T, D>] {
        &self.nodes
    }

    /// All leaves in arena order.
    pub fn leaves(&self) -> impl Iterator<Item = &Node<T, D>> + '_ {
        self.nodes.iter().filter(|n| n.is_leaf())
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.leaves().count()
    }

    /// Indices of all elements of `set` whose box overlaps `query`.
    ///
    /// `set` must be the set this tree was built from, in the order the build left it.
    pub fn query_box<S>(&self, set: &S, query: &Aabb<T, D>) -> Vec<usize>
    where
        S: BoxSet<T, D> + ?Sized,
    {
        let mut selector = BoxSelector::new(set, *query);
        selector.select(self);
        selector.into_indices()
    }
}
