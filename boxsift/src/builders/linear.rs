// Copyright 2025 the Boxsift Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Linear BVH builder: Morton keys, radix sort, and bitwise hierarchy emission.
//!
//! Instead of searching for good split planes, every element centroid is mapped onto
//! the Z-order curve and sorted. Each key bit then splits a sorted range in two at the
//! point where that bit flips, found by binary search. Build time is dominated by the
//! sort, which is linear in the element count; the price is a looser hierarchy than
//! [`SahBuilder`](super::SahBuilder) produces.

use alloc::vec;
use alloc::vec::Vec;

use log::{debug, trace};

use super::morton::{self, EncodedLink};
use crate::builder::{BuildConfig, BuildError, Builder};
use crate::set::{BoxSet, apply_order};
use crate::tree::{Kind, Node, NodeIdx, Tree};
use crate::types::{Aabb, Scalar};

/// Inputs smaller than this are always built on the calling thread.
pub const PARALLEL_MIN_ELEMENTS: usize = 4096;

/// Morton-code builder (LBVH).
#[derive(Clone, Debug, Default)]
pub struct LinearBuilder {
    config: BuildConfig,
}

impl LinearBuilder {
    /// Create a builder with the given limits.
    pub const fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    fn workers(&self, n: usize) -> usize {
        if !self.config.is_parallel() || n < PARALLEL_MIN_ELEMENTS {
            return 1;
        }
        super::available_workers()
    }
}

/// A range of sorted links waiting to become a subtree.
#[derive(Copy, Clone, Debug)]
struct Span {
    start: usize,
    end: usize,
    /// Key bits not yet used for splitting; the next split tests bit `bits_left - 1`.
    bits_left: u32,
    depth: usize,
}

/// Emits node arenas over a sorted link array.
struct Emitter<'a> {
    links: &'a [EncodedLink],
    leaf_size: usize,
    max_depth: usize,
}

impl Emitter<'_> {
    /// Split point of `span` at the highest remaining bit that actually divides it.
    ///
    /// Keys in a span share every bit above `bits_left`, so within the span all keys
    /// with the tested bit clear precede those with it set.
    fn split(&self, span: &Span) -> (usize, u32) {
        let range = &self.links[span.start..span.end];
        let mut bits = span.bits_left;
        while bits > 0 {
            let mask = 1_u64 << (bits - 1);
            let k = range.partition_point(|l| l.code & mask == 0);
            bits -= 1;
            if k != 0 && k != range.len() {
                return (span.start + k, bits);
            }
        }
        // Every key in the span is identical; halve by count.
        (span.start + range.len() / 2, 0)
    }

    /// Emit the subtree over `span` into a fresh arena whose root is node 0.
    ///
    /// With `fork_depth`, spans that would split at that depth are left as leaf
    /// placeholders and returned with their slot for separate emission.
    fn emit<T: Scalar, const D: usize>(
        &self,
        span: Span,
        fork_depth: Option<usize>,
    ) -> (Vec<Node<T, D>>, Vec<(usize, Span)>) {
        let mut nodes = vec![Node::leaf(span.start, span.end, span.depth)];
        let mut forks = Vec::new();
        let mut stack = vec![(0_usize, span)];
        while let Some((slot, span)) = stack.pop() {
            let len = span.end - span.start;
            if len <= self.leaf_size || span.depth >= self.max_depth {
                if len > self.leaf_size {
                    trace!(
                        "depth limit {} reached, leaf holds {} elements",
                        self.max_depth, len
                    );
                }
                nodes[slot] = Node::leaf(span.start, span.end, span.depth);
                continue;
            }
            if fork_depth == Some(span.depth) {
                forks.push((slot, span));
                continue;
            }
            let (mid, bits_left) = self.split(&span);
            let left = nodes.len();
            nodes.push(Node::leaf(span.start, mid, span.depth + 1));
            nodes.push(Node::leaf(mid, span.end, span.depth + 1));
            nodes[slot] = Node::internal(NodeIdx::new(left), NodeIdx::new(left + 1), span.depth);
            stack.push((
                left + 1,
                Span {
                    start: mid,
                    end: span.end,
                    bits_left,
                    depth: span.depth + 1,
                },
            ));
            stack.push((
                left,
                Span {
                    start: span.start,
                    end: mid,
                    bits_left,
                    depth: span.depth + 1,
                },
            ));
        }
        (nodes, forks)
    }
}

/// Append a subtree arena emitted separately, putting its root into `slot`.
fn splice<T: Scalar, const D: usize>(
    nodes: &mut Vec<Node<T, D>>,
    slot: usize,
    part: Vec<Node<T, D>>,
) {
    // Local node k > 0 lands at base + k - 1; the local root is never a child.
    let base = nodes.len();
    let shift = |i: NodeIdx| NodeIdx::new(base + i.get() - 1);
    for (k, mut node) in part.into_iter().enumerate() {
        if let Kind::Internal { left, right } = node.kind {
            node.kind = Kind::Internal {
                left: shift(left),
                right: shift(right),
            };
        }
        if k == 0 {
            nodes[slot] = node;
        } else {
            nodes.push(node);
        }
    }
}

#[cfg(feature = "std")]
fn encode_parallel<const D: usize>(centers: &[[f64; D]], workers: usize) -> Vec<EncodedLink> {
    let mut links = vec![EncodedLink::default(); centers.len()];
    let chunk = centers.len().div_ceil(workers).max(1);
    std::thread::scope(|s| {
        for (i, (src, dst)) in centers.chunks(chunk).zip(links.chunks_mut(chunk)).enumerate() {
            s.spawn(move || morton::encode_into(src, dst, i * chunk));
        }
    });
    links
}

#[cfg(feature = "std")]
fn emit_parallel<T: Scalar, const D: usize>(
    emitter: &Emitter<'_>,
    root: Span,
    workers: usize,
) -> Vec<Node<T, D>> {
    // Enough forks to keep every worker busy when subtrees are uneven.
    let fork_depth = (usize::BITS - (workers - 1).leading_zeros()) as usize + 2;
    let (mut nodes, forks) = emitter.emit::<T, D>(root, Some(fork_depth));
    if forks.is_empty() {
        return nodes;
    }
    trace!(
        "emitting {} subtrees on {} workers from depth {}",
        forks.len(),
        workers,
        fork_depth
    );
    let mut parts: Vec<Vec<Node<T, D>>> = vec![Vec::new(); forks.len()];
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..workers)
            .map(|w| {
                let forks = &forks;
                s.spawn(move || {
                    forks
                        .iter()
                        .enumerate()
                        .skip(w)
                        .step_by(workers)
                        .map(|(i, (_, span))| (i, emitter.emit::<T, D>(*span, None).0))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        for h in handles {
            let done = h.join().unwrap_or_else(|e| std::panic::resume_unwind(e));
            for (i, part) in done {
                parts[i] = part;
            }
        }
    });
    for ((slot, _), part) in forks.iter().zip(parts) {
        splice(&mut nodes, *slot, part);
    }
    nodes
}

impl Builder for LinearBuilder {
    fn config(&self) -> &BuildConfig {
        &self.config
    }

    fn build_with_root<T, const D: usize, S>(
        &self,
        set: &mut S,
        root: Option<Aabb<T, D>>,
    ) -> Result<Tree<T, D>, BuildError>
    where
        T: Scalar,
        S: BoxSet<T, D> + ?Sized,
    {
        self.config.validate()?;
        let n = set.len();
        if n == 0 {
            debug!("linear build over an empty set");
            return Ok(Tree::default());
        }
        let root = root.unwrap_or_else(|| set.bounding_box());
        let lo: [f64; D] = core::array::from_fn(|a| T::to_f64(root.min[a]));
        let inv: [f64; D] = core::array::from_fn(|a| {
            let extent = T::to_f64(root.max[a]) - lo[a];
            if extent > 0.0 { 1.0 / extent } else { 0.0 }
        });

        let mut boxes = Vec::with_capacity(n);
        let mut centers: Vec<[f64; D]> = Vec::with_capacity(n);
        for i in 0..n {
            boxes.push(set.aabb(i));
            centers.push(core::array::from_fn(|a| {
                (T::to_f64(set.center(i, a)) - lo[a]) * inv[a]
            }));
        }

        let workers = self.workers(n);
        #[cfg(feature = "std")]
        let mut links = if workers > 1 {
            encode_parallel(&centers, workers)
        } else {
            morton::encode(&centers)
        };
        #[cfg(not(feature = "std"))]
        let mut links = morton::encode(&centers);
        drop(centers);

        morton::radix_sort(&mut links, morton::key_bits(D));

        let emitter = Emitter {
            links: &links,
            leaf_size: self.config.leaf_size(),
            max_depth: self.config.max_depth(),
        };
        let span = Span {
            start: 0,
            end: n,
            bits_left: morton::key_bits(D),
            depth: 0,
        };
        #[cfg(feature = "std")]
        let nodes = if workers > 1 {
            emit_parallel::<T, D>(&emitter, span, workers)
        } else {
            emitter.emit::<T, D>(span, None).0
        };
        #[cfg(not(feature = "std"))]
        let nodes = emitter.emit::<T, D>(span, None).0;

        let order: Vec<usize> = links.iter().map(|l| l.index).collect();
        let sorted: Vec<Aabb<T, D>> = order.iter().map(|&i| boxes[i]).collect();
        apply_order(set, &order);
        let tree = Tree::assemble(nodes, &sorted);
        debug!(
            "linear build: {} elements, {} nodes, {} leaves, depth {}, {} workers",
            n,
            tree.len(),
            tree.leaf_count(),
            tree.max_depth(),
            workers
        );
        Ok(tree)
    }
}
