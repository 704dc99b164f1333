//! Interval tree with an interpolation index for bottom-up queries.
//!
//! On large indexes the top-down scan spends its first dozen visits on high
//! levels that rarely prune anything. This variant instead asks a learned
//! model (see `model`) for the leaf nearest `qbeg` and climbs from there,
//! stopping at the first subtree that provably contains every hit.
//!
//! The proof obligation is carried by a second augment. For a node `n`,
//! `outside_max_end` is the maximum `end` over nodes outside `n`'s subtree
//! whose `beg` is strictly less than `n`'s (minus infinity if none), and
//! `outside_min_beg` (derived in O(1) from the sort order, never stored)
//! is the minimum `beg` over outside nodes with `beg >= n`'s (plus infinity
//! if none). Once
//!
//! - `outside_max_end(n) <= qbeg`, and
//! - `qend <= outside_min_beg(n)`
//!
//! every node outside `n`'s subtree is disqualified on one side or the
//! other, so the climb can stop and the shared scan finishes the job.

use std::sync::atomic::{AtomicU64, Ordering};

use num_traits::Bounded;

use crate::builder::{self, Builder};
use crate::error::Result;
use crate::geometry::{self, Shape};
use crate::interval::Interval;
use crate::model::RankModel;
use crate::tree::{augment_inside, pmax, scan, sort_by_interval, AugmentedNode};

#[derive(Clone, Debug)]
struct OutsideNode<I: Interval> {
    item: I,
    inside_max_end: I::Pos,
    outside_max_end: I::Pos,
}

impl<I: Interval> AugmentedNode<I> for OutsideNode<I> {
    fn new(item: I) -> Self {
        let inside_max_end = item.end();
        OutsideNode {
            item,
            inside_max_end,
            outside_max_end: I::Pos::min_value(),
        }
    }

    #[inline]
    fn item(&self) -> &I {
        &self.item
    }

    #[inline]
    fn inside_max_end(&self) -> I::Pos {
        self.inside_max_end
    }

    #[inline]
    fn set_inside_max_end(&mut self, end: I::Pos) {
        self.inside_max_end = end;
    }
}

/// Fill `outside_max_end` for every node.
///
/// A single left-to-right pass precomputes the running prefix max of `end`;
/// for each node the highest rank below its subtree with a strictly smaller
/// `beg` is found by walking back over `beg`-ties, and the prefix max at
/// that rank is the augment.
fn fill_outside<I: Interval>(nodes: &mut [OutsideNode<I>]) {
    let n = nodes.len();
    let mut running = Vec::with_capacity(n);
    let mut acc = nodes[0].end();
    running.push(acc);
    for node in nodes.iter().skip(1) {
        acc = pmax(acc, node.end());
        running.push(acc);
    }

    for rank in 0..n {
        let lo = geometry::leftmost_child(rank);
        if lo == 0 {
            // subtree starts at rank 0: no outside node to the left
            continue;
        }
        let beg = nodes[rank].beg();
        let mut leq = lo - 1;
        while nodes[leq].beg() == beg {
            if leq == 0 {
                break;
            }
            leq -= 1;
        }
        if nodes[leq].beg() < beg {
            nodes[rank].outside_max_end = running[leq];
        }
    }
}

/// Interval index that predicts a starting leaf and climbs.
///
/// Query results are identical to [`crate::IntervalTree`] for any item set
/// and any number of domains; only the visit count differs. Queries take
/// `&self` and are safe to run concurrently; the two diagnostic counters
/// are relaxed atomics.
///
/// ```
/// use ivix::InterpolatedIntervalTree;
///
/// let mut b = InterpolatedIntervalTree::builder();
/// b.extend((0u32..100).map(|i| (i * 10, i * 10 + 15)));
/// let tree = b.build_interpolated(8).unwrap();
/// assert_eq!(tree.overlap(42, 43).len(), 2);
/// ```
pub struct InterpolatedIntervalTree<I: Interval> {
    nodes: Vec<OutsideNode<I>>,
    shape: Shape,
    model: RankModel<I::Pos>,
    queries: AtomicU64,
    total_climb_cost: AtomicU64,
}

impl<I: Interval> std::fmt::Debug for InterpolatedIntervalTree<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterpolatedIntervalTree")
            .field("len", &self.nodes.len())
            .field("height", &self.shape.root_level)
            .field("domains", &self.model.domains())
            .field("queries", &self.queries())
            .finish()
    }
}

impl<I: Interval> InterpolatedIntervalTree<I> {
    /// Create an empty [`Builder`] for this index type.
    pub fn builder() -> Builder<I> {
        Builder::new()
    }

    pub(crate) fn from_items(items: Vec<I>, domains: u32) -> Result<Self> {
        builder::validate(&items)?;
        let domains = domains.max(1) as usize;
        let mut nodes: Vec<OutsideNode<I>> = items.into_iter().map(OutsideNode::new).collect();
        let shape = Shape::new(nodes.len());
        sort_by_interval(&mut nodes);
        augment_inside(&mut nodes, &shape);

        let model = if nodes.is_empty() {
            RankModel::untrained(domains)
        } else {
            fill_outside(&mut nodes);
            // train on the leaves: ranks 0, 2, 4, ...
            let begs: Vec<I::Pos> = nodes.iter().step_by(2).map(|n| n.beg()).collect();
            let min_beg = nodes[0].beg();
            let max_beg = nodes[nodes.len() - 1].beg();
            RankModel::train(&begs, min_beg, max_beg, domains, 0, shape.root_level)
        };

        Ok(InterpolatedIntervalTree {
            nodes,
            shape,
            model,
            queries: AtomicU64::new(0),
            total_climb_cost: AtomicU64::new(0),
        })
    }

    /// Number of indexed items.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the index holds no items.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate the items in `(beg, end)` order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &I> {
        self.nodes.iter().map(|n| &n.item)
    }

    /// Approximate heap memory usage in bytes.
    pub fn heap_bytes(&self) -> usize {
        self.nodes.capacity() * std::mem::size_of::<OutsideNode<I>>() + self.model.heap_bytes()
    }

    /// Cumulative number of model-guided queries answered.
    pub fn queries(&self) -> u64 {
        self.queries.load(Ordering::Relaxed)
    }

    /// Cumulative ranks climbed across all model-guided queries.
    pub fn total_climb_cost(&self) -> u64 {
        self.total_climb_cost.load(Ordering::Relaxed)
    }

    /// Minimum `beg` over nodes outside this subtree with `beg` at least the
    /// subtree root's; derived from the sort order.
    #[inline]
    fn outside_min_beg(&self, subtree: usize) -> I::Pos {
        let beg = self.nodes[subtree].beg();
        let lo = geometry::leftmost_child(subtree);
        if lo > 0 && self.nodes[lo - 1].beg() == beg {
            // a node left of the subtree ties on beg, so the outside set
            // reaches down to beg itself
            return beg;
        }
        let hi = geometry::rightmost_child(subtree);
        if hi + 1 < self.nodes.len() {
            self.nodes[hi + 1].beg()
        } else {
            I::Pos::max_value()
        }
    }

    /// Overlap query: clear `out`, append every item overlapping
    /// `[qbeg, qend)`, and return the number of ranks visited, climb
    /// included.
    ///
    /// When the model abstains for `qbeg`'s domain this is exactly the
    /// top-down scan of the base tree.
    pub fn overlap_into(&self, qbeg: I::Pos, qend: I::Pos, out: &mut Vec<I>) -> usize {
        out.clear();
        if self.nodes.is_empty() || !(qbeg < qend) {
            return 0;
        }
        let Some(prediction) = self.model.predict_leaf(qbeg, self.nodes.len()) else {
            return scan(&self.nodes, self.shape.root, qbeg, qend, out);
        };

        // climb until nothing outside the subtree can overlap
        let mut subtree = prediction;
        let mut climb_cost = 0u64;
        while subtree != self.shape.root
            && (subtree >= self.nodes.len()
                || qbeg < self.nodes[subtree].outside_max_end
                || self.outside_min_beg(subtree) < qend)
        {
            match self.shape.parent(subtree) {
                Some(p) => subtree = p,
                None => break,
            }
            climb_cost += 1;
        }

        self.queries.fetch_add(1, Ordering::Relaxed);
        self.total_climb_cost.fetch_add(climb_cost, Ordering::Relaxed);

        scan(&self.nodes, subtree, qbeg, qend, out) + climb_cost as usize
    }

    /// Overlap query returning a freshly allocated result vector.
    pub fn overlap(&self, qbeg: I::Pos, qend: I::Pos) -> Vec<I> {
        let mut out = Vec::new();
        self.overlap_into(qbeg, qend, &mut out);
        out
    }

    #[cfg(test)]
    fn disable_model(&mut self) {
        self.model.clear_parameters();
    }
}
