//! Implicit augmented interval tree over a sorted array.
//!
//! The classic augmented interval tree keeps, at every node, the maximum
//! interval end anywhere in its subtree; overlap queries then prune whole
//! subtrees whose augment cannot reach the query. Here the tree has no nodes
//! to point at: after sorting by `(beg, end)` the array *is* the tree, with
//! parent/child identity given by rank arithmetic (see `geometry`). One
//! contiguous allocation, no per-node pointers, and construction is a sort
//! plus a single bottom-up sweep.
//!
//! The subtree scan is shared with the interpolated variant, which stores a
//! wider node but walks the same geometry.

use std::cmp::Ordering;

use crate::builder::{self, Builder};
use crate::error::Result;
use crate::geometry::{self, Shape};
use crate::interval::Interval;

/// Max for positions that are only `PartialOrd` (float axes).
#[inline]
pub(crate) fn pmax<P: PartialOrd>(a: P, b: P) -> P {
    if b > a {
        b
    } else {
        a
    }
}

/// Storage atom shared by both tree variants: an item plus the subtree
/// max-end augment. The interpolated tree layers one more augment on top.
pub(crate) trait AugmentedNode<I: Interval>: Clone {
    fn new(item: I) -> Self;
    fn item(&self) -> &I;
    fn inside_max_end(&self) -> I::Pos;
    fn set_inside_max_end(&mut self, end: I::Pos);

    #[inline]
    fn beg(&self) -> I::Pos {
        self.item().beg()
    }

    #[inline]
    fn end(&self) -> I::Pos {
        self.item().end()
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Node<I: Interval> {
    pub(crate) item: I,
    pub(crate) inside_max_end: I::Pos,
}

impl<I: Interval> AugmentedNode<I> for Node<I> {
    fn new(item: I) -> Self {
        let inside_max_end = item.end();
        Node {
            item,
            inside_max_end,
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

/// Sort ascending by `(beg, end)`. Endpoints that fail to compare sort as
/// equal; construction has already rejected them by this point.
pub(crate) fn sort_by_interval<I: Interval, N: AugmentedNode<I>>(nodes: &mut [N]) {
    nodes.sort_unstable_by(|a, b| match a.beg().partial_cmp(&b.beg()) {
        Some(Ordering::Equal) | None => a.end().partial_cmp(&b.end()).unwrap_or(Ordering::Equal),
        Some(ord) => ord,
    });
}

/// Bottom-up `inside_max_end` sweep over the sorted array.
///
/// The complete tree may extend past the real nodes on the right. A node on
/// that border can have an imaginary right child, whose effective augment is
/// whatever the border carried at the last real node below. The sweep
/// memoizes the border path from the rightmost real leaf to the root and
/// threads the running border augment up level by level.
pub(crate) fn augment_inside<I: Interval, N: AugmentedNode<I>>(nodes: &mut [N], shape: &Shape) {
    let n = nodes.len();
    if n == 0 {
        return;
    }

    // Border path, one rank per level. Entries above the real range are
    // imaginary and never matched by the sweep below.
    let mut border = Vec::with_capacity(shape.root_level as usize + 1);
    let mut b = shape.rightmost_real_leaf();
    border.push(b);
    while let Some(p) = shape.parent(b) {
        b = p;
        border.push(b);
    }

    let mut border_ime = nodes[border[0]].inside_max_end();
    for lv in 1..=shape.root_level {
        let step = 1usize << (lv + 1);
        let mut rank = (1usize << lv) - 1;
        while rank < n {
            let mut ime = nodes[rank].end();
            if let Some(l) = geometry::left_child(rank) {
                ime = pmax(ime, nodes[l].inside_max_end());
            }
            match geometry::right_child(rank) {
                Some(r) if r < n => ime = pmax(ime, nodes[r].inside_max_end()),
                // imaginary right child: inherit the last border observation
                _ => ime = pmax(ime, border_ime),
            }
            nodes[rank].set_inside_max_end(ime);
            if border[lv as usize] == rank {
                border_ime = ime;
            }
            rank += step;
        }
    }
}

/// Recursive subtree scan for `[qbeg, qend)`.
///
/// Appends every overlapping item to `out` and returns the number of ranks
/// visited; recursion depth is bounded by the tree height. Imaginary ranks
/// have entirely imaginary right subtrees, so only the left edge is
/// descended there.
pub(crate) fn scan<I: Interval, N: AugmentedNode<I>>(
    nodes: &[N],
    subtree: usize,
    qbeg: I::Pos,
    qend: I::Pos,
    out: &mut Vec<I>,
) -> usize {
    if subtree >= nodes.len() {
        return 1 + match geometry::left_child(subtree) {
            Some(l) => scan(nodes, l, qbeg, qend, out),
            None => 0,
        };
    }

    let node = &nodes[subtree];
    let mut cost = 1;
    if node.inside_max_end() > qbeg {
        // something in this subtree extends into or over the query
        if let Some(l) = geometry::left_child(subtree) {
            cost += scan(nodes, l, qbeg, qend, out);
        }
        if node.beg() < qend {
            if node.end() > qbeg {
                out.push(node.item().clone());
            }
            cost += match geometry::right_child(subtree) {
                Some(r) => scan(nodes, r, qbeg, qend, out),
                None => 0,
            };
        }
    }
    cost
}

/// Static interval index answering overlap queries from the root down.
///
/// Built once from a [`Builder`], immutable afterwards; queries are
/// read-only and safe to run concurrently.
///
/// ```
/// use ivix::IntervalTree;
///
/// let mut b = IntervalTree::builder();
/// b.extend([(0u32, 100u32), (10, 20), (20, 30)]);
/// let tree = b.build().unwrap();
/// assert_eq!(tree.overlap(20, 21), vec![(0, 100), (20, 30)]);
/// ```
#[derive(Clone)]
pub struct IntervalTree<I: Interval> {
    nodes: Vec<Node<I>>,
    shape: Shape,
}

impl<I: Interval> std::fmt::Debug for IntervalTree<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntervalTree")
            .field("len", &self.nodes.len())
            .field("height", &self.shape.root_level)
            .finish()
    }
}

impl<I: Interval> IntervalTree<I> {
    /// Create an empty [`Builder`] for this index type.
    pub fn builder() -> Builder<I> {
        Builder::new()
    }

    pub(crate) fn from_items(items: Vec<I>) -> Result<Self> {
        builder::validate(&items)?;
        let mut nodes: Vec<Node<I>> = items.into_iter().map(Node::new).collect();
        let shape = Shape::new(nodes.len());
        sort_by_interval(&mut nodes);
        augment_inside(&mut nodes, &shape);
        Ok(IntervalTree { nodes, shape })
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
        self.nodes.capacity() * std::mem::size_of::<Node<I>>()
    }

    /// Overlap query: clear `out`, append every item overlapping
    /// `[qbeg, qend)`, and return the number of tree ranks visited.
    ///
    /// `qbeg < qend` is the caller's lookout; if it does not hold the result
    /// is empty at cost 0.
    pub fn overlap_into(&self, qbeg: I::Pos, qend: I::Pos, out: &mut Vec<I>) -> usize {
        out.clear();
        if self.nodes.is_empty() || !(qbeg < qend) {
            return 0;
        }
        let cost = scan(&self.nodes, self.shape.root, qbeg, qend, out);
        debug_assert!(cost <= self.shape.full_size);
        cost
    }

    /// Overlap query returning a freshly allocated result vector.
    pub fn overlap(&self, qbeg: I::Pos, qend: I::Pos) -> Vec<I> {
        let mut out = Vec::new();
        self.overlap_into(qbeg, qend, &mut out);
        out
    }
}
