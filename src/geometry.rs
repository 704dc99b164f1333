//! Implicit complete-binary-tree geometry over array ranks.
//!
//! The tree stores no child or parent pointers at all. Nodes live in a flat
//! array sorted by interval, and a node's structural position follows from
//! its rank alone:
//!
//! ```text
//! rank   0  1  2  3  4  5  6  7  8 ...
//! level  0  1  0  2  0  1  0  3  0 ...
//! ```
//!
//! `level(r)` counts the trailing one-bits of `r`; leaves sit at level 0 on
//! the even ranks, and each parent is exactly one level up. The containing
//! complete tree may be larger than the node count `N`; ranks in `[N, F)`
//! are *imaginary*: never materialised, but still traversed by the rank
//! arithmetic below.

/// Level of the node at `rank`: the number of trailing one-bits.
#[inline]
pub(crate) fn level(rank: usize) -> u32 {
    rank.trailing_ones()
}

/// Left child of `rank`, or `None` for a leaf.
#[inline]
pub(crate) fn left_child(rank: usize) -> Option<usize> {
    let lv = level(rank);
    if lv == 0 {
        None
    } else {
        Some(rank - (1usize << (lv - 1)))
    }
}

/// Right child of `rank`, or `None` for a leaf.
#[inline]
pub(crate) fn right_child(rank: usize) -> Option<usize> {
    let lv = level(rank);
    if lv == 0 {
        None
    } else {
        Some(rank + (1usize << (lv - 1)))
    }
}

/// Lowest rank in the subtree rooted at `rank` (the rank itself for leaves).
#[inline]
pub(crate) fn leftmost_child(rank: usize) -> usize {
    rank - ((1usize << level(rank)) - 1)
}

/// Highest rank in the subtree rooted at `rank` (the rank itself for leaves).
#[inline]
pub(crate) fn rightmost_child(rank: usize) -> usize {
    rank + ((1usize << level(rank)) - 1)
}

/// Geometry of the smallest complete binary tree covering `len` real nodes.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Shape {
    /// Number of real nodes.
    pub(crate) len: usize,
    /// Size of the containing complete tree, imaginary ranks included.
    pub(crate) full_size: usize,
    /// Rank of the root.
    pub(crate) root: usize,
    /// Level of the root; the tree height.
    pub(crate) root_level: u32,
}

impl Shape {
    pub(crate) fn new(len: usize) -> Self {
        let mut root_level = 0u32;
        let mut full_size = 1usize;
        while full_size < len {
            root_level += 1;
            full_size = 2 * full_size + 1;
        }
        Shape {
            len,
            full_size,
            root: (1usize << root_level) - 1,
            root_level,
        }
    }

    /// Parent of `rank`, or `None` at the root.
    #[inline]
    pub(crate) fn parent(&self, rank: usize) -> Option<usize> {
        if rank == self.root {
            return None;
        }
        let lv = level(rank);
        let ofs = 1usize << lv;
        if (rank >> (lv + 1)) & 1 == 1 {
            // right child
            Some(rank - ofs)
        } else {
            Some(rank + ofs)
        }
    }

    /// Rank of the highest-ranked real leaf.
    ///
    /// Requires `len > 0`. This leaf anchors the border path between real
    /// and imaginary ranks walked during bottom-up augmentation.
    #[inline]
    pub(crate) fn rightmost_real_leaf(&self) -> usize {
        self.len - (2 - self.len % 2)
    }
}
