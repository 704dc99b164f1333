//! # Implicit Interval Trees
//!
//! *Overlap queries over a sorted array, with no tree to build.*
//!
//! ## Intuition First
//!
//! Picture a shelf of folders, each labelled with the date range it covers,
//! sorted by starting date. To find every folder touching a given week you
//! could walk the whole shelf. Or you could exploit the sorting plus one
//! extra note per folder ("nothing filed before me runs past March") to skip
//! whole runs of the shelf at once.
//!
//! An interval tree is that skipping strategy made systematic. An *implicit*
//! interval tree goes one step further: the shelf stays exactly as it is,
//! one sorted array, and the tree exists only as arithmetic on array
//! positions. No pointers, no per-node allocations, just the array itself.
//!
//! ## The Problem
//!
//! Pointer-based interval trees pay for their flexibility:
//! - **Space**: two child pointers and assorted balance bookkeeping per node.
//! - **Locality**: every descent hop is a potential cache miss.
//! - **Build cost**: N insertions with rebalancing, versus one sort.
//!
//! Static workloads (build once, query forever) don't need any of that. And
//! on very large static indexes even the pointer-free top-down descent is
//! wasteful: the first several levels of every query visit the same few
//! high ranks that almost never prune anything.
//!
//! ## Historical Context
//!
//! ```text
//! 1980  Edelsbrunner  Interval trees: stabbing queries in O(log n + k)
//! 1990  Cormen et al. The textbook augmented red-black formulation
//! 2018  Kraska et al. "The Case for Learned Index Structures"
//! 2019  Li            cgranges: the implicit (array-ranked) layout
//! 2019  Lin           Interpolation-indexed variant: predict a leaf, climb
//! ```
//!
//! The two newest ideas compose: lay the augmented tree out implicitly in a
//! sorted array, then learn an approximate position→rank mapping so queries
//! can start near their answer and climb only as far as provably necessary.
//!
//! ## Mathematical Formulation
//!
//! Items carry half-open intervals `[beg, end)`; `[a, b)` and `[c, d)`
//! overlap iff `a < d && c < b`. Nodes sorted by `(beg, end)` occupy ranks
//! `0..N`; rank `r` sits at level `level(r)` = trailing one-bits of `r`, and
//! parent/child identity is rank arithmetic. Each node is augmented with
//! `inside_max_end`, the maximum `end` in its subtree; the interpolated
//! variant adds `outside_max_end` (maximum `end` among nodes outside the
//! subtree with smaller `beg`), which together with its mirror
//! `outside_min_beg` certifies when a subtree must contain every hit.
//!
//! ## Complexity Analysis
//!
//! - **Build**: one sort plus O(N) augment sweeps.
//! - **Query**: O(log N + k) rank visits top-down; the interpolated climb
//!   replaces the O(log N) descent with a climb proportional to the model's
//!   prediction error, often O(1) levels on well-behaved data.
//! - **Space**: the node array, plus three `f32` parameters per model domain.
//!
//! ## What Could Go Wrong
//!
//! 1. **Static only**: there is no insert or delete after build; rebuild
//!    instead.
//! 2. **Adversarial position distributions**: a domain whose positions carry
//!    no rank information trains a useless model. Such domains are detected
//!    at build time and abstain; their queries fall back to the top-down
//!    scan, trading speed, never correctness.
//!
//! ## Implementation Notes
//!
//! This crate provides:
//! - **[`IntervalTree`]**: the implicit augmented interval tree.
//! - **[`InterpolatedIntervalTree`]**: the same tree plus per-domain linear
//!   rank prediction and bottom-up queries.
//! - **[`Builder`]**: buffering construction for either index.
//!
//! Both indexes are generic over the item type through the [`Interval`]
//! accessor trait and over the coordinate axis through [`Position`], so
//! integer and floating-point axes monomorphise with inlined accessors.
//!
//! ## References
//!
//! - Edelsbrunner, H. (1980). "Dynamic rectangle intersection searching."
//! - Li, H. (2021). "Bedtk: finding interval overlap with implicit interval
//!   tree."
//! - Kraska, T., et al. (2018). "The Case for Learned Index Structures."

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod error;
mod geometry;
pub mod interpolated;
pub mod interval;
mod model;
pub mod tree;

pub use builder::Builder;
pub use error::{Error, Result};
pub use interpolated::InterpolatedIntervalTree;
pub use interval::{Interval, Position};
pub use tree::IntervalTree;
