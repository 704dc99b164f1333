//! Buffering builder shared by both index types.

use crate::error::{Error, Result};
use crate::interpolated::InterpolatedIntervalTree;
use crate::interval::{Interval, Position};
use crate::tree::IntervalTree;

/// Accumulates items, then constructs an index in one shot.
///
/// Items may arrive one at a time through [`Builder::add`] or in bulk
/// through [`Extend`]/[`FromIterator`]; the two paths are equivalent, since
/// construction sorts the buffer regardless of arrival order. `build*`
/// consumes the builder.
///
/// ```
/// use ivix::Builder;
///
/// let mut b = Builder::new();
/// b.add((12u32, 34u32));
/// b.add((0, 23));
/// b.extend([(34, 56)]);
/// let tree = b.build().unwrap();
/// assert_eq!(tree.overlap(22, 25), vec![(0, 23), (12, 34)]);
/// ```
#[derive(Debug, Clone)]
pub struct Builder<I> {
    items: Vec<I>,
}

impl<I> Default for Builder<I> {
    fn default() -> Self {
        Builder { items: Vec::new() }
    }
}

impl<I: Interval> Builder<I> {
    /// Create an empty builder.
    pub fn new() -> Self {
        Builder { items: Vec::new() }
    }

    /// Append one item. O(1) amortised; no validation happens until build.
    pub fn add(&mut self, item: I) {
        self.items.push(item);
    }

    /// Number of buffered items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if no items have been buffered.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sort, augment, and construct an [`IntervalTree`] from the buffer.
    pub fn build(self) -> Result<IntervalTree<I>> {
        IntervalTree::from_items(self.items)
    }

    /// Construct an [`InterpolatedIntervalTree`], training one rank
    /// prediction model per domain. `max(1, domains)` is used.
    pub fn build_interpolated(self, domains: u32) -> Result<InterpolatedIntervalTree<I>> {
        InterpolatedIntervalTree::from_items(self.items, domains)
    }
}

impl<I: Interval> Extend<I> for Builder<I> {
    fn extend<T: IntoIterator<Item = I>>(&mut self, iter: T) {
        self.items.extend(iter);
    }
}

impl<I: Interval> FromIterator<I> for Builder<I> {
    fn from_iter<T: IntoIterator<Item = I>>(iter: T) -> Self {
        Builder {
            items: Vec::from_iter(iter),
        }
    }
}

/// Reject items whose endpoints are unordered or use the reserved sentinel.
///
/// Indices in the returned error refer to buffer order, before sorting.
pub(crate) fn validate<I: Interval>(items: &[I]) -> Result<()> {
    let npos = I::Pos::npos();
    for (i, item) in items.iter().enumerate() {
        let (beg, end) = (item.beg(), item.end());
        if !(beg <= end) {
            return Err(Error::InvalidInterval(i));
        }
        if beg == npos || end == npos {
            return Err(Error::ReservedPosition(i));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_streaming_and_bulk_paths_agree() {
        let items = vec![(10u32, 20u32), (5, 8), (0, 100), (5, 30)];

        let mut one_by_one = Builder::new();
        for &it in &items {
            one_by_one.add(it);
        }
        let a = one_by_one.build().unwrap();

        let b = items.iter().copied().collect::<Builder<_>>().build().unwrap();

        assert_eq!(a.iter().collect::<Vec<_>>(), b.iter().collect::<Vec<_>>());
        assert_eq!(a.overlap(6, 12), b.overlap(6, 12));
    }

    #[test]
    fn test_rejects_inverted_interval() {
        let mut b = Builder::new();
        b.add((5u32, 10u32));
        b.add((9u32, 3u32));
        assert_eq!(b.build().err(), Some(Error::InvalidInterval(1)));
    }

    #[test]
    fn test_rejects_nan_endpoint() {
        let mut b = Builder::new();
        b.add((f64::NAN, 1.0));
        assert_eq!(b.build().err(), Some(Error::InvalidInterval(0)));
    }

    #[test]
    fn test_rejects_sentinel_endpoint() {
        let mut b = Builder::new();
        b.add((0u32, u32::MAX));
        assert_eq!(b.build().err(), Some(Error::ReservedPosition(0)));
    }

    #[test]
    fn test_empty_build_succeeds() {
        let tree = Builder::<(u32, u32)>::new().build().unwrap();
        assert!(tree.is_empty());
        let tree = Builder::<(u32, u32)>::new().build_interpolated(4).unwrap();
        assert!(tree.is_empty());
    }
}
