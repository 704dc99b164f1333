//! Per-domain linear rank prediction.
//!
//! Interpolated queries need a starting leaf close to where the answer
//! lives. Position usually tracks rank well in real datasets, but rarely
//! with one global line, so the begin-position range is split into
//! equal-width domains and each domain gets its own least-squares fit of
//! within-level offset against position. A domain whose fit is degenerate or
//! whose mean absolute residual exceeds half the tree height keeps NaN
//! parameters and abstains; queries landing there fall back to a root scan.
//!
//! Parameters are held at single precision to keep the model array small
//! and cache-friendly; regression accumulates in double precision.

use num_traits::{NumCast, ToPrimitive};

use crate::interval::Position;

/// Ordinary least squares of `y ~ x`, returning `(intercept, slope)`.
///
/// Empty input yields NaNs; zero variance in `x` yields the flat model
/// `(0, 0)`.
pub(crate) fn regress(points: &[(f64, f64)]) -> (f64, f64) {
    if points.is_empty() {
        return (f64::NAN, f64::NAN);
    }
    let n = points.len() as f64;
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    for &(x, y) in points {
        sum_x += x;
        sum_y += y;
    }
    let mean_x = sum_x / n;
    let mean_y = sum_y / n;

    let mut cov = 0.0;
    let mut var = 0.0;
    for &(x, y) in points {
        let x_err = x - mean_x;
        cov += x_err * (y - mean_y);
        var += x_err * x_err;
    }
    if var == 0.0 {
        return (0.0, 0.0);
    }
    let slope = cov / var;
    (mean_y - slope * mean_x, slope)
}

/// Mean of `|y - (intercept + slope * x)|` over the points; NaN when empty.
pub(crate) fn mean_absolute_residual(points: &[(f64, f64)], intercept: f64, slope: f64) -> f64 {
    if points.is_empty() {
        return f64::NAN;
    }
    let mut sum = 0.0;
    for &(x, y) in points {
        sum += (y - (slope * x + intercept)).abs();
    }
    sum / points.len() as f64
}

/// Domain-partitioned rank predictor.
///
/// Stores three `f32` parameters per domain: intercept, slope, and the tree
/// level the model targets. A NaN level marks an abstaining domain.
#[derive(Clone, Debug)]
pub(crate) struct RankModel<P> {
    domains: usize,
    min_beg: P,
    domain_size: P,
    parameters: Vec<f32>,
}

impl<P: Position> RankModel<P> {
    /// A model that abstains for every position.
    pub(crate) fn untrained(domains: usize) -> Self {
        RankModel {
            domains,
            min_beg: P::max_value(),
            domain_size: P::max_value(),
            parameters: vec![f32::NAN; domains * 3],
        }
    }

    /// Fit one regression per domain from the begin positions of the real
    /// nodes at `level`, given in rank order (so index == offset within the
    /// level). `min_beg`/`max_beg` span the whole sorted array, not just the
    /// training level.
    pub(crate) fn train(
        begs_at_level: &[P],
        min_beg: P,
        max_beg: P,
        domains: usize,
        level: u32,
        root_level: u32,
    ) -> Self {
        let mut model = Self::untrained(domains);
        if begs_at_level.is_empty() {
            return model;
        }
        model.min_beg = min_beg;
        let d: P = NumCast::from(domains).unwrap_or_else(P::one);
        model.domain_size = P::one() + (max_beg - min_beg) / d;

        let mut points: Vec<Vec<(f64, f64)>> = vec![Vec::new(); domains];
        for (ofs, &beg) in begs_at_level.iter().enumerate() {
            let x = beg.to_f64().unwrap_or(f64::NAN);
            points[model.which_domain(beg)].push((x, ofs as f64));
        }

        // A model whose typical miss already spans half the tree height
        // cannot beat the top-down scan; reject it.
        let max_residual = <f64 as From<u32>>::from(1u32 << (root_level / 2));
        for (which, pts) in points.iter().enumerate() {
            let (intercept, slope) = regress(pts);
            if intercept.is_finite()
                && slope.is_finite()
                && mean_absolute_residual(pts, intercept, slope) <= max_residual
            {
                model.parameters[3 * which] = intercept as f32;
                model.parameters[3 * which + 1] = slope as f32;
                model.parameters[3 * which + 2] = level as f32;
            }
        }
        model
    }

    /// Domain owning position `p`; positions below the trained range map to
    /// domain 0, positions above clamp to the last domain.
    pub(crate) fn which_domain(&self, p: P) -> usize {
        if p < self.min_beg {
            return 0;
        }
        let d = ((p - self.min_beg) / self.domain_size)
            .to_usize()
            .unwrap_or(0);
        d.min(self.domains - 1)
    }

    /// Predict the rank of the leaf nearest `qbeg`, or `None` if the owning
    /// domain abstains. `len` is the real node count; off-scale-high
    /// predictions clamp to the rightmost real leaf.
    pub(crate) fn predict_leaf(&self, qbeg: P, len: usize) -> Option<usize> {
        let which = self.which_domain(qbeg);
        let level_f = self.parameters[3 * which + 2];
        if !level_f.is_finite() {
            return None;
        }
        let level = level_f as u32;

        let q = qbeg.to_f32().unwrap_or(f32::NAN);
        let ofs_f = self.parameters[3 * which] + self.parameters[3 * which + 1] * q;
        if !ofs_f.is_finite() {
            return None;
        }
        let ofs = ofs_f.round().max(0.0) as usize;

        let rank = (1usize << level)
            .saturating_mul(ofs.saturating_mul(2).saturating_add(1))
            .saturating_sub(1);
        Some(if rank < len {
            rank
        } else {
            len - (2 - len % 2)
        })
    }

    /// Number of domains.
    pub(crate) fn domains(&self) -> usize {
        self.domains
    }

    /// Approximate heap memory usage in bytes.
    pub(crate) fn heap_bytes(&self) -> usize {
        self.parameters.capacity() * std::mem::size_of::<f32>()
    }

    #[cfg(test)]
    pub(crate) fn clear_parameters(&mut self) {
        for p in &mut self.parameters {
            *p = f32::NAN;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regress_exact_line() {
        let points: Vec<(f64, f64)> = (0..10).map(|i| (i as f64, 3.0 + 2.0 * i as f64)).collect();
        let (intercept, slope) = regress(&points);
        assert!((intercept - 3.0).abs() < 1e-9);
        assert!((slope - 2.0).abs() < 1e-9);
        assert!(mean_absolute_residual(&points, intercept, slope) < 1e-9);
    }

    #[test]
    fn test_regress_empty_is_nan() {
        let (intercept, slope) = regress(&[]);
        assert!(intercept.is_nan() && slope.is_nan());
        assert!(mean_absolute_residual(&[], 0.0, 0.0).is_nan());
    }

    #[test]
    fn test_regress_zero_variance_is_flat() {
        let points = vec![(5.0, 1.0), (5.0, 2.0), (5.0, 3.0)];
        assert_eq!(regress(&points), (0.0, 0.0));
    }

    #[test]
    fn test_which_domain_bounds() {
        // 10 leaves, begs 0..100 step 10, 4 domains
        let begs: Vec<u32> = (0..10).map(|i| i * 10).collect();
        let model = RankModel::train(&begs, 0, 90, 4, 0, 4);
        assert_eq!(model.which_domain(0), 0);
        assert_eq!(model.which_domain(90), 3);
        // clamped on both sides
        assert_eq!(model.which_domain(u32::MAX - 1), 3);
    }

    #[test]
    fn test_predict_on_uniform_leaves() {
        // leaves at ranks 0,2,4,... with begs 0,10,20,...
        let begs: Vec<u32> = (0..64).map(|i| i * 10).collect();
        let model = RankModel::train(&begs, 0, 630, 1, 0, 6);
        for (ofs, &beg) in begs.iter().enumerate() {
            let rank = model.predict_leaf(beg, 127).unwrap();
            assert_eq!(rank, 2 * ofs, "beg {beg}");
        }
    }

    #[test]
    fn test_predict_clamps_high() {
        let begs: Vec<u32> = (0..8).map(|i| i * 10).collect();
        let model = RankModel::train(&begs, 0, 70, 1, 0, 3);
        // way past the trained range: still a real leaf
        let rank = model.predict_leaf(1_000_000, 15).unwrap();
        assert_eq!(rank, 14);
    }

    #[test]
    fn test_untrained_abstains() {
        let model = RankModel::<u32>::untrained(3);
        assert_eq!(model.predict_leaf(42, 10), None);
        assert_eq!(model.domains(), 3);
    }

    #[test]
    fn test_excessive_residual_rejected() {
        // Shuffled begs: position carries no rank information, so the mean
        // absolute residual blows past the acceptance budget of 2^0 = 1.
        let begs: Vec<u32> = vec![500, 1, 990, 37, 640, 12, 880, 210, 45, 770];
        let model = RankModel::train(&begs, 1, 990, 1, 0, 1);
        assert_eq!(model.predict_leaf(500, 19), None);
    }
}
