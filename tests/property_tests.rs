use proptest::prelude::*;
use ivix::{Builder, IntervalTree, InterpolatedIntervalTree};

type Item = (u32, u32, u32);

fn make_items(spans: &[(u32, u32)]) -> Vec<Item> {
    spans
        .iter()
        .enumerate()
        .map(|(id, &(beg, len))| (beg, beg + len, id as u32))
        .collect()
}

fn oracle(items: &[Item], qbeg: u32, qend: u32) -> Vec<Item> {
    let mut hits: Vec<Item> = items
        .iter()
        .copied()
        .filter(|it| qbeg < qend && it.0 < qend && it.1 > qbeg)
        .collect();
    hits.sort_unstable();
    hits
}

fn sorted(mut hits: Vec<Item>) -> Vec<Item> {
    hits.sort_unstable();
    hits
}

proptest! {
    #[test]
    fn test_overlap_matches_oracle(
        spans in prop::collection::vec((0..10_000u32, 0..500u32), 0..200),
        queries in prop::collection::vec((0..11_000u32, 1..300u32), 1..20),
    ) {
        let items = make_items(&spans);
        let base: IntervalTree<Item> = items.iter().copied().collect::<Builder<_>>().build().unwrap();

        let mut out = Vec::new();
        for &(qbeg, width) in &queries {
            let qend = qbeg + width;
            let expect = oracle(&items, qbeg, qend);
            let cost = base.overlap_into(qbeg, qend, &mut out);
            prop_assert_eq!(&sorted(out.clone()), &expect);
            prop_assert!(cost >= out.len());
        }
    }

    #[test]
    fn test_variants_agree(
        spans in prop::collection::vec((0..5_000u32, 0..300u32), 0..150),
        queries in prop::collection::vec((0..6_000u32, 1..200u32), 1..15),
        domains in 1..50u32,
    ) {
        let items = make_items(&spans);
        let base: IntervalTree<Item> = items.iter().copied().collect::<Builder<_>>().build().unwrap();
        let interp: InterpolatedIntervalTree<Item> = items
            .iter()
            .copied()
            .collect::<Builder<_>>()
            .build_interpolated(domains)
            .unwrap();

        for &(qbeg, width) in &queries {
            let qend = qbeg + width;
            let expect = base.overlap(qbeg, qend);
            let got = interp.overlap(qbeg, qend);
            prop_assert_eq!(&got, &expect, "domains {} query [{}, {})", domains, qbeg, qend);
            prop_assert_eq!(&sorted(got.clone()), &oracle(&items, qbeg, qend));
        }
    }

    #[test]
    fn test_heavy_ties_match_oracle(
        // few distinct begs, many intervals: maximal tie pressure on the
        // outside augment and its derived minimum
        begs in prop::collection::vec(0..8u32, 1..120),
        lens in prop::collection::vec(0..40u32, 1..120),
        queries in prop::collection::vec((0..60u32, 1..20u32), 1..25),
        domains in 1..10u32,
    ) {
        let spans: Vec<(u32, u32)> = begs
            .iter()
            .zip(lens.iter())
            .map(|(&b, &l)| (b * 5, l))
            .collect();
        let items = make_items(&spans);
        let interp: InterpolatedIntervalTree<Item> = items
            .iter()
            .copied()
            .collect::<Builder<_>>()
            .build_interpolated(domains)
            .unwrap();

        for &(qbeg, width) in &queries {
            let qend = qbeg + width;
            prop_assert_eq!(
                sorted(interp.overlap(qbeg, qend)),
                oracle(&items, qbeg, qend)
            );
        }
    }

    #[test]
    fn test_buffer_order_irrelevant(
        spans in prop::collection::vec((0..1_000u32, 0..100u32), 1..60),
        seed in any::<u64>(),
    ) {
        let items = make_items(&spans);
        let mut shuffled = items.clone();
        // cheap deterministic shuffle
        let mut state = seed | 1;
        for i in (1..shuffled.len()).rev() {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            shuffled.swap(i, (state as usize) % (i + 1));
        }

        let a = items.iter().copied().collect::<Builder<_>>().build().unwrap();
        let b = shuffled.iter().copied().collect::<Builder<_>>().build().unwrap();
        prop_assert_eq!(
            a.iter().collect::<Vec<_>>(),
            b.iter().collect::<Vec<_>>()
        );
        prop_assert_eq!(a.overlap(0, 1_200), b.overlap(0, 1_200));
    }

    #[test]
    fn test_degenerate_queries(
        spans in prop::collection::vec((0..1_000u32, 0..100u32), 0..60),
        q in 0..1_500u32,
    ) {
        let items = make_items(&spans);
        let base: IntervalTree<Item> = items.iter().copied().collect::<Builder<_>>().build().unwrap();
        let interp: InterpolatedIntervalTree<Item> = items
            .iter()
            .copied()
            .collect::<Builder<_>>()
            .build_interpolated(5)
            .unwrap();

        // empty and inverted queries are empty at zero cost
        let mut out = Vec::new();
        prop_assert_eq!(base.overlap_into(q, q, &mut out), 0);
        prop_assert!(out.is_empty());
        prop_assert_eq!(interp.overlap_into(q.saturating_add(10), q, &mut out), 0);
        prop_assert!(out.is_empty());
    }
}

// Scaled-down rendition of the large random workload: both variants agree
// everywhere, and with plenty of domains the interpolated tree's mean visit
// count stays in the same ballpark as the base tree's.
#[test]
fn test_seeded_scale_equivalence_and_cost() {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(0x5eed);
    let items: Vec<Item> = (0..20_000)
        .map(|id| {
            let beg = rng.gen_range(0..1_000_000u32);
            (beg, beg + rng.gen_range(1..1_000u32), id)
        })
        .collect();

    let base: IntervalTree<Item> = items.iter().copied().collect::<Builder<_>>().build().unwrap();
    let interp: InterpolatedIntervalTree<Item> = items
        .iter()
        .copied()
        .collect::<Builder<_>>()
        .build_interpolated(1_000)
        .unwrap();

    let mut base_cost = 0usize;
    let mut interp_cost = 0usize;
    let mut out_a = Vec::new();
    let mut out_b = Vec::new();
    for _ in 0..2_000 {
        let qbeg = rng.gen_range(0..1_000_000u32);
        let qend = qbeg + 10;
        base_cost += base.overlap_into(qbeg, qend, &mut out_a);
        interp_cost += interp.overlap_into(qbeg, qend, &mut out_b);
        assert_eq!(out_a, out_b, "query [{qbeg}, {qend})");
    }

    // nearly every query should ride a prediction; sparse domains may abstain
    assert!(interp.queries() >= 1_900, "queries {}", interp.queries());
    // loose cost bound: the climb must not regress the mean visit count by
    // more than a small factor
    assert!(
        interp_cost <= 3 * base_cost,
        "interp {interp_cost} vs base {base_cost}"
    );
}
