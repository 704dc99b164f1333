#![no_main]
use libfuzzer_sys::fuzz_target;

use ivix::Builder;

type Item = (u32, u32, u32);

fuzz_target!(|data: (Vec<(u16, u16)>, Vec<(u16, u16)>, u8)| {
    let (spans, queries, domains) = data;
    if spans.len() > 512 || queries.is_empty() {
        return;
    }

    let items: Vec<Item> = spans
        .iter()
        .enumerate()
        .map(|(id, &(beg, len))| {
            let beg = u32::from(beg);
            (beg, beg + u32::from(len), id as u32)
        })
        .collect();

    let base = items
        .iter()
        .copied()
        .collect::<Builder<_>>()
        .build()
        .expect("endpoints are in range");
    let interp = items
        .iter()
        .copied()
        .collect::<Builder<_>>()
        .build_interpolated(u32::from(domains))
        .expect("endpoints are in range");

    let mut out_base = Vec::new();
    let mut out_interp = Vec::new();
    for &(qbeg, width) in &queries {
        let qbeg = u32::from(qbeg);
        let qend = qbeg + u32::from(width);

        let cost = base.overlap_into(qbeg, qend, &mut out_base);
        interp.overlap_into(qbeg, qend, &mut out_interp);
        assert_eq!(out_base, out_interp);
        assert!(cost >= out_base.len());

        let mut expect: Vec<Item> = items
            .iter()
            .copied()
            .filter(|it| qbeg < qend && it.0 < qend && it.1 > qbeg)
            .collect();
        expect.sort_unstable();
        let mut got = out_base.clone();
        got.sort_unstable();
        assert_eq!(got, expect);
    }
});
