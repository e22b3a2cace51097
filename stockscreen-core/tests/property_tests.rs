//! Property tests for screening invariants.
//!
//! Uses proptest to verify:
//! 1. MA order invariance: shuffling input rows does not change the result
//! 2. WR bounds: every defined value lies in [-100, 0]
//! 3. Chain monotonicity: each stage narrows, never widens
//! 4. Normalization idempotence: canonical output normalizes to itself

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use stockscreen_core::data::SyntheticFeed;
use stockscreen_core::domain::{normalize_symbol, Bar, BarSeries, SamplingPeriod, TimeRange};
use stockscreen_core::indicators::{Indicator, MovingAverage, WilliamsR};
use stockscreen_core::predicate::{PredicateSpec, RawOperand};
use stockscreen_core::FilterChain;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_closes() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0..500.0_f64, 1..60)
}

fn bars_for(closes: &[f64]) -> Vec<Bar> {
    let base = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            timestamp: base + Duration::days(i as i64),
            open: close,
            high: close * 1.02,
            low: close * 0.98,
            close,
            volume: 1_000,
            amount: close * 1_000.0,
        })
        .collect()
}

fn arb_predicate() -> impl Strategy<Value = PredicateSpec> {
    prop_oneof![
        (1usize..15, 1usize..15, prop::bool::ANY).prop_map(|(period1, period2, gt)| {
            PredicateSpec::MaCompare {
                period1,
                period2,
                relation: if gt { "gt" } else { "lt" }.into(),
            }
        }),
        (1usize..15, prop::sample::select(vec!["gt", "lt", "eq", "gte", "lte"])).prop_map(
            |(p, rel)| PredicateSpec::Compare {
                left: RawOperand::Name("close".into()),
                right: RawOperand::Name(format!("MA{p}")),
                relation: rel.into(),
                sampling_period: "1d".into(),
            }
        ),
        (80.0..120.0_f64).prop_map(|level| PredicateSpec::Compare {
            left: RawOperand::Name("close".into()),
            right: RawOperand::Number(level),
            relation: "gt".into(),
            sampling_period: "1d".into(),
        }),
        (2usize..20, -100.0..0.0_f64).prop_map(|(period, threshold)| PredicateSpec::WilliamsR {
            period,
            threshold,
            relation: "lt".into(),
            sampling_period: "1d".into(),
        }),
    ]
}

fn universe() -> Vec<String> {
    (0..12)
        .map(|i| format!("{:06}", if i % 2 == 0 { 600_000 + i } else { i }))
        .collect()
}

// ── 1. MA order invariance ───────────────────────────────────────────

proptest! {
    /// MA computed through `calculate` ignores the order rows arrive in.
    #[test]
    fn ma_ignores_row_order(closes in arb_closes(), period in 1usize..10, seed in any::<u64>()) {
        let bars = bars_for(&closes);
        let sorted = BarSeries::new("600000.SH", SamplingPeriod::Daily, bars.clone());

        let mut shuffled_bars = bars;
        // deterministic Fisher-Yates driven by the proptest seed
        let mut state = seed | 1;
        for i in (1..shuffled_bars.len()).rev() {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let j = (state % (i as u64 + 1)) as usize;
            shuffled_bars.swap(i, j);
        }
        // Deserializing skips the sort in `BarSeries::new`, so `calculate`
        // really sees rows out of order.
        let shuffled: BarSeries = serde_json::from_value(serde_json::json!({
            "symbol": "600000.SH",
            "period": "1d",
            "bars": shuffled_bars,
            "columns": {}
        }))
        .unwrap();

        let ma = MovingAverage::new(period);
        let a = ma.calculate(&sorted);
        let b = ma.calculate(&shuffled);
        prop_assert!(b.is_sorted());
        let (ca, cb) = (a.column(ma.name()).unwrap(), b.column(ma.name()).unwrap());
        prop_assert_eq!(ca.len(), cb.len());
        for (x, y) in ca.iter().zip(cb) {
            prop_assert!((x.is_nan() && y.is_nan()) || (x - y).abs() < 1e-9);
        }
    }

    /// The first period-1 values are NaN and the value at period-1 is the mean.
    #[test]
    fn ma_warmup_then_mean(closes in arb_closes(), period in 1usize..10) {
        let out = MovingAverage::new(period).compute(&bars_for(&closes));
        for v in out.iter().take(period.saturating_sub(1).min(out.len())) {
            prop_assert!(v.is_nan());
        }
        if closes.len() >= period {
            let mean: f64 = closes[..period].iter().sum::<f64>() / period as f64;
            prop_assert!((out[period - 1] - mean).abs() < 1e-9);
        }
    }
}

// ── 2. WR bounds ─────────────────────────────────────────────────────

proptest! {
    #[test]
    fn wr_within_bounds(closes in arb_closes(), period in 1usize..20) {
        let out = WilliamsR::new(period).compute(&bars_for(&closes));
        for v in out.iter().filter(|v| !v.is_nan()) {
            prop_assert!((-100.0..=0.0).contains(v), "WR out of range: {}", v);
        }
    }
}

// ── 3. Chain monotonicity ────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Adding a predicate can only shrink the result.
    #[test]
    fn chain_never_widens(
        preds in prop::collection::vec(arb_predicate(), 1..4),
        seed in 0u64..1000,
    ) {
        let feed = Arc::new(SyntheticFeed::new(seed));
        let range = TimeRange::new(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
        ).unwrap();
        let input = universe();

        let mut chain = FilterChain::new(feed, range);
        let mut previous = input.clone();
        for spec in preds {
            chain.add_filter(spec.build().unwrap());
            let result = chain.screen(&input).unwrap();
            prop_assert!(result.iter().all(|s| previous.contains(s)));
            // order follows the input
            let positions: Vec<usize> = result
                .iter()
                .map(|s| input.iter().position(|x| x == s).unwrap())
                .collect();
            prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
            previous = result;
        }
    }
}

// ── 4. Normalization idempotence ─────────────────────────────────────

proptest! {
    #[test]
    fn normalize_is_idempotent(raw in "(SH\\.|SZ\\.)?[0-9]{1,7}(\\.SH|\\.SZ)?") {
        if let Some(canonical) = normalize_symbol(&raw) {
            prop_assert_eq!(normalize_symbol(&canonical), Some(canonical.clone()));
        }
    }

    #[test]
    fn short_codes_route_by_first_digit(code in "[0-9]{6}") {
        let canonical = normalize_symbol(&code).unwrap();
        let suffix = if code.starts_with('6') { ".SH" } else { ".SZ" };
        prop_assert_eq!(canonical, format!("{code}{suffix}"));
    }
}
