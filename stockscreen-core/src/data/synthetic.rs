//! Deterministic synthetic feed.
//!
//! Produces a seeded random walk per (symbol, period). The per-symbol seed is
//! derived from the master seed by BLAKE3 hashing, so results do not depend on
//! the order in which symbols are requested or on thread count.
//!
//! Daily bars: one per calendar day in the range, weekends included.
//! Intraday bars: weekdays only, covering the 09:30-11:30 and 13:00-15:00
//! sessions; each bar is stamped with the end of its interval.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::feed::{DataError, DataFeed};
use crate::domain::{Adjustment, Bar, BarSeries, SamplingPeriod};

pub const DEFAULT_SEED: u64 = 42;

const START_PRICE: f64 = 100.0;
const STEP_SCALE: f64 = 0.5;
const PRICE_FLOOR: f64 = 1.0;

#[derive(Debug, Clone)]
pub struct SyntheticFeed {
    seed: u64,
}

impl Default for SyntheticFeed {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl SyntheticFeed {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Sub-seed for one (symbol, period) pair.
    pub fn sub_seed(&self, symbol: &str, period: SamplingPeriod) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.seed.to_le_bytes());
        hasher.update(symbol.as_bytes());
        hasher.update(period.as_str().as_bytes());
        let hash = hasher.finalize();
        let mut head = [0u8; 8];
        head.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(head)
    }

    /// Bar timestamps for `period` over `[start, end]`.
    pub fn timestamps(start: NaiveDate, end: NaiveDate, period: SamplingPeriod) -> Vec<NaiveDateTime> {
        let midnight = NaiveTime::MIN;
        let Some(step) = period.intraday_step() else {
            return start
                .iter_days()
                .take_while(|d| *d <= end)
                .map(|d| d.and_time(midnight))
                .collect();
        };

        let sessions = [
            (hm(9, 30), hm(11, 30)),
            (hm(13, 0), hm(15, 0)),
        ];
        let mut out = Vec::new();
        for day in start.iter_days().take_while(|d| *d <= end) {
            if matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
                continue;
            }
            for (open, close) in sessions {
                let close_at = day.and_time(close);
                let mut t = day.and_time(open) + step;
                while t <= close_at {
                    out.push(t);
                    t += step;
                }
            }
        }
        out
    }
}

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap_or(NaiveTime::MIN)
}

/// Standard normal draw (Box-Muller).
fn standard_normal(rng: &mut StdRng) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

impl DataFeed for SyntheticFeed {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        period: SamplingPeriod,
        _adjustment: Adjustment,
    ) -> Result<Option<BarSeries>, DataError> {
        if start > end {
            return Err(DataError::Other(format!(
                "inverted range {start} > {end}"
            )));
        }
        let stamps = Self::timestamps(start, end, period);
        if stamps.is_empty() {
            return Ok(None);
        }

        let mut rng = StdRng::seed_from_u64(self.sub_seed(symbol, period));
        let mut level = START_PRICE;
        let bars = stamps
            .into_iter()
            .map(|timestamp| {
                level = (level + standard_normal(&mut rng) * STEP_SCALE).max(PRICE_FLOOR);
                let open = level;
                let high = open + (standard_normal(&mut rng) * STEP_SCALE).abs();
                let low = (open - (standard_normal(&mut rng) * STEP_SCALE).abs()).max(PRICE_FLOOR / 2.0);
                let close = (low + (standard_normal(&mut rng) * STEP_SCALE).abs()).min(high);
                let volume: u64 = rng.gen_range(1_000_000..10_000_000);
                Bar {
                    timestamp,
                    open,
                    high,
                    low,
                    close,
                    volume,
                    amount: close * volume as f64,
                }
            })
            .collect();

        Ok(Some(BarSeries::new(symbol, period, bars)))
    }
}
