//! Domain types for StockScreen

pub mod bar;
pub mod period;
pub mod range;
pub mod series;
pub mod symbol;

pub use bar::{Bar, Field};
pub use period::{Adjustment, SamplingPeriod};
pub use range::{RangeError, TimeRange, DEFAULT_LOOKBACK_DAYS};
pub use series::BarSeries;
pub use symbol::{is_canonical, normalize_symbol};
