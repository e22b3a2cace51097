//! Market data: the feed abstraction, concrete feeds and bulk download.

pub mod csv_feed;
pub mod download;
pub mod feed;
pub mod memory;
pub mod synthetic;

pub use csv_feed::CsvFeed;
pub use download::{download_all, DownloadProgress, DownloadSummary, FetchOutcome, LogProgress};
pub use feed::{fetch_symbol, DataError, DataFeed, Fetched};
pub use memory::MemoryFeed;
pub use synthetic::{SyntheticFeed, DEFAULT_SEED};
