//! Data feed integration: CSV directory feed and the bulk download pool.

use std::fs;
use std::sync::Mutex;

use chrono::NaiveDate;
use stockscreen_core::data::{
    download_all, CsvFeed, DataError, DataFeed, DownloadProgress, FetchOutcome, LogProgress,
    SyntheticFeed,
};
use stockscreen_core::domain::{Adjustment, BarSeries, Field, SamplingPeriod, TimeRange};

fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
}

fn write_csv(dir: &std::path::Path, name: &str, body: &str) {
    fs::write(dir.join(name), body).unwrap();
}

const HEADER: &str = "date,open,high,low,close,volume,amount\n";

#[test]
fn csv_feed_reads_and_clips_to_range() {
    let dir = tempfile::tempdir().unwrap();
    let body = format!(
        "{HEADER}2025-01-02,10,11,9,10.5,1000,10500\n\
         2025-01-03,10.5,12,10,11.5,1200,13800\n\
         2025-01-06,11.5,12,11,11.8,900,10620\n"
    );
    write_csv(dir.path(), "600519.SH_1d.csv", &body);

    let feed = CsvFeed::new(dir.path());
    let series = feed
        .fetch("600519.SH", d(3), d(31), SamplingPeriod::Daily, Adjustment::Pre)
        .unwrap()
        .unwrap();
    assert_eq!(series.len(), 2);
    assert_eq!(series.field_values(Field::Close), vec![11.5, 11.8]);
    assert_eq!(series.last().unwrap().volume, 900);
}

#[test]
fn csv_feed_missing_file_or_empty_window_is_none() {
    let dir = tempfile::tempdir().unwrap();
    write_csv(
        dir.path(),
        "000001.SZ_1d.csv",
        &format!("{HEADER}2024-12-31,10,11,9,10.5,1000,10500\n"),
    );
    let feed = CsvFeed::new(dir.path());
    let missing = feed
        .fetch("600000.SH", d(1), d(31), SamplingPeriod::Daily, Adjustment::Pre)
        .unwrap();
    assert!(missing.is_none());
    let outside = feed
        .fetch("000001.SZ", d(1), d(31), SamplingPeriod::Daily, Adjustment::Pre)
        .unwrap();
    assert!(outside.is_none());
}

#[test]
fn csv_feed_reports_malformed_rows_per_symbol() {
    let dir = tempfile::tempdir().unwrap();
    write_csv(
        dir.path(),
        "000001.SZ_1d.csv",
        &format!("{HEADER}2025-01-02,ten,11,9,10.5,1000,10500\n"),
    );
    let feed = CsvFeed::new(dir.path());
    let err = feed
        .fetch("000001.SZ", d(1), d(31), SamplingPeriod::Daily, Adjustment::Pre)
        .unwrap_err();
    assert!(matches!(err, DataError::Malformed { .. }));
}

#[test]
fn csv_feed_readiness_follows_the_bar_directory() {
    let dir = tempfile::tempdir().unwrap();
    assert!(CsvFeed::new(dir.path()).check_ready().is_ok());
    let err = CsvFeed::new(dir.path().join("missing"))
        .check_ready()
        .unwrap_err();
    assert!(matches!(err, DataError::ProviderUnavailable(_)));
}

#[test]
fn csv_feed_reads_intraday_timestamps() {
    let dir = tempfile::tempdir().unwrap();
    write_csv(
        dir.path(),
        "300750.SZ_5m.csv",
        &format!(
            "{HEADER}2025-01-02 09:35:00,10,11,9,10.5,1000,10500\n\
             2025-01-02 09:40:00,10.5,11,10,10.8,1000,10800\n"
        ),
    );
    let feed = CsvFeed::new(dir.path());
    let s = feed
        .fetch("300750.SZ", d(2), d(2), SamplingPeriod::FiveMinutes, Adjustment::Pre)
        .unwrap()
        .unwrap();
    assert_eq!(s.period(), SamplingPeriod::FiveMinutes);
    assert_eq!(s.len(), 2);
}

/// Records callbacks for assertions.
#[derive(Default)]
struct Recorder {
    completed: Mutex<Vec<(String, FetchOutcome)>>,
    batch: Mutex<Option<(usize, usize, usize)>>,
}

impl DownloadProgress for Recorder {
    fn on_start(&self, _symbol: &str, _index: usize, _total: usize) {}

    fn on_complete(&self, symbol: &str, _index: usize, _total: usize, outcome: &FetchOutcome) {
        self.completed
            .lock()
            .unwrap()
            .push((symbol.to_string(), outcome.clone()));
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
        *self.batch.lock().unwrap() = Some((succeeded, failed, total));
    }
}

#[test]
fn download_isolates_failures_and_counts() {
    let dir = tempfile::tempdir().unwrap();
    write_csv(
        dir.path(),
        "600519.SH_1d.csv",
        &format!("{HEADER}2025-01-02,10,11,9,10.5,1000,10500\n"),
    );
    write_csv(dir.path(), "000001.SZ_1d.csv", &format!("{HEADER}garbage\n"));
    let feed = CsvFeed::new(dir.path());

    let symbols: Vec<String> = ["600519", "000001", "1234567", "002594"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let range = TimeRange::new(d(1), d(31)).unwrap();
    let recorder = Recorder::default();
    let summary = download_all(
        &feed,
        &symbols,
        range,
        SamplingPeriod::Daily,
        Adjustment::Pre,
        3,
        &recorder,
    )
    .unwrap();

    assert_eq!(summary.total, 4);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 3);
    assert!(!summary.all_succeeded());
    assert_eq!(summary.data.len(), 4);
    assert!(summary.series("600519").is_some());
    assert!(summary.data["002594"].is_none());
    assert_eq!(*recorder.batch.lock().unwrap(), Some((1, 3, 4)));

    let completed = recorder.completed.lock().unwrap();
    assert_eq!(completed.len(), 4);
    let invalid = completed.iter().find(|(s, _)| s == "1234567").unwrap();
    assert!(matches!(invalid.1, FetchOutcome::Failed(_)));
}

#[test]
fn download_with_single_worker_and_zero_threads() {
    let feed = SyntheticFeed::default();
    let symbols = vec!["600519".to_string(), "000001".to_string()];
    let range = TimeRange::new(d(1), d(10)).unwrap();
    for threads in [0, 1] {
        let summary = download_all(
            &feed,
            &symbols,
            range,
            SamplingPeriod::Daily,
            Adjustment::Pre,
            threads,
            &LogProgress,
        )
        .unwrap();
        assert!(summary.all_succeeded());
        let s: &BarSeries = summary.series("000001").unwrap();
        assert_eq!(s.symbol(), "000001.SZ");
        assert_eq!(s.len(), 10);
    }
}
