/// Integration tests for the offline half of the pipeline
///
/// These tests run a blob export fixture through ingest → align → stats →
/// request assembly, with no network access.
///
/// Fixture: tests/fixtures/readings.jsonl: 30 hourly snapshots starting
/// 2024-06-01T00:00Z for S001 (20.0 + 0.5/h) and S002 (25.0 + 0.25/h), plus
/// one truncated line that must be skipped.

use std::path::Path;

use chrono::{Duration, TimeZone, Utc};

use envmon_service::analysis::groupings::{filter_by_station, unique_stations, StationFilter};
use envmon_service::analysis::{align, summarize};
use envmon_service::dev_mode::Simulator;
use envmon_service::ingest;
use envmon_service::model::{PipelineError, PredictionRequest};
use envmon_service::predict::{build_request, prepare};

fn fixture_records() -> Vec<envmon_service::model::AlignedRecord> {
    let readings = ingest::load_readings(Path::new("tests/fixtures/readings.jsonl"))
        .expect("fixture should load");
    assert_eq!(readings.len(), 60, "truncated line should be skipped");
    align(&readings)
}

#[test]
fn test_fixture_aligns_after_warmup() {
    let aligned = fixture_records();

    // Hours 22..=29 for each station have a reading 22-26h earlier.
    assert_eq!(aligned.len(), 16);
    assert_eq!(unique_stations(&aligned), vec!["S001", "S002"]);

    let s1 = filter_by_station(&aligned, &StationFilter::parse("S001"));
    assert_eq!(s1.len(), 8);
    assert_eq!(s1[0].timestamp, Utc.with_ymd_and_hms(2024, 6, 1, 22, 0, 0).unwrap());
    for pair in s1.windows(2) {
        assert!(pair[0].timestamp <= pair[1].timestamp);
    }
}

#[test]
fn test_fixture_statistics() {
    let stats = summarize(&fixture_records()).expect("aligned set is not empty");

    assert_eq!(stats.total_readings, 16);
    assert_eq!(stats.station_count, 2);
    assert_eq!(stats.avg_value, 32.0625);
    assert_eq!(stats.max_value, 34.5);
    assert_eq!(stats.min_value, 30.5);
    // Last in scan order is S002's newest record.
    assert_eq!(stats.latest_reading, Utc.with_ymd_and_hms(2024, 6, 2, 5, 0, 0).unwrap());
}

#[test]
fn test_fixture_request_for_station() {
    let aligned = fixture_records();

    let request = build_request(&aligned, "S001").unwrap();
    assert_eq!(
        request,
        PredictionRequest {
            hour: 6,
            day_of_week: 0, // 2024-06-02 was a Sunday
            month: 6,
            value_lag1: 34.5,  // hour 29's own value
            value_lag24: 21.5, // hour 29's lag-24 (hour 3)
        }
    );

    let prepared = prepare(&aligned, "S001").unwrap();
    assert_eq!(prepared.anchor.value_lag1, 33.5, "first-match lag-1 is two hours back");
    assert_eq!(prepared.next_instant - prepared.anchor.timestamp, Duration::hours(1));
}

#[test]
fn test_unknown_station_is_no_data() {
    let aligned = fixture_records();
    assert!(matches!(
        build_request(&aligned, "S005"),
        Err(PipelineError::NoData { .. })
    ));
}

#[test]
fn test_simulated_week_produces_valid_requests_for_every_station() {
    let now = Utc.with_ymd_and_hms(2024, 12, 31, 23, 0, 0).unwrap();
    let readings = Simulator::new(7).with_seed(2024).generate(now);
    let aligned = align(&readings);

    let stats = summarize(&aligned).unwrap();
    assert_eq!(stats.station_count, 5);
    assert_eq!(stats.total_readings, 5 * (168 - 22));

    for station in envmon_service::stations::all_station_ids() {
        let request = build_request(&aligned, station).unwrap();
        request.validate().unwrap();
        // Next hour after 23:00 on New Year's Eve.
        assert_eq!(request.hour, 0);
        assert_eq!(request.month, 1);
    }
}

#[test]
fn test_empty_pipeline_has_no_stats_and_no_request() {
    let aligned = align(&[]);
    assert!(summarize(&aligned).is_none());
    assert!(build_request(&aligned, "S001").is_err());
}
