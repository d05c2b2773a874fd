//! Assembly of the one-step-ahead prediction query.

use chrono::{DateTime, Duration, Utc};

use crate::model::{AlignedRecord, CalendarFeatures, PipelineError, PredictionRequest};

/// Spacing between consecutive observations, in hours; the prediction
/// targets the instant one step after the latest aligned record.
pub const STEP_HOURS: i64 = 1;

/// A request together with the record it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    /// Most recent aligned record for the station.
    pub anchor: AlignedRecord,
    /// Instant the prediction is for (`anchor.timestamp` plus one step).
    pub next_instant: DateTime<Utc>,
    pub request: PredictionRequest,
}

/// Picks the station's latest aligned record and derives the request for the
/// following step.
///
/// The anchor's own value becomes the next step's lag-1, while the anchor's
/// lag-24 is carried forward unchanged rather than re-derived for the next
/// instant.
pub fn prepare(records: &[AlignedRecord], station_id: &str) -> Result<PreparedRequest, PipelineError> {
    // max_by_key returns the last maximum, so ties go to the last-seen record.
    let anchor = records
        .iter()
        .filter(|r| r.station_id == station_id)
        .max_by_key(|r| r.timestamp)
        .ok_or_else(|| PipelineError::NoData {
            station_id: station_id.to_string(),
        })?;

    let next_instant = anchor.timestamp + Duration::hours(STEP_HOURS);
    let calendar = CalendarFeatures::from_instant(next_instant);

    Ok(PreparedRequest {
        anchor: anchor.clone(),
        next_instant,
        request: PredictionRequest {
            hour: calendar.hour,
            day_of_week: calendar.day_of_week,
            month: calendar.month,
            value_lag1: anchor.value,
            value_lag24: anchor.value_lag24,
        },
    })
}

/// Builds the prediction request for `station_id`, or `NoData` if the station
/// has no aligned records.
pub fn build_request(records: &[AlignedRecord], station_id: &str) -> Result<PredictionRequest, PipelineError> {
    prepare(records, station_id).map(|prepared| prepared.request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(station: &str, ts: DateTime<Utc>, value: f64, lag1: f64, lag24: f64) -> AlignedRecord {
        let calendar = CalendarFeatures::from_instant(ts);
        AlignedRecord {
            timestamp: ts,
            station_id: station.to_string(),
            value,
            hour: calendar.hour,
            day_of_week: calendar.day_of_week,
            month: calendar.month,
            value_lag1: lag1,
            value_lag24: lag24,
        }
    }

    #[test]
    fn test_no_records_for_station_is_no_data() {
        let ts = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        let records = vec![record("S001", ts, 1.0, 2.0, 3.0)];

        assert_eq!(
            build_request(&records, "S002"),
            Err(PipelineError::NoData {
                station_id: "S002".to_string()
            })
        );
        assert!(build_request(&[], "S001").is_err());
    }

    #[test]
    fn test_request_uses_latest_record_and_next_hour() {
        let early = Utc.with_ymd_and_hms(2024, 7, 1, 8, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 7, 1, 10, 0, 0).unwrap();
        let records = vec![
            record("S001", late, 25.0, 24.0, 21.0),
            record("S001", early, 23.0, 22.0, 20.0),
            record("S002", late + Duration::hours(5), 99.0, 99.0, 99.0),
        ];

        let prepared = prepare(&records, "S001").unwrap();
        assert_eq!(prepared.anchor.timestamp, late);
        assert_eq!(prepared.next_instant, late + Duration::hours(1));
        assert_eq!(
            prepared.request,
            PredictionRequest {
                hour: 11,
                // 2024-07-01 was a Monday.
                day_of_week: 1,
                month: 7,
                value_lag1: 25.0,
                value_lag24: 21.0,
            }
        );
    }

    #[test]
    fn test_lag1_rolls_forward_but_lag24_is_carried() {
        let ts = Utc.with_ymd_and_hms(2024, 7, 1, 10, 0, 0).unwrap();
        let records = vec![record("S001", ts, 30.0, 29.0, 18.0)];
        let request = build_request(&records, "S001").unwrap();
        assert_eq!(request.value_lag1, 30.0);
        assert_ne!(request.value_lag1, 29.0);
        assert_eq!(request.value_lag24, 18.0);
    }

    #[test]
    fn test_next_instant_crosses_day_and_month() {
        let ts = Utc.with_ymd_and_hms(2024, 8, 31, 23, 0, 0).unwrap();
        let records = vec![record("S003", ts, 1.0, 1.0, 1.0)];
        let request = build_request(&records, "S003").unwrap();
        assert_eq!(request.hour, 0);
        assert_eq!(request.month, 9);
        // 2024-09-01 was a Sunday.
        assert_eq!(request.day_of_week, 0);
    }

    #[test]
    fn test_timestamp_ties_go_to_last_seen() {
        let ts = Utc.with_ymd_and_hms(2024, 7, 1, 10, 0, 0).unwrap();
        let records = vec![record("S001", ts, 1.0, 0.0, 5.0), record("S001", ts, 2.0, 0.0, 6.0)];
        let request = build_request(&records, "S001").unwrap();
        assert_eq!(request.value_lag1, 2.0);
        assert_eq!(request.value_lag24, 6.0);
    }
}
