/// Reading, AlignedRecord, PredictionRequest, PredictionResult, PipelineError
/// core data structures and error handling
///
/// Core data types for the environmental forecast service.
///
/// This module defines the shared domain model imported by all other modules.
/// Apart from calendar derivation and request range checks it contains no
/// logic and no I/O.

use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::stations::StationInfo;

// ---------------------------------------------------------------------------
// Reading types
// ---------------------------------------------------------------------------

/// A single sensor observation as delivered by an ingestion source.
///
/// The timestamp is kept as the raw ISO 8601 string from the source. The
/// aligner parses it and quietly excludes readings whose instant cannot be
/// recovered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub timestamp: String, // ISO 8601, e.g. "2024-05-01T12:00:00.000Z"
    pub station_id: String,
    pub value: f64,
}

impl Reading {
    pub fn new(timestamp: impl Into<String>, station_id: impl Into<String>, value: f64) -> Self {
        Self {
            timestamp: timestamp.into(),
            station_id: station_id.into(),
            value,
        }
    }
}

/// Calendar fields the model consumes, derived from an instant in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarFeatures {
    /// Hour of day (0-23)
    pub hour: u32,
    /// Day of week (0=Sunday, 6=Saturday)
    pub day_of_week: u32,
    /// Month (1-12)
    pub month: u32,
}

impl CalendarFeatures {
    pub fn from_instant(instant: DateTime<Utc>) -> Self {
        Self {
            hour: instant.hour(),
            day_of_week: instant.weekday().num_days_from_sunday(),
            month: instant.month(),
        }
    }
}

/// A reading paired with both of its lag features.
///
/// Only produced by `analysis::align`; a reading missing either lag never
/// becomes an `AlignedRecord`, so both lags are plain values here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedRecord {
    pub timestamp: DateTime<Utc>,
    pub station_id: String,
    pub value: f64,
    pub hour: u32,
    pub day_of_week: u32,
    pub month: u32,
    pub value_lag1: f64,
    pub value_lag24: f64,
}

impl AlignedRecord {
    pub fn calendar(&self) -> CalendarFeatures {
        CalendarFeatures {
            hour: self.hour,
            day_of_week: self.day_of_week,
            month: self.month,
        }
    }
}

// ---------------------------------------------------------------------------
// Summary types
// ---------------------------------------------------------------------------

/// Summary statistics over an aligned dataset.
///
/// `latest_reading` is the timestamp of the last record in scan order, which
/// is not guaranteed to be the global maximum across stations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stats {
    pub total_readings: usize,
    pub station_count: usize,
    pub avg_value: f64,
    pub max_value: f64,
    pub min_value: f64,
    pub latest_reading: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Prediction types
// ---------------------------------------------------------------------------

/// The five scalar features the deployed model consumes, in wire format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub hour: u32,
    pub day_of_week: u32,
    pub month: u32,
    pub value_lag1: f64,
    pub value_lag24: f64,
}

impl PredictionRequest {
    /// Applies the same range checks the scoring service performs, so a bad
    /// request is rejected before it leaves the process.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.hour > 23 {
            return Err(PipelineError::InvalidRequest(format!(
                "hour must be between 0 and 23, got {}",
                self.hour
            )));
        }
        if self.day_of_week > 6 {
            return Err(PipelineError::InvalidRequest(format!(
                "day_of_week must be between 0 and 6, got {}",
                self.day_of_week
            )));
        }
        if !(1..=12).contains(&self.month) {
            return Err(PipelineError::InvalidRequest(format!(
                "month must be between 1 and 12, got {}",
                self.month
            )));
        }
        if !self.value_lag1.is_finite() || !self.value_lag24.is_finite() {
            return Err(PipelineError::InvalidRequest(
                "lag values must be finite numbers".to_string(),
            ));
        }
        Ok(())
    }
}

/// Scalar prediction extracted from a service response, or the explicit
/// "unavailable" marker when the response carried no usable value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PredictedValue {
    Value(f64),
    Unavailable,
}

impl PredictedValue {
    pub const UNAVAILABLE_LABEL: &'static str = "N/A";

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PredictedValue::Value(v) => Some(*v),
            PredictedValue::Unavailable => None,
        }
    }
}

impl std::fmt::Display for PredictedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PredictedValue::Value(v) => write!(f, "{:.2}", v),
            PredictedValue::Unavailable => write!(f, "{}", Self::UNAVAILABLE_LABEL),
        }
    }
}

impl Serialize for PredictedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PredictedValue::Value(v) => serializer.serialize_f64(*v),
            PredictedValue::Unavailable => serializer.serialize_str(Self::UNAVAILABLE_LABEL),
        }
    }
}

/// Presentation-ready bundle for one prediction action.
///
/// `confidence` is a synthetic score in `[0.7, 1.0)`; it is not produced by
/// the model and carries no statistical meaning.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub station_id: String,
    pub station_info: Option<&'static StationInfo>,
    pub current_value: f64,
    pub current_timestamp: DateTime<Utc>,
    pub predicted_timestamp: DateTime<Utc>,
    pub predicted_value: PredictedValue,
    pub input_features: PredictionRequest,
    pub confidence: f64,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise while preparing, sending or reading a prediction.
///
/// Readings that fail lag matching are not errors; they are filtered out.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum PipelineError {
    /// The requested station has no aligned records.
    #[error("No data available for station {station_id}")]
    NoData { station_id: String },
    /// Non-2xx HTTP response from the prediction service.
    #[error("ML API error: {status}: {body}")]
    Upstream { status: u16, body: String },
    /// The service answered 2xx but the body was not JSON.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    /// The request never completed (connection refused, DNS, TLS...).
    #[error("Request failed: {0}")]
    Transport(String),
    /// The assembled request failed the scoring service's range checks.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    /// Input readings could not be decoded.
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Config error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for PipelineError {
    fn from(err: reqwest::Error) -> Self {
        PipelineError::Transport(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn valid_request() -> PredictionRequest {
        PredictionRequest {
            hour: 13,
            day_of_week: 3,
            month: 6,
            value_lag1: 24.5,
            value_lag24: 22.1,
        }
    }

    #[test]
    fn test_calendar_features_count_weekdays_from_sunday() {
        // 2024-06-02 was a Sunday, 2024-06-08 a Saturday.
        let sunday = Utc.with_ymd_and_hms(2024, 6, 2, 0, 30, 0).unwrap();
        let saturday = Utc.with_ymd_and_hms(2024, 6, 8, 23, 0, 0).unwrap();

        let f = CalendarFeatures::from_instant(sunday);
        assert_eq!(f.day_of_week, 0);
        assert_eq!(f.hour, 0);
        assert_eq!(f.month, 6);

        let f = CalendarFeatures::from_instant(saturday);
        assert_eq!(f.day_of_week, 6);
        assert_eq!(f.hour, 23);
    }

    #[test]
    fn test_request_serializes_with_wire_field_names() {
        let json = serde_json::to_value(valid_request()).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 5);
        for key in ["hour", "day_of_week", "month", "value_lag1", "value_lag24"] {
            assert!(obj.contains_key(key), "missing wire field '{}'", key);
        }
        assert_eq!(json["hour"], 13);
    }

    #[test]
    fn test_validate_accepts_in_range_request() {
        assert_eq!(valid_request().validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_out_of_range_fields() {
        let mut req = valid_request();
        req.hour = 24;
        assert!(matches!(req.validate(), Err(PipelineError::InvalidRequest(_))));

        let mut req = valid_request();
        req.day_of_week = 7;
        assert!(req.validate().is_err());

        let mut req = valid_request();
        req.month = 0;
        assert!(req.validate().is_err());

        let mut req = valid_request();
        req.value_lag24 = f64::NAN;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_predicted_value_serializes_number_or_marker() {
        assert_eq!(serde_json::to_value(PredictedValue::Value(21.4)).unwrap(), 21.4);
        assert_eq!(serde_json::to_value(PredictedValue::Unavailable).unwrap(), "N/A");
        assert_eq!(PredictedValue::Value(21.456).to_string(), "21.46");
        assert_eq!(PredictedValue::Unavailable.as_f64(), None);
    }

    #[test]
    fn test_error_display_carries_status_and_body() {
        let err = PipelineError::Upstream {
            status: 503,
            body: "model warming up".to_string(),
        };
        assert_eq!(err.to_string(), "ML API error: 503: model warming up");

        let err = PipelineError::NoData {
            station_id: "S004".to_string(),
        };
        assert_eq!(err.to_string(), "No data available for station S004");
    }
}
