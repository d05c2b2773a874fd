//! Interpretation of the prediction service's response envelope.

use rand::Rng;
use serde_json::Value;

use crate::logging::{self, Stage};
use crate::model::{PredictedValue, PredictionResult};
use crate::predict::request::PreparedRequest;
use crate::stations;

/// Lower bound of the synthetic confidence score; the upper bound (1.0) is
/// exclusive.
pub const MIN_CONFIDENCE: f64 = 0.7;

/// Extracts the scalar prediction from a response body.
///
/// Looks for a numeric top-level `prediction`, then for a numeric first
/// element of `result`. Anything else is `Unavailable`; a zero prediction is
/// a real value.
pub fn extract_prediction(raw: &Value) -> PredictedValue {
    if let Some(v) = raw.get("prediction").and_then(Value::as_f64) {
        return PredictedValue::Value(v);
    }
    if let Some(v) = raw
        .get("result")
        .and_then(Value::as_array)
        .and_then(|arr| arr.first())
        .and_then(Value::as_f64)
    {
        return PredictedValue::Value(v);
    }
    PredictedValue::Unavailable
}

/// Builds the presentation bundle for a response, drawing the synthetic
/// confidence from the thread-local RNG.
pub fn interpret_response(raw: &Value, prepared: &PreparedRequest) -> PredictionResult {
    interpret_response_with_rng(raw, prepared, &mut rand::rng())
}

/// Same as `interpret_response` with a caller-supplied RNG.
pub fn interpret_response_with_rng<R: Rng>(
    raw: &Value,
    prepared: &PreparedRequest,
    rng: &mut R,
) -> PredictionResult {
    let station_id = prepared.anchor.station_id.as_str();
    let predicted_value = extract_prediction(raw);

    if predicted_value == PredictedValue::Unavailable {
        // The scoring script reports its own failures as {"error": "..."}
        // with a success status.
        match raw.get("error").and_then(Value::as_str) {
            Some(message) => logging::warn(
                Stage::Predict,
                Some(station_id),
                &format!("service reported an error: {}", message),
            ),
            None => logging::warn(Stage::Predict, Some(station_id), "response carried no usable prediction"),
        }
    }

    PredictionResult {
        station_id: station_id.to_string(),
        station_info: stations::find_station(station_id),
        current_value: prepared.anchor.value,
        current_timestamp: prepared.anchor.timestamp,
        predicted_timestamp: prepared.next_instant,
        predicted_value,
        input_features: prepared.request,
        confidence: rng.random_range(MIN_CONFIDENCE..1.0),
    }
}
