/// One-step-ahead prediction for a single station.
///
/// Submodules:
/// - `request` : picks the latest aligned record and assembles the query.
/// - `response`: reads the service's envelope into a `PredictionResult`.
/// - `client`  : HTTP transport to the scoring endpoint.

pub mod client;
pub mod request;
pub mod response;

pub use client::{HealthStatus, PredictionClient, PredictionService};
pub use request::{build_request, prepare, PreparedRequest};
pub use response::{extract_prediction, interpret_response};

use crate::logging::{self, Stage};
use crate::model::{AlignedRecord, PipelineError, PredictionResult};

/// Runs one prediction action for `station_id`: prepare, validate, send,
/// interpret.
///
/// Failures are logged with their classification and returned to the caller,
/// who decides how to display them.
pub fn predict_for_station<S: PredictionService + ?Sized>(
    service: &S,
    records: &[AlignedRecord],
    station_id: &str,
) -> Result<PredictionResult, PipelineError> {
    let outcome = prepare(records, station_id).and_then(|prepared| {
        prepared.request.validate()?;
        let raw = service.predict(&prepared.request)?;
        Ok(interpret_response(&raw, &prepared))
    });

    match &outcome {
        Ok(result) => logging::info(
            Stage::Predict,
            Some(station_id),
            &format!(
                "predicted {} for {} (current {:.2})",
                result.predicted_value,
                result.predicted_timestamp.format("%Y-%m-%d %H:%M UTC"),
                result.current_value
            ),
        ),
        Err(err) => logging::log_prediction_failure(station_id, "prediction", err),
    }

    outcome
}
