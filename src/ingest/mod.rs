/// Reading sources for the environmental forecast service.
///
/// Submodules:
/// - `blob`: JSON-lines exports from the blob storage container.
///
/// Plain JSON arrays of `{timestamp, station_id, value}` are decoded here.

pub mod blob;

use std::fs;
use std::path::Path;

use crate::logging::{self, Stage};
use crate::model::{PipelineError, Reading};

/// Decode a JSON array of readings.
pub fn parse_readings_json(text: &str) -> Result<Vec<Reading>, PipelineError> {
    serde_json::from_str(text).map_err(|e| PipelineError::Parse(e.to_string()))
}

/// Load readings from a file, choosing the decoder by extension: `.jsonl` and
/// `.ndjson` are blob exports, anything else is a JSON array.
pub fn load_readings(path: &Path) -> Result<Vec<Reading>, PipelineError> {
    let text = fs::read_to_string(path)
        .map_err(|e| PipelineError::Parse(format!("{}: {}", path.display(), e)))?;

    let is_lines = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("jsonl") | Some("ndjson")
    );

    let readings = if is_lines {
        blob::parse_blob_lines(&text)
    } else {
        parse_readings_json(&text)?
    };

    logging::info(
        Stage::Ingest,
        None,
        &format!("Loaded {} readings from {}", readings.len(), path.display()),
    );
    Ok(readings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_readings_json() {
        let text = r#"[
            {"timestamp": "2024-01-01T00:00:00.000Z", "station_id": "S001", "value": 26.5},
            {"timestamp": "2024-01-01T01:00:00.000Z", "station_id": "S002", "value": 0}
        ]"#;
        let readings = parse_readings_json(text).unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0], Reading::new("2024-01-01T00:00:00.000Z", "S001", 26.5));
        assert_eq!(readings[1].value, 0.0);
    }

    #[test]
    fn test_parse_readings_json_rejects_wrong_shape() {
        assert!(matches!(parse_readings_json("{}"), Err(PipelineError::Parse(_))));
        assert!(parse_readings_json(r#"[{"station_id": "S001"}]"#).is_err());
    }

    #[test]
    fn test_load_readings_dispatches_on_extension() {
        let mut array = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(array, r#"[{{"timestamp": "2024-01-01T00:00:00Z", "station_id": "S001", "value": 1.0}}]"#).unwrap();
        assert_eq!(load_readings(array.path()).unwrap().len(), 1);

        let mut lines = tempfile::Builder::new().suffix(".jsonl").tempfile().unwrap();
        writeln!(
            lines,
            r#"{{"items": {{"timestamp": "2024-01-01T00:00:00Z", "readings": [{{"station_id": "S001", "value": 1.0}}, {{"station_id": "S002", "value": 2.0}}]}}}}"#
        )
        .unwrap();
        assert_eq!(load_readings(lines.path()).unwrap().len(), 2);
    }

    #[test]
    fn test_load_readings_missing_file() {
        assert!(load_readings(Path::new("/no/such/readings.json")).is_err());
    }
}
