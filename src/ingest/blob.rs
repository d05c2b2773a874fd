/// Blob export decoder
///
/// The storage container holds newline-delimited JSON files. Each line is one
/// snapshot of every station at a single instant:
///
///   {"items": {"timestamp": "...", "readings": [{"station_id": "S001", "value": 27.1}, ...]}}
///
/// Lines that are blank, not JSON, or not shaped like a snapshot are skipped.

use serde::Deserialize;

use crate::logging::{self, Stage};
use crate::model::Reading;

// ============================================================================
// Blob Line Structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct BlobLine {
    items: Snapshot,
}

#[derive(Debug, Deserialize)]
struct Snapshot {
    timestamp: String,
    readings: Vec<StationValue>,
}

#[derive(Debug, Deserialize)]
struct StationValue {
    station_id: String,
    value: Option<f64>,
}

// ============================================================================
// Parsing
// ============================================================================

/// Flatten a blob export into readings, one per station per snapshot.
///
/// Station entries with a null value are dropped and undecodable lines are
/// skipped. Both are counted in a warning; neither is an error.
pub fn parse_blob_lines(text: &str) -> Vec<Reading> {
    let mut readings = Vec::new();
    let mut skipped_lines = 0usize;
    let mut null_values = 0usize;

    for (line_no, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let parsed: BlobLine = match serde_json::from_str(line) {
            Ok(p) => p,
            Err(e) => {
                skipped_lines += 1;
                logging::warn(
                    Stage::Ingest,
                    None,
                    &format!("Error parsing line {}: {}", line_no + 1, e),
                );
                continue;
            }
        };

        let timestamp = parsed.items.timestamp;
        for entry in parsed.items.readings {
            match entry.value {
                Some(value) => readings.push(Reading {
                    timestamp: timestamp.clone(),
                    station_id: entry.station_id,
                    value,
                }),
                None => null_values += 1,
            }
        }
    }

    if skipped_lines > 0 || null_values > 0 {
        logging::warn(
            Stage::Ingest,
            None,
            &format!(
                "Blob decode skipped {} line(s) and {} null value(s)",
                skipped_lines, null_values
            ),
        );
    }

    readings
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flattens_snapshot_into_readings() {
        let text = r#"{"items": {"timestamp": "2024-06-01T08:00:00+08:00", "readings": [{"station_id": "S001", "value": 27.1}, {"station_id": "S004", "value": 28.4}]}}"#;
        let readings = parse_blob_lines(text);
        assert_eq!(
            readings,
            vec![
                Reading::new("2024-06-01T08:00:00+08:00", "S001", 27.1),
                Reading::new("2024-06-01T08:00:00+08:00", "S004", 28.4),
            ]
        );
    }

    #[test]
    fn test_skips_bad_lines_and_keeps_good_ones() {
        let text = concat!(
            r#"{"items": {"timestamp": "2024-06-01T00:00:00Z", "readings": [{"station_id": "S001", "value": 1.0}]}}"#,
            "\n",
            "not json at all\n",
            "\n",
            r#"{"metadata": {"source": "other"}}"#,
            "\n",
            r#"{"items": {"timestamp": "2024-06-01T01:00:00Z", "readings": [{"station_id": "S001", "value": 2.0}]}}"#,
            "\n",
        );
        let readings = parse_blob_lines(text);
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[1].value, 2.0);
    }

    #[test]
    fn test_null_values_are_dropped() {
        let text = r#"{"items": {"timestamp": "2024-06-01T00:00:00Z", "readings": [{"station_id": "S001", "value": null}, {"station_id": "S002", "value": 3.5}]}}"#;
        let readings = parse_blob_lines(text);
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].station_id, "S002");
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_blob_lines("").is_empty());
        assert!(parse_blob_lines("\n\n").is_empty());
    }
}
