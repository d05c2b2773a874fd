//! Summary statistics over aligned records.

use std::collections::HashSet;

use crate::model::{AlignedRecord, Stats};

/// Summarizes an aligned dataset.
///
/// Returns `None` for an empty dataset so callers can tell "no data" apart
/// from genuinely zero-valued statistics. `latest_reading` is taken from the
/// last record in the given order, not the maximum timestamp.
pub fn summarize(records: &[AlignedRecord]) -> Option<Stats> {
    let last = records.last()?;

    let station_count = records
        .iter()
        .map(|r| r.station_id.as_str())
        .collect::<HashSet<_>>()
        .len();
    let sum: f64 = records.iter().map(|r| r.value).sum();
    let max_value = records.iter().map(|r| r.value).fold(f64::NEG_INFINITY, f64::max);
    let min_value = records.iter().map(|r| r.value).fold(f64::INFINITY, f64::min);

    Some(Stats {
        total_readings: records.len(),
        station_count,
        avg_value: sum / records.len() as f64,
        max_value,
        min_value,
        latest_reading: last.timestamp,
    })
}
