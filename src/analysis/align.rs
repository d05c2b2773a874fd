//! Lag feature alignment.
//!
//! Pairs every reading with two predecessors from the same station: one
//! roughly one sampling interval earlier (lag-1) and one roughly a full daily
//! cycle earlier (lag-24). Readings for which either predecessor cannot be
//! found inside its tolerance window are dropped, never imputed.
//!
//! Candidate selection is first-match: within a station, readings are scanned
//! from the earliest forward and the first one inside the window wins, even
//! when a later candidate is closer in time. With hourly data this makes lag-1
//! resolve to the reading two hours back, not one.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};

use crate::logging::{self, Stage};
use crate::model::{AlignedRecord, CalendarFeatures, Reading};

/// Tolerance windows for the two lag lookups.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LagWindows {
    /// Largest accepted gap for lag-1. The gap must also be strictly positive.
    pub lag1_max_gap: Duration,
    /// Nominal offset for lag-24.
    pub lag24_target: Duration,
    /// Accepted deviation from `lag24_target`, inclusive on both sides.
    pub lag24_tolerance: Duration,
}

impl Default for LagWindows {
    fn default() -> Self {
        Self {
            lag1_max_gap: Duration::hours(2),
            lag24_target: Duration::hours(24),
            lag24_tolerance: Duration::hours(2),
        }
    }
}

/// A reading whose timestamp parsed. Its value may still be non-finite.
struct Candidate<'a> {
    instant: DateTime<Utc>,
    reading: &'a Reading,
}

/// Parses an ingestion timestamp to an absolute instant.
///
/// Accepts RFC 3339 with any offset. Offset-less timestamps are read as UTC.
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: [&str; 3] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Aligns readings using the default windows (lag-1 within 2h, lag-24 within
/// 24h ± 2h).
pub fn align(readings: &[Reading]) -> Vec<AlignedRecord> {
    align_with(readings, &LagWindows::default())
}

/// Aligns readings using explicit tolerance windows.
///
/// Output is ordered by station id, then timestamp. Readings with an
/// unparseable timestamp are excluded entirely. A reading with a non-finite
/// value keeps its place in the scan, so it can still be another reading's
/// first match, but it is never emitted and a record whose chosen lag is
/// non-finite is dropped.
///
/// Window edges that fall outside the representable time range saturate, so
/// oversized windows widen to "everything earlier" instead of overflowing.
pub fn align_with(readings: &[Reading], windows: &LagWindows) -> Vec<AlignedRecord> {
    let mut candidates: Vec<Candidate<'_>> = Vec::with_capacity(readings.len());
    let mut excluded = 0usize;

    for reading in readings {
        let parsed = parse_instant(&reading.timestamp);
        if parsed.is_none() || !reading.value.is_finite() {
            excluded += 1;
            logging::debug(
                Stage::Align,
                Some(&reading.station_id),
                &format!("excluding reading at '{}' (value {})", reading.timestamp, reading.value),
            );
        }
        if let Some(instant) = parsed {
            candidates.push(Candidate { instant, reading });
        }
    }

    // Overflow only happens in the direction of the tolerance's sign.
    let widening = windows.lag24_tolerance > Duration::zero();
    let lag24_outer = windows
        .lag24_target
        .checked_add(&windows.lag24_tolerance)
        .unwrap_or(if widening { Duration::MAX } else { Duration::MIN });
    let lag24_inner = windows
        .lag24_target
        .checked_sub(&windows.lag24_tolerance)
        .unwrap_or(if widening { Duration::MIN } else { Duration::MAX });

    // Stable, so equal (station, instant) pairs keep their input order.
    candidates.sort_by(|a, b| {
        a.reading
            .station_id
            .cmp(&b.reading.station_id)
            .then(a.instant.cmp(&b.instant))
    });

    let mut aligned = Vec::new();

    for station in candidates.chunk_by(|a, b| a.reading.station_id == b.reading.station_id) {
        for (i, current) in station.iter().enumerate() {
            if !current.reading.value.is_finite() {
                continue;
            }
            let earlier = &station[..i];
            let t = current.instant;

            let lag1 = first_in_window(earlier, before(t, windows.lag1_max_gap), |c| c.instant < t);
            let lag24_latest = before(t, lag24_inner);
            let lag24 = first_in_window(earlier, before(t, lag24_outer), |c| {
                c.instant <= lag24_latest && c.instant < t
            });

            if let (Some(lag1), Some(lag24)) = (lag1, lag24) {
                if !lag1.reading.value.is_finite() || !lag24.reading.value.is_finite() {
                    continue;
                }
                let calendar = CalendarFeatures::from_instant(t);
                aligned.push(AlignedRecord {
                    timestamp: t,
                    station_id: current.reading.station_id.clone(),
                    value: current.reading.value,
                    hour: calendar.hour,
                    day_of_week: calendar.day_of_week,
                    month: calendar.month,
                    value_lag1: lag1.reading.value,
                    value_lag24: lag24.reading.value,
                });
            }
        }
    }

    logging::log_alignment_summary(readings.len(), aligned.len(), excluded);
    aligned
}

/// `t - offset`, clamped to the representable range.
fn before(t: DateTime<Utc>, offset: Duration) -> DateTime<Utc> {
    t.checked_sub_signed(offset).unwrap_or(if offset > Duration::zero() {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    })
}

/// First earlier reading, in scan order, whose instant is at or after `lower`
/// and which satisfies the upper-edge test.
///
/// `earlier` is sorted by instant, so the first reading at or after `lower` is
/// also the first scan match; if it fails the upper edge every later one does.
fn first_in_window<'s, 'a>(
    earlier: &'s [Candidate<'a>],
    lower: DateTime<Utc>,
    below_upper: impl Fn(&Candidate<'a>) -> bool,
) -> Option<&'s Candidate<'a>> {
    let start = earlier.partition_point(|c| c.instant < lower);
    earlier.get(start).filter(|c| below_upper(*c))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
