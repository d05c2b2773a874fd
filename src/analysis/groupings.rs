//! Station views over aligned output.

use crate::model::AlignedRecord;

/// Selects which stations a view shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StationFilter {
    #[default]
    All,
    Station(String),
}

impl StationFilter {
    /// Parses a user selection; `"all"` (any case) or an empty string means
    /// every station.
    pub fn parse(selection: &str) -> Self {
        let selection = selection.trim();
        if selection.is_empty() || selection.eq_ignore_ascii_case("all") {
            StationFilter::All
        } else {
            StationFilter::Station(selection.to_string())
        }
    }

    pub fn matches(&self, station_id: &str) -> bool {
        match self {
            StationFilter::All => true,
            StationFilter::Station(id) => id == station_id,
        }
    }
}

/// Records visible under `filter`, in their original order.
pub fn filter_by_station<'a>(records: &'a [AlignedRecord], filter: &StationFilter) -> Vec<&'a AlignedRecord> {
    records.iter().filter(|r| filter.matches(&r.station_id)).collect()
}

/// Distinct station ids in order of first appearance.
pub fn unique_stations(records: &[AlignedRecord]) -> Vec<&str> {
    let mut seen = std::collections::HashSet::new();
    records
        .iter()
        .map(|r| r.station_id.as_str())
        .filter(|id| seen.insert(*id))
        .collect()
}
