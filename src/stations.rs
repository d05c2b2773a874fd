/// Station registry for the environmental forecast service.
///
/// Defines the canonical list of sensing stations, along with their display
/// metadata. This is the single source of truth for station ids; other
/// modules should reference stations from here rather than hardcoding ids.

use serde::Serialize;

// ---------------------------------------------------------------------------
// Station metadata
// ---------------------------------------------------------------------------

/// Static metadata for a single sensing station.
#[derive(Debug, PartialEq, Serialize)]
pub struct StationInfo {
    /// Opaque station id, "S" followed by three digits.
    pub station_id: &'static str,
    pub name: &'static str,
    pub region: &'static str,
    /// Display coordinates in degrees/minutes.
    pub coordinates: &'static str,
    /// WGS84 latitude.
    pub latitude: f64,
    /// WGS84 longitude.
    pub longitude: f64,
}

/// All stations reporting into the service, ordered by station id.
pub static STATION_REGISTRY: &[StationInfo] = &[
    StationInfo {
        station_id: "S001",
        name: "North Singapore",
        region: "North",
        coordinates: "1°25'N, 103°49'E",
        latitude: 1.4167,
        longitude: 103.8167,
    },
    StationInfo {
        station_id: "S002",
        name: "South Singapore",
        region: "South",
        coordinates: "1°18'N, 103°49'E",
        latitude: 1.3000,
        longitude: 103.8167,
    },
    StationInfo {
        station_id: "S003",
        name: "East Singapore",
        region: "East",
        coordinates: "1°21'N, 103°56'E",
        latitude: 1.3500,
        longitude: 103.9333,
    },
    StationInfo {
        station_id: "S004",
        name: "West Singapore",
        region: "West",
        coordinates: "1°21'N, 103°42'E",
        latitude: 1.3500,
        longitude: 103.7000,
    },
    StationInfo {
        station_id: "S005",
        name: "Central Singapore",
        region: "Central",
        coordinates: "1°21'N, 103°49'E",
        latitude: 1.3500,
        longitude: 103.8167,
    },
];

/// Returns the ids of all registered stations as a `Vec<&str>`, suitable for
/// seeding the simulator.
pub fn all_station_ids() -> Vec<&'static str> {
    STATION_REGISTRY.iter().map(|s| s.station_id).collect()
}

/// Looks up a station by id. Returns `None` if not found.
pub fn find_station(station_id: &str) -> Option<&'static StationInfo> {
    STATION_REGISTRY.iter().find(|s| s.station_id == station_id)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
