/// Development mode utilities for working without a live feed
///
/// When no real ingestion source is available, use this module to generate a
/// plausible hourly temperature history for every registered station.

use std::f64::consts::PI;

use chrono::{DateTime, Datelike, Duration, SecondsFormat, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::SimulationConfig;
use crate::model::Reading;
use crate::stations;

/// Configuration for synthetic data generation
pub struct Simulator {
    /// Days of hourly history to generate, counting back from `now`
    pub days: u32,
    /// Station ids to generate for; position in this list shifts the baseline
    pub stations: Vec<String>,
    rng: StdRng,
}

impl Simulator {
    /// Create a simulator over every registered station
    ///
    /// # Arguments
    /// * `days` - Days of history to generate
    pub fn new(days: u32) -> Self {
        Self {
            days,
            stations: stations::all_station_ids().into_iter().map(String::from).collect(),
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        let sim = Self::new(config.days);
        match config.seed {
            Some(seed) => sim.with_seed(seed),
            None => sim,
        }
    }

    /// Fix the noise sequence so runs are reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn with_stations(mut self, stations: &[&str]) -> Self {
        self.stations = stations.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Generate readings for the `days * 24` hours before (and including) `now`
    ///
    /// Each value is a daily sine cycle around 20 with a seasonal term, ±2 of
    /// uniform noise and a per-station offset, clamped at zero. Output is
    /// sorted by timestamp ascending.
    pub fn generate(&mut self, now: DateTime<Utc>) -> Vec<Reading> {
        let mut readings = Vec::with_capacity(self.days as usize * 24 * self.stations.len());

        for day in 0..i64::from(self.days) {
            for hour in 0..24i64 {
                let timestamp = now - Duration::hours(day * 24 + hour);
                let base_value = 20.0 + (hour as f64 * PI / 12.0).sin() * 10.0;
                let seasonal = (timestamp.month0() as f64 * PI / 6.0).sin() * 5.0;

                for (index, station_id) in self.stations.iter().enumerate() {
                    let noise = (self.rng.random::<f64>() - 0.5) * 4.0;
                    let station_factor = index as f64 * 2.0;

                    readings.push(Reading {
                        timestamp: timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
                        station_id: station_id.clone(),
                        value: (base_value + seasonal + noise + station_factor).max(0.0),
                    });
                }
            }
        }

        // Uniform format, so string order is time order.
        readings.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        readings
    }
}
