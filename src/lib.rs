//! Environmental forecast service.
//!
//! Turns a snapshot of per-station sensor readings into lag-aligned feature
//! records, summarizes them, and asks a remote model for a one-hour-ahead
//! forecast for a chosen station.
//!
//! raw readings → `analysis::align` → aligned records → `predict::prepare`
//! → scoring service → `PredictionResult`

pub mod analysis;
pub mod config;
pub mod dev_mode;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod predict;
pub mod stations;
