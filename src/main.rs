//! `envmon`: run the feature pipeline once and request a forecast.
//!
//! Loads readings from a file (or generates a week of synthetic history),
//! aligns lag features, prints summary statistics and a sample of aligned
//! records, then asks the scoring service for the next hour at one station.
//! Failures of either action are printed; they never abort the run.

use std::error::Error;
use std::path::PathBuf;

use chrono::Utc;
use clap::Parser;

use envmon_service::analysis::groupings::{filter_by_station, unique_stations, StationFilter};
use envmon_service::analysis::{align_with, summarize};
use envmon_service::config::{ServiceConfig, DEFAULT_CONFIG_PATH};
use envmon_service::dev_mode::Simulator;
use envmon_service::ingest;
use envmon_service::logging::{self, Stage};
use envmon_service::model::{AlignedRecord, PipelineError, PredictionResult, Reading};
use envmon_service::predict::{predict_for_station, PredictionClient};

const RULE: &str = "═══════════════════════════════════════════════════════════";

#[derive(Debug, Parser)]
#[command(name = "envmon", version, about = "Lag-aligned sensor features and one-hour-ahead forecasts")]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Readings file (.json array or .jsonl blob export); simulated when omitted
    #[arg(long)]
    input: Option<PathBuf>,

    /// Station shown in the record listing, or "all"
    #[arg(long, default_value = "all")]
    show: String,

    /// Number of aligned records to list
    #[arg(long, default_value_t = 10)]
    limit: usize,

    /// Station to forecast
    #[arg(long, default_value = "S001")]
    station: String,

    /// Skip the prediction request
    #[arg(long)]
    no_predict: bool,

    /// Check the scoring service health endpoint first
    #[arg(long)]
    health: bool,

    /// Print the prediction result as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config = ServiceConfig::load_with_env(&cli.config)?;
    logging::init_logger(
        config.logging.min_level()?,
        config.logging.file.as_deref(),
        config.logging.timestamps,
    );
    logging::debug(
        Stage::System,
        None,
        &format!("config {} (prediction endpoint '{}')", cli.config.display(), config.prediction.endpoint),
    );

    let windows = config.alignment.windows()?;

    // Fetch-and-process action
    let aligned = match load_readings(&cli, &config) {
        Ok(readings) => align_with(&readings, &windows),
        Err(e) => {
            println!("Failed to fetch data: {}", e);
            Vec::new()
        }
    };

    print_stats(&aligned);
    print_records(&aligned, &StationFilter::parse(&cli.show), cli.limit);

    if cli.no_predict {
        return Ok(());
    }

    // Predict action
    if aligned.is_empty() {
        println!("No processed data available for predictions");
        return Ok(());
    }

    let client = match PredictionClient::new(&config.prediction) {
        Ok(c) => c,
        Err(e) => {
            println!("Prediction failed: {}", e);
            return Ok(());
        }
    };

    if cli.health {
        match client.health() {
            Ok(h) if h.is_ready() => logging::info(Stage::Predict, None, "Scoring service is ready"),
            Ok(h) => logging::warn(
                Stage::Predict,
                None,
                &format!("Scoring service not ready: status={} model_loaded={}", h.status, h.model_loaded),
            ),
            Err(e) => logging::warn(Stage::Predict, None, &format!("Health check failed: {}", e)),
        }
    }

    match predict_for_station(&client, &aligned, &cli.station) {
        Ok(result) if cli.json => println!("{}", serde_json::to_string_pretty(&result)?),
        Ok(result) => print_prediction(&result),
        Err(e) => println!("Prediction failed: {}", e),
    }

    Ok(())
}

fn load_readings(cli: &Cli, config: &ServiceConfig) -> Result<Vec<Reading>, PipelineError> {
    match &cli.input {
        Some(path) => ingest::load_readings(path),
        None => {
            let readings = Simulator::from_config(&config.simulation).generate(Utc::now());
            logging::info(
                Stage::Ingest,
                None,
                &format!("Generated {} simulated readings", readings.len()),
            );
            Ok(readings)
        }
    }
}

fn print_stats(aligned: &[AlignedRecord]) {
    println!("\n{}", RULE);
    println!("PIPELINE SUMMARY");
    println!("{}", RULE);

    match summarize(aligned) {
        Some(stats) => {
            println!("Aligned records:  {}", stats.total_readings);
            println!("Stations:         {}", stats.station_count);
            println!("Average value:    {:.2}", stats.avg_value);
            println!("Max / Min:        {:.2} / {:.2}", stats.max_value, stats.min_value);
            println!("Latest reading:   {}", stats.latest_reading.format("%Y-%m-%d %H:%M UTC"));
        }
        None => println!("No data"),
    }
    println!("{}", RULE);
}

fn print_records(aligned: &[AlignedRecord], filter: &StationFilter, limit: usize) {
    let visible = filter_by_station(aligned, filter);
    println!(
        "\nStations: {}  (showing {} of {} records)",
        unique_stations(aligned).join(", "),
        visible.len().min(limit),
        visible.len()
    );

    for record in visible.iter().rev().take(limit) {
        println!(
            "  {} {}  {:>6.2}  Lag1: {:.2} | Lag24: {:.2}",
            record.station_id,
            record.timestamp.format("%Y-%m-%d %H:%M"),
            record.value,
            record.value_lag1,
            record.value_lag24
        );
    }
}

fn print_prediction(result: &PredictionResult) {
    let station_name = result.station_info.map(|s| s.name).unwrap_or("unknown station");

    println!("\n{}", RULE);
    println!("FORECAST {} ({})", result.station_id, station_name);
    println!("{}", RULE);
    println!(
        "Current   {}  {:.2}",
        result.current_timestamp.format("%Y-%m-%d %H:%M UTC"),
        result.current_value
    );
    println!(
        "Predicted {}  {}",
        result.predicted_timestamp.format("%Y-%m-%d %H:%M UTC"),
        result.predicted_value
    );
    println!("Confidence (synthetic): {:.1}%", result.confidence * 100.0);
    let f = &result.input_features;
    println!(
        "Features: hour={} day_of_week={} month={} lag1={:.2} lag24={:.2}",
        f.hour, f.day_of_week, f.month, f.value_lag1, f.value_lag24
    );
    println!("{}", RULE);
}
