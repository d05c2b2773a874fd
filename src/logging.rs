/// Structured logging for the environmental forecast service
///
/// Provides context-rich logging with station identifiers, timestamps,
/// and severity levels. Supports both console output and file-based
/// logging for unattended runs.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::str::FromStr;
use std::sync::Mutex;

use crate::model::PipelineError;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline Stages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    Ingest,
    Align,
    Predict,
    System,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Ingest => write!(f, "INGEST"),
            Stage::Align => write!(f, "ALIGN"),
            Stage::Predict => write!(f, "PREDICT"),
            Stage::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - station has no aligned data yet, nothing is broken
    Expected,
    /// Unexpected failure - indicates service degradation or configuration issue
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console_timestamps,
        };

        if let Ok(mut guard) = LOGGER.lock() {
            *guard = Some(logger);
        }
    }

    fn format_entry(level: LogLevel, stage: &Stage, station_id: Option<&str>, message: &str) -> String {
        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        let station_part = station_id.map(|s| format!(" [{}]", s)).unwrap_or_default();
        format!("{} {} {}{}: {}", timestamp, level, stage, station_part, message)
    }

    fn log(&self, level: LogLevel, stage: &Stage, station_id: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let log_entry = Self::format_entry(level, stage, station_id, message);

        // Console output
        let line = self.console_line(level, stage, station_id, message, &log_entry);
        match level {
            LogLevel::Error | LogLevel::Warning => eprintln!("{}", line),
            LogLevel::Info | LogLevel::Debug => println!("{}", line),
        }

        // File output
        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn console_line(
        &self,
        level: LogLevel,
        stage: &Stage,
        station_id: Option<&str>,
        message: &str,
        log_entry: &str,
    ) -> String {
        let station_part = station_id.map(|s| format!(" [{}]", s)).unwrap_or_default();

        if self.console_timestamps {
            match level {
                LogLevel::Error => log_entry.to_string(),
                LogLevel::Warning => format!("   {}", log_entry),
                LogLevel::Info => format!("   {}", message),
                LogLevel::Debug => format!("   [DEBUG] {}", message),
            }
        } else {
            match level {
                LogLevel::Error => format!("   ✗ {}{}: {}", stage, station_part, message),
                LogLevel::Warning => format!("   ⚠ {}{}: {}", stage, station_part, message),
                LogLevel::Info => format!("   {}", message),
                LogLevel::Debug => format!("   [DEBUG] {}{}: {}", stage, station_part, message),
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    Logger::init(min_level, log_file.map(String::from), console_timestamps);
}

fn emit(level: LogLevel, stage: Stage, station_id: Option<&str>, message: &str) {
    if let Ok(guard) = LOGGER.lock() {
        if let Some(logger) = guard.as_ref() {
            logger.log(level, &stage, station_id, message);
        }
    }
}

/// Log a general informational message
pub fn info(stage: Stage, station_id: Option<&str>, message: &str) {
    emit(LogLevel::Info, stage, station_id, message);
}

/// Log a warning message
pub fn warn(stage: Stage, station_id: Option<&str>, message: &str) {
    emit(LogLevel::Warning, stage, station_id, message);
}

/// Log an error message
pub fn error(stage: Stage, station_id: Option<&str>, message: &str) {
    emit(LogLevel::Error, stage, station_id, message);
}

/// Log a debug message
pub fn debug(stage: Stage, station_id: Option<&str>, message: &str) {
    emit(LogLevel::Debug, stage, station_id, message);
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify a prediction failure by how much it says about service health.
pub fn classify_prediction_failure(err: &PipelineError) -> FailureType {
    match err {
        // Stations still warming up (< ~26 readings deep) legitimately have no
        // aligned records.
        PipelineError::NoData { .. } => FailureType::Expected,
        PipelineError::Upstream { status, .. } if *status >= 500 => FailureType::Unexpected,
        PipelineError::Upstream { .. } => FailureType::Unknown,
        PipelineError::Transport(_) | PipelineError::MalformedResponse(_) => FailureType::Unexpected,
        PipelineError::InvalidRequest(_) => FailureType::Unexpected,
        PipelineError::Parse(_) | PipelineError::Config(_) => FailureType::Unknown,
    }
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Log a prediction failure with automatic classification
pub fn log_prediction_failure(station_id: &str, operation: &str, err: &PipelineError) {
    let failure_type = classify_prediction_failure(err);

    let message = format!("{} failed [{}]: {}", operation, failure_type, err);

    match failure_type {
        FailureType::Expected => debug(Stage::Predict, Some(station_id), &message),
        FailureType::Unexpected => error(Stage::Predict, Some(station_id), &message),
        FailureType::Unknown => warn(Stage::Predict, Some(station_id), &message),
    }
}

// ---------------------------------------------------------------------------
// Alignment Summary Logging
// ---------------------------------------------------------------------------

/// Log a summary of one alignment pass
pub fn log_alignment_summary(total: usize, aligned: usize, excluded: usize) {
    let dropped = total.saturating_sub(aligned + excluded);
    let message = format!(
        "Alignment complete: {}/{} aligned, {} dropped without lags, {} excluded as malformed",
        aligned, total, dropped, excluded
    );

    if excluded > 0 || (aligned == 0 && total > 0) {
        warn(Stage::Align, None, &message);
    } else {
        info(Stage::Align, None, &message);
    }
}
