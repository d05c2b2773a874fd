/// Prediction service HTTP client
///
/// Sends assembled `PredictionRequest`s to the deployed scoring endpoint and
/// hands back the raw JSON envelope. One POST per request: no retry, no
/// queueing of concurrent calls, and no timeout unless one is configured.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::config::PredictionConfig;
use crate::logging::{self, Stage};
use crate::model::{PipelineError, PredictionRequest};

// ============================================================================
// Service Response Structures
// ============================================================================

/// Body of the scoring service's `GET /health`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub model_loaded: bool,
    pub timestamp: Option<String>,
    pub version: Option<String>,
}

impl HealthStatus {
    pub fn is_ready(&self) -> bool {
        self.status == "healthy" && self.model_loaded
    }
}

// ============================================================================
// Client
// ============================================================================

/// Anything that can turn a request into a response envelope.
pub trait PredictionService {
    fn predict(&self, request: &PredictionRequest) -> Result<Value, PipelineError>;
}

pub struct PredictionClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    health_url: Option<String>,
    api_key: Option<String>,
}

impl PredictionClient {
    /// Build a client from the `[prediction]` config table.
    pub fn new(config: &PredictionConfig) -> Result<Self, PipelineError> {
        if config.endpoint.trim().is_empty() {
            return Err(PipelineError::Config("prediction endpoint is not set".to_string()));
        }

        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout_secs.map(Duration::from_secs))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            health_url: config.health_url(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Query the service health endpoint.
    pub fn health(&self) -> Result<HealthStatus, PipelineError> {
        let url = self
            .health_url
            .as_deref()
            .ok_or_else(|| PipelineError::Config("no health endpoint configured".to_string()))?;

        let response = self.http.get(url).header("Accept", "application/json").send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(PipelineError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text()?;
        serde_json::from_str(&text).map_err(|e| PipelineError::MalformedResponse(e.to_string()))
    }
}

impl PredictionService for PredictionClient {
    fn predict(&self, request: &PredictionRequest) -> Result<Value, PipelineError> {
        let mut builder = self
            .http
            .post(&self.endpoint)
            .header("Accept", "application/json")
            .json(request);

        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        logging::debug(
            Stage::Predict,
            None,
            &format!("POST {} {:?}", self.endpoint, request),
        );

        let response = builder.send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(PipelineError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text()?;
        serde_json::from_str(&text).map_err(|e| PipelineError::MalformedResponse(e.to_string()))
    }
}

// ============================================================================
// Tests
// ============================================================================
