//! HTTP gateway to the analysis endpoint.
//!
//! One outbound request exists in the whole application: a GET against
//! the fraud-analysis endpoint, no query parameters or body. Transport
//! and parse failures are mapped to [`FetchError`] here so the controller
//! only ever sees the typed taxonomy.

use crate::models::AnalysisResult;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Failure modes of a fetch. Malformed payloads are surfaced exactly like
/// transport failures; the distinction only matters for logs.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection could not be established.
    #[error("cannot connect to the analysis backend at {url}")]
    Connect { url: String },

    /// The request exceeded the client timeout.
    #[error("analysis request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// Any other transport-level failure.
    #[error("analysis request failed: {reason}")]
    Transport { reason: String },

    /// The backend answered with a non-success status.
    #[error("analysis backend returned HTTP {status}")]
    Status { status: u16 },

    /// The body could not be parsed as an analysis payload.
    #[error("analysis response is not a valid payload: {reason}")]
    Malformed { reason: String },
}

impl FetchError {
    /// The single user-visible failure notice, naming the likely cause.
    pub fn user_notice(&self) -> &'static str {
        "Erro ao conectar com o backend de análise. Verifique se o serviço está rodando."
    }
}

/// Client for the fraud-analysis endpoint.
pub struct AnalysisClient {
    http: reqwest::Client,
    endpoint: String,
    timeout_seconds: u64,
}

impl AnalysisClient {
    /// Create a client. The timeout is baked into the underlying
    /// `reqwest::Client` so an unresponsive backend resolves as a
    /// timeout failure instead of hanging the session.
    pub fn new(endpoint: String, timeout_seconds: u64) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            endpoint,
            timeout_seconds,
        }
    }

    /// The configured endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Issue the GET and parse the payload.
    ///
    /// Absent optional fields default at the serde boundary, so a
    /// structurally valid but sparse body still succeeds.
    pub async fn fetch(&self) -> Result<AnalysisResult, FetchError> {
        debug!("GET {}", self.endpoint);

        let response = self.http.get(&self.endpoint).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    seconds: self.timeout_seconds,
                }
            } else if e.is_connect() {
                FetchError::Connect {
                    url: self.endpoint.clone(),
                }
            } else {
                FetchError::Transport {
                    reason: e.to_string(),
                }
            }
        })?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                status: response.status().as_u16(),
            });
        }

        let payload: AnalysisResult = response.json().await.map_err(|e| FetchError::Malformed {
            reason: e.to_string(),
        })?;

        info!(
            "fetched {} records ({} declared suspicious)",
            payload.records.len(),
            payload.total_suspicious
        );

        Ok(payload)
    }
}
