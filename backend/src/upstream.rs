use serde::Deserialize;

use crate::models::Incident;

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("incident API request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("incident API rejected the request: {0}")]
    Rejected(String),
}

/// Envelope returned by `/api/evenements`.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Vec<Incident>,
    #[serde(default)]
    error: Option<String>,
}

/// Client for the dashboard API that owns the incident records.
#[derive(Clone, Debug)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
    per_page: u32,
}

impl UpstreamClient {
    pub fn new(base_url: impl Into<String>, per_page: u32) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            per_page,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn fetch_incidents(&self) -> Result<Vec<Incident>, UpstreamError> {
        let url = format!("{}/api/evenements", self.base_url);
        tracing::debug!("Fetching incidents from {url} (per_page={})", self.per_page);

        let envelope: Envelope = self
            .http
            .get(&url)
            .query(&[("per_page", self.per_page)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if !envelope.success {
            return Err(UpstreamError::Rejected(
                envelope
                    .error
                    .unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        tracing::info!("Fetched {} incidents from upstream", envelope.data.len());
        Ok(envelope.data)
    }
}
