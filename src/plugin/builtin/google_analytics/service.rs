//! Minimal client for the Google Analytics v3 reporting API

use serde::Deserialize;

pub const DEFAULT_API_URL: &str = "https://www.googleapis.com/analytics/v3";

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// Tabular result shared by the core and realtime endpoints
///
/// Every cell is delivered as a string, numeric metrics included.
#[derive(Debug, Default, Deserialize)]
pub struct DataResponse {
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
}

/// Authorised handle on the reporting API
#[derive(Debug, Clone)]
pub struct AnalyticsService {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl AnalyticsService {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        }
    }

    /// `GET data/ga`
    pub async fn core_report(
        &self,
        ids: &str,
        start_date: &str,
        end_date: &str,
        metrics: &str,
        dimensions: &str,
    ) -> Result<DataResponse, ServiceError> {
        self.get(
            "data/ga",
            &[
                ("ids", ids),
                ("start-date", start_date),
                ("end-date", end_date),
                ("metrics", metrics),
                ("dimensions", dimensions),
            ],
        )
        .await
    }

    /// `GET data/realtime`
    pub async fn realtime(&self, ids: &str, metrics: &str) -> Result<DataResponse, ServiceError> {
        self.get("data/realtime", &[("ids", ids), ("metrics", metrics)])
            .await
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<DataResponse, ServiceError> {
        let url = format!("{}/{}", self.base_url, path);
        log::debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .header("Accept", "application/json")
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ServiceError::Status { status, body });
        }

        Ok(response.json().await?)
    }
}
