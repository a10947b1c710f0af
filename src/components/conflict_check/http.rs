use super::source::{ConflictCount, ConflictSource};
use crate::error::{config_error, conflict_source_error, SchedulerResult};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

/// Path appended to the configured base URL
const CONFLICTS_PATH: &str = "appointments/conflicts";

/// Bodies the conflict endpoint is known to return
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ConflictResponse {
    List(Vec<ConflictCount>),
    Wrapped { conflicts: Vec<ConflictCount> },
}

impl ConflictResponse {
    fn into_counts(self) -> Vec<ConflictCount> {
        match self {
            ConflictResponse::List(counts) => counts,
            ConflictResponse::Wrapped { conflicts } => conflicts,
        }
    }
}

/// Queries an HTTP endpoint for existing appointment counts
#[derive(Clone)]
pub struct HttpConflictSource {
    endpoint: Url,
    token: Option<String>,
    client: Client,
}

impl HttpConflictSource {
    /// Create a source rooted at `base_url`
    pub fn new(base_url: &str, token: Option<String>) -> SchedulerResult<Self> {
        let base = format!("{}/", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&base)
            .and_then(|url| url.join(CONFLICTS_PATH))
            .map_err(|e| config_error(&format!("Invalid CONFLICT_API_URL '{}': {}", base_url, e)))?;

        Ok(Self {
            endpoint,
            token,
            client: Client::new(),
        })
    }

    /// Full request URL for a set of dates and times
    pub fn request_url(&self, dates: &[NaiveDate], times: &[String]) -> Url {
        let dates = dates
            .iter()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .collect::<Vec<_>>()
            .join(",");

        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("dates", &dates)
            .append_pair("times", &times.join(","));
        url
    }
}

#[async_trait]
impl ConflictSource for HttpConflictSource {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn existing_counts(
        &self,
        dates: &[NaiveDate],
        times: &[String],
    ) -> SchedulerResult<Vec<ConflictCount>> {
        let url = self.request_url(dates, times);
        debug!("Fetching conflict counts from {}", url);

        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request
            .send()
            .await
            .map_err(|e| conflict_source_error(&format!("Failed to fetch conflicts: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(conflict_source_error(&format!(
                "Failed to fetch conflicts: HTTP {} - {}",
                status, error_body
            )));
        }

        let body: ConflictResponse = response.json().await.map_err(|e| {
            conflict_source_error(&format!("Failed to parse conflicts response: {}", e))
        })?;

        Ok(body.into_counts())
    }
}
