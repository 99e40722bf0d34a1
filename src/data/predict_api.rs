use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::debug;
use crate::data::cache::{CacheStats, SuggestionCache};
use crate::data::types::{
    ErrorBody, HealthStatus, PredictionRequest, PredictionResponse, SearchResponse,
    TeamSuggestion,
};

pub const PREDICT_PATH: &str = "/api/predict/teams";
pub const SEARCH_PATH: &str = "/api/teams/search";
pub const HEALTH_PATH: &str = "/api/health";

/// Shown when a failed response carries no usable `detail`
pub const GENERIC_FAILURE: &str = "Prediction failed";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    Request { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err.to_string())
    }
}

#[async_trait]
pub trait PredictionService: Send + Sync {
    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResponse, ApiError>;
}

#[async_trait]
pub trait TeamSearch: Send + Sync {
    async fn search_teams(&self, query: &str) -> Result<Vec<TeamSuggestion>, ApiError>;
}

pub struct PredictApiClient {
    client: Client,
    base_url: String,
    cache: SuggestionCache,
}

impl PredictApiClient {
    #[cfg(test)]
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            cache: SuggestionCache::default(),
        }
    }

    pub fn with_settings(base_url: &str, timeout: Duration, cache_ttl: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            cache: SuggestionCache::new(cache_ttl),
        })
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Ask the backend whether it is up
    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        let url = format!("{}{}", self.base_url, HEALTH_PATH);
        let response = self.client.get(&url).send().await?;
        Self::decode(response).await
    }

    /// Read the body and decode it, turning non-2xx answers into `ApiError::Request`
    async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(ApiError::Request {
                status: status.as_u16(),
                message: error_detail(&body),
            });
        }

        serde_json::from_slice(&body).map_err(|e| ApiError::Parse(e.to_string()))
    }
}

/// Pull a message out of `{"detail": "..."}`, falling back to the generic one
fn error_detail(body: &[u8]) -> String {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.detail)
        .and_then(|d| d.as_str().map(str::to_string))
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| GENERIC_FAILURE.to_string())
}

#[async_trait]
impl PredictionService for PredictApiClient {
    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResponse, ApiError> {
        let url = format!("{}{}", self.base_url, PREDICT_PATH);
        debug!("POST {} home={} away={}", url, request.home_team, request.away_team);

        let response = self.client.post(&url).json(request).send().await?;
        Self::decode(response).await
    }
}

#[async_trait]
impl TeamSearch for PredictApiClient {
    async fn search_teams(&self, query: &str) -> Result<Vec<TeamSuggestion>, ApiError> {
        if let Some(teams) = self.cache.get(query) {
            debug!("Suggestion cache hit for {:?}", query);
            return Ok(teams);
        }

        let url = format!(
            "{}{}?q={}",
            self.base_url,
            SEARCH_PATH,
            urlencoding::encode(query)
        );
        let response = self.client.get(&url).send().await?;
        let found: SearchResponse = Self::decode(response).await?;

        self.cache.insert(query, found.teams.clone());
        Ok(found.teams)
    }
}
