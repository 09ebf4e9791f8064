//! HTTP client for the remote rating service

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, error, warn};

use crate::domain::rating::{
    ConcurrencyLimiter, FetchOutcome, RatingSource, RawRatingEntry, RetryConfig, TeamId,
};
use crate::domain::DomainError;
use crate::infrastructure::observability::record_fetch_retry;

/// Rating service configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RatingApiConfig {
    /// Base URL of the rating service, without trailing slash
    pub base_url: String,
    /// Timeout for one request, including reading the body
    pub request_timeout_secs: u64,
    /// Retry policy for transport failures
    pub retry: RetryConfig,
}

impl Default for RatingApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://rating.chgk.info".to_string(),
            request_timeout_secs: 30,
            retry: RetryConfig::default(),
        }
    }
}

impl RatingApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_secs = timeout.as_secs().max(1);
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

/// Result of a single HTTP attempt that reached the service
enum Attempt {
    Entries(Vec<RawRatingEntry>),
    Status(u16),
    InvalidPayload(String),
}

/// Rating source backed by the rating service's per-team JSON endpoint
#[derive(Debug, Clone)]
pub struct HttpRatingClient {
    client: Client,
    base_url: String,
    retry: RetryConfig,
}

impl HttpRatingClient {
    pub fn new(config: &RatingApiConfig) -> Result<Self, DomainError> {
        Self::with_timeout(config, Duration::from_secs(config.request_timeout_secs))
    }

    /// Build a client with an explicit per-request timeout
    pub fn with_timeout(config: &RatingApiConfig, timeout: Duration) -> Result<Self, DomainError> {
        if timeout.is_zero() {
            return Err(DomainError::configuration(
                "rating_api.request_timeout_secs must be greater than zero",
            ));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                DomainError::configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retry: config.retry.clone(),
        })
    }

    /// Per-team rating endpoint
    pub fn team_url(&self, team_id: TeamId) -> String {
        format!("{}/api/teams/{}/rating.json", self.base_url, team_id)
    }

    async fn attempt(&self, url: &str) -> Result<Attempt, reqwest::Error> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status != StatusCode::OK {
            return Ok(Attempt::Status(status.as_u16()));
        }

        let body = response.bytes().await?;

        Ok(match serde_json::from_slice::<Vec<RawRatingEntry>>(&body) {
            Ok(entries) => Attempt::Entries(entries),
            Err(e) => Attempt::InvalidPayload(e.to_string()),
        })
    }
}

#[async_trait]
impl RatingSource for HttpRatingClient {
    async fn fetch(&self, team_id: TeamId, limiter: &ConcurrencyLimiter) -> FetchOutcome {
        let url = self.team_url(team_id);
        let max_attempts = self.retry.max_attempts();
        let mut attempt = 0;

        loop {
            attempt += 1;

            // The permit covers the request only, never the backoff sleep
            let result = match limiter.acquire().await {
                Ok(_permit) => self.attempt(&url).await,
                Err(e) => {
                    return FetchOutcome::Failed {
                        attempts: attempt - 1,
                        reason: e.to_string(),
                    };
                }
            };

            match result {
                Ok(Attempt::Entries(entries)) => {
                    debug!(team_id = %team_id, entries = entries.len(), "Fetched team ratings");
                    return FetchOutcome::Fetched(entries);
                }
                Ok(Attempt::Status(status)) => {
                    debug!(team_id = %team_id, status = status, "No rating data for team");
                    return FetchOutcome::Skipped { status };
                }
                Ok(Attempt::InvalidPayload(reason)) => {
                    warn!(team_id = %team_id, url = %url, error = %reason, "Invalid rating payload");
                    return FetchOutcome::Failed {
                        attempts: attempt,
                        reason: format!("Invalid rating payload: {}", reason),
                    };
                }
                Err(e) => {
                    error!(
                        team_id = %team_id,
                        url = %url,
                        attempt = attempt,
                        max_attempts = max_attempts,
                        error = %e,
                        "Rating request failed"
                    );

                    if attempt >= max_attempts {
                        return FetchOutcome::Failed {
                            attempts: attempt,
                            reason: DomainError::remote(&url, e.to_string()).to_string(),
                        };
                    }

                    record_fetch_retry();
                    tokio::time::sleep(self.retry.delay_for_retry(attempt - 1)).await;
                }
            }
        }
    }
}
