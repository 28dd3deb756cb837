//! HTTP client for the assessment service
//!
//! One GET per page fetch attempt with exponential backoff on transient
//! failures, and one non-retried POST for the final submission.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::CollectorConfig;
use crate::types::{ApiFailure, PageResponse, RiskCategories};

/// Client seam between the collector and the remote service
#[mockall::automock]
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Fetch one page of patient records. Never fails: transient errors
    /// are retried with backoff and anything unrecoverable degrades to an
    /// empty page, which callers treat as "may need retry", not "done".
    async fn fetch_page(&self, page: u32, limit: u32) -> PageResponse;

    /// Submit the three category sets. Exactly one attempt.
    async fn submit_assessment(&self, categories: &RiskCategories) -> Result<Value, ApiFailure>;
}

/// Real client backed by reqwest
pub struct RealApiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    max_attempts: u32,
    retry_base_delay: std::time::Duration,
}

impl RealApiClient {
    pub fn new(config: &CollectorConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            max_attempts: config.max_attempts,
            retry_base_delay: config.retry_base_delay,
        }
    }

    /// One request attempt, outcome classified into `ApiFailure`
    async fn request_page(&self, page: u32, limit: u32) -> Result<PageResponse, ApiFailure> {
        let url = format!("{}/api/patients", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("page", page), ("limit", limit)])
            .header("x-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| ApiFailure::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(status.as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ApiFailure::InvalidResponse(e.to_string()))?;

        Ok(PageResponse::from_value(&body))
    }
}

fn classify_status(code: u16) -> ApiFailure {
    match code {
        401 | 403 => ApiFailure::AuthenticationFailed,
        429 => ApiFailure::RateLimited,
        code if code >= 500 => ApiFailure::ServerError(code),
        code => ApiFailure::HttpStatus(code),
    }
}

#[async_trait]
impl ApiClient for RealApiClient {
    async fn fetch_page(&self, page: u32, limit: u32) -> PageResponse {
        for attempt in 0..self.max_attempts {
            match self.request_page(page, limit).await {
                Ok(page_response) => {
                    if attempt > 0 {
                        info!("✅ Page {} fetched after {} retries", page, attempt);
                    } else {
                        debug!("Page {} fetched ({} records)", page, page_response.patients.len());
                    }
                    return page_response;
                }
                Err(failure) if failure.is_transient() => {
                    if attempt + 1 < self.max_attempts {
                        let delay = self.retry_base_delay * 2u32.pow(attempt);
                        warn!(
                            "⏳ Transient failure on page {} (attempt {}/{}), retrying in {}ms: {}",
                            page,
                            attempt + 1,
                            self.max_attempts,
                            delay.as_millis(),
                            failure
                        );
                        tokio::time::sleep(delay).await;
                    }
                }
                Err(failure) => {
                    warn!("❌ Terminal failure fetching page {}: {}", page, failure);
                    return PageResponse::empty();
                }
            }
        }

        warn!(
            "❌ Page {} still failing after {} attempts, treating as empty",
            page, self.max_attempts
        );
        PageResponse::empty()
    }

    async fn submit_assessment(&self, categories: &RiskCategories) -> Result<Value, ApiFailure> {
        let url = format!("{}/api/submit-assessment", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .json(categories)
            .send()
            .await
            .map_err(|e| ApiFailure::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(status.as_u16()));
        }

        // The outcome body is advisory; an unparseable body is not a
        // failed submission.
        let outcome = response.json::<Value>().await.unwrap_or(Value::Null);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(classify_status(401), ApiFailure::AuthenticationFailed);
        assert_eq!(classify_status(403), ApiFailure::AuthenticationFailed);
        assert_eq!(classify_status(429), ApiFailure::RateLimited);
        assert_eq!(classify_status(500), ApiFailure::ServerError(500));
        assert_eq!(classify_status(503), ApiFailure::ServerError(503));
        assert_eq!(classify_status(404), ApiFailure::HttpStatus(404));
        assert_eq!(classify_status(418), ApiFailure::HttpStatus(418));
    }
}
