//! Collection orchestrator
//!
//! Drives the page loop to exhaustion, queues zero-yield pages for one
//! second-pass retry, folds scored records into the category sets, and
//! hands the result to the submission step.

use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::client::ApiClient;
use crate::config::CollectorConfig;
use crate::error::{CollectorError, CollectorResult};
use crate::scoring;
use crate::types::{PageResponse, PatientRecord, RiskCategories};

/// Owns the accumulated category sets for the duration of one run
pub struct Collector<C: ApiClient> {
    client: C,
    config: CollectorConfig,
}

impl<C: ApiClient> Collector<C> {
    pub fn new(client: C, config: CollectorConfig) -> Self {
        Self { client, config }
    }

    /// Run the collection phase: paginate to exhaustion, retry empty pages
    /// once, and return the deduplicated category sets.
    pub async fn run(&self) -> RiskCategories {
        let mut categories = RiskCategories::default();
        let mut page: u32 = 1;
        let mut has_next = true;
        let mut expected_total: Option<u64> = None;
        let mut pending_retry: Vec<u32> = Vec::new();
        let mut collected: usize = 0;

        while has_next {
            if let Some(max) = self.config.max_pages {
                if page > max {
                    warn!("⚠️ Stopping at configured page cap {}", max);
                    break;
                }
            }

            sleep(self.config.inter_request_delay).await;
            let page_response = self.client.fetch_page(page, self.config.page_size).await;

            if let Some(pagination) = &page_response.pagination {
                if let Some(total) = pagination.total {
                    expected_total = Some(total);
                }
            }

            if page_response.patients.is_empty() {
                // A momentarily-empty page does not terminate pagination;
                // it gets exactly one more chance after the main loop.
                warn!("⚠️ Page {} yielded no records, queued for retry", page);
                pending_retry.push(page);
                page += 1;
                continue;
            }

            collected += fold_page(&page_response, &mut categories);
            has_next = page_response
                .pagination
                .as_ref()
                .map(|p| p.has_next)
                .unwrap_or(false);
            page += 1;
            sleep(self.config.post_request_delay).await;
        }

        for &pending in &pending_retry {
            sleep(self.config.retry_pass_delay).await;
            let page_response = self.client.fetch_page(pending, self.config.page_size).await;

            if page_response.patients.is_empty() {
                warn!("❌ Page {} still empty after retry, dropping it", pending);
            } else {
                info!(
                    "✅ Recovered {} records from page {}",
                    page_response.patients.len(),
                    pending
                );
                collected += fold_page(&page_response, &mut categories);
            }
        }

        if let Some(total) = expected_total {
            if (collected as u64) < total {
                warn!(
                    "⚠️ Collected {} records but the service reported {}",
                    collected, total
                );
            }
        }

        info!(
            "📊 Collection complete: {} records, {} high risk, {} fever, {} data quality",
            collected,
            categories.high_risk.len(),
            categories.fever.len(),
            categories.data_quality.len()
        );

        categories
    }

    /// Submit the assessment. One attempt; a failure is reported to the
    /// caller but the completed collection phase stands either way.
    pub async fn report(&self, categories: &RiskCategories) -> CollectorResult<()> {
        match self.client.submit_assessment(categories).await {
            Ok(outcome) => {
                info!("📤 Assessment submitted, service replied: {}", outcome);
                Ok(())
            }
            Err(reason) => {
                error!("❌ Assessment submission failed: {}", reason);
                Err(CollectorError::SubmissionFailed { reason })
            }
        }
    }
}

fn fold_page(page_response: &PageResponse, categories: &mut RiskCategories) -> usize {
    for record in &page_response.patients {
        route_record(record, categories);
    }
    page_response.patients.len()
}

fn route_record(record: &PatientRecord, categories: &mut RiskCategories) {
    let result = scoring::score(record);
    categories.record(&record.patient_id, &result);
}
