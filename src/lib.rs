//! Patient risk triage collector
//!
//! Retrieves paginated patient records from the assessment service, scores
//! each record for risk, aggregates the ids into overlapping category sets,
//! and submits the result back to the service.

pub mod client;
pub mod collector;
pub mod config;
pub mod error;
pub mod scoring;
pub mod types;

// Re-export main types
pub use client::{ApiClient, RealApiClient};
pub use collector::Collector;
pub use config::CollectorConfig;
pub use error::{CollectorError, CollectorResult};
pub use types::{
    ApiFailure, PageResponse, Pagination, PatientRecord, RiskCategories, ScoreResult,
};
