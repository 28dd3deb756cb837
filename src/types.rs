//! Collector data types and the typed view of the remote API's wire format

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Total score at or above which a patient lands in the high-risk set
pub const HIGH_RISK_THRESHOLD: u8 = 4;

/// One patient record as returned by the paginated endpoint.
///
/// The three vitals arrive as free-form wire values; any of them may be
/// absent, empty, or non-numeric. That is expected input, not an error:
/// the scorer downgrades unusable fields to a data-quality flag.
#[derive(Debug, Clone, PartialEq)]
pub struct PatientRecord {
    pub patient_id: String,
    /// Blood pressure reading formatted "<systolic>/<diastolic>"
    pub blood_pressure: Option<String>,
    /// Body temperature as a decimal string
    pub temperature: Option<String>,
    /// Age as an integer string
    pub age: Option<String>,
}

impl PatientRecord {
    /// Parse one element of the `patients` array. Records without a string
    /// `patient_id` cannot be categorized and are dropped here.
    fn from_value(value: &Value) -> Option<Self> {
        let patient_id = match value.get("patient_id").and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => {
                debug!("dropping record without a patient_id: {}", value);
                return None;
            }
        };

        Some(Self {
            patient_id,
            blood_pressure: field_as_text(value.get("blood_pressure")),
            temperature: field_as_text(value.get("temperature")),
            age: field_as_text(value.get("age")),
        })
    }
}

/// Normalize a wire value to the string form the scorer consumes. Strings
/// pass through, numbers are rendered to decimal text, anything else
/// (null, arrays, objects, absent) becomes None.
fn field_as_text(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// Advisory pagination metadata reported alongside each page
#[derive(Debug, Clone, PartialEq)]
pub struct Pagination {
    pub total: Option<u64>,
    /// Absent or non-boolean on the wire parses to false: pagination stops
    /// unless the service explicitly says to continue.
    pub has_next: bool,
}

/// One page of the remote collection, already validated into typed form
#[derive(Debug, Clone, PartialEq)]
pub struct PageResponse {
    pub patients: Vec<PatientRecord>,
    pub pagination: Option<Pagination>,
}

impl PageResponse {
    /// The degraded result used for failed or exhausted fetches
    pub fn empty() -> Self {
        Self {
            patients: Vec::new(),
            pagination: None,
        }
    }

    /// Parse a raw page body, applying the documented defaults: a missing
    /// or malformed `patients` field yields an empty sequence, a missing
    /// `pagination` object yields none.
    pub fn from_value(body: &Value) -> Self {
        let patients = body
            .get("patients")
            .and_then(Value::as_array)
            .map(|records| records.iter().filter_map(PatientRecord::from_value).collect())
            .unwrap_or_default();

        let pagination = body.get("pagination").and_then(Value::as_object).map(|p| Pagination {
            total: p.get("total").and_then(Value::as_u64),
            has_next: p.get("hasNext").and_then(Value::as_bool).unwrap_or(false),
        });

        Self { patients, pagination }
    }
}

/// Derived risk classification for a single record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreResult {
    /// Sum of the three sub-scores, 0..=7
    pub score: u8,
    pub is_fever: bool,
    pub has_data_quality_issue: bool,
}

/// The three category sets accumulated over a run.
///
/// Membership is checked on insert, so an id appearing on two pages (for
/// example via a retried overlap) lands in each set at most once, and
/// insertion order stays deterministic for tests.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RiskCategories {
    #[serde(rename = "high_risk_patients")]
    pub high_risk: Vec<String>,
    #[serde(rename = "fever_patients")]
    pub fever: Vec<String>,
    #[serde(rename = "data_quality_issues")]
    pub data_quality: Vec<String>,
}

impl RiskCategories {
    /// Route one scored record into the category sets
    pub fn record(&mut self, patient_id: &str, result: &ScoreResult) {
        if result.score >= HIGH_RISK_THRESHOLD {
            push_unique(&mut self.high_risk, patient_id);
        }
        if result.is_fever {
            push_unique(&mut self.fever, patient_id);
        }
        if result.has_data_quality_issue {
            push_unique(&mut self.data_quality, patient_id);
        }
    }
}

fn push_unique(set: &mut Vec<String>, id: &str) {
    if !set.iter().any(|existing| existing == id) {
        set.push(id.to_string());
    }
}

/// Failure classification for one HTTP attempt against the remote service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiFailure {
    /// Rate limit exceeded (429)
    RateLimited,
    /// Server-side failure (5xx)
    ServerError(u16),
    /// Authentication failed (401/403)
    AuthenticationFailed,
    /// Body could not be parsed as JSON
    InvalidResponse(String),
    /// Network/connection error
    NetworkError(String),
    /// Any other non-success status
    HttpStatus(u16),
}

impl ApiFailure {
    /// Transient failures are expected to resolve shortly and are worth
    /// retrying with backoff; everything else is terminal.
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiFailure::RateLimited | ApiFailure::ServerError(_))
    }
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiFailure::RateLimited => write!(f, "rate limit exceeded"),
            ApiFailure::ServerError(code) => write!(f, "server error (status {})", code),
            ApiFailure::AuthenticationFailed => write!(f, "authentication failed"),
            ApiFailure::InvalidResponse(reason) => write!(f, "invalid response body: {}", reason),
            ApiFailure::NetworkError(reason) => write!(f, "network error: {}", reason),
            ApiFailure::HttpStatus(code) => write!(f, "unexpected status {}", code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_parse_happy_path() {
        let body = json!({
            "patients": [
                {"patient_id": "p1", "blood_pressure": "120/80", "temperature": "98.6", "age": "45"}
            ],
            "pagination": {"total": 20, "hasNext": true}
        });

        let page = PageResponse::from_value(&body);
        assert_eq!(page.patients.len(), 1);
        assert_eq!(page.patients[0].patient_id, "p1");
        assert_eq!(page.patients[0].age.as_deref(), Some("45"));

        let pagination = page.pagination.expect("pagination should parse");
        assert_eq!(pagination.total, Some(20));
        assert!(pagination.has_next);
    }

    #[test]
    fn test_page_parse_missing_patients_is_empty() {
        let page = PageResponse::from_value(&json!({"pagination": {"hasNext": true}}));
        assert!(page.patients.is_empty());
        assert!(page.pagination.unwrap().has_next);
    }

    #[test]
    fn test_page_parse_missing_pagination_is_none() {
        let page = PageResponse::from_value(&json!({"patients": []}));
        assert!(page.pagination.is_none());
    }

    #[test]
    fn test_has_next_absent_or_non_boolean_means_done() {
        let absent = PageResponse::from_value(&json!({"patients": [], "pagination": {"total": 5}}));
        assert!(!absent.pagination.unwrap().has_next);

        let non_boolean =
            PageResponse::from_value(&json!({"patients": [], "pagination": {"hasNext": "yes"}}));
        assert!(!non_boolean.pagination.unwrap().has_next);
    }

    #[test]
    fn test_numeric_wire_values_become_text() {
        let body = json!({
            "patients": [
                {"patient_id": "p2", "temperature": 101.2, "age": 70}
            ]
        });

        let page = PageResponse::from_value(&body);
        assert_eq!(page.patients[0].temperature.as_deref(), Some("101.2"));
        assert_eq!(page.patients[0].age.as_deref(), Some("70"));
    }

    #[test]
    fn test_null_and_absent_fields_become_none() {
        let body = json!({
            "patients": [
                {"patient_id": "p3", "blood_pressure": null}
            ]
        });

        let record = &PageResponse::from_value(&body).patients[0];
        assert_eq!(record.blood_pressure, None);
        assert_eq!(record.temperature, None);
        assert_eq!(record.age, None);
    }

    #[test]
    fn test_records_without_id_are_dropped() {
        let body = json!({
            "patients": [
                {"blood_pressure": "150/95"},
                {"patient_id": "p4"}
            ]
        });

        let page = PageResponse::from_value(&body);
        assert_eq!(page.patients.len(), 1);
        assert_eq!(page.patients[0].patient_id, "p4");
    }

    #[test]
    fn test_categories_deduplicate_on_insert() {
        let mut categories = RiskCategories::default();
        let result = ScoreResult {
            score: 7,
            is_fever: true,
            has_data_quality_issue: false,
        };

        categories.record("p1", &result);
        categories.record("p1", &result);
        categories.record("p2", &result);

        assert_eq!(categories.high_risk, vec!["p1", "p2"]);
        assert_eq!(categories.fever, vec!["p1", "p2"]);
        assert!(categories.data_quality.is_empty());
    }

    #[test]
    fn test_categories_serialize_under_fixed_keys() {
        let categories = RiskCategories {
            high_risk: vec!["a".to_string()],
            fever: vec![],
            data_quality: vec!["b".to_string()],
        };

        let body = serde_json::to_value(&categories).unwrap();
        assert_eq!(body["high_risk_patients"], json!(["a"]));
        assert_eq!(body["fever_patients"], json!([]));
        assert_eq!(body["data_quality_issues"], json!(["b"]));
    }

    #[test]
    fn test_transient_classification() {
        assert!(ApiFailure::RateLimited.is_transient());
        assert!(ApiFailure::ServerError(503).is_transient());
        assert!(!ApiFailure::AuthenticationFailed.is_transient());
        assert!(!ApiFailure::HttpStatus(404).is_transient());
        assert!(!ApiFailure::NetworkError("connection refused".to_string()).is_transient());
    }
}
