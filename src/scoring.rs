//! Pure risk scoring over one patient record
//!
//! The scorer is total: malformed or missing vitals never fail, they set
//! the data-quality flag and contribute a zero sub-score.

use crate::types::{PatientRecord, ScoreResult};

/// Score one record. The total is the sum of the blood pressure (0..=3),
/// temperature (0..=2) and age (0..=2) sub-scores; the quality flag is the
/// OR of the three field-level flags.
pub fn score(record: &PatientRecord) -> ScoreResult {
    let (bp_score, bp_issue) = blood_pressure_subscore(record.blood_pressure.as_deref());
    let (temp_score, is_fever, temp_issue) = temperature_subscore(record.temperature.as_deref());
    let (age_score, age_issue) = age_subscore(record.age.as_deref());

    ScoreResult {
        score: bp_score + temp_score + age_score,
        is_fever,
        has_data_quality_issue: bp_issue || temp_issue || age_issue,
    }
}

/// Blood pressure thresholds, severe rule first. A reading that satisfies
/// rule 1 on one side never falls through to rule 2 on the other.
fn blood_pressure_subscore(reading: Option<&str>) -> (u8, bool) {
    let reading = match reading {
        Some(r) => r,
        None => return (0, true),
    };

    if reading.matches('/').count() != 1 {
        return (0, true);
    }

    let (systolic_text, diastolic_text) = match reading.split_once('/') {
        Some(parts) => parts,
        None => return (0, true),
    };

    let (systolic, diastolic) = match (
        systolic_text.trim().parse::<i64>(),
        diastolic_text.trim().parse::<i64>(),
    ) {
        (Ok(s), Ok(d)) => (s, d),
        _ => return (0, true),
    };

    let sub_score = if systolic >= 140 || diastolic >= 90 {
        3
    } else if (130..=139).contains(&systolic) || (80..=89).contains(&diastolic) {
        2
    } else if (120..=129).contains(&systolic) && diastolic < 80 {
        1
    } else {
        0
    };

    (sub_score, false)
}

/// Returns (sub-score, fever, quality issue)
fn temperature_subscore(reading: Option<&str>) -> (u8, bool, bool) {
    let temperature = match reading.map(|r| r.trim().parse::<f64>()) {
        Some(Ok(t)) if t.is_finite() => t,
        _ => return (0, false, true),
    };

    if temperature >= 101.0 {
        (2, true, false)
    } else if temperature > 99.5 {
        (1, true, false)
    } else {
        (0, false, false)
    }
}

fn age_subscore(reading: Option<&str>) -> (u8, bool) {
    let age = match reading.map(|r| r.trim().parse::<i64>()) {
        Some(Ok(a)) => a,
        _ => return (0, true),
    };

    let sub_score = if age > 65 {
        2
    } else if age >= 40 {
        1
    } else {
        0
    };

    (sub_score, false)
}
