//! Normalisation of loosely-typed extraction output into a [`ValidatedRecord`].
//!
//! Extraction collaborators (OCR, language models, chunked document readers) hand back JSON
//! objects whose values may be numbers, numeric strings, free-text enumerations or `null`.
//! Nothing here ever turns an unreadable value into zero: it becomes `null` and is reported
//! as a [`FieldAnomaly`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::domain::{EducationLevel, EmploymentStatus, ValidatedRecord};

/// Field names a [`ValidatedRecord`] is assembled from.
pub const RECORD_FIELDS: [&str; 8] = [
    "income",
    "family_size",
    "employment_years",
    "employment_status",
    "education_level",
    "assets",
    "liabilities",
    "credit_score",
];

/// Raw per-field values from one extraction pass.
///
/// Values may be given bare (`{"income": 3000}`) or wrapped (`{"income": {"value": 3000}}`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractionResult(BTreeMap<String, Value>);

impl ExtractionResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        self.0.insert(field.into(), value);
    }

    pub fn with(mut self, field: impl Into<String>, value: Value) -> Self {
        self.insert(field, value);
        self
    }

    /// Unwrapped value for `field`; `None` when absent or null.
    pub fn field(&self, field: &str) -> Option<&Value> {
        let value = match self.0.get(field)? {
            Value::Object(wrapper) if wrapper.contains_key("value") => wrapper.get("value")?,
            other => other,
        };
        (!value.is_null()).then_some(value)
    }
}

impl From<BTreeMap<String, Value>> for ExtractionResult {
    fn from(values: BTreeMap<String, Value>) -> Self {
        Self(values)
    }
}

/// Combine chunked extraction passes; for every known field the first non-null value wins.
pub fn merge_extractions<'a, I>(partials: I) -> ExtractionResult
where
    I: IntoIterator<Item = &'a ExtractionResult>,
{
    let mut merged = ExtractionResult::new();
    for partial in partials {
        for field in RECORD_FIELDS {
            if merged.field(field).is_some() {
                continue;
            }
            if let Some(value) = partial.field(field) {
                merged.insert(field, value.clone());
            }
        }
    }
    merged
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// Value could not be read as the expected type and was dropped to null.
    Unparseable,
    /// Negative amount kept as stated; scoring clamps it.
    Negative,
    /// Fractional count rounded to the nearest integer.
    NonInteger,
    /// Count too large to represent; dropped to null.
    OutOfRange,
    /// Free text that matched no known category; recorded as `unknown`.
    Unrecognised,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldAnomaly {
    pub field: &'static str,
    pub kind: AnomalyKind,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub record: ValidatedRecord,
    pub anomalies: Vec<FieldAnomaly>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.anomalies.is_empty()
    }
}

pub struct RecordValidator;

impl RecordValidator {
    pub fn validate(extraction: &ExtractionResult) -> ValidationReport {
        let mut anomalies = Vec::new();

        let record = ValidatedRecord {
            income: amount("income", extraction, &mut anomalies),
            family_size: count("family_size", extraction, &mut anomalies),
            employment_years: count("employment_years", extraction, &mut anomalies),
            employment_status: category(
                "employment_status",
                extraction,
                &mut anomalies,
                EmploymentStatus::parse_loose,
                EmploymentStatus::Unknown,
            ),
            education_level: category(
                "education_level",
                extraction,
                &mut anomalies,
                EducationLevel::parse_loose,
                EducationLevel::Unknown,
            ),
            assets: amount("assets", extraction, &mut anomalies),
            liabilities: amount("liabilities", extraction, &mut anomalies),
            credit_score: amount("credit_score", extraction, &mut anomalies),
        };

        ValidationReport { record, anomalies }
    }
}

fn flag(
    anomalies: &mut Vec<FieldAnomaly>,
    field: &'static str,
    kind: AnomalyKind,
    detail: String,
) {
    anomalies.push(FieldAnomaly {
        field,
        kind,
        detail,
    });
}

fn number(field: &'static str, value: &Value, anomalies: &mut Vec<FieldAnomaly>) -> Option<f64> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => {
            let cleaned: String = text
                .trim()
                .chars()
                .filter(|ch| !matches!(ch, ',' | '_' | ' '))
                .collect();
            if cleaned.is_empty() {
                return None;
            }
            cleaned.parse::<f64>().ok()
        }
        _ => None,
    };

    match parsed {
        Some(number) if number.is_finite() => Some(number),
        _ => {
            flag(
                anomalies,
                field,
                AnomalyKind::Unparseable,
                format!("expected a number, found {value}"),
            );
            None
        }
    }
}

fn amount(
    field: &'static str,
    extraction: &ExtractionResult,
    anomalies: &mut Vec<FieldAnomaly>,
) -> Option<f64> {
    let value = number(field, extraction.field(field)?, anomalies)?;
    if value < 0.0 {
        flag(
            anomalies,
            field,
            AnomalyKind::Negative,
            format!("negative amount {value}"),
        );
    }
    Some(value)
}

fn count(
    field: &'static str,
    extraction: &ExtractionResult,
    anomalies: &mut Vec<FieldAnomaly>,
) -> Option<i32> {
    let value = number(field, extraction.field(field)?, anomalies)?;
    let rounded = value.round();
    if rounded < f64::from(i32::MIN) || rounded > f64::from(i32::MAX) {
        flag(
            anomalies,
            field,
            AnomalyKind::OutOfRange,
            format!("count {value} is out of range"),
        );
        return None;
    }
    if rounded != value {
        flag(
            anomalies,
            field,
            AnomalyKind::NonInteger,
            format!("rounded {value} to {rounded}"),
        );
    }
    if rounded < 0.0 {
        flag(
            anomalies,
            field,
            AnomalyKind::Negative,
            format!("negative count {rounded}"),
        );
    }
    Some(rounded as i32)
}

fn category<T>(
    field: &'static str,
    extraction: &ExtractionResult,
    anomalies: &mut Vec<FieldAnomaly>,
    parse: fn(&str) -> Option<T>,
    unknown: T,
) -> Option<T> {
    let value = extraction.field(field)?;
    let Value::String(text) = value else {
        flag(
            anomalies,
            field,
            AnomalyKind::Unparseable,
            format!("expected text, found {value}"),
        );
        return None;
    };
    if text.trim().is_empty() {
        return None;
    }

    match parse(text) {
        Some(parsed) => Some(parsed),
        None => {
            flag(
                anomalies,
                field,
                AnomalyKind::Unrecognised,
                format!("unrecognised value {text:?}"),
            );
            Some(unknown)
        }
    }
}
