use std::fmt;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::intake::{ExtractionResult, RecordValidator, ValidationReport};

#[derive(Debug)]
pub enum BatchImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl fmt::Display for BatchImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchImportError::Io(err) => write!(f, "failed to read applicant batch: {}", err),
            BatchImportError::Csv(err) => write!(f, "invalid applicant CSV data: {}", err),
        }
    }
}

impl std::error::Error for BatchImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BatchImportError::Io(err) => Some(err),
            BatchImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for BatchImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for BatchImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// One CSV row after intake validation.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchApplicant {
    pub applicant_id: String,
    pub validation: ValidationReport,
}

/// Reads applicant rows from CSV. Blank cells are treated as unstated fields.
pub struct ApplicantBatchImporter;

impl ApplicantBatchImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<BatchApplicant>, BatchImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<BatchApplicant>, BatchImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut applicants = Vec::new();

        for (index, row) in csv_reader.deserialize::<ApplicantRow>().enumerate() {
            let row = row?;
            let applicant_id = row
                .applicant_id
                .clone()
                .unwrap_or_else(|| format!("row-{}", index + 1));
            let validation = RecordValidator::validate(&row.into_extraction());

            applicants.push(BatchApplicant {
                applicant_id,
                validation,
            });
        }

        Ok(applicants)
    }
}

#[derive(Debug, Deserialize)]
struct ApplicantRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    applicant_id: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    income: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    family_size: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    employment_years: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    employment_status: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    education_level: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    assets: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    liabilities: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    credit_score: Option<String>,
}

impl ApplicantRow {
    fn into_extraction(self) -> ExtractionResult {
        let cells = [
            ("income", self.income),
            ("family_size", self.family_size),
            ("employment_years", self.employment_years),
            ("employment_status", self.employment_status),
            ("education_level", self.education_level),
            ("assets", self.assets),
            ("liabilities", self.liabilities),
            ("credit_score", self.credit_score),
        ];

        let mut extraction = ExtractionResult::new();
        for (field, cell) in cells {
            if let Some(text) = cell {
                extraction.insert(field, Value::String(text));
            }
        }
        extraction
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
