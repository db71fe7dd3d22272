use serde::{Deserialize, Serialize};

use super::domain::ValidatedRecord;

/// Fields that must be present before scoring may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MandatoryField {
    Income,
    EmploymentStatus,
    FamilySize,
}

impl MandatoryField {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::EmploymentStatus => "employment_status",
            Self::FamilySize => "family_size",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::EmploymentStatus => "Employment Status",
            Self::FamilySize => "Family Size",
        }
    }

    fn is_missing(self, record: &ValidatedRecord) -> bool {
        match self {
            Self::Income => record.income.is_none(),
            Self::EmploymentStatus => record.employment_status.is_none(),
            Self::FamilySize => record.family_size.is_none(),
        }
    }
}

/// Canonical order in which missing fields are reported.
pub const MANDATORY_FIELDS: [MandatoryField; 3] = [
    MandatoryField::Income,
    MandatoryField::EmploymentStatus,
    MandatoryField::FamilySize,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessStatus {
    Ready,
    InsufficientData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessResult {
    pub status: ReadinessStatus,
    pub missing_fields: Vec<MandatoryField>,
}

impl ReadinessResult {
    pub fn is_ready(&self) -> bool {
        self.status == ReadinessStatus::Ready
    }
}

/// Pure precondition check run before any scoring.
pub struct ReadinessGate;

impl ReadinessGate {
    pub fn check(record: &ValidatedRecord) -> ReadinessResult {
        let missing_fields: Vec<MandatoryField> = MANDATORY_FIELDS
            .into_iter()
            .filter(|field| field.is_missing(record))
            .collect();

        let status = if missing_fields.is_empty() {
            ReadinessStatus::Ready
        } else {
            ReadinessStatus::InsufficientData
        };

        ReadinessResult {
            status,
            missing_fields,
        }
    }
}
