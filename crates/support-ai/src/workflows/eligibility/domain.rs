use serde::{Deserialize, Serialize};

/// Employment situation reported by the applicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentStatus {
    Employed,
    Unemployed,
    #[serde(rename = "self-employed", alias = "self_employed")]
    SelfEmployed,
    Student,
    Retired,
    Unknown,
}

impl EmploymentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Employed => "employed",
            Self::Unemployed => "unemployed",
            Self::SelfEmployed => "self-employed",
            Self::Student => "student",
            Self::Retired => "retired",
            Self::Unknown => "unknown",
        }
    }

    /// Case- and separator-insensitive parse used when normalising extracted text.
    pub fn parse_loose(raw: &str) -> Option<Self> {
        match normalize_token(raw).as_str() {
            "employed" | "fulltime" | "parttime" => Some(Self::Employed),
            "unemployed" | "jobless" => Some(Self::Unemployed),
            "selfemployed" | "freelance" | "freelancer" => Some(Self::SelfEmployed),
            "student" => Some(Self::Student),
            "retired" | "pensioner" => Some(Self::Retired),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }
}

/// Highest completed education level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EducationLevel {
    HighSchool,
    Bachelor,
    Masters,
    Phd,
    Unknown,
}

impl EducationLevel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::HighSchool => "high_school",
            Self::Bachelor => "bachelor",
            Self::Masters => "masters",
            Self::Phd => "phd",
            Self::Unknown => "unknown",
        }
    }

    pub fn parse_loose(raw: &str) -> Option<Self> {
        match normalize_token(raw).as_str() {
            "highschool" | "secondary" => Some(Self::HighSchool),
            "bachelor" | "bachelors" | "undergraduate" => Some(Self::Bachelor),
            "master" | "masters" => Some(Self::Masters),
            "phd" | "doctorate" => Some(Self::Phd),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }
}

fn normalize_token(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric())
        .map(|ch| ch.to_ascii_lowercase())
        .collect()
}

/// Canonical applicant snapshot after extraction and validation.
///
/// Every field is nullable. A field the source never stated stays `None` here; only the
/// feature builder substitutes defaults, so "missing" and "stated as zero" never collapse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidatedRecord {
    /// Monthly income.
    #[serde(default)]
    pub income: Option<f64>,
    #[serde(default)]
    pub family_size: Option<i32>,
    #[serde(default)]
    pub employment_years: Option<i32>,
    #[serde(default)]
    pub employment_status: Option<EmploymentStatus>,
    #[serde(default)]
    pub education_level: Option<EducationLevel>,
    #[serde(default)]
    pub assets: Option<f64>,
    #[serde(default)]
    pub liabilities: Option<f64>,
    #[serde(default)]
    pub credit_score: Option<f64>,
}

impl ValidatedRecord {
    pub fn is_employed(&self) -> bool {
        self.employment_status == Some(EmploymentStatus::Employed)
    }
}

/// Decision label attached to every assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EligibilityDecision {
    Approve,
    SoftDecline,
    Reject,
    ManualReview,
}

impl EligibilityDecision {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Approve => "APPROVE",
            Self::SoftDecline => "SOFT_DECLINE",
            Self::Reject => "REJECT",
            Self::ManualReview => "MANUAL_REVIEW",
        }
    }

    pub const fn is_decline(self) -> bool {
        matches!(self, Self::SoftDecline | Self::Reject)
    }
}

impl std::fmt::Display for EligibilityDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

pub(crate) const SCORED_REASON: &str = "ML-based eligibility assessment";
pub(crate) const MANUAL_REVIEW_REASON: &str = "Missing critical information";

/// Immutable result of a single assessment. Downstream stages read it, never revise it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityOutcome {
    pub decision: EligibilityDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
    pub reason: String,
}

impl EligibilityOutcome {
    pub(crate) fn scored(decision: EligibilityDecision, probability: f64) -> Self {
        Self {
            decision,
            probability: Some(probability),
            reason: SCORED_REASON.to_string(),
        }
    }

    pub(crate) fn manual_review() -> Self {
        Self {
            decision: EligibilityDecision::ManualReview,
            probability: None,
            reason: MANUAL_REVIEW_REASON.to_string(),
        }
    }

    pub fn summary(&self) -> String {
        match self.probability {
            Some(probability) => format!(
                "{} (probability {:.3}): {}",
                self.decision, probability, self.reason
            ),
            None => format!("{}: {}", self.decision, self.reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn employment_status_parses_loose_spellings() {
        assert_eq!(
            EmploymentStatus::parse_loose("Self Employed"),
            Some(EmploymentStatus::SelfEmployed)
        );
        assert_eq!(
            EmploymentStatus::parse_loose(" UNEMPLOYED "),
            Some(EmploymentStatus::Unemployed)
        );
        assert_eq!(EmploymentStatus::parse_loose("astronaut"), None);
    }

    #[test]
    fn education_level_parses_loose_spellings() {
        assert_eq!(
            EducationLevel::parse_loose("High School"),
            Some(EducationLevel::HighSchool)
        );
        assert_eq!(EducationLevel::parse_loose("PhD"), Some(EducationLevel::Phd));
    }

    #[test]
    fn record_deserializes_missing_fields_as_null() {
        let record: ValidatedRecord = serde_json::from_str(
            r#"{"income": 0, "employment_status": "self-employed", "family_size": null}"#,
        )
        .expect("record parses");

        assert_eq!(record.income, Some(0.0));
        assert_eq!(record.family_size, None);
        assert_eq!(record.assets, None);
        assert_eq!(
            record.employment_status,
            Some(EmploymentStatus::SelfEmployed)
        );
    }

    #[test]
    fn decision_serializes_as_policy_label() {
        let encoded = serde_json::to_string(&EligibilityDecision::SoftDecline).expect("encode");
        assert_eq!(encoded, "\"SOFT_DECLINE\"");
    }
}
