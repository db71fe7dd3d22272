use serde::{Deserialize, Serialize};

use super::domain::{EducationLevel, EligibilityDecision, ValidatedRecord};

pub const REASON_EMPLOYMENT: &str = "Unstable or no employment";
pub const REASON_EDUCATION: &str = "Low education level";
pub const REASON_LONG_TERM_SUPPORT: &str = "Needs long-term economic support";

/// Support programmes suggested alongside a declined application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnablementRecommendation {
    pub training: bool,
    pub job_matching: bool,
    pub career_counseling: bool,
    pub reasons: Vec<String>,
}

impl EnablementRecommendation {
    pub fn is_empty(&self) -> bool {
        !(self.training || self.job_matching || self.career_counseling)
    }
}

pub struct EnablementPolicy;

impl EnablementPolicy {
    /// Only soft declines and rejections receive recommendations. An unstated education
    /// level counts as unknown.
    pub fn recommend(
        decision: EligibilityDecision,
        record: &ValidatedRecord,
    ) -> EnablementRecommendation {
        let mut recommendation = EnablementRecommendation::default();
        if !decision.is_decline() {
            return recommendation;
        }

        if !record.is_employed() {
            recommendation.job_matching = true;
            recommendation.reasons.push(REASON_EMPLOYMENT.to_string());
        }

        let education = record.education_level.unwrap_or(EducationLevel::Unknown);
        if matches!(education, EducationLevel::Unknown | EducationLevel::HighSchool) {
            recommendation.training = true;
            recommendation.reasons.push(REASON_EDUCATION.to_string());
        }

        recommendation.career_counseling = true;
        recommendation
            .reasons
            .push(REASON_LONG_TERM_SUPPORT.to_string());

        recommendation
    }
}
