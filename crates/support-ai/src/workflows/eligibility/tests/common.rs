use std::sync::{Arc, OnceLock};

use axum::response::Response;
use serde_json::Value;

use crate::workflows::eligibility::decision::DecisionPolicy;
use crate::workflows::eligibility::domain::{EducationLevel, EmploymentStatus, ValidatedRecord};
use crate::workflows::eligibility::explanation::{
    ExplanationContext, ExplanationNarrator, NarrationError, TemplateNarrator,
};
use crate::workflows::eligibility::scorer::{EligibilityModel, EligibilityScorer};
use crate::workflows::eligibility::service::EligibilityAssessmentService;
use crate::workflows::eligibility::{assessment_router, EligibilityEngine};

/// Production model, trained once per test binary.
pub(super) fn trained_scorer() -> EligibilityScorer {
    static SCORER: OnceLock<EligibilityScorer> = OnceLock::new();
    SCORER
        .get_or_init(|| EligibilityScorer::train_default().expect("default scorer trains"))
        .clone()
}

/// Scorer with no trees whose every prediction equals `probability`.
pub(super) fn fixed_scorer(probability: f64) -> EligibilityScorer {
    let base_score = (probability / (1.0 - probability)).ln();
    let model = EligibilityModel::new(base_score, Vec::new());
    EligibilityScorer::new(Arc::new(model))
}

pub(super) fn complete_record() -> ValidatedRecord {
    ValidatedRecord {
        income: Some(3_000.0),
        family_size: Some(4),
        employment_years: Some(1),
        employment_status: Some(EmploymentStatus::Unemployed),
        education_level: Some(EducationLevel::HighSchool),
        assets: Some(0.0),
        liabilities: Some(5_000.0),
        credit_score: None,
    }
}

pub(super) fn affluent_record() -> ValidatedRecord {
    ValidatedRecord {
        income: Some(250_000.0),
        family_size: Some(1),
        employment_years: Some(15),
        employment_status: Some(EmploymentStatus::Employed),
        education_level: Some(EducationLevel::Masters),
        assets: Some(900_000.0),
        liabilities: Some(10_000.0),
        credit_score: Some(780.0),
    }
}

pub(super) fn build_service<N>(
    scorer: EligibilityScorer,
    narrator: N,
) -> EligibilityAssessmentService<N>
where
    N: ExplanationNarrator + 'static,
{
    EligibilityAssessmentService::new(scorer, DecisionPolicy::default(), Arc::new(narrator))
}

pub(super) fn template_service(
    scorer: EligibilityScorer,
) -> EligibilityAssessmentService<TemplateNarrator> {
    build_service(scorer, TemplateNarrator)
}

pub(super) fn engine(scorer: EligibilityScorer) -> EligibilityEngine {
    EligibilityEngine::new(scorer, DecisionPolicy::default())
}

pub(super) fn router_with_service(
    service: EligibilityAssessmentService<TemplateNarrator>,
) -> axum::Router {
    assessment_router(Arc::new(service))
}

pub(super) struct FailingNarrator;

impl ExplanationNarrator for FailingNarrator {
    fn narrate(&self, _context: &ExplanationContext<'_>) -> Result<String, NarrationError> {
        Err(NarrationError::Unavailable("model endpoint timed out".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
