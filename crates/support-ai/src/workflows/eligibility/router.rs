use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::ValidatedRecord;
use super::explanation::ExplanationNarrator;
use super::intake::ExtractionResult;
use super::readiness::ReadinessGate;
use super::service::{AssessmentError, EligibilityAssessmentService};

#[derive(Debug, Deserialize)]
pub struct IntakeRequest {
    pub extractions: Vec<ExtractionResult>,
}

/// Router builder exposing the assessment endpoints.
pub fn assessment_router<N>(service: Arc<EligibilityAssessmentService<N>>) -> Router
where
    N: ExplanationNarrator + 'static,
{
    Router::new()
        .route(
            "/api/v1/eligibility/assessments",
            post(assess_handler::<N>),
        )
        .route("/api/v1/eligibility/readiness", post(readiness_handler))
        .route("/api/v1/eligibility/intake", post(intake_handler::<N>))
        .with_state(service)
}

pub(crate) async fn assess_handler<N>(
    State(service): State<Arc<EligibilityAssessmentService<N>>>,
    Json(record): Json<ValidatedRecord>,
) -> Response
where
    N: ExplanationNarrator + 'static,
{
    match service.assess(&record) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(error) => failure(error),
    }
}

pub(crate) async fn readiness_handler(Json(record): Json<ValidatedRecord>) -> Response {
    (StatusCode::OK, Json(ReadinessGate::check(&record))).into_response()
}

pub(crate) async fn intake_handler<N>(
    State(service): State<Arc<EligibilityAssessmentService<N>>>,
    Json(request): Json<IntakeRequest>,
) -> Response
where
    N: ExplanationNarrator + 'static,
{
    match service.assess_extractions(&request.extractions) {
        Ok(assessment) => (StatusCode::OK, Json(assessment)).into_response(),
        Err(error) => failure(error),
    }
}

fn failure(error: AssessmentError) -> Response {
    tracing::error!(%error, "assessment failed");
    let payload = json!({
        "error": error.to_string(),
    });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
}
