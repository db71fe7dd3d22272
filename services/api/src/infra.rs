use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;
use support_ai::config::EligibilityConfig;
use support_ai::error::AppError;
use support_ai::workflows::eligibility::{
    DecisionPolicy, EligibilityAssessmentService, EligibilityScorer, TemplateNarrator,
};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type AssessmentService = EligibilityAssessmentService<TemplateNarrator>;

/// Train the scorer and wire the assessment service. A training failure is fatal.
pub(crate) fn build_assessment_service(
    config: &EligibilityConfig,
) -> Result<AssessmentService, AppError> {
    let started = Instant::now();
    let scorer = EligibilityScorer::train_default()?;
    info!(
        trees = scorer.model().tree_count(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "eligibility scorer ready"
    );

    Ok(EligibilityAssessmentService::new(
        scorer,
        DecisionPolicy::new(config.thresholds),
        Arc::new(TemplateNarrator),
    ))
}
