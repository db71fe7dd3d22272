use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::decision::{DecisionPolicy, SignalSet, SIGNALS_BASIS};
use super::domain::{EligibilityOutcome, ValidatedRecord};
use super::enablement::{EnablementPolicy, EnablementRecommendation};
use super::engine::EligibilityEngine;
use super::explanation::{
    decision_summary, missing_information_prompt, ExplanationContext, ExplanationNarrator,
};
use super::intake::{merge_extractions, ExtractionResult, RecordValidator, ValidationReport};
use super::readiness::ReadinessResult;
use super::scorer::{EligibilityScorer, ScorerError};

/// Complete result of assessing one applicant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentReport {
    pub assessed_at: DateTime<Utc>,
    pub readiness: ReadinessResult,
    pub outcome: EligibilityOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signals: Option<SignalSet>,
    /// How to read `signals`; present whenever they are.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signals_basis: Option<&'static str>,
    pub enablement: EnablementRecommendation,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_up: Option<String>,
    pub explanation: Option<String>,
}

/// Assessment of raw extraction output, with the validation trail that produced the record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntakeAssessment {
    pub validation: ValidationReport,
    pub report: AssessmentReport,
}

/// Service composing the eligibility engine, enablement policy and explanation narrator.
pub struct EligibilityAssessmentService<N> {
    engine: Arc<EligibilityEngine>,
    narrator: Arc<N>,
}

impl<N> EligibilityAssessmentService<N>
where
    N: ExplanationNarrator + 'static,
{
    pub fn new(scorer: EligibilityScorer, policy: DecisionPolicy, narrator: Arc<N>) -> Self {
        Self::with_engine(Arc::new(EligibilityEngine::new(scorer, policy)), narrator)
    }

    pub fn with_engine(engine: Arc<EligibilityEngine>, narrator: Arc<N>) -> Self {
        Self { engine, narrator }
    }

    /// Assess a validated record end to end.
    pub fn assess(&self, record: &ValidatedRecord) -> Result<AssessmentReport, AssessmentError> {
        let evaluation = self.engine.evaluate(record)?;

        if evaluation.readiness.is_ready() {
            info!(
                decision = %evaluation.outcome.decision,
                probability = evaluation.outcome.probability,
                "eligibility assessed"
            );
        } else {
            let missing: Vec<&str> = evaluation
                .readiness
                .missing_fields
                .iter()
                .map(|field| field.name())
                .collect();
            info!(missing = ?missing, "application routed to manual review");
        }

        let enablement = EnablementPolicy::recommend(evaluation.outcome.decision, record);

        let context = ExplanationContext {
            record,
            readiness: &evaluation.readiness,
            outcome: &evaluation.outcome,
            signals: evaluation.signals.as_ref(),
            enablement: &enablement,
        };
        let explanation = match self.narrator.narrate(&context) {
            Ok(text) => Some(text),
            Err(error) => {
                warn!(%error, "explanation narrator failed; returning decision without narrative");
                None
            }
        };

        Ok(AssessmentReport {
            assessed_at: Utc::now(),
            summary: decision_summary(&evaluation.outcome),
            follow_up: missing_information_prompt(&evaluation.readiness),
            readiness: evaluation.readiness,
            outcome: evaluation.outcome,
            signals_basis: evaluation.signals.as_ref().map(|_| SIGNALS_BASIS),
            signals: evaluation.signals,
            enablement,
            explanation,
        })
    }

    /// Merge chunked extraction passes, validate them and assess the resulting record.
    pub fn assess_extractions(
        &self,
        partials: &[ExtractionResult],
    ) -> Result<IntakeAssessment, AssessmentError> {
        let merged = merge_extractions(partials);
        let validation = RecordValidator::validate(&merged);
        if !validation.is_clean() {
            info!(
                anomalies = validation.anomalies.len(),
                "extraction normalised with anomalies"
            );
        }

        let report = self.assess(&validation.record)?;
        Ok(IntakeAssessment { validation, report })
    }
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentError {
    #[error(transparent)]
    Scorer(#[from] ScorerError),
}
