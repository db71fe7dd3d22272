//! Social-support eligibility assessment.
//!
//! A [`ValidatedRecord`] passes the readiness gate, becomes a [`FeatureVector`], is scored
//! by a monotone gradient-boosted model and mapped onto a decision. Enablement
//! recommendations and a narrated explanation are layered on top by the service.

pub mod batch;
pub mod decision;
pub mod domain;
pub mod enablement;
pub mod engine;
pub mod explanation;
pub mod features;
pub mod intake;
pub mod readiness;
pub mod router;
pub mod scorer;
pub mod service;

#[cfg(test)]
mod tests;

pub use batch::{ApplicantBatchImporter, BatchApplicant, BatchImportError};
pub use decision::{
    DecisionPolicy, DecisionThresholds, InvalidThresholds, RuleFlag, SignalSet, SIGNALS_BASIS,
};
pub use domain::{
    EducationLevel, EligibilityDecision, EligibilityOutcome, EmploymentStatus, ValidatedRecord,
};
pub use enablement::{EnablementPolicy, EnablementRecommendation};
pub use engine::{EligibilityEngine, EligibilityEvaluation};
pub use explanation::{
    decision_summary, missing_information_prompt, ExplanationContext, ExplanationNarrator,
    NarrationError, TemplateNarrator,
};
pub use features::{FeatureBuilder, FeatureKind, FeatureVector, MonotoneConstraint, FEATURE_ORDER};
pub use intake::{
    merge_extractions, AnomalyKind, ExtractionResult, FieldAnomaly, RecordValidator,
    ValidationReport,
};
pub use readiness::{MandatoryField, ReadinessGate, ReadinessResult, ReadinessStatus};
pub use router::assessment_router;
pub use scorer::{EligibilityModel, EligibilityScorer, ScorerError};
pub use service::{
    AssessmentError, AssessmentReport, EligibilityAssessmentService, IntakeAssessment,
};
