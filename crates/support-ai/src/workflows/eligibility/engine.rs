use serde::Serialize;

use super::decision::{DecisionPolicy, SignalSet};
use super::domain::{EligibilityOutcome, ValidatedRecord};
use super::features::FeatureBuilder;
use super::readiness::{ReadinessGate, ReadinessResult};
use super::scorer::{EligibilityScorer, ScorerError};

/// Gate, feature builder, scorer and decision policy run as one unit.
///
/// The readiness check lives inside [`EligibilityEngine::evaluate`], so no caller can reach
/// the scorer with a record that is missing mandatory fields.
#[derive(Debug, Clone)]
pub struct EligibilityEngine {
    scorer: EligibilityScorer,
    policy: DecisionPolicy,
}

/// Output of one engine pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EligibilityEvaluation {
    pub readiness: ReadinessResult,
    pub outcome: EligibilityOutcome,
    /// Present only when the record was scored.
    pub signals: Option<SignalSet>,
}

impl EligibilityEngine {
    pub fn new(scorer: EligibilityScorer, policy: DecisionPolicy) -> Self {
        Self { scorer, policy }
    }

    pub fn evaluate(&self, record: &ValidatedRecord) -> Result<EligibilityEvaluation, ScorerError> {
        let readiness = ReadinessGate::check(record);
        if !readiness.is_ready() {
            return Ok(EligibilityEvaluation {
                readiness,
                outcome: EligibilityOutcome::manual_review(),
                signals: None,
            });
        }

        let features = FeatureBuilder::build(record);
        let probability = self.scorer.predict(&features)?;
        let decision = self.policy.decide(probability);

        Ok(EligibilityEvaluation {
            readiness,
            outcome: EligibilityOutcome::scored(decision, probability),
            signals: Some(SignalSet::from_record(record)),
        })
    }
}
