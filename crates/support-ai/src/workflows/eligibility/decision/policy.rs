use super::config::DecisionThresholds;
use crate::workflows::eligibility::domain::EligibilityDecision;

/// Maps a scorer probability onto the three scored decisions.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DecisionPolicy {
    thresholds: DecisionThresholds,
}

impl DecisionPolicy {
    pub fn new(thresholds: DecisionThresholds) -> Self {
        Self { thresholds }
    }

    /// Boundary values belong to the upper bucket. Never yields `ManualReview`; that label
    /// is reserved for records the readiness gate turned away.
    pub fn decide(&self, probability: f64) -> EligibilityDecision {
        if probability >= self.thresholds.approve() {
            EligibilityDecision::Approve
        } else if probability >= self.thresholds.soft_decline() {
            EligibilityDecision::SoftDecline
        } else {
            EligibilityDecision::Reject
        }
    }
}
