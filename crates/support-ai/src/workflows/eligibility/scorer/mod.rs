mod binning;
pub mod boosting;
pub mod synthetic;
mod tree;

pub use boosting::BoostingParams;
pub use synthetic::{policy_label, TrainingSet, SYNTHETIC_SAMPLE_COUNT, TRAINING_SEED};
pub use tree::RegressionTree;

use std::sync::Arc;

use super::features::{monotone_constraints, FeatureKind, FeatureVector};

/// Errors raised while training or querying the eligibility scorer.
#[derive(Debug, thiserror::Error)]
pub enum ScorerError {
    #[error("training set is empty")]
    EmptyTrainingSet,
    #[error("training set has {rows} rows but {labels} labels")]
    LabelMismatch { rows: usize, labels: usize },
    #[error("training labels are degenerate ({positives} positives out of {rows} rows)")]
    DegenerateLabels { positives: usize, rows: usize },
    #[error("training row {row} has a non-finite {feature} value")]
    NonFiniteTrainingValue { row: usize, feature: FeatureKind },
    #[error("invalid boosting parameter: {0}")]
    InvalidParameter(&'static str),
    #[error("synthetic distribution rejected its parameters: {0}")]
    Distribution(String),
    #[error("feature {feature} is not finite ({value})")]
    NonFiniteFeature { feature: FeatureKind, value: f64 },
    #[error("scorer produced an invalid probability {probability} from raw score {raw}")]
    InvalidProbability { raw: f64, probability: f64 },
}

/// Trained ensemble. Immutable once built; inference has no side effects.
#[derive(Debug, Clone)]
pub struct EligibilityModel {
    base_score: f64,
    trees: Vec<RegressionTree>,
}

impl EligibilityModel {
    pub(crate) fn new(base_score: f64, trees: Vec<RegressionTree>) -> Self {
        Self { base_score, trees }
    }

    /// Train on the fixed synthetic policy data set.
    pub fn train_default() -> Result<Self, ScorerError> {
        let set = synthetic::generate(SYNTHETIC_SAMPLE_COUNT, TRAINING_SEED)?;
        boosting::train(&set, &monotone_constraints(), &BoostingParams::default())
    }

    pub fn raw_score(&self, features: &FeatureVector) -> f64 {
        let values = features.values();
        self.trees
            .iter()
            .fold(self.base_score, |score, tree| score + tree.predict(values))
    }

    pub fn probability(&self, features: &FeatureVector) -> f64 {
        sigmoid(self.raw_score(features))
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

/// Shared, read-only scoring handle.
#[derive(Debug, Clone)]
pub struct EligibilityScorer {
    model: Arc<EligibilityModel>,
}

impl EligibilityScorer {
    pub fn new(model: Arc<EligibilityModel>) -> Self {
        Self { model }
    }

    /// Train the production model. Failure here means the service must not start.
    pub fn train_default() -> Result<Self, ScorerError> {
        EligibilityModel::train_default().map(|model| Self::new(Arc::new(model)))
    }

    pub fn model(&self) -> &EligibilityModel {
        &self.model
    }

    /// Probability that the profile matches the support-need pattern.
    pub fn predict(&self, features: &FeatureVector) -> Result<f64, ScorerError> {
        if let Some((feature, value)) = features.first_non_finite() {
            return Err(ScorerError::NonFiniteFeature { feature, value });
        }

        let raw = self.model.raw_score(features);
        let probability = sigmoid(raw);
        if !(0.0..=1.0).contains(&probability) {
            return Err(ScorerError::InvalidProbability { raw, probability });
        }

        Ok(probability)
    }
}

pub(crate) fn sigmoid(raw: f64) -> f64 {
    if raw >= 0.0 {
        1.0 / (1.0 + (-raw).exp())
    } else {
        let exp = raw.exp();
        exp / (1.0 + exp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigmoid_is_bounded_and_centred() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(800.0) <= 1.0);
        assert!(sigmoid(-800.0) >= 0.0);
        assert!(sigmoid(2.0) > sigmoid(1.0));
    }

    #[test]
    fn predict_rejects_non_finite_features() {
        let model = EligibilityModel::new(0.0, Vec::new());
        let scorer = EligibilityScorer::new(Arc::new(model));
        let vector = FeatureVector::from_values([f64::NAN, 1.0, 1.0, 0.0, 650.0, 0.0]);

        let err = scorer.predict(&vector).expect_err("NaN must be rejected");
        assert!(matches!(
            err,
            ScorerError::NonFiniteFeature {
                feature: FeatureKind::LogIncome,
                ..
            }
        ));
    }

    #[test]
    fn empty_ensemble_returns_base_probability() {
        let model = EligibilityModel::new(0.0, Vec::new());
        let scorer = EligibilityScorer::new(Arc::new(model));
        let vector = FeatureVector::from_values([8.0, 1_000.0, 2.0, 3.0, 650.0, 0.0]);

        assert_eq!(scorer.predict(&vector).expect("finite"), 0.5);
    }
}
