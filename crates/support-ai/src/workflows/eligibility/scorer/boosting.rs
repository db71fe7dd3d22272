//! Gradient-boosted trees on binary log-loss with monotone constraints.
//!
//! Trees grow best-first over histogram bins. A split on a constrained feature is only
//! admitted when the child weights move in the declared direction, and the two subtrees
//! are then bounded on either side of the midpoint of those weights. Leaf weights are
//! clamped to their bounds, so every tree (and therefore the ensemble and its sigmoid)
//! is monotone in each constrained feature regardless of the training data.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;
use tracing::{debug, info};

use super::binning::BinnedMatrix;
use super::synthetic::{TrainingSet, TRAINING_SEED};
use super::tree::{RegressionTree, TreeNode};
use super::{sigmoid, EligibilityModel, ScorerError};
use crate::workflows::eligibility::features::{MonotoneConstraint, FEATURE_COUNT};

const HESSIAN_FLOOR: f64 = 1e-16;
const MIN_SPLIT_GAIN: f64 = 1e-12;
const PROBABILITY_EPSILON: f64 = 1e-15;

/// Hyper-parameters for the booster.
#[derive(Debug, Clone, PartialEq)]
pub struct BoostingParams {
    pub num_rounds: usize,
    pub learning_rate: f64,
    pub max_leaves: usize,
    pub min_data_in_leaf: usize,
    pub min_sum_hessian: f64,
    pub lambda_l2: f64,
    pub feature_fraction: f64,
    pub bagging_fraction: f64,
    pub max_bins: usize,
    pub seed: u64,
}

impl Default for BoostingParams {
    fn default() -> Self {
        Self {
            num_rounds: 300,
            learning_rate: 0.05,
            max_leaves: 31,
            min_data_in_leaf: 50,
            min_sum_hessian: 1e-3,
            lambda_l2: 0.0,
            feature_fraction: 0.9,
            bagging_fraction: 0.9,
            max_bins: 255,
            seed: TRAINING_SEED,
        }
    }
}

impl BoostingParams {
    fn validate(&self) -> Result<(), ScorerError> {
        if self.num_rounds == 0 {
            return Err(ScorerError::InvalidParameter("num_rounds must be positive"));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(ScorerError::InvalidParameter(
                "learning_rate must be a positive finite number",
            ));
        }
        if self.max_leaves < 2 {
            return Err(ScorerError::InvalidParameter("max_leaves must be at least 2"));
        }
        if self.min_data_in_leaf == 0 {
            return Err(ScorerError::InvalidParameter(
                "min_data_in_leaf must be positive",
            ));
        }
        if !(self.lambda_l2.is_finite() && self.lambda_l2 >= 0.0) {
            return Err(ScorerError::InvalidParameter(
                "lambda_l2 must be a non-negative finite number",
            ));
        }
        if !(self.min_sum_hessian.is_finite() && self.min_sum_hessian > 0.0) {
            return Err(ScorerError::InvalidParameter(
                "min_sum_hessian must be a positive finite number",
            ));
        }
        for fraction in [self.feature_fraction, self.bagging_fraction] {
            if !(fraction > 0.0 && fraction <= 1.0) {
                return Err(ScorerError::InvalidParameter(
                    "sampling fractions must lie in (0, 1]",
                ));
            }
        }
        if self.max_bins < 2 || self.max_bins > usize::from(u16::MAX) {
            return Err(ScorerError::InvalidParameter(
                "max_bins must lie in [2, 65535]",
            ));
        }
        Ok(())
    }
}

/// Fit a monotone ensemble to `set`.
pub fn train(
    set: &TrainingSet,
    constraints: &[MonotoneConstraint; FEATURE_COUNT],
    params: &BoostingParams,
) -> Result<EligibilityModel, ScorerError> {
    params.validate()?;

    let rows = set.len();
    if rows == 0 {
        return Err(ScorerError::EmptyTrainingSet);
    }
    if set.labels.len() != rows {
        return Err(ScorerError::LabelMismatch {
            rows,
            labels: set.labels.len(),
        });
    }
    if let Some((row, feature)) = set.first_non_finite() {
        return Err(ScorerError::NonFiniteTrainingValue { row, feature });
    }
    let positives = set.positives();
    if positives == 0 || positives == rows {
        return Err(ScorerError::DegenerateLabels { positives, rows });
    }

    let started = Instant::now();
    let targets: Vec<f64> = set
        .labels
        .iter()
        .map(|label| if *label { 1.0 } else { 0.0 })
        .collect();
    let prior = positives as f64 / rows as f64;
    let base_score = (prior / (1.0 - prior)).ln();

    let matrix = BinnedMatrix::build(&set.features, params.max_bins);
    let mut rng = StdRng::seed_from_u64(params.seed);
    let bag_size = ((rows as f64 * params.bagging_fraction).round() as usize).clamp(1, rows);
    let feature_budget = ((FEATURE_COUNT as f64 * params.feature_fraction).round() as usize)
        .clamp(1, FEATURE_COUNT);

    let mut raw = vec![base_score; rows];
    let mut gradients = vec![0.0; rows];
    let mut hessians = vec![0.0; rows];
    let mut trees = Vec::with_capacity(params.num_rounds);

    for round in 0..params.num_rounds {
        for (row, score) in raw.iter().enumerate() {
            let probability = sigmoid(*score);
            gradients[row] = probability - targets[row];
            hessians[row] = (probability * (1.0 - probability)).max(HESSIAN_FLOOR);
        }

        let mut bag: Vec<usize> = if bag_size == rows {
            (0..rows).collect()
        } else {
            index::sample(&mut rng, rows, bag_size).into_vec()
        };
        bag.sort_unstable();

        let mut features = index::sample(&mut rng, FEATURE_COUNT, feature_budget).into_vec();
        features.sort_unstable();

        let grower = TreeGrower {
            matrix: &matrix,
            gradients: &gradients,
            hessians: &hessians,
            constraints,
            features: &features,
            params,
        };
        let tree = grower.grow(bag);

        for (row, score) in raw.iter_mut().enumerate() {
            *score += tree.predict(set.features[row].values());
        }
        trees.push(tree);

        if (round + 1) % 50 == 0 {
            debug!(
                round = round + 1,
                loss = log_loss(&raw, &targets),
                "boosting progress"
            );
        }
    }

    info!(
        rows,
        positives,
        trees = trees.len(),
        loss = log_loss(&raw, &targets),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "eligibility scorer trained"
    );

    Ok(EligibilityModel::new(base_score, trees))
}

fn log_loss(raw: &[f64], targets: &[f64]) -> f64 {
    let total: f64 = raw
        .iter()
        .zip(targets)
        .map(|(score, target)| {
            let probability =
                sigmoid(*score).clamp(PROBABILITY_EPSILON, 1.0 - PROBABILITY_EPSILON);
            -(target * probability.ln() + (1.0 - target) * (1.0 - probability).ln())
        })
        .sum();
    total / raw.len().max(1) as f64
}

#[derive(Debug, Clone, Copy, Default)]
struct Bucket {
    gradient: f64,
    hessian: f64,
    count: usize,
}

impl Bucket {
    fn add(&mut self, other: &Bucket) {
        self.gradient += other.gradient;
        self.hessian += other.hessian;
        self.count += other.count;
    }
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    bin: usize,
    gain: f64,
    left_weight: f64,
    right_weight: f64,
}

struct LeafState {
    node: usize,
    rows: Vec<usize>,
    gradient: f64,
    hessian: f64,
    lower: f64,
    upper: f64,
    best: Option<SplitCandidate>,
}

struct TreeGrower<'a> {
    matrix: &'a BinnedMatrix,
    gradients: &'a [f64],
    hessians: &'a [f64],
    constraints: &'a [MonotoneConstraint; FEATURE_COUNT],
    features: &'a [usize],
    params: &'a BoostingParams,
}

impl TreeGrower<'_> {
    fn grow(&self, rows: Vec<usize>) -> RegressionTree {
        let mut nodes = vec![TreeNode::Leaf { value: 0.0 }];
        let root = self.leaf(0, rows, f64::NEG_INFINITY, f64::INFINITY);
        let mut leaves = vec![root];

        while leaves.len() < self.params.max_leaves {
            let chosen = leaves
                .iter()
                .enumerate()
                .filter_map(|(position, leaf)| leaf.best.map(|split| (position, split)))
                .max_by(|a, b| a.1.gain.total_cmp(&b.1.gain));
            let Some((position, split)) = chosen else {
                break;
            };

            let leaf = leaves.swap_remove(position);
            let (left, right) = self.split(leaf, split, &mut nodes);
            leaves.push(left);
            leaves.push(right);
        }

        for leaf in leaves {
            let weight = self.weight(leaf.gradient, leaf.hessian, leaf.lower, leaf.upper);
            nodes[leaf.node] = TreeNode::Leaf {
                value: self.params.learning_rate * weight,
            };
        }

        RegressionTree::from_nodes(nodes)
    }

    fn leaf(&self, node: usize, rows: Vec<usize>, lower: f64, upper: f64) -> LeafState {
        let (gradient, hessian) = rows.iter().fold((0.0, 0.0), |(g, h), row| {
            (g + self.gradients[*row], h + self.hessians[*row])
        });
        let mut state = LeafState {
            node,
            rows,
            gradient,
            hessian,
            lower,
            upper,
            best: None,
        };
        state.best = self.best_split(&state);
        state
    }

    fn split(
        &self,
        leaf: LeafState,
        split: SplitCandidate,
        nodes: &mut Vec<TreeNode>,
    ) -> (LeafState, LeafState) {
        let column = self.matrix.column(split.feature);
        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = leaf
            .rows
            .into_iter()
            .partition(|&row| usize::from(column[row]) <= split.bin);

        let mid = (split.left_weight + split.right_weight) / 2.0;
        let (left_bounds, right_bounds) = match self.constraints[split.feature] {
            MonotoneConstraint::Increasing => ((leaf.lower, mid), (mid, leaf.upper)),
            MonotoneConstraint::Decreasing => ((mid, leaf.upper), (leaf.lower, mid)),
            MonotoneConstraint::Unconstrained => {
                ((leaf.lower, leaf.upper), (leaf.lower, leaf.upper))
            }
        };

        let left_node = nodes.len();
        nodes.push(TreeNode::Leaf { value: 0.0 });
        let right_node = nodes.len();
        nodes.push(TreeNode::Leaf { value: 0.0 });
        nodes[leaf.node] = TreeNode::Split {
            feature: split.feature,
            threshold: self.matrix.edge(split.feature, split.bin),
            left: left_node,
            right: right_node,
        };

        (
            self.leaf(left_node, left_rows, left_bounds.0, left_bounds.1),
            self.leaf(right_node, right_rows, right_bounds.0, right_bounds.1),
        )
    }

    fn best_split(&self, leaf: &LeafState) -> Option<SplitCandidate> {
        let min_data = self.params.min_data_in_leaf;
        let min_hessian = self.params.min_sum_hessian;
        let total = leaf.rows.len();
        if total < 2 * min_data {
            return None;
        }

        let parent_weight = self.weight(leaf.gradient, leaf.hessian, leaf.lower, leaf.upper);
        let parent_objective = self.objective(leaf.gradient, leaf.hessian, parent_weight);
        let mut best: Option<SplitCandidate> = None;

        for &feature in self.features {
            let bin_count = self.matrix.bin_count(feature);
            if bin_count < 2 {
                continue;
            }

            let column = self.matrix.column(feature);
            let mut histogram = vec![Bucket::default(); bin_count];
            for &row in &leaf.rows {
                let bucket = &mut histogram[usize::from(column[row])];
                bucket.gradient += self.gradients[row];
                bucket.hessian += self.hessians[row];
                bucket.count += 1;
            }

            let constraint = self.constraints[feature];
            let mut left = Bucket::default();
            for (bin, bucket) in histogram.iter().enumerate().take(bin_count - 1) {
                left.add(bucket);
                if left.count < min_data {
                    continue;
                }
                if total - left.count < min_data {
                    break;
                }

                let right_gradient = leaf.gradient - left.gradient;
                let right_hessian = leaf.hessian - left.hessian;
                if left.hessian < min_hessian || right_hessian < min_hessian {
                    continue;
                }

                let left_weight = self.weight(left.gradient, left.hessian, leaf.lower, leaf.upper);
                let right_weight =
                    self.weight(right_gradient, right_hessian, leaf.lower, leaf.upper);
                if !constraint.admits(left_weight, right_weight) {
                    continue;
                }

                let gain = self.objective(left.gradient, left.hessian, left_weight)
                    + self.objective(right_gradient, right_hessian, right_weight)
                    - parent_objective;
                if gain > MIN_SPLIT_GAIN && best.map_or(true, |current| gain > current.gain) {
                    best = Some(SplitCandidate {
                        feature,
                        bin,
                        gain,
                        left_weight,
                        right_weight,
                    });
                }
            }
        }

        best
    }

    /// Newton step for a leaf, clamped into its monotone bounds.
    fn weight(&self, gradient: f64, hessian: f64, lower: f64, upper: f64) -> f64 {
        (-gradient / (hessian + self.params.lambda_l2)).clamp(lower, upper)
    }

    /// Second-order loss reduction achieved by assigning `weight` to a leaf.
    fn objective(&self, gradient: f64, hessian: f64, weight: f64) -> f64 {
        -(gradient * weight + 0.5 * (hessian + self.params.lambda_l2) * weight * weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::eligibility::features::{
        monotone_constraints, FeatureKind, FeatureVector,
    };
    use crate::workflows::eligibility::scorer::synthetic;

    fn quick_params() -> BoostingParams {
        BoostingParams {
            num_rounds: 40,
            learning_rate: 0.2,
            min_data_in_leaf: 20,
            ..BoostingParams::default()
        }
    }

    #[test]
    fn rejects_single_class_training_data() {
        let mut set = synthetic::generate(100, 1).expect("data generates");
        set.labels.iter_mut().for_each(|label| *label = true);

        let result = train(
            &set,
            &[MonotoneConstraint::Unconstrained; FEATURE_COUNT],
            &quick_params(),
        );

        assert!(matches!(
            result,
            Err(ScorerError::DegenerateLabels {
                positives: 100,
                rows: 100
            })
        ));
    }

    #[test]
    fn rejects_empty_training_data() {
        let result = train(
            &TrainingSet::default(),
            &[MonotoneConstraint::Unconstrained; FEATURE_COUNT],
            &quick_params(),
        );
        assert!(matches!(result, Err(ScorerError::EmptyTrainingSet)));
    }

    #[test]
    fn rejects_labels_that_do_not_match_rows() {
        let mut set = synthetic::generate(100, 1).expect("data generates");
        set.labels.truncate(90);

        let result = train(
            &set,
            &[MonotoneConstraint::Unconstrained; FEATURE_COUNT],
            &quick_params(),
        );
        assert!(matches!(
            result,
            Err(ScorerError::LabelMismatch {
                rows: 100,
                labels: 90
            })
        ));
    }

    #[test]
    fn rejects_non_finite_training_values() {
        let mut set = synthetic::generate(100, 1).expect("data generates");
        set.features[7] = set.features[7].with(FeatureKind::CreditScore, f64::NAN);

        let result = train(
            &set,
            &[MonotoneConstraint::Unconstrained; FEATURE_COUNT],
            &quick_params(),
        );
        assert!(matches!(
            result,
            Err(ScorerError::NonFiniteTrainingValue {
                row: 7,
                feature: FeatureKind::CreditScore
            })
        ));
    }

    #[test]
    fn rejects_invalid_parameters() {
        let set = synthetic::generate(100, 1).expect("data generates");
        let params = BoostingParams {
            learning_rate: 0.0,
            ..quick_params()
        };

        let result = train(
            &set,
            &[MonotoneConstraint::Unconstrained; FEATURE_COUNT],
            &params,
        );
        assert!(matches!(result, Err(ScorerError::InvalidParameter(_))));
    }

    #[test]
    fn fitted_model_separates_the_policy_classes() {
        let set = synthetic::generate(3_000, 11).expect("data generates");
        let model =
            train(&set, &monotone_constraints(), &quick_params()).expect("model trains");

        let correct = set
            .features
            .iter()
            .zip(&set.labels)
            .filter(|(vector, label)| (model.probability(vector) >= 0.5) == **label)
            .count();
        let accuracy = correct as f64 / set.len() as f64;
        assert!(accuracy > 0.9, "training accuracy {accuracy}");
        assert_eq!(model.tree_count(), 40);
    }

    #[test]
    fn constraint_holds_even_against_contrary_labels() {
        // Label rises with income, the opposite of the declared decreasing constraint.
        let mut set = synthetic::generate(2_000, 5).expect("data generates");
        for (vector, label) in set.features.iter().zip(set.labels.iter_mut()) {
            *label = vector.get(FeatureKind::LogIncome) > 8.7;
        }
        let mut constraints = [MonotoneConstraint::Unconstrained; FEATURE_COUNT];
        constraints[FeatureKind::LogIncome.index()] = MonotoneConstraint::Decreasing;

        let model = train(&set, &constraints, &quick_params()).expect("model trains");

        let base = FeatureVector::from_values([0.0, 5_000.0, 3.0, 5.0, 650.0, 1_000.0]);
        let mut previous = f64::INFINITY;
        for step in 0..60 {
            let log_income = 5.0 + step as f64 * 0.15;
            let raw = model.raw_score(&base.with(FeatureKind::LogIncome, log_income));
            assert!(raw <= previous, "raw score rose at log_income {log_income}");
            previous = raw;
        }
    }
}
