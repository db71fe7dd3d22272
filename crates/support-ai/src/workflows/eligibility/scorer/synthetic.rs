use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, LogNormal, Normal};

use super::ScorerError;
use crate::workflows::eligibility::features::{income_per_capita, FeatureKind, FeatureVector};

pub const SYNTHETIC_SAMPLE_COUNT: usize = 12_000;
pub const TRAINING_SEED: u64 = 42;

/// Household income per capita below which support is always indicated.
pub const LABEL_INCOME_PER_CAPITA: f64 = 10_000.0;
/// Looser per-capita limit that applies to households of [`LABEL_LARGE_FAMILY`] or more.
pub const LABEL_LARGE_FAMILY_INCOME_PER_CAPITA: f64 = 18_000.0;
pub const LABEL_LARGE_FAMILY: f64 = 3.0;

const INCOME_MEDIAN: f64 = 6_000.0;
const INCOME_SIGMA: f64 = 1.5;
const INCOME_RANGE: (f64, f64) = (500.0, 1e9);
const CREDIT_MEAN: f64 = 650.0;
const CREDIT_STD: f64 = 90.0;
const CREDIT_RANGE: (f64, f64) = (300.0, 900.0);
const ASSETS_MEAN: f64 = 50_000.0;
const ASSETS_STD: f64 = 150_000.0;
const LIABILITIES_MEAN: f64 = 20_000.0;
const LIABILITIES_STD: f64 = 100_000.0;
const BALANCE_RANGE: (f64, f64) = (0.0, 5e7);

/// Ground-truth labelling rule the scorer approximates.
pub fn policy_label(income_per_capita: f64, family_size: f64) -> bool {
    income_per_capita < LABEL_INCOME_PER_CAPITA
        || (income_per_capita < LABEL_LARGE_FAMILY_INCOME_PER_CAPITA
            && family_size >= LABEL_LARGE_FAMILY)
}

/// Labelled rows laid out in canonical feature order.
#[derive(Debug, Clone, Default)]
pub struct TrainingSet {
    pub features: Vec<FeatureVector>,
    pub labels: Vec<bool>,
}

impl TrainingSet {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn positives(&self) -> usize {
        self.labels.iter().filter(|label| **label).count()
    }

    pub(crate) fn first_non_finite(&self) -> Option<(usize, FeatureKind)> {
        self.features
            .iter()
            .enumerate()
            .find_map(|(row, vector)| vector.first_non_finite().map(|(kind, _)| (row, kind)))
    }
}

/// Draw `samples` synthetic applicants and label them with [`policy_label`].
pub fn generate(samples: usize, seed: u64) -> Result<TrainingSet, ScorerError> {
    let mut rng = StdRng::seed_from_u64(seed);

    let income_dist = LogNormal::new(INCOME_MEDIAN.ln(), INCOME_SIGMA)
        .map_err(|err| ScorerError::Distribution(err.to_string()))?;
    let credit_dist = Normal::new(CREDIT_MEAN, CREDIT_STD)
        .map_err(|err| ScorerError::Distribution(err.to_string()))?;
    let assets_dist = Normal::new(ASSETS_MEAN, ASSETS_STD)
        .map_err(|err| ScorerError::Distribution(err.to_string()))?;
    let liabilities_dist = Normal::new(LIABILITIES_MEAN, LIABILITIES_STD)
        .map_err(|err| ScorerError::Distribution(err.to_string()))?;

    let mut set = TrainingSet {
        features: Vec::with_capacity(samples),
        labels: Vec::with_capacity(samples),
    };

    for _ in 0..samples {
        let income = income_dist
            .sample(&mut rng)
            .clamp(INCOME_RANGE.0, INCOME_RANGE.1);
        let family_size = f64::from(rng.gen_range(1..7_u8));
        let employment_years = f64::from(rng.gen_range(0..35_u8));
        let credit_score = credit_dist
            .sample(&mut rng)
            .clamp(CREDIT_RANGE.0, CREDIT_RANGE.1);
        let assets = assets_dist
            .sample(&mut rng)
            .clamp(BALANCE_RANGE.0, BALANCE_RANGE.1);
        let liabilities = liabilities_dist
            .sample(&mut rng)
            .clamp(BALANCE_RANGE.0, BALANCE_RANGE.1);

        let vector = FeatureVector::from_components(
            income,
            family_size,
            employment_years,
            credit_score,
            assets,
            liabilities,
        );
        let label = policy_label(income_per_capita(income, family_size), family_size);

        set.features.push(vector);
        set.labels.push(label);
    }

    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_rule_matches_policy_boundaries() {
        assert!(policy_label(9_999.0, 1.0));
        assert!(!policy_label(10_000.0, 1.0));
        assert!(policy_label(17_999.0, 3.0));
        assert!(!policy_label(17_999.0, 2.0));
        assert!(!policy_label(18_000.0, 5.0));
    }

    #[test]
    fn generation_is_deterministic_for_a_seed() {
        let first = generate(200, 7).expect("data generates");
        let second = generate(200, 7).expect("data generates");

        assert_eq!(first.features, second.features);
        assert_eq!(first.labels, second.labels);
    }

    #[test]
    fn generated_rows_respect_distribution_bounds() {
        let set = generate(2_000, TRAINING_SEED).expect("data generates");

        assert_eq!(set.len(), 2_000);
        assert!(set.first_non_finite().is_none());
        for vector in &set.features {
            let family = vector.get(FeatureKind::FamilySize);
            assert!((1.0..=6.0).contains(&family));
            let years = vector.get(FeatureKind::EmploymentYears);
            assert!((0.0..=34.0).contains(&years));
            let credit = vector.get(FeatureKind::CreditScore);
            assert!((300.0..=900.0).contains(&credit));
        }

        let positives = set.positives();
        assert!(positives > 0 && positives < set.len(), "both classes present");
    }
}
