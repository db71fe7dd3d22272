use crate::workflows::eligibility::decision::{
    DecisionPolicy, DecisionThresholds, RuleFlag, SignalSet,
};
use crate::workflows::eligibility::domain::{EligibilityDecision, ValidatedRecord};
use crate::workflows::eligibility::features::FeatureBuilder;

use super::common::{affluent_record, complete_record, engine, fixed_scorer, trained_scorer};

#[test]
fn threshold_boundaries_belong_to_the_upper_bucket() {
    let policy = DecisionPolicy::default();

    assert_eq!(policy.decide(0.75), EligibilityDecision::Approve);
    assert_eq!(policy.decide(0.7499999), EligibilityDecision::SoftDecline);
    assert_eq!(policy.decide(0.45), EligibilityDecision::SoftDecline);
    assert_eq!(policy.decide(0.4499999), EligibilityDecision::Reject);
    assert_eq!(policy.decide(0.0), EligibilityDecision::Reject);
    assert_eq!(policy.decide(1.0), EligibilityDecision::Approve);
}

#[test]
fn thresholds_must_be_ordered_and_bounded() {
    assert!(DecisionThresholds::new(0.45, 0.75).is_err());
    assert!(DecisionThresholds::new(0.5, 0.5).is_err());
    assert!(DecisionThresholds::new(1.2, 0.5).is_err());
    assert!(DecisionThresholds::new(0.8, -0.1).is_err());
    assert!(DecisionThresholds::new(f64::NAN, 0.1).is_err());
    assert!(DecisionThresholds::new(1.0, 0.0).is_ok());
}

#[test]
fn unready_records_never_reach_the_scorer() {
    // A scorer that would reject NaN inputs is never consulted for an unready record.
    let engine = engine(fixed_scorer(0.9));
    let record = ValidatedRecord {
        income: Some(f64::NAN),
        ..ValidatedRecord::default()
    };

    let evaluation = engine.evaluate(&record).expect("gate short-circuits");

    assert_eq!(evaluation.outcome.decision, EligibilityDecision::ManualReview);
    assert_eq!(evaluation.outcome.probability, None);
    assert_eq!(evaluation.outcome.reason, "Missing critical information");
    assert!(evaluation.signals.is_none());
}

#[test]
fn non_finite_features_propagate_as_errors() {
    let engine = engine(fixed_scorer(0.9));
    let record = ValidatedRecord {
        income: Some(f64::NAN),
        ..complete_record()
    };

    assert!(engine.evaluate(&record).is_err());
}

#[test]
fn prediction_is_idempotent() {
    let scorer = trained_scorer();
    let features = FeatureBuilder::build(&complete_record());

    let first = scorer.predict(&features).expect("finite probability");
    let second = scorer.predict(&features).expect("finite probability");

    assert_eq!(first.to_bits(), second.to_bits());
    assert!((0.0..=1.0).contains(&first));
}

#[test]
fn low_income_household_scores_as_high_support_need() {
    let evaluation = engine(trained_scorer())
        .evaluate(&complete_record())
        .expect("scored");

    assert!(matches!(
        evaluation.outcome.decision,
        EligibilityDecision::Approve | EligibilityDecision::SoftDecline
    ));
    assert_eq!(evaluation.outcome.reason, "ML-based eligibility assessment");
}

#[test]
fn affluent_applicant_is_rejected() {
    let evaluation = engine(trained_scorer())
        .evaluate(&affluent_record())
        .expect("scored");

    assert_eq!(evaluation.outcome.decision, EligibilityDecision::Reject);
    let probability = evaluation.outcome.probability.expect("scored");
    assert!(probability < 0.45);
}

#[test]
fn signals_for_the_reference_household() {
    let signals = SignalSet::from_record(&complete_record());

    assert_eq!(signals.income_per_capita, Some(750.0));
    assert_eq!(signals.net_worth, Some(-5_000.0));
    assert_eq!(
        signals.triggered(),
        vec![
            RuleFlag::LowIncomePc,
            RuleFlag::UnemployedLowIncome,
            RuleFlag::NegativeNetWorthUnemployed,
        ]
    );
}

#[test]
fn signals_share_the_feature_builder_clamps() {
    let record = ValidatedRecord {
        family_size: Some(0),
        ..complete_record()
    };

    let signals = SignalSet::from_record(&record);
    let features = FeatureBuilder::build(&record);

    assert_eq!(
        signals.income_per_capita,
        Some(features.values()[1]),
        "explanations quote the value the model saw"
    );
}
