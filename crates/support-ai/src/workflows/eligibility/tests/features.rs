use crate::workflows::eligibility::domain::ValidatedRecord;
use crate::workflows::eligibility::features::{
    monotone_constraints, FeatureBuilder, FeatureKind, MonotoneConstraint, DEFAULT_CREDIT_SCORE,
    FEATURE_ORDER,
};

use super::common::complete_record;

#[test]
fn feature_order_is_pinned() {
    let names: Vec<&str> = FEATURE_ORDER.iter().map(|kind| kind.name()).collect();
    assert_eq!(
        names,
        vec![
            "log_income",
            "income_per_capita",
            "family_size",
            "employment_years",
            "credit_score",
            "net_worth",
        ]
    );
    for (position, kind) in FEATURE_ORDER.iter().enumerate() {
        assert_eq!(kind.index(), position);
    }
}

#[test]
fn constraints_follow_policy_directions() {
    use MonotoneConstraint::{Decreasing, Increasing};

    assert_eq!(
        monotone_constraints(),
        [Decreasing, Decreasing, Increasing, Increasing, Increasing, Decreasing]
    );
}

#[test]
fn builds_documented_transforms() {
    let vector = FeatureBuilder::build(&complete_record());

    assert!((vector.get(FeatureKind::LogIncome) - 3_001.0_f64.ln()).abs() < 1e-12);
    assert_eq!(vector.get(FeatureKind::IncomePerCapita), 750.0);
    assert_eq!(vector.get(FeatureKind::FamilySize), 4.0);
    assert_eq!(vector.get(FeatureKind::EmploymentYears), 1.0);
    assert_eq!(vector.get(FeatureKind::CreditScore), DEFAULT_CREDIT_SCORE);
    assert_eq!(vector.get(FeatureKind::NetWorth), -5_000.0);
}

#[test]
fn missing_values_take_defaults_only_here() {
    let vector = FeatureBuilder::build(&ValidatedRecord::default());

    assert_eq!(vector.values(), &[0.0, 0.0, 1.0, 0.0, DEFAULT_CREDIT_SCORE, 0.0]);
}

#[test]
fn invalid_numbers_are_clamped() {
    let record = ValidatedRecord {
        income: Some(-500.0),
        family_size: Some(0),
        employment_years: Some(-3),
        credit_score: Some(1_200.0),
        assets: Some(-10.0),
        liabilities: Some(2_000.0),
        ..ValidatedRecord::default()
    };

    let vector = FeatureBuilder::build(&record);

    assert_eq!(vector.get(FeatureKind::LogIncome), 0.0);
    assert_eq!(vector.get(FeatureKind::IncomePerCapita), 0.0);
    assert_eq!(vector.get(FeatureKind::FamilySize), 1.0);
    assert_eq!(vector.get(FeatureKind::EmploymentYears), 0.0);
    assert_eq!(vector.get(FeatureKind::CreditScore), 900.0);
    assert_eq!(vector.get(FeatureKind::NetWorth), -2_000.0);
    assert!(vector.first_non_finite().is_none());
}

#[test]
fn nan_income_is_not_silently_repaired() {
    let record = ValidatedRecord {
        income: Some(f64::NAN),
        ..complete_record()
    };

    let vector = FeatureBuilder::build(&record);

    let (kind, _) = vector.first_non_finite().expect("NaN survives");
    assert_eq!(kind, FeatureKind::LogIncome);
}

#[test]
fn extreme_income_stays_finite() {
    let record = ValidatedRecord {
        income: Some(f64::MAX),
        ..complete_record()
    };

    let vector = FeatureBuilder::build(&record);

    assert!(vector.first_non_finite().is_none());
    assert_eq!(vector.get(FeatureKind::IncomePerCapita), 1e9 / 4.0);
}
