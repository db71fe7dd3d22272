//! Feature construction for the eligibility scorer.
//!
//! [`FEATURE_ORDER`] is the only place the column layout is defined. Both the synthetic
//! training set and the live feature builder go through [`FeatureVector::from_components`],
//! so a trained model and the vectors it scores can never disagree on ordering.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::ValidatedRecord;

pub const FEATURE_COUNT: usize = 6;

/// Credit score substituted when none is known; the mean of the training distribution.
pub const DEFAULT_CREDIT_SCORE: f64 = 650.0;

pub const INCOME_CEILING: f64 = 1e9;
pub const MAX_FAMILY_SIZE: i32 = 100;
pub const MAX_EMPLOYMENT_YEARS: i32 = 80;
pub const CREDIT_SCORE_RANGE: (f64, f64) = (300.0, 900.0);
pub const BALANCE_CEILING: f64 = 1e12;

/// Direction the model output is allowed to move as a feature grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonotoneConstraint {
    Increasing,
    Decreasing,
    Unconstrained,
}

impl MonotoneConstraint {
    /// Whether a left/right pair of child outputs respects the direction.
    pub fn admits(self, left: f64, right: f64) -> bool {
        match self {
            Self::Increasing => left <= right,
            Self::Decreasing => left >= right,
            Self::Unconstrained => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    LogIncome,
    IncomePerCapita,
    FamilySize,
    EmploymentYears,
    CreditScore,
    NetWorth,
}

pub const FEATURE_ORDER: [FeatureKind; FEATURE_COUNT] = [
    FeatureKind::LogIncome,
    FeatureKind::IncomePerCapita,
    FeatureKind::FamilySize,
    FeatureKind::EmploymentYears,
    FeatureKind::CreditScore,
    FeatureKind::NetWorth,
];

impl FeatureKind {
    pub const fn index(self) -> usize {
        match self {
            Self::LogIncome => 0,
            Self::IncomePerCapita => 1,
            Self::FamilySize => 2,
            Self::EmploymentYears => 3,
            Self::CreditScore => 4,
            Self::NetWorth => 5,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::LogIncome => "log_income",
            Self::IncomePerCapita => "income_per_capita",
            Self::FamilySize => "family_size",
            Self::EmploymentYears => "employment_years",
            Self::CreditScore => "credit_score",
            Self::NetWorth => "net_worth",
        }
    }

    /// Policy direction enforced by the scorer for this feature.
    pub const fn constraint(self) -> MonotoneConstraint {
        match self {
            Self::LogIncome | Self::IncomePerCapita | Self::NetWorth => {
                MonotoneConstraint::Decreasing
            }
            Self::FamilySize | Self::EmploymentYears | Self::CreditScore => {
                MonotoneConstraint::Increasing
            }
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn monotone_constraints() -> [MonotoneConstraint; FEATURE_COUNT] {
    FEATURE_ORDER.map(FeatureKind::constraint)
}

/// Fixed-order numeric input to the scorer. Lives for one scoring call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    /// Assemble a vector from already-sanitised components.
    pub fn from_components(
        income: f64,
        family_size: f64,
        employment_years: f64,
        credit_score: f64,
        assets: f64,
        liabilities: f64,
    ) -> Self {
        let mut values = [0.0; FEATURE_COUNT];
        values[FeatureKind::LogIncome.index()] = income.ln_1p();
        values[FeatureKind::IncomePerCapita.index()] = income_per_capita(income, family_size);
        values[FeatureKind::FamilySize.index()] = family_size;
        values[FeatureKind::EmploymentYears.index()] = employment_years;
        values[FeatureKind::CreditScore.index()] = credit_score;
        values[FeatureKind::NetWorth.index()] = net_worth(assets, liabilities);
        Self(values)
    }

    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    pub fn get(&self, kind: FeatureKind) -> f64 {
        self.0[kind.index()]
    }

    pub fn with(mut self, kind: FeatureKind, value: f64) -> Self {
        self.0[kind.index()] = value;
        self
    }

    pub fn first_non_finite(&self) -> Option<(FeatureKind, f64)> {
        FEATURE_ORDER
            .into_iter()
            .map(|kind| (kind, self.get(kind)))
            .find(|(_, value)| !value.is_finite())
    }
}

/// Income normalised by household size; the household floor is one person.
pub fn income_per_capita(income: f64, family_size: f64) -> f64 {
    income / family_size.max(1.0)
}

/// Assets minus liabilities; negative when debts exceed holdings.
pub fn net_worth(assets: f64, liabilities: f64) -> f64 {
    assets - liabilities
}

// `f64::clamp` keeps NaN as NaN, so corrupt inputs surface at the scorer instead of
// turning into a plausible number here.
pub(crate) fn sanitized_income(raw: f64) -> f64 {
    raw.clamp(0.0, INCOME_CEILING)
}

pub(crate) fn sanitized_family_size(raw: i32) -> f64 {
    f64::from(raw.clamp(1, MAX_FAMILY_SIZE))
}

pub(crate) fn sanitized_employment_years(raw: i32) -> f64 {
    f64::from(raw.clamp(0, MAX_EMPLOYMENT_YEARS))
}

pub(crate) fn sanitized_credit_score(raw: f64) -> f64 {
    raw.clamp(CREDIT_SCORE_RANGE.0, CREDIT_SCORE_RANGE.1)
}

pub(crate) fn sanitized_balance(raw: f64) -> f64 {
    raw.clamp(0.0, BALANCE_CEILING)
}

/// The single place where missing values are replaced by defaults.
pub struct FeatureBuilder;

impl FeatureBuilder {
    pub fn build(record: &ValidatedRecord) -> FeatureVector {
        let income = sanitized_income(record.income.unwrap_or(0.0));
        let family_size = sanitized_family_size(record.family_size.unwrap_or(1));
        let employment_years = sanitized_employment_years(record.employment_years.unwrap_or(0));
        let credit_score =
            sanitized_credit_score(record.credit_score.unwrap_or(DEFAULT_CREDIT_SCORE));
        let assets = sanitized_balance(record.assets.unwrap_or(0.0));
        let liabilities = sanitized_balance(record.liabilities.unwrap_or(0.0));

        FeatureVector::from_components(
            income,
            family_size,
            employment_years,
            credit_score,
            assets,
            liabilities,
        )
    }
}
