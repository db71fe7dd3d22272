use serde::{Deserialize, Serialize};

use crate::workflows::eligibility::domain::ValidatedRecord;
use crate::workflows::eligibility::features::{
    income_per_capita, net_worth, sanitized_balance, sanitized_family_size, sanitized_income,
};

/// Per-capita income under which `rule_low_income_pc` fires.
pub const LOW_INCOME_PER_CAPITA: f64 = 12_000.0;
/// Per-capita income under which a non-employed applicant fires `rule_unemployed_low_income`.
pub const UNEMPLOYED_INCOME_PER_CAPITA: f64 = 18_000.0;
/// Caveat printed or serialized next to the rule flags wherever they are shown.
pub const SIGNALS_BASIS: &str =
    "human-readable proxies computed from the application, not the model's decision path";

/// Transparency values surfaced next to a scored decision.
///
/// The rule flags are human-auditable proxies computed from the record alone. They are not
/// the model's decision path and must be presented as such. The per-capita and net-worth
/// figures use the same helpers as the feature builder and the training labeller, so an
/// explanation can never quote a different number than the one the model saw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalSet {
    pub income_per_capita: Option<f64>,
    pub net_worth: Option<f64>,
    pub rule_low_income_pc: bool,
    pub rule_unemployed_low_income: bool,
    pub rule_negative_net_worth_unemployed: bool,
}

/// Named rule flag, for narration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleFlag {
    LowIncomePc,
    UnemployedLowIncome,
    NegativeNetWorthUnemployed,
}

impl RuleFlag {
    pub const fn name(self) -> &'static str {
        match self {
            Self::LowIncomePc => "rule_low_income_pc",
            Self::UnemployedLowIncome => "rule_unemployed_low_income",
            Self::NegativeNetWorthUnemployed => "rule_negative_net_worth_unemployed",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::LowIncomePc => "income per household member is below 12,000",
            Self::UnemployedLowIncome => {
                "income per household member is below 18,000 and the applicant is not employed"
            }
            Self::NegativeNetWorthUnemployed => {
                "liabilities exceed assets and the applicant is not employed"
            }
        }
    }
}

impl SignalSet {
    /// Derive signals from a record. A value whose inputs are missing stays `None` and
    /// leaves its dependent flags unset.
    pub fn from_record(record: &ValidatedRecord) -> Self {
        let income_per_capita = record
            .income
            .zip(record.family_size)
            .map(|(income, family)| {
                income_per_capita(sanitized_income(income), sanitized_family_size(family))
            });
        let net_worth = record
            .assets
            .zip(record.liabilities)
            .map(|(assets, liabilities)| {
                net_worth(sanitized_balance(assets), sanitized_balance(liabilities))
            });
        let not_employed = !record.is_employed();

        Self {
            income_per_capita,
            net_worth,
            rule_low_income_pc: income_per_capita.is_some_and(|pc| pc < LOW_INCOME_PER_CAPITA),
            rule_unemployed_low_income: not_employed
                && income_per_capita.is_some_and(|pc| pc < UNEMPLOYED_INCOME_PER_CAPITA),
            rule_negative_net_worth_unemployed: not_employed
                && net_worth.is_some_and(|worth| worth < 0.0),
        }
    }

    pub fn triggered(&self) -> Vec<RuleFlag> {
        let mut flags = Vec::new();
        if self.rule_low_income_pc {
            flags.push(RuleFlag::LowIncomePc);
        }
        if self.rule_unemployed_low_income {
            flags.push(RuleFlag::UnemployedLowIncome);
        }
        if self.rule_negative_net_worth_unemployed {
            flags.push(RuleFlag::NegativeNetWorthUnemployed);
        }
        flags
    }
}
