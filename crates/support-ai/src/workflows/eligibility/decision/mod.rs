mod config;
mod policy;
mod signals;

pub use config::{
    DecisionThresholds, InvalidThresholds, DEFAULT_APPROVE_THRESHOLD,
    DEFAULT_SOFT_DECLINE_THRESHOLD,
};
pub use policy::DecisionPolicy;
pub use signals::{
    RuleFlag, SignalSet, LOW_INCOME_PER_CAPITA, SIGNALS_BASIS, UNEMPLOYED_INCOME_PER_CAPITA,
};
