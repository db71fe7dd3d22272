use serde::{Deserialize, Serialize};

pub const DEFAULT_APPROVE_THRESHOLD: f64 = 0.75;
pub const DEFAULT_SOFT_DECLINE_THRESHOLD: f64 = 0.45;

/// Probability cut-offs separating the three scored decisions.
///
/// Buckets are closed below and open above: `p >= approve` approves,
/// `soft_decline <= p < approve` soft-declines, anything lower rejects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionThresholds {
    approve: f64,
    soft_decline: f64,
}

impl DecisionThresholds {
    pub fn new(approve: f64, soft_decline: f64) -> Result<Self, InvalidThresholds> {
        let ordered = approve.is_finite()
            && soft_decline.is_finite()
            && (0.0..=1.0).contains(&approve)
            && (0.0..=1.0).contains(&soft_decline)
            && soft_decline < approve;

        if ordered {
            Ok(Self {
                approve,
                soft_decline,
            })
        } else {
            Err(InvalidThresholds {
                approve,
                soft_decline,
            })
        }
    }

    pub fn approve(&self) -> f64 {
        self.approve
    }

    pub fn soft_decline(&self) -> f64 {
        self.soft_decline
    }
}

impl Default for DecisionThresholds {
    fn default() -> Self {
        Self {
            approve: DEFAULT_APPROVE_THRESHOLD,
            soft_decline: DEFAULT_SOFT_DECLINE_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("decision thresholds must satisfy 0 <= soft_decline < approve <= 1 (approve {approve}, soft_decline {soft_decline})")]
pub struct InvalidThresholds {
    pub approve: f64,
    pub soft_decline: f64,
}
