use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::order::Direction;

/// Outcome of evaluating one z-score against the current trading state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Enter(Direction),
    Exit(Direction),
    Hold,
}

impl Decision {
    pub fn is_entry(&self) -> bool {
        matches!(self, Decision::Enter(_))
    }

    pub fn is_exit(&self) -> bool {
        matches!(self, Decision::Exit(_))
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Enter(d) => write!(f, "ENTER {}", d),
            Decision::Exit(d) => write!(f, "EXIT {}", d),
            Decision::Hold => write!(f, "HOLD"),
        }
    }
}

/// Two-sided confidence that a z-score is not noise: P(|Z| < |z|)
/// Ranges from 0.0 to 1.0
pub fn confidence(z_score: f64) -> f64 {
    use statrs::function::erf::erf;
    // 2*Phi(|z|) - 1 = erf(|z| / sqrt(2))
    erf(z_score.abs() / f64::sqrt(2.0))
}
