//! Hedge Parameters
//!
//! Result of a hedge ratio search: the winning OU fit plus the notional
//! allocations and initial prices the hedge ratios derive from.

use serde::{Deserialize, Serialize};

use crate::strategy::ou_estimator::OuParams;

/// Immutable hedge produced by one training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HedgeParameters {
    /// OU fit of the winning spread
    pub ou_params: OuParams,
    /// Notional allocated to leg 0
    pub a: f64,
    /// Notional allocated to leg 1
    pub b: f64,
    /// First price of leg 0 in the training window
    pub series1_initial: f64,
    /// First price of leg 1 in the training window
    pub series2_initial: f64,
}

impl HedgeParameters {
    pub fn new(
        ou_params: OuParams,
        a: f64,
        b: f64,
        series1_initial: f64,
        series2_initial: f64,
    ) -> Self {
        Self {
            ou_params,
            a,
            b,
            series1_initial,
            series2_initial,
        }
    }

    /// Hedge ratio for leg 0: A / S1_0
    pub fn alpha(&self) -> f64 {
        self.a / self.series1_initial
    }

    /// Hedge ratio for leg 1: B / S2_0
    pub fn beta(&self) -> f64 {
        self.b / self.series2_initial
    }

    /// Target notional ratio r = A / B used for sizing
    pub fn notional_ratio(&self) -> f64 {
        self.a / self.b
    }

    /// Spread value for a single pair of prices
    pub fn spread_at(&self, p0: f64, p1: f64) -> f64 {
        self.alpha() * p0 - self.beta() * p1
    }

    /// Full spread series for aligned price legs
    pub fn spread<'a, I, J>(&self, leg0: I, leg1: J) -> Vec<f64>
    where
        I: IntoIterator<Item = &'a f64>,
        J: IntoIterator<Item = &'a f64>,
    {
        let (alpha, beta) = (self.alpha(), self.beta());
        leg0.into_iter()
            .zip(leg1)
            .map(|(p0, p1)| alpha * p0 - beta * p1)
            .collect()
    }
}
