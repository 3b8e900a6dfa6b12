//! Cointegration Checks
//!
//! Advisory pre-trade predicate evaluated on the freshly fitted spread at
//! training time. A failing check suppresses new entries only.

use serde::{Deserialize, Serialize};

/// Predicate over a spread series
pub trait CointegrationCheck {
    fn is_cointegrated(&self, spread: &[f64]) -> bool;
}

impl<C: CointegrationCheck + ?Sized> CointegrationCheck for Box<C> {
    fn is_cointegrated(&self, spread: &[f64]) -> bool {
        (**self).is_cointegrated(spread)
    }
}

/// Accepts every spread
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysCointegrated;

impl CointegrationCheck for AlwaysCointegrated {
    fn is_cointegrated(&self, _spread: &[f64]) -> bool {
        true
    }
}

/// Significance level of the Dickey-Fuller test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Significance {
    #[serde(rename = "1%")]
    OnePercent,
    #[default]
    #[serde(rename = "5%")]
    FivePercent,
    #[serde(rename = "10%")]
    TenPercent,
}

impl Significance {
    /// Asymptotic critical value, constant and no trend
    pub fn critical_value(&self) -> f64 {
        match self {
            Significance::OnePercent => -3.43,
            Significance::FivePercent => -2.86,
            Significance::TenPercent => -2.57,
        }
    }
}

/// Dickey-Fuller unit-root test on the spread (no lagged differences):
/// dx_i = a + b * x_{i-1} + e_i, reject the unit root when t(b) < critical
#[derive(Debug, Clone, Copy, Default)]
pub struct DickeyFullerCheck {
    pub significance: Significance,
}

impl DickeyFullerCheck {
    pub fn new(significance: Significance) -> Self {
        Self { significance }
    }

    /// t-statistic of the lag coefficient, None when the regression is singular
    pub fn t_statistic(spread: &[f64]) -> Option<f64> {
        if spread.len() < 4 {
            return None;
        }

        let m = (spread.len() - 1) as f64;
        let lag_mean = spread[..spread.len() - 1].iter().sum::<f64>() / m;
        let diff_mean = spread.windows(2).map(|w| w[1] - w[0]).sum::<f64>() / m;

        let mut sxx = 0.0;
        let mut sxy = 0.0;
        for w in spread.windows(2) {
            let dx = w[0] - lag_mean;
            sxx += dx * dx;
            sxy += dx * ((w[1] - w[0]) - diff_mean);
        }
        if sxx <= 0.0 {
            return None;
        }

        let slope = sxy / sxx;
        let intercept = diff_mean - slope * lag_mean;
        let rss: f64 = spread
            .windows(2)
            .map(|w| {
                let resid = (w[1] - w[0]) - intercept - slope * w[0];
                resid * resid
            })
            .sum();

        let dof = m - 2.0;
        let std_err = (rss / dof / sxx).sqrt();
        if !(std_err > 0.0) {
            return None;
        }
        Some(slope / std_err)
    }
}

impl CointegrationCheck for DickeyFullerCheck {
    fn is_cointegrated(&self, spread: &[f64]) -> bool {
        match Self::t_statistic(spread) {
            Some(t) => {
                let passed = t < self.significance.critical_value();
                tracing::debug!(t_stat = t, passed, "dickey-fuller check");
                passed
            }
            None => false,
        }
    }
}
