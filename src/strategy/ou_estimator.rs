//! Ornstein-Uhlenbeck Parameter Estimation
//!
//! Closed-form conditional Maximum Likelihood Estimation (MLE) of the OU
//! process parameters for a series sampled at a fixed interval `dt`:
//! - theta: Long-run mean of the process
//! - mu: Speed of mean reversion (higher = faster reversion)
//! - sigma: Volatility
//!
//! The OU process follows: dX(t) = mu(theta - X(t))dt + sigma*dW(t)
//!
//! Sampled at `dt` it is an AR(1) process with coefficient
//! phi = exp(-mu*dt), so the fit is only admissible when 0 < phi < 1.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum number of observations (one transition)
pub const MIN_OBSERVATIONS: usize = 2;

/// Errors raised when an OU fit is inadmissible
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OuError {
    #[error("Insufficient data: need {required} observations, got {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("Sampling interval must be positive and finite, got {0}")]
    InvalidDt(f64),

    #[error("Degenerate series: {0} denominator is zero or not finite")]
    DegenerateDenominator(&'static str),

    #[error("AR(1) coefficient phi = {0} outside (0, 1)")]
    PhiOutOfRange(f64),

    #[error("Speed of mean reversion must be positive, got {0}")]
    NonPositiveMeanReversion(f64),

    #[error("Variance of the process must be positive, got {0}")]
    NonPositiveVariance(f64),
}

/// Sums over consecutive pairs (x_{i-1}, x_i), i = 1..n-1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SufficientStats {
    /// Sum of x_{i-1}
    pub sx: f64,
    /// Sum of x_i
    pub sy: f64,
    /// Sum of x_{i-1}^2
    pub sxx: f64,
    /// Sum of x_i^2
    pub syy: f64,
    /// Sum of x_{i-1} * x_i
    pub sxy: f64,
}

impl SufficientStats {
    pub fn from_series(x: &[f64]) -> Self {
        let mut stats = Self {
            sx: 0.0,
            sy: 0.0,
            sxx: 0.0,
            syy: 0.0,
            sxy: 0.0,
        };

        for pair in x.windows(2) {
            let (prev, curr) = (pair[0], pair[1]);
            stats.sx += prev;
            stats.sy += curr;
            stats.sxx += prev * prev;
            stats.syy += curr * curr;
            stats.sxy += prev * curr;
        }

        stats
    }
}

/// OU process parameters estimated from a series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OuParams {
    /// Long-run mean
    pub theta: f64,
    /// Speed of mean reversion
    pub mu: f64,
    /// Volatility
    pub sigma: f64,
    /// Squared volatility
    pub sigma_sq: f64,
    /// Average log-likelihood of the fit
    pub log_likelihood: f64,
    /// Sums the estimate was built from
    pub stats: SufficientStats,
}

impl OuParams {
    /// Half-life of mean reversion, ln(2) / mu
    ///
    /// Measured in the time unit `dt` is expressed in, not in samples:
    /// with hourly bars and `dt = 1/24` the result is in days. Divide by
    /// `dt` for a sample count.
    pub fn half_life(&self) -> f64 {
        std::f64::consts::LN_2 / self.mu
    }
}

/// Closed-form MLE for the OU process at a fixed sampling interval
#[derive(Debug, Clone, Copy)]
pub struct OuEstimator {
    dt: f64,
}

impl OuEstimator {
    /// Create an estimator for samples spaced `dt` apart
    pub fn new(dt: f64) -> Result<Self, OuError> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(OuError::InvalidDt(dt));
        }
        Ok(Self { dt })
    }

    /// Fit theta, mu and sigma to `x`
    ///
    /// Pure: identical input yields bit-identical output.
    pub fn fit(&self, x: &[f64]) -> Result<OuParams, OuError> {
        let n_obs = x.len();
        if n_obs < MIN_OBSERVATIONS {
            return Err(OuError::InsufficientData {
                required: MIN_OBSERVATIONS,
                available: n_obs,
            });
        }

        let dt = self.dt;
        let n = n_obs as f64;
        let s = SufficientStats::from_series(x);

        // Long-run mean
        let theta_den = n * (s.sxx - s.sxy) - (s.sx * s.sx - s.sx * s.sy);
        if theta_den == 0.0 || !theta_den.is_finite() {
            return Err(OuError::DegenerateDenominator("theta"));
        }
        let theta = (s.sy * s.sxx - s.sx * s.sxy) / theta_den;

        // AR(1) coefficient, must lie strictly inside (0, 1) for ln(phi) < 0
        let phi_den = s.sxx - 2.0 * theta * s.sx + n * theta * theta;
        if phi_den == 0.0 || !phi_den.is_finite() {
            return Err(OuError::DegenerateDenominator("phi"));
        }
        let phi = (s.sxy - theta * (s.sx + s.sy) + n * theta * theta) / phi_den;
        if !(phi > 0.0 && phi < 1.0) {
            return Err(OuError::PhiOutOfRange(phi));
        }

        let mu = -phi.ln() / dt;
        if !(mu > 0.0) {
            return Err(OuError::NonPositiveMeanReversion(mu));
        }

        let decay = (-mu * dt).exp();
        let decay_sq = (-2.0 * mu * dt).exp();

        let a = n * (1.0 - decay_sq);
        let b = s.syy - 2.0 * decay * s.sxy + decay_sq * s.sxx
            - 2.0 * theta * (1.0 - decay) * (s.sy - decay * s.sx)
            + n * theta * theta * (1.0 - decay).powi(2);
        let sigma_sq = 2.0 * mu * b / a;
        if !(sigma_sq > 0.0 && sigma_sq.is_finite()) {
            return Err(OuError::NonPositiveVariance(sigma_sq));
        }

        let log_likelihood = self.log_likelihood(x, theta, mu, sigma_sq);

        Ok(OuParams {
            theta,
            mu,
            sigma: sigma_sq.sqrt(),
            sigma_sq,
            log_likelihood,
            stats: s,
        })
    }

    /// Log-likelihood of `x` under the OU transition density
    pub fn log_likelihood(&self, x: &[f64], theta: f64, mu: f64, sigma_sq: f64) -> f64 {
        let dt = self.dt;
        let n = x.len() as f64;

        // Conditional variance of x_i given x_{i-1}
        let tau_sq = sigma_sq * (1.0 - (-2.0 * mu * dt).exp()) / (2.0 * mu);
        let tau = tau_sq.sqrt();
        let c = 1.0 / (2.0 * n * tau_sq);

        let decay = (-mu * dt).exp();
        let drift = theta * (1.0 - decay);
        let sq_sum: f64 = x
            .windows(2)
            .map(|pair| (pair[1] - pair[0] * decay - drift).powi(2))
            .sum();

        -0.5 * (2.0 * std::f64::consts::PI).ln() - tau.ln() - c * sq_sum
    }
}

/// Errors from the OLS half-life regression
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HalfLifeError {
    #[error("Insufficient data: need at least 3 observations, got {0}")]
    InsufficientData(usize),
    #[error("Singular regression design (constant series)")]
    Singular,
    #[error("Series is not mean reverting (slope {0} >= 0)")]
    NotMeanReverting(f64),
}

/// Half-life of mean reversion, in samples, from an OLS fit of
/// dx_i = a + b * x_{i-1}: half_life = -ln(2) / b
pub fn estimate_half_life(x: &[f64]) -> Result<f64, HalfLifeError> {
    if x.len() < 3 {
        return Err(HalfLifeError::InsufficientData(x.len()));
    }

    let m = (x.len() - 1) as f64;
    let lagged = &x[..x.len() - 1];
    let mean_lag = lagged.iter().sum::<f64>() / m;
    let mean_diff = x.windows(2).map(|w| w[1] - w[0]).sum::<f64>() / m;

    let mut cov = 0.0;
    let mut var = 0.0;
    for pair in x.windows(2) {
        let dl = pair[0] - mean_lag;
        cov += dl * ((pair[1] - pair[0]) - mean_diff);
        var += dl * dl;
    }

    if var < 1e-300 {
        return Err(HalfLifeError::Singular);
    }

    let slope = cov / var;
    if slope >= 0.0 {
        return Err(HalfLifeError::NotMeanReverting(slope));
    }

    Ok(-std::f64::consts::LN_2 / slope)
}
