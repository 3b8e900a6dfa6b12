//! Stochastic Path Simulation
//!
//! Seeded generators for Brownian motion, OU sample paths and synthetic
//! cointegrated price pairs. Every generator takes the random source as an
//! argument so a path is reproducible from its seed.

use rand::distributions::Distribution;
use rand::Rng;
use statrs::distribution::Normal;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("Invalid distribution parameters: {0}")]
    InvalidDistribution(String),
    #[error("Invalid process parameter: {0}")]
    InvalidParameter(String),
}

/// Brownian motion with normally distributed increments
#[derive(Debug, Clone, Copy)]
pub struct BrownianMotion {
    /// Mean of each increment
    pub mean: f64,
    /// Standard deviation of each increment
    pub std_dev: f64,
}

impl Default for BrownianMotion {
    fn default() -> Self {
        Self {
            mean: 0.0,
            std_dev: 1.0,
        }
    }
}

impl BrownianMotion {
    pub fn new(mean: f64, std_dev: f64) -> Self {
        Self { mean, std_dev }
    }

    /// Draw `n` independent increments dW
    pub fn increments<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        n: usize,
    ) -> Result<Vec<f64>, SimulationError> {
        let normal = Normal::new(self.mean, self.std_dev)
            .map_err(|e| SimulationError::InvalidDistribution(e.to_string()))?;
        Ok((0..n).map(|_| normal.sample(rng)).collect())
    }

    /// Cumulative path of length `n` with W(0) = 0
    pub fn path<R: Rng + ?Sized>(&self, rng: &mut R, n: usize) -> Result<Vec<f64>, SimulationError> {
        let dw = self.increments(rng, n)?;
        let mut w = Vec::with_capacity(n);
        let mut level = 0.0;
        // Last increment is dropped so the path keeps length n
        for step in dw {
            w.push(level);
            level += step;
        }
        Ok(w)
    }
}

/// OU process dX = mu(theta - X)dt + sigma dW
#[derive(Debug, Clone, Copy)]
pub struct OuProcess {
    /// Long-run mean
    pub theta: f64,
    /// Speed of mean reversion
    pub mu: f64,
    /// Volatility
    pub sigma: f64,
    /// Initial value
    pub x0: f64,
}

impl OuProcess {
    pub fn new(theta: f64, mu: f64, sigma: f64, x0: f64) -> Self {
        Self { theta, mu, sigma, x0 }
    }

    /// Sample `n` points spaced `dt` apart using the exact transition density
    pub fn sample<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        n: usize,
        dt: f64,
    ) -> Result<Vec<f64>, SimulationError> {
        if !(self.mu > 0.0) {
            return Err(SimulationError::InvalidParameter(format!("mu = {}", self.mu)));
        }
        if !(dt > 0.0) {
            return Err(SimulationError::InvalidParameter(format!("dt = {}", dt)));
        }

        let decay = (-self.mu * dt).exp();
        let drift = self.theta * (1.0 - decay);
        let vol = self.sigma * ((1.0 - decay * decay) / (2.0 * self.mu)).sqrt();
        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| SimulationError::InvalidDistribution(e.to_string()))?;

        let mut path = Vec::with_capacity(n);
        let mut x = self.x0;
        for _ in 0..n {
            path.push(x);
            x = x * decay + drift + vol * normal.sample(rng);
        }
        Ok(path)
    }
}

/// Two price legs tied by a stationary spread:
/// leg0 = hedge * leg1 + spread, leg1 a random walk
#[derive(Debug, Clone, Copy)]
pub struct CointegratedPair {
    /// Units of leg 1 per unit of leg 0
    pub hedge: f64,
    /// Starting price of leg 1
    pub leg1_start: f64,
    /// Per-step volatility of leg 1
    pub leg1_volatility: f64,
    /// Spread dynamics
    pub spread: OuProcess,
}

impl CointegratedPair {
    /// Generate `n` aligned prices for both legs
    pub fn generate<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        n: usize,
        dt: f64,
    ) -> Result<(Vec<f64>, Vec<f64>), SimulationError> {
        let walk = BrownianMotion::new(0.0, self.leg1_volatility).path(rng, n)?;
        let spread = self.spread.sample(rng, n, dt)?;

        let leg1: Vec<f64> = walk.iter().map(|w| self.leg1_start + w).collect();
        if let Some(min) = leg1.iter().copied().reduce(f64::min) {
            if min <= 0.0 {
                return Err(SimulationError::InvalidParameter(format!(
                    "leg 1 went non-positive ({:.4}); raise leg1_start",
                    min
                )));
            }
        }

        let leg0: Vec<f64> = leg1
            .iter()
            .zip(spread.iter())
            .map(|(p1, x)| self.hedge * p1 + x)
            .collect();

        Ok((leg0, leg1))
    }
}
