//! Hedge Ratio Search
//!
//! Grid search over the notional B allocated to leg 1. Each grid point
//! defines a candidate spread x = alpha*S1 - beta*S2 which is fitted with
//! the OU estimator; the winner maximises the chosen objective.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::strategy::hedge_params::HedgeParameters;
use crate::strategy::ou_estimator::{OuError, OuEstimator, OuParams};

/// Number of grid points in the default search
pub const DEFAULT_GRID_POINTS: usize = 1000;

/// Criterion used to pick the winning candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    /// Highest log-likelihood
    #[default]
    LogLikelihood,
    /// Fastest mean reversion (largest mu)
    MeanReversion,
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Objective::LogLikelihood => write!(f, "log_likelihood"),
            Objective::MeanReversion => write!(f, "mean_reversion"),
        }
    }
}

impl FromStr for Objective {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "log_likelihood" => Ok(Objective::LogLikelihood),
            "mean_reversion" => Ok(Objective::MeanReversion),
            other => Err(SearchError::UnknownObjective(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    #[error("No admissible fit: all {0} grid candidates rejected")]
    Exhausted(usize),
    #[error("Price series lengths differ: {0} vs {1}")]
    LengthMismatch(usize, usize),
    #[error("Insufficient data: need at least 2 prices, got {0}")]
    InsufficientData(usize),
    #[error("Initial price must be positive and finite, got {0}")]
    InvalidInitialPrice(f64),
    #[error("Notional A must be positive and finite, got {0}")]
    InvalidNotional(f64),
    #[error("Empty candidate grid")]
    EmptyGrid,
    #[error("Unknown objective: {0} (expected log_likelihood or mean_reversion)")]
    UnknownObjective(String),
    #[error(transparent)]
    Estimator(#[from] OuError),
}

/// Candidate notionals for leg 1
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HedgeGrid {
    values: Vec<f64>,
}

impl HedgeGrid {
    /// `num` evenly spaced values from `start` to `end` inclusive
    pub fn linspace(start: f64, end: f64, num: usize) -> Self {
        let values = match num {
            0 => Vec::new(),
            1 => vec![start],
            _ => {
                let step = (end - start) / (num - 1) as f64;
                (0..num).map(|i| start + step * i as f64).collect()
            }
        };
        Self { values }
    }

    /// Default grid: 0.001*A up to A at resolution 0.001*A
    pub fn for_notional(a: f64) -> Self {
        Self::uniform(a, DEFAULT_GRID_POINTS)
    }

    /// `points` values from A/points up to A at resolution A/points
    pub fn uniform(a: f64, points: usize) -> Self {
        if points == 0 {
            return Self { values: Vec::new() };
        }
        let resolution = a / points as f64;
        Self::linspace(resolution, a, points)
    }

    /// Explicit list of candidate notionals, kept in the given order
    pub fn from_values(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Admissible grid point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HedgeCandidate {
    /// Notional on leg 1
    pub b: f64,
    pub ou_params: OuParams,
}

/// Grid point whose fit was inadmissible
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedCandidate {
    pub b: f64,
    pub reason: OuError,
}

/// All fits produced by one search, in grid order
#[derive(Debug, Clone, Default)]
pub struct HedgeCandidates {
    pub admissible: Vec<HedgeCandidate>,
    pub rejected: Vec<RejectedCandidate>,
}

impl HedgeCandidates {
    /// Candidate with the highest log-likelihood, first occurrence on ties
    pub fn max_log_likelihood(&self) -> Option<&HedgeCandidate> {
        self.best_by(|c| c.ou_params.log_likelihood)
    }

    /// Candidate with the fastest mean reversion, first occurrence on ties
    pub fn max_mean_reversion(&self) -> Option<&HedgeCandidate> {
        self.best_by(|c| c.ou_params.mu)
    }

    pub fn best(&self, objective: Objective) -> Option<&HedgeCandidate> {
        match objective {
            Objective::LogLikelihood => self.max_log_likelihood(),
            Objective::MeanReversion => self.max_mean_reversion(),
        }
    }

    fn best_by<F>(&self, score: F) -> Option<&HedgeCandidate>
    where
        F: Fn(&HedgeCandidate) -> f64,
    {
        let mut iter = self.admissible.iter();
        let mut best = iter.next()?;
        for candidate in iter {
            if score(candidate) > score(best) {
                best = candidate;
            }
        }
        Some(best)
    }

    /// Log-likelihoods of admissible candidates, in grid order
    pub fn log_likelihoods(&self) -> Vec<f64> {
        self.admissible.iter().map(|c| c.ou_params.log_likelihood).collect()
    }

    /// Notionals of admissible candidates, in grid order
    pub fn b_values(&self) -> Vec<f64> {
        self.admissible.iter().map(|c| c.b).collect()
    }

    pub fn total(&self) -> usize {
        self.admissible.len() + self.rejected.len()
    }
}

/// Result of a successful search
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub hedge: HedgeParameters,
    pub candidates: HedgeCandidates,
}

/// Grid search over leg-1 notionals for a fixed leg-0 notional `a`
#[derive(Debug, Clone)]
pub struct HedgeRatioSearch {
    estimator: OuEstimator,
    a: f64,
    grid: HedgeGrid,
    objective: Objective,
}

impl HedgeRatioSearch {
    /// Search with the default grid for notional `a`
    pub fn new(dt: f64, a: f64, objective: Objective) -> Result<Self, SearchError> {
        Self::with_grid(dt, a, HedgeGrid::for_notional(a), objective)
    }

    pub fn with_grid(
        dt: f64,
        a: f64,
        grid: HedgeGrid,
        objective: Objective,
    ) -> Result<Self, SearchError> {
        let estimator = OuEstimator::new(dt)?;
        if !(a.is_finite() && a > 0.0) {
            return Err(SearchError::InvalidNotional(a));
        }
        if grid.is_empty() {
            return Err(SearchError::EmptyGrid);
        }
        Ok(Self {
            estimator,
            a,
            grid,
            objective,
        })
    }

    pub fn objective(&self) -> Objective {
        self.objective
    }

    pub fn grid(&self) -> &HedgeGrid {
        &self.grid
    }

    /// Fit every grid point, keeping rejected points for diagnostics
    pub fn candidates(&self, asset1: &[f64], asset2: &[f64]) -> Result<HedgeCandidates, SearchError> {
        let (s1_0, s2_0) = validate_inputs(asset1, asset2)?;
        let alpha = self.a / s1_0;

        let mut candidates = HedgeCandidates::default();
        for &b in self.grid.values() {
            let beta = b / s2_0;
            let spread: Vec<f64> = asset1
                .iter()
                .zip(asset2)
                .map(|(p1, p2)| alpha * p1 - beta * p2)
                .collect();

            match self.estimator.fit(&spread) {
                Ok(ou_params) => candidates.admissible.push(HedgeCandidate { b, ou_params }),
                Err(reason) => {
                    tracing::debug!(b, %reason, "hedge candidate rejected");
                    candidates.rejected.push(RejectedCandidate { b, reason });
                }
            }
        }

        Ok(candidates)
    }

    /// Run the grid and select the winning hedge
    pub fn optimise(&self, asset1: &[f64], asset2: &[f64]) -> Result<SearchOutcome, SearchError> {
        let candidates = self.candidates(asset1, asset2)?;

        let best = candidates
            .best(self.objective)
            .ok_or(SearchError::Exhausted(candidates.total()))?;

        let hedge = HedgeParameters::new(
            best.ou_params.clone(),
            self.a,
            best.b,
            asset1[0],
            asset2[0],
        );

        Ok(SearchOutcome { hedge, candidates })
    }
}

fn validate_inputs(asset1: &[f64], asset2: &[f64]) -> Result<(f64, f64), SearchError> {
    if asset1.len() != asset2.len() {
        return Err(SearchError::LengthMismatch(asset1.len(), asset2.len()));
    }
    if asset1.len() < 2 {
        return Err(SearchError::InsufficientData(asset1.len()));
    }
    let (s1_0, s2_0) = (asset1[0], asset2[0]);
    for p in [s1_0, s2_0] {
        if !(p.is_finite() && p > 0.0) {
            return Err(SearchError::InvalidInitialPrice(p));
        }
    }
    Ok((s1_0, s2_0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::simulation::{CointegratedPair, OuProcess};
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn simulated_pair(seed: u64) -> (Vec<f64>, Vec<f64>) {
        let pair = CointegratedPair {
            hedge: 2.0,
            leg1_start: 50.0,
            leg1_volatility: 0.3,
            spread: OuProcess::new(0.0, 3.0, 0.5, 0.0),
        };
        pair.generate(&mut StdRng::seed_from_u64(seed), 500, 1.0 / 24.0).unwrap()
    }

    #[test]
    fn test_default_grid() {
        let grid = HedgeGrid::for_notional(1.0);
        assert_eq!(grid.len(), 1000);
        assert_relative_eq!(grid.values()[0], 0.001, epsilon = 1e-12);
        assert_relative_eq!(grid.values()[1], 0.002, epsilon = 1e-12);
        assert_relative_eq!(grid.values()[999], 1.0, epsilon = 1e-12);

        let scaled = HedgeGrid::for_notional(250.0);
        assert_relative_eq!(scaled.values()[0], 0.25, epsilon = 1e-9);
        assert_relative_eq!(scaled.values()[999], 250.0, epsilon = 1e-9);
    }

    #[test]
    fn test_linspace_edges() {
        assert!(HedgeGrid::linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(HedgeGrid::linspace(0.5, 1.0, 1).values(), &[0.5]);
    }

    #[test]
    fn test_objective_parsing() {
        assert_eq!("log_likelihood".parse::<Objective>().unwrap(), Objective::LogLikelihood);
        assert_eq!("mean_reversion".parse::<Objective>().unwrap(), Objective::MeanReversion);
        assert!(matches!(
            "mu".parse::<Objective>(),
            Err(SearchError::UnknownObjective(_))
        ));
        assert_eq!(Objective::MeanReversion.to_string(), "mean_reversion");
    }

    #[test]
    fn test_constructor_validation() {
        assert!(matches!(
            HedgeRatioSearch::new(0.0, 1.0, Objective::LogLikelihood),
            Err(SearchError::Estimator(OuError::InvalidDt(_)))
        ));
        assert!(matches!(
            HedgeRatioSearch::new(1.0, 0.0, Objective::LogLikelihood),
            Err(SearchError::InvalidNotional(_))
        ));
        assert!(matches!(
            HedgeRatioSearch::with_grid(1.0, 1.0, HedgeGrid::from_values(vec![]), Objective::LogLikelihood),
            Err(SearchError::EmptyGrid)
        ));
    }

    #[test]
    fn test_input_validation() {
        let search = HedgeRatioSearch::new(1.0, 1.0, Objective::LogLikelihood).unwrap();
        assert_eq!(
            search.optimise(&[1.0, 2.0], &[1.0]).unwrap_err(),
            SearchError::LengthMismatch(2, 1)
        );
        assert_eq!(
            search.optimise(&[1.0], &[1.0]).unwrap_err(),
            SearchError::InsufficientData(1)
        );
        assert_eq!(
            search.optimise(&[0.0, 1.0], &[1.0, 1.0]).unwrap_err(),
            SearchError::InvalidInitialPrice(0.0)
        );
    }

    #[test]
    fn test_selects_max_log_likelihood() {
        let (leg0, leg1) = simulated_pair(17);
        let search = HedgeRatioSearch::new(1.0 / 24.0, 1.0, Objective::LogLikelihood).unwrap();
        let outcome = search.optimise(&leg0, &leg1).unwrap();

        let best = outcome.hedge.ou_params.log_likelihood;
        assert!(!outcome.candidates.admissible.is_empty());
        for candidate in &outcome.candidates.admissible {
            assert!(best >= candidate.ou_params.log_likelihood);
        }
        assert_eq!(outcome.candidates.total(), 1000);
        assert_eq!(outcome.hedge.a, 1.0);
        assert_eq!(outcome.hedge.series1_initial, leg0[0]);
        assert_eq!(outcome.hedge.series2_initial, leg1[0]);
    }

    #[test]
    fn test_selects_max_mean_reversion() {
        let (leg0, leg1) = simulated_pair(23);
        let search = HedgeRatioSearch::new(1.0 / 24.0, 1.0, Objective::MeanReversion).unwrap();
        let outcome = search.optimise(&leg0, &leg1).unwrap();

        let best = outcome.hedge.ou_params.mu;
        for candidate in &outcome.candidates.admissible {
            assert!(best >= candidate.ou_params.mu);
        }
    }

    #[test]
    fn test_ties_resolved_by_grid_order() {
        let ou = |ll: f64| OuParams {
            theta: 0.0,
            mu: 1.0,
            sigma: 1.0,
            sigma_sq: 1.0,
            log_likelihood: ll,
            stats: crate::strategy::ou_estimator::SufficientStats {
                sx: 0.0,
                sy: 0.0,
                sxx: 0.0,
                syy: 0.0,
                sxy: 0.0,
            },
        };
        let candidates = HedgeCandidates {
            admissible: vec![
                HedgeCandidate { b: 0.1, ou_params: ou(1.0) },
                HedgeCandidate { b: 0.2, ou_params: ou(2.0) },
                HedgeCandidate { b: 0.3, ou_params: ou(2.0) },
            ],
            rejected: vec![],
        };

        assert_eq!(candidates.max_log_likelihood().unwrap().b, 0.2);
        assert_eq!(candidates.max_mean_reversion().unwrap().b, 0.1);
        assert_eq!(candidates.b_values(), vec![0.1, 0.2, 0.3]);
        assert_eq!(candidates.log_likelihoods(), vec![1.0, 2.0, 2.0]);
    }

    #[test]
    fn test_exhausted_grid() {
        // Two trending legs: every spread is a trend, no admissible fit
        let leg0: Vec<f64> = (1..=20).map(|i| 100.0 + i as f64).collect();
        let leg1: Vec<f64> = (1..=20).map(|i| 50.0 - 0.5 * i as f64).collect();
        let grid = HedgeGrid::from_values(vec![0.2, 0.5, 0.8]);
        let search = HedgeRatioSearch::with_grid(1.0, 1.0, grid, Objective::LogLikelihood).unwrap();

        let candidates = search.candidates(&leg0, &leg1).unwrap();
        assert!(candidates.admissible.is_empty());
        assert_eq!(candidates.rejected.len(), 3);
        assert_eq!(search.optimise(&leg0, &leg1).unwrap_err(), SearchError::Exhausted(3));
    }
}
