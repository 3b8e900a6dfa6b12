//! Strategy Layer - OU hedge fitting and spread scoring
//!
//! Statistical core of the pairs strategy:
//! - Closed-form OU maximum likelihood fit of a spread series
//! - Grid search over the leg-1 notional for the best-fitting spread
//! - Z-score of the live spread against its history
//! - Cointegration predicate consulted at training time
//! - Seeded Brownian / OU path simulation
//!
//! `OuSpreadModel` bundles these into the `SpreadModel` the engine drives.

pub mod cointegration;
pub mod hedge_params;
pub mod hedge_search;
pub mod ou_estimator;
pub mod ou_model;
pub mod params;
pub mod simulation;
pub mod zscore;

pub use cointegration::{AlwaysCointegrated, CointegrationCheck, DickeyFullerCheck, Significance};
pub use hedge_params::HedgeParameters;
pub use hedge_search::{
    HedgeCandidate, HedgeCandidates, HedgeGrid, HedgeRatioSearch, Objective, RejectedCandidate,
    SearchError, SearchOutcome,
};
pub use ou_estimator::{estimate_half_life, HalfLifeError, OuError, OuEstimator, OuParams, SufficientStats};
pub use ou_model::OuSpreadModel;
pub use params::{ConfigError, PairsConfig, SearchConfig, SizingConfig};
pub use simulation::{BrownianMotion, CointegratedPair, OuProcess, SimulationError};
pub use zscore::{zscore, SpreadWindow, ZScoreResult};
