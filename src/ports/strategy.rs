use crate::strategy::hedge_params::HedgeParameters;
use crate::strategy::hedge_search::SearchError;
use crate::strategy::zscore::ZScoreResult;

/// Fit-and-decide object plugged into the pairs engine
///
/// The engine owns the price history and the trading state; the model owns
/// the hedge it fitted and the spread history derived from it.
pub trait SpreadModel {
    /// Fit a new hedge on the buffered prices and rebuild the spread history
    ///
    /// On error the previous hedge and spread history stay in force.
    fn train(&mut self, leg0: &[f64], leg1: &[f64]) -> Result<HedgeParameters, SearchError>;

    /// Append the spread of the latest prices and score it against the history
    ///
    /// None when untrained or the history has no dispersion.
    fn score(&mut self, p0: f64, p1: f64) -> Option<ZScoreResult>;

    /// Result of the cointegration check run at the last successful training
    fn is_cointegrated(&self) -> bool;

    /// Spread history the next score is computed against, oldest first
    fn spread_history(&self) -> Vec<f64>;

    /// Reinstall a previously fitted hedge together with its spread history
    fn restore(&mut self, hedge: HedgeParameters, cointegrated: bool, spreads: &[f64]);
}
