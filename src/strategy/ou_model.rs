//! OU Spread Model
//!
//! Default fit-and-decide object for the pairs engine: trains by hedge
//! ratio grid search, scores by z-score of the spread against its history,
//! and runs the cointegration check on every freshly fitted spread.

use crate::ports::strategy::SpreadModel;
use crate::strategy::cointegration::{AlwaysCointegrated, CointegrationCheck};
use crate::strategy::hedge_params::HedgeParameters;
use crate::strategy::hedge_search::{HedgeRatioSearch, SearchError};
use crate::strategy::params::PairsConfig;
use crate::strategy::zscore::{SpreadWindow, ZScoreResult};

pub struct OuSpreadModel {
    search: HedgeRatioSearch,
    window: SpreadWindow,
    hedge: Option<HedgeParameters>,
    check: Box<dyn CointegrationCheck>,
    cointegrated: bool,
}

impl OuSpreadModel {
    pub fn new(search: HedgeRatioSearch) -> Self {
        Self {
            search,
            window: SpreadWindow::new(),
            hedge: None,
            check: Box::new(AlwaysCointegrated),
            cointegrated: false,
        }
    }

    pub fn from_config(config: &PairsConfig) -> Result<Self, SearchError> {
        let search = HedgeRatioSearch::with_grid(
            config.dt,
            config.notional_a,
            config.hedge_grid(),
            config.search.objective,
        )?;
        Ok(Self::new(search))
    }

    pub fn with_check<C>(mut self, check: C) -> Self
    where
        C: CointegrationCheck + 'static,
    {
        self.check = Box::new(check);
        self
    }

    pub fn hedge(&self) -> Option<&HedgeParameters> {
        self.hedge.as_ref()
    }

    pub fn search(&self) -> &HedgeRatioSearch {
        &self.search
    }

}

impl SpreadModel for OuSpreadModel {
    fn train(&mut self, leg0: &[f64], leg1: &[f64]) -> Result<HedgeParameters, SearchError> {
        let outcome = self.search.optimise(leg0, leg1)?;
        let hedge = outcome.hedge;

        let spread = hedge.spread(leg0, leg1);
        self.cointegrated = self.check.is_cointegrated(&spread);

        tracing::info!(
            alpha = hedge.alpha(),
            beta = hedge.beta(),
            b = hedge.b,
            theta = hedge.ou_params.theta,
            mu = hedge.ou_params.mu,
            sigma = hedge.ou_params.sigma,
            log_likelihood = hedge.ou_params.log_likelihood,
            admissible = outcome.candidates.admissible.len(),
            rejected = outcome.candidates.rejected.len(),
            cointegrated = self.cointegrated,
            "hedge fitted"
        );

        self.window.rebuild(spread);
        self.hedge = Some(hedge.clone());
        Ok(hedge)
    }

    fn score(&mut self, p0: f64, p1: f64) -> Option<ZScoreResult> {
        let hedge = self.hedge.as_ref()?;
        self.window.push(hedge.spread_at(p0, p1));
        self.window.calculate()
    }

    fn is_cointegrated(&self) -> bool {
        self.cointegrated
    }

    fn spread_history(&self) -> Vec<f64> {
        self.window.values().to_vec()
    }

    fn restore(&mut self, hedge: HedgeParameters, cointegrated: bool, spreads: &[f64]) {
        self.window.rebuild(spreads.iter().copied());
        self.hedge = Some(hedge);
        self.cointegrated = cointegrated;
    }
}
