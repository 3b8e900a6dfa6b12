//! Pairs Engine
//!
//! Tick-driven state machine for the OU pairs strategy. Buffers prices,
//! retrains the spread model on schedule while flat, turns z-scores into
//! entries and exits through the order router, and folds order
//! notifications back into the trading state.
//!
//! Every tick and every notification is processed to completion before the
//! next one; all methods take `&mut self`.

use chrono::Utc;
use std::collections::VecDeque;
use thiserror::Error;

use crate::domain::events::{DecisionRecord, EventKind, EventLog};
use crate::domain::order::{Direction, Leg, OrderHandle, OrderNotification};
use crate::domain::persistence::EngineSnapshot;
use crate::domain::signal::{confidence, Decision};
use crate::domain::sizing::{PositionSizer, SizingOutcome};
use crate::domain::trading_state::{decide, NotificationOutcome, PositionState, TradingState};
use crate::ports::execution::OrderRouter;
use crate::ports::strategy::SpreadModel;
use crate::strategy::params::{ConfigError, PairsConfig};
use crate::strategy::zscore::ZScoreResult;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

/// Aligned price buffers for both legs
#[derive(Debug, Clone)]
pub struct PriceHistory {
    leg0: VecDeque<f64>,
    leg1: VecDeque<f64>,
    capacity: Option<usize>,
}

impl PriceHistory {
    /// `capacity = None` keeps the full expanding history
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            leg0: VecDeque::new(),
            leg1: VecDeque::new(),
            capacity,
        }
    }

    pub fn push(&mut self, p0: f64, p1: f64) {
        self.leg0.push_back(p0);
        self.leg1.push_back(p1);
        if let Some(cap) = self.capacity {
            while self.leg0.len() > cap {
                self.leg0.pop_front();
                self.leg1.pop_front();
            }
        }
    }

    pub fn len(&self) -> usize {
        self.leg0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leg0.is_empty()
    }

    /// Copies of both buffers, oldest first
    pub fn to_vecs(&self) -> (Vec<f64>, Vec<f64>) {
        (
            self.leg0.iter().copied().collect(),
            self.leg1.iter().copied().collect(),
        )
    }
}

/// Status snapshot of the engine
#[derive(Debug, Clone, PartialEq)]
pub struct EngineStatus {
    pub position: PositionState,
    pub trained: bool,
    pub pending_orders: usize,
    pub steps_since_train: usize,
    pub buffered_prices: usize,
    pub step: u64,
    pub current_zscore: Option<f64>,
}

pub struct PairsEngine<M: SpreadModel, R: OrderRouter> {
    config: PairsConfig,
    model: M,
    router: R,
    sizer: PositionSizer,
    state: TradingState,
    history: PriceHistory,
    events: EventLog,
    step: u64,
    last_zscore: Option<ZScoreResult>,
}

impl<M: SpreadModel, R: OrderRouter> PairsEngine<M, R> {
    /// Create a flat, untrained engine
    pub fn new(config: PairsConfig, model: M, router: R) -> Result<Self, EngineError> {
        config.validate()?;

        tracing::info!(
            z_entry = config.z_entry,
            z_exit = config.z_exit,
            num_train_initial = config.num_train_initial,
            num_test = config.num_test,
            fixed_window = config.use_fixed_train_size,
            "Pairs engine initialised"
        );

        Ok(Self {
            sizer: PositionSizer::new(&config.sizing),
            history: PriceHistory::new(config.history_capacity()),
            config,
            model,
            router,
            state: TradingState::new(),
            events: EventLog::new(),
            step: 0,
            last_zscore: None,
        })
    }

    /// Resume a session from a snapshot
    pub fn restore(
        config: PairsConfig,
        model: M,
        router: R,
        snapshot: EngineSnapshot,
    ) -> Result<Self, EngineError> {
        snapshot.validate().map_err(EngineError::Snapshot)?;

        let mut engine = Self::new(config, model, router)?;
        for (&p0, &p1) in snapshot.leg0.iter().zip(&snapshot.leg1) {
            engine.history.push(p0, p1);
        }

        if let Some(hedge) = snapshot.state.hedge.clone() {
            engine.model.restore(hedge, snapshot.cointegrated, &snapshot.spreads);
        }

        engine.state = snapshot.state;
        engine.step = snapshot.step;

        tracing::info!(
            step = engine.step,
            position = ?engine.state.position(),
            pending = engine.state.pending_entry.len() + engine.state.pending_exit.len(),
            "Pairs engine restored from snapshot"
        );

        Ok(engine)
    }

    /// Process one price update
    ///
    /// Returns the decision acted on this tick; entries that were gated or
    /// could not be sized come back as `Hold`.
    pub fn on_tick(&mut self, p0: Option<f64>, p1: Option<f64>) -> Decision {
        self.step += 1;

        let (p0, p1) = match (valid_price(p0), valid_price(p1)) {
            (Some(p0), Some(p1)) => (p0, p1),
            _ => {
                tracing::warn!(step = self.step, ?p0, ?p1, "Dropping tick with missing price");
                self.record(
                    DecisionRecord::new(self.step, EventKind::MissingPrice)
                        .with_detail(format!("leg0={:?} leg1={:?}", p0, p1)),
                );
                return Decision::Hold;
            }
        };

        self.history.push(p0, p1);
        self.state.steps_since_train += 1;

        if !self.state.is_trained() {
            if self.history.len() >= self.config.num_train_initial {
                self.retrain();
            }
        } else if self.state.steps_since_train >= self.config.num_test && self.state.is_flat() {
            self.retrain();
        }

        if !self.state.is_trained() {
            tracing::debug!(
                step = self.step,
                buffered = self.history.len(),
                needed = self.config.num_train_initial,
                "Warming up"
            );
            return Decision::Hold;
        }

        let Some(z) = self.model.score(p0, p1) else {
            tracing::debug!(step = self.step, "Spread history has no dispersion, holding");
            return Decision::Hold;
        };
        self.last_zscore = Some(z);

        match decide(&self.state, z.z_score, self.config.z_entry, self.config.z_exit) {
            Decision::Enter(direction) => self.enter(direction, &z, p0, p1),
            Decision::Exit(direction) => self.exit(direction, &z),
            Decision::Hold => {
                tracing::debug!(
                    step = self.step,
                    "Spread {:.6} | Z-score: {:.2} | Action: HOLD",
                    z.current_spread,
                    z.z_score
                );
                Decision::Hold
            }
        }
    }

    /// Fold an order completion into the trading state
    pub fn on_order_notification(&mut self, notification: OrderNotification) -> NotificationOutcome {
        let outcome = self.state.apply_notification(&notification);
        let handle = notification.handle;

        match outcome {
            NotificationOutcome::Unknown => {
                tracing::warn!(%handle, status = ?notification.status, "Notification for unknown order ignored");
            }
            NotificationOutcome::Pending { remaining } => {
                tracing::debug!(%handle, status = ?notification.status, remaining, "Order leg done");
            }
            NotificationOutcome::Opened(direction) => {
                tracing::info!(%handle, "Position opened: {}", direction);
                self.record(
                    self.hedged_record(EventKind::PositionOpened)
                        .with_detail(direction.to_string()),
                );
            }
            NotificationOutcome::EntryRejected(direction) => {
                tracing::info!(%handle, status = ?notification.status, "Entry {} not filled, staying flat", direction);
                self.record(
                    self.hedged_record(EventKind::OrderRejected)
                        .with_detail(format!("entry {} {:?}", direction, notification.status)),
                );
            }
            NotificationOutcome::Closed => {
                tracing::info!(%handle, "Position closed");
                self.record(self.hedged_record(EventKind::PositionClosed));
            }
            NotificationOutcome::ExitRejected => {
                tracing::info!(%handle, status = ?notification.status, "Exit not filled, position still open");
                self.record(
                    self.hedged_record(EventKind::OrderRejected)
                        .with_detail(format!("exit {:?}", notification.status)),
                );
            }
        }

        outcome
    }

    fn retrain(&mut self) {
        let (leg0, leg1) = self.history.to_vecs();
        match self.model.train(&leg0, &leg1) {
            Ok(hedge) => {
                tracing::info!(
                    step = self.step,
                    prices = leg0.len(),
                    "Retrained: alpha {:.6} beta {:.6} mu {:.4} logL {:.4}",
                    hedge.alpha(),
                    hedge.beta(),
                    hedge.ou_params.mu,
                    hedge.ou_params.log_likelihood
                );
                self.state.mark_trained(hedge);
                self.record(self.hedged_record(EventKind::Retrain));
            }
            Err(e) => {
                tracing::warn!(
                    step = self.step,
                    error = %e,
                    trained = self.state.is_trained(),
                    "Retrain failed, keeping previous hedge"
                );
                self.record(self.hedged_record(EventKind::RetrainFailed).with_detail(e.to_string()));
            }
        }
    }

    fn enter(&mut self, direction: Direction, z: &ZScoreResult, p0: f64, p1: f64) -> Decision {
        if self.config.require_cointegrated && !self.model.is_cointegrated() {
            tracing::info!(step = self.step, z = z.z_score, "Entry {} suppressed: spread not cointegrated", direction);
            self.record(
                self.hedged_record(EventKind::EntrySuppressed)
                    .with_z_score(z.z_score)
                    .with_detail(direction.to_string()),
            );
            return Decision::Hold;
        }

        let Some(ratio) = self.state.hedge.as_ref().map(|h| h.notional_ratio()) else {
            return Decision::Hold;
        };

        let cash = self.router.available_cash();
        let quantities = match self.sizer.size(cash, ratio, p0, p1) {
            SizingOutcome::Sized(q) => q,
            SizingOutcome::InsufficientCapital { budget } => {
                tracing::info!(step = self.step, cash, budget, "Entry {} skipped: insufficient capital", direction);
                self.record(
                    self.hedged_record(EventKind::InsufficientCapital)
                        .with_z_score(z.z_score)
                        .with_detail(format!("budget {:.2}", budget)),
                );
                return Decision::Hold;
            }
        };

        let mut handles = Vec::with_capacity(2);
        for (leg, quantity) in [(Leg::Leg0, quantities.n0), (Leg::Leg1, quantities.n1)] {
            let side = direction.entry_side(leg);
            match self.router.submit_market_order(leg, side, quantity) {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    tracing::warn!(%leg, ?side, quantity, error = %e, "Entry order rejected by router");
                    self.record(
                        self.hedged_record(EventKind::OrderRejected)
                            .with_detail(format!("{} {:?}: {}", leg, side, e)),
                    );
                }
            }
        }

        if handles.is_empty() {
            return Decision::Hold;
        }
        self.state.begin_entry(direction, handles);

        tracing::info!(
            step = self.step,
            n0 = quantities.n0,
            n1 = quantities.n1,
            realised_ratio = quantities.realised_ratio,
            confidence = confidence(z.z_score),
            "ENTER {} | Z-score: {:.2}",
            direction,
            z.z_score
        );
        let kind = match direction {
            Direction::Long => EventKind::EnterLong,
            Direction::Short => EventKind::EnterShort,
        };
        self.record(
            self.hedged_record(kind)
                .with_z_score(z.z_score)
                .with_detail(format!("n0={} n1={}", quantities.n0, quantities.n1)),
        );

        Decision::Enter(direction)
    }

    fn exit(&mut self, direction: Direction, z: &ZScoreResult) -> Decision {
        let mut handles: Vec<OrderHandle> = Vec::with_capacity(2);
        for leg in Leg::BOTH {
            match self.router.close_position(leg) {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    tracing::warn!(%leg, error = %e, "Close order rejected by router");
                    self.record(
                        self.hedged_record(EventKind::OrderRejected)
                            .with_detail(format!("close {}: {}", leg, e)),
                    );
                }
            }
        }

        if handles.is_empty() {
            return Decision::Hold;
        }
        self.state.begin_exit(handles);

        tracing::info!(step = self.step, "EXIT {} | Z-score: {:.2}", direction, z.z_score);
        let kind = match direction {
            Direction::Long => EventKind::ExitLong,
            Direction::Short => EventKind::ExitShort,
        };
        self.record(self.hedged_record(kind).with_z_score(z.z_score));

        Decision::Exit(direction)
    }

    fn hedged_record(&self, kind: EventKind) -> DecisionRecord {
        DecisionRecord::new(self.step, kind).with_hedge(self.state.hedge.as_ref())
    }

    fn record(&mut self, record: DecisionRecord) {
        self.events.push(record);
    }

    /// Capture everything needed to resume this session
    pub fn snapshot(&self) -> EngineSnapshot {
        let (leg0, leg1) = self.history.to_vecs();
        EngineSnapshot {
            state: self.state.clone(),
            leg0,
            leg1,
            step: self.step,
            cointegrated: self.model.is_cointegrated(),
            spreads: self.model.spread_history(),
            saved_at: Utc::now(),
        }
    }

    pub fn status(&self) -> EngineStatus {
        EngineStatus {
            position: self.state.position(),
            trained: self.state.is_trained(),
            pending_orders: self.state.pending_entry.len() + self.state.pending_exit.len(),
            steps_since_train: self.state.steps_since_train,
            buffered_prices: self.history.len(),
            step: self.step,
            current_zscore: self.last_zscore.map(|z| z.z_score),
        }
    }

    pub fn state(&self) -> &TradingState {
        &self.state
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn config(&self) -> &PairsConfig {
        &self.config
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn router(&self) -> &R {
        &self.router
    }

    pub fn router_mut(&mut self) -> &mut R {
        &mut self.router
    }

    pub fn history(&self) -> &PriceHistory {
        &self.history
    }

    pub fn last_zscore(&self) -> Option<&ZScoreResult> {
        self.last_zscore.as_ref()
    }
}

fn valid_price(p: Option<f64>) -> Option<f64> {
    p.filter(|p| p.is_finite() && *p > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{OrderStatus, Side};
    use crate::ports::execution::ExecutionError;
    use crate::strategy::hedge_params::HedgeParameters;
    use crate::strategy::hedge_search::SearchError;
    use crate::strategy::ou_estimator::{OuParams, SufficientStats};

    /// Model replaying a fixed z-score script, one value per scored tick
    struct ScriptedModel {
        zs: Vec<f64>,
        next: usize,
        trainings: usize,
        fail_training: bool,
        cointegrated: bool,
    }

    impl ScriptedModel {
        fn new(zs: Vec<f64>) -> Self {
            Self {
                zs,
                next: 0,
                trainings: 0,
                fail_training: false,
                cointegrated: true,
            }
        }
    }

    fn hedge() -> HedgeParameters {
        let ou = OuParams {
            theta: 0.0,
            mu: 2.0,
            sigma: 0.1,
            sigma_sq: 0.01,
            log_likelihood: 1.0,
            stats: SufficientStats {
                sx: 0.0,
                sy: 0.0,
                sxx: 0.0,
                syy: 0.0,
                sxy: 0.0,
            },
        };
        HedgeParameters::new(ou, 1.0, 1.0, 100.0, 50.0)
    }

    impl SpreadModel for ScriptedModel {
        fn train(&mut self, _leg0: &[f64], _leg1: &[f64]) -> Result<HedgeParameters, SearchError> {
            self.trainings += 1;
            if self.fail_training {
                return Err(SearchError::Exhausted(3));
            }
            Ok(hedge())
        }

        fn score(&mut self, _p0: f64, _p1: f64) -> Option<ZScoreResult> {
            let z = *self.zs.get(self.next)?;
            self.next += 1;
            Some(ZScoreResult {
                z_score: z,
                mean: 0.0,
                std_dev: 1.0,
                current_spread: z,
            })
        }

        fn is_cointegrated(&self) -> bool {
            self.cointegrated
        }

        fn spread_history(&self) -> Vec<f64> {
            self.zs[..self.next].to_vec()
        }

        fn restore(&mut self, _hedge: HedgeParameters, cointegrated: bool, _spreads: &[f64]) {
            self.cointegrated = cointegrated;
        }
    }

    /// Router that records orders and never completes them on its own
    #[derive(Default)]
    struct RecordingRouter {
        orders: Vec<(Leg, Option<Side>, f64)>,
        next: u64,
        cash: f64,
        fail: bool,
    }

    impl OrderRouter for RecordingRouter {
        fn submit_market_order(&mut self, leg: Leg, side: Side, quantity: f64) -> Result<OrderHandle, ExecutionError> {
            if self.fail {
                return Err(ExecutionError::Rejected("offline".to_string()));
            }
            self.orders.push((leg, Some(side), quantity));
            self.next += 1;
            Ok(OrderHandle(self.next))
        }

        fn close_position(&mut self, leg: Leg) -> Result<OrderHandle, ExecutionError> {
            self.orders.push((leg, None, 0.0));
            self.next += 1;
            Ok(OrderHandle(self.next))
        }

        fn available_cash(&self) -> f64 {
            self.cash
        }
    }

    fn config() -> PairsConfig {
        let mut config = PairsConfig::default().with_thresholds(2.0, 0.5).with_training(2, 100);
        config.sizing.risk_per_trade = 1.0;
        config
    }

    fn engine(zs: Vec<f64>) -> PairsEngine<ScriptedModel, RecordingRouter> {
        let router = RecordingRouter {
            cash: 10_000.0,
            ..Default::default()
        };
        PairsEngine::new(config(), ScriptedModel::new(zs), router).unwrap()
    }

    fn fill_all(engine: &mut PairsEngine<ScriptedModel, RecordingRouter>, status: OrderStatus) {
        let pending: Vec<OrderHandle> = engine
            .state()
            .pending_entry
            .iter()
            .chain(engine.state().pending_exit.iter())
            .copied()
            .collect();
        for handle in pending {
            engine.on_order_notification(OrderNotification::new(handle, status, Side::Buy));
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let bad = PairsConfig::default().with_thresholds(0.5, 1.0);
        let result = PairsEngine::new(bad, ScriptedModel::new(vec![]), RecordingRouter::default());
        assert!(matches!(result, Err(EngineError::Config(_))));
    }

    #[test]
    fn test_warm_up_holds() {
        let mut engine = engine(vec![0.0; 10]);
        assert_eq!(engine.on_tick(Some(100.0), Some(50.0)), Decision::Hold);
        assert!(!engine.state().is_trained());
        assert_eq!(engine.model().trainings, 0);
        assert!(engine.events().is_empty());

        engine.on_tick(Some(100.0), Some(50.0));
        assert!(engine.state().is_trained());
        assert_eq!(engine.state().steps_since_train, 0);
        assert_eq!(engine.events().count(EventKind::Retrain), 1);
    }

    #[test]
    fn test_missing_price_dropped() {
        let mut engine = engine(vec![0.0; 10]);
        engine.on_tick(Some(100.0), Some(50.0));

        for (p0, p1) in [(None, Some(50.0)), (Some(f64::NAN), Some(50.0)), (Some(100.0), Some(-1.0))] {
            let before = engine.state().clone();
            assert_eq!(engine.on_tick(p0, p1), Decision::Hold);
            assert_eq!(engine.state(), &before);
            assert_eq!(engine.history().len(), 1);
        }
        assert_eq!(engine.events().count(EventKind::MissingPrice), 3);
    }

    #[test]
    fn test_short_entry_then_exit() {
        // first scored tick is the training tick
        let mut engine = engine(vec![0.1, 1.0, 2.3, 2.1, 0.9, 0.4]);
        engine.on_tick(Some(100.0), Some(50.0));

        let mut decisions = Vec::new();
        for _ in 0..6 {
            let decision = engine.on_tick(Some(100.0), Some(50.0));
            if decision != Decision::Hold {
                fill_all(&mut engine, OrderStatus::Completed);
            }
            decisions.push(decision);
        }

        assert_eq!(
            decisions,
            vec![
                Decision::Hold,
                Decision::Hold,
                Decision::Enter(Direction::Short),
                Decision::Hold,
                Decision::Hold,
                Decision::Exit(Direction::Short),
            ]
        );
        assert_eq!(engine.events().count(EventKind::EnterShort), 1);
        assert_eq!(engine.events().count(EventKind::ExitShort), 1);
        assert!(engine.state().is_flat());

        let orders = &engine.router().orders;
        assert_eq!(orders.len(), 4);
        assert_eq!(orders[0].1, Some(Side::Sell));
        assert_eq!(orders[1].1, Some(Side::Buy));
    }

    #[test]
    fn test_hold_ticks_leave_no_records() {
        let mut engine = engine(vec![0.0; 50]);
        for _ in 0..50 {
            assert_eq!(engine.on_tick(Some(100.0), Some(50.0)), Decision::Hold);
        }
        assert_eq!(engine.events().len(), 1);
        assert_eq!(engine.events().count(EventKind::Retrain), 1);
    }

    #[test]
    fn test_snapshot_carries_spread_history() {
        let mut engine = engine(vec![0.1, 0.2, 0.3]);
        for _ in 0..3 {
            engine.on_tick(Some(100.0), Some(50.0));
        }
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.spreads, vec![0.1, 0.2]);
        assert_eq!(snapshot.leg0.len(), 3);
    }

    #[test]
    fn test_no_entry_while_pending() {
        let mut engine = engine(vec![0.0, 2.5, 2.6, 3.0, -3.0]);
        engine.on_tick(Some(100.0), Some(50.0));
        engine.on_tick(Some(100.0), Some(50.0));

        assert_eq!(engine.on_tick(Some(100.0), Some(50.0)), Decision::Enter(Direction::Short));
        for _ in 0..3 {
            assert_eq!(engine.on_tick(Some(100.0), Some(50.0)), Decision::Hold);
        }
        assert_eq!(engine.router().orders.len(), 2);
    }

    #[test]
    fn test_rejected_entry_allows_retry() {
        let mut engine = engine(vec![0.0, -2.5, -2.4]);
        engine.on_tick(Some(100.0), Some(50.0));
        engine.on_tick(Some(100.0), Some(50.0));

        assert_eq!(engine.on_tick(Some(100.0), Some(50.0)), Decision::Enter(Direction::Long));
        fill_all(&mut engine, OrderStatus::Margin);
        assert!(engine.state().is_flat());

        assert_eq!(engine.on_tick(Some(100.0), Some(50.0)), Decision::Enter(Direction::Long));
        assert_eq!(engine.events().count(EventKind::OrderRejected), 1);
    }

    #[test]
    fn test_cointegration_gate() {
        let mut engine = engine(vec![0.0, 2.5]);
        engine.model.cointegrated = false;
        engine.config.require_cointegrated = true;
        engine.on_tick(Some(100.0), Some(50.0));
        engine.on_tick(Some(100.0), Some(50.0));

        assert_eq!(engine.on_tick(Some(100.0), Some(50.0)), Decision::Hold);
        assert_eq!(engine.events().count(EventKind::EntrySuppressed), 1);
        assert!(engine.router().orders.is_empty());
    }

    #[test]
    fn test_insufficient_capital() {
        let mut engine = engine(vec![0.0, 2.5]);
        engine.router_mut().cash = 10.0;
        engine.on_tick(Some(100.0), Some(50.0));
        engine.on_tick(Some(100.0), Some(50.0));

        assert_eq!(engine.on_tick(Some(100.0), Some(50.0)), Decision::Hold);
        assert_eq!(engine.events().count(EventKind::InsufficientCapital), 1);
        assert!(engine.state().is_flat());
    }

    #[test]
    fn test_router_failure_leaves_state_flat() {
        let mut engine = engine(vec![0.0, 2.5]);
        engine.router_mut().fail = true;
        engine.on_tick(Some(100.0), Some(50.0));
        engine.on_tick(Some(100.0), Some(50.0));

        assert_eq!(engine.on_tick(Some(100.0), Some(50.0)), Decision::Hold);
        assert!(engine.state().is_flat());
        assert_eq!(engine.events().count(EventKind::OrderRejected), 2);
    }

    #[test]
    fn test_failed_initial_training_retries() {
        let mut engine = engine(vec![0.0; 10]);
        engine.model.fail_training = true;
        for _ in 0..4 {
            assert_eq!(engine.on_tick(Some(100.0), Some(50.0)), Decision::Hold);
        }
        assert!(!engine.state().is_trained());
        assert_eq!(engine.model().trainings, 3);
        assert_eq!(engine.events().count(EventKind::RetrainFailed), 3);
    }

    #[test]
    fn test_retrain_only_when_flat() {
        let mut config = config();
        config.num_test = 2;
        let router = RecordingRouter {
            cash: 10_000.0,
            ..Default::default()
        };
        let mut engine =
            PairsEngine::new(config, ScriptedModel::new(vec![0.0, 2.5, 2.4, 2.3, 2.2, 2.1]), router).unwrap();

        engine.on_tick(Some(100.0), Some(50.0));
        engine.on_tick(Some(100.0), Some(50.0));
        engine.on_tick(Some(100.0), Some(50.0));
        fill_all(&mut engine, OrderStatus::Completed);
        assert_eq!(engine.state().position(), PositionState::Short);

        for _ in 0..3 {
            engine.on_tick(Some(100.0), Some(50.0));
        }
        assert_eq!(engine.model().trainings, 1);
        assert!(engine.state().steps_since_train >= 2);
    }

    #[test]
    fn test_unknown_notification_ignored() {
        let mut engine = engine(vec![0.0]);
        let before = engine.state().clone();
        let outcome = engine.on_order_notification(OrderNotification::new(
            OrderHandle(42),
            OrderStatus::Completed,
            Side::Buy,
        ));
        assert_eq!(outcome, NotificationOutcome::Unknown);
        assert_eq!(engine.state(), &before);
    }

    #[test]
    fn test_price_history_capacity() {
        let mut history = PriceHistory::new(Some(2));
        history.push(1.0, 2.0);
        history.push(3.0, 4.0);
        history.push(5.0, 6.0);
        assert_eq!(history.to_vecs(), (vec![3.0, 5.0], vec![4.0, 6.0]));
    }
}
