//! Paper Session Driver
//!
//! Replays aligned price series through a `PairsEngine` wired to the paper
//! broker, delivering order completions between ticks.

use serde::Serialize;

use crate::adapters::paper::PaperBroker;
use crate::application::engine::PairsEngine;
use crate::domain::events::EventKind;
use crate::domain::trading_state::PositionState;
use crate::ports::strategy::SpreadModel;

/// Summary of a replayed session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionReport {
    pub ticks: usize,
    pub retrains: usize,
    pub retrain_failures: usize,
    pub entries: usize,
    pub exits: usize,
    pub suppressed_entries: usize,
    pub fills: usize,
    pub final_position: PositionState,
    pub final_cash: f64,
    pub final_equity: f64,
}

/// Feed every tick of `leg0`/`leg1` (a `None` is a missing price)
pub fn run_paper_session<M: SpreadModel>(
    engine: &mut PairsEngine<M, PaperBroker>,
    leg0: &[Option<f64>],
    leg1: &[Option<f64>],
) -> SessionReport {
    let ticks = leg0.len().min(leg1.len());

    for (&p0, &p1) in leg0.iter().zip(leg1) {
        if let (Some(p0), Some(p1)) = (p0, p1) {
            engine.router_mut().mark(p0, p1);
        }
        engine.on_tick(p0, p1);

        for notification in engine.router_mut().drain_notifications() {
            engine.on_order_notification(notification);
        }
    }

    let events = engine.events();
    let report = SessionReport {
        ticks,
        retrains: events.count(EventKind::Retrain),
        retrain_failures: events.count(EventKind::RetrainFailed),
        entries: events.count(EventKind::EnterLong) + events.count(EventKind::EnterShort),
        exits: events.count(EventKind::ExitLong) + events.count(EventKind::ExitShort),
        suppressed_entries: events.count(EventKind::EntrySuppressed)
            + events.count(EventKind::InsufficientCapital),
        fills: engine.router().fills().len(),
        final_position: engine.state().position(),
        final_cash: engine.router().cash(),
        final_equity: engine.router().equity(),
    };

    tracing::info!(
        ticks = report.ticks,
        retrains = report.retrains,
        entries = report.entries,
        exits = report.exits,
        equity = report.final_equity,
        "Paper session finished"
    );

    report
}
