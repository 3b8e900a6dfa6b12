//! Trading State
//!
//! Explicit state record of the pairs state machine plus the pure
//! transitions applied to it: `decide` maps a z-score to a decision and
//! `apply_notification` folds an order completion into the state.
//!
//! ```text
//!            z <= -z_entry                 all entry legs done, any filled
//!   FLAT ----------------> ENTRY PENDING ------------------------------> LONG
//!     ^   z >= z_entry          |                                       |
//!     |                         | all entry legs rejected               | z >= -z_exit
//!     |                         v                                       v
//!     +------------------------ FLAT          EXIT PENDING <------------+
//!     |                                            |
//!     +---------- all exit legs done, any filled --+
//! ```
//! SHORT mirrors LONG with the thresholds reflected.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::order::{Direction, OrderHandle, OrderNotification};
use crate::domain::signal::Decision;
use crate::strategy::hedge_params::HedgeParameters;

/// Current position, ignoring in-flight orders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionState {
    Flat,
    Long,
    Short,
}

/// Effect of one order notification on the state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// Handle not pending in either set
    Unknown,
    /// Handle cleared, other legs of the same pair still outstanding
    Pending { remaining: usize },
    /// Entry pair finished with at least one fill
    Opened(Direction),
    /// Entry pair finished without any fill
    EntryRejected(Direction),
    /// Exit pair finished with at least one fill
    Closed,
    /// Exit pair finished without any fill, position still open
    ExitRejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingState {
    pub is_long: bool,
    pub is_short: bool,
    pub pending_entry: BTreeSet<OrderHandle>,
    pub pending_exit: BTreeSet<OrderHandle>,
    pub steps_since_train: usize,
    pub hedge: Option<HedgeParameters>,
    /// Direction of the entry currently in flight
    pub entry_direction: Option<Direction>,
    /// Some leg of the in-flight entry filled
    pub entry_filled: bool,
    /// Some leg of the in-flight exit filled
    pub exit_filled: bool,
}

impl Default for TradingState {
    fn default() -> Self {
        Self::new()
    }
}

impl TradingState {
    pub fn new() -> Self {
        Self {
            is_long: false,
            is_short: false,
            pending_entry: BTreeSet::new(),
            pending_exit: BTreeSet::new(),
            steps_since_train: 0,
            hedge: None,
            entry_direction: None,
            entry_filled: false,
            exit_filled: false,
        }
    }

    pub fn position(&self) -> PositionState {
        match (self.is_long, self.is_short) {
            (true, _) => PositionState::Long,
            (_, true) => PositionState::Short,
            _ => PositionState::Flat,
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.pending_entry.is_empty() || !self.pending_exit.is_empty()
    }

    /// No open position and no outstanding orders
    pub fn is_flat(&self) -> bool {
        self.position() == PositionState::Flat && !self.has_pending()
    }

    pub fn is_trained(&self) -> bool {
        self.hedge.is_some()
    }

    /// Install a fresh hedge and restart the retraining countdown
    pub fn mark_trained(&mut self, hedge: HedgeParameters) {
        self.hedge = Some(hedge);
        self.steps_since_train = 0;
    }

    /// Record the orders of a new entry pair
    pub fn begin_entry<I>(&mut self, direction: Direction, handles: I)
    where
        I: IntoIterator<Item = OrderHandle>,
    {
        self.entry_direction = Some(direction);
        self.entry_filled = false;
        self.pending_entry.extend(handles);
    }

    /// Record the orders closing the current position
    pub fn begin_exit<I>(&mut self, handles: I)
    where
        I: IntoIterator<Item = OrderHandle>,
    {
        self.exit_filled = false;
        self.pending_exit.extend(handles);
    }

    /// Fold an order completion into the state
    pub fn apply_notification(&mut self, notification: &OrderNotification) -> NotificationOutcome {
        let filled = notification.status.is_filled();

        if self.pending_entry.remove(&notification.handle) {
            self.entry_filled |= filled;
            if !self.pending_entry.is_empty() {
                return NotificationOutcome::Pending {
                    remaining: self.pending_entry.len(),
                };
            }

            let opened = std::mem::take(&mut self.entry_filled);
            return match self.entry_direction.take() {
                Some(direction) if opened => {
                    self.is_long = direction == Direction::Long;
                    self.is_short = direction == Direction::Short;
                    NotificationOutcome::Opened(direction)
                }
                Some(direction) => NotificationOutcome::EntryRejected(direction),
                // entry orders without a recorded direction cannot open anything
                None => NotificationOutcome::Unknown,
            };
        }

        if self.pending_exit.remove(&notification.handle) {
            self.exit_filled |= filled;
            if !self.pending_exit.is_empty() {
                return NotificationOutcome::Pending {
                    remaining: self.pending_exit.len(),
                };
            }

            if std::mem::take(&mut self.exit_filled) {
                self.is_long = false;
                self.is_short = false;
                return NotificationOutcome::Closed;
            }
            return NotificationOutcome::ExitRejected;
        }

        NotificationOutcome::Unknown
    }
}

/// Map a z-score to a decision given the current state
///
/// Never enters or exits while any order is outstanding.
pub fn decide(state: &TradingState, z: f64, z_entry: f64, z_exit: f64) -> Decision {
    if state.has_pending() {
        return Decision::Hold;
    }

    match state.position() {
        PositionState::Long if z >= -z_exit => Decision::Exit(Direction::Long),
        PositionState::Short if z <= z_exit => Decision::Exit(Direction::Short),
        PositionState::Flat if z <= -z_entry => Decision::Enter(Direction::Long),
        PositionState::Flat if z >= z_entry => Decision::Enter(Direction::Short),
        _ => Decision::Hold,
    }
}
