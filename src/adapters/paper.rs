//! Paper Broker
//!
//! In-memory order router for simulations and backtests. Market orders fill
//! at the last marked price; completions are queued and handed to the
//! driver, which forwards them to the engine after the tick.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::domain::order::{Leg, OrderHandle, OrderNotification, OrderStatus, Side};
use crate::ports::execution::{ExecutionError, OrderRouter};

/// One executed order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub handle: OrderHandle,
    pub leg: Leg,
    pub side: Side,
    pub quantity: f64,
    pub price: f64,
}

#[derive(Debug, Clone)]
pub struct PaperBroker {
    cash: f64,
    positions: [f64; 2],
    prices: [Option<f64>; 2],
    multipliers: [f64; 2],
    next_handle: u64,
    queued: VecDeque<OrderNotification>,
    fills: Vec<Fill>,
    /// Orders still to be rejected, with the status to reject them with
    forced_rejections: VecDeque<OrderStatus>,
}

impl PaperBroker {
    pub fn new(starting_cash: f64) -> Self {
        Self {
            cash: starting_cash,
            positions: [0.0; 2],
            prices: [None; 2],
            multipliers: [1.0; 2],
            next_handle: 0,
            queued: VecDeque::new(),
            fills: Vec::new(),
            forced_rejections: VecDeque::new(),
        }
    }

    pub fn with_multipliers(mut self, leg0: f64, leg1: f64) -> Self {
        self.multipliers = [leg0, leg1];
        self
    }

    /// Set the prices subsequent orders fill at
    pub fn mark(&mut self, p0: f64, p1: f64) {
        self.prices = [Some(p0), Some(p1)];
    }

    /// Reject the next `count` orders with `status` instead of filling them
    pub fn reject_next(&mut self, count: usize, status: OrderStatus) {
        self.forced_rejections.extend(std::iter::repeat(status).take(count));
    }

    /// Take all completions queued since the last call
    pub fn drain_notifications(&mut self) -> Vec<OrderNotification> {
        self.queued.drain(..).collect()
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn position(&self, leg: Leg) -> f64 {
        self.positions[leg.index()]
    }

    pub fn fills(&self) -> &[Fill] {
        &self.fills
    }

    /// Cash plus marked value of open positions
    pub fn equity(&self) -> f64 {
        Leg::BOTH.iter().fold(self.cash, |acc, &leg| {
            let i = leg.index();
            acc + self.positions[i] * self.prices[i].unwrap_or(0.0) * self.multipliers[i]
        })
    }

    fn execute(&mut self, leg: Leg, side: Side, quantity: f64) -> Result<OrderHandle, ExecutionError> {
        let i = leg.index();
        let price = self.prices[i]
            .ok_or_else(|| ExecutionError::Unavailable(format!("no price marked for {}", leg)))?;

        self.next_handle += 1;
        let handle = OrderHandle(self.next_handle);

        if let Some(status) = self.forced_rejections.pop_front() {
            tracing::debug!(%handle, %leg, ?side, ?status, "Paper order rejected");
            self.queued.push_back(OrderNotification::new(handle, status, side));
            return Ok(handle);
        }

        let signed = side.sign() * quantity;
        self.positions[i] += signed;
        self.cash -= signed * price * self.multipliers[i];
        self.fills.push(Fill {
            handle,
            leg,
            side,
            quantity,
            price,
        });

        tracing::debug!(%handle, %leg, ?side, quantity, price, cash = self.cash, "Paper order filled");
        self.queued
            .push_back(OrderNotification::new(handle, OrderStatus::Completed, side));
        Ok(handle)
    }
}

impl OrderRouter for PaperBroker {
    fn submit_market_order(
        &mut self,
        leg: Leg,
        side: Side,
        quantity: f64,
    ) -> Result<OrderHandle, ExecutionError> {
        if !(quantity.is_finite() && quantity > 0.0) {
            return Err(ExecutionError::InvalidParameters(format!(
                "quantity must be positive, got {}",
                quantity
            )));
        }
        self.execute(leg, side, quantity)
    }

    fn close_position(&mut self, leg: Leg) -> Result<OrderHandle, ExecutionError> {
        let held = self.positions[leg.index()];
        if held == 0.0 {
            // nothing to close, complete as canceled so the exit can drain
            self.next_handle += 1;
            let handle = OrderHandle(self.next_handle);
            self.queued
                .push_back(OrderNotification::new(handle, OrderStatus::Canceled, Side::Sell));
            return Ok(handle);
        }

        let side = if held > 0.0 { Side::Sell } else { Side::Buy };
        self.execute(leg, side, held.abs())
    }

    fn available_cash(&self) -> f64 {
        self.cash
    }
}
