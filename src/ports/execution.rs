use thiserror::Error;

use crate::domain::order::{Leg, OrderHandle, Side};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecutionError {
    #[error("Order rejected: {0}")]
    Rejected(String),
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
    #[error("Router unavailable: {0}")]
    Unavailable(String),
}

/// Order collaborator driven by the pairs engine
///
/// Orders complete asynchronously: the router hands back a handle now and
/// delivers an `OrderNotification` for it later.
pub trait OrderRouter {
    fn submit_market_order(
        &mut self,
        leg: Leg,
        side: Side,
        quantity: f64,
    ) -> Result<OrderHandle, ExecutionError>;

    /// Flatten whatever is held on `leg`
    fn close_position(&mut self, leg: Leg) -> Result<OrderHandle, ExecutionError>;

    /// Cash available for new entries
    fn available_cash(&self) -> f64;
}

impl<R: OrderRouter + ?Sized> OrderRouter for Box<R> {
    fn submit_market_order(
        &mut self,
        leg: Leg,
        side: Side,
        quantity: f64,
    ) -> Result<OrderHandle, ExecutionError> {
        (**self).submit_market_order(leg, side, quantity)
    }

    fn close_position(&mut self, leg: Leg) -> Result<OrderHandle, ExecutionError> {
        (**self).close_position(leg)
    }

    fn available_cash(&self) -> f64 {
        (**self).available_cash()
    }
}
