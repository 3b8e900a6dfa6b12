use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two legs of the pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Leg {
    Leg0,
    Leg1,
}

impl Leg {
    pub const BOTH: [Leg; 2] = [Leg::Leg0, Leg::Leg1];

    pub fn index(&self) -> usize {
        match self {
            Leg::Leg0 => 0,
            Leg::Leg1 => 1,
        }
    }
}

impl fmt::Display for Leg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Leg::Leg0 => write!(f, "leg0"),
            Leg::Leg1 => write!(f, "leg1"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// +1 for buys, -1 for sells
    pub fn sign(&self) -> f64 {
        match self {
            Side::Buy => 1.0,
            Side::Sell => -1.0,
        }
    }
}

/// Direction of a pairs position
///
/// Long the spread means long leg 0 and short leg 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// Order side for each leg when opening a position in this direction
    pub fn entry_side(&self, leg: Leg) -> Side {
        match (self, leg) {
            (Direction::Long, Leg::Leg0) | (Direction::Short, Leg::Leg1) => Side::Buy,
            (Direction::Long, Leg::Leg1) | (Direction::Short, Leg::Leg0) => Side::Sell,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
        }
    }
}

/// Opaque identifier issued by the order router
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderHandle(pub u64);

impl fmt::Display for OrderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Terminal status of a submitted order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Completed,
    Expired,
    Canceled,
    Margin,
}

impl OrderStatus {
    pub fn is_filled(&self) -> bool {
        matches!(self, OrderStatus::Completed)
    }
}

/// Completion callback delivered by the order router
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderNotification {
    pub handle: OrderHandle,
    pub status: OrderStatus,
    pub side: Side,
}

impl OrderNotification {
    pub fn new(handle: OrderHandle, status: OrderStatus, side: Side) -> Self {
        Self {
            handle,
            status,
            side,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_sides() {
        assert_eq!(Direction::Long.entry_side(Leg::Leg0), Side::Buy);
        assert_eq!(Direction::Long.entry_side(Leg::Leg1), Side::Sell);
        assert_eq!(Direction::Short.entry_side(Leg::Leg0), Side::Sell);
        assert_eq!(Direction::Short.entry_side(Leg::Leg1), Side::Buy);
    }

    #[test]
    fn test_side_helpers() {
        assert_eq!(Side::Buy.sign(), 1.0);
        assert_eq!(Side::Sell.sign(), -1.0);
    }

    #[test]
    fn test_only_completed_fills() {
        assert!(OrderStatus::Completed.is_filled());
        assert!(!OrderStatus::Expired.is_filled());
        assert!(!OrderStatus::Canceled.is_filled());
        assert!(!OrderStatus::Margin.is_filled());
    }
}
