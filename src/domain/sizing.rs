//! Position Sizer
//!
//! Splits a cash budget across the two legs so the notional ratio of the
//! legs matches the hedge ratio r = A/B:
//!
//!   n0 = r/(1+r) * budget / (p0*m0)
//!   n1 = 1/(1+r) * budget / (p1*m1)
//!
//! With integer quantities both legs are rounded to nearest; a leg rounding
//! to zero means the pair cannot be traded at current prices.

use serde::{Deserialize, Serialize};

use crate::strategy::params::SizingConfig;

/// Quantities for one entry plus what rounding actually achieved
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LegQuantities {
    pub n0: f64,
    pub n1: f64,
    /// Notional of leg 0 over notional of leg 1 after rounding
    pub realised_ratio: f64,
    /// Total notional after rounding
    pub realised_budget: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizingOutcome {
    Sized(LegQuantities),
    /// Budget too small for at least one leg; the entry is skipped
    InsufficientCapital { budget: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionSizer {
    risk_per_trade: f64,
    integer_quantities: bool,
    multipliers: [f64; 2],
}

impl PositionSizer {
    pub fn new(config: &SizingConfig) -> Self {
        Self {
            risk_per_trade: config.risk_per_trade,
            integer_quantities: config.trade_integer_quantities,
            multipliers: [config.leg0_multiplier, config.leg1_multiplier],
        }
    }

    /// Budget committed to one entry out of `cash`
    pub fn budget(&self, cash: f64) -> f64 {
        cash * self.risk_per_trade
    }

    /// Size an entry from available cash
    pub fn size(&self, cash: f64, ratio: f64, p0: f64, p1: f64) -> SizingOutcome {
        self.size_budget(self.budget(cash), ratio, p0, p1)
    }

    /// Size an entry for an explicit budget
    pub fn size_budget(&self, budget: f64, ratio: f64, p0: f64, p1: f64) -> SizingOutcome {
        let insufficient = SizingOutcome::InsufficientCapital { budget };
        if !(budget > 0.0 && ratio > 0.0 && p0 > 0.0 && p1 > 0.0) || !ratio.is_finite() {
            return insufficient;
        }

        let unit0 = p0 * self.multipliers[0];
        let unit1 = p1 * self.multipliers[1];

        let mut n0 = ratio / (1.0 + ratio) * budget / unit0;
        let mut n1 = 1.0 / (1.0 + ratio) * budget / unit1;
        if self.integer_quantities {
            n0 = n0.round();
            n1 = n1.round();
        }

        if !(n0 > 0.0 && n1 > 0.0) {
            tracing::debug!(budget, n0, n1, "leg rounds to zero");
            return insufficient;
        }

        let notional0 = n0 * unit0;
        let notional1 = n1 * unit1;
        let quantities = LegQuantities {
            n0,
            n1,
            realised_ratio: notional0 / notional1,
            realised_budget: notional0 + notional1,
        };

        tracing::debug!(
            n0,
            n1,
            target_ratio = ratio,
            realised_ratio = quantities.realised_ratio,
            budget,
            realised_budget = quantities.realised_budget,
            "sized entry"
        );

        SizingOutcome::Sized(quantities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sizer(integer: bool) -> PositionSizer {
        PositionSizer::new(&SizingConfig {
            risk_per_trade: 0.5,
            trade_integer_quantities: integer,
            leg0_multiplier: 1.0,
            leg1_multiplier: 1.0,
        })
    }

    #[test]
    fn test_fractional_identities() {
        // budget 5000, r = 3
        let outcome = sizer(false).size(10_000.0, 3.0, 100.0, 40.0);
        let SizingOutcome::Sized(q) = outcome else {
            panic!("expected a sized entry, got {:?}", outcome);
        };
        assert_relative_eq!(q.n0, 37.5, epsilon = 1e-9);
        assert_relative_eq!(q.n1, 31.25, epsilon = 1e-9);
        assert_relative_eq!(q.realised_ratio, 3.0, epsilon = 1e-9);
        assert_relative_eq!(q.realised_budget, 5_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_integer_rounding() {
        // n0 = 0.5 * 1000 / 30 = 16.67 -> 17, n1 = 0.5 * 1000 / 70 = 7.14 -> 7
        let outcome = sizer(true).size_budget(1_000.0, 1.0, 30.0, 70.0);
        let SizingOutcome::Sized(q) = outcome else {
            panic!("expected a sized entry, got {:?}", outcome);
        };
        assert_eq!(q.n0, 17.0);
        assert_eq!(q.n1, 7.0);
        assert_relative_eq!(q.realised_budget, 17.0 * 30.0 + 7.0 * 70.0);
        assert_relative_eq!(q.realised_ratio, 510.0 / 490.0);
    }

    #[test]
    fn test_zero_quantities_suppress_entry() {
        let outcome = sizer(true).size_budget(10.0, 1.0, 1_000.0, 1_000.0);
        assert_eq!(outcome, SizingOutcome::InsufficientCapital { budget: 10.0 });
    }

    #[test]
    fn test_single_zero_leg_suppresses_entry() {
        // n0 = 0.9 * 100 / 10 = 9, n1 = 0.1 * 100 / 50 = 0.2 -> 0
        let outcome = sizer(true).size_budget(100.0, 9.0, 10.0, 50.0);
        assert!(matches!(outcome, SizingOutcome::InsufficientCapital { .. }));
    }

    #[test]
    fn test_multipliers_scale_quantities() {
        let sizer = PositionSizer::new(&SizingConfig {
            risk_per_trade: 1.0,
            trade_integer_quantities: false,
            leg0_multiplier: 10.0,
            leg1_multiplier: 1.0,
        });
        let SizingOutcome::Sized(q) = sizer.size(2_000.0, 1.0, 10.0, 10.0) else {
            panic!("expected a sized entry");
        };
        assert_relative_eq!(q.n0, 10.0, epsilon = 1e-9);
        assert_relative_eq!(q.n1, 100.0, epsilon = 1e-9);
        assert_relative_eq!(q.realised_ratio, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_no_cash() {
        assert!(matches!(
            sizer(false).size(0.0, 1.0, 10.0, 10.0),
            SizingOutcome::InsufficientCapital { .. }
        ));
    }
}
