//! OU Pairs - Ornstein-Uhlenbeck hedge fitting and pairs trading library
//!
//! Fits the hedge ratio of a two-asset spread by closed-form OU maximum
//! likelihood and drives a z-score pairs state machine from it.
//!
//! # Modules
//!
//! - `domain`: Core business logic (TradingState, PositionSizer, EventLog, snapshots)
//! - `ports`: Trait abstractions (OrderRouter, SpreadModel)
//! - `strategy`: OU estimator, hedge ratio search, z-score window, cointegration check
//! - `adapters`: External implementations (paper broker, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: Pairs engine and session driver

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod strategy;
