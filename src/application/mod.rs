//! Application Layer - Use cases and orchestration
//!
//! Drives the pairs state machine tick by tick and replays price series
//! through it against the paper broker.

pub mod engine;
pub mod session;

pub use engine::{EngineError, EngineStatus, PairsEngine, PriceHistory};
pub use session::{run_paper_session, SessionReport};
