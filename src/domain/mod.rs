//! Domain Layer - Core business logic for the pairs strategy
//!
//! Pure domain types and logic with no I/O beyond snapshot files.
//! All external interactions happen through the ports layer.
//!
//! - `order`: legs, sides, handles and completion notifications
//! - `signal`: decisions produced from a z-score
//! - `trading_state`: state record plus the pure transitions on it
//! - `sizing`: split of a cash budget across both legs
//! - `events`: append-only decision log
//! - `persistence`: session snapshots for crash recovery

pub mod events;
pub mod order;
pub mod persistence;
pub mod signal;
pub mod sizing;
pub mod trading_state;

pub use events::{DecisionRecord, EventKind, EventLog, HedgeSnapshot};
pub use order::{Direction, Leg, OrderHandle, OrderNotification, OrderStatus, Side};
pub use persistence::{EngineSnapshot, PersistError, RecoveryStatus};
pub use signal::{confidence, Decision};
pub use sizing::{LegQuantities, PositionSizer, SizingOutcome};
pub use trading_state::{decide, NotificationOutcome, PositionState, TradingState};
