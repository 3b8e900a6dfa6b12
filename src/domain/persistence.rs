//! Session Persistence
//!
//! Snapshot of a pairs session (trading state plus buffered prices) written
//! to disk as JSON so a restarted process can resume exactly where it left
//! off.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::trading_state::TradingState;

/// Default snapshot file name
pub const DEFAULT_SNAPSHOT_FILE: &str = "pairs_session.json";

#[derive(Error, Debug, Clone)]
pub enum PersistError {
    #[error("Failed to serialize snapshot: {0}")]
    SerializationError(String),

    #[error("Failed to deserialize snapshot: {0}")]
    DeserializationError(String),

    #[error("Failed to write snapshot file: {0}")]
    WriteError(String),

    #[error("Failed to read snapshot file: {0}")]
    ReadError(String),

    #[error("Failed to create directory: {0}")]
    DirectoryError(String),
}

/// Everything needed to resume a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub state: TradingState,
    /// Buffered prices of leg 0, oldest first
    pub leg0: Vec<f64>,
    /// Buffered prices of leg 1, oldest first
    pub leg1: Vec<f64>,
    /// Ticks seen so far
    pub step: u64,
    /// Cointegration verdict of the hedge in force
    pub cointegrated: bool,
    /// Spread history of the hedge in force, oldest first
    pub spreads: Vec<f64>,
    pub saved_at: DateTime<Utc>,
}

/// Recovery status after loading a snapshot
#[derive(Debug, Clone)]
pub enum RecoveryStatus {
    /// Nothing to recover
    NoSnapshot,
    Recovered(Box<EngineSnapshot>),
    /// Snapshot unreadable or inconsistent, manual intervention needed
    Corrupted(String),
}

impl EngineSnapshot {
    /// Structural checks that don't need a model
    pub fn validate(&self) -> Result<(), String> {
        if self.leg0.len() != self.leg1.len() {
            return Err(format!(
                "price buffers differ in length: {} vs {}",
                self.leg0.len(),
                self.leg1.len()
            ));
        }
        if self.state.is_long && self.state.is_short {
            return Err("state is both long and short".to_string());
        }
        if self.state.is_trained() && self.leg0.len() < 2 {
            return Err("trained state without price history".to_string());
        }
        if self.state.is_trained() && self.spreads.is_empty() {
            return Err("trained state without spread history".to_string());
        }
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<(), PersistError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| PersistError::DirectoryError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| PersistError::SerializationError(e.to_string()))?;

        fs::write(path, content).map_err(|e| PersistError::WriteError(e.to_string()))?;

        tracing::info!(
            step = self.step,
            prices = self.leg0.len(),
            position = ?self.state.position(),
            "Session snapshot saved to {}",
            path.display()
        );

        Ok(())
    }

    pub fn load(path: &Path) -> Result<Option<Self>, PersistError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path).map_err(|e| PersistError::ReadError(e.to_string()))?;

        if content.trim().is_empty() {
            return Ok(None);
        }

        let snapshot: Self = serde_json::from_str(&content)
            .map_err(|e| PersistError::DeserializationError(e.to_string()))?;

        tracing::info!(
            step = snapshot.step,
            prices = snapshot.leg0.len(),
            "Session snapshot loaded from {}",
            path.display()
        );

        Ok(Some(snapshot))
    }

    /// Load and validate, classifying the result
    pub fn try_recover(path: &Path) -> RecoveryStatus {
        match Self::load(path) {
            Ok(Some(snapshot)) => match snapshot.validate() {
                Ok(()) => RecoveryStatus::Recovered(Box::new(snapshot)),
                Err(reason) => RecoveryStatus::Corrupted(reason),
            },
            Ok(None) => RecoveryStatus::NoSnapshot,
            Err(e) => RecoveryStatus::Corrupted(e.to_string()),
        }
    }

    pub fn default_path(data_dir: &Path) -> PathBuf {
        data_dir.join(DEFAULT_SNAPSHOT_FILE)
    }
}
