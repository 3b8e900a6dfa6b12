//! Decision Event Log
//!
//! Append-only record of the trades, retrains and dropped ticks of a
//! session, for offline analysis. Hold ticks are not recorded. Records are
//! never mutated once pushed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::domain::persistence::PersistError;
use crate::strategy::hedge_params::HedgeParameters;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Retrain,
    RetrainFailed,
    EnterLong,
    EnterShort,
    ExitLong,
    ExitShort,
    EntrySuppressed,
    InsufficientCapital,
    MissingPrice,
    PositionOpened,
    PositionClosed,
    OrderRejected,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::Retrain => "retrain",
            EventKind::RetrainFailed => "retrain_failed",
            EventKind::EnterLong => "enter_long",
            EventKind::EnterShort => "enter_short",
            EventKind::ExitLong => "exit_long",
            EventKind::ExitShort => "exit_short",
            EventKind::EntrySuppressed => "entry_suppressed",
            EventKind::InsufficientCapital => "insufficient_capital",
            EventKind::MissingPrice => "missing_price",
            EventKind::PositionOpened => "position_opened",
            EventKind::PositionClosed => "position_closed",
            EventKind::OrderRejected => "order_rejected",
        };
        write!(f, "{}", name)
    }
}

/// Flattened view of the hedge in force when a record was written
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HedgeSnapshot {
    pub alpha: f64,
    pub beta: f64,
    pub a: f64,
    pub b: f64,
    pub theta: f64,
    pub mu: f64,
    pub sigma: f64,
    pub log_likelihood: f64,
}

impl From<&HedgeParameters> for HedgeSnapshot {
    fn from(hedge: &HedgeParameters) -> Self {
        Self {
            alpha: hedge.alpha(),
            beta: hedge.beta(),
            a: hedge.a,
            b: hedge.b,
            theta: hedge.ou_params.theta,
            mu: hedge.ou_params.mu,
            sigma: hedge.ou_params.sigma,
            log_likelihood: hedge.ou_params.log_likelihood,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    /// Tick counter of the session, dropped ticks included
    pub step: u64,
    pub recorded_at: DateTime<Utc>,
    pub kind: EventKind,
    pub z_score: Option<f64>,
    pub hedge: Option<HedgeSnapshot>,
    pub detail: Option<String>,
}

impl DecisionRecord {
    pub fn new(step: u64, kind: EventKind) -> Self {
        Self {
            step,
            recorded_at: Utc::now(),
            kind,
            z_score: None,
            hedge: None,
            detail: None,
        }
    }

    pub fn with_z_score(mut self, z_score: f64) -> Self {
        self.z_score = Some(z_score);
        self
    }

    pub fn with_hedge(mut self, hedge: Option<&HedgeParameters>) -> Self {
        self.hedge = hedge.map(HedgeSnapshot::from);
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct EventLog {
    records: Vec<DecisionRecord>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: DecisionRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[DecisionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records of one kind, in order
    pub fn of_kind(&self, kind: EventKind) -> impl Iterator<Item = &DecisionRecord> {
        self.records.iter().filter(move |r| r.kind == kind)
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.of_kind(kind).count()
    }

    /// Records written since index `from`
    pub fn since(&self, from: usize) -> &[DecisionRecord] {
        &self.records[from.min(self.records.len())..]
    }

    /// One JSON object per line
    pub fn to_json_lines(&self) -> Result<String, PersistError> {
        let mut out = String::new();
        for record in &self.records {
            let line = serde_json::to_string(record)
                .map_err(|e| PersistError::SerializationError(e.to_string()))?;
            out.push_str(&line);
            out.push('\n');
        }
        Ok(out)
    }

    /// Write the log as JSON lines, replacing any existing file
    pub fn write_json_lines(&self, path: &Path) -> Result<(), PersistError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| PersistError::DirectoryError(e.to_string()))?;
            }
        }

        let content = self.to_json_lines()?;
        let mut file = fs::File::create(path).map_err(|e| PersistError::WriteError(e.to_string()))?;
        file.write_all(content.as_bytes())
            .map_err(|e| PersistError::WriteError(e.to_string()))?;

        tracing::info!(records = self.records.len(), path = %path.display(), "event log written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_append_and_filter() {
        let mut log = EventLog::new();
        log.push(DecisionRecord::new(1, EventKind::MissingPrice));
        log.push(DecisionRecord::new(2, EventKind::EnterShort).with_z_score(2.3));
        log.push(DecisionRecord::new(3, EventKind::MissingPrice));

        assert_eq!(log.len(), 3);
        assert_eq!(log.count(EventKind::MissingPrice), 2);
        assert_eq!(log.of_kind(EventKind::EnterShort).next().unwrap().z_score, Some(2.3));
        assert_eq!(log.since(1).len(), 2);
        assert!(log.since(10).is_empty());
    }

    #[test]
    fn test_json_lines() {
        let mut log = EventLog::new();
        log.push(DecisionRecord::new(1, EventKind::MissingPrice).with_detail("leg0 missing"));
        log.push(DecisionRecord::new(2, EventKind::RetrainFailed));

        let text = log.to_json_lines().unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"missing_price\""));

        let record: DecisionRecord = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(record.kind, EventKind::RetrainFailed);
        assert_eq!(record.step, 2);
    }

    #[test]
    fn test_write_to_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs").join("events.jsonl");

        let mut log = EventLog::new();
        log.push(DecisionRecord::new(1, EventKind::Retrain));
        log.write_json_lines(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
    }
}
