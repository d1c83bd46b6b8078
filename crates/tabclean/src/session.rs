//! In-memory cleaning session with history and reset.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::dataset::Dataset;
use crate::engine::CleaningEngine;
use crate::error::Result;
use crate::operation::{OperationKind, OperationRequest};
use crate::report::StatsReport;

/// One successfully applied operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    /// 1-based position in the session history.
    pub sequence: usize,
    pub operation: OperationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    pub stats: StatsReport,
    pub applied_at: DateTime<Utc>,
}

/// Applies operations to a working copy while keeping the original intact.
#[derive(Debug, Clone)]
pub struct CleaningSession {
    original: Dataset,
    current: Dataset,
    history: Vec<HistoryEntry>,
    engine: CleaningEngine,
}

impl CleaningSession {
    pub fn new(dataset: Dataset) -> Self {
        Self::with_engine(dataset, CleaningEngine::new())
    }

    pub fn with_engine(dataset: Dataset, engine: CleaningEngine) -> Self {
        Self {
            current: dataset.clone(),
            original: dataset,
            history: Vec::new(),
            engine,
        }
    }

    /// Apply `request` to the working copy.
    ///
    /// Only successful operations are recorded.
    pub fn apply(&mut self, request: &OperationRequest) -> Result<&HistoryEntry> {
        let stats = self.engine.apply_in_place(&mut self.current, request)?;
        self.history.push(HistoryEntry {
            sequence: self.history.len() + 1,
            operation: request.kind(),
            column: request.column().map(str::to_string),
            stats,
            applied_at: Utc::now(),
        });
        tracing::info!(
            operation = request.kind().name(),
            step = self.history.len(),
            "recorded session step"
        );
        Ok(&self.history[self.history.len() - 1])
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn current(&self) -> &Dataset {
        &self.current
    }

    pub fn original(&self) -> &Dataset {
        &self.original
    }

    pub fn engine(&self) -> &CleaningEngine {
        &self.engine
    }

    /// Discard every applied operation.
    pub fn reset(&mut self) {
        tracing::info!(discarded = self.history.len(), "session reset");
        self.current = self.original.clone();
        self.history.clear();
    }

    pub fn into_current(self) -> Dataset {
        self.current
    }
}
