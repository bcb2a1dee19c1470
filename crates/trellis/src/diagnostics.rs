//! Layout diagnostics.
//!
//! The layout code only decides *when* something is worth reporting. Where reports go is up to
//! the [`DiagnosticsSink`] the caller hands in.

use serde::Serialize;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DiagnosticEvent {
    OverlapDetected { pair: String },
    OverlapResolved { pair: String },
    /// Overlaps still present after the layout reported itself settled.
    SettleFailed { pairs: Vec<String> },
}

pub trait DiagnosticsSink {
    fn record(&self, event: &DiagnosticEvent);
}

/// Forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn record(&self, event: &DiagnosticEvent) {
        match event {
            DiagnosticEvent::OverlapDetected { pair } => {
                tracing::warn!(pair = %pair, "block overlap detected");
            }
            DiagnosticEvent::OverlapResolved { pair } => {
                tracing::info!(pair = %pair, "block overlap resolved");
            }
            DiagnosticEvent::SettleFailed { pairs } => {
                tracing::error!(count = pairs.len(), pairs = ?pairs, "layout settled with overlaps");
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticsSink for NullSink {
    fn record(&self, _event: &DiagnosticEvent) {}
}

/// Keeps every event in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<DiagnosticEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn settle_failures(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, DiagnosticEvent::SettleFailed { .. }))
            .count()
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

impl DiagnosticsSink for RecordingSink {
    fn record(&self, event: &DiagnosticEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event.clone());
    }
}
