//! Overlap detection between placed blocks.

use crate::diagnostics::{DiagnosticEvent, DiagnosticsSink};
use indexmap::IndexSet;
use serde::Serialize;
use trellis_core::{Obb, PlacedDiagram, Rect};

/// Separating-axis test on the rectangles as unrotated oriented boxes. Touching edges count as
/// intersecting.
pub fn intersects(a: &Rect, b: &Rect) -> bool {
    Obb::from_rect(a).intersects(&Obb::from_rect(b))
}

/// Order-independent key for a pair of ids: `"min|max"`.
pub fn pair_key(a: &str, b: &str) -> String {
    if a <= b {
        format!("{a}|{b}")
    } else {
        format!("{b}|{a}")
    }
}

/// All intersecting pairs, in block order.
pub fn overlapping_pairs(placed: &PlacedDiagram) -> IndexSet<String> {
    let mut pairs = IndexSet::new();
    for (i, a) in placed.blocks.iter().enumerate() {
        for b in &placed.blocks[i + 1..] {
            if intersects(&a.rect, &b.rect) {
                pairs.insert(pair_key(&a.class_id, &b.class_id));
            }
        }
    }
    pairs
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OverlapReport {
    pub pairs: Vec<String>,
    pub detected: usize,
    pub resolved: usize,
    pub settle_failed: bool,
}

/// Frame-to-frame overlap bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct OverlapTracker {
    pairs: IndexSet<String>,
    settle_failure_reported: bool,
}

impl OverlapTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pairs(&self) -> &IndexSet<String> {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn reset(&mut self) {
        self.pairs.clear();
        self.settle_failure_reported = false;
    }

    /// Allows one more settle-failure report while keeping the tracked pairs, so pairs that
    /// never resolved are not announced as new.
    pub fn rearm_settle_failure(&mut self) {
        self.settle_failure_reported = false;
    }

    pub fn observe(
        &mut self,
        placed: &PlacedDiagram,
        settled: bool,
        sink: &dyn DiagnosticsSink,
    ) -> OverlapReport {
        let current = overlapping_pairs(placed);
        let mut report = OverlapReport::default();

        for pair in current.difference(&self.pairs) {
            sink.record(&DiagnosticEvent::OverlapDetected { pair: pair.clone() });
            report.detected += 1;
        }
        for pair in self.pairs.difference(&current) {
            sink.record(&DiagnosticEvent::OverlapResolved { pair: pair.clone() });
            report.resolved += 1;
        }

        if current.is_empty() || !settled {
            self.settle_failure_reported = false;
        } else if !self.settle_failure_reported {
            let pairs: Vec<String> = current.iter().cloned().collect();
            sink.record(&DiagnosticEvent::SettleFailed { pairs });
            self.settle_failure_reported = true;
            report.settle_failed = true;
        }

        report.pairs = current.iter().cloned().collect();
        self.pairs = current;
        report
    }
}
