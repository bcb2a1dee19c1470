//! Frame-driven orchestration of one diagram.
//!
//! A [`Session`] owns everything a viewer needs between frames: the diagram, its expanded and
//! nested-expansion flags, the settling engine, overlap bookkeeping, and the line cache. The
//! caller feeds it input and calls [`Session::frame`] once per rendered frame.

use crate::diagnostics::{DiagnosticsSink, TracingSink};
use crate::error::Result;
use crate::overlap::{OverlapReport, OverlapTracker};
use crate::routing::{ConnectionLine, LineCache};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use trellis_core::{
    BlockSizer, ClassDiagram, ClassIndex, DeterministicTextMeasurer, ExpandedFlags, NestedFlags,
    PlacedDiagram, Point, TextMeasurer, Vector, compute_block_sizes, point,
};
use trellis_physics::{DiagramKey, EngineConfig, SettlingEngine};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FrameOutput {
    pub placed: PlacedDiagram,
    pub lines: Vec<ConnectionLine>,
    pub overlaps: OverlapReport,
    pub settled: bool,
}

#[derive(Debug, Clone)]
struct Grab {
    class_id: String,
    offset: Vector,
}

pub struct Session {
    diagram: Option<Arc<ClassDiagram>>,
    generation: u64,
    expanded: ExpandedFlags,
    nested: NestedFlags,
    engine: SettlingEngine,
    overlaps: OverlapTracker,
    lines: LineCache,
    grab: Option<Grab>,
    sink: Box<dyn DiagnosticsSink>,
    measurer: Box<dyn TextMeasurer>,
}

impl Session {
    pub fn new(config: SessionConfig) -> Result<Self> {
        Ok(Self {
            diagram: None,
            generation: 0,
            expanded: ExpandedFlags::default(),
            nested: NestedFlags::default(),
            engine: SettlingEngine::with_config(config.engine)?,
            overlaps: OverlapTracker::new(),
            lines: LineCache::new(),
            grab: None,
            sink: Box::new(TracingSink),
            measurer: Box::new(DeterministicTextMeasurer::default()),
        })
    }

    pub fn with_sink(mut self, sink: impl DiagnosticsSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn with_measurer(mut self, measurer: impl TextMeasurer + 'static) -> Self {
        self.measurer = Box::new(measurer);
        self
    }

    pub fn diagram(&self) -> Option<&Arc<ClassDiagram>> {
        self.diagram.as_ref()
    }

    pub fn engine(&self) -> &SettlingEngine {
        &self.engine
    }

    pub fn expanded(&self) -> &ExpandedFlags {
        &self.expanded
    }

    pub fn nested(&self) -> &NestedFlags {
        &self.nested
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.get(id).copied().unwrap_or(false)
    }

    /// Shows `diagram`. Passing the diagram that is already shown rebuilds it in place; anything
    /// else starts over with every block collapsed.
    pub fn set_diagram(&mut self, diagram: Arc<ClassDiagram>) {
        let same = self
            .diagram
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, &diagram));
        if !same {
            self.generation += 1;
            self.expanded.clear();
            self.nested.clear();
            self.overlaps.reset();
            self.grab = None;
        }
        self.diagram = Some(diagram);
        self.rebuild();
    }

    /// Expands every class. Handy for headless runs.
    pub fn expand_all(&mut self) {
        let Some(diagram) = self.diagram.clone() else {
            return;
        };
        for class in &diagram.classes {
            self.expanded.insert(class.id.clone(), true);
        }
        self.rebuild();
    }

    fn rebuild(&mut self) {
        let Some(diagram) = self.diagram.clone() else {
            return;
        };
        let placement = &self.engine.config().placement;
        let sizes = compute_block_sizes(
            &diagram.classes,
            &self.expanded,
            &self.nested,
            self.measurer.as_ref(),
            &placement.text_style,
            &placement.constants,
        );
        self.engine.build(
            DiagramKey(self.generation),
            &diagram.classes,
            &self.expanded,
            &sizes,
        );
        self.lines.invalidate();
    }

    /// Recomputes one block's size and animates it there.
    fn resize_block(&mut self, id: &str) {
        let Some(diagram) = self.diagram.clone() else {
            return;
        };
        let index = ClassIndex::new(&diagram.classes);
        let Some(class) = index.get(id) else {
            return;
        };
        let placement = &self.engine.config().placement;
        let sizer = BlockSizer {
            index: &index,
            measurer: self.measurer.as_ref(),
            style: &placement.text_style,
            constants: &placement.constants,
        };
        let expanded = self.is_expanded(id);
        let size = sizer.block_size(class, expanded, &self.nested);
        self.engine
            .update_block_size(id, size.width, size.height, expanded);
        self.overlaps.rearm_settle_failure();
        self.lines.invalidate();
    }

    pub fn set_expanded(&mut self, id: &str, expanded: bool) {
        let known = self
            .diagram
            .as_ref()
            .is_some_and(|d| d.classes.iter().any(|c| c.id == id));
        if !known || self.is_expanded(id) == expanded {
            return;
        }
        self.expanded.insert(id.to_string(), expanded);
        self.resize_block(id);
    }

    pub fn toggle_expanded(&mut self, id: &str) {
        let expanded = self.is_expanded(id);
        self.set_expanded(id, !expanded);
    }

    /// Flips a nested row such as `"Player/parent/0"`. The owning block is the first path
    /// segment and is resized to fit.
    pub fn toggle_nested(&mut self, path: &str) {
        let Some(owner) = path.split('/').next().filter(|s| !s.is_empty()) else {
            return;
        };
        if !self.engine.contains(owner) {
            return;
        }
        let entry = self.nested.entry(path.to_string()).or_insert(false);
        *entry = !*entry;
        if self.is_expanded(owner) {
            self.resize_block(owner);
        }
    }

    pub fn frame(&mut self, dt: f64) -> FrameOutput {
        self.engine.step(dt);
        let placed = self.engine.placed();
        let settled = self.engine.is_settled();
        let overlaps = self.overlaps.observe(&placed, settled, self.sink.as_ref());
        let dragging = self.engine.dragged_id().is_some();
        let lines = match self.diagram.as_ref() {
            Some(d) => self
                .lines
                .refresh(&d.classes, &placed, settled, dragging)
                .to_vec(),
            None => Vec::new(),
        };
        FrameOutput {
            placed,
            lines,
            overlaps,
            settled,
        }
    }

    /// Topmost block under the point. Later blocks are drawn over earlier ones.
    pub fn pick_block_at(&self, x: f64, y: f64) -> Option<String> {
        let p = point(x, y);
        self.engine
            .placed()
            .blocks
            .iter()
            .rev()
            .find(|b| b.rect.contains_point(p))
            .map(|b| b.class_id.clone())
    }

    /// Starts dragging the block under the pointer, keeping the grab offset.
    pub fn begin_drag_at(&mut self, x: f64, y: f64) -> Option<String> {
        let id = self.pick_block_at(x, y)?;
        let rect = self.engine.rect(&id)?;
        self.engine.begin_drag(&id);
        self.grab = Some(Grab {
            class_id: id.clone(),
            offset: point(x, y) - rect.origin(),
        });
        Some(id)
    }

    pub fn drag_pointer_to(&mut self, x: f64, y: f64) {
        let Some(grab) = self.grab.as_ref() else {
            return;
        };
        let origin = point(x, y) - grab.offset;
        self.engine.drag_to(&grab.class_id, origin.x, origin.y);
    }

    pub fn end_drag(&mut self) {
        let Some(grab) = self.grab.take() else {
            return;
        };
        self.engine.end_drag(&grab.class_id);
        self.lines.invalidate();
    }

    /// Centre of a block, for cameras that want to bring it into view.
    pub fn focus_point(&self, id: &str) -> Option<Point> {
        self.engine.rect(id).map(|r| r.center())
    }

    pub fn overlap_count(&self) -> usize {
        self.overlaps.len()
    }

    pub fn is_settled(&self) -> bool {
        self.engine.is_settled()
    }
}
