#![forbid(unsafe_code)]

//! Hierarchy-aware initial placement for class diagram blocks.
//!
//! One-shot planner: blocks are put in rows by primary-inheritance depth, rows are ordered with a
//! fixed number of barycentric sweeps to reduce line crossings, and rows are stacked top to
//! bottom. Pins and previous positions override the computed slot so that incremental rebuilds
//! keep blocks where the user last saw them.
//!
//! The result is collision-free only as far as row packing goes; the settling engine owns the
//! runtime no-overlap guarantee.

pub mod depth;
pub mod order;

use depth::{Tree, assign_depths};
use order::{RowOrdering, composition_neighbours, rows_by_depth};
use serde::Deserialize;
use trellis_core::{
    BlockSizer, BlockSizes, ClassIndex, DeterministicTextMeasurer, DiagramClass, ExpandedFlags,
    LayoutConstants, NestedFlags, PlacedBlock, PlacedDiagram, PositionMap, Rect, Size,
    TextMeasurer, TextStyle,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Vertical gap between stacked rows.
    pub row_gap: f64,
    /// Down/up sweep pairs of the barycentric ordering.
    pub sweeps: usize,
    /// Pull of composition owners/targets relative to a primary-inheritance edge.
    pub composition_weight: f64,
    pub constants: LayoutConstants,
    pub text_style: TextStyle,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            row_gap: 48.0,
            sweeps: 3,
            composition_weight: 0.3,
            constants: LayoutConstants::default(),
            text_style: TextStyle::default(),
        }
    }
}

/// Everything the planner reads. Only `classes` and `expanded` are required.
#[derive(Clone, Copy)]
pub struct PlacementInput<'a> {
    pub classes: &'a [DiagramClass],
    pub expanded: &'a ExpandedFlags,
    /// Caller-resolved sizes; ids without an entry fall back to estimates.
    pub sizes: Option<&'a BlockSizes>,
    /// Top-left positions from before a rebuild.
    pub previous: Option<&'a PositionMap>,
    pub nested: Option<&'a NestedFlags>,
    pub measurer: Option<&'a dyn TextMeasurer>,
}

impl<'a> PlacementInput<'a> {
    pub fn new(classes: &'a [DiagramClass], expanded: &'a ExpandedFlags) -> Self {
        Self {
            classes,
            expanded,
            sizes: None,
            previous: None,
            nested: None,
            measurer: None,
        }
    }

    pub fn with_sizes(mut self, sizes: &'a BlockSizes) -> Self {
        self.sizes = Some(sizes);
        self
    }

    pub fn with_previous(mut self, previous: &'a PositionMap) -> Self {
        self.previous = Some(previous);
        self
    }

    pub fn with_nested(mut self, nested: &'a NestedFlags) -> Self {
        self.nested = Some(nested);
        self
    }

    pub fn with_measurer(mut self, measurer: &'a dyn TextMeasurer) -> Self {
        self.measurer = Some(measurer);
        self
    }
}

/// Row plan before seeding: depth, row membership and slot rectangle per class position.
#[derive(Debug, Clone)]
pub struct RowPlan {
    pub depths: Vec<usize>,
    pub rows: Vec<Vec<usize>>,
    pub slots: Vec<Rect>,
}

pub fn plan_rows(index: &ClassIndex<'_>, sizes: &[Size], cfg: &PlacementConfig) -> RowPlan {
    let tree = Tree::from_index(index);
    let depths = assign_depths(&tree);
    let mut rows = rows_by_depth(&depths);
    let composition = composition_neighbours(index);
    let widths: Vec<f64> = sizes.iter().map(|s| s.width).collect();

    let ordering = RowOrdering {
        tree: &tree,
        composition: &composition,
        widths: &widths,
        start_x: cfg.constants.padding,
        margin: cfg.constants.block_margin,
        composition_weight: cfg.composition_weight,
    };
    let centers = ordering.run(&mut rows, cfg.sweeps);

    let mut slots = vec![Rect::default(); index.len()];
    let mut y = cfg.constants.padding;
    for row in &rows {
        let row_height = row
            .iter()
            .map(|&ix| sizes[ix].height)
            .fold(0.0_f64, f64::max);
        for &ix in row {
            let s = sizes[ix];
            slots[ix] = Rect::new(centers[ix] - s.width * 0.5, y, s.width, s.height);
        }
        y += row_height + cfg.row_gap;
    }

    RowPlan {
        depths,
        rows,
        slots,
    }
}

pub fn place(input: &PlacementInput<'_>, cfg: &PlacementConfig) -> PlacedDiagram {
    if input.classes.is_empty() {
        return PlacedDiagram::default();
    }

    let index = ClassIndex::new(input.classes);
    let fallback_measurer = DeterministicTextMeasurer::default();
    let no_nesting = NestedFlags::default();
    let measurer: &dyn TextMeasurer = match input.measurer {
        Some(m) => m,
        None => &fallback_measurer,
    };
    let sizer = BlockSizer {
        index: &index,
        measurer,
        style: &cfg.text_style,
        constants: &cfg.constants,
    };

    let expanded_of = |c: &DiagramClass| input.expanded.get(&c.id).copied().unwrap_or(false);
    let sizes: Vec<Size> = input
        .classes
        .iter()
        .map(|c| {
            input
                .sizes
                .and_then(|m| m.get(&c.id).copied())
                .unwrap_or_else(|| {
                    sizer.block_size(c, expanded_of(c), input.nested.unwrap_or(&no_nesting))
                })
        })
        .collect();

    let plan = plan_rows(&index, &sizes, cfg);

    let mut reused = 0usize;
    let blocks = input
        .classes
        .iter()
        .enumerate()
        .map(|(ix, c)| {
            let origin = if let Some(pin) = c.pin {
                pin
            } else if let Some(prev) = input.previous.and_then(|m| m.get(&c.id)) {
                reused += 1;
                *prev
            } else {
                plan.slots[ix].origin()
            };
            PlacedBlock {
                class_id: c.id.clone(),
                rect: Rect::from_origin_size(origin, sizes[ix]),
                margin: c.margin,
                expanded: expanded_of(c),
            }
        })
        .collect();

    tracing::debug!(
        classes = input.classes.len(),
        rows = plan.rows.len(),
        reused,
        "hierarchy placement"
    );
    PlacedDiagram { blocks }
}
