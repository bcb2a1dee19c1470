#![forbid(unsafe_code)]

//! Class diagram model and shared layout primitives (headless).
//!
//! Everything in here is read-only input for the placement planner and the settling engine:
//! the diagram model, rectangle geometry, the text measurement oracle, and block size estimation.

pub mod constants;
pub mod error;
pub mod geom;
mod loader;
pub mod model;
pub mod nesting;
pub mod sizing;
pub mod text;

pub use constants::LayoutConstants;
pub use error::{Error, Result};
pub use geom::{Obb, Point, Rect, Size, Vector, point, size};
pub use model::{
    BlockSizes, ChildObject, ClassDiagram, ClassIndex, Component, DiagramClass, ExpandedFlags,
    NestedFlags, PlacedBlock, PlacedDiagram, PositionMap, Property,
};
pub use sizing::{BlockSizer, compute_block_sizes};
pub use text::{DeterministicTextMeasurer, TextMeasurer, TextMetrics, TextStyle};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
