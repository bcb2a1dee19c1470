#![forbid(unsafe_code)]

//! Headless class diagram block layout.
//!
//! - [`trellis_hierarchy`] computes a crossing-reduced starting layout from the inheritance tree.
//! - [`trellis_physics`] keeps blocks apart while they are dragged and resized.
//! - [`routing`] turns the current rectangles into connection lines.
//! - [`overlap`] watches for blocks that still overlap and reports through a
//!   [`DiagnosticsSink`].
//!
//! [`Session`] wires all of it together for a frame-driven viewer.

pub mod diagnostics;
pub mod error;
pub mod overlap;
pub mod routing;
pub mod session;

pub use diagnostics::{DiagnosticEvent, DiagnosticsSink, NullSink, RecordingSink, TracingSink};
pub use error::{Error, Result};
pub use overlap::{OverlapReport, OverlapTracker, intersects, pair_key};
pub use routing::{ConnectionKind, ConnectionLine, LineCache, Side, compute_lines};
pub use session::{FrameOutput, Session, SessionConfig};

pub use trellis_core::{ClassDiagram, DiagramClass, PlacedBlock, PlacedDiagram, Rect};
pub use {trellis_core, trellis_hierarchy, trellis_physics};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Reads a diagram from a JSON file.
pub fn load_diagram(path: impl AsRef<std::path::Path>) -> Result<ClassDiagram> {
    Ok(ClassDiagram::from_json_file(path)?)
}
