//! Connection line routing.
//!
//! Inheritance lines always run from the child's top edge to the parent's bottom edge, with a
//! horizontal jog at mid height when the two are not aligned. Composition lines pick whichever
//! pair of facing side midpoints is closest and bend once across the dominant direction.

use serde::{Serialize, Serializer};
use trellis_core::{DiagramClass, PlacedDiagram, Point, Rect, point};

/// Horizontal offset below which an inheritance line is drawn straight.
pub const ALIGNMENT_TOLERANCE: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConnectionKind {
    PrimaryInheritance,
    SecondaryInheritance,
    Composition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    pub fn anchor(self, r: &Rect) -> Point {
        match self {
            Side::Left => point(r.left(), r.center_y()),
            Side::Right => point(r.right(), r.center_y()),
            Side::Top => point(r.center_x(), r.top()),
            Side::Bottom => point(r.center_x(), r.bottom()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionLine {
    pub from_class_id: String,
    pub to_class_id: String,
    pub kind: ConnectionKind,
    pub label: String,
    pub from_side: Side,
    pub to_side: Side,
    #[serde(serialize_with = "points_as_pairs")]
    pub points: Vec<Point>,
}

fn points_as_pairs<S: Serializer>(points: &[Point], s: S) -> Result<S::Ok, S::Error> {
    s.collect_seq(points.iter().map(|p| [p.x, p.y]))
}

/// Composition candidates in tie-break order.
const COMPOSITION_SIDES: [(Side, Side); 4] = [
    (Side::Right, Side::Left),
    (Side::Left, Side::Right),
    (Side::Bottom, Side::Top),
    (Side::Top, Side::Bottom),
];

pub fn inheritance_path(child: &Rect, parent: &Rect) -> Vec<Point> {
    let start = Side::Top.anchor(child);
    let end = Side::Bottom.anchor(parent);
    if (end.x - start.x).abs() > ALIGNMENT_TOLERANCE {
        let mid_y = (start.y + end.y) * 0.5;
        vec![start, point(start.x, mid_y), point(end.x, mid_y), end]
    } else {
        vec![start, end]
    }
}

/// Closest facing side pair; the first candidate wins ties.
pub fn composition_sides(owner: &Rect, target: &Rect) -> (Side, Side) {
    let mut best = COMPOSITION_SIDES[0];
    let mut best_dist = f64::INFINITY;
    for (from, to) in COMPOSITION_SIDES {
        let d = (to.anchor(target) - from.anchor(owner)).square_length();
        if d < best_dist {
            best_dist = d;
            best = (from, to);
        }
    }
    best
}

pub fn composition_path(start: Point, end: Point) -> Vec<Point> {
    let (dx, dy) = (end.x - start.x, end.y - start.y);
    if dx.abs() > dy.abs() {
        let mid_x = (start.x + end.x) * 0.5;
        vec![start, point(mid_x, start.y), point(mid_x, end.y), end]
    } else {
        let mid_y = (start.y + end.y) * 0.5;
        vec![start, point(start.x, mid_y), point(end.x, mid_y), end]
    }
}

/// Lines for every resolvable relation. References to ids without a block are skipped.
pub fn compute_lines(classes: &[DiagramClass], placed: &PlacedDiagram) -> Vec<ConnectionLine> {
    let rects = placed.rect_map();
    let mut lines = Vec::new();

    for class in classes {
        let Some(own) = rects.get(class.id.as_str()) else {
            continue;
        };

        for (ix, parent_id) in class.parent_class_ids.iter().enumerate() {
            let Some(parent) = rects.get(parent_id.as_str()) else {
                continue;
            };
            lines.push(ConnectionLine {
                from_class_id: class.id.clone(),
                to_class_id: parent_id.clone(),
                kind: if ix == 0 {
                    ConnectionKind::PrimaryInheritance
                } else {
                    ConnectionKind::SecondaryInheritance
                },
                label: String::new(),
                from_side: Side::Top,
                to_side: Side::Bottom,
                points: inheritance_path(own, parent),
            });
        }

        for child in &class.child_objects {
            let Some(target) = rects.get(child.class_id.as_str()) else {
                continue;
            };
            let (from_side, to_side) = composition_sides(own, target);
            lines.push(ConnectionLine {
                from_class_id: class.id.clone(),
                to_class_id: child.class_id.clone(),
                kind: ConnectionKind::Composition,
                label: child.label.clone(),
                from_side,
                to_side,
                points: composition_path(from_side.anchor(own), to_side.anchor(target)),
            });
        }
    }
    lines
}

/// Holds the last computed lines and recomputes them only while the layout is moving.
#[derive(Debug, Clone)]
pub struct LineCache {
    lines: Vec<ConnectionLine>,
    dirty: bool,
}

impl Default for LineCache {
    fn default() -> Self {
        Self {
            lines: Vec::new(),
            dirty: true,
        }
    }
}

impl LineCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn lines(&self) -> &[ConnectionLine] {
        &self.lines
    }

    pub fn refresh(
        &mut self,
        classes: &[DiagramClass],
        placed: &PlacedDiagram,
        settled: bool,
        dragging: bool,
    ) -> &[ConnectionLine] {
        if self.dirty || !settled || dragging {
            self.lines = compute_lines(classes, placed);
        }
        if settled && !dragging {
            self.dirty = false;
        }
        &self.lines
    }
}
