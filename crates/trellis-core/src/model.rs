//! Class diagram model and the placement records produced from it.

use crate::geom::{Point, Rect, Size};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MARGIN: f64 = 8.0;

/// Expanded/collapsed flag per class id. Missing entries mean collapsed.
pub type ExpandedFlags = FxHashMap<String, bool>;

/// Expanded flag per nested tree path (see [`crate::nesting`]).
pub type NestedFlags = FxHashMap<String, bool>;

/// Caller-resolved block sizes, in diagram order.
pub type BlockSizes = IndexMap<String, Size>;

/// Top-left positions per class id.
pub type PositionMap = IndexMap<String, Point>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Property {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub default_value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Component {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub properties: Vec<Property>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChildObject {
    pub class_id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiagramClass {
    pub id: String,
    pub type_name: String,
    /// `[0]` is the primary parent (tree layout, permanent line); the rest are secondary.
    pub parent_class_ids: Vec<String>,
    pub properties: Vec<Property>,
    pub components: Vec<Component>,
    pub child_objects: Vec<ChildObject>,
    /// Fixed top-left position. `None` lets the planner decide.
    pub pin: Option<Point>,
    pub margin: f64,
}

impl DiagramClass {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            type_name: id.clone(),
            id,
            parent_class_ids: Vec::new(),
            properties: Vec::new(),
            components: Vec::new(),
            child_objects: Vec::new(),
            pin: None,
            margin: DEFAULT_MARGIN,
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_class_ids.push(parent_id.into());
        self
    }

    pub fn with_child(mut self, class_id: impl Into<String>, label: impl Into<String>) -> Self {
        self.child_objects.push(ChildObject {
            class_id: class_id.into(),
            label: label.into(),
        });
        self
    }

    pub fn with_property(
        mut self,
        name: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Self {
        self.properties.push(Property {
            name: name.into(),
            type_name: type_name.into(),
            default_value: String::new(),
        });
        self
    }

    pub fn with_pin(mut self, x: f64, y: f64) -> Self {
        self.pin = Some(crate::geom::point(x, y));
        self
    }

    pub fn primary_parent(&self) -> Option<&str> {
        self.parent_class_ids.first().map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassDiagram {
    pub name: String,
    pub classes: Vec<DiagramClass>,
    pub canvas_width: f64,
    pub canvas_height: f64,
}

impl ClassDiagram {
    pub fn new(classes: Vec<DiagramClass>) -> Self {
        Self {
            classes,
            ..Default::default()
        }
    }

    pub fn index(&self) -> ClassIndex<'_> {
        ClassIndex::new(&self.classes)
    }
}

/// Id → position lookup over a class slice, built once per pass instead of scanning the list for
/// every reference. The first class wins when ids repeat.
#[derive(Debug, Clone)]
pub struct ClassIndex<'a> {
    classes: &'a [DiagramClass],
    by_id: FxHashMap<&'a str, usize>,
}

impl<'a> ClassIndex<'a> {
    pub fn new(classes: &'a [DiagramClass]) -> Self {
        let mut by_id: FxHashMap<&'a str, usize> = FxHashMap::default();
        by_id.reserve(classes.len());
        for (ix, c) in classes.iter().enumerate() {
            by_id.entry(c.id.as_str()).or_insert(ix);
        }
        Self { classes, by_id }
    }

    pub fn classes(&self) -> &'a [DiagramClass] {
        self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    pub fn get(&self, id: &str) -> Option<&'a DiagramClass> {
        self.position(id).map(|ix| &self.classes[ix])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Display name for a referenced id, falling back to the raw id for unknown classes.
    pub fn display_name<'s>(&self, id: &'s str) -> &'s str
    where
        'a: 's,
    {
        self.get(id).map(|c| c.type_name.as_str()).unwrap_or(id)
    }
}

/// One block as seen by renderers, the router and the overlap detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedBlock {
    pub class_id: String,
    pub rect: Rect,
    pub margin: f64,
    pub expanded: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlacedDiagram {
    pub blocks: Vec<PlacedBlock>,
}

impl PlacedDiagram {
    pub fn get(&self, class_id: &str) -> Option<&PlacedBlock> {
        self.blocks.iter().find(|b| b.class_id == class_id)
    }

    /// Id to rect. The first block wins when ids repeat, matching [`ClassIndex`].
    pub fn rect_map(&self) -> FxHashMap<&str, Rect> {
        let mut map = FxHashMap::default();
        for b in &self.blocks {
            map.entry(b.class_id.as_str()).or_insert(b.rect);
        }
        map
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
