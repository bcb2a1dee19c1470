//! JSON diagram files.
//!
//! ```json
//! { "name": "game", "classes": [
//!     { "id": "Player", "type_name": "Player", "parent_class_ids": ["Actor"],
//!       "x": 0, "y": 0, "margin": 8,
//!       "properties": [{ "name": "hp", "type": "int", "default_value": "100" }],
//!       "components": [{ "name": "body", "type": "Rigidbody", "properties": [] }],
//!       "child_objects": [{ "class_id": "Inventory", "label": "inventory" }] } ] }
//! ```
//!
//! The older single `parent_class_id` field (string or null) is still accepted. A class at
//! `x = y = 0` (or without coordinates) is left for the planner to place.

use crate::error::{Error, Result};
use crate::geom::point;
use crate::model::{
    ChildObject, ClassDiagram, Component, DEFAULT_MARGIN, DiagramClass, Property,
};
use rustc_hash::FxHashSet;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDiagram {
    name: String,
    classes: Vec<RawClass>,
    canvas_width: f64,
    canvas_height: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawClass {
    id: Option<String>,
    type_name: Option<String>,
    parent_class_ids: Option<Vec<String>>,
    parent_class_id: Option<String>,
    x: Option<f64>,
    y: Option<f64>,
    margin: Option<f64>,
    properties: Vec<Property>,
    components: Vec<Component>,
    child_objects: Vec<ChildObject>,
}

impl ClassDiagram {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let raw: RawDiagram = serde_json::from_str(text)?;
        Self::from_raw(raw)
    }

    pub fn from_json_reader(reader: impl std::io::Read) -> Result<Self> {
        let raw: RawDiagram = serde_json::from_reader(reader)?;
        Self::from_raw(raw)
    }

    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_json_reader(std::io::BufReader::new(file))
    }

    fn from_raw(raw: RawDiagram) -> Result<Self> {
        let mut seen: FxHashSet<String> = FxHashSet::default();
        let mut classes = Vec::with_capacity(raw.classes.len());
        for (index, c) in raw.classes.into_iter().enumerate() {
            let id = c.id.ok_or(Error::MissingClassId { index })?;
            if !seen.insert(id.clone()) {
                return Err(Error::DuplicateClassId { id });
            }
            let parent_class_ids = match (c.parent_class_ids, c.parent_class_id) {
                (Some(ids), _) => ids,
                (None, Some(id)) => vec![id],
                (None, None) => Vec::new(),
            };
            let (x, y) = (c.x.unwrap_or(0.0), c.y.unwrap_or(0.0));
            let pin = (x != 0.0 || y != 0.0).then(|| point(x, y));
            classes.push(DiagramClass {
                type_name: c.type_name.unwrap_or_else(|| id.clone()),
                id,
                parent_class_ids,
                properties: c.properties,
                components: c.components,
                child_objects: c.child_objects,
                pin,
                margin: c.margin.unwrap_or(DEFAULT_MARGIN),
            });
        }
        tracing::debug!(name = %raw.name, classes = classes.len(), "loaded class diagram");
        Ok(Self {
            name: raw.name,
            classes,
            canvas_width: raw.canvas_width,
            canvas_height: raw.canvas_height,
        })
    }
}
