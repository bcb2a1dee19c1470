//! Inline expansion of related classes inside a card.
//!
//! An expanded card lists its parents and its child objects. Each of those rows can itself be
//! expanded in place to show the referenced class's own parents and children, and so on. Rows are
//! keyed by their tree path, e.g. `Player/parent/0` or `Player/child/1/parent/0`, so the same class
//! reached through two different routes keeps independent expansion state.
//!
//! Inheritance and ownership graphs may contain cycles. The walk carries the list of class ids on
//! the current path; a row pointing back at one of them is listed but never expandable.

use crate::model::{ClassIndex, DiagramClass, NestedFlags};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NestedRowKind {
    Parent,
    Child,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NestedRow {
    /// Tree path key used in [`NestedFlags`].
    pub path: String,
    /// Class the row points at (may be absent from the diagram).
    pub target_class_id: String,
    pub kind: NestedRowKind,
    /// Nesting level: 1 for rows shown inside a top-level row's expansion.
    pub depth: usize,
    pub label: String,
    pub expandable: bool,
    pub expanded: bool,
}

/// Top-level sections of one card after nested expansion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpandedSections {
    /// Rows shown under the top-level parent rows, in display order.
    pub parent_rows: Vec<NestedRow>,
    /// Rows shown under the top-level child-object rows, in display order.
    pub child_rows: Vec<NestedRow>,
}

impl ExpandedSections {
    pub fn extra_row_count(&self) -> usize {
        self.parent_rows.len() + self.child_rows.len()
    }
}

pub fn parent_path(owner_path: &str, index: usize) -> String {
    format!("{owner_path}/parent/{index}")
}

pub fn child_path(owner_path: &str, index: usize) -> String {
    format!("{owner_path}/child/{index}")
}

/// Collects the rows revealed by nested expansion under `class`'s top-level parent and child rows.
/// The top-level rows themselves are not included; they always exist on an expanded card.
pub fn expanded_sections(
    index: &ClassIndex<'_>,
    class: &DiagramClass,
    flags: &NestedFlags,
    max_depth: usize,
) -> ExpandedSections {
    let root_path = [class.id.as_str()];
    let mut out = ExpandedSections::default();

    for (i, parent_id) in class.parent_class_ids.iter().enumerate() {
        let path = parent_path(&class.id, i);
        if is_open(index, parent_id, &path, flags, &root_path, 0, max_depth) {
            if let Some(target) = index.get(parent_id) {
                walk(index, target, &path, flags, &root_path, 1, max_depth, &mut out.parent_rows);
            }
        }
    }

    for (i, child) in class.child_objects.iter().enumerate() {
        let path = child_path(&class.id, i);
        if is_open(index, &child.class_id, &path, flags, &root_path, 0, max_depth) {
            if let Some(target) = index.get(&child.class_id) {
                walk(index, target, &path, flags, &root_path, 1, max_depth, &mut out.child_rows);
            }
        }
    }

    out
}

fn can_expand(
    index: &ClassIndex<'_>,
    target_id: &str,
    visited: &[&str],
    depth: usize,
    max_depth: usize,
) -> bool {
    depth < max_depth && index.contains(target_id) && !visited.contains(&target_id)
}

#[allow(clippy::too_many_arguments)]
fn is_open(
    index: &ClassIndex<'_>,
    target_id: &str,
    path: &str,
    flags: &NestedFlags,
    visited: &[&str],
    depth: usize,
    max_depth: usize,
) -> bool {
    can_expand(index, target_id, visited, depth, max_depth)
        && flags.get(path).copied().unwrap_or(false)
}

/// Lists `class`'s parent and child rows at `depth`, recursing into open ones. `visited` is the
/// chain of classes from the card root down to (but excluding) `class`.
#[allow(clippy::too_many_arguments)]
fn walk(
    index: &ClassIndex<'_>,
    class: &DiagramClass,
    owner_path: &str,
    flags: &NestedFlags,
    visited: &[&str],
    depth: usize,
    max_depth: usize,
    out: &mut Vec<NestedRow>,
) {
    let mut on_path: Vec<&str> = Vec::with_capacity(visited.len() + 1);
    on_path.extend_from_slice(visited);
    on_path.push(class.id.as_str());

    let parents = class
        .parent_class_ids
        .iter()
        .enumerate()
        .map(|(i, id)| (parent_path(owner_path, i), id.as_str(), NestedRowKind::Parent, None));
    let children = class.child_objects.iter().enumerate().map(|(i, co)| {
        (
            child_path(owner_path, i),
            co.class_id.as_str(),
            NestedRowKind::Child,
            Some(co.label.as_str()),
        )
    });

    for (path, target_id, kind, child_label) in parents.chain(children) {
        let expandable = can_expand(index, target_id, &on_path, depth, max_depth);
        let expanded = expandable && flags.get(&path).copied().unwrap_or(false);
        let type_name = index.display_name(target_id);
        let label = match child_label {
            Some(l) if !l.is_empty() => format!("{type_name}: {l}"),
            Some(_) => format!("{type_name}: {type_name}"),
            None => type_name.to_string(),
        };
        out.push(NestedRow {
            path: path.clone(),
            target_class_id: target_id.to_string(),
            kind,
            depth,
            label,
            expandable,
            expanded,
        });
        if expanded {
            if let Some(target) = index.get(target_id) {
                walk(index, target, &path, flags, &on_path, depth + 1, max_depth, out);
            }
        }
    }
}
