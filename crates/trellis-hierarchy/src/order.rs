//! Row ordering / crossing minimization.
//!
//! Rows are reordered by the barycenter (weighted mean x-center) of each block's structural
//! neighbours, alternating a down-sweep (neighbour = primary parent) with an up-sweep
//! (neighbours = primary children). Composition owners and targets pull in both directions with a
//! reduced weight. The number of sweeps is fixed, so the result is deterministic and bounded.

use crate::depth::Tree;
use trellis_core::ClassIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sweep {
    Down,
    Up,
}

/// Composition owners and targets per class, excluding self-references.
pub fn composition_neighbours(index: &ClassIndex<'_>) -> Vec<Vec<usize>> {
    let mut out = vec![Vec::new(); index.len()];
    for (owner, class) in index.classes().iter().enumerate() {
        for co in &class.child_objects {
            let Some(target) = index.position(&co.class_id) else {
                continue;
            };
            if target == owner {
                continue;
            }
            if !out[owner].contains(&target) {
                out[owner].push(target);
            }
            if !out[target].contains(&owner) {
                out[target].push(owner);
            }
        }
    }
    out
}

/// Groups class positions into rows by depth, keeping encounter order within a row.
pub fn rows_by_depth(depths: &[usize]) -> Vec<Vec<usize>> {
    let row_count = depths.iter().copied().max().map_or(0, |d| d + 1);
    let mut rows = vec![Vec::new(); row_count];
    for (ix, &d) in depths.iter().enumerate() {
        rows[d].push(ix);
    }
    rows
}

pub struct RowOrdering<'a> {
    pub tree: &'a Tree,
    pub composition: &'a [Vec<usize>],
    pub widths: &'a [f64],
    /// Left edge of every row.
    pub start_x: f64,
    /// Horizontal gap between neighbouring blocks.
    pub margin: f64,
    pub composition_weight: f64,
}

impl RowOrdering<'_> {
    /// Packs `row` left-to-right, writing each block's x-center.
    pub fn pack(&self, row: &[usize], centers: &mut [f64]) {
        let mut x = self.start_x;
        for &ix in row {
            centers[ix] = x + self.widths[ix] * 0.5;
            x += self.widths[ix] + self.margin;
        }
    }

    pub fn barycenter(&self, ix: usize, sweep: Sweep, centers: &[f64]) -> f64 {
        let mut sum = 0.0;
        let mut weight = 0.0;
        match sweep {
            Sweep::Down => {
                if let Some(p) = self.tree.parent[ix] {
                    sum += centers[p];
                    weight += 1.0;
                }
            }
            Sweep::Up => {
                for &c in &self.tree.children[ix] {
                    sum += centers[c];
                    weight += 1.0;
                }
            }
        }
        for &o in &self.composition[ix] {
            sum += self.composition_weight * centers[o];
            weight += self.composition_weight;
        }
        if weight > 0.0 {
            sum / weight
        } else {
            centers[ix]
        }
    }

    /// Stable sort by barycenter (ties keep their current order), then repack.
    pub fn reorder(&self, row: &mut Vec<usize>, sweep: Sweep, centers: &mut [f64]) {
        let mut keyed: Vec<(f64, usize)> = row
            .iter()
            .map(|&ix| (self.barycenter(ix, sweep, centers), ix))
            .collect();
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
        row.clear();
        row.extend(keyed.into_iter().map(|(_, ix)| ix));
        self.pack(row, centers);
    }

    /// Initial packing followed by `sweeps` down/up sweep pairs. Returns x-centers by class
    /// position.
    pub fn run(&self, rows: &mut [Vec<usize>], sweeps: usize) -> Vec<f64> {
        let mut centers = vec![0.0; self.widths.len()];
        for row in rows.iter() {
            self.pack(row, &mut centers);
        }
        for _ in 0..sweeps {
            for row in rows.iter_mut().skip(1) {
                self.reorder(row, Sweep::Down, &mut centers);
            }
            for row in rows.iter_mut().rev() {
                self.reorder(row, Sweep::Up, &mut centers);
            }
        }
        centers
    }
}

/// Number of crossing pairs between consecutive rows over primary-parent edges.
pub fn count_crossings(tree: &Tree, rows: &[Vec<usize>]) -> usize {
    let mut slot = vec![0usize; tree.parent.len()];
    for row in rows {
        for (pos, &ix) in row.iter().enumerate() {
            slot[ix] = pos;
        }
    }
    let mut total = 0;
    for lower in rows.iter().skip(1) {
        let edges: Vec<(usize, usize)> = lower
            .iter()
            .filter_map(|&c| tree.parent[c].map(|p| (slot[p], slot[c])))
            .collect();
        for (i, a) in edges.iter().enumerate() {
            for b in &edges[i + 1..] {
                if (a.0 < b.0 && a.1 > b.1) || (a.0 > b.0 && a.1 < b.1) {
                    total += 1;
                }
            }
        }
    }
    total
}
