//! Inheritance depth (row) assignment.

use std::collections::VecDeque;
use trellis_core::ClassIndex;

/// Primary-parent tree edges, by class position.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    pub parent: Vec<Option<usize>>,
    pub children: Vec<Vec<usize>>,
}

impl Tree {
    /// Edges to ids missing from the diagram (and self-edges) are dropped.
    pub fn from_index(index: &ClassIndex<'_>) -> Self {
        let n = index.len();
        let mut parent = vec![None; n];
        let mut children = vec![Vec::new(); n];
        for (ix, class) in index.classes().iter().enumerate() {
            let Some(p) = class.primary_parent().and_then(|id| index.position(id)) else {
                continue;
            };
            if p == ix {
                continue;
            }
            parent[ix] = Some(p);
            children[p].push(ix);
        }
        Self { parent, children }
    }

    pub fn is_root(&self, ix: usize) -> bool {
        self.parent[ix].is_none()
    }
}

/// Breadth-first depth from every root through primary-parent edges. Roots are classes without a
/// (resolvable) primary parent. Classes never reached, i.e. those on or below an inheritance
/// cycle, stay at depth 0.
pub fn assign_depths(tree: &Tree) -> Vec<usize> {
    let n = tree.parent.len();
    let mut depth = vec![0usize; n];
    let mut visited = vec![false; n];
    let mut queue: VecDeque<usize> = VecDeque::new();

    for ix in 0..n {
        if tree.is_root(ix) {
            visited[ix] = true;
            queue.push_back(ix);
        }
    }

    while let Some(ix) = queue.pop_front() {
        for &child in &tree.children[ix] {
            if visited[child] {
                continue;
            }
            visited[child] = true;
            depth[child] = depth[ix] + 1;
            queue.push_back(child);
        }
    }

    let unreached = visited.iter().filter(|v| !**v).count();
    if unreached > 0 {
        tracing::debug!(unreached, "inheritance cycle: unreached classes default to depth 0");
    }
    depth
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::DiagramClass;

    fn depths(classes: &[DiagramClass]) -> Vec<usize> {
        let index = ClassIndex::new(classes);
        assign_depths(&Tree::from_index(&index))
    }

    #[test]
    fn dangling_parent_makes_a_root() {
        let classes = vec![DiagramClass::new("A").with_parent("Missing")];
        assert_eq!(depths(&classes), vec![0]);
    }

    #[test]
    fn self_parent_is_ignored() {
        let classes = vec![DiagramClass::new("A").with_parent("A")];
        assert_eq!(depths(&classes), vec![0]);
    }

    #[test]
    fn cycle_members_default_to_zero() {
        let classes = vec![
            DiagramClass::new("A").with_parent("B"),
            DiagramClass::new("B").with_parent("A"),
            DiagramClass::new("C").with_parent("B"),
            DiagramClass::new("R"),
            DiagramClass::new("S").with_parent("R"),
        ];
        assert_eq!(depths(&classes), vec![0, 0, 0, 0, 1]);
    }
}
