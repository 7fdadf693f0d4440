//! Group dependency ordering
//!
//! Group declarations are flat text read top to bottom, so a group must be
//! fully defined before any later line refers to it. This module builds a
//! "must precede" graph over the groups of one unit and linearizes it.
//!
//! ## Process
//!
//! 1.  **Vertices**: one per group, in declaration order.
//! 2.  **Edges**: `B -> A` whenever A's member list contains `@B` and B is a
//!     group of the same unit. References to groups defined elsewhere (or to
//!     built-ins such as `@all`) impose no local ordering.
//! 3.  **Topological Sort**: Kahn's algorithm. Among vertices that are ready
//!     at the same time, the one declared first is emitted first, so output
//!     is stable for a given input.
//!
//! A reference cycle leaves vertices that never become ready; those are
//! reported as a [`Error::GroupDependency`].

use std::collections::{BTreeSet, HashMap};

use crate::error::{Error, Result};
use crate::group::Group;
use crate::unit::ConfigUnit;

/// Directed "must precede" graph over named vertices
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Vertex names in insertion order
    vertices: Vec<String>,
    index: HashMap<String, usize>,
    /// successors[v] = vertices that must come after v
    successors: Vec<Vec<usize>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex (idempotent), returning its insertion index
    pub fn add_vertex(&mut self, name: &str) -> usize {
        if let Some(&index) = self.index.get(name) {
            return index;
        }
        let index = self.vertices.len();
        self.vertices.push(name.to_string());
        self.index.insert(name.to_string(), index);
        self.successors.push(Vec::new());
        index
    }

    /// Record that `before` must precede `after`; both are added if missing.
    /// Repeated edges are kept once.
    pub fn add_edge(&mut self, before: &str, after: &str) {
        let from = self.add_vertex(before);
        let to = self.add_vertex(after);
        if !self.successors[from].contains(&to) {
            self.successors[from].push(to);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Order vertices so every edge points forward.
    ///
    /// On a cycle, returns `Err` with the vertices that could not be placed,
    /// in insertion order.
    pub fn topological_sort(&self) -> std::result::Result<Vec<&str>, Vec<&str>> {
        let mut in_degree = vec![0usize; self.vertices.len()];
        for targets in &self.successors {
            for &to in targets {
                in_degree[to] += 1;
            }
        }

        // smallest insertion index first
        let mut ready: BTreeSet<usize> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, d)| **d == 0)
            .map(|(i, _)| i)
            .collect();

        let mut order = Vec::with_capacity(self.vertices.len());
        while let Some(next) = ready.pop_first() {
            order.push(next);
            for &to in &self.successors[next] {
                in_degree[to] -= 1;
                if in_degree[to] == 0 {
                    ready.insert(to);
                }
            }
        }

        if order.len() == self.vertices.len() {
            Ok(order.into_iter().map(|i| self.vertices[i].as_str()).collect())
        } else {
            Err(in_degree
                .iter()
                .enumerate()
                .filter(|(_, d)| **d > 0)
                .map(|(i, _)| self.vertices[i].as_str())
                .collect())
        }
    }
}

/// Build the dependency graph of one unit's own groups
pub fn build_groups_depgraph(groups: &[Group]) -> DependencyGraph {
    let mut graph = DependencyGraph::new();
    for group in groups {
        graph.add_vertex(group.name());
    }
    for group in groups {
        for referenced in group.group_references() {
            if graph.contains(referenced) {
                graph.add_edge(referenced, group.name());
            }
        }
    }
    graph
}

/// The unit's groups in an order where every group is declared before the
/// first group that references it
pub fn group_order(unit: &ConfigUnit) -> Result<Vec<&Group>> {
    let groups = unit.groups();
    if groups.is_empty() {
        return Ok(Vec::new());
    }

    let graph = build_groups_depgraph(groups);
    match graph.topological_sort() {
        Ok(order) => Ok(order
            .into_iter()
            .filter_map(|name| groups.iter().find(|g| g.name() == name))
            .collect()),
        Err(stuck) => Err(Error::GroupDependency {
            groups: stuck.into_iter().map(str::to_string).collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::ConfigTree;

    fn group(name: &str, members: &[&str]) -> Group {
        let mut g = Group::new(name);
        g.add_users(members.iter().copied());
        g
    }

    fn names(groups: &[&Group]) -> Vec<String> {
        groups.iter().map(|g| g.name().to_string()).collect()
    }

    #[test]
    fn test_topological_sort_simple() {
        let mut graph = DependencyGraph::new();
        graph.add_vertex("a");
        graph.add_edge("b", "a");
        assert_eq!(graph.topological_sort().unwrap(), vec!["b", "a"]);
    }

    #[test]
    fn test_topological_sort_ties_follow_insertion_order() {
        let mut graph = DependencyGraph::new();
        for name in ["d", "c", "b", "a"] {
            graph.add_vertex(name);
        }
        graph.add_edge("a", "c");
        assert_eq!(graph.topological_sort().unwrap(), vec!["d", "b", "a", "c"]);
    }

    #[test]
    fn test_topological_sort_reports_cycle() {
        let mut graph = DependencyGraph::new();
        graph.add_vertex("free");
        graph.add_edge("a", "b");
        graph.add_edge("b", "a");
        graph.add_edge("a", "blocked");
        let stuck = graph.topological_sort().unwrap_err();
        assert_eq!(stuck, vec!["a", "b", "blocked"]);
    }

    #[test]
    fn test_group_order_dependency_first() {
        let mut tree = ConfigTree::new("gitolite.conf");
        let unit = tree.unit_mut(tree.root());
        unit.add_group(group("A", &["@B", "x"])).unwrap();
        unit.add_group(group("B", &["y"])).unwrap();

        let order = group_order(unit).unwrap();
        assert_eq!(names(&order), vec!["B", "A"]);
    }

    #[test]
    fn test_group_order_cycle() {
        let mut tree = ConfigTree::new("gitolite.conf");
        let unit = tree.unit_mut(tree.root());
        unit.add_group(group("A", &["@B"])).unwrap();
        unit.add_group(group("B", &["@A"])).unwrap();

        match group_order(unit) {
            Err(Error::GroupDependency { groups }) => assert_eq!(groups, vec!["A", "B"]),
            other => panic!("expected a group dependency error, got {:?}", other),
        }
    }

    #[test]
    fn test_group_order_self_reference_is_a_cycle() {
        let mut tree = ConfigTree::new("gitolite.conf");
        let unit = tree.unit_mut(tree.root());
        unit.add_group(group("loop", &["@loop", "bob"])).unwrap();
        assert!(group_order(unit).is_err());
    }

    #[test]
    fn test_group_order_empty() {
        let tree = ConfigTree::new("gitolite.conf");
        assert!(group_order(tree.unit(tree.root())).unwrap().is_empty());
    }

    #[test]
    fn test_group_order_ignores_foreign_references() {
        let mut tree = ConfigTree::new("gitolite.conf");
        let unit = tree.unit_mut(tree.root());
        unit.add_group(group("devs", &["@all", "@elsewhere", "bob"])).unwrap();
        unit.add_group(group("ops", &["carol"])).unwrap();

        let order = group_order(unit).unwrap();
        assert_eq!(names(&order), vec!["devs", "ops"]);
    }

    #[test]
    fn test_group_order_chain() {
        let mut tree = ConfigTree::new("gitolite.conf");
        let unit = tree.unit_mut(tree.root());
        unit.add_group(group("all-staff", &["@devs", "@ops"])).unwrap();
        unit.add_group(group("devs", &["@juniors", "bob"])).unwrap();
        unit.add_group(group("ops", &["carol"])).unwrap();
        unit.add_group(group("juniors", &["dave"])).unwrap();

        let order = names(&group_order(unit).unwrap());
        let pos = |n: &str| order.iter().position(|g| g == n).unwrap();
        assert!(pos("juniors") < pos("devs"));
        assert!(pos("devs") < pos("all-staff"));
        assert!(pos("ops") < pos("all-staff"));
    }
}
