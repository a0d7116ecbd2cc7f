//! Creation and teardown ordering.
//!
//! Kahn's algorithm over node positions. Ready nodes are taken lowest
//! declaration position first, so the order is the same on every run.

use super::TopologyGraph;
use crate::error::{PlannerError, Result};
use crate::models::{PlannedResource, ResourceNode};
use itertools::Itertools;
use std::collections::{BTreeSet, HashSet};

/// Nodes ordered so every prerequisite comes before its dependents.
pub fn creation_order(graph: &TopologyGraph) -> Result<Vec<&ResourceNode>> {
    let nodes = graph.nodes();
    let mut indegree = vec![0usize; nodes.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    let mut seen_edges = HashSet::new();

    for edge in graph.edges() {
        // endpoints are checked when the graph is assembled
        let (Some(from), Some(to)) = (graph.position(&edge.from), graph.position(&edge.to)) else {
            continue;
        };
        if !seen_edges.insert((from, to)) {
            continue;
        }
        indegree[to] += 1;
        dependents[from].push(to);
    }

    let mut ready: BTreeSet<usize> = indegree
        .iter()
        .enumerate()
        .filter_map(|(i, deg)| if *deg == 0 { Some(i) } else { None })
        .collect();
    let mut order = Vec::with_capacity(nodes.len());

    while let Some(i) = ready.pop_first() {
        order.push(&nodes[i]);
        for &next in &dependents[i] {
            indegree[next] -= 1;
            if indegree[next] == 0 {
                ready.insert(next);
            }
        }
    }

    if order.len() < nodes.len() {
        let remaining: Vec<String> = indegree
            .iter()
            .enumerate()
            .filter(|(_, deg)| **deg > 0)
            .map(|(i, _)| nodes[i].id.clone())
            .collect();
        return Err(PlannerError::CyclicDependency { remaining });
    }

    log::trace!(
        "creation order: {}",
        order.iter().map(|n| &n.id).join(" -> ")
    );
    Ok(order)
}

/// Exact reverse of [`creation_order`].
pub fn teardown_order(graph: &TopologyGraph) -> Result<Vec<&ResourceNode>> {
    let mut order = creation_order(graph)?;
    order.reverse();
    Ok(order)
}

/// Creation order with each node's prerequisites resolved to ids.
pub fn planned_resources(graph: &TopologyGraph) -> Result<Vec<PlannedResource>> {
    Ok(creation_order(graph)?
        .into_iter()
        .map(|node| PlannedResource {
            id: node.id.clone(),
            kind: node.kind,
            attributes: node.attributes.clone(),
            depends_on: graph
                .dependencies_of(&node.id)
                .into_iter()
                .map(str::to_string)
                .collect(),
        })
        .collect())
}

impl TopologyGraph {
    pub fn creation_order(&self) -> Result<Vec<&ResourceNode>> {
        creation_order(self)
    }

    pub fn teardown_order(&self) -> Result<Vec<&ResourceNode>> {
        teardown_order(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DependencyEdge, ResourceKind};

    fn graph(ids: &[&str], edges: &[(&str, &str)]) -> TopologyGraph {
        TopologyGraph::from_parts(
            ids.iter()
                .map(|id| ResourceNode::new(id, ResourceKind::Route))
                .collect(),
            edges
                .iter()
                .map(|(from, to)| DependencyEdge::new(from, to))
                .collect(),
        )
        .unwrap()
    }

    fn ids<'a>(nodes: &[&'a ResourceNode]) -> Vec<&'a str> {
        nodes.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn test_ties_follow_declaration_order() {
        let g = graph(&["c", "b", "a"], &[]);
        assert_eq!(ids(&creation_order(&g).unwrap()), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_dependency_beats_declaration() {
        let g = graph(&["child", "other", "parent"], &[("parent", "child")]);
        assert_eq!(
            ids(&creation_order(&g).unwrap()),
            vec!["other", "parent", "child"]
        );
        assert_eq!(
            ids(&teardown_order(&g).unwrap()),
            vec!["child", "parent", "other"]
        );
    }

    #[test]
    fn test_duplicate_edges_counted_once() {
        let g = graph(&["a", "b"], &[("a", "b"), ("a", "b")]);
        assert_eq!(ids(&creation_order(&g).unwrap()), vec!["a", "b"]);
    }

    #[test]
    fn test_cycle_detected() {
        let g = graph(
            &["vpc", "x", "y", "z"],
            &[("vpc", "x"), ("x", "y"), ("y", "z"), ("z", "x")],
        );
        let err = creation_order(&g).unwrap_err();
        assert_eq!(
            err,
            PlannerError::CyclicDependency {
                remaining: vec!["x".to_string(), "y".to_string(), "z".to_string()]
            }
        );
        assert!(teardown_order(&g).is_err());
        assert!(planned_resources(&g).is_err());
    }

    #[test]
    fn test_self_edge_is_cycle() {
        let g = graph(&["a"], &[("a", "a")]);
        assert!(matches!(
            creation_order(&g),
            Err(PlannerError::CyclicDependency { .. })
        ));
    }

    #[test]
    fn test_planned_resources_resolve_dependencies() {
        let g = graph(&["route", "table", "igw"], &[("table", "route"), ("igw", "route")]);
        let planned = planned_resources(&g).unwrap();
        let order: Vec<&str> = planned.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(order, vec!["table", "igw", "route"]);
        assert_eq!(planned[2].depends_on, vec!["table", "igw"]);
        assert!(planned[0].depends_on.is_empty());
    }
}
