//! Immutable dependency graph of resource nodes.

use crate::error::{PlannerError, Result};
use crate::models::{DependencyEdge, ResourceKind, ResourceNode, SubnetAssignment, Tier};
use std::collections::{HashMap, HashSet};

/// Resource nodes plus "must exist before" edges.
///
/// Nodes keep their declaration order, which is also the tie-break order of
/// [`creation_order`](crate::processing::creation_order).
#[derive(Debug, Clone)]
pub struct TopologyGraph {
    nodes: Vec<ResourceNode>,
    edges: Vec<DependencyEdge>,
    index: HashMap<String, usize>,
    subnets: Vec<SubnetAssignment>,
}

impl TopologyGraph {
    /// Assemble a graph from already-built parts.
    ///
    /// Ids must be unique and every edge endpoint must be a node. Cycles are
    /// not rejected here; ordering reports them.
    pub fn from_parts(nodes: Vec<ResourceNode>, edges: Vec<DependencyEdge>) -> Result<TopologyGraph> {
        TopologyGraph::with_subnets(nodes, edges, Vec::new())
    }

    pub(crate) fn with_subnets(
        nodes: Vec<ResourceNode>,
        edges: Vec<DependencyEdge>,
        subnets: Vec<SubnetAssignment>,
    ) -> Result<TopologyGraph> {
        let mut index = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            if index.insert(node.id.clone(), i).is_some() {
                return Err(PlannerError::GraphConstruction(format!(
                    "duplicate resource id '{}'",
                    node.id
                )));
            }
        }
        for edge in &edges {
            for end in [&edge.from, &edge.to] {
                if !index.contains_key(end) {
                    return Err(PlannerError::GraphConstruction(format!(
                        "edge {} -> {} names unknown resource '{end}'",
                        edge.from, edge.to
                    )));
                }
            }
        }
        Ok(TopologyGraph {
            nodes,
            edges,
            index,
            subnets,
        })
    }

    /// Nodes in declaration order.
    pub fn nodes(&self) -> &[ResourceNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[DependencyEdge] {
        &self.edges
    }

    /// Subnet address assignments the graph was built from.
    pub fn subnets(&self) -> &[SubnetAssignment] {
        &self.subnets
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&ResourceNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub(crate) fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn nodes_of_kind(&self, kind: ResourceKind) -> impl Iterator<Item = &ResourceNode> {
        self.nodes.iter().filter(move |n| n.kind == kind)
    }

    /// Direct prerequisites of `id`, without duplicates, in edge order.
    pub fn dependencies_of(&self, id: &str) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.edges
            .iter()
            .filter(|e| e.to == id)
            .map(|e| e.from.as_str())
            .filter(|from| seen.insert(*from))
            .collect()
    }

    /// True when `id` directly depends on `prerequisite`.
    pub fn depends_on(&self, id: &str, prerequisite: &str) -> bool {
        self.edges
            .iter()
            .any(|e| e.to == id && e.from == prerequisite)
    }

    /// Public subnet node for an availability-zone suffix (`'a'`, `'b'`, `'c'`).
    pub fn public_subnet(&self, zone: char) -> Option<&ResourceNode> {
        self.subnets
            .iter()
            .find(|s| s.role.tier == Tier::Public && s.role.zone == zone)
            .and_then(|s| self.node(&s.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str) -> ResourceNode {
        ResourceNode::new(id, ResourceKind::Vpc)
    }

    #[test]
    fn test_from_parts_rejects_duplicate_id() {
        let err = TopologyGraph::from_parts(vec![node("vpc"), node("vpc")], vec![]).unwrap_err();
        assert_eq!(
            err,
            PlannerError::GraphConstruction("duplicate resource id 'vpc'".to_string())
        );
    }

    #[test]
    fn test_from_parts_rejects_unknown_endpoint() {
        let err = TopologyGraph::from_parts(
            vec![node("vpc")],
            vec![DependencyEdge::new("vpc", "igw")],
        )
        .unwrap_err();
        assert!(matches!(err, PlannerError::GraphConstruction(msg) if msg.contains("'igw'")));
    }

    #[test]
    fn test_dependencies_of() {
        let graph = TopologyGraph::from_parts(
            vec![node("a"), node("b"), node("c")],
            vec![
                DependencyEdge::new("a", "c"),
                DependencyEdge::new("b", "c"),
                DependencyEdge::new("a", "c"),
            ],
        )
        .unwrap();
        assert_eq!(graph.dependencies_of("c"), vec!["a", "b"]);
        assert!(graph.depends_on("c", "b"));
        assert!(!graph.depends_on("b", "c"));
        assert!(graph.dependencies_of("a").is_empty());
        assert_eq!(graph.len(), 3);
        assert!(graph.public_subnet('a').is_none());
    }
}
