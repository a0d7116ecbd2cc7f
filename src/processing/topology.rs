//! Standard VPC topology.
//!
//! Six subnets over three availability zones, an internet gateway for the
//! public tier and a single NAT gateway (in `public-a`) for the private tier.

use super::allocator::allocate;
use super::TopologyGraph;
use crate::config::{VpcConfig, CIDR_BLOCK_ALL, MANAGED_BY};
use crate::error::{PlannerError, Result};
use crate::models::{
    AddressBlock, AttrValue, DependencyEdge, IndexBounds, PartitionScheme, ResourceKind,
    ResourceNode, ResourceRef, SubnetAssignment, SubnetRole, Tier,
};
use itertools::Itertools;
use std::collections::{BTreeMap, HashSet};

pub const VPC_ID: &str = "vpc";
pub const IGW_ID: &str = "igw";
pub const NAT_EIP_ID: &str = "nat-gateway-eip";
pub const NAT_GATEWAY_ID: &str = "nat-gateway";

/// Role of each allocator index, in index order.
pub const SUBNET_LAYOUT: [(Tier, char); 6] = [
    (Tier::Public, 'a'),
    (Tier::Public, 'b'),
    (Tier::Public, 'c'),
    (Tier::Private, 'a'),
    (Tier::Private, 'b'),
    (Tier::Private, 'c'),
];

/// Allocate one block per [`SUBNET_LAYOUT`] slot.
///
/// Fails with `GraphConstruction` when a role or a block comes out twice,
/// which a lenient scheme with too few slots can cause.
pub fn assign_subnets(
    parent: AddressBlock,
    region: &str,
    scheme: PartitionScheme,
) -> Result<Vec<SubnetAssignment>> {
    let mut roles = HashSet::new();
    let mut blocks = HashSet::new();
    let mut assignments = Vec::with_capacity(SUBNET_LAYOUT.len());

    for (index, (tier, zone)) in SUBNET_LAYOUT.iter().enumerate() {
        let role = SubnetRole::new(*tier, *zone);
        let cidr_block = allocate(parent, scheme, index as u32)?;
        if !roles.insert(role) {
            return Err(PlannerError::GraphConstruction(format!(
                "subnet role {role} assigned twice"
            )));
        }
        if !blocks.insert(cidr_block) {
            return Err(PlannerError::GraphConstruction(format!(
                "subnet {role} got {cidr_block}, already assigned to another subnet"
            )));
        }
        assignments.push(SubnetAssignment {
            role,
            availability_zone: format!("{region}{zone}"),
            cidr_block,
            index: index as u32,
        });
    }
    Ok(assignments)
}

/// Accumulates nodes and edges; [`TopologyBuilder::build`] freezes them.
///
/// References inside attributes become edges automatically. A node may only
/// reference nodes added before it, so a builder graph cannot contain a cycle.
#[derive(Debug)]
pub struct TopologyBuilder {
    managed_by: String,
    nodes: Vec<ResourceNode>,
    edges: Vec<DependencyEdge>,
    ids: HashSet<String>,
    subnets: Vec<SubnetAssignment>,
}

impl TopologyBuilder {
    /// `managed_by` is written into the `ManagedBy` tag of every tagged node.
    pub fn new(managed_by: &str) -> TopologyBuilder {
        TopologyBuilder {
            managed_by: managed_by.to_string(),
            nodes: Vec::new(),
            edges: Vec::new(),
            ids: HashSet::new(),
            subnets: Vec::new(),
        }
    }

    pub fn managed_by(&self) -> &str {
        &self.managed_by
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// `Name` + `ManagedBy` tag set.
    pub fn tags(&self, name: &str) -> AttrValue {
        let mut tags = BTreeMap::new();
        tags.insert("Name".to_string(), name.to_string());
        tags.insert("ManagedBy".to_string(), self.managed_by.clone());
        AttrValue::Tags(tags)
    }

    /// Add a node. Its attribute references plus `depends_on` become edges.
    pub fn add(&mut self, node: ResourceNode, depends_on: &[&str]) -> Result<()> {
        if self.ids.contains(&node.id) {
            return Err(PlannerError::GraphConstruction(format!(
                "duplicate resource id '{}'",
                node.id
            )));
        }

        let mut prerequisites: Vec<&str> = node.referenced_nodes();
        prerequisites.extend_from_slice(depends_on);
        let mut seen = HashSet::new();
        let mut edges = Vec::new();
        for prerequisite in prerequisites {
            if !self.ids.contains(prerequisite) {
                return Err(PlannerError::GraphConstruction(format!(
                    "'{}' depends on undeclared resource '{prerequisite}'",
                    node.id
                )));
            }
            if seen.insert(prerequisite) {
                edges.push(DependencyEdge::new(prerequisite, &node.id));
            }
        }

        log::trace!("add {node} after {seen:?}");
        self.edges.extend(edges);
        self.ids.insert(node.id.clone());
        self.nodes.push(node);
        Ok(())
    }

    /// Run `f` as one step: on error every node, edge and subnet it added is
    /// dropped again, leaving the builder as it was.
    pub(crate) fn atomically<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut TopologyBuilder) -> Result<()>,
    {
        let (nodes, edges, subnets) = (self.nodes.len(), self.edges.len(), self.subnets.len());
        let result = f(self);
        if result.is_err() {
            for node in self.nodes.drain(nodes..) {
                self.ids.remove(&node.id);
            }
            self.edges.truncate(edges);
            self.subnets.truncate(subnets);
        }
        result
    }

    /// Add the standard VPC layout. Adds all of it or, on error, nothing.
    pub fn add_vpc(
        &mut self,
        cidr_block: &str,
        name: &str,
        region: &str,
        scheme: PartitionScheme,
    ) -> Result<()> {
        self.atomically(|builder| builder.add_vpc_layout(cidr_block, name, region, scheme))
    }

    fn add_vpc_layout(
        &mut self,
        cidr_block: &str,
        name: &str,
        region: &str,
        scheme: PartitionScheme,
    ) -> Result<()> {
        let parent = AddressBlock::parse(cidr_block)?;
        let subnets = assign_subnets(parent, region, scheme)?;
        let all = AttrValue::Cidr(AddressBlock::parse(CIDR_BLOCK_ALL)?);

        self.add(
            ResourceNode::new(VPC_ID, ResourceKind::Vpc)
                .with("cidr_block", AttrValue::Cidr(parent))
                .with("enable_dns_support", AttrValue::Bool(true))
                .with("enable_dns_hostnames", AttrValue::Bool(true))
                .with("tags", self.tags(name)),
            &[],
        )?;
        self.add(
            ResourceNode::new(IGW_ID, ResourceKind::InternetGateway)
                .with("vpc_id", AttrValue::Ref(ResourceRef::id(VPC_ID)))
                .with("tags", self.tags(name)),
            &[],
        )?;

        let (public, private): (Vec<_>, Vec<_>) =
            subnets.iter().partition(|s| s.role.tier == Tier::Public);

        self.add_tier(name, Tier::Public, &public, &all, IGW_ID, "gateway_id")?;

        for subnet in &private {
            self.add_subnet(name, subnet)?;
        }
        self.add(
            ResourceNode::new(NAT_EIP_ID, ResourceKind::ElasticIp)
                .with("vpc", AttrValue::Bool(true))
                .with("tags", self.tags(&format!("{name}-nat-gateway"))),
            &[],
        )?;
        // NAT placement is pinned to the first public subnet
        let nat_subnet = public
            .first()
            .map(|s| s.name())
            .ok_or_else(|| PlannerError::GraphConstruction("no public subnet for NAT".into()))?;
        self.add(
            ResourceNode::new(NAT_GATEWAY_ID, ResourceKind::NatGateway)
                .with(
                    "allocation_id",
                    AttrValue::Ref(ResourceRef::output(NAT_EIP_ID, "allocation_id")),
                )
                .with("connectivity_type", AttrValue::str("public"))
                .with("subnet_id", AttrValue::Ref(ResourceRef::id(&nat_subnet)))
                .with("tags", self.tags(&format!("{name}-nat-gateway"))),
            &[IGW_ID],
        )?;

        self.add_routing(name, Tier::Private, &private, &all, NAT_GATEWAY_ID, "nat_gateway_id")?;

        self.subnets.extend(subnets.iter().cloned());
        log::debug!(
            "planned vpc '{name}' {parent}: {}",
            subnets.iter().join(", ")
        );
        Ok(())
    }

    fn add_subnet(&mut self, name: &str, subnet: &SubnetAssignment) -> Result<()> {
        let mut node = ResourceNode::new(&subnet.name(), ResourceKind::Subnet)
            .with("availability_zone", AttrValue::str(&subnet.availability_zone))
            .with("cidr_block", AttrValue::Cidr(subnet.cidr_block))
            .with(
                "enable_resource_name_dns_a_record_on_launch",
                AttrValue::Bool(true),
            )
            .with("vpc_id", AttrValue::Ref(ResourceRef::id(VPC_ID)))
            .with("tags", self.tags(&format!("{name}-{}", subnet.role)));
        if subnet.role.tier == Tier::Public {
            node = node.with("map_public_ip_on_launch", AttrValue::Bool(true));
        }
        self.add(node, &[])
    }

    fn add_tier(
        &mut self,
        name: &str,
        tier: Tier,
        subnets: &[&SubnetAssignment],
        destination: &AttrValue,
        gateway: &str,
        gateway_attr: &str,
    ) -> Result<()> {
        for subnet in subnets {
            self.add_subnet(name, subnet)?;
        }
        self.add_routing(name, tier, subnets, destination, gateway, gateway_attr)
    }

    /// Route table, default route through `gateway`, and one association per subnet.
    fn add_routing(
        &mut self,
        name: &str,
        tier: Tier,
        subnets: &[&SubnetAssignment],
        destination: &AttrValue,
        gateway: &str,
        gateway_attr: &str,
    ) -> Result<()> {
        let table = tier.as_str();
        self.add(
            ResourceNode::new(table, ResourceKind::RouteTable)
                .with("vpc_id", AttrValue::Ref(ResourceRef::id(VPC_ID)))
                .with("tags", self.tags(&format!("{name}-{table}"))),
            &[],
        )?;
        self.add(
            ResourceNode::new(&format!("{table}-subnets-to-internet"), ResourceKind::Route)
                .with("route_table_id", AttrValue::Ref(ResourceRef::id(table)))
                .with("destination_cidr_block", destination.clone())
                .with(gateway_attr, AttrValue::Ref(ResourceRef::id(gateway))),
            &[],
        )?;
        for subnet in subnets {
            let subnet_id = subnet.name();
            self.add(
                ResourceNode::new(
                    &format!("subnet-{subnet_id}-to-{table}-route-table"),
                    ResourceKind::RouteTableAssociation,
                )
                .with("subnet_id", AttrValue::Ref(ResourceRef::id(&subnet_id)))
                .with("route_table_id", AttrValue::Ref(ResourceRef::id(table))),
                &[],
            )?;
        }
        Ok(())
    }

    pub fn build(self) -> Result<TopologyGraph> {
        TopologyGraph::with_subnets(self.nodes, self.edges, self.subnets)
    }
}

/// Build the standard VPC graph for `cidr_block`.
///
/// `scheme` defaults to 12 subnet octets with strict index bounds.
pub fn build_vpc_topology(
    cidr_block: &str,
    name: &str,
    region: &str,
    scheme: Option<PartitionScheme>,
) -> Result<TopologyGraph> {
    let mut builder = TopologyBuilder::new(MANAGED_BY);
    builder.add_vpc(cidr_block, name, region, scheme.unwrap_or_default())?;
    builder.build()
}

/// [`build_vpc_topology`] from a [`VpcConfig`] record.
pub fn build_from_config(
    config: &VpcConfig,
    bounds: IndexBounds,
    managed_by: &str,
) -> Result<TopologyGraph> {
    let mut builder = TopologyBuilder::new(managed_by);
    builder.add_vpc(
        &config.cidr_block,
        &config.name,
        &config.region,
        config.scheme(bounds),
    )?;
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::creation_order;

    fn test_graph() -> TopologyGraph {
        build_vpc_topology("10.0.0.0/16", "test", "us-east-", Some(PartitionScheme::new(12)))
            .unwrap()
    }

    fn position(order: &[&ResourceNode], id: &str) -> usize {
        order.iter().position(|n| n.id == id).unwrap()
    }

    #[test]
    fn test_node_counts() {
        let graph = test_graph();
        assert_eq!(graph.nodes_of_kind(ResourceKind::Subnet).count(), 6);
        assert_eq!(graph.nodes_of_kind(ResourceKind::RouteTable).count(), 2);
        assert_eq!(graph.nodes_of_kind(ResourceKind::Route).count(), 2);
        assert_eq!(graph.nodes_of_kind(ResourceKind::RouteTableAssociation).count(), 6);
        assert_eq!(graph.nodes_of_kind(ResourceKind::NatGateway).count(), 1);
        assert_eq!(graph.nodes_of_kind(ResourceKind::ElasticIp).count(), 1);
        assert_eq!(graph.len(), 20);
        assert!(graph.depends_on(NAT_GATEWAY_ID, "public-a"));
    }

    #[test]
    fn test_subnet_assignments() {
        let graph = test_graph();
        let expected = [
            ("public-a", "10.0.0.0/20", "us-east-a"),
            ("public-b", "10.0.16.0/20", "us-east-b"),
            ("public-c", "10.0.32.0/20", "us-east-c"),
            ("private-a", "10.0.48.0/20", "us-east-a"),
            ("private-b", "10.0.64.0/20", "us-east-b"),
            ("private-c", "10.0.80.0/20", "us-east-c"),
        ];
        for (id, cidr, zone) in expected {
            let node = graph.node(id).unwrap();
            assert_eq!(node.attr("cidr_block").unwrap().to_string(), cidr);
            assert_eq!(node.attr("availability_zone").unwrap().to_string(), zone);
            assert!(graph.depends_on(id, VPC_ID));
        }
        assert_eq!(graph.subnets().len(), 6);
        assert_eq!(
            graph.node("public-b").unwrap().attr("map_public_ip_on_launch"),
            Some(&AttrValue::Bool(true))
        );
        assert!(graph.node("private-b").unwrap().attr("map_public_ip_on_launch").is_none());
    }

    #[test]
    fn test_wiring() {
        let graph = test_graph();
        assert_eq!(graph.dependencies_of(IGW_ID), vec![VPC_ID]);
        assert_eq!(
            graph.dependencies_of("public-subnets-to-internet"),
            vec![IGW_ID, "public"]
        );
        assert_eq!(
            graph.dependencies_of(NAT_GATEWAY_ID),
            vec![NAT_EIP_ID, "public-a", IGW_ID]
        );
        assert_eq!(
            graph.dependencies_of("private-subnets-to-internet"),
            vec![NAT_GATEWAY_ID, "private"]
        );
        assert_eq!(
            graph.dependencies_of("subnet-private-c-to-private-route-table"),
            vec!["private", "private-c"]
        );
        assert!(graph.dependencies_of(NAT_EIP_ID).is_empty());
        assert_eq!(graph.public_subnet('c').unwrap().id, "public-c");
    }

    #[test]
    fn test_ordering_contract() {
        let graph = test_graph();
        let order = creation_order(&graph).unwrap();
        assert_eq!(order.len(), graph.len());
        assert_eq!(order[0].id, VPC_ID);
        assert!(position(&order, IGW_ID) < position(&order, "public-subnets-to-internet"));
        assert!(position(&order, NAT_EIP_ID) < position(&order, NAT_GATEWAY_ID));
        assert!(position(&order, IGW_ID) < position(&order, NAT_GATEWAY_ID));
        assert!(position(&order, NAT_GATEWAY_ID) < position(&order, "private-subnets-to-internet"));
        for edge in graph.edges() {
            assert!(position(&order, &edge.from) < position(&order, &edge.to), "{edge:?}");
        }

        let teardown = graph.teardown_order().unwrap();
        let reversed: Vec<&str> = order.iter().rev().map(|n| n.id.as_str()).collect();
        let teardown: Vec<&str> = teardown.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(teardown, reversed);
    }

    #[test]
    fn test_tags_carry_managed_by() {
        let config = VpcConfig {
            cidr_block: "10.20.0.0/16".to_string(),
            name: "prod".to_string(),
            region: "eu-west-1".to_string(),
            subnet_octets: Some(10),
        };
        let graph = build_from_config(&config, IndexBounds::Strict, "platform-team").unwrap();
        let tags = graph.node("public").unwrap().attr("tags").unwrap().to_string();
        assert_eq!(tags, "{ManagedBy=platform-team, Name=prod-public}");
        assert_eq!(
            graph.node("private-c").unwrap().attr("cidr_block").unwrap().to_string(),
            "10.20.20.0/22"
        );
    }

    #[test]
    fn test_strict_scheme_too_small() {
        // /17 children: only two slots in a /16
        let err = build_vpc_topology("10.0.0.0/16", "t", "r", Some(PartitionScheme::new(15)))
            .unwrap_err();
        assert_eq!(err, PlannerError::IndexOutOfRange { index: 2, capacity: 2 });
    }

    #[test]
    fn test_lenient_duplicate_block() {
        // 10.1.0.0/16 with two slots: index 2 wraps onto bits already set
        let err = build_vpc_topology("10.1.0.0/16", "t", "r", Some(PartitionScheme::lenient(15)))
            .unwrap_err();
        assert!(matches!(err, PlannerError::GraphConstruction(_)), "{err:?}");
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(
            build_vpc_topology("10.0.0.0", "t", "r", None),
            Err(PlannerError::InvalidAddressBlock { .. })
        ));
        assert!(matches!(
            build_vpc_topology("10.0.0.0/16", "t", "r", Some(PartitionScheme::new(7))),
            Err(PlannerError::InvalidPartitionScheme { .. })
        ));
    }

    #[test]
    fn test_builder_rejects_duplicates_and_forward_refs() {
        let mut builder = TopologyBuilder::new(MANAGED_BY);
        builder.add(ResourceNode::new("vpc", ResourceKind::Vpc), &[]).unwrap();
        assert!(matches!(
            builder.add(ResourceNode::new("vpc", ResourceKind::Vpc), &[]),
            Err(PlannerError::GraphConstruction(_))
        ));
        let forward = ResourceNode::new("route", ResourceKind::Route)
            .with("route_table_id", AttrValue::Ref(ResourceRef::id("public")));
        assert!(matches!(
            builder.add(forward, &[]),
            Err(PlannerError::GraphConstruction(msg)) if msg.contains("'public'")
        ));
        assert!(!builder.contains("route"));
    }

    #[test]
    fn test_second_vpc_in_same_builder_fails() {
        let mut builder = TopologyBuilder::new(MANAGED_BY);
        builder.add_vpc("10.0.0.0/16", "a", "r", PartitionScheme::default()).unwrap();
        assert!(matches!(
            builder.add_vpc("10.1.0.0/16", "b", "r", PartitionScheme::default()),
            Err(PlannerError::GraphConstruction(_))
        ));
        let graph = builder.build().unwrap();
        assert_eq!(graph.len(), 20);
        assert_eq!(graph.subnets().len(), 6);
        assert_eq!(
            graph.node(VPC_ID).unwrap().attr("cidr_block").unwrap().to_string(),
            "10.0.0.0/16"
        );
    }

    #[test]
    fn test_failed_vpc_leaves_builder_untouched() {
        let mut builder = TopologyBuilder::new(MANAGED_BY);
        builder
            .add(ResourceNode::new("private", ResourceKind::RouteTable), &[])
            .unwrap();
        assert_eq!(
            builder.add_vpc("10.0.0.0/16", "t", "r", PartitionScheme::default()),
            Err(PlannerError::GraphConstruction(
                "duplicate resource id 'private'".to_string()
            ))
        );
        assert!(!builder.contains(VPC_ID));
        assert!(!builder.contains(NAT_GATEWAY_ID));

        let graph = builder.build().unwrap();
        assert_eq!(graph.len(), 1);
        assert!(graph.edges().is_empty());
        assert!(graph.subnets().is_empty());
        assert_eq!(graph.nodes()[0].id, "private");
    }

    #[test]
    fn test_rejected_node_adds_no_edges() {
        let mut builder = TopologyBuilder::new(MANAGED_BY);
        builder.add(ResourceNode::new("vpc", ResourceKind::Vpc), &[]).unwrap();
        let route = ResourceNode::new("route", ResourceKind::Route)
            .with("vpc_id", AttrValue::Ref(ResourceRef::id("vpc")))
            .with("zz", AttrValue::Ref(ResourceRef::id("missing")));
        assert!(builder.add(route, &[]).is_err());
        assert!(builder.build().unwrap().edges().is_empty());
    }
}
