//! Resource nodes and dependency edges of a topology graph.

use super::AddressBlock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Kind of network object a node stands for.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Vpc,
    InternetGateway,
    Subnet,
    RouteTable,
    Route,
    RouteTableAssociation,
    ElasticIp,
    NatGateway,
    SecurityGroup,
    SecurityGroupRule,
    Instance,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Vpc => "vpc",
            ResourceKind::InternetGateway => "internet_gateway",
            ResourceKind::Subnet => "subnet",
            ResourceKind::RouteTable => "route_table",
            ResourceKind::Route => "route",
            ResourceKind::RouteTableAssociation => "route_table_association",
            ResourceKind::ElasticIp => "eip",
            ResourceKind::NatGateway => "nat_gateway",
            ResourceKind::SecurityGroup => "security_group",
            ResourceKind::SecurityGroupRule => "security_group_rule",
            ResourceKind::Instance => "instance",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of another node, known only once that node exists.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceRef {
    pub node: String,
    /// Output attribute of the referenced node, e.g. `id` or `allocation_id`.
    pub output: String,
}

impl ResourceRef {
    pub fn id(node: &str) -> ResourceRef {
        ResourceRef {
            node: node.to_string(),
            output: "id".to_string(),
        }
    }

    pub fn output(node: &str, output: &str) -> ResourceRef {
        ResourceRef {
            node: node.to_string(),
            output: output.to_string(),
        }
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${{{}.{}}}", self.node, self.output)
    }
}

/// Attribute value of a resource node.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AttrValue {
    Str(String),
    Bool(bool),
    Int(i64),
    Cidr(AddressBlock),
    List(Vec<AttrValue>),
    Tags(BTreeMap<String, String>),
    Ref(ResourceRef),
}

impl AttrValue {
    pub fn str(value: impl Into<String>) -> AttrValue {
        AttrValue::Str(value.into())
    }

    /// Every reference held by this value, nested lists included.
    pub fn refs(&self) -> Vec<&ResourceRef> {
        match self {
            AttrValue::Ref(r) => vec![r],
            AttrValue::List(items) => items.iter().flat_map(|v| v.refs()).collect(),
            _ => Vec::new(),
        }
    }

    pub fn as_cidr(&self) -> Option<&AddressBlock> {
        match self {
            AttrValue::Cidr(block) => Some(block),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Str(s) => f.write_str(s),
            AttrValue::Bool(b) => write!(f, "{b}"),
            AttrValue::Int(i) => write!(f, "{i}"),
            AttrValue::Cidr(c) => write!(f, "{c}"),
            AttrValue::Ref(r) => write!(f, "{r}"),
            AttrValue::List(items) => {
                let items: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", items.join(", "))
            }
            AttrValue::Tags(tags) => {
                let tags: Vec<String> = tags.iter().map(|(k, v)| format!("{k}={v}")).collect();
                write!(f, "{{{}}}", tags.join(", "))
            }
        }
    }
}

/// A network object in the plan.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ResourceNode {
    /// Stable identifier, unique within a graph.
    pub id: String,
    pub kind: ResourceKind,
    pub attributes: BTreeMap<String, AttrValue>,
}

impl ResourceNode {
    pub fn new(id: &str, kind: ResourceKind) -> ResourceNode {
        ResourceNode {
            id: id.to_string(),
            kind,
            attributes: BTreeMap::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with(mut self, key: &str, value: AttrValue) -> ResourceNode {
        self.attributes.insert(key.to_string(), value);
        self
    }

    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attributes.get(key)
    }

    /// Ids of the nodes this node's attributes reference, in attribute order.
    pub fn referenced_nodes(&self) -> Vec<&str> {
        self.attributes
            .values()
            .flat_map(|v| v.refs())
            .map(|r| r.node.as_str())
            .collect()
    }
}

impl fmt::Display for ResourceNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.kind, self.id)
    }
}

/// `from` must exist before `to` is created; `to` is destroyed before `from`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DependencyEdge {
    pub from: String,
    pub to: String,
}

impl DependencyEdge {
    pub fn new(from: &str, to: &str) -> DependencyEdge {
        DependencyEdge {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

/// A node with its dependencies resolved to ids, ready for serialization.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PlannedResource {
    pub id: String,
    pub kind: ResourceKind,
    pub attributes: BTreeMap<String, AttrValue>,
    pub depends_on: Vec<String>,
}
