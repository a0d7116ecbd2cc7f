//! Basic workload stack: one instance in `public-a` behind a security group.

use super::topology::{TopologyBuilder, VPC_ID};
use super::TopologyGraph;
use crate::config::{
    PlannerConfig, CIDR_BLOCK_ALL, DEFAULT_AMI_NAME_FILTER, DEFAULT_INSTANCE_TYPE,
};
use crate::error::{PlannerError, Result};
use crate::models::{AddressBlock, AttrValue, ResourceKind, ResourceNode, ResourceRef};

pub const SECURITY_GROUP_ID: &str = "basic-ec2-security-group";
pub const SSH_INGRESS_ID: &str = "basic-ec2-ingress-allow-ssh-from-my-ip";
pub const EGRESS_ALL_ID: &str = "basic-ec2-egress-allow-all";
pub const INSTANCE_ID: &str = "basic-ec2";

/// Settings of the workload added on top of the VPC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicWorkload {
    pub key_name: String,
    pub instance_type: String,
    /// Sources allowed to reach the instance over SSH.
    pub ssh_sources: Vec<AddressBlock>,
}

impl BasicWorkload {
    pub fn from_config(config: &PlannerConfig) -> Result<BasicWorkload> {
        Ok(BasicWorkload {
            key_name: config.basic_stack_ec2_key_name.clone(),
            instance_type: DEFAULT_INSTANCE_TYPE.to_string(),
            ssh_sources: config.my_ip_blocks()?,
        })
    }
}

fn rule(
    id: &str,
    direction: &str,
    protocol: &str,
    ports: (i64, i64),
    cidr_blocks: &[AddressBlock],
    description: &str,
) -> ResourceNode {
    ResourceNode::new(id, ResourceKind::SecurityGroupRule)
        .with("type", AttrValue::str(direction))
        .with("protocol", AttrValue::str(protocol))
        .with("from_port", AttrValue::Int(ports.0))
        .with("to_port", AttrValue::Int(ports.1))
        .with(
            "cidr_blocks",
            AttrValue::List(cidr_blocks.iter().copied().map(AttrValue::Cidr).collect()),
        )
        .with("security_group_id", AttrValue::Ref(ResourceRef::id(SECURITY_GROUP_ID)))
        .with("description", AttrValue::str(description))
}

impl TopologyBuilder {
    /// Security group, its two rules and the instance. Needs a VPC already added.
    /// Adds all four nodes or, on error, none.
    pub fn add_basic_workload(&mut self, workload: &BasicWorkload) -> Result<()> {
        self.atomically(|builder| builder.add_basic_workload_nodes(workload))
    }

    fn add_basic_workload_nodes(&mut self, workload: &BasicWorkload) -> Result<()> {
        if !self.contains("public-a") {
            return Err(PlannerError::GraphConstruction(
                "basic workload needs the public-a subnet".into(),
            ));
        }

        self.add(
            ResourceNode::new(SECURITY_GROUP_ID, ResourceKind::SecurityGroup)
                .with("name", AttrValue::str("basic-ec2"))
                .with("description", AttrValue::str("For basic-ec2"))
                .with("vpc_id", AttrValue::Ref(ResourceRef::id(VPC_ID)))
                .with("tags", self.tags("basic-ec2")),
            &[],
        )?;
        self.add(
            rule(
                SSH_INGRESS_ID,
                "ingress",
                "tcp",
                (22, 22),
                &workload.ssh_sources,
                "Allow SSH access from my IP address",
            ),
            &[],
        )?;
        self.add(
            rule(
                EGRESS_ALL_ID,
                "egress",
                "all",
                (0, 65535),
                &[AddressBlock::parse(CIDR_BLOCK_ALL)?],
                "Allow all egress traffic",
            ),
            &[],
        )?;
        self.add(
            ResourceNode::new(INSTANCE_ID, ResourceKind::Instance)
                .with("ami_name_filter", AttrValue::str(DEFAULT_AMI_NAME_FILTER))
                .with("associate_public_ip_address", AttrValue::Bool(true))
                .with("instance_type", AttrValue::str(&workload.instance_type))
                .with("key_name", AttrValue::str(&workload.key_name))
                .with("subnet_id", AttrValue::Ref(ResourceRef::id("public-a")))
                .with(
                    "vpc_security_group_ids",
                    AttrValue::List(vec![AttrValue::Ref(ResourceRef::id(SECURITY_GROUP_ID))]),
                )
                .with("tags", self.tags("basic-ec2")),
            &[],
        )?;
        log::debug!(
            "planned basic workload, ssh from {} source(s)",
            workload.ssh_sources.len()
        );
        Ok(())
    }
}

/// VPC topology plus the basic workload, as described by `config`.
pub fn build_basic_stack(config: &PlannerConfig) -> Result<TopologyGraph> {
    let vpc = config.vpc();
    let mut builder = TopologyBuilder::new(&config.managed_by);
    builder.add_vpc(&vpc.cidr_block, &vpc.name, &vpc.region, config.scheme())?;
    builder.add_basic_workload(&BasicWorkload::from_config(config)?)?;
    builder.build()
}
