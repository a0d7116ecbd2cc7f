//! Subnet roles and their address assignments.

use super::AddressBlock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a subnet routes out through the internet gateway or the NAT gateway.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Public,
    Private,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Public => "public",
            Tier::Private => "private",
        }
    }
}

/// A named subnet slot, e.g. `public-a`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubnetRole {
    pub tier: Tier,
    /// Availability-zone suffix: `a`, `b`, `c`.
    pub zone: char,
}

impl SubnetRole {
    pub fn new(tier: Tier, zone: char) -> SubnetRole {
        SubnetRole { tier, zone }
    }

    /// Role name, also used as the subnet node id.
    pub fn name(&self) -> String {
        format!("{}-{}", self.tier.as_str(), self.zone)
    }
}

impl fmt::Display for SubnetRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.tier.as_str(), self.zone)
    }
}

/// An allocated child block bound to a role and availability zone.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SubnetAssignment {
    pub role: SubnetRole,
    pub availability_zone: String,
    pub cidr_block: AddressBlock,
    /// Allocator index the block was computed from.
    pub index: u32,
}

impl SubnetAssignment {
    pub fn name(&self) -> String {
        self.role.name()
    }
}

impl fmt::Display for SubnetAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({})",
            self.role, self.cidr_block, self.availability_zone
        )
    }
}
