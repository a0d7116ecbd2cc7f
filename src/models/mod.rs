//! Domain models for the topology planner.
//!
//! This module contains the core data structures used throughout the crate:
//! - [`AddressBlock`] - canonical IPv4 network in CIDR notation
//! - [`PartitionScheme`] - child block sizing for the allocator
//! - [`SubnetAssignment`] - an allocated block bound to a role
//! - [`ResourceNode`] and [`DependencyEdge`] - topology graph contents

mod ipv4;
mod resource;
mod scheme;
mod subnet;

// Re-export public types
pub use ipv4::{broadcast_addr, cut_addr, get_cidr_mask, AddressBlock, MAX_LENGTH};
pub use resource::{
    AttrValue, DependencyEdge, PlannedResource, ResourceKind, ResourceNode, ResourceRef,
};
pub use scheme::{IndexBounds, PartitionScheme, MAX_SUBNET_OCTETS, MIN_SUBNET_OCTETS};
pub use subnet::{SubnetAssignment, SubnetRole, Tier};
