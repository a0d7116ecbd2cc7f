//! Planning logic.
//!
//! This module contains the pure planning functions:
//! - [`allocator`] - Subnet CIDR allocation
//! - [`graph`] - The immutable topology graph
//! - [`topology`] - Standard VPC layout builder
//! - [`workload`] - Basic workload stack on top of the VPC
//! - [`order`] - Creation and teardown ordering

pub mod allocator;
mod graph;
mod order;
pub mod topology;
mod workload;

// Re-export public functions
pub use allocator::{allocate, allocate_cidr, capacity};
pub use graph::TopologyGraph;
pub use order::{creation_order, planned_resources, teardown_order};
pub use topology::{assign_subnets, build_from_config, build_vpc_topology, TopologyBuilder};
pub use workload::{build_basic_stack, BasicWorkload};
