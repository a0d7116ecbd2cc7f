//! Network topology planner.
//!
//! Carves subnet blocks out of a VPC address block and assembles the
//! dependency graph of the network resources that use them, so resources can
//! be created (and destroyed) in a valid order. Pure functions only, no I/O
//! apart from config loading.
//!
//! ```
//! use vpc_topology_planner::models::PartitionScheme;
//! use vpc_topology_planner::processing::{allocate_cidr, build_vpc_topology};
//!
//! let block = allocate_cidr("10.0.0.0/16", PartitionScheme::new(12), 1).unwrap();
//! assert_eq!(block.to_string(), "10.0.16.0/20");
//!
//! let graph = build_vpc_topology("10.0.0.0/16", "test", "us-east-1", None).unwrap();
//! assert_eq!(graph.creation_order().unwrap()[0].id, "vpc");
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod processing;

pub use error::PlannerError;

use config::PlannerConfig;
use processing::TopologyGraph;

/// Name of the stack [`plan_stack`] plans for `config`.
pub fn stack_name(config: &PlannerConfig) -> &'static str {
    if config.basic_stack_enabled() {
        "basic"
    } else {
        "vpc"
    }
}

/// Plan the stacks enabled in `config`.
///
/// The basic workload is added only when remote state is on and
/// `stacksEnabled.basic` is set; otherwise the bare VPC is planned.
pub fn plan_stack(config: &PlannerConfig) -> Result<TopologyGraph, PlannerError> {
    if config.basic_stack_enabled() {
        processing::build_basic_stack(config)
    } else {
        processing::build_from_config(&config.vpc(), config.index_bounds(), &config.managed_by)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RemoteStateBackend;
    use crate::models::{AddressBlock, PartitionScheme, PlannedResource, ResourceNode};
    use crate::output::PlanDocument;
    use crate::processing::TopologyBuilder;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_public_types_are_send_sync() {
        assert_send_sync::<AddressBlock>();
        assert_send_sync::<PartitionScheme>();
        assert_send_sync::<ResourceNode>();
        assert_send_sync::<PlannedResource>();
        assert_send_sync::<TopologyGraph>();
        assert_send_sync::<TopologyBuilder>();
        assert_send_sync::<PlannerConfig>();
        assert_send_sync::<RemoteStateBackend>();
        assert_send_sync::<PlanDocument>();
        assert_send_sync::<PlannerError>();
    }
}
