//! Partition scheme used by the subnet allocator.

use crate::config::DEFAULT_SUBNET_OCTETS;
use serde::{Deserialize, Serialize};

/// Smallest accepted `subnet_octets` value.
pub const MIN_SUBNET_OCTETS: u8 = 8;
/// Largest accepted `subnet_octets` value.
pub const MAX_SUBNET_OCTETS: u8 = 15;

/// How the allocator treats an index beyond the scheme capacity.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum IndexBounds {
    /// Reject with `IndexOutOfRange`.
    #[default]
    Strict,
    /// Compute the block anyway. The result may overlap a sibling or fall
    /// outside the parent block.
    Lenient,
}

/// Child block sizing: each child has `2^subnet_octets` addresses.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct PartitionScheme {
    pub subnet_octets: u8,
    #[serde(default)]
    pub bounds: IndexBounds,
}

impl PartitionScheme {
    /// Strict scheme with the given child size.
    pub fn new(subnet_octets: u8) -> PartitionScheme {
        PartitionScheme {
            subnet_octets,
            bounds: IndexBounds::Strict,
        }
    }

    /// Scheme that never rejects an index.
    pub fn lenient(subnet_octets: u8) -> PartitionScheme {
        PartitionScheme {
            subnet_octets,
            bounds: IndexBounds::Lenient,
        }
    }

    pub fn is_strict(&self) -> bool {
        self.bounds == IndexBounds::Strict
    }

    /// Prefix length of every child block.
    pub fn child_prefix(&self) -> u8 {
        32u8.saturating_sub(self.subnet_octets)
    }
}

impl Default for PartitionScheme {
    fn default() -> Self {
        PartitionScheme::new(DEFAULT_SUBNET_OCTETS)
    }
}
