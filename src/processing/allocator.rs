//! Subnet CIDR allocation.
//!
//! Carves the Nth child block out of a parent block. For a /16 parent this is
//! the classic third-octet rule:
//!
//! ```text
//! shift       = subnet_octets - 8
//! third octet = ((parent third octet >> shift) | index) << shift
//! fourth      = 0, prefix = 32 - subnet_octets
//! ```
//!
//! The same arithmetic runs over the whole 32-bit address, so parents of any
//! prefix length work; only the capacity depends on the parent prefix.

use crate::error::{PlannerError, Result};
use crate::models::{AddressBlock, PartitionScheme, MAX_SUBNET_OCTETS, MIN_SUBNET_OCTETS};
use std::net::Ipv4Addr;

/// Check the scheme against the parent and return the child prefix length.
pub fn validate_scheme(parent: &AddressBlock, scheme: &PartitionScheme) -> Result<u8> {
    let subnet_octets = scheme.subnet_octets;
    if !(MIN_SUBNET_OCTETS..=MAX_SUBNET_OCTETS).contains(&subnet_octets) {
        return Err(PlannerError::InvalidPartitionScheme {
            subnet_octets,
            reason: format!(
                "subnet_octets must be between {MIN_SUBNET_OCTETS} and {MAX_SUBNET_OCTETS} inclusive"
            ),
        });
    }
    let child_prefix = scheme.child_prefix();
    if child_prefix < parent.prefix() {
        return Err(PlannerError::InvalidPartitionScheme {
            subnet_octets,
            reason: format!("child blocks /{child_prefix} do not fit in parent {parent}"),
        });
    }
    Ok(child_prefix)
}

/// Number of child blocks the scheme can carve out of `parent`.
pub fn capacity(parent: &AddressBlock, scheme: &PartitionScheme) -> Result<u64> {
    let child_prefix = validate_scheme(parent, scheme)?;
    Ok(1u64 << (child_prefix - parent.prefix()))
}

/// Compute the child block at `index`.
///
/// With a strict scheme an index at or beyond [`capacity`] fails with
/// `IndexOutOfRange`. With a lenient scheme it is accepted and the result
/// silently overlaps a sibling block or lies outside `parent`.
pub fn allocate(parent: AddressBlock, scheme: PartitionScheme, index: u32) -> Result<AddressBlock> {
    let child_prefix = validate_scheme(&parent, &scheme)?;
    let capacity = 1u64 << (child_prefix - parent.prefix());
    if scheme.is_strict() && u64::from(index) >= capacity {
        return Err(PlannerError::IndexOutOfRange { index, capacity });
    }

    let host = u32::from(scheme.subnet_octets);
    let parent_bits = u64::from(u32::from(parent.addr()));
    // wide arithmetic, truncated: lenient overflow spills into higher octets
    let child_bits = (((parent_bits >> host) | u64::from(index)) << host) as u32;

    let child = AddressBlock::new(Ipv4Addr::from(child_bits), child_prefix)?;
    log::trace!("allocate({parent}, /{child_prefix}, #{index}) => {child}");
    Ok(child)
}

/// [`allocate`] for a parent given as text, e.g. `"10.0.0.0/16"`.
pub fn allocate_cidr(parent: &str, scheme: PartitionScheme, index: u32) -> Result<AddressBlock> {
    allocate(AddressBlock::parse(parent)?, scheme, index)
}
