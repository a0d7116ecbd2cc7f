//! IPv4 address block (CIDR notation) utilities.
//!
//! Provides [`AddressBlock`], a canonical IPv4 network, along with the mask
//! helpers the allocator is built on.

use crate::error::{PlannerError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Maximum length for an IPv4 prefix (32 bits).
pub const MAX_LENGTH: u8 = 32;

lazy_static! {
    // Four ASCII decimal octets and a prefix length, nothing else.
    static ref CIDR_RE: Regex =
        Regex::new(r"^([0-9]{1,3})\.([0-9]{1,3})\.([0-9]{1,3})\.([0-9]{1,3})/([0-9]{1,2})$")
            .expect("Invalid Regex?");
}

/// Convert a CIDR prefix length to a subnet mask as u32.
///
/// # Examples
/// ```
/// use vpc_topology_planner::models::get_cidr_mask;
/// assert_eq!(get_cidr_mask(20).unwrap(), 0xFFFFF000);
/// ```
pub fn get_cidr_mask(len: u8) -> Result<u32> {
    if len > MAX_LENGTH {
        Err(PlannerError::invalid_block(
            format!("/{len}"),
            "prefix length is too long",
        ))
    } else {
        let right_len = MAX_LENGTH - len;
        let all_bits = u32::MAX as u64;

        let mask = (all_bits >> right_len) << right_len;

        Ok(mask as u32)
    }
}

/// Get the network address for a given IP and prefix length.
pub fn cut_addr(addr: Ipv4Addr, len: u8) -> Result<Ipv4Addr> {
    let mask = get_cidr_mask(len)?;
    Ok(Ipv4Addr::from(u32::from(addr) & mask))
}

/// Calculate the broadcast (highest) address for a given IP and prefix length.
pub fn broadcast_addr(addr: Ipv4Addr, len: u8) -> Result<Ipv4Addr> {
    let mask = get_cidr_mask(len)?;
    let network_bits = u32::from(addr) & mask;
    Ok(Ipv4Addr::from(network_bits | !mask))
}

/// A contiguous IPv4 range in canonical form.
///
/// Host bits below the prefix are always zero; every constructor normalizes.
#[derive(Eq, Ord, PartialEq, PartialOrd, Debug, Copy, Clone, Hash)]
pub struct AddressBlock {
    addr: Ipv4Addr,
    prefix: u8,
}

impl AddressBlock {
    /// Build a block from an address and prefix, zeroing the host bits.
    pub fn new(addr: Ipv4Addr, prefix: u8) -> Result<AddressBlock> {
        let addr = cut_addr(addr, prefix).map_err(|_| {
            PlannerError::invalid_block(format!("{addr}/{prefix}"), "prefix length is too long")
        })?;
        Ok(AddressBlock { addr, prefix })
    }

    /// Parse `a.b.c.d/n`, e.g. "10.0.0.0/16".
    pub fn parse(addr_cidr: &str) -> Result<AddressBlock> {
        let caps = CIDR_RE.captures(addr_cidr).ok_or_else(|| {
            PlannerError::invalid_block(
                addr_cidr,
                "expected four dot-separated decimal octets followed by /prefix",
            )
        })?;

        let mut octets = [0u8; 4];
        for (i, octet) in octets.iter_mut().enumerate() {
            let text = &caps[i + 1];
            *octet = text.parse().map_err(|_| {
                PlannerError::invalid_block(addr_cidr, format!("octet {text} is not in 0-255"))
            })?;
        }
        let prefix: u8 = caps[5].parse().map_err(|_| {
            PlannerError::invalid_block(addr_cidr, "prefix length is not a number")
        })?;
        if prefix > MAX_LENGTH {
            return Err(PlannerError::invalid_block(
                addr_cidr,
                "prefix length is too long",
            ));
        }

        AddressBlock::new(Ipv4Addr::from(octets), prefix)
    }

    /// Base (network) address.
    pub fn addr(&self) -> Ipv4Addr {
        self.addr
    }

    /// Prefix length.
    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    /// Number of addresses in the block.
    pub fn size(&self) -> u64 {
        1u64 << (MAX_LENGTH - self.prefix)
    }

    /// Lowest address in the block.
    pub fn lo(&self) -> Ipv4Addr {
        self.addr
    }

    /// Highest (broadcast) address in the block.
    pub fn hi(&self) -> Ipv4Addr {
        let host_bits = (self.size() - 1) as u32;
        Ipv4Addr::from(u32::from(self.addr) | host_bits)
    }

    /// Netmask as a u32.
    pub fn mask(&self) -> u32 {
        // prefix is validated on construction
        get_cidr_mask(self.prefix).unwrap_or(u32::MAX)
    }

    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        u32::from(ip) & self.mask() == u32::from(self.addr)
    }

    /// True when every address of `other` lies inside this block.
    pub fn contains_block(&self, other: &AddressBlock) -> bool {
        other.prefix >= self.prefix && self.contains(other.addr)
    }

    pub fn overlaps(&self, other: &AddressBlock) -> bool {
        self.lo() <= other.hi() && other.lo() <= self.hi()
    }
}

impl FromStr for AddressBlock {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<AddressBlock> {
        AddressBlock::parse(s)
    }
}

impl std::fmt::Display for AddressBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix)
    }
}

impl Serialize for AddressBlock {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for AddressBlock {
    fn deserialize<D>(deserializer: D) -> std::result::Result<AddressBlock, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        AddressBlock::parse(&s).map_err(de::Error::custom)
    }
}
