//! Configuration constants and the planner configuration file.

use crate::error::{PlannerError, Result};
use crate::models::{AddressBlock, IndexBounds, PartitionScheme};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Child block size when the config does not name one.
pub const DEFAULT_SUBNET_OCTETS: u8 = 12;
/// Default value of the `ManagedBy` tag.
pub const MANAGED_BY: &str = "cdktf";
/// Destination of default routes and allow-all egress.
pub const CIDR_BLOCK_ALL: &str = "0.0.0.0/0";
pub const DEFAULT_INSTANCE_TYPE: &str = "t2.micro";
/// Name filter for the workload instance image.
pub const DEFAULT_AMI_NAME_FILTER: &str = "al2023-ami-2023.*-x86_64";
/// Config path used when `PLANNER_CONFIG` is not set.
pub const DEFAULT_CONFIG_FILE: &str = "planner.json";

/// Input of the VPC topology builder.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VpcConfig {
    pub cidr_block: String,
    pub name: String,
    /// Region prefix of the availability zones, e.g. "us-east-1".
    pub region: String,
    #[serde(default)]
    pub subnet_octets: Option<u8>,
}

impl VpcConfig {
    pub fn scheme(&self, bounds: IndexBounds) -> PartitionScheme {
        PartitionScheme {
            subnet_octets: self.subnet_octets.unwrap_or(DEFAULT_SUBNET_OCTETS),
            bounds,
        }
    }
}

/// Which optional stacks get planned.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct StacksEnabled {
    #[serde(default)]
    pub basic: bool,
}

/// Repository configuration file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlannerConfig {
    pub region: String,
    #[serde(default)]
    pub bucket_name: String,
    #[serde(default)]
    pub dynamodb_table_name: String,
    #[serde(default)]
    pub store_state_remotely: bool,
    #[serde(default)]
    pub stacks_enabled: StacksEnabled,
    pub basic_vpc_cidr_block: String,
    pub basic_vpc_name: String,
    #[serde(default)]
    pub basic_stack_ec2_key_name: String,
    #[serde(default)]
    pub my_ip_cidr_blocks: Vec<String>,
    #[serde(default)]
    pub subnet_octets: Option<u8>,
    /// `false` keeps the historical lenient index handling.
    #[serde(default = "default_strict_indexing")]
    pub strict_indexing: bool,
    #[serde(default = "default_managed_by")]
    pub managed_by: String,
}

fn default_strict_indexing() -> bool {
    true
}

fn default_managed_by() -> String {
    MANAGED_BY.to_string()
}

/// Remote state location handed to the provisioning engine.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RemoteStateBackend {
    pub bucket: String,
    pub key: String,
    pub region: String,
    pub encrypt: bool,
    pub dynamodb_table: String,
}

impl PlannerConfig {
    pub fn vpc(&self) -> VpcConfig {
        VpcConfig {
            cidr_block: self.basic_vpc_cidr_block.clone(),
            name: self.basic_vpc_name.clone(),
            region: self.region.clone(),
            subnet_octets: self.subnet_octets,
        }
    }

    pub fn index_bounds(&self) -> IndexBounds {
        if self.strict_indexing {
            IndexBounds::Strict
        } else {
            IndexBounds::Lenient
        }
    }

    pub fn scheme(&self) -> PartitionScheme {
        self.vpc().scheme(self.index_bounds())
    }

    /// The basic workload stack is planned only on top of remote state.
    pub fn basic_stack_enabled(&self) -> bool {
        self.store_state_remotely && self.stacks_enabled.basic
    }

    /// Backend for `stack_id`, keyed `stacks/<id>/<id>-stack`. `None` when state
    /// is kept locally.
    pub fn backend_for(&self, stack_id: &str) -> Option<RemoteStateBackend> {
        if !self.store_state_remotely {
            return None;
        }
        Some(RemoteStateBackend {
            bucket: self.bucket_name.clone(),
            key: format!("stacks/{stack_id}/{stack_id}-stack"),
            region: self.region.clone(),
            encrypt: true,
            dynamodb_table: self.dynamodb_table_name.clone(),
        })
    }

    /// Parsed `myIpCidrBlocks`.
    pub fn my_ip_blocks(&self) -> Result<Vec<AddressBlock>> {
        self.my_ip_cidr_blocks
            .iter()
            .map(|s| AddressBlock::parse(s))
            .collect()
    }

    /// Reject settings that cannot produce a plan.
    pub fn validate(&self) -> Result<()> {
        if self.region.trim().is_empty() {
            return Err(PlannerError::Config("region must not be empty".into()));
        }
        if self.basic_vpc_name.trim().is_empty() {
            return Err(PlannerError::Config("basicVpcName must not be empty".into()));
        }
        if self.store_state_remotely
            && (self.bucket_name.trim().is_empty() || self.dynamodb_table_name.trim().is_empty())
        {
            return Err(PlannerError::Config(
                "storeStateRemotely requires both bucketName and dynamodbTableName".into(),
            ));
        }
        if self.basic_stack_enabled() && self.basic_stack_ec2_key_name.trim().is_empty() {
            return Err(PlannerError::Config(
                "stacksEnabled.basic requires basicStackEc2KeyName".into(),
            ));
        }
        AddressBlock::parse(&self.basic_vpc_cidr_block)?;
        self.my_ip_blocks()?;
        Ok(())
    }
}

/// Parse and validate a configuration document.
pub fn parse_config(json: &str) -> Result<PlannerConfig> {
    let mut deserializer = serde_json::Deserializer::from_str(json);
    let config: PlannerConfig = serde_path_to_error::deserialize(&mut deserializer)
        .map_err(|e| PlannerError::Config(format!("path={} error={}", e.path(), e)))?;
    config.validate()?;
    Ok(config)
}

/// Read, parse and validate the configuration file at `path`.
pub fn load_config(path: impl AsRef<Path>) -> Result<PlannerConfig> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|e| {
        PlannerError::Config(format!("Error reading config file {}: {e}", path.display()))
    })?;
    log::info!("Reading config file: {}", path.display());
    parse_config(&json)
}
