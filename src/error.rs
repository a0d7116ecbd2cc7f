//! Error type shared by the planner.
//!
//! Every failure is a synchronous validation error: the same input always
//! fails the same way, and nothing is returned partially built.

/// Errors returned by the allocator, the graph builder and config loading.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlannerError {
    #[error("invalid address block '{input}': {reason}")]
    InvalidAddressBlock { input: String, reason: String },

    #[error("invalid partition scheme (subnet_octets={subnet_octets}): {reason}")]
    InvalidPartitionScheme { subnet_octets: u8, reason: String },

    #[error("subnet index {index} out of range, scheme capacity is {capacity}")]
    IndexOutOfRange { index: u32, capacity: u64 },

    #[error("graph construction failed: {0}")]
    GraphConstruction(String),

    #[error("dependency cycle detected among: {}", .remaining.join(", "))]
    CyclicDependency { remaining: Vec<String> },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("plan serialization failed: {0}")]
    Serialization(String),
}

impl PlannerError {
    pub(crate) fn invalid_block(input: impl Into<String>, reason: impl Into<String>) -> Self {
        PlannerError::InvalidAddressBlock {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PlannerError>;
