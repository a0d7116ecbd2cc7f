//! JSON plan document for the provisioning engine.

use crate::config::RemoteStateBackend;
use crate::error::{PlannerError, Result};
use crate::models::{PlannedResource, SubnetAssignment};
use crate::processing::{planned_resources, TopologyGraph};
use serde::{Deserialize, Serialize};

/// Everything the engine needs to apply one stack.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PlanDocument {
    pub stack: String,
    pub generated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<RemoteStateBackend>,
    pub subnets: Vec<SubnetAssignment>,
    /// Resources in creation order.
    pub resources: Vec<PlannedResource>,
}

impl PlanDocument {
    pub fn new(
        stack: &str,
        graph: &TopologyGraph,
        backend: Option<RemoteStateBackend>,
    ) -> Result<PlanDocument> {
        Ok(PlanDocument {
            stack: stack.to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            backend,
            subnets: graph.subnets().to_vec(),
            resources: planned_resources(graph)?,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(serialization_error)
    }
}

fn serialization_error(e: serde_json::Error) -> PlannerError {
    PlannerError::Serialization(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::build_vpc_topology;

    #[test]
    fn test_plan_document_json() {
        let graph = build_vpc_topology("10.0.0.0/16", "test", "us-east-1", None).unwrap();
        let doc = PlanDocument::new("basic", &graph, None).unwrap();
        let json = doc.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["stack"], "basic");
        assert!(value.get("backend").is_none());
        assert_eq!(value["subnets"].as_array().unwrap().len(), 6);
        assert_eq!(value["subnets"][1]["cidr_block"], "10.0.16.0/20");

        let resources = value["resources"].as_array().unwrap();
        assert_eq!(resources.len(), 20);
        assert_eq!(resources[0]["id"], "vpc");
        assert_eq!(resources[0]["kind"], "Vpc");
        assert_eq!(resources[0]["attributes"]["cidr_block"]["cidr"], "10.0.0.0/16");

        let back: PlanDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back.resources, doc.resources);
    }

    #[test]
    fn test_serialization_error_kind() {
        let e = serde_json::from_str::<PlanDocument>("{").unwrap_err();
        let err = serialization_error(e);
        assert!(matches!(err, PlannerError::Serialization(_)));
        assert!(err.to_string().starts_with("plan serialization failed"), "{err}");
    }
}
