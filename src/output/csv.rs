//! CSV style table of a plan.

use super::terminal::{format_field, kind_label};
use crate::error::Result;
use crate::processing::{creation_order, teardown_order, TopologyGraph};
use colored::Colorize;

/// One printed row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanRow {
    /// 1-based step number.
    pub step: usize,
    pub id: String,
    pub kind: String,
    /// Subnet or VPC block, "-" for other kinds.
    pub cidr_block: String,
    pub availability_zone: String,
    /// Prerequisite ids joined with `;`.
    pub depends_on: String,
}

/// Rows in creation order, or teardown order when `teardown` is set.
pub fn plan_rows(graph: &TopologyGraph, teardown: bool) -> Result<Vec<PlanRow>> {
    let order = if teardown {
        teardown_order(graph)?
    } else {
        creation_order(graph)?
    };

    Ok(order
        .into_iter()
        .enumerate()
        .map(|(i, node)| PlanRow {
            step: i + 1,
            id: node.id.clone(),
            kind: node.kind.to_string(),
            cidr_block: node
                .attr("cidr_block")
                .and_then(|v| v.as_cidr())
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".to_string()),
            availability_zone: node
                .attr("availability_zone")
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string()),
            depends_on: graph.dependencies_of(&node.id).join(";"),
        })
        .collect())
}

/// Print the plan as CSV to stdout.
pub fn print_plan(graph: &TopologyGraph, teardown: bool) -> Result<()> {
    let rows = plan_rows(graph, teardown)?;
    log::info!(
        "#Start print_plan() {} resources, teardown={teardown}",
        rows.len()
    );

    println!(
        r#" "step",                                       "id",                  "kind",      "cidr_block", "availability_zone", "depends_on""#
    );
    for row in &rows {
        let kind = graph
            .node(&row.id)
            .map(|n| kind_label(n.kind, 24).to_string())
            .unwrap_or_else(|| format_field(&row.kind, 24));
        println!(
            "{},{},{},{},{},{}",
            format_field(row.step, 7),
            format_field(&row.id, 45),
            kind,
            format_field(&row.cidr_block, 16),
            format_field(&row.availability_zone, 20),
            format_field(&row.depends_on, 0),
        );
    }

    let action = if teardown { "destroy" } else { "create" };
    println!(
        "#{}# {} resources to {action}",
        "NOTE".on_blue(),
        rows.len()
    );
    Ok(())
}
