//! Output formatting for plans.
//!
//! This module handles rendering a planned topology:
//! - [`csv`] - CSV table of the creation or teardown order
//! - [`json`] - JSON plan document
//! - [`terminal`] - Terminal output with colors

mod csv;
mod json;
mod terminal;

pub use csv::{plan_rows, print_plan, PlanRow};
pub use json::PlanDocument;
pub use terminal::{format_field, kind_label};
