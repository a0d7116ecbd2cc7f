//! Terminal output utilities.
//!
//! Provides formatting helpers for terminal output.

use crate::models::ResourceKind;
use colored::{ColoredString, Colorize};

/// Format a value as a quoted, right-aligned field.
pub fn format_field<T: ToString>(value: T, width: usize) -> String {
    let quoted = format!("\"{}\"", value.to_string());
    format!("{quoted:>width$}")
}

/// Resource kind label, colored by network layer.
pub fn kind_label(kind: ResourceKind, width: usize) -> ColoredString {
    let field = format_field(kind, width);
    match kind {
        ResourceKind::Vpc | ResourceKind::Subnet => field.green(),
        ResourceKind::InternetGateway | ResourceKind::NatGateway | ResourceKind::ElasticIp => {
            field.yellow()
        }
        ResourceKind::RouteTable | ResourceKind::Route | ResourceKind::RouteTableAssociation => {
            field.cyan()
        }
        ResourceKind::SecurityGroup | ResourceKind::SecurityGroupRule => field.magenta(),
        ResourceKind::Instance => field.blue(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_field_short() {
        assert_eq!(format_field("vpc", 10), "     \"vpc\"");
    }

    #[test]
    fn test_format_field_long() {
        assert_eq!(format_field("nat-gateway-eip", 5), "\"nat-gateway-eip\"");
    }

    #[test]
    fn test_format_field_number() {
        assert_eq!(format_field(42, 6), "  \"42\"");
    }

    #[test]
    fn test_kind_label_text() {
        colored::control::set_override(false);
        assert_eq!(kind_label(ResourceKind::Subnet, 10).to_string(), "  \"subnet\"");
        colored::control::unset_override();
    }
}
