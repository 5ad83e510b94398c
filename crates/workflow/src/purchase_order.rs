//! Built-in purchase order workflow.
//!
//! `UPLOADED → CONFIRMED → SHIPPED → INVOICED → DELIVERED`, with `CANCELLED`
//! reachable from every non-terminal status and `INVOICED → SHIPPED` for a
//! voided invoice.

use orderflow_core::WorkflowResult;

use crate::config::WorkflowConfig;
use crate::definition::WorkflowDefinition;

pub const UPLOADED: &str = "UPLOADED";
pub const CONFIRMED: &str = "CONFIRMED";
pub const SHIPPED: &str = "SHIPPED";
pub const INVOICED: &str = "INVOICED";
pub const DELIVERED: &str = "DELIVERED";
pub const CANCELLED: &str = "CANCELLED";

/// Source document of the built-in workflow.
pub const DOCUMENT: &str = include_str!("../workflows/purchase_order.json");

pub fn config() -> WorkflowResult<WorkflowConfig> {
    WorkflowConfig::from_json_str(DOCUMENT)
}

pub fn definition() -> WorkflowResult<WorkflowDefinition> {
    config()?.into_definition()
}
