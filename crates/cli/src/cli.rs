//! Command line surface of the `orderflow` binary.
//!
//! Each subcommand maps onto one workflow operation and prints its result as
//! JSON on stdout.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Inspect the purchase order workflow and check status transitions.
#[derive(Debug, Parser)]
#[command(name = "orderflow", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Workflow document to load instead of `ORDERFLOW_WORKFLOW` or the
    /// built-in purchase order workflow.
    #[arg(long, global = true)]
    pub workflow: Option<PathBuf>,

    /// Log at debug level (overridden by `RUST_LOG`).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List every status in declaration order.
    Statuses,

    /// Show one status.
    Status { id: String },

    /// Show the initial status.
    Initial,

    /// List the statuses reachable in one step.
    Transitions { id: String },

    /// Check whether a transition is currently allowed.
    Validate {
        from: String,
        to: String,

        /// Transition data as a JSON object.
        #[arg(long)]
        data: Option<String>,
    },

    /// Compute a transition and its history entry.
    Transition {
        from: String,
        to: String,

        /// Transition data as a JSON object.
        #[arg(long)]
        data: Option<String>,

        #[arg(long, default_value = "")]
        reason: String,

        /// Acting user.
        #[arg(long, default_value = "system")]
        user: String,

        /// Skip validation (for callers that already validated).
        #[arg(long, default_value_t = false)]
        skip_validation: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn parses_validate_with_data() {
        let cli = Cli::parse_from([
            "orderflow",
            "validate",
            "UPLOADED",
            "CONFIRMED",
            "--data",
            r#"{"poNumber":"PO1"}"#,
        ]);
        match cli.command {
            Command::Validate { from, to, data } => {
                assert_eq!(from, "UPLOADED");
                assert_eq!(to, "CONFIRMED");
                assert_eq!(data.as_deref(), Some(r#"{"poNumber":"PO1"}"#));
            }
            _ => panic!("expected Validate command"),
        }
    }

    #[test]
    fn transition_defaults() {
        let cli = Cli::parse_from(["orderflow", "transition", "SHIPPED", "CANCELLED"]);
        match cli.command {
            Command::Transition {
                reason,
                user,
                skip_validation,
                data,
                ..
            } => {
                assert_eq!(reason, "");
                assert_eq!(user, "system");
                assert!(!skip_validation);
                assert!(data.is_none());
            }
            _ => panic!("expected Transition command"),
        }
    }

    #[test]
    fn parses_global_flags() {
        let cli = Cli::parse_from(["orderflow", "statuses", "--workflow", "wf.json", "-v"]);
        assert!(cli.verbose);
        assert_eq!(cli.workflow, Some(PathBuf::from("wf.json")));
    }

    #[test]
    fn cli_verify() {
        Cli::command().debug_assert();
    }
}
