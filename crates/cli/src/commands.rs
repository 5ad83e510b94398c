//! Maps CLI commands onto [`StatusService`] calls.
//!
//! Validation failures and rejected transitions are not process errors: they
//! are printed as structured JSON (the `errors` array kept intact) and
//! reported through [`Outcome::Rejected`].

use std::io::Write;
use std::process::ExitCode;

use anyhow::Context;
use serde_json::{Value, json};

use orderflow_core::{StatusError, StatusId, WorkflowError};
use orderflow_workflow::{StatusService, TransitionOptions, WorkflowConfig};

use crate::cli::{Cli, Command};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Rejected,
}

impl Outcome {
    pub fn exit_code(self) -> ExitCode {
        match self {
            Outcome::Success => ExitCode::SUCCESS,
            Outcome::Rejected => ExitCode::from(1),
        }
    }
}

pub fn run(cli: Cli) -> anyhow::Result<Outcome> {
    let definition = match &cli.workflow {
        Some(path) => WorkflowConfig::from_path(path)?.into_definition()?,
        None => orderflow_workflow::load_from_env()?,
    };
    let service = StatusService::from_definition(definition);

    let mut stdout = std::io::stdout().lock();
    execute(&service, cli.command, &mut stdout)
}

pub fn execute(
    service: &StatusService,
    command: Command,
    out: &mut impl Write,
) -> anyhow::Result<Outcome> {
    match command {
        Command::Statuses => {
            print_json(out, &service.get_statuses())?;
            Ok(Outcome::Success)
        }
        Command::Status { id } => match service.get_status(&id) {
            Some(status) => {
                print_json(out, status)?;
                Ok(Outcome::Success)
            }
            None => {
                print_json(out, &StatusError::invalid_status(&StatusId::from(id)))?;
                Ok(Outcome::Rejected)
            }
        },
        Command::Initial => {
            print_json(out, &json!({ "initial": service.get_initial_status() }))?;
            Ok(Outcome::Success)
        }
        Command::Transitions { id } => {
            let allowed = service.get_available_transitions(&id);
            print_json(out, &json!({ "status": id, "allowedTransitions": allowed }))?;
            Ok(Outcome::Success)
        }
        Command::Validate { from, to, data } => {
            let data = parse_data(data.as_deref())?;
            let result = service.validate_transition(&from, &to, &data);
            print_json(out, &result)?;
            Ok(if result.valid {
                Outcome::Success
            } else {
                Outcome::Rejected
            })
        }
        Command::Transition {
            from,
            to,
            data,
            reason,
            user,
            skip_validation,
        } => {
            let mut options = TransitionOptions::default()
                .with_data(parse_data(data.as_deref())?)
                .with_reason(reason)
                .with_user(user);
            if skip_validation {
                options = options.skip_validation();
            }

            match service.transition(&from, &to, options) {
                Ok(result) => {
                    print_json(out, &result)?;
                    Ok(Outcome::Success)
                }
                Err(WorkflowError::TransitionRejected { message, errors }) => {
                    print_json(
                        out,
                        &json!({ "success": false, "message": message, "errors": errors }),
                    )?;
                    Ok(Outcome::Rejected)
                }
                Err(err @ WorkflowError::InvalidStatus(_)) => {
                    let error = StatusError::new(err.kind(), err.to_string());
                    print_json(
                        out,
                        &json!({ "success": false, "message": err.to_string(), "errors": [error] }),
                    )?;
                    Ok(Outcome::Rejected)
                }
                Err(err) => Err(err.into()),
            }
        }
    }
}

fn parse_data(data: Option<&str>) -> anyhow::Result<Value> {
    match data {
        Some(raw) => serde_json::from_str(raw).context("--data must be valid JSON"),
        None => Ok(json!({})),
    }
}

fn print_json(out: &mut impl Write, value: &impl serde::Serialize) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
