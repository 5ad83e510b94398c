mod cli;
mod commands;

use std::process::ExitCode;

use clap::Parser;
use cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.verbose {
        orderflow_observability::tracing::init("debug");
    } else {
        orderflow_observability::init();
    }

    match commands::run(cli) {
        Ok(outcome) => outcome.exit_code(),
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}
