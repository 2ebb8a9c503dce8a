//! `promo`: operator entry point for the referral lifecycle of one installation.

mod cli;
mod command;
mod error;

use clap::Parser;
use cli::{Cli, Command};
use error::CliError;
use std::process::ExitCode;
use tokio::{runtime::Builder, task::LocalSet};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("promo: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = command::load_config(&cli)?;

    match cli.command {
        Command::Status => command::status(&config),
        Command::Run => block_on_local(command::run(config)),
        Command::Check => block_on_local(command::check(config)),
    }
}

// the manager is single-threaded; everything runs on one LocalSet
fn block_on_local<F: Future<Output = Result<(), CliError>>>(fut: F) -> Result<(), CliError> {
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Runtime(e.to_string()))?;

    LocalSet::new().block_on(&runtime, fut)
}
