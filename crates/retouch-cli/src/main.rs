//! Command-line entry point.

use clap::Parser;
use retouch_cli::{CliArgs, CliError, run};
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = CliArgs::parse();
    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    match run(&args) {
        Ok(summary) => {
            log::info!("{} patch(es) committed", summary.committed);
            ExitCode::SUCCESS
        }
        Err(CliError::Compose(e)) => {
            log::warn!("{:?}", e);
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
