//! Subcommand dispatch and execution.
//!
//! The [`dispatch`] function routes the parsed CLI to the appropriate
//! subcommand handler: [`run`], [`validate`], or [`health`].
//! Each handler lives in its own submodule.

pub mod health;
pub mod run;
pub mod validate;

use crate::cli::{Cli, Commands};
use crate::error::RosterError;

pub async fn dispatch(cli: Cli) -> Result<(), RosterError> {
    match cli.command {
        Some(Commands::Run(args)) => run::execute(*args).await,
        Some(Commands::Validate(ref args)) => validate::execute(args),
        Some(Commands::Health(args)) => health::execute(args).await,
        None => {
            print_welcome();
            Ok(())
        }
    }
}

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        "\n  roster v{version}: employee directory API\n\n  \
         No command provided. To get started:\n\n    \
         roster run                        Start the API (auto-detects ./roster.yaml)\n    \
         roster run -c demo/roster.yaml    Start with a specific config file\n    \
         roster validate roster.yaml       Check a config file\n    \
         roster --help                     See all commands and options\n"
    );
}
