//! Command dispatch: bridges CLI args -> coordinator calls -> output formatting.

pub mod config_cmd;
pub mod controllers;
pub mod entities;
pub mod login;
pub mod util;
pub mod watch;

use acinfinity_core::CoordinatorConfig;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch an account-bound command to its handler.
pub async fn dispatch(
    cmd: Command,
    config: CoordinatorConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Login => login::handle(config, global).await,
        Command::Controllers(args) => controllers::handle(config, args, global).await,
        Command::Entities(args) => entities::handle(config, args, global).await,
        Command::Watch(args) => watch::handle(config, args, global).await,
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "config and completions run without an account".into(),
        )),
    }
}
