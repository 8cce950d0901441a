//! Command line entry point: `tally_cli <command> [args...]`.

pub mod args;
pub mod commands;
pub mod output;

use std::{env, path::PathBuf};

use tally_config::ConfigManager;
use tally_core::LoadOutcome;
use tracing::warn;

use crate::{App, AppError};
use commands::CommandRegistry;

/// Overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "TALLY_CONFIG";

pub fn config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(ConfigManager::default_location)
}

/// Loads configuration and stored lists, runs one command, then waits for
/// the write it scheduled.
pub async fn run_cli(args: Vec<String>) -> Result<(), AppError> {
    let config = ConfigManager::new(config_path()).load()?;
    crate::init_with_filter(config.log_filter.as_deref());

    let registry = CommandRegistry::default();
    let Some((name, rest)) = args.split_first() else {
        print_help(&registry);
        return Ok(());
    };
    if matches!(name.as_str(), "help" | "--help" | "-h") {
        print_help(&registry);
        return Ok(());
    }
    let definition = registry
        .get(name)
        .ok_or_else(|| AppError::usage(format!("unknown command `{name}`, try `help`")))?;

    let app = App::open(config)?;
    let (categories, transactions) = app.load().await;
    for (key, outcome) in [("categories", categories), ("transactions", transactions)] {
        if outcome == LoadOutcome::Unreadable {
            warn!(key, "stored list could not be read, starting empty");
            output::warning(format!("Stored {key} could not be read."));
        }
    }

    if let Some(pending) = (definition.handler)(&app, rest)? {
        pending.wait().await?;
    }
    Ok(())
}

fn print_help(registry: &CommandRegistry) {
    output::section("Available commands");
    for definition in registry.iter() {
        output::info(format!("{:<16} {}", definition.name, definition.description));
        output::info(format!("{:<16} usage: {}", "", definition.usage));
    }
}
