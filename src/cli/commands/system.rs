use super::{CommandDefinition, CommandResult};
use crate::{
    cli::{config_path, output},
    App,
};

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "config",
        "Show the active settings",
        "config",
        cmd_config,
    )]
}

fn cmd_config(app: &App, _args: &[String]) -> CommandResult {
    let config = app.config();
    output::section("Configuration");
    output::info(format!("config file   {}", config_path().display()));
    output::info(format!("data dir      {}", config.resolve_data_dir().display()));
    output::info(format!("locale        {}", config.locale));
    output::info(format!("currency      {}", config.currency));
    output::info(format!("date format   {}", config.date_format));
    Ok(None)
}
