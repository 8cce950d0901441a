use tally_core::CoreError;
use tally_domain::{primary_first, Category, RecordId};

use super::{CommandDefinition, CommandResult};
use crate::{
    cli::{args::ParsedArgs, output},
    App, AppError,
};

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "categories",
            "List categories, primary ones first",
            "categories",
            cmd_list,
        ),
        CommandDefinition::new(
            "category-add",
            "Create a category",
            "category-add <name> [--primary] [--color <hex from the palette>]",
            cmd_add,
        ),
        CommandDefinition::new(
            "category-rename",
            "Change a category's name",
            "category-rename <id> <name>",
            cmd_rename,
        ),
        CommandDefinition::new(
            "category-delete",
            "Remove a category",
            "category-delete <id>",
            cmd_delete,
        ),
    ]
}

fn cmd_list(app: &App, _args: &[String]) -> CommandResult {
    let mut categories = app.categories().categories();
    if categories.is_empty() {
        output::info("No categories yet.");
        return Ok(None);
    }
    primary_first(&mut categories);
    output::section("Categories");
    for category in &categories {
        let marker = if category.primary { "*" } else { " " };
        let color = category.display_color().unwrap_or("");
        output::info(format!("{marker} {}  {}  {color}", category.id, category.name));
    }
    Ok(None)
}

fn cmd_add(app: &App, args: &[String]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &["primary"])?;
    let name = parsed.positional.join(" ");
    if name.trim().is_empty() {
        return Err(AppError::usage("category name cannot be empty"));
    }
    let primary = parsed.flag("primary");
    let palette = app.categories().color_options();
    let color = match parsed.value("color") {
        Some(hex) => {
            let chosen = palette
                .iter()
                .find(|option| option.eq_ignore_ascii_case(hex.trim()))
                .ok_or_else(|| {
                    AppError::usage(format!(
                        "color `{hex}` is not offered, pick one of {}",
                        palette.join(" ")
                    ))
                })?;
            Some(chosen.to_string())
        }
        None if primary => palette.first().map(|hex| hex.to_string()),
        None => None,
    };

    let category = Category::new(name, color, primary);
    let pending = app.categories().add(category.clone());
    output::success(format!("Category `{}` created ({})", category.name, category.id));
    Ok(pending)
}

fn cmd_rename(app: &App, args: &[String]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &[])?;
    let id = RecordId::from(parsed.require(0, "category id")?);
    let name = parsed.positional[1..].join(" ");
    if name.trim().is_empty() {
        return Err(AppError::usage("new name cannot be empty"));
    }
    if app.categories().get(&id).is_none() {
        return Err(CoreError::NotFound(id).into());
    }

    let pending = app.categories().rename(&id, &name);
    if pending.is_none() {
        output::warning("Name unchanged.");
    } else {
        output::success(format!("Category {id} renamed to `{}`", name.trim()));
    }
    Ok(pending)
}

fn cmd_delete(app: &App, args: &[String]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &[])?;
    let id = RecordId::from(parsed.require(0, "category id")?);
    let category = app
        .categories()
        .get(&id)
        .ok_or(CoreError::NotFound(id))?;

    let pending = app.categories().delete(&category);
    output::success(format!("Category `{}` deleted", category.name));
    Ok(pending)
}
