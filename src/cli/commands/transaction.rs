use chrono::NaiveDate;
use tally_core::{format_date, CoreError, Totals, TransactionDraft, TransactionFilter};
use tally_domain::{Category, Decimal, PaymentMethod, RecordId, TransactionType};

use super::{CommandDefinition, CommandResult};
use crate::{
    cli::{
        args::ParsedArgs,
        output::{self, MoneyFormat},
    },
    App, AppError,
};

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "add",
            "Record an income or an expense",
            "add <income|expense> <amount> <name> --category <id>... [--description <text>] \
             [--date YYYY-MM-DD] [--method debit|credit|cash] [--card <name>] [--installments N]",
            cmd_add,
        ),
        CommandDefinition::new(
            "edit",
            "Change fields of a recorded transaction",
            "edit <id> [--amount <amount>] [--name <name>] [--description <text>] \
             [--date YYYY-MM-DD] [--card <name>] [--installments N|none]",
            cmd_edit,
        ),
        CommandDefinition::new(
            "list",
            "Show transactions with totals",
            "list [--type income|expense] [--category <id>] [--search <text>]",
            cmd_list,
        ),
        CommandDefinition::new(
            "delete",
            "Remove a transaction",
            "delete <id>",
            cmd_delete,
        ),
    ]
}

fn cmd_add(app: &App, args: &[String]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &[])?;
    let kind = parse_kind(parsed.require(0, "transaction type")?)?;
    let amount = parse_amount(parsed.require(1, "amount")?)?;
    let name = parsed.positional.get(2..).unwrap_or_default().join(" ");
    let categories = select_categories(app, parsed.values("category"))?;

    let method = parsed
        .value("method")
        .map(parse_method)
        .transpose()?
        .unwrap_or_default();
    let installments = match parsed.value("installments") {
        Some(raw) => parse_installments(raw)?,
        None => None,
    };

    let mut draft = TransactionDraft::new(kind)
        .with_amount(amount)
        .with_name(name)
        .with_payment(method, parsed.value("card").unwrap_or_default(), installments)
        .with_categories(categories);
    if let Some(description) = parsed.value("description") {
        draft = draft.with_description(description);
    }
    if let Some(raw) = parsed.value("date") {
        draft = draft.with_date(parse_date(raw)?);
    }

    let transaction = draft.build(&app.config().date_format)?;
    let pending = app.transactions().add(transaction.clone());
    output::success(format!(
        "Recorded {} `{}` ({})",
        transaction.kind, transaction.name, transaction.id
    ));
    Ok(pending)
}

/// Stages the requested categories the way the picker does: each id once,
/// at most one primary, primary first once confirmed.
fn select_categories(app: &App, ids: &[String]) -> Result<Vec<Category>, AppError> {
    let store = app.categories();
    store.clear_selection();
    for raw in ids {
        let id = RecordId::from(raw.as_str());
        let category = store.get(&id).ok_or(CoreError::NotFound(id))?;
        if store.temp_selected().iter().any(|staged| staged.id == category.id) {
            continue;
        }
        if !store.toggle_temp(&category) {
            store.clear_selection();
            return Err(AppError::usage(format!(
                "`{}` would be a second primary category, only one is allowed",
                category.name
            )));
        }
    }
    let selected = store.confirm_selection();
    store.clear_selection();
    Ok(selected)
}

fn cmd_edit(app: &App, args: &[String]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &[])?;
    let id = RecordId::from(parsed.require(0, "transaction id")?);
    if !parsed.has_options() {
        return Err(AppError::usage("nothing to change, pass at least one option"));
    }
    let mut transaction = app
        .transactions()
        .get(&id)
        .ok_or(CoreError::NotFound(id))?;

    if let Some(raw) = parsed.value("amount") {
        let amount = parse_amount(raw)?;
        if amount < Decimal::ZERO {
            return Err(AppError::usage("amount cannot be negative"));
        }
        transaction.amount = amount;
    }
    if let Some(name) = parsed.value("name") {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::usage("name cannot be empty"));
        }
        transaction.name = name.to_string();
    }
    if let Some(description) = parsed.value("description") {
        transaction.description = non_blank(description);
    }
    if let Some(raw) = parsed.value("date") {
        transaction.date = format_date(parse_date(raw)?, &app.config().date_format)?;
    }
    if let Some(card) = parsed.value("card") {
        transaction.card_name = non_blank(card);
    }
    if let Some(raw) = parsed.value("installments") {
        transaction.installments = parse_installments(raw)?;
    }

    let pending = app.transactions().update(transaction.clone());
    output::success(format!("Transaction `{}` updated", transaction.name));
    Ok(pending)
}

fn cmd_list(app: &App, args: &[String]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &[])?;
    let mut filter = TransactionFilter::default();
    if let Some(raw) = parsed.value("type") {
        filter = filter.with_kind(parse_kind(raw)?);
    }
    if let Some(raw) = parsed.value("category") {
        filter = filter.with_category(RecordId::from(raw));
    }
    if let Some(text) = parsed.value("search") {
        filter = filter.with_text(text);
    }

    let transactions = app.transactions().filter(&filter);
    if transactions.is_empty() {
        output::info("No transactions found.");
        return Ok(None);
    }
    let money = MoneyFormat::from_config(app.config());
    output::section("Transactions");
    for txn in &transactions {
        output::info(output::transaction_line(txn, &money));
    }

    let totals = Totals::from_transactions(&transactions);
    output::section("Totals");
    output::info(output::totals_line(&totals, &money));
    Ok(None)
}

fn cmd_delete(app: &App, args: &[String]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &[])?;
    let id = RecordId::from(parsed.require(0, "transaction id")?);
    let transaction = app
        .transactions()
        .get(&id)
        .ok_or(CoreError::NotFound(id))?;

    let pending = app.transactions().delete(&transaction);
    output::success(format!("Transaction `{}` deleted", transaction.name));
    Ok(pending)
}

fn non_blank(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_kind(raw: &str) -> Result<TransactionType, AppError> {
    match raw.trim().to_lowercase().as_str() {
        "income" | "ingreso" => Ok(TransactionType::Income),
        "expense" | "egreso" => Ok(TransactionType::Expense),
        other => Err(AppError::usage(format!(
            "unknown transaction type `{other}` (expected income or expense)"
        ))),
    }
}

fn parse_amount(raw: &str) -> Result<Decimal, AppError> {
    raw.trim()
        .parse::<Decimal>()
        .map_err(|_| AppError::usage(format!("invalid amount `{raw}`")))
}

fn parse_method(raw: &str) -> Result<PaymentMethod, AppError> {
    match raw.trim().to_lowercase().as_str() {
        "debit" => Ok(PaymentMethod::Debit),
        "credit" => Ok(PaymentMethod::Credit),
        "cash" => Ok(PaymentMethod::Cash),
        other => Err(AppError::usage(format!("unknown payment method `{other}`"))),
    }
}

/// `none` or an empty value clears the count.
fn parse_installments(raw: &str) -> Result<Option<u32>, AppError> {
    match raw.trim() {
        "" | "none" => Ok(None),
        count => count
            .parse::<u32>()
            .map(Some)
            .map_err(|_| AppError::usage(format!("invalid installments `{raw}`"))),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::usage(format!("invalid date `{raw}` (expected YYYY-MM-DD)")))
}
