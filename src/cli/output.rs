use std::fmt;

use colored::{ColoredString, Colorize};
use tally_config::Config;
use tally_core::Totals;
use tally_domain::{Decimal, Transaction};

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Section,
}

fn apply_style(kind: MessageKind, message: impl fmt::Display) -> String {
    let text = message.to_string();
    match kind {
        MessageKind::Section => format!("=== {} ===", text.trim()).bold().to_string(),
        MessageKind::Success => format!("[ok] {text}").bright_green().to_string(),
        MessageKind::Warning => format!("[!] {text}").bright_yellow().to_string(),
        MessageKind::Error => format!("[x] {text}").bright_red().to_string(),
        MessageKind::Info => text,
    }
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    let formatted = apply_style(kind, message);
    match kind {
        MessageKind::Error | MessageKind::Warning => eprintln!("{formatted}"),
        _ => println!("{formatted}"),
    }
}

pub fn info(message: impl fmt::Display) {
    print(MessageKind::Info, message);
}

pub fn success(message: impl fmt::Display) {
    print(MessageKind::Success, message);
}

pub fn warning(message: impl fmt::Display) {
    print(MessageKind::Warning, message);
}

pub fn error(message: impl fmt::Display) {
    print(MessageKind::Error, message);
}

pub fn section(title: impl fmt::Display) {
    print(MessageKind::Section, title);
}

/// Renders amounts with the configured locale's decimal separator and
/// currency code.
#[derive(Debug, Clone)]
pub struct MoneyFormat {
    decimal_separator: char,
    currency: String,
}

impl MoneyFormat {
    pub fn from_config(config: &Config) -> Self {
        Self {
            decimal_separator: decimal_separator(&config.locale),
            currency: config.currency.clone(),
        }
    }

    /// Two decimal places, e.g. `1234,50` for `es-AR`.
    pub fn plain(&self, amount: Decimal) -> String {
        let text = format!("{:.2}", amount);
        if self.decimal_separator == '.' {
            text
        } else {
            text.replace('.', &self.decimal_separator.to_string())
        }
    }

    /// Green with a leading `+` when not negative, red otherwise.
    pub fn signed(&self, amount: Decimal) -> ColoredString {
        if amount < Decimal::ZERO {
            self.plain(amount).red()
        } else {
            format!("+{}", self.plain(amount)).green()
        }
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }
}

fn decimal_separator(locale: &str) -> char {
    let language = locale
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_lowercase();
    match language.as_str() {
        "es" | "pt" | "de" | "fr" | "it" | "nl" => ',',
        _ => '.',
    }
}

pub fn transaction_line(txn: &Transaction, money: &MoneyFormat) -> String {
    let primary = txn.primary_category().map(|category| &category.id);
    let categories = txn
        .categories
        .iter()
        .map(|category| {
            if Some(&category.id) == primary {
                format!("*{}", category.name)
            } else {
                category.name.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(", ");
    let mut line = format!(
        "{}  {}  {}  {}  [{}]",
        txn.id,
        txn.date,
        txn.name,
        money.signed(txn.signed_amount()),
        categories
    );
    if let Some(card) = &txn.card_name {
        line.push_str(&format!("  card: {card}"));
    }
    if let Some(count) = txn.installments {
        line.push_str(&format!("  x{count}"));
    }
    line
}

pub fn totals_line(totals: &Totals, money: &MoneyFormat) -> String {
    format!(
        "income {}  expense {}  balance {} {}",
        money.plain(totals.income),
        money.plain(totals.expense),
        money.signed(totals.balance),
        money.currency()
    )
}
