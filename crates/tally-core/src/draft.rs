//! Field values collected by the transaction form, turned into a record on
//! submit.

use std::fmt::Write;

use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use tally_domain::{primary_first, Category, PaymentMethod, RecordId, Transaction, TransactionType};

use crate::CoreError;

/// Default display format for stored dates: day/month/year.
pub const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y";

/// Renders `date` the way transactions store it. Fails on a format chrono
/// cannot render instead of panicking.
pub fn format_date(date: NaiveDate, date_format: &str) -> Result<String, CoreError> {
    let mut formatted = String::new();
    write!(formatted, "{}", date.format(date_format))
        .map_err(|_| CoreError::Validation(format!("invalid date format `{date_format}`")))?;
    Ok(formatted)
}

#[derive(Debug, Clone)]
pub struct TransactionDraft {
    pub kind: TransactionType,
    pub amount: Option<Decimal>,
    pub name: String,
    pub description: String,
    /// Defaults to today when unset.
    pub date: Option<NaiveDate>,
    pub method: PaymentMethod,
    pub card_name: String,
    pub installments: Option<u32>,
    pub categories: Vec<Category>,
}

impl Default for TransactionDraft {
    fn default() -> Self {
        Self::new(TransactionType::Expense)
    }
}

impl TransactionDraft {
    pub fn new(kind: TransactionType) -> Self {
        Self {
            kind,
            amount: None,
            name: String::new(),
            description: String::new(),
            date: None,
            method: PaymentMethod::default(),
            card_name: String::new(),
            installments: None,
            categories: Vec::new(),
        }
    }

    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_payment(
        mut self,
        method: PaymentMethod,
        card_name: impl Into<String>,
        installments: Option<u32>,
    ) -> Self {
        self.method = method;
        self.card_name = card_name.into();
        self.installments = installments;
        self
    }

    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.categories = categories;
        self
    }

    /// Validates the fields and produces a record with a fresh id.
    ///
    /// Installments survive only for credit payments and the card name only
    /// for card payments.
    pub fn build(&self, date_format: &str) -> Result<Transaction, CoreError> {
        let amount = self
            .amount
            .ok_or_else(|| CoreError::Validation("amount is required".into()))?;
        if amount < Decimal::ZERO {
            return Err(CoreError::Validation("amount cannot be negative".into()));
        }
        let name = self.name.trim();
        if name.is_empty() {
            return Err(CoreError::Validation("name is required".into()));
        }
        if self.categories.is_empty() {
            return Err(CoreError::Validation(
                "at least one category is required".into(),
            ));
        }
        if self.categories.iter().filter(|category| category.primary).count() > 1 {
            return Err(CoreError::Validation(
                "only one primary category is allowed".into(),
            ));
        }

        let date = self.date.unwrap_or_else(|| Local::now().date_naive());
        let formatted = format_date(date, date_format)?;

        let mut categories = self.categories.clone();
        primary_first(&mut categories);

        let description = self.description.trim();
        let card_name = self.card_name.trim();
        Ok(Transaction {
            id: RecordId::generate(),
            kind: self.kind,
            amount,
            description: (!description.is_empty()).then(|| description.to_string()),
            date: formatted,
            categories,
            name: name.to_string(),
            installments: self
                .installments
                .filter(|_| self.method.allows_installments()),
            card_name: (self.method.uses_card() && !card_name.is_empty())
                .then(|| card_name.to_string()),
        })
    }
}
