use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::{category::Category, common::*};

/// Direction of money movement.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    #[serde(alias = "ingreso")]
    Income,
    #[serde(alias = "egreso")]
    Expense,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        };
        f.write_str(label)
    }
}

/// How a transaction was paid. Only used while composing; the stored record
/// keeps the derived `installments` and `card_name` instead.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Debit,
    #[default]
    Credit,
    Cash,
}

impl PaymentMethod {
    pub fn uses_card(self) -> bool {
        !matches!(self, PaymentMethod::Cash)
    }

    pub fn allows_installments(self) -> bool {
        matches!(self, PaymentMethod::Credit)
    }
}

/// A recorded income or expense.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: RecordId,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Read leniently: missing, null or unparseable amounts become zero.
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Display-formatted date, kept exactly as entered.
    #[serde(default)]
    pub date: String,
    #[serde(default, deserialize_with = "deserialize_categories")]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub name: String,
    #[serde(
        default,
        deserialize_with = "deserialize_installments",
        skip_serializing_if = "Option::is_none"
    )]
    pub installments: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_name: Option<String>,
}

impl Transaction {
    /// Interprets the stored date string as day/month/year, falling back to ISO.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_day_month_year(&self.date)
            .or_else(|| NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok())
    }

    /// Amount with the sign of its direction: income positive, expense negative.
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }

    pub fn primary_category(&self) -> Option<&Category> {
        self.categories.iter().find(|category| category.primary)
    }

    pub fn has_category(&self, id: &RecordId) -> bool {
        self.categories.iter().any(|category| &category.id == id)
    }
}

impl Identifiable for Transaction {
    fn id(&self) -> &RecordId {
        &self.id
    }
}

fn parse_day_month_year(value: &str) -> Option<NaiveDate> {
    let mut parts = value.trim().split('/');
    let day = parts.next()?.trim().parse().ok()?;
    let month = parts.next()?.trim().parse().ok()?;
    let year = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredCategory {
    Full(Category),
    Name(String),
}

fn deserialize_categories<'de, D>(deserializer: D) -> Result<Vec<Category>, D::Error>
where
    D: Deserializer<'de>,
{
    let stored = Vec::<StoredCategory>::deserialize(deserializer)?;
    Ok(stored
        .into_iter()
        .map(|entry| match entry {
            StoredCategory::Full(category) => category,
            StoredCategory::Name(name) => Category::from_legacy_name(name),
        })
        .collect())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredAmount {
    Exact(Decimal),
    Other(de::IgnoredAny),
}

fn deserialize_amount<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<StoredAmount>::deserialize(deserializer)? {
        Some(StoredAmount::Exact(amount)) => Ok(amount),
        Some(StoredAmount::Other(_)) | None => Ok(Decimal::ZERO),
    }
}

/// Installments come from a free text field, so anything that is not a
/// whole number is dropped rather than failing the record.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredInstallments {
    Count(u32),
    Text(String),
    Other(de::IgnoredAny),
}

fn deserialize_installments<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<StoredInstallments>::deserialize(deserializer)? {
        Some(StoredInstallments::Count(count)) => Some(count),
        Some(StoredInstallments::Text(text)) => text.trim().parse().ok(),
        Some(StoredInstallments::Other(_)) | None => None,
    })
}
