use std::sync::Arc;

use rust_decimal::Decimal;
use tally_domain::{RecordId, Transaction, TransactionType};
use tracing::debug;

use crate::{
    record_store::{LoadOutcome, PendingSave, RecordStore},
    storage::{KeyValueStorage, TRANSACTIONS_KEY},
};

/// Authoritative list of recorded transactions.
pub struct TransactionStore {
    records: RecordStore<Transaction>,
}

impl TransactionStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            records: RecordStore::new(TRANSACTIONS_KEY, storage),
        }
    }

    pub async fn load(&self) -> LoadOutcome {
        self.records.load().await
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.records.list()
    }

    pub fn get(&self, id: &RecordId) -> Option<Transaction> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Appends `transaction`; a no-op for a taken id or a negative amount.
    pub fn add(&self, transaction: Transaction) -> Option<PendingSave> {
        if has_negative_amount(&transaction) {
            return None;
        }
        self.records.add(transaction)
    }

    /// Replaces the transaction with the same id; a no-op for an unknown id
    /// or a negative amount.
    pub fn update(&self, transaction: Transaction) -> Option<PendingSave> {
        if has_negative_amount(&transaction) {
            return None;
        }
        self.records.update(transaction)
    }

    pub fn delete(&self, transaction: &Transaction) -> Option<PendingSave> {
        self.records.delete(&transaction.id)
    }

    pub fn filter(&self, filter: &TransactionFilter) -> Vec<Transaction> {
        self.records
            .list()
            .into_iter()
            .filter(|txn| filter.matches(txn))
            .collect()
    }

    pub fn totals(&self) -> Totals {
        Totals::from_transactions(&self.records.list())
    }
}

fn has_negative_amount(transaction: &Transaction) -> bool {
    let negative = transaction.amount < Decimal::ZERO;
    if negative {
        debug!(id = %transaction.id, amount = %transaction.amount, "rejecting negative amount");
    }
    negative
}

/// Narrows the list view. Unset criteria match everything.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub kind: Option<TransactionType>,
    pub category: Option<RecordId>,
    pub text: Option<String>,
}

impl TransactionFilter {
    pub fn with_kind(mut self, kind: TransactionType) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_category(mut self, id: RecordId) -> Self {
        self.category = Some(id);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn matches(&self, txn: &Transaction) -> bool {
        if self.kind.is_some_and(|kind| kind != txn.kind) {
            return false;
        }
        if let Some(category) = &self.category {
            if !txn.has_category(category) {
                return false;
            }
        }
        match self.text.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => {
                let needle = needle.to_lowercase();
                txn.name.to_lowercase().contains(&needle)
                    || txn
                        .description
                        .as_deref()
                        .is_some_and(|text| text.to_lowercase().contains(&needle))
            }
            _ => true,
        }
    }
}

/// Income, expense and their difference across a set of transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
}

impl Totals {
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let mut totals = Totals::default();
        for txn in transactions {
            match txn.kind {
                TransactionType::Income => totals.income += txn.amount,
                TransactionType::Expense => totals.expense += txn.amount,
            }
        }
        totals.balance = totals.income - totals.expense;
        totals
    }
}
