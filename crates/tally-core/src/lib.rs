//! tally-core
//!
//! Category and transaction stores for tally.
//! Depends on tally-domain. Persists through an injected `KeyValueStorage`;
//! no direct file or terminal I/O.

pub mod category_store;
pub mod draft;
pub mod error;
pub mod record_store;
pub mod storage;
pub mod transaction_store;

pub use category_store::CategoryStore;
pub use draft::{format_date, TransactionDraft, DEFAULT_DATE_FORMAT};
pub use error::CoreError;
pub use record_store::{LoadOutcome, PendingSave, Record, RecordStore};
pub use storage::{
    InMemoryStorage, KeyValueStorage, StorageError, CATEGORIES_KEY, TRANSACTIONS_KEY,
};
pub use transaction_store::{Totals, TransactionFilter, TransactionStore};

#[cfg(test)]
mod tests;
