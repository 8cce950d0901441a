//! tally-domain
//!
//! Pure record types (Category, Transaction) and their shared traits.
//! No I/O, no storage. Only data types and core enums.

pub mod category;
pub mod common;
pub mod transaction;

pub use category::*;
pub use common::*;
pub use transaction::*;

// Re-export so consumers can name amounts without a direct dependency.
pub use rust_decimal::Decimal;
