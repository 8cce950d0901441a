//! tally keeps a list of expense and income records grouped by categories,
//! persisted through the stores in `tally-core`. This crate wires the stores
//! to a data directory and hosts the `tally_cli` binary.

pub mod app;
pub mod cli;
pub mod errors;
pub mod utils;

pub use app::App;
pub use errors::AppError;

/// Initializes global tracing with the default directive.
pub fn init() {
    init_with_filter(None);
}

/// Initializes global tracing, preferring `filter` when `RUST_LOG` is unset.
/// Only the first call has any effect.
pub fn init_with_filter(filter: Option<&str>) {
    utils::init_tracing(filter);
    tracing::debug!("tally tracing initialized");
}
