//! Shared identifiers and traits for tracked records.

use std::{
    fmt,
    sync::atomic::{AtomicI64, Ordering},
};

use chrono::Utc;
use serde::{Deserialize, Serialize};

static LAST_ISSUED: AtomicI64 = AtomicI64::new(0);

/// Opaque string identifier assigned to a record when it is created.
///
/// Freshly generated ids are millisecond timestamps. Ids read back from storage
/// are kept verbatim, whatever their shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Issues a timestamp-derived id, strictly increasing within the process.
    pub fn generate() -> Self {
        let now = Utc::now().timestamp_millis();
        let mut last = LAST_ISSUED.load(Ordering::Relaxed);
        loop {
            let next = now.max(last + 1);
            match LAST_ISSUED.compare_exchange_weak(last, next, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return Self(next.to_string()),
                Err(actual) => last = actual,
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Exposes the stable identifier records are matched by.
pub trait Identifiable {
    fn id(&self) -> &RecordId;
}
