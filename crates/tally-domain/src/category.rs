//! Domain types representing transaction categories.

use serde::{Deserialize, Serialize};

use crate::common::*;

/// Palette offered when creating a category.
pub const COLOR_OPTIONS: [&str; 8] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#FFA07A", "#98D8C8", "#F06292", "#AED581", "#FFD54F",
];

/// Labels a transaction. A primary category carries a color and sorts first
/// within a transaction's category list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: RecordId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub primary: bool,
}

impl Category {
    pub fn new(name: impl Into<String>, color: Option<String>, primary: bool) -> Self {
        Self {
            id: RecordId::generate(),
            name: name.into().trim().to_string(),
            color,
            primary,
        }
    }

    /// Plain, non-primary category without a color.
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, None, false)
    }

    /// Stand-in for a category that was stored only by name.
    pub fn from_legacy_name(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: RecordId::new(name.clone()),
            name,
            color: None,
            primary: false,
        }
    }

    /// Color to render with; only primary categories are colored.
    pub fn display_color(&self) -> Option<&str> {
        if self.primary {
            self.color.as_deref()
        } else {
            None
        }
    }
}

impl Identifiable for Category {
    fn id(&self) -> &RecordId {
        &self.id
    }
}

/// Orders a selection so the primary category comes first, keeping the
/// relative order of everything else.
pub fn primary_first(categories: &mut [Category]) {
    categories.sort_by_key(|category| !category.primary);
}
