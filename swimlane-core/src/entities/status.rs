//! Visual classification of HTTP status codes.
//!
//! Every item carries a class name of the form `status-<code>`; requests
//! without a status get the bare `status-` class. The name is a pure
//! function of the code text, so distinct codes never share a class. The
//! coarser [`StatusCategory`] comes from an extensible lookup table.

use std::collections::HashMap;

use compact_str::{CompactString, format_compact};
use serde::{Deserialize, Serialize};
use swimlane_sdk::objects::StatusCode;

/// Prefix shared by every status class name.
pub const STATUS_CLASS_PREFIX: &str = "status-";

/// Coarse visual bucket for a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCategory {
    Success,
    Redirect,
    ClientError,
    NotFound,
    ServerError,
    /// A status code with no table entry.
    Other,
    /// No status was reported.
    Unknown,
}

/// Class attached to an item: the per-code name plus its category.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StatusClass {
    name: CompactString,
    category: StatusCategory,
}

impl StatusClass {
    /// The catch-all class for requests without a status.
    pub fn unknown() -> Self {
        Self {
            name: CompactString::const_new(STATUS_CLASS_PREFIX),
            category: StatusCategory::Unknown,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> StatusCategory {
        self.category
    }

    /// The code part of the class name, empty for the catch-all class.
    pub fn code(&self) -> &str {
        &self.name[STATUS_CLASS_PREFIX.len()..]
    }
}

impl std::fmt::Display for StatusClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Lookup table from status code text to [`StatusCategory`].
///
/// The default table knows `200`, `404` and `500`; more entries can be
/// registered from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusClassTable {
    categories: HashMap<CompactString, StatusCategory>,
}

impl StatusClassTable {
    /// A table without any entries. Every non-empty code maps to
    /// [`StatusCategory::Other`].
    pub fn empty() -> Self {
        Self {
            categories: HashMap::new(),
        }
    }

    /// Register (or replace) the category for a code.
    pub fn insert(&mut self, code: impl Into<CompactString>, category: StatusCategory) {
        self.categories.insert(code.into(), category);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, code: impl Into<CompactString>, category: StatusCategory) -> Self {
        self.insert(code, category);
        self
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Classify a reported status. `None` and empty codes share the
    /// catch-all class.
    pub fn classify(&self, status: Option<&StatusCode>) -> StatusClass {
        let code = match status.map(|s| s.as_str().trim()) {
            Some(code) if !code.is_empty() => code,
            _ => return StatusClass::unknown(),
        };

        StatusClass {
            name: format_compact!("{STATUS_CLASS_PREFIX}{code}"),
            category: self
                .categories
                .get(code)
                .copied()
                .unwrap_or(StatusCategory::Other),
        }
    }
}

impl Default for StatusClassTable {
    fn default() -> Self {
        Self::empty()
            .with("200", StatusCategory::Success)
            .with("404", StatusCategory::NotFound)
            .with("500", StatusCategory::ServerError)
    }
}
