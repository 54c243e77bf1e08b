// ABOUTME: Shared data models for the IN450 viewer
// ABOUTME: Table shapes, fetched rows and the validated row limit

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Row limit used when nothing else is configured
pub const DEFAULT_ROW_LIMIT: u32 = 50;

/// Upper bound applied to any user-supplied row limit
pub const MAX_ROW_LIMIT: u32 = 10_000;

/// One fetched row: column values in query-declared order, `None` for SQL NULL
pub type Row = Vec<Option<String>>;

/// The three read-only tables the viewer knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Table {
    /// Opaque six-column records
    In450a,
    /// Contact / identity records
    In450b,
    /// Application and signature inventory
    In450c,
}

const IN450A_COLUMNS: &[&str] = &["col1", "col2", "col3", "col4", "col5", "col6"];
const IN450B_COLUMNS: &[&str] = &["first_name", "last_name", "email", "source", "destination"];
const IN450C_COLUMNS: &[&str] = &[
    "AppID",
    "AppName",
    "AppVersion",
    "source",
    "destination",
    "DigSig",
];

impl Table {
    /// Schema-qualified name used in SQL
    pub fn qualified_name(self) -> &'static str {
        match self {
            Table::In450a => "app.in450a",
            Table::In450b => "app.in450b",
            Table::In450c => "app.in450c",
        }
    }

    /// Name shown to the user, e.g. `IN450a`
    pub fn label(self) -> &'static str {
        match self {
            Table::In450a => "IN450a",
            Table::In450b => "IN450b",
            Table::In450c => "IN450c",
        }
    }

    /// Declared columns, in the order a full-row query returns them
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Table::In450a => IN450A_COLUMNS,
            Table::In450b => IN450B_COLUMNS,
            Table::In450c => IN450C_COLUMNS,
        }
    }

    pub fn has_column(self, column: &str) -> bool {
        self.columns().contains(&column)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.qualified_name())
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LimitError {
    #[error("Row limit is required")]
    Empty,
    #[error("Row limit must be a whole number, got '{0}'")]
    NotANumber(String),
    #[error("Row limit cannot be negative, got {0}")]
    Negative(i64),
}

/// A row cap that has been validated and clamped to `0..=MAX_ROW_LIMIT`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RowLimit(u32);

impl RowLimit {
    /// Clamp an unsigned value to the allowed range
    pub fn clamped(value: u64) -> Self {
        if value > u64::from(MAX_ROW_LIMIT) {
            log::warn!("Row limit {} clamped to {}", value, MAX_ROW_LIMIT);
            RowLimit(MAX_ROW_LIMIT)
        } else {
            RowLimit(value as u32)
        }
    }

    /// Parse the text of a row-limit input field
    pub fn parse(input: &str) -> Result<Self, LimitError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(LimitError::Empty);
        }

        let value: i64 = trimmed
            .parse()
            .map_err(|_| LimitError::NotANumber(trimmed.to_string()))?;
        if value < 0 {
            return Err(LimitError::Negative(value));
        }
        Ok(Self::clamped(value as u64))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Value bound to the `LIMIT $1` parameter
    pub fn as_i64(self) -> i64 {
        i64::from(self.0)
    }
}

impl Default for RowLimit {
    fn default() -> Self {
        RowLimit(DEFAULT_ROW_LIMIT)
    }
}

impl fmt::Display for RowLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
