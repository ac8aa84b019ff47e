//! Header validation for transaction files
//!
//! The first row of a file names its columns. `date` and `amount` are
//! required; the remaining recognized columns are optional. Matching ignores
//! case and surrounding whitespace, and `description` is a synonym for `name`.

use std::collections::HashMap;
use std::fmt;

use crate::config::UnknownColumnPolicy;
use crate::error::{YabaError, YabaResult};

/// A column the importer knows how to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Date,
    Amount,
    Name,
    Method,
    BudgetCategory,
    RewardCategory,
    Comment,
}

impl Column {
    /// Map a header cell to a column, if recognized
    pub fn from_header(header: &str) -> Option<Self> {
        let header = header.trim_start_matches('\u{feff}').trim().to_lowercase();
        match header.as_str() {
            "date" => Some(Self::Date),
            "amount" => Some(Self::Amount),
            "name" | "description" => Some(Self::Name),
            "method" => Some(Self::Method),
            "budget_category" => Some(Self::BudgetCategory),
            "reward_category" => Some(Self::RewardCategory),
            "comment" => Some(Self::Comment),
            _ => None,
        }
    }

    /// Canonical header name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Amount => "amount",
            Self::Name => "name",
            Self::Method => "method",
            Self::BudgetCategory => "budget_category",
            Self::RewardCategory => "reward_category",
            Self::Comment => "comment",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of each recognized column within a row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnIndex {
    positions: HashMap<Column, usize>,
    width: usize,
}

impl ColumnIndex {
    /// Index of `column`, if the file has it
    pub fn get(&self, column: Column) -> Option<usize> {
        self.positions.get(&column).copied()
    }

    /// Check whether the file has `column`
    pub fn contains(&self, column: Column) -> bool {
        self.positions.contains_key(&column)
    }

    /// Number of cells in the header row
    pub fn width(&self) -> usize {
        self.width
    }
}

/// Validate a header row and build the column index
///
/// When a recognized column appears twice, the later one wins.
pub fn validate_headers<I, S>(headers: I, policy: UnknownColumnPolicy) -> YabaResult<ColumnIndex>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut positions = HashMap::new();
    let mut width = 0;

    for (idx, header) in headers.into_iter().enumerate() {
        width = idx + 1;
        let header = header.as_ref();
        match Column::from_header(header) {
            Some(column) => {
                if let Some(previous) = positions.insert(column, idx) {
                    tracing::debug!(column = %column, previous, idx, "column appears twice, using the later one");
                }
            }
            None => match policy {
                UnknownColumnPolicy::Permissive => {
                    tracing::warn!(column = header, "unrecognized column in headers");
                }
                UnknownColumnPolicy::Strict => {
                    return Err(YabaError::UnrecognizedColumn(header.to_string()));
                }
            },
        }
    }

    if !positions.contains_key(&Column::Date) {
        return Err(YabaError::MissingColumn("date"));
    }
    if !positions.contains_key(&Column::Amount) {
        return Err(YabaError::MissingColumn("amount"));
    }

    Ok(ColumnIndex { positions, width })
}
