//! Row normalization
//!
//! Turns one data row into an [`Expenditure`] using the column positions
//! established from the header. Dates are tried against an ordered list of
//! formats; the first format that works is remembered for the rest of the
//! file. Amounts tolerate thousands separators and currency symbols.

use chrono::NaiveDate;
use csv::StringRecord;

use super::schema::{Column, ColumnIndex};
use crate::error::{YabaError, YabaResult};
use crate::models::{Expenditure, Money, OwnerId};

/// Characters dropped from amount cells before parsing
const AMOUNT_NOISE: &[char] = &[',', ' ', '\u{a0}', '$', '€', '£', '¥'];

/// Per-file row reader
#[derive(Debug, Clone)]
pub struct RecordNormalizer {
    owner: OwnerId,
    source: String,
    columns: ColumnIndex,
    date_formats: Vec<String>,
    /// Index into `date_formats` of the last format that parsed
    detected_format: Option<usize>,
}

impl RecordNormalizer {
    /// Create a normalizer for one file
    pub fn new(
        owner: OwnerId,
        source: impl Into<String>,
        columns: ColumnIndex,
        date_formats: Vec<String>,
    ) -> Self {
        Self {
            owner,
            source: source.into(),
            columns,
            date_formats,
            detected_format: None,
        }
    }

    /// The date format this file has been using so far
    pub fn detected_format(&self) -> Option<&str> {
        self.detected_format
            .and_then(|i| self.date_formats.get(i))
            .map(String::as_str)
    }

    /// Normalize one row; `line` is only used for error messages
    pub fn normalize(&mut self, record: &StringRecord, line: u64) -> YabaResult<Expenditure> {
        let date = self.parse_date(self.cell(record, Column::Date), line)?;

        let raw_amount = self.cell(record, Column::Amount);
        let amount = parse_amount(raw_amount).ok_or_else(|| YabaError::InvalidAmount {
            line,
            value: raw_amount.trim().to_string(),
        })?;

        let mut expenditure = Expenditure::new(self.owner, date, amount);
        expenditure.source = self.source.clone();
        expenditure.name = self.text(record, Column::Name);
        expenditure.method = non_empty(self.text(record, Column::Method));
        expenditure.budget_category = self.text(record, Column::BudgetCategory);
        expenditure.reward_category =
            non_empty(self.text(record, Column::RewardCategory).to_uppercase());
        expenditure.comment = self.text(record, Column::Comment);

        Ok(expenditure)
    }

    /// Parse a date, preferring the format detected earlier in the file
    pub fn parse_date(&mut self, raw: &str, line: u64) -> YabaResult<NaiveDate> {
        let value = raw.trim();

        if let Some(format) = self.detected_format() {
            if let Ok(date) = NaiveDate::parse_from_str(value, format) {
                return Ok(date);
            }
        }

        for (i, format) in self.date_formats.iter().enumerate() {
            if Some(i) == self.detected_format {
                continue;
            }
            if let Ok(date) = NaiveDate::parse_from_str(value, format) {
                if let Some(previous) = self.detected_format() {
                    tracing::debug!(
                        source = %self.source,
                        from = previous,
                        to = %format,
                        line,
                        "date format changed within file"
                    );
                }
                self.detected_format = Some(i);
                return Ok(date);
            }
        }

        Err(YabaError::InvalidDate {
            line,
            value: value.to_string(),
        })
    }

    fn cell<'r>(&self, record: &'r StringRecord, column: Column) -> &'r str {
        self.columns
            .get(column)
            .and_then(|idx| record.get(idx))
            .unwrap_or("")
    }

    /// Trimmed, lower-cased cell text; empty when the column is absent
    fn text(&self, record: &StringRecord, column: Column) -> String {
        self.cell(record, column).trim().to_lowercase()
    }
}

/// Parse an amount cell such as "$12,345.67" or "1 000.5"
///
/// Returns `None` when what remains after stripping separators and currency
/// symbols is not a decimal number.
pub fn parse_amount(raw: &str) -> Option<Money> {
    let cleaned: String = raw.chars().filter(|c| !AMOUNT_NOISE.contains(c)).collect();
    Money::parse(&cleaned).ok()
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}
