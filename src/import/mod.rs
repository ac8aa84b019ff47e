//! Transaction file import
//!
//! Reads a CSV stream into expenditures. The header is validated before any
//! row is parsed, blank rows are skipped, and the first bad row aborts the
//! whole file with an error naming the source.

pub mod normalizer;
pub mod schema;

pub use normalizer::{parse_amount, RecordNormalizer};
pub use schema::{validate_headers, Column, ColumnIndex};

use std::io::Read;

use csv::StringRecord;

use crate::config::UnknownColumnPolicy;
use crate::error::{YabaError, YabaResult};
use crate::models::{Expenditure, OwnerId};

/// Explicit import configuration, usually derived from `Settings`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    /// What to do with header columns that are not recognized
    pub unknown_columns: UnknownColumnPolicy,
    /// strftime patterns tried in order for the date column
    pub date_formats: Vec<String>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            unknown_columns: UnknownColumnPolicy::default(),
            date_formats: vec!["%Y-%m-%d".to_string(), "%d %b %Y".to_string()],
        }
    }
}

/// Import every row of a CSV stream
///
/// All returned expenditures belong to `owner`, carry `source` as their
/// source label and are unclassified. Any error is wrapped as
/// [`YabaError::Import`] for `source`.
pub fn import_expenditures<R: Read>(
    owner: OwnerId,
    source: &str,
    reader: R,
    options: &ImportOptions,
) -> YabaResult<Vec<Expenditure>> {
    tracing::debug!(source, "importing file");
    let expenditures =
        read_expenditures(owner, source, reader, options).map_err(|e| YabaError::import(source, e))?;
    tracing::info!(source, rows = expenditures.len(), "imported file");
    Ok(expenditures)
}

fn read_expenditures<R: Read>(
    owner: OwnerId,
    source: &str,
    reader: R,
    options: &ImportOptions,
) -> YabaResult<Vec<Expenditure>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(reader);
    let mut records = reader.records();

    let header = records.next().ok_or(YabaError::EmptyFile)??;
    let columns = validate_headers(header.iter(), options.unknown_columns)?;
    let mut normalizer =
        RecordNormalizer::new(owner, source, columns, options.date_formats.clone());

    let mut expenditures = Vec::new();
    for result in records {
        let record = result?;
        if is_blank(&record) {
            continue;
        }
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        expenditures.push(normalizer.normalize(&record, line)?);
    }

    Ok(expenditures)
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|field| field.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn import(csv: &str) -> YabaResult<Vec<Expenditure>> {
        import_expenditures(
            OwnerId::new(),
            "testSource",
            csv.as_bytes(),
            &ImportOptions::default(),
        )
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_two_row_file() {
        let csv = "date,amount,name\n2024-03-20,100.50,Expense 1\n2024-03-21,50.25,Expense 2\n";
        let rows = import(csv).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, date(2024, 3, 20));
        assert_eq!(rows[0].amount.cents(), 10050);
        assert_eq!(rows[0].name, "expense 1");
        assert_eq!(rows[1].date, date(2024, 3, 21));
        assert_eq!(rows[1].amount.cents(), 5025);
        assert!(rows.iter().all(|e| e.expense_id.is_none()));
        assert!(rows.iter().all(|e| e.source == "testSource"));
    }

    #[test]
    fn test_rows_share_owner() {
        let owner = OwnerId::new();
        let csv = "date,amount\n2024-01-01,1\n2024-01-02,2\n";
        let rows =
            import_expenditures(owner, "a.csv", csv.as_bytes(), &ImportOptions::default()).unwrap();
        assert!(rows.iter().all(|e| e.owner == owner));
    }

    #[test]
    fn test_bank_export_dates() {
        let csv = "Date,Description,Amount\n\
                   05 Mar 2024,Coffee Shop,4.50\n\
                   17 Apr 2024,\"Hardware, Inc\",\"$1,204.99\"\n";
        let rows = import(csv).unwrap();

        assert_eq!(rows[0].date, date(2024, 3, 5));
        assert_eq!(rows[1].date, date(2024, 4, 17));
        assert_eq!(rows[1].name, "hardware, inc");
        assert_eq!(rows[1].amount.cents(), 120499);
    }

    #[test]
    fn test_all_columns() {
        let csv = "date,amount,name,method,budget_category,reward_category,comment\n\
                   2029-08-09,\"12,345.67\",Nuclear Bunkers Inc.,gold bars,shelter,travel,paid in full\n";
        let rows = import(csv).unwrap();
        let e = &rows[0];
        assert_eq!(e.method.as_deref(), Some("gold bars"));
        assert_eq!(e.budget_category, "shelter");
        assert_eq!(e.reward_category.as_deref(), Some("TRAVEL"));
        assert_eq!(e.comment, "paid in full");
    }

    #[test]
    fn test_blank_rows_are_skipped() {
        let csv = "date,amount,name\n2024-03-20,1.00,a\n,,\n  , ,\n2024-03-21,2.00,b\n";
        let rows = import(csv).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_header_only_file() {
        let rows = import("date,amount,name,budget_category\n").unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_empty_file() {
        let err = import("").unwrap_err();
        assert!(err.is_schema());
        assert!(matches!(
            err,
            YabaError::Import { ref source, .. } if matches!(**source, YabaError::EmptyFile)
        ));
    }

    #[test]
    fn test_extra_column_is_ignored() {
        let csv = "date,amount,balance\n2024-03-20,1.00,900.00\n";
        let rows = import(csv).unwrap();
        assert_eq!(rows[0].amount.cents(), 100);
    }

    #[test]
    fn test_extra_column_rejected_when_strict() {
        let options = ImportOptions {
            unknown_columns: UnknownColumnPolicy::Strict,
            ..ImportOptions::default()
        };
        let csv = "date,amount,balance\n2024-03-20,1.00,900.00\n";
        let err =
            import_expenditures(OwnerId::new(), "strict.csv", csv.as_bytes(), &options).unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to import 'strict.csv': unrecognized column 'balance'"
        );
    }

    #[test]
    fn test_missing_columns() {
        let err = import("amount,name\n1.00,a\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to import 'testSource': missing required column 'date'"
        );

        let err = import("date,name\n2024-01-01,a\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to import 'testSource': missing required column 'amount'"
        );
    }

    #[test]
    fn test_incomplete_row_aborts_file() {
        let csv = "date,amount,name\n2024-03-20,1.00,a\n2024-03-21,2.00\n";
        let err = import(csv).unwrap_err();
        assert!(matches!(
            err,
            YabaError::Import { ref source, .. } if matches!(**source, YabaError::Csv(_))
        ));
    }

    #[test]
    fn test_unparsable_amount_aborts_file() {
        let csv = "date,amount\n2024-03-20,1.00\n2024-03-21,123gg.45\n";
        let err = import(csv).unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to import 'testSource': line 3: failed to parse dollars from '123gg.45'"
        );
    }

    #[test]
    fn test_unparsable_date_aborts_file() {
        let csv = "date,amount\n2024/03/20,1.00\n";
        let err = import(csv).unwrap_err();
        assert!(matches!(
            err,
            YabaError::Import { ref source, .. }
                if matches!(**source, YabaError::InvalidDate { line: 2, .. })
        ));
    }
}
