//! CLI command for spending summaries
//!
//! Prints a time-bucketed summary of the owner's expenditures, or writes it
//! as CSV.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Args;

use crate::error::{YabaError, YabaResult};
use crate::models::{AggregationFn, AggregationRequest, GroupBy, Granularity, OwnerId};
use crate::reports::AggregationEngine;
use crate::storage::Storage;

/// Arguments for `yaba report`
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Start date (YYYY-MM-DD), inclusive
    #[arg(short, long)]
    pub start: Option<String>,

    /// End date (YYYY-MM-DD), inclusive
    #[arg(short, long)]
    pub end: Option<String>,

    /// Bucket width (day, week, month, year)
    #[arg(short, long, default_value = "day")]
    pub granularity: Granularity,

    /// How amounts are combined (sum, average)
    #[arg(short, long, default_value = "sum")]
    pub aggregation: AggregationFn,

    /// Secondary grouping (none, budget_category, reward_category)
    #[arg(long, default_value = "none")]
    pub group_by: GroupBy,

    /// Write CSV to this file instead of printing
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Handle the report command
pub fn handle_report_command(storage: &Storage, owner: OwnerId, args: ReportArgs) -> YabaResult<()> {
    let request = AggregationRequest {
        start: args.start.as_deref().map(parse_date).transpose()?,
        end: args.end.as_deref().map(parse_date).transpose()?,
        granularity: args.granularity,
        aggregation: args.aggregation,
        group_by: args.group_by,
    };

    let report = AggregationEngine::new(storage).report(owner, request)?;

    match args.output {
        Some(path) => {
            let file = File::create(&path).map_err(|e| {
                YabaError::Io(format!("Failed to create {}: {}", path.display(), e))
            })?;
            report.export_csv(BufWriter::new(file))?;
            println!(
                "Wrote {} bucket(s) to {}",
                report.buckets.len(),
                path.display()
            );
        }
        None => print!("{}", report.format_terminal()),
    }

    Ok(())
}

/// Parse a `YYYY-MM-DD` command-line date
pub fn parse_date(value: &str) -> YabaResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        YabaError::Validation(format!(
            "Invalid date '{}'. Use format YYYY-MM-DD",
            value
        ))
    })
}
