//! Aggregation engine
//!
//! Buckets an owner's expenditures by time and, optionally, by category, and
//! combines the amounts in each bucket.
//!
//! Every request is answered from a range query followed by an in-memory
//! pass, so WEEK, MONTH and YEAR granularity scan every row of the range.

use std::collections::BTreeMap;
use std::io::Write;

use chrono::NaiveDate;

use crate::error::{YabaError, YabaResult};
use crate::models::{
    AggregationFn, AggregationRequest, Expenditure, ExpenseCategoryId, GroupBy, Money, OwnerId,
    SummaryBucket,
};
use crate::storage::{ExpenditureQuery, PersistenceGateway};

/// Group label for expenditures that have no classification
pub fn unclassified_label() -> String {
    ExpenseCategoryId::nil().as_uuid().to_string()
}

/// Group label for expenditures without a reward category
pub const NO_REWARD_LABEL: &str = "";

/// Compute summary buckets over `expenditures`
///
/// Rows outside the requested range are ignored. Buckets come out ordered by
/// start date, then by group label; empty buckets are not emitted.
pub fn summarize(expenditures: &[Expenditure], request: &AggregationRequest) -> Vec<SummaryBucket> {
    let mut partitions: BTreeMap<(NaiveDate, String), (Money, usize)> = BTreeMap::new();

    for expenditure in expenditures.iter().filter(|e| request.contains(e.date)) {
        let bucket = request.granularity.truncate(expenditure.date);
        let group = group_key(expenditure, request.group_by);
        let entry = partitions
            .entry((bucket, group))
            .or_insert((Money::zero(), 0));
        entry.0 += expenditure.amount;
        entry.1 += 1;
    }

    partitions
        .into_iter()
        .map(|((start_date, group), (total, count))| SummaryBucket {
            start_date,
            group: match request.group_by {
                GroupBy::None => None,
                _ => Some(group),
            },
            amount: match request.aggregation {
                AggregationFn::Sum => total,
                AggregationFn::Average => Money::mean(total, count),
            },
            count,
        })
        .collect()
}

fn group_key(expenditure: &Expenditure, group_by: GroupBy) -> String {
    match group_by {
        GroupBy::None => String::new(),
        GroupBy::BudgetCategory => expenditure
            .expense_id
            .map(|id| id.as_uuid().to_string())
            .unwrap_or_else(unclassified_label),
        GroupBy::RewardCategory => expenditure
            .reward_category
            .clone()
            .unwrap_or_else(|| NO_REWARD_LABEL.to_string()),
    }
}

/// Answers summary requests from the persistence gateway
pub struct AggregationEngine<'a> {
    gateway: &'a dyn PersistenceGateway,
}

impl<'a> AggregationEngine<'a> {
    pub fn new(gateway: &'a dyn PersistenceGateway) -> Self {
        Self { gateway }
    }

    /// Summary buckets for one owner
    pub fn aggregate(
        &self,
        owner: OwnerId,
        request: &AggregationRequest,
    ) -> YabaResult<Vec<SummaryBucket>> {
        if let (Some(start), Some(end)) = (request.start, request.end) {
            if start > end {
                return Err(YabaError::Validation(format!(
                    "start date {} is after end date {}",
                    start, end
                )));
            }
        }

        let query = ExpenditureQuery::for_owner(owner).between(request.start, request.end);
        let rows = self.gateway.query_expenditures(&query)?;
        let buckets = summarize(&rows, request);

        tracing::debug!(
            %owner,
            rows = rows.len(),
            buckets = buckets.len(),
            granularity = %request.granularity,
            "aggregated expenditures"
        );
        Ok(buckets)
    }

    /// Summary buckets wrapped in a printable report
    pub fn report(&self, owner: OwnerId, request: AggregationRequest) -> YabaResult<SummaryReport> {
        let buckets = self.aggregate(owner, &request)?;
        Ok(SummaryReport { request, buckets })
    }
}

/// A computed summary together with the request that produced it
#[derive(Debug, Clone)]
pub struct SummaryReport {
    pub request: AggregationRequest,
    pub buckets: Vec<SummaryBucket>,
}

impl SummaryReport {
    /// Sum of all bucket amounts
    pub fn total(&self) -> Money {
        self.buckets.iter().map(|b| b.amount).sum()
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self) -> String {
        let mut output = String::new();

        let start = self
            .request
            .start
            .map_or_else(|| "beginning".to_string(), |d| d.to_string());
        let end = self
            .request
            .end
            .map_or_else(|| "latest".to_string(), |d| d.to_string());
        output.push_str(&format!(
            "Spending by {} ({}): {} to {}\n",
            self.request.granularity.to_string().to_lowercase(),
            self.request.aggregation.to_string().to_lowercase(),
            start,
            end
        ));
        output.push_str(&"=".repeat(60));
        output.push('\n');

        if self.buckets.is_empty() {
            output.push_str("No expenditures in range.\n");
            return output;
        }

        output.push_str(&format!("{:<12} {:<36} {:>12}\n", "Start", "Group", "Amount"));
        output.push_str(&"-".repeat(60));
        output.push('\n');

        for bucket in &self.buckets {
            let group = match bucket.group.as_deref() {
                None => "Total",
                Some("") => "(none)",
                Some(label) => label,
            };
            output.push_str(&format!(
                "{:<12} {:<36} {:>12}\n",
                bucket.start_date.to_string(),
                group,
                bucket.amount.to_string()
            ));
        }

        if self.request.aggregation == AggregationFn::Sum {
            output.push_str(&"-".repeat(60));
            output.push('\n');
            output.push_str(&format!("{:<49} {:>10}\n", "TOTAL", self.total().to_string()));
        }

        output
    }

    /// Export the buckets as CSV
    pub fn export_csv<W: Write>(&self, writer: W) -> YabaResult<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(["start_date", "group", "amount", "count"])?;
        for bucket in &self.buckets {
            csv.write_record([
                bucket.start_date.to_string(),
                bucket.group.clone().unwrap_or_else(|| "Total".to_string()),
                bucket.amount.to_decimal_string(),
                bucket.count.to_string(),
            ])?;
        }
        csv.flush()?;
        Ok(())
    }
}
