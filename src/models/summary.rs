//! Aggregation request and summary bucket types
//!
//! These are the value objects exchanged with the aggregation engine: what
//! range and shape of summary to compute, and the buckets that come back.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::money::Money;

/// Time-bucket width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Granularity {
    #[default]
    Day,
    Week,
    Month,
    Year,
}

impl Granularity {
    /// Start of the bucket `date` falls into
    ///
    /// Weeks start on Monday (ISO 8601).
    pub fn truncate(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Self::Day => date,
            Self::Week => date - Duration::days(i64::from(date.weekday().num_days_from_monday())),
            Self::Month => date.with_day(1).unwrap_or(date),
            Self::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date),
        }
    }
}

/// How amounts inside one bucket are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum AggregationFn {
    #[default]
    Sum,
    Average,
}

/// Secondary partitioning key besides time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupBy {
    #[default]
    None,
    BudgetCategory,
    RewardCategory,
}

macro_rules! impl_keyword {
    ($ty:ty, $what:literal, { $($variant:path => [$($word:literal),+]),+ $(,)? }) => {
        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let lowered = s.trim().to_lowercase();
                $(
                    if [$($word),+].contains(&lowered.as_str()) {
                        return Ok($variant);
                    }
                )+
                Err(format!("unknown {} '{}'", $what, s))
            }
        }
    };
}

impl_keyword!(Granularity, "granularity", {
    Granularity::Day => ["day", "daily"],
    Granularity::Week => ["week", "weekly"],
    Granularity::Month => ["month", "monthly"],
    Granularity::Year => ["year", "yearly"],
});

impl_keyword!(AggregationFn, "aggregation", {
    AggregationFn::Sum => ["sum", "total"],
    AggregationFn::Average => ["average", "avg", "mean"],
});

impl_keyword!(GroupBy, "grouping", {
    GroupBy::None => ["none"],
    GroupBy::BudgetCategory => ["budget_category", "budget-category", "budget"],
    GroupBy::RewardCategory => ["reward_category", "reward-category", "reward"],
});

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Day => write!(f, "DAY"),
            Self::Week => write!(f, "WEEK"),
            Self::Month => write!(f, "MONTH"),
            Self::Year => write!(f, "YEAR"),
        }
    }
}

impl fmt::Display for AggregationFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sum => write!(f, "SUM"),
            Self::Average => write!(f, "AVERAGE"),
        }
    }
}

/// Parameters of a summary query
///
/// Missing dates mean the range is open on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AggregationRequest {
    /// First day included
    pub start: Option<NaiveDate>,
    /// Last day included
    pub end: Option<NaiveDate>,
    #[serde(default)]
    pub granularity: Granularity,
    #[serde(default)]
    pub aggregation: AggregationFn,
    #[serde(default)]
    pub group_by: GroupBy,
}

impl AggregationRequest {
    /// A request over all time with default shape (DAY, SUM, no grouping)
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to an inclusive date range
    pub fn between(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    pub fn granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }

    pub fn aggregation(mut self, aggregation: AggregationFn) -> Self {
        self.aggregation = aggregation;
        self
    }

    pub fn group_by(mut self, group_by: GroupBy) -> Self {
        self.group_by = group_by;
        self
    }

    /// Check whether `date` lies within the requested range (inclusive)
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |start| date >= start) && self.end.map_or(true, |end| date <= end)
    }
}

/// One row of a summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryBucket {
    /// First day of the bucket
    pub start_date: NaiveDate,
    /// Group label; `None` when the request was not grouped
    pub group: Option<String>,
    /// Aggregated amount
    pub amount: Money,
    /// Number of expenditures that fell into the bucket
    pub count: usize,
}
