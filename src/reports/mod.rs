//! Reports module for yaba
//!
//! Time-bucketed spending summaries.

pub mod aggregation;

pub use aggregation::{
    summarize, unclassified_label, AggregationEngine, SummaryReport, NO_REWARD_LABEL,
};
