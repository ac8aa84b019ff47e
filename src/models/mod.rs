//! Core data models for yaba
//!
//! This module contains the data structures of the spending domain:
//! expenditures, budgets with their expense categories, and the value
//! objects used to request and return time-bucketed summaries.

pub mod budget;
pub mod expenditure;
pub mod ids;
pub mod money;
pub mod summary;

pub use budget::{normalize_label, Budget, BudgetValidationError, ExpenseCategory, Income};
pub use expenditure::Expenditure;
pub use ids::{BudgetId, ExpenditureId, ExpenseCategoryId, OwnerId};
pub use money::Money;
pub use summary::{AggregationFn, AggregationRequest, GroupBy, Granularity, SummaryBucket};
