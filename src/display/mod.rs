//! Display formatting for terminal output
//!
//! Provides utilities for formatting data models for terminal display.

pub mod budget;
pub mod expenditure;
pub mod upload;

pub use budget::{format_budget_details, format_budget_list};
pub use expenditure::format_expenditure_table;
pub use upload::format_upload_report;
