//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod budget;
pub mod expenditure;
pub mod report;
pub mod upload;

pub use budget::{handle_budget_command, BudgetCommands};
pub use expenditure::{handle_expenditure_command, ExpenditureCommands};
pub use report::{handle_report_command, ReportArgs};
pub use upload::{handle_upload_command, UploadArgs};

use crate::config::Settings;
use crate::error::{YabaError, YabaResult};
use crate::models::OwnerId;

/// Pick the owner for a command: the command line wins over settings
pub fn resolve_owner(explicit: Option<&str>, settings: &Settings) -> YabaResult<OwnerId> {
    match explicit {
        Some(raw) => raw
            .parse()
            .map_err(|_| YabaError::Validation(format!("Invalid owner ID: '{}'", raw))),
        None => settings.default_owner.ok_or_else(|| {
            YabaError::Config(
                "No owner given. Pass --owner, set YABA_OWNER, or run 'yaba init'".into(),
            )
        }),
    }
}
