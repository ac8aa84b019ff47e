//! Expenditure CLI commands
//!
//! Manual entry and listing of expenditures.

use chrono::Local;
use clap::Subcommand;

use crate::config::Settings;
use crate::display::format_expenditure_table;
use crate::error::{YabaError, YabaResult};
use crate::models::{Money, OwnerId};
use crate::services::{ExpenditureInput, ExpenditureService, ListOptions};
use crate::storage::Storage;

use super::report::parse_date;

/// Expenditure subcommands
#[derive(Subcommand)]
pub enum ExpenditureCommands {
    /// Record an expenditure by hand
    Add {
        /// Amount (e.g., "12.50")
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// Name or merchant
        name: String,
        /// Transaction date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
        /// Budget category label
        #[arg(short, long)]
        category: Option<String>,
        /// Reward category
        #[arg(short, long)]
        reward: Option<String>,
        /// Payment method
        #[arg(short, long)]
        method: Option<String>,
        /// Comment
        #[arg(long)]
        comment: Option<String>,
    },

    /// List expenditures, newest first
    List {
        /// Earliest date (YYYY-MM-DD)
        #[arg(long)]
        since: Option<String>,
        /// Latest date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        until: Option<String>,
        /// Only rows from this import source
        #[arg(short, long)]
        source: Option<String>,
        /// Only rows with this budget category label
        #[arg(short, long)]
        category: Option<String>,
        /// Number of rows to show
        #[arg(short, long)]
        limit: Option<usize>,
        /// Rows to skip
        #[arg(long)]
        offset: Option<usize>,
    },
}

/// Handle an expenditure command
pub fn handle_expenditure_command(
    storage: &Storage,
    settings: &Settings,
    owner: OwnerId,
    cmd: ExpenditureCommands,
) -> YabaResult<()> {
    let service = ExpenditureService::new(storage, settings.list_limit);

    match cmd {
        ExpenditureCommands::Add {
            amount,
            name,
            date,
            category,
            reward,
            method,
            comment,
        } => {
            let amount = Money::parse(&amount).map_err(|e| {
                YabaError::Validation(format!("Invalid amount '{}': {}", amount, e))
            })?;
            let date = date.unwrap_or_else(|| Local::now().date_naive().to_string());

            let input = ExpenditureInput {
                date,
                amount,
                name: Some(name),
                method,
                budget_category: category,
                reward_category: reward,
                comment,
                source: Some("manual".to_string()),
            };
            let stored = service.create(owner, vec![input])?;
            println!("Recorded {} expenditure(s): {}", stored, amount);
        }

        ExpenditureCommands::List {
            since,
            until,
            source,
            category,
            limit,
            offset,
        } => {
            let options = ListOptions {
                since: since.as_deref().map(parse_date).transpose()?,
                until: until.as_deref().map(parse_date).transpose()?,
                source,
                category,
                limit,
                offset,
            };
            let rows = service.list(owner, &options)?;
            println!("{}", format_expenditure_table(&rows));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::YabaPaths;
    use crate::storage::{ExpenditureQuery, PersistenceGateway};
    use tempfile::TempDir;

    #[test]
    fn test_add_records_manual_source() {
        let temp_dir = TempDir::new().unwrap();
        let paths = YabaPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();
        let owner = OwnerId::new();

        handle_expenditure_command(
            &storage,
            &Settings::default(),
            owner,
            ExpenditureCommands::Add {
                amount: "12.50".into(),
                name: "Coffee".into(),
                date: Some("2024-03-20".into()),
                category: Some("dining".into()),
                reward: Some("dining".into()),
                method: None,
                comment: None,
            },
        )
        .unwrap();

        let rows = storage
            .query_expenditures(&ExpenditureQuery::for_owner(owner))
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].source, "manual");
        assert_eq!(rows[0].amount.cents(), 1250);
        assert_eq!(rows[0].reward_category.as_deref(), Some("DINING"));
    }

    #[test]
    fn test_add_rejects_bad_amount() {
        let temp_dir = TempDir::new().unwrap();
        let paths = YabaPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();

        let err = handle_expenditure_command(
            &storage,
            &Settings::default(),
            OwnerId::new(),
            ExpenditureCommands::Add {
                amount: "lots".into(),
                name: "Coffee".into(),
                date: None,
                category: None,
                reward: None,
                method: None,
                comment: None,
            },
        )
        .unwrap_err();
        assert!(err.is_validation());
    }
}
