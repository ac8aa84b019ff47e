//! Budget CLI commands
//!
//! Implements CLI commands for creating, editing, loading and reconciling
//! budgets. Commands that take an optional budget ID fall back to the
//! owner's active budget.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::display::{format_budget_details, format_budget_list};
use crate::error::{YabaError, YabaResult};
use crate::models::{normalize_label, Budget, BudgetId, OwnerId};
use crate::services::{BudgetInput, BudgetService, ExpenseInput, IncomeInput};
use crate::storage::Storage;

/// Budget subcommands
#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Create a new budget
    Create {
        /// Budget name
        name: String,
        #[command(flatten)]
        lines: BudgetLines,
    },

    /// Change incomes and categories of a budget
    Update {
        /// Budget ID
        budget: String,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        #[command(flatten)]
        lines: BudgetLines,
        /// Remove an expense category or income source by label (repeatable)
        #[arg(long, value_name = "LABEL")]
        remove: Vec<String>,
    },

    /// Show budget details
    Show {
        /// Budget ID (defaults to the active budget)
        budget: Option<String>,
    },

    /// List budgets, most recently updated first
    List {
        /// Number of budgets to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Create or update a budget from a JSON document
    Load {
        /// Path to the JSON file
        file: PathBuf,
    },

    /// Classify unclassified history against every category of a budget
    Reconcile {
        /// Budget ID (defaults to the active budget)
        budget: Option<String>,
    },
}

/// Income and expense lines given on the command line
#[derive(Args, Debug, Default)]
pub struct BudgetLines {
    /// Income source, as SOURCE=DOLLARS (repeatable)
    #[arg(long, value_name = "SOURCE=DOLLARS")]
    pub income: Vec<String>,

    /// Fixed expense, as LABEL=DOLLARS (repeatable)
    #[arg(long, value_name = "LABEL=DOLLARS")]
    pub fixed: Vec<String>,

    /// Expense as a share of income, as LABEL=PERCENT (repeatable)
    #[arg(long, value_name = "LABEL=PERCENT")]
    pub percent: Vec<String>,

    /// Catch-all expense category
    #[arg(long, value_name = "LABEL")]
    pub slack: Option<String>,
}

impl BudgetLines {
    /// Merge these lines into `input`, replacing entries with the same label
    fn apply(&self, input: &mut BudgetInput) -> YabaResult<()> {
        for pair in &self.income {
            let (source, amount) = parse_pair(pair)?;
            let key = normalize_label(&source);
            input.incomes.retain(|i| normalize_label(&i.source) != key);
            input.incomes.push(IncomeInput { source, amount });
        }
        for pair in &self.fixed {
            let (category, amount) = parse_pair(pair)?;
            upsert_expense(input, category, amount, true, false);
        }
        for pair in &self.percent {
            let (category, amount) = parse_pair(pair)?;
            upsert_expense(input, category, amount, false, false);
        }
        if let Some(category) = &self.slack {
            for expense in &mut input.expenses {
                expense.is_slack = false;
            }
            upsert_expense(input, category.trim().to_string(), 0.0, false, true);
        }
        Ok(())
    }
}

/// Handle a budget command
pub fn handle_budget_command(
    storage: &Storage,
    owner: OwnerId,
    cmd: BudgetCommands,
) -> YabaResult<()> {
    let service = BudgetService::new(storage);

    match cmd {
        BudgetCommands::Create { name, lines } => {
            let mut input = BudgetInput {
                name,
                ..Default::default()
            };
            lines.apply(&mut input)?;

            let budget = service.create(owner, &input)?;
            println!("Created budget: {}", budget.name);
            println!("  ID: {}", budget.id.as_uuid());
            println!("  Categories: {}", budget.expenses.len());
        }

        BudgetCommands::Update {
            budget,
            name,
            lines,
            remove,
        } => {
            let found = resolve_budget(&service, owner, Some(&budget))?;

            let mut input = BudgetInput::from(&found);
            if let Some(name) = name {
                input.name = name;
            }
            for label in &remove {
                let key = normalize_label(label);
                let before = input.expenses.len() + input.incomes.len();
                input.expenses.retain(|e| normalize_label(&e.category) != key);
                input.incomes.retain(|i| normalize_label(&i.source) != key);
                if before == input.expenses.len() + input.incomes.len() {
                    return Err(YabaError::NotFound {
                        entity_type: "Budget line",
                        identifier: label.clone(),
                    });
                }
            }
            lines.apply(&mut input)?;

            let updated = service.update(owner, found.id, &input)?;
            println!("Updated budget: {}", updated.name);
        }

        BudgetCommands::Show { budget } => {
            let found = resolve_budget(&service, owner, budget.as_deref())?;
            print!("{}", format_budget_details(&found));
        }

        BudgetCommands::List { limit } => {
            let budgets = service.list(owner, limit)?;
            print!("{}", format_budget_list(&budgets));
            if !budgets.is_empty() {
                println!();
            }
        }

        BudgetCommands::Load { file } => {
            let reader = File::open(&file).map_err(|e| {
                YabaError::Io(format!("Failed to open {}: {}", file.display(), e))
            })?;
            let budget = service.load_json(owner, BufReader::new(reader))?;
            println!("Loaded budget: {}", budget.name);
            println!("  ID: {}", budget.id.as_uuid());
        }

        BudgetCommands::Reconcile { budget } => {
            let found = resolve_budget(&service, owner, budget.as_deref())?;
            let changed = service.reconcile(owner, found.id)?;
            println!(
                "Classified {} expenditure(s) against '{}'",
                changed, found.name
            );
        }
    }

    Ok(())
}

/// Find a budget by ID, or the active budget when no ID is given
fn resolve_budget(
    service: &BudgetService<'_>,
    owner: OwnerId,
    id: Option<&str>,
) -> YabaResult<Budget> {
    match id {
        Some(raw) => {
            let id: BudgetId = raw
                .parse()
                .map_err(|_| YabaError::Validation(format!("Invalid budget ID: '{}'", raw)))?;
            service
                .get(owner, id)?
                .ok_or_else(|| YabaError::budget_not_found(raw))
        }
        None => service
            .active(owner)?
            .ok_or_else(|| YabaError::budget_not_found("active budget")),
    }
}

fn upsert_expense(input: &mut BudgetInput, category: String, amount: f64, is_fixed: bool, is_slack: bool) {
    let key = normalize_label(&category);
    match input
        .expenses
        .iter_mut()
        .find(|e| normalize_label(&e.category) == key)
    {
        Some(existing) => {
            existing.amount = amount;
            existing.is_fixed = is_fixed;
            existing.is_slack = is_slack;
        }
        None => input.expenses.push(ExpenseInput {
            id: None,
            category,
            amount,
            is_fixed,
            is_slack,
        }),
    }
}

/// Split `LABEL=NUMBER`
fn parse_pair(pair: &str) -> YabaResult<(String, f64)> {
    let invalid = || YabaError::Validation(format!("Expected LABEL=AMOUNT, got '{}'", pair));

    let (label, amount) = pair.rsplit_once('=').ok_or_else(invalid)?;
    let label = label.trim();
    if label.is_empty() {
        return Err(invalid());
    }
    let amount: f64 = amount.trim().parse().map_err(|_| invalid())?;
    if !amount.is_finite() {
        return Err(invalid());
    }
    Ok((label.to_string(), amount))
}
