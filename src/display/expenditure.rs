//! Expenditure display formatting
//!
//! Renders expenditure listings as a table.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::Expenditure;

#[derive(Tabled)]
struct ExpenditureRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Reward")]
    reward: String,
    #[tabled(rename = "Classified")]
    classified: String,
    #[tabled(rename = "Source")]
    source: String,
}

impl From<&Expenditure> for ExpenditureRow {
    fn from(e: &Expenditure) -> Self {
        Self {
            date: e.date.format("%Y-%m-%d").to_string(),
            name: truncate(&e.name, 30),
            amount: e.amount.to_string(),
            category: e.budget_category.clone(),
            reward: e.reward_category.clone().unwrap_or_default(),
            classified: e.expense_id.map(|id| id.to_string()).unwrap_or_default(),
            source: e.source.clone(),
        }
    }
}

/// Format expenditures as a table, in the order given
pub fn format_expenditure_table(expenditures: &[Expenditure]) -> String {
    if expenditures.is_empty() {
        return "No expenditures found.".to_string();
    }

    let rows: Vec<ExpenditureRow> = expenditures.iter().map(ExpenditureRow::from).collect();
    let mut table = Table::new(rows);
    table.with(Style::psql());
    table.to_string()
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
