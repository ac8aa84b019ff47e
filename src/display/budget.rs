//! Budget display formatting
//!
//! Formats budgets for terminal output in list and detail views.

use crate::models::Budget;

/// Format a list of budgets as a table
pub fn format_budget_list(budgets: &[Budget]) -> String {
    if budgets.is_empty() {
        return "No budgets found.".to_string();
    }

    let name_width = budgets
        .iter()
        .map(|b| b.name.len())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<36}  {:<name_width$}  {:>10}  {:>12}  {}\n",
        "ID",
        "Name",
        "Categories",
        "Income",
        "Updated",
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:-<36}  {:-<name_width$}  {:->10}  {:->12}  {:-<16}\n",
        "",
        "",
        "",
        "",
        "",
        name_width = name_width,
    ));

    for budget in budgets {
        output.push_str(&format!(
            "{:<36}  {:<name_width$}  {:>10}  {:>12}  {}\n",
            budget.id.as_uuid().to_string(),
            budget.name,
            budget.expenses.len(),
            budget.total_income().to_string(),
            budget.updated_at.format("%Y-%m-%d %H:%M"),
            name_width = name_width,
        ));
    }

    output
}

/// Format a single budget's details
pub fn format_budget_details(budget: &Budget) -> String {
    let mut output = String::new();

    output.push_str(&format!("Budget: {}\n", budget.name));
    output.push_str(&format!("  ID:     {}\n", budget.id.as_uuid()));
    output.push_str(&format!("  Owner:  {}\n", budget.owner.as_uuid()));
    output.push('\n');

    output.push_str("Incomes:\n");
    if budget.incomes.is_empty() {
        output.push_str("  (none)\n");
    }
    for income in &budget.incomes {
        output.push_str(&format!("  {:<24} {:>12}\n", income.source, income.amount.to_string()));
    }
    output.push_str(&format!("  {:<24} {:>12}\n", "TOTAL", budget.total_income().to_string()));
    output.push('\n');

    output.push_str("Expenses:\n");
    if budget.expenses.is_empty() {
        output.push_str("  (none)\n");
    }
    for expense in &budget.expenses {
        let amount = if expense.is_slack {
            "remainder".to_string()
        } else if expense.is_fixed {
            format!("${:.2}", expense.amount)
        } else {
            format!("{}%", expense.amount)
        };
        output.push_str(&format!(
            "  {:<24} {:>12}  {}\n",
            expense.category,
            amount,
            expense.id.as_uuid()
        ));
    }

    output.push('\n');
    output.push_str(&format!(
        "  Created:  {}\n",
        budget.created_at.format("%Y-%m-%d %H:%M UTC")
    ));
    output.push_str(&format!(
        "  Modified: {}\n",
        budget.updated_at.format("%Y-%m-%d %H:%M UTC")
    ));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Money, OwnerId};

    fn sample() -> Budget {
        let mut budget = Budget::new(OwnerId::new(), "household");
        budget.set_income("salary", Money::from_cents(500000));
        budget.set_fixed_expense("rent", 1500.0);
        budget.set_percentage_expense("groceries", 12.5);
        budget.set_slack_expense("fun");
        budget
    }

    #[test]
    fn test_format_budget_list() {
        let output = format_budget_list(&[sample()]);
        assert!(output.contains("household"));
        assert!(output.contains("$5000.00"));
    }

    #[test]
    fn test_format_empty_list() {
        assert_eq!(format_budget_list(&[]), "No budgets found.");
    }

    #[test]
    fn test_format_budget_details() {
        let output = format_budget_details(&sample());
        assert!(output.contains("Budget: household"));
        assert!(output.contains("$1500.00"));
        assert!(output.contains("12.5%"));
        assert!(output.contains("remainder"));
    }
}
