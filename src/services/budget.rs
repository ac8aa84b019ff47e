//! Budget service
//!
//! Creates, updates and loads budgets. Every save is followed by a
//! reconciliation pass for the categories the save introduced, so spending
//! recorded before a category existed gets classified once it does.

use std::collections::HashSet;
use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::error::{YabaError, YabaResult};
use crate::models::{
    normalize_label, Budget, BudgetId, BudgetValidationError, ExpenseCategoryId, Money, OwnerId,
};
use crate::storage::PersistenceGateway;

use super::classification::ClassificationService;

/// Budget document as exchanged with the outside world
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<BudgetId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<OwnerId>,
    pub name: String,
    #[serde(default)]
    pub incomes: Vec<IncomeInput>,
    #[serde(default)]
    pub expenses: Vec<ExpenseInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeInput {
    pub source: String,
    /// Dollars
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ExpenseCategoryId>,
    pub category: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub is_fixed: bool,
    #[serde(default)]
    pub is_slack: bool,
}

impl From<&Budget> for BudgetInput {
    fn from(budget: &Budget) -> Self {
        Self {
            id: Some(budget.id),
            owner: Some(budget.owner),
            name: budget.name.clone(),
            incomes: budget
                .incomes
                .iter()
                .map(|i| IncomeInput {
                    source: i.source.clone(),
                    amount: i.amount.cents() as f64 / 100.0,
                })
                .collect(),
            expenses: budget
                .expenses
                .iter()
                .map(|e| ExpenseInput {
                    id: Some(e.id),
                    category: e.category.clone(),
                    amount: e.amount,
                    is_fixed: e.is_fixed,
                    is_slack: e.is_slack,
                })
                .collect(),
        }
    }
}

/// Service for budget management
pub struct BudgetService<'a> {
    gateway: &'a dyn PersistenceGateway,
}

impl<'a> BudgetService<'a> {
    /// Create a new budget service
    pub fn new(gateway: &'a dyn PersistenceGateway) -> Self {
        Self { gateway }
    }

    /// Create a budget for `owner`
    pub fn create(&self, owner: OwnerId, input: &BudgetInput) -> YabaResult<Budget> {
        check_owner(owner, input.owner)?;

        let mut budget = Budget::new(owner, input.name.trim());
        if let Some(id) = input.id {
            if self.gateway.get_budget(owner, id)?.is_some() {
                return Err(YabaError::Validation(format!("Budget {} already exists", id)));
            }
            budget.id = id;
        }
        apply_input(&mut budget, input)?;

        self.save(budget, None)
    }

    /// Replace the contents of an existing budget
    ///
    /// Categories whose label survives keep their identifier.
    pub fn update(&self, owner: OwnerId, id: BudgetId, input: &BudgetInput) -> YabaResult<Budget> {
        check_owner(owner, input.owner)?;
        if input.id.is_some_and(|given| given != id) {
            return Err(YabaError::Validation(
                "Budget id in the document does not match".into(),
            ));
        }

        let previous = self
            .gateway
            .get_budget(owner, id)?
            .ok_or_else(|| YabaError::budget_not_found(id.to_string()))?;

        let mut budget = previous.clone();
        budget.name = input.name.trim().to_string();
        apply_input(&mut budget, input)?;

        self.save(budget, Some(&previous))
    }

    /// Decode a JSON budget document and create or update it
    ///
    /// A document without an owner belongs to `owner`; a document naming a
    /// different owner is rejected.
    pub fn load_json<R: Read>(&self, owner: OwnerId, reader: R) -> YabaResult<Budget> {
        let input: BudgetInput = serde_json::from_reader(reader)
            .map_err(|e| YabaError::Validation(format!("Failed to decode budget: {}", e)))?;

        match input.id {
            Some(id) if self.gateway.get_budget(owner, id)?.is_some() => {
                self.update(owner, id, &input)
            }
            _ => self.create(owner, &input),
        }
    }

    /// Get a budget by ID
    pub fn get(&self, owner: OwnerId, id: BudgetId) -> YabaResult<Option<Budget>> {
        self.gateway.get_budget(owner, id)
    }

    /// The budget expenditures are classified against
    pub fn active(&self, owner: OwnerId) -> YabaResult<Option<Budget>> {
        ClassificationService::new(self.gateway).active_budget(owner)
    }

    /// List budgets, most recently updated first
    pub fn list(&self, owner: OwnerId, limit: Option<usize>) -> YabaResult<Vec<Budget>> {
        let mut budgets = self.gateway.budgets_for_owner(owner)?;
        if let Some(limit) = limit {
            budgets.truncate(limit);
        }
        Ok(budgets)
    }

    /// Classify history against every category of a budget
    pub fn reconcile(&self, owner: OwnerId, id: BudgetId) -> YabaResult<usize> {
        let budget = self
            .get(owner, id)?
            .ok_or_else(|| YabaError::budget_not_found(id.to_string()))?;
        ClassificationService::new(self.gateway).reconcile_budget(&budget)
    }

    fn save(&self, mut budget: Budget, previous: Option<&Budget>) -> YabaResult<Budget> {
        budget
            .validate()
            .map_err(|e| YabaError::Validation(e.to_string()))?;
        budget.updated_at = chrono::Utc::now();

        self.gateway.save_budget(budget.clone())?;
        let changed =
            ClassificationService::new(self.gateway).reconcile_new_categories(&budget, previous)?;

        tracing::info!(
            budget = %budget.id,
            categories = budget.expenses.len(),
            reclassified = changed,
            "saved budget"
        );
        Ok(budget)
    }
}

fn check_owner(owner: OwnerId, claimed: Option<OwnerId>) -> YabaResult<()> {
    match claimed {
        Some(claimed) if claimed != owner && !claimed.as_uuid().is_nil() => Err(
            YabaError::Validation(format!("{} is not the owner of this budget", owner)),
        ),
        _ => Ok(()),
    }
}

/// Replace incomes and expenses with those of `input`
fn apply_input(budget: &mut Budget, input: &BudgetInput) -> YabaResult<()> {
    let mut sources = HashSet::new();
    for income in &input.incomes {
        if !sources.insert(normalize_label(&income.source)) {
            return Err(YabaError::Validation(
                BudgetValidationError::DuplicateIncome(income.source.clone()).to_string(),
            ));
        }
    }
    let mut labels = HashSet::new();
    for expense in &input.expenses {
        if !labels.insert(normalize_label(&expense.category)) {
            return Err(YabaError::Validation(
                BudgetValidationError::DuplicateCategory(expense.category.clone()).to_string(),
            ));
        }
    }

    let previous = std::mem::take(&mut budget.expenses);
    budget.incomes.clear();

    for income in &input.incomes {
        budget.set_income(income.source.trim(), dollars(income.amount));
    }
    for expense in &input.expenses {
        let id = budget.set_expense(
            &expense.category,
            expense.amount,
            expense.is_fixed,
            expense.is_slack,
        );
        let key = normalize_label(&expense.category);
        // A caller-supplied id is only honoured if this budget already owns it
        let keep = previous
            .iter()
            .find(|e| e.key() == key)
            .map(|e| e.id)
            .or(expense.id.filter(|id| previous.iter().any(|e| e.id == *id)));
        if let (Some(keep), Some(entry)) = (keep, budget.expenses.iter_mut().find(|e| e.id == id)) {
            entry.id = keep;
        }
    }

    Ok(())
}

fn dollars(amount: f64) -> Money {
    Money::from_cents((amount * 100.0).round() as i64)
}
