//! Budget model
//!
//! A budget holds the owner's income sources and expense categories. Expense
//! categories carry the identifiers expenditures are classified against.
//! Both lists are plain vectors; labels are matched case-insensitively and
//! lookups go through a derived index rather than the storage order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::ids::{BudgetId, ExpenseCategoryId, OwnerId};
use super::money::Money;

/// An income source feeding the budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Income {
    /// Source label (e.g. "salary")
    pub source: String,

    /// Amount per budget period
    pub amount: Money,
}

/// A category expenditures can be classified under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseCategory {
    /// Unique identifier, stable across budget updates
    pub id: ExpenseCategoryId,

    /// Category label, unique within the budget ignoring case
    pub category: String,

    /// Dollars for fixed expenses, percent of income otherwise
    #[serde(default)]
    pub amount: f64,

    /// Whether the amount is a fixed sum rather than a share of income
    #[serde(default)]
    pub is_fixed: bool,

    /// Whether this is the catch-all category that absorbs what is left
    #[serde(default)]
    pub is_slack: bool,
}

impl ExpenseCategory {
    /// Create a new expense category with a fresh identifier
    pub fn new(category: impl Into<String>, amount: f64, is_fixed: bool, is_slack: bool) -> Self {
        Self {
            id: ExpenseCategoryId::new(),
            category: category.into(),
            amount,
            is_fixed,
            is_slack,
        }
    }

    /// Normalized label used for matching
    pub fn key(&self) -> String {
        normalize_label(&self.category)
    }
}

/// A user's budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    /// Unique identifier
    pub id: BudgetId,

    /// The user this budget belongs to
    pub owner: OwnerId,

    /// Budget name
    pub name: String,

    /// Income sources
    #[serde(default)]
    pub incomes: Vec<Income>,

    /// Expense categories
    #[serde(default)]
    pub expenses: Vec<ExpenseCategory>,

    /// When the budget was created
    pub created_at: DateTime<Utc>,

    /// When the budget was last modified
    pub updated_at: DateTime<Utc>,
}

impl Budget {
    /// Create a new, empty budget
    pub fn new(owner: OwnerId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: BudgetId::new(),
            owner,
            name: name.into(),
            incomes: Vec::new(),
            expenses: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Add or replace an income source (matched ignoring case)
    pub fn set_income(&mut self, source: impl Into<String>, amount: Money) {
        let source = source.into();
        let key = normalize_label(&source);
        match self
            .incomes
            .iter_mut()
            .find(|i| normalize_label(&i.source) == key)
        {
            Some(existing) => existing.amount = amount,
            None => self.incomes.push(Income { source, amount }),
        }
        self.updated_at = Utc::now();
    }

    /// Remove an income source; returns whether anything was removed
    pub fn remove_income(&mut self, source: &str) -> bool {
        let key = normalize_label(source);
        let before = self.incomes.len();
        self.incomes.retain(|i| normalize_label(&i.source) != key);
        self.touch_if(before != self.incomes.len())
    }

    /// Set a fixed-amount expense category
    pub fn set_fixed_expense(&mut self, category: &str, amount: f64) -> ExpenseCategoryId {
        self.set_expense(category, amount, true, false)
    }

    /// Set an expense category budgeted as a share of income
    pub fn set_percentage_expense(&mut self, category: &str, amount: f64) -> ExpenseCategoryId {
        self.set_expense(category, amount, false, false)
    }

    /// Set the catch-all category
    pub fn set_slack_expense(&mut self, category: &str) -> ExpenseCategoryId {
        self.set_expense(category, 0.0, false, true)
    }

    /// Add or update an expense category
    ///
    /// An existing category with the same label (ignoring case) keeps its
    /// identifier so expenditures already classified under it stay linked.
    pub fn set_expense(
        &mut self,
        category: &str,
        amount: f64,
        is_fixed: bool,
        is_slack: bool,
    ) -> ExpenseCategoryId {
        let key = normalize_label(category);
        let id = match self.expenses.iter_mut().find(|e| e.key() == key) {
            Some(existing) => {
                existing.amount = amount;
                existing.is_fixed = is_fixed;
                existing.is_slack = is_slack;
                existing.id
            }
            None => {
                let expense = ExpenseCategory::new(category.trim(), amount, is_fixed, is_slack);
                let id = expense.id;
                self.expenses.push(expense);
                id
            }
        };
        self.updated_at = Utc::now();
        id
    }

    /// Remove an expense category; returns whether anything was removed
    pub fn remove_expense(&mut self, category: &str) -> bool {
        let key = normalize_label(category);
        let before = self.expenses.len();
        self.expenses.retain(|e| e.key() != key);
        self.touch_if(before != self.expenses.len())
    }

    /// Find an expense category by label (ignoring case)
    pub fn find_expense(&self, category: &str) -> Option<&ExpenseCategory> {
        let key = normalize_label(category);
        self.expenses.iter().find(|e| e.key() == key)
    }

    /// Sum of all income sources
    pub fn total_income(&self) -> Money {
        self.incomes.iter().map(|i| i.amount).sum()
    }

    /// Validate the budget
    pub fn validate(&self) -> Result<(), BudgetValidationError> {
        if self.name.trim().is_empty() {
            return Err(BudgetValidationError::EmptyName);
        }

        let mut seen = HashSet::new();
        let mut ids = HashSet::new();
        for expense in &self.expenses {
            if !ids.insert(expense.id) {
                return Err(BudgetValidationError::DuplicateCategoryId(expense.id));
            }
            let key = expense.key();
            if key.is_empty() {
                return Err(BudgetValidationError::EmptyCategory);
            }
            if !seen.insert(key) {
                return Err(BudgetValidationError::DuplicateCategory(
                    expense.category.clone(),
                ));
            }
        }

        let mut sources = HashSet::new();
        for income in &self.incomes {
            if !sources.insert(normalize_label(&income.source)) {
                return Err(BudgetValidationError::DuplicateIncome(income.source.clone()));
            }
        }

        Ok(())
    }

    fn touch_if(&mut self, changed: bool) -> bool {
        if changed {
            self.updated_at = Utc::now();
        }
        changed
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Lower-cased, trimmed form of a category or income label
pub fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Validation errors for budgets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BudgetValidationError {
    EmptyName,
    EmptyCategory,
    DuplicateCategory(String),
    DuplicateIncome(String),
    DuplicateCategoryId(ExpenseCategoryId),
}

impl fmt::Display for BudgetValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Budget name cannot be empty"),
            Self::EmptyCategory => write!(f, "Expense category label cannot be empty"),
            Self::DuplicateCategory(label) => {
                write!(f, "Expense category '{}' appears more than once", label)
            }
            Self::DuplicateIncome(source) => {
                write!(f, "Income source '{}' appears more than once", source)
            }
            Self::DuplicateCategoryId(id) => {
                write!(f, "Expense category id {} is used more than once", id.as_uuid())
            }
        }
    }
}

impl std::error::Error for BudgetValidationError {}
