//! Expenditure model
//!
//! One recorded transaction belonging to an owner. Expenditures are created
//! at import time and may later be classified against a budget expense
//! category by the reconciler.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{ExpenditureId, ExpenseCategoryId, OwnerId};
use super::money::Money;

/// A single spending record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expenditure {
    /// Unique identifier
    pub id: ExpenditureId,

    /// The user this expenditure belongs to
    pub owner: OwnerId,

    /// Display name (merchant, description)
    #[serde(default)]
    pub name: String,

    /// Amount; the sign is kept as recorded
    pub amount: Money,

    /// Transaction date
    pub date: NaiveDate,

    /// Payment method label, if the source recorded one
    #[serde(default)]
    pub method: Option<String>,

    /// Free-text budget category recorded with the transaction
    #[serde(default)]
    pub budget_category: String,

    /// Reward category (upper-cased), if any
    #[serde(default)]
    pub reward_category: Option<String>,

    /// Memo/notes
    #[serde(default)]
    pub comment: String,

    /// Import batch that produced this record (usually a file name)
    #[serde(default)]
    pub source: String,

    /// When the expenditure was stored
    pub created_at: DateTime<Utc>,

    /// Budget expense category this expenditure is classified under
    #[serde(default)]
    pub expense_id: Option<ExpenseCategoryId>,
}

impl Expenditure {
    /// Create a new unclassified expenditure
    pub fn new(owner: OwnerId, date: NaiveDate, amount: Money) -> Self {
        Self {
            id: ExpenditureId::new(),
            owner,
            name: String::new(),
            amount,
            date,
            method: None,
            budget_category: String::new(),
            reward_category: None,
            comment: String::new(),
            source: String::new(),
            created_at: Utc::now(),
            expense_id: None,
        }
    }

    /// Create an expenditure with the common descriptive fields
    pub fn with_details(
        owner: OwnerId,
        date: NaiveDate,
        amount: Money,
        name: impl Into<String>,
        budget_category: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        let mut expenditure = Self::new(owner, date, amount);
        expenditure.name = name.into();
        expenditure.budget_category = budget_category.into();
        expenditure.source = source.into();
        expenditure
    }

    /// Check if this expenditure has been linked to a budget category
    pub fn is_classified(&self) -> bool {
        self.expense_id.is_some()
    }

    /// Link this expenditure to a budget category
    ///
    /// Classification is sticky: returns false and leaves the record alone
    /// if it is already classified.
    pub fn classify(&mut self, expense_id: ExpenseCategoryId) -> bool {
        if self.is_classified() {
            return false;
        }
        self.expense_id = Some(expense_id);
        true
    }

    /// Case-insensitive comparison against this expenditure's category label
    pub fn has_category(&self, label: &str) -> bool {
        self.budget_category.trim().to_lowercase() == label.trim().to_lowercase()
    }
}

impl fmt::Display for Expenditure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.date.format("%Y-%m-%d"),
            self.name,
            self.amount
        )
    }
}
