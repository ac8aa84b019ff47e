//! Persistence gateway
//!
//! The narrow set of durable operations the import, classification and
//! reporting code needs. Everything is scoped by owner. Implementations must
//! make each call atomic: a failed call leaves stored data unchanged.

use chrono::NaiveDate;

use crate::error::YabaResult;
use crate::models::{normalize_label, Budget, BudgetId, Expenditure, ExpenseCategoryId, OwnerId};

/// Durable storage for expenditures and budgets
pub trait PersistenceGateway: Send + Sync {
    /// Insert a batch of expenditures; all of them or none
    fn insert_expenditures(&self, expenditures: Vec<Expenditure>) -> YabaResult<usize>;

    /// Expenditures matching `query`, newest first
    fn query_expenditures(&self, query: &ExpenditureQuery) -> YabaResult<Vec<Expenditure>>;

    /// Classify every unclassified expenditure of `owner` whose category label
    /// matches one of `assignments`, ignoring case
    ///
    /// Returns the number of rows changed. Rows that already carry a
    /// classification are never modified.
    fn classify_unclassified(
        &self,
        owner: OwnerId,
        assignments: &[CategoryAssignment],
    ) -> YabaResult<usize>;

    /// All budgets of `owner`, most recently updated first
    fn budgets_for_owner(&self, owner: OwnerId) -> YabaResult<Vec<Budget>>;

    /// One budget of `owner`
    fn get_budget(&self, owner: OwnerId, id: BudgetId) -> YabaResult<Option<Budget>>;

    /// Insert or replace a budget
    fn save_budget(&self, budget: Budget) -> YabaResult<()>;
}

/// Links a normalized category label to an expense category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryAssignment {
    pub label: String,
    pub expense_id: ExpenseCategoryId,
}

impl CategoryAssignment {
    pub fn new(label: &str, expense_id: ExpenseCategoryId) -> Self {
        Self {
            label: normalize_label(label),
            expense_id,
        }
    }
}

/// Filter and paging for expenditure queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenditureQuery {
    pub owner: OwnerId,
    /// First date included
    pub since: Option<NaiveDate>,
    /// Last date included
    pub until: Option<NaiveDate>,
    pub source: Option<String>,
    /// Budget category label, compared ignoring case; `""` selects blank labels
    pub category: Option<String>,
    pub unclassified_only: bool,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl ExpenditureQuery {
    /// Everything belonging to `owner`
    pub fn for_owner(owner: OwnerId) -> Self {
        Self {
            owner,
            since: None,
            until: None,
            source: None,
            category: None,
            unclassified_only: false,
            offset: 0,
            limit: None,
        }
    }

    pub fn since(mut self, date: NaiveDate) -> Self {
        self.since = Some(date);
        self
    }

    pub fn until(mut self, date: NaiveDate) -> Self {
        self.until = Some(date);
        self
    }

    /// Inclusive range; `None` leaves that side open
    pub fn between(mut self, since: Option<NaiveDate>, until: Option<NaiveDate>) -> Self {
        self.since = since;
        self.until = until;
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn category(mut self, label: &str) -> Self {
        self.category = Some(normalize_label(label));
        self
    }

    pub fn unclassified_only(mut self) -> Self {
        self.unclassified_only = true;
        self
    }

    pub fn page(mut self, offset: usize, limit: usize) -> Self {
        self.offset = offset;
        self.limit = Some(limit);
        self
    }

    /// Check the filter part of the query against one expenditure
    pub fn matches(&self, expenditure: &Expenditure) -> bool {
        expenditure.owner == self.owner
            && self.since.map_or(true, |d| expenditure.date >= d)
            && self.until.map_or(true, |d| expenditure.date <= d)
            && self
                .source
                .as_deref()
                .map_or(true, |s| expenditure.source == s)
            && self
                .category
                .as_deref()
                .map_or(true, |c| expenditure.has_category(c))
            && (!self.unclassified_only || !expenditure.is_classified())
    }
}
