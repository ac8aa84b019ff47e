//! Classification reconciler
//!
//! Keeps the link between the free-text category recorded on an expenditure
//! and the identifier of the matching budget expense category. New rows are
//! classified before they are stored; when a budget gains a category, older
//! unclassified rows with that label are classified in one bulk update.
//! A classification that is already set is never replaced.

use std::collections::{BTreeMap, HashSet};

use crate::error::{YabaError, YabaResult};
use crate::models::{normalize_label, Budget, Expenditure, ExpenseCategoryId, OwnerId};
use crate::storage::{CategoryAssignment, PersistenceGateway};

/// Case-insensitive lookup from category label to expense category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryIndex {
    by_label: BTreeMap<String, ExpenseCategoryId>,
}

impl CategoryIndex {
    /// Build the index for a budget
    ///
    /// Two categories with the same label would make classification
    /// ambiguous, so that is reported as a precondition violation.
    pub fn from_budget(budget: &Budget) -> YabaResult<Self> {
        let mut by_label = BTreeMap::new();
        for expense in &budget.expenses {
            let key = expense.key();
            if key.is_empty() {
                continue;
            }
            if by_label.insert(key, expense.id).is_some() {
                return Err(YabaError::Precondition(format!(
                    "budget '{}' has more than one category labelled '{}'",
                    budget.name,
                    expense.key()
                )));
            }
        }
        Ok(Self { by_label })
    }

    /// Identifier for `label`, if the budget has such a category
    pub fn lookup(&self, label: &str) -> Option<ExpenseCategoryId> {
        self.by_label.get(&normalize_label(label)).copied()
    }

    /// Attach identifiers to unclassified expenditures with a known label
    ///
    /// Returns how many expenditures were classified.
    pub fn classify(&self, expenditures: &mut [Expenditure]) -> usize {
        expenditures
            .iter_mut()
            .filter(|e| !e.is_classified())
            .filter_map(|e| self.lookup(&e.budget_category).map(|id| e.classify(id)))
            .filter(|&changed| changed)
            .count()
    }

    /// Bulk-update instructions for every category, ordered by label
    pub fn assignments(&self) -> Vec<CategoryAssignment> {
        self.by_label
            .iter()
            .map(|(label, id)| CategoryAssignment::new(label, *id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.by_label.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_label.is_empty()
    }
}

/// Service for classifying expenditures against budgets
pub struct ClassificationService<'a> {
    gateway: &'a dyn PersistenceGateway,
}

impl<'a> ClassificationService<'a> {
    /// Create a new classification service
    pub fn new(gateway: &'a dyn PersistenceGateway) -> Self {
        Self { gateway }
    }

    /// The budget used for classification: the owner's most recently updated one
    pub fn active_budget(&self, owner: OwnerId) -> YabaResult<Option<Budget>> {
        Ok(self.gateway.budgets_for_owner(owner)?.into_iter().next())
    }

    /// Category index of the active budget; empty when the owner has none
    pub fn category_index(&self, owner: OwnerId) -> YabaResult<CategoryIndex> {
        match self.active_budget(owner)? {
            Some(budget) => CategoryIndex::from_budget(&budget),
            None => Ok(CategoryIndex::default()),
        }
    }

    /// Classify new expenditures against the active budget and store them
    ///
    /// The batch is stored as one unit. Returns the number of rows stored.
    pub fn persist(&self, owner: OwnerId, mut expenditures: Vec<Expenditure>) -> YabaResult<usize> {
        if expenditures.is_empty() {
            return Ok(0);
        }
        if let Some(stranger) = expenditures.iter().find(|e| e.owner != owner) {
            return Err(YabaError::Precondition(format!(
                "expenditure {} does not belong to {}",
                stranger.id, owner
            )));
        }

        let index = self.category_index(owner)?;
        let classified = index.classify(&mut expenditures);
        let pending: HashSet<String> = expenditures
            .iter()
            .filter(|e| !e.is_classified())
            .map(|e| normalize_label(&e.budget_category))
            .filter(|label| !label.is_empty())
            .collect();
        let stored = self.gateway.insert_expenditures(expenditures)?;

        tracing::debug!(%owner, stored, classified, "stored expenditures");
        if !pending.is_empty() {
            self.catch_up(owner, &pending);
        }
        Ok(stored)
    }

    /// Classify stored rows whose label gained a category after `persist`
    /// built its index
    ///
    /// A budget saved between the index read and the insert reconciles
    /// before the rows exist, so the labels still unmatched are tried once
    /// more against the current budget. The rows are already stored, so a
    /// failure here is logged rather than returned.
    fn catch_up(&self, owner: OwnerId, pending: &HashSet<String>) {
        let outcome = self.category_index(owner).and_then(|index| {
            let assignments: Vec<_> = index
                .assignments()
                .into_iter()
                .filter(|a| pending.contains(&a.label))
                .collect();
            if assignments.is_empty() {
                return Ok(0);
            }
            self.gateway.classify_unclassified(owner, &assignments)
        });

        match outcome {
            Ok(0) => {}
            Ok(changed) => tracing::info!(%owner, changed, "classified rows against a newer budget"),
            Err(e) => tracing::warn!(%owner, error = %e, "late classification failed"),
        }
    }

    /// Classify historical rows for categories `budget` has and `previous` lacked
    ///
    /// A renamed category counts as new. Returns the number of rows changed.
    pub fn reconcile_new_categories(
        &self,
        budget: &Budget,
        previous: Option<&Budget>,
    ) -> YabaResult<usize> {
        let index = CategoryIndex::from_budget(budget)?;
        let known: HashSet<String> = previous
            .map(|p| p.expenses.iter().map(|e| e.key()).collect())
            .unwrap_or_default();

        let assignments: Vec<_> = index
            .assignments()
            .into_iter()
            .filter(|a| !known.contains(&a.label))
            .collect();

        self.apply(budget, &assignments)
    }

    /// Classify historical rows for every category of `budget`
    ///
    /// Running this again without new rows or categories changes nothing.
    pub fn reconcile_budget(&self, budget: &Budget) -> YabaResult<usize> {
        let index = CategoryIndex::from_budget(budget)?;
        self.apply(budget, &index.assignments())
    }

    fn apply(&self, budget: &Budget, assignments: &[CategoryAssignment]) -> YabaResult<usize> {
        if assignments.is_empty() {
            return Ok(0);
        }

        let changed = self
            .gateway
            .classify_unclassified(budget.owner, assignments)?;

        tracing::info!(
            budget = %budget.id,
            categories = assignments.len(),
            changed,
            "reconciled expenditures"
        );
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::YabaPaths;
    use crate::models::Money;
    use crate::storage::{ExpenditureQuery, Storage};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = YabaPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();
        (temp_dir, storage)
    }

    fn expenditure(owner: OwnerId, day: u32, category: &str) -> Expenditure {
        Expenditure::with_details(
            owner,
            NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            Money::from_cents(1000),
            format!("row {}", day),
            category,
            "march.csv",
        )
    }

    fn classified_count(storage: &Storage, owner: OwnerId) -> usize {
        storage
            .query_expenditures(&ExpenditureQuery::for_owner(owner))
            .unwrap()
            .iter()
            .filter(|e| e.is_classified())
            .count()
    }

    #[test]
    fn test_index_ignores_case() {
        let mut budget = Budget::new(OwnerId::new(), "2024");
        let rent = budget.set_fixed_expense("Rent", 1500.0);

        let index = CategoryIndex::from_budget(&budget).unwrap();
        assert_eq!(index.lookup("RENT"), Some(rent));
        assert_eq!(index.lookup(" rent "), Some(rent));
        assert_eq!(index.lookup("groceries"), None);
        assert_eq!(index.lookup(""), None);
    }

    #[test]
    fn test_duplicate_labels_are_a_precondition_violation() {
        let mut budget = Budget::new(OwnerId::new(), "2024");
        budget.set_fixed_expense("rent", 1500.0);
        budget
            .expenses
            .push(crate::models::ExpenseCategory::new("Rent", 10.0, true, false));

        let err = CategoryIndex::from_budget(&budget).unwrap_err();
        assert!(matches!(err, YabaError::Precondition(_)));
    }

    #[test]
    fn test_classify_new_rows() {
        let owner = OwnerId::new();
        let mut budget = Budget::new(owner, "2024");
        let groceries = budget.set_percentage_expense("groceries", 20.0);
        let index = CategoryIndex::from_budget(&budget).unwrap();

        let earlier = ExpenseCategoryId::new();
        let mut rows = vec![
            expenditure(owner, 1, "Groceries"),
            expenditure(owner, 2, ""),
            expenditure(owner, 3, "fun"),
            expenditure(owner, 4, "groceries"),
        ];
        rows[3].classify(earlier);

        assert_eq!(index.classify(&mut rows), 1);
        assert_eq!(rows[0].expense_id, Some(groceries));
        assert!(rows[1].expense_id.is_none());
        assert!(rows[2].expense_id.is_none());
        assert_eq!(rows[3].expense_id, Some(earlier));
    }

    #[test]
    fn test_persist_uses_active_budget() {
        let (_temp_dir, storage) = create_test_storage();
        let owner = OwnerId::new();
        let mut budget = Budget::new(owner, "2024");
        let rent = budget.set_fixed_expense("rent", 1500.0);
        storage.save_budget(budget).unwrap();

        let service = ClassificationService::new(&storage);
        let stored = service
            .persist(owner, vec![expenditure(owner, 1, "rent"), expenditure(owner, 2, "other")])
            .unwrap();
        assert_eq!(stored, 2);

        let rows = storage
            .query_expenditures(&ExpenditureQuery::for_owner(owner).category("rent"))
            .unwrap();
        assert_eq!(rows[0].expense_id, Some(rent));
        assert_eq!(classified_count(&storage, owner), 1);
    }

    /// Saves `budget` right before the insert lands, as a concurrent budget
    /// save would
    struct BudgetSavedDuringInsert<'a> {
        storage: &'a Storage,
        budget: std::sync::Mutex<Option<Budget>>,
    }

    impl PersistenceGateway for BudgetSavedDuringInsert<'_> {
        fn insert_expenditures(&self, expenditures: Vec<Expenditure>) -> YabaResult<usize> {
            if let Some(budget) = self.budget.lock().unwrap().take() {
                self.storage.save_budget(budget)?;
            }
            self.storage.insert_expenditures(expenditures)
        }
        fn query_expenditures(&self, query: &ExpenditureQuery) -> YabaResult<Vec<Expenditure>> {
            self.storage.query_expenditures(query)
        }
        fn classify_unclassified(
            &self,
            owner: OwnerId,
            assignments: &[CategoryAssignment],
        ) -> YabaResult<usize> {
            self.storage.classify_unclassified(owner, assignments)
        }
        fn budgets_for_owner(&self, owner: OwnerId) -> YabaResult<Vec<Budget>> {
            self.storage.budgets_for_owner(owner)
        }
        fn get_budget(&self, owner: OwnerId, id: crate::models::BudgetId) -> YabaResult<Option<Budget>> {
            self.storage.get_budget(owner, id)
        }
        fn save_budget(&self, budget: Budget) -> YabaResult<()> {
            self.storage.save_budget(budget)
        }
    }

    #[test]
    fn test_persist_catches_budget_saved_during_insert() {
        let (_temp_dir, storage) = create_test_storage();
        let owner = OwnerId::new();
        let mut budget = Budget::new(owner, "2024");
        let rent = budget.set_fixed_expense("rent", 1500.0);

        let gateway = BudgetSavedDuringInsert {
            storage: &storage,
            budget: std::sync::Mutex::new(Some(budget)),
        };
        let stored = ClassificationService::new(&gateway)
            .persist(owner, vec![expenditure(owner, 1, "Rent"), expenditure(owner, 2, "fun")])
            .unwrap();
        assert_eq!(stored, 2);

        let rows = storage
            .query_expenditures(&ExpenditureQuery::for_owner(owner).category("rent"))
            .unwrap();
        assert_eq!(rows[0].expense_id, Some(rent));
        assert_eq!(classified_count(&storage, owner), 1);
    }

    #[test]
    fn test_persist_without_budget_stores_unclassified() {
        let (_temp_dir, storage) = create_test_storage();
        let owner = OwnerId::new();

        let service = ClassificationService::new(&storage);
        service.persist(owner, vec![expenditure(owner, 1, "rent")]).unwrap();
        assert_eq!(classified_count(&storage, owner), 0);
    }

    #[test]
    fn test_persist_rejects_foreign_rows() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ClassificationService::new(&storage);
        let result = service.persist(OwnerId::new(), vec![expenditure(OwnerId::new(), 1, "")]);
        assert!(matches!(result, Err(YabaError::Precondition(_))));
    }

    #[test]
    fn test_new_category_classifies_history() {
        let (_temp_dir, storage) = create_test_storage();
        let owner = OwnerId::new();
        storage
            .insert_expenditures(vec![
                expenditure(owner, 1, "groceries"),
                expenditure(owner, 2, "groceries"),
                expenditure(owner, 3, "rent"),
            ])
            .unwrap();

        let mut budget = Budget::new(owner, "2024");
        let groceries = budget.set_percentage_expense("groceries", 20.0);
        storage.save_budget(budget.clone()).unwrap();

        let service = ClassificationService::new(&storage);
        let changed = service.reconcile_new_categories(&budget, None).unwrap();
        assert_eq!(changed, 2);

        let rows = storage
            .query_expenditures(&ExpenditureQuery::for_owner(owner))
            .unwrap();
        let linked = rows.iter().filter(|e| e.expense_id == Some(groceries)).count();
        let untouched = rows.iter().filter(|e| e.expense_id.is_none()).count();
        assert_eq!(linked, 2);
        assert_eq!(untouched, 1);
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let (_temp_dir, storage) = create_test_storage();
        let owner = OwnerId::new();
        storage
            .insert_expenditures(vec![expenditure(owner, 1, "rent"), expenditure(owner, 2, "fun")])
            .unwrap();

        let mut budget = Budget::new(owner, "2024");
        budget.set_fixed_expense("rent", 1500.0);
        budget.set_slack_expense("fun");

        let service = ClassificationService::new(&storage);
        assert_eq!(service.reconcile_budget(&budget).unwrap(), 2);
        assert_eq!(service.reconcile_budget(&budget).unwrap(), 0);
    }

    #[test]
    fn test_reconcile_never_reassigns() {
        let (_temp_dir, storage) = create_test_storage();
        let owner = OwnerId::new();
        let earlier = ExpenseCategoryId::new();
        let mut row = expenditure(owner, 1, "rent");
        row.classify(earlier);
        storage.insert_expenditures(vec![row]).unwrap();

        let mut budget = Budget::new(owner, "2024");
        budget.set_fixed_expense("rent", 1500.0);

        let service = ClassificationService::new(&storage);
        assert_eq!(service.reconcile_budget(&budget).unwrap(), 0);

        let rows = storage
            .query_expenditures(&ExpenditureQuery::for_owner(owner))
            .unwrap();
        assert_eq!(rows[0].expense_id, Some(earlier));
    }

    #[test]
    fn test_only_new_labels_are_reconciled() {
        let (_temp_dir, storage) = create_test_storage();
        let owner = OwnerId::new();
        storage
            .insert_expenditures(vec![expenditure(owner, 1, "rent"), expenditure(owner, 2, "travel")])
            .unwrap();

        let mut previous = Budget::new(owner, "2024");
        previous.set_fixed_expense("rent", 1500.0);
        let mut current = previous.clone();
        let travel = current.set_percentage_expense("travel", 5.0);

        let service = ClassificationService::new(&storage);
        assert_eq!(
            service
                .reconcile_new_categories(&current, Some(&previous))
                .unwrap(),
            1
        );

        let rows = storage
            .query_expenditures(&ExpenditureQuery::for_owner(owner).category("travel"))
            .unwrap();
        assert_eq!(rows[0].expense_id, Some(travel));
        assert_eq!(classified_count(&storage, owner), 1);
    }
}
