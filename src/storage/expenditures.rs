//! Expenditure repository for JSON storage
//!
//! Manages loading and saving expenditures to expenditures.json. Bulk
//! operations write the file first and only then update memory, so a failed
//! write changes nothing.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::{YabaError, YabaResult};
use crate::models::{normalize_label, Expenditure, ExpenditureId, OwnerId};

use super::file_io::{read_json, write_json_atomic};
use super::gateway::{CategoryAssignment, ExpenditureQuery};

/// Serializable expenditure data structure
///
/// Generic so writes can serialize borrowed rows without cloning them.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct ExpenditureData<T> {
    expenditures: Vec<T>,
}

impl<T> Default for ExpenditureData<T> {
    fn default() -> Self {
        Self {
            expenditures: Vec::new(),
        }
    }
}

/// Repository for expenditure persistence
pub struct ExpenditureRepository {
    path: PathBuf,
    data: RwLock<HashMap<ExpenditureId, Expenditure>>,
}

impl ExpenditureRepository {
    /// Create a new expenditure repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load expenditures from disk
    pub fn load(&self) -> YabaResult<()> {
        let file_data: ExpenditureData<Expenditure> = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| YabaError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        for expenditure in file_data.expenditures {
            data.insert(expenditure.id, expenditure);
        }

        Ok(())
    }

    /// Number of stored expenditures
    pub fn count(&self) -> YabaResult<usize> {
        let data = self
            .data
            .read()
            .map_err(|e| YabaError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(data.len())
    }

    /// Insert a batch of new expenditures
    pub fn insert_all(&self, batch: Vec<Expenditure>) -> YabaResult<usize> {
        if batch.is_empty() {
            return Ok(0);
        }

        let mut data = self
            .data
            .write()
            .map_err(|e| YabaError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        if let Some(dup) = batch.iter().find(|e| data.contains_key(&e.id)) {
            return Err(YabaError::Storage(format!(
                "Expenditure {} is already stored",
                dup.id
            )));
        }

        let mut rows: Vec<&Expenditure> = data.values().chain(batch.iter()).collect();
        sort_newest_first(&mut rows);
        write_json_atomic(&self.path, &ExpenditureData { expenditures: rows })?;

        let inserted = batch.len();
        for expenditure in batch {
            data.insert(expenditure.id, expenditure);
        }
        Ok(inserted)
    }

    /// Expenditures matching `query`, newest first, paged
    pub fn query(&self, query: &ExpenditureQuery) -> YabaResult<Vec<Expenditure>> {
        let data = self
            .data
            .read()
            .map_err(|e| YabaError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut rows: Vec<&Expenditure> = data.values().filter(|e| query.matches(e)).collect();
        sort_newest_first(&mut rows);

        Ok(rows
            .into_iter()
            .skip(query.offset)
            .take(query.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    /// Bulk-classify unclassified rows of one owner by category label
    pub fn classify_unclassified(
        &self,
        owner: OwnerId,
        assignments: &[CategoryAssignment],
    ) -> YabaResult<usize> {
        let mut lookup = HashMap::new();
        for assignment in assignments {
            if lookup
                .insert(assignment.label.as_str(), assignment.expense_id)
                .is_some()
            {
                return Err(YabaError::Precondition(format!(
                    "category '{}' is assigned more than once",
                    assignment.label
                )));
            }
        }

        let mut data = self
            .data
            .write()
            .map_err(|e| YabaError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let updates: Vec<_> = data
            .values()
            .filter(|e| e.owner == owner && !e.is_classified())
            .filter_map(|e| {
                let label = normalize_label(&e.budget_category);
                if label.is_empty() {
                    return None;
                }
                lookup.get(label.as_str()).map(|id| (e.id, *id))
            })
            .collect();

        if updates.is_empty() {
            return Ok(0);
        }

        let mut next = data.clone();
        for (id, expense_id) in &updates {
            if let Some(expenditure) = next.get_mut(id) {
                expenditure.classify(*expense_id);
            }
        }

        let mut rows: Vec<&Expenditure> = next.values().collect();
        sort_newest_first(&mut rows);
        write_json_atomic(&self.path, &ExpenditureData { expenditures: rows })?;

        *data = next;
        Ok(updates.len())
    }
}

fn sort_newest_first(rows: &mut [&Expenditure]) {
    rows.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then(b.created_at.cmp(&a.created_at))
            .then(b.id.as_uuid().cmp(a.id.as_uuid()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExpenseCategoryId, Money};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, ExpenditureRepository) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("expenditures.json");
        let repo = ExpenditureRepository::new(path);
        (temp_dir, repo)
    }

    fn expenditure(owner: OwnerId, day: u32, category: &str) -> Expenditure {
        Expenditure::with_details(
            owner,
            NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            Money::from_cents(i64::from(day) * 100),
            format!("row {}", day),
            category,
            "march.csv",
        )
    }

    #[test]
    fn test_empty_load() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_insert_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        let owner = OwnerId::new();

        let inserted = repo
            .insert_all(vec![expenditure(owner, 1, "rent"), expenditure(owner, 2, "")])
            .unwrap();
        assert_eq!(inserted, 2);

        let repo2 = ExpenditureRepository::new(temp_dir.path().join("expenditures.json"));
        repo2.load().unwrap();
        assert_eq!(repo2.count().unwrap(), 2);
    }

    #[test]
    fn test_duplicate_insert_changes_nothing() {
        let (_temp_dir, repo) = create_test_repo();
        let owner = OwnerId::new();
        let row = expenditure(owner, 1, "rent");
        repo.insert_all(vec![row.clone()]).unwrap();

        let result = repo.insert_all(vec![expenditure(owner, 2, ""), row]);
        assert!(result.is_err());
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_query_orders_newest_first_and_pages() {
        let (_temp_dir, repo) = create_test_repo();
        let owner = OwnerId::new();
        repo.insert_all((1..=5).map(|d| expenditure(owner, d, "")).collect())
            .unwrap();

        let all = repo.query(&ExpenditureQuery::for_owner(owner)).unwrap();
        let days: Vec<u32> = all.iter().map(|e| chrono::Datelike::day(&e.date)).collect();
        assert_eq!(days, vec![5, 4, 3, 2, 1]);

        let page = repo
            .query(&ExpenditureQuery::for_owner(owner).page(1, 2))
            .unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id, all[1].id);
        assert_eq!(page[1].id, all[2].id);
    }

    #[test]
    fn test_classify_only_touches_unclassified_rows_of_owner() {
        let (_temp_dir, repo) = create_test_repo();
        let owner = OwnerId::new();
        let other = OwnerId::new();
        let earlier = ExpenseCategoryId::new();
        let groceries = ExpenseCategoryId::new();

        let mut already = expenditure(owner, 1, "Groceries");
        already.classify(earlier);
        repo.insert_all(vec![
            already,
            expenditure(owner, 2, "groceries"),
            expenditure(owner, 3, "rent"),
            expenditure(other, 4, "groceries"),
        ])
        .unwrap();

        let changed = repo
            .classify_unclassified(owner, &[CategoryAssignment::new("GROCERIES", groceries)])
            .unwrap();
        assert_eq!(changed, 1);

        let rows = repo.query(&ExpenditureQuery::for_owner(owner)).unwrap();
        let ids: Vec<_> = rows.iter().map(|e| e.expense_id).collect();
        assert_eq!(ids, vec![None, Some(groceries), Some(earlier)]);

        let theirs = repo.query(&ExpenditureQuery::for_owner(other)).unwrap();
        assert!(theirs[0].expense_id.is_none());
    }

    #[test]
    fn test_classify_skips_blank_labels() {
        let (_temp_dir, repo) = create_test_repo();
        let owner = OwnerId::new();
        repo.insert_all(vec![expenditure(owner, 1, "  ")]).unwrap();

        let changed = repo
            .classify_unclassified(owner, &[CategoryAssignment::new("", ExpenseCategoryId::new())])
            .unwrap();
        assert_eq!(changed, 0);
    }

    #[test]
    fn test_duplicate_assignment_is_precondition_error() {
        let (_temp_dir, repo) = create_test_repo();
        let assignments = [
            CategoryAssignment::new("rent", ExpenseCategoryId::new()),
            CategoryAssignment::new("Rent", ExpenseCategoryId::new()),
        ];
        let err = repo
            .classify_unclassified(OwnerId::new(), &assignments)
            .unwrap_err();
        assert!(matches!(err, YabaError::Precondition(_)));
    }
}
