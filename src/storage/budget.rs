//! Budget repository for JSON storage
//!
//! Manages loading and saving budgets to budgets.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::{YabaError, YabaResult};
use crate::models::{Budget, BudgetId, OwnerId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable budget data
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct BudgetData {
    #[serde(default)]
    budgets: Vec<Budget>,
}

/// Repository for budget persistence
pub struct BudgetRepository {
    path: PathBuf,
    budgets: RwLock<HashMap<BudgetId, Budget>>,
}

impl BudgetRepository {
    /// Create a new budget repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            budgets: RwLock::new(HashMap::new()),
        }
    }

    /// Load budgets from disk
    pub fn load(&self) -> YabaResult<()> {
        let file_data: BudgetData = read_json(&self.path)?;

        let mut budgets = self
            .budgets
            .write()
            .map_err(|e| YabaError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        budgets.clear();
        for budget in file_data.budgets {
            budgets.insert(budget.id, budget);
        }

        Ok(())
    }

    /// Get a budget by ID, only if it belongs to `owner`
    pub fn get(&self, owner: OwnerId, id: BudgetId) -> YabaResult<Option<Budget>> {
        let budgets = self
            .budgets
            .read()
            .map_err(|e| YabaError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(budgets.get(&id).filter(|b| b.owner == owner).cloned())
    }

    /// All budgets of `owner`, most recently updated first
    pub fn for_owner(&self, owner: OwnerId) -> YabaResult<Vec<Budget>> {
        let budgets = self
            .budgets
            .read()
            .map_err(|e| YabaError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut list: Vec<_> = budgets
            .values()
            .filter(|b| b.owner == owner)
            .cloned()
            .collect();
        list.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(list)
    }

    /// Insert or replace a budget, writing the file before updating memory
    pub fn upsert(&self, budget: Budget) -> YabaResult<()> {
        let mut budgets = self
            .budgets
            .write()
            .map_err(|e| YabaError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        if let Some(existing) = budgets.get(&budget.id) {
            if existing.owner != budget.owner {
                return Err(YabaError::Storage(format!(
                    "Budget {} belongs to a different owner",
                    budget.id
                )));
            }
        }

        let mut list: Vec<Budget> = budgets
            .values()
            .filter(|b| b.id != budget.id)
            .cloned()
            .chain(std::iter::once(budget.clone()))
            .collect();
        list.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        write_json_atomic(&self.path, &BudgetData { budgets: list })?;

        budgets.insert(budget.id, budget);
        Ok(())
    }

    /// Number of stored budgets
    pub fn count(&self) -> YabaResult<usize> {
        let budgets = self
            .budgets
            .read()
            .map_err(|e| YabaError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(budgets.len())
    }
}
