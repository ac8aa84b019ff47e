//! Storage layer for yaba
//!
//! Provides JSON file storage with atomic writes and automatic directory
//! creation, exposed to the rest of the crate through [`PersistenceGateway`].

pub mod budget;
pub mod expenditures;
pub mod file_io;
pub mod gateway;

pub use budget::BudgetRepository;
pub use expenditures::ExpenditureRepository;
pub use file_io::{read_json, write_json_atomic};
pub use gateway::{CategoryAssignment, ExpenditureQuery, PersistenceGateway};

use crate::config::paths::YabaPaths;
use crate::error::YabaResult;
use crate::models::{Budget, BudgetId, Expenditure, OwnerId};

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: YabaPaths,
    pub expenditures: ExpenditureRepository,
    pub budgets: BudgetRepository,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: YabaPaths) -> YabaResult<Self> {
        paths.ensure_directories()?;

        Ok(Self {
            expenditures: ExpenditureRepository::new(paths.expenditures_file()),
            budgets: BudgetRepository::new(paths.budgets_file()),
            paths,
        })
    }

    /// Create a Storage instance and load everything from disk
    pub fn open(paths: YabaPaths) -> YabaResult<Self> {
        let storage = Self::new(paths)?;
        storage.load_all()?;
        Ok(storage)
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &YabaPaths {
        &self.paths
    }

    /// Load all data from disk
    pub fn load_all(&self) -> YabaResult<()> {
        self.expenditures.load()?;
        self.budgets.load()?;
        Ok(())
    }
}

impl PersistenceGateway for Storage {
    fn insert_expenditures(&self, expenditures: Vec<Expenditure>) -> YabaResult<usize> {
        self.expenditures.insert_all(expenditures)
    }

    fn query_expenditures(&self, query: &ExpenditureQuery) -> YabaResult<Vec<Expenditure>> {
        self.expenditures.query(query)
    }

    fn classify_unclassified(
        &self,
        owner: OwnerId,
        assignments: &[CategoryAssignment],
    ) -> YabaResult<usize> {
        self.expenditures.classify_unclassified(owner, assignments)
    }

    fn budgets_for_owner(&self, owner: OwnerId) -> YabaResult<Vec<Budget>> {
        self.budgets.for_owner(owner)
    }

    fn get_budget(&self, owner: OwnerId, id: BudgetId) -> YabaResult<Option<Budget>> {
        self.budgets.get(owner, id)
    }

    fn save_budget(&self, budget: Budget) -> YabaResult<()> {
        self.budgets.upsert(budget)
    }
}
