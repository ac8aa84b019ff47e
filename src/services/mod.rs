//! Service layer for yaba
//!
//! The service layer provides business logic on top of the persistence
//! gateway: uploading files, classifying expenditures, and managing budgets
//! and manually entered spending.

pub mod budget;
pub mod classification;
pub mod expenditure;
pub mod upload;

pub use budget::{BudgetInput, BudgetService, ExpenseInput, IncomeInput};
pub use classification::{CategoryIndex, ClassificationService};
pub use expenditure::{ExpenditureInput, ExpenditureService, ListOptions};
pub use upload::{UploadCoordinator, UploadReport, UploadedFile};
