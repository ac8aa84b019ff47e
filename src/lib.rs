//! yaba - spending tracker
//!
//! This library imports transaction exports from banks and card issuers,
//! classifies each expenditure against the owner's budget categories, and
//! produces time-bucketed spending summaries.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Data directory resolution and user settings
//! - `error`: Custom error types
//! - `logging`: Tracing subscriber setup for the binary
//! - `models`: Core data models (expenditures, budgets, summary requests)
//! - `import`: CSV header validation, row normalization and file import
//! - `storage`: Persistence gateway and its JSON file implementation
//! - `services`: Upload coordination, classification and budget management
//! - `reports`: Spending aggregation
//! - `display`: Terminal formatting
//! - `cli`: Command handlers for the `yaba` binary
//!
//! # Example
//!
//! ```rust,ignore
//! use yaba::config::{Settings, YabaPaths};
//! use yaba::models::{AggregationRequest, Granularity, OwnerId};
//! use yaba::reports::AggregationEngine;
//! use yaba::storage::Storage;
//!
//! let paths = YabaPaths::new()?;
//! let storage = Storage::open(paths)?;
//! let request = AggregationRequest::new().granularity(Granularity::Month);
//! let buckets = AggregationEngine::new(&storage).aggregate(owner, &request)?;
//! ```

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod import;
pub mod logging;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{YabaError, YabaResult};
