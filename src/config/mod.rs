//! Configuration module for yaba
//!
//! This module provides configuration management including:
//! - data directory resolution
//! - user settings persistence
//! - import options derived from settings

pub mod paths;
pub mod settings;

pub use paths::YabaPaths;
pub use settings::{Settings, UnknownColumnPolicy};
