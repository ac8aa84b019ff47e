//! User settings for yaba
//!
//! Manages import behaviour (header policy, accepted date formats) and CLI
//! defaults. Every field has a default so older settings files keep loading.

use serde::{Deserialize, Serialize};

use super::paths::YabaPaths;
use crate::error::YabaError;
use crate::import::ImportOptions;
use crate::models::OwnerId;

/// What to do with header columns the importer does not recognize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnknownColumnPolicy {
    /// Log a warning and ignore the column
    #[default]
    Permissive,
    /// Reject the whole file
    Strict,
}

/// User settings for yaba
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Header policy for unrecognized columns
    #[serde(default)]
    pub unknown_column_policy: UnknownColumnPolicy,

    /// Date formats (strftime) tried in order when reading a file
    #[serde(default = "default_date_formats")]
    pub date_formats: Vec<String>,

    /// Owner used by the CLI when none is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_owner: Option<OwnerId>,

    /// Default page size when listing expenditures
    #[serde(default = "default_list_limit")]
    pub list_limit: usize,
}

fn default_schema_version() -> u32 {
    1
}

fn default_date_formats() -> Vec<String> {
    vec!["%Y-%m-%d".to_string(), "%d %b %Y".to_string()]
}

fn default_list_limit() -> usize {
    10
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            unknown_column_policy: UnknownColumnPolicy::default(),
            date_formats: default_date_formats(),
            default_owner: None,
            list_limit: default_list_limit(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or use defaults if the file doesn't exist
    pub fn load_or_create(paths: &YabaPaths) -> Result<Self, YabaError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| YabaError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents)
                .map_err(|e| YabaError::Config(format!("Failed to parse settings file: {}", e)))?;

            settings.validate()?;
            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &YabaPaths) -> Result<(), YabaError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| YabaError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| YabaError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Reject settings the importer cannot work with
    pub fn validate(&self) -> Result<(), YabaError> {
        if self.date_formats.is_empty() {
            return Err(YabaError::Config(
                "At least one date format must be configured".into(),
            ));
        }
        if self.list_limit == 0 {
            return Err(YabaError::Config("list_limit must be positive".into()));
        }
        Ok(())
    }

    /// Import options derived from these settings
    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            unknown_columns: self.unknown_column_policy,
            date_formats: self.date_formats.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.unknown_column_policy, UnknownColumnPolicy::Permissive);
        assert_eq!(settings.date_formats, vec!["%Y-%m-%d", "%d %b %Y"]);
        assert_eq!(settings.list_limit, 10);
        assert!(settings.default_owner.is_none());
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let paths = YabaPaths::with_base_dir(temp_dir.path().to_path_buf());

        let settings = Settings::load_or_create(&paths).unwrap();
        assert_eq!(settings.schema_version, 1);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = YabaPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.unknown_column_policy = UnknownColumnPolicy::Strict;
        settings.default_owner = Some(OwnerId::new());
        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.unknown_column_policy, UnknownColumnPolicy::Strict);
        assert_eq!(loaded.default_owner, settings.default_owner);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let paths = YabaPaths::with_base_dir(temp_dir.path().to_path_buf());
        std::fs::write(paths.settings_file(), r#"{"unknown_column_policy":"strict"}"#).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.unknown_column_policy, UnknownColumnPolicy::Strict);
        assert_eq!(loaded.date_formats.len(), 2);
    }

    #[test]
    fn test_empty_date_formats_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let paths = YabaPaths::with_base_dir(temp_dir.path().to_path_buf());
        std::fs::write(paths.settings_file(), r#"{"date_formats":[]}"#).unwrap();

        assert!(Settings::load_or_create(&paths).is_err());
    }

    #[test]
    fn test_import_options() {
        let options = Settings::default().import_options();
        assert_eq!(options.unknown_columns, UnknownColumnPolicy::Permissive);
        assert_eq!(options.date_formats[0], "%Y-%m-%d");
    }
}
