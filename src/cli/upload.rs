//! CLI command handler for uploading transaction exports
//!
//! Opens every file given on the command line and hands them to the upload
//! coordinator in one batch. Files that cannot be opened are reported as
//! failures alongside the import failures.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use clap::Args;

use crate::config::{Settings, UnknownColumnPolicy};
use crate::display::format_upload_report;
use crate::error::YabaResult;
use crate::models::OwnerId;
use crate::services::{UploadCoordinator, UploadReport, UploadedFile};
use crate::storage::Storage;

/// Arguments for `yaba upload`
#[derive(Args, Debug)]
pub struct UploadArgs {
    /// CSV files to import
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Reject files with unrecognized header columns
    #[arg(long)]
    pub strict: bool,
}

/// Handle the upload command
///
/// Returns the report so the caller can decide the exit status.
pub fn handle_upload_command(
    storage: &Storage,
    settings: &Settings,
    owner: OwnerId,
    args: UploadArgs,
) -> YabaResult<UploadReport> {
    let mut options = settings.import_options();
    if args.strict {
        options.unknown_columns = UnknownColumnPolicy::Strict;
    }

    let mut uploads = Vec::with_capacity(args.files.len());
    let mut unreadable = Vec::new();
    for path in &args.files {
        let filename = display_name(path);
        match File::open(path) {
            Ok(file) => uploads.push(UploadedFile::new(filename, BufReader::new(file))),
            Err(e) => unreadable.push((filename, format!("failed to open: {}", e))),
        }
    }

    let coordinator = UploadCoordinator::new(storage, options);
    let mut report = coordinator.upload(owner, uploads);
    for (filename, message) in unreadable {
        report.record_failure(filename, message);
    }

    print!("{}", format_upload_report(&report));
    Ok(report)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::YabaPaths;
    use crate::storage::{ExpenditureQuery, PersistenceGateway};
    use tempfile::TempDir;

    #[test]
    fn test_upload_reports_unopenable_files() {
        let temp_dir = TempDir::new().unwrap();
        let paths = YabaPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();

        let good = temp_dir.path().join("march.csv");
        std::fs::write(
            &good,
            "date,name,amount,budget_category\n2024-03-20,store,10.00,groceries\n",
        )
        .unwrap();

        let owner = OwnerId::new();
        let args = UploadArgs {
            files: vec![good, temp_dir.path().join("missing.csv")],
            strict: false,
        };
        let report =
            handle_upload_command(&storage, &Settings::default(), owner, args).unwrap();

        assert_eq!(report.imported.get("march.csv"), Some(&1));
        assert!(report.failures["missing.csv"].starts_with("failed to open"));
        assert!(!report.is_success());

        let stored = storage
            .query_expenditures(&ExpenditureQuery::for_owner(owner))
            .unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[test]
    fn test_same_file_name_keeps_both_failures() {
        let temp_dir = TempDir::new().unwrap();
        let paths = YabaPaths::with_base_dir(temp_dir.path().join("store"));
        let storage = Storage::open(paths).unwrap();

        let bad_dir = temp_dir.path().join("a");
        std::fs::create_dir_all(&bad_dir).unwrap();
        let bad = bad_dir.join("x.csv");
        std::fs::write(&bad, "amount,name\n1.00,x\n").unwrap();

        let args = UploadArgs {
            files: vec![bad, temp_dir.path().join("b").join("x.csv")],
            strict: false,
        };
        let report =
            handle_upload_command(&storage, &Settings::default(), OwnerId::new(), args).unwrap();

        let message = &report.failures["x.csv"];
        assert!(message.contains("missing required column 'date'"));
        assert!(message.contains("; failed to open"));
    }

    #[test]
    fn test_display_name_uses_file_name() {
        assert_eq!(display_name(Path::new("/tmp/exports/march.csv")), "march.csv");
    }
}
